//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use scriptorium_core::domain::Post;
use scriptorium_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quote_id: Uuid,
    pub image: Vec<u8>,
    #[sea_orm(column_type = "Text")]
    pub caption: String,
    pub hashtags: Json,
    pub call_to_action: String,
    #[sea_orm(column_type = "Text")]
    pub full_caption: String,
    pub status: String,
    pub forced_repeat: bool,
    pub created_at: DateTimeWithTimeZone,
    pub approved_at: Option<DateTimeWithTimeZone>,
}

// No foreign key to quotes: re-ingesting the bank may drop a post's quote.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl TryFrom<Model> for Post {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse()
            .map_err(|e| RepoError::Query(format!("post {}: {}", model.id, e)))?;
        let hashtags: Vec<String> = serde_json::from_value(model.hashtags)
            .map_err(|e| RepoError::Query(format!("post {}: {}", model.id, e)))?;

        Ok(Self {
            id: model.id,
            quote_id: model.quote_id,
            image: model.image,
            caption: model.caption,
            hashtags,
            call_to_action: model.call_to_action,
            full_caption: model.full_caption,
            status,
            forced_repeat: model.forced_repeat,
            created_at: model.created_at.into(),
            approved_at: model.approved_at.map(Into::into),
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            quote_id: Set(post.quote_id),
            image: Set(post.image),
            caption: Set(post.caption),
            hashtags: Set(serde_json::json!(post.hashtags)),
            call_to_action: Set(post.call_to_action),
            full_caption: Set(post.full_caption),
            status: Set(post.status.as_str().to_string()),
            forced_repeat: Set(post.forced_repeat),
            created_at: Set(post.created_at.into()),
            approved_at: Set(post.approved_at.map(Into::into)),
        }
    }
}

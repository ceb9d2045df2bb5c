//! Quote entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use scriptorium_core::domain::{LengthClass, Quote};
use scriptorium_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub theme: String,
    pub tone: String,
    pub length: String,
    pub visual_keywords: Json,
    pub last_selected_at: Option<DateTimeWithTimeZone>,
    pub times_selected: i32,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Quote.
impl TryFrom<Model> for Quote {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let length: LengthClass = model
            .length
            .parse()
            .map_err(|e| RepoError::Query(format!("quote {}: {}", model.id, e)))?;
        let visual_keywords: Vec<String> = serde_json::from_value(model.visual_keywords)
            .map_err(|e| RepoError::Query(format!("quote {}: {}", model.id, e)))?;

        Ok(Self {
            id: model.id,
            text: model.text,
            theme: model.theme,
            tone: model.tone,
            length,
            visual_keywords,
            last_selected_at: model.last_selected_at.map(Into::into),
            times_selected: u32::try_from(model.times_selected).unwrap_or(0),
        })
    }
}

/// Build an ActiveModel for a domain quote at a given bank position.
pub fn active_model(quote: Quote, position: i32) -> ActiveModel {
    ActiveModel {
        id: Set(quote.id),
        text: Set(quote.text),
        theme: Set(quote.theme),
        tone: Set(quote.tone),
        length: Set(quote.length.as_str().to_string()),
        visual_keywords: Set(serde_json::json!(quote.visual_keywords)),
        last_selected_at: Set(quote.last_selected_at.map(Into::into)),
        times_selected: Set(i32::try_from(quote.times_selected).unwrap_or(i32::MAX)),
        position: Set(position),
    }
}

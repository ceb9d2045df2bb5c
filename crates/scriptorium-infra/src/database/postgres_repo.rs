//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use scriptorium_core::domain::{Post, PostStatus, Quote};
use scriptorium_core::error::RepoError;
use scriptorium_core::ports::{PostRepository, QuoteStore};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::quote::{self, Entity as QuoteEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL quote store.
pub type PostgresQuoteStore = PostgresBaseRepository<QuoteEntity>;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_status(&self, status: PostStatus) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Status.eq(status.as_str()))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        result.into_iter().map(Post::try_from).collect()
    }
}

#[async_trait]
impl QuoteStore for PostgresQuoteStore {
    async fn list(&self) -> Result<Vec<Quote>, RepoError> {
        let result = QuoteEntity::find()
            .order_by_asc(quote::Column::Position)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        result.into_iter().map(Quote::try_from).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Quote>, RepoError> {
        let result = QuoteEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        result.map(Quote::try_from).transpose()
    }

    async fn record_selection(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError> {
        tracing::debug!(quote_id = %id, "Recording quote selection");

        // GREATEST keeps last_selected_at monotone under racing writers.
        let result = QuoteEntity::update_many()
            .col_expr(
                quote::Column::LastSelectedAt,
                Expr::cust_with_values(
                    "GREATEST(COALESCE(last_selected_at, $1), $1)",
                    [sea_orm::Value::from(at)],
                ),
            )
            .col_expr(
                quote::Column::TimesSelected,
                Expr::col(quote::Column::TimesSelected).add(1),
            )
            .filter(quote::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn replace_all(&self, quotes: Vec<Quote>) -> Result<usize, RepoError> {
        let count = quotes.len();

        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    QuoteEntity::delete_many().exec(txn).await?;
                    if !quotes.is_empty() {
                        let models = quotes
                            .into_iter()
                            .enumerate()
                            .map(|(i, q)| quote::active_model(q, i32::try_from(i).unwrap_or(i32::MAX)));
                        QuoteEntity::insert_many(models).exec(txn).await?;
                    }
                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(e) => RepoError::Connection(e.to_string()),
                TransactionError::Transaction(e) => query_error(e),
            })?;

        Ok(count)
    }
}

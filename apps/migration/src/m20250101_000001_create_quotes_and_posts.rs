use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Quotes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Quotes::Text).text().not_null())
                    .col(ColumnDef::new(Quotes::Theme).string().not_null())
                    .col(ColumnDef::new(Quotes::Tone).string().not_null())
                    .col(ColumnDef::new(Quotes::Length).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Quotes::VisualKeywords)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Quotes::LastSelectedAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Quotes::TimesSelected)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Quotes::Position).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Posts keep their quote id even after the bank is replaced, so no foreign key.
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::QuoteId).uuid().not_null())
                    .col(ColumnDef::new(Posts::Image).binary().not_null())
                    .col(ColumnDef::new(Posts::Caption).text().not_null())
                    .col(ColumnDef::new(Posts::Hashtags).json_binary().not_null())
                    .col(ColumnDef::new(Posts::CallToAction).string().not_null())
                    .col(ColumnDef::new(Posts::FullCaption).text().not_null())
                    .col(
                        ColumnDef::new(Posts::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Posts::ForcedRepeat)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Posts::ApprovedAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_status_created_at")
                    .table(Posts::Table)
                    .col(Posts::Status)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quotes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Quotes {
    Table,
    Id,
    Text,
    Theme,
    Tone,
    Length,
    VisualKeywords,
    LastSelectedAt,
    TimesSelected,
    Position,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    QuoteId,
    Image,
    Caption,
    Hashtags,
    CallToAction,
    FullCaption,
    Status,
    ForcedRepeat,
    CreatedAt,
    ApprovedAt,
}

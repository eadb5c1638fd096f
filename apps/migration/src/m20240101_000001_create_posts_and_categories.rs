use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Posts {
    Table,
    Id,
    Kind,
    Title,
    Preview,
    Body,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Categories {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
pub enum PostCategories {
    Table,
    PostId,
    CategoryId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Posts::Table)
                    .col(ColumnDef::new(Posts::Id).uuid().primary_key())
                    .col(ColumnDef::new(Posts::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Posts::Title).string_len(128).not_null())
                    .col(ColumnDef::new(Posts::Preview).text().not_null())
                    .col(ColumnDef::new(Posts::Body).text().not_null())
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-posts-created_at")
                    .table(Posts::Table)
                    .col(Posts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(Categories::Table)
                    .col(ColumnDef::new(Categories::Id).uuid().primary_key())
                    .col(
                        ColumnDef::new(Categories::Name)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .if_not_exists()
                    .table(PostCategories::Table)
                    .col(ColumnDef::new(PostCategories::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostCategories::CategoryId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(PostCategories::PostId)
                            .col(PostCategories::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from_col(PostCategories::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from_col(PostCategories::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostCategories::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

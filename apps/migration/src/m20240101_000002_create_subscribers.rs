use crate::m20240101_000001_create_posts_and_categories::Categories;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum CategorySubscribers {
    Table,
    CategoryId,
    Email,
    SubscribedAt,
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
                    .table(CategorySubscribers::Table)
                    .col(
                        ColumnDef::new(CategorySubscribers::CategoryId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategorySubscribers::Email)
                            .string_len(254)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CategorySubscribers::SubscribedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(CategorySubscribers::CategoryId)
                            .col(CategorySubscribers::Email),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from_col(CategorySubscribers::CategoryId)
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
            .drop_table(Table::drop().table(CategorySubscribers::Table).to_owned())
            .await
    }
}

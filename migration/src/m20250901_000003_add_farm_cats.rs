use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum FarmCats {
    Table,
    Id,
    UserId,
    Level,
    LastClaimedAt,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FarmCats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FarmCats::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FarmCats::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(FarmCats::Level)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(FarmCats::LastClaimedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(FarmCats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_farm_cats_user_id")
                    .table(FarmCats::Table)
                    .col(FarmCats::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FarmCats::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

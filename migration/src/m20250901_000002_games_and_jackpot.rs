use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum GameHistory {
    Table,
    Id,
    UserId,
    Game,
    BetAmount,
    WinAmount,
    MultiplierBp,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Jackpots {
    Table,
    Id,
    Amount,
    LastWinnerId,
    LastWonAmount,
    LastWonAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 游戏种类使用 Postgres ENUM，奖池为单行表
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("game_kind"))
                    .values(vec![
                        Alias::new("mines"),
                        Alias::new("crash"),
                        Alias::new("wheel"),
                        Alias::new("hilo"),
                        Alias::new("dice"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GameHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameHistory::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GameHistory::Game)
                            .custom(Alias::new("game_kind"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(GameHistory::BetAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(GameHistory::WinAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GameHistory::MultiplierBp)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GameHistory::CreatedAt)
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
                    .name("idx_game_history_user_created")
                    .table(GameHistory::Table)
                    .col(GameHistory::UserId)
                    .col(GameHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Jackpots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Jackpots::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Jackpots::Amount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Jackpots::LastWinnerId).big_integer().null())
                    .col(ColumnDef::new(Jackpots::LastWonAmount).big_integer().null())
                    .col(
                        ColumnDef::new(Jackpots::LastWonAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Jackpots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jackpots::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameHistory::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("game_kind"))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

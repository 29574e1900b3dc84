pub use sea_orm_migration::prelude::*;

mod m20250901_000001_users_and_payments;
mod m20250901_000002_games_and_jackpot;
mod m20250901_000003_add_farm_cats;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_users_and_payments::Migration),
            Box::new(m20250901_000002_games_and_jackpot::Migration),
            Box::new(m20250901_000003_add_farm_cats::Migration),
        ]
    }
}

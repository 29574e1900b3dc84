pub mod deposits;
pub mod farm_cats;
pub mod game_history;
pub mod jackpots;
pub mod users;
pub mod withdrawals;

pub use deposits::TransactionStatus;
pub use game_history::GameKind;

pub use deposits as deposit_entity;
pub use farm_cats as farm_cat_entity;
pub use game_history as game_history_entity;
pub use jackpots as jackpot_entity;
pub use users as user_entity;
pub use withdrawals as withdrawal_entity;

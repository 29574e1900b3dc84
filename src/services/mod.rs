pub mod auth_service;
pub mod deposit_service;
pub mod farm_service;
pub mod game_service;
pub mod jackpot_service;
pub mod user_service;
pub mod withdrawal_service;

pub use auth_service::*;
pub use deposit_service::*;
pub use farm_service::*;
pub use game_service::*;
pub use jackpot_service::*;
pub use user_service::*;
pub use withdrawal_service::*;

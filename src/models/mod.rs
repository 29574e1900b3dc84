pub mod common;
pub mod deposit;
pub mod farm;
pub mod game;
pub mod jackpot;
pub mod pagination;
pub mod user;

pub use common::*;
pub use deposit::*;
pub use farm::*;
pub use game::*;
pub use jackpot::*;
pub use pagination::*;
pub use user::*;

pub mod admin;
pub mod auth;
pub mod deposit;
pub mod farm;
pub mod game;
pub mod user;

pub use admin::admin_config;
pub use auth::auth_config;
pub use deposit::deposit_config;
pub use farm::farm_config;
pub use game::game_config;
pub use user::user_config;

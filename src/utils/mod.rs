pub mod dice;
pub mod farm;
pub mod jackpot;
pub mod jwt;
pub mod password;
pub mod validation;

pub use jwt::*;
pub use password::*;
pub use validation::*;

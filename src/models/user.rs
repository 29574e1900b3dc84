use crate::entities::user_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "lucky_cat")]
    pub username: String,
    #[schema(example = "player@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "lucky_cat")]
    pub username: String,
    #[schema(example = "password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// 主余额 (美分)
    pub balance: i64,
    /// 农场币 (美分)
    pub bonus_balance: i64,
    pub is_admin: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(m: user_entity::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            balance: m.balance,
            bonus_balance: m.bonus_balance,
            is_admin: m.is_admin,
            is_banned: m.is_banned,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UserStatistics {
    pub total_rounds: i64,
    pub total_wagered: i64,
    pub total_won: i64,
    pub total_deposited: i64,
    pub total_withdrawn: i64,
    pub cats_owned: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponse {
    pub user: UserResponse,
    pub statistics: UserStatistics,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// 管理员调整余额，delta 可为负
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustBalanceRequest {
    pub delta: i64,
}

/// 管理员授予 / 取消管理员权限
#[derive(Debug, Deserialize)]
pub struct GrantQuery {
    pub grant: Option<bool>,
}

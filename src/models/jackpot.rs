use crate::entities::jackpot_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct JackpotResponse {
    /// 当前奖池 (美分)
    pub amount: i64,
    pub last_winner_id: Option<i64>,
    pub last_won_amount: Option<i64>,
    pub last_won_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<jackpot_entity::Model> for JackpotResponse {
    fn from(m: jackpot_entity::Model) -> Self {
        Self {
            amount: m.amount,
            last_winner_id: m.last_winner_id,
            last_won_amount: m.last_won_amount,
            last_won_at: m.last_won_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AwardJackpotRequest {
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AwardJackpotResponse {
    pub winner_id: i64,
    pub amount: i64,
    pub jackpot: JackpotResponse,
}

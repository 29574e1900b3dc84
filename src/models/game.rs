use crate::entities::{GameKind, game_history_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlayDiceRequest {
    /// 下注金额 (美分)
    pub bet: i64,
    /// 掷出小于该值即获胜 (2-98)
    #[schema(example = 50)]
    pub target: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlayDiceResponse {
    /// 0.00 - 99.99
    pub roll: f64,
    pub target: i64,
    pub won: bool,
    pub multiplier: f64,
    pub payout: i64,
    pub balance: i64,
    pub round: GameRoundResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameRoundResponse {
    pub id: i64,
    pub user_id: i64,
    pub game: GameKind,
    pub bet_amount: i64,
    pub win_amount: i64,
    pub multiplier: f64,
    pub created_at: DateTime<Utc>,
}

impl From<game_history_entity::Model> for GameRoundResponse {
    fn from(m: game_history_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            game: m.game,
            bet_amount: m.bet_amount,
            win_amount: m.win_amount,
            multiplier: m.multiplier_bp as f64 / 10_000.0,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 结算结果
#[derive(Debug, Clone)]
pub struct SettledRound {
    pub round: game_history_entity::Model,
    pub balance: i64,
    pub jackpot_contribution: i64,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct GameStatsResponse {
    pub total_rounds: i64,
    pub wins: i64,
    pub losses: i64,
    pub total_wagered: i64,
    pub total_won: i64,
    /// total_won - total_wagered
    pub net: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentRoundsQuery {
    pub limit: Option<u64>,
}

use crate::entities::farm_cat_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FarmCatResponse {
    pub id: i64,
    pub level: i32,
    /// 每小时产出 (美分)
    pub production_per_hour: i64,
    /// 当前可领取
    pub pending: i64,
    /// 升级费用，满级为 None
    pub upgrade_cost: Option<i64>,
    pub last_claimed_at: DateTime<Utc>,
}

impl FarmCatResponse {
    pub fn new(
        m: &farm_cat_entity::Model,
        production_per_hour: i64,
        pending: i64,
        upgrade_cost: Option<i64>,
    ) -> Self {
        Self {
            id: m.id,
            level: m.level,
            production_per_hour,
            pending,
            upgrade_cost,
            last_claimed_at: m.last_claimed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FarmOverviewResponse {
    pub cats: Vec<FarmCatResponse>,
    pub total_production_per_hour: i64,
    pub total_pending: i64,
    pub bonus_balance: i64,
    pub cat_price: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FarmClaimResponse {
    pub claimed: i64,
    pub bonus_balance: i64,
    pub claimed_at: DateTime<Utc>,
}

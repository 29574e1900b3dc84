use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "game_kind")]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    #[sea_orm(string_value = "mines")]
    Mines,
    #[sea_orm(string_value = "crash")]
    Crash,
    #[sea_orm(string_value = "wheel")]
    Wheel,
    #[sea_orm(string_value = "hilo")]
    Hilo,
    #[sea_orm(string_value = "dice")]
    Dice,
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameKind::Mines => write!(f, "mines"),
            GameKind::Crash => write!(f, "crash"),
            GameKind::Wheel => write!(f, "wheel"),
            GameKind::Hilo => write!(f, "hilo"),
            GameKind::Dice => write!(f, "dice"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "game_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub game: GameKind,
    pub bet_amount: i64,
    /// 派彩金额 (含本金)，输掉为 0
    pub win_amount: i64,
    /// 派彩倍数 (basis points: 1x = 10000)
    pub multiplier_bp: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_loss(&self) -> bool {
        self.win_amount == 0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

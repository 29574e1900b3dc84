//! Dice: roll under `target` on a 0.00-99.99 scale.

use super::jackpot::BP_DENOMINATOR;
use crate::error::{AppError, AppResult};
use rand::Rng;

pub const MIN_TARGET: i64 = 2;
pub const MAX_TARGET: i64 = 98;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceOutcome {
    /// 0..10000, 两位小数的百分比
    pub roll: i64,
    pub target: i64,
    pub won: bool,
    pub multiplier_bp: i64,
    pub payout: i64,
}

pub fn validate_target(target: i64) -> AppResult<()> {
    if !(MIN_TARGET..=MAX_TARGET).contains(&target) {
        return Err(AppError::ValidationError(format!(
            "Target must be between {MIN_TARGET} and {MAX_TARGET}"
        )));
    }
    Ok(())
}

/// Win multiplier in basis points after the house edge.
pub fn multiplier_bp(target: i64, house_edge_bp: i64) -> i64 {
    (BP_DENOMINATOR - house_edge_bp) * 100 / target
}

pub fn roll<R: Rng>(rng: &mut R) -> i64 {
    rng.gen_range(0..BP_DENOMINATOR)
}

pub fn resolve(bet: i64, target: i64, roll: i64, house_edge_bp: i64) -> DiceOutcome {
    let multiplier_bp = multiplier_bp(target, house_edge_bp);
    let won = roll < target * 100;
    // 直接按 bet * (1 - edge) / 胜率 取整一次，multiplier_bp 只用于展示
    let payout = if won {
        (bet as i128 * (BP_DENOMINATOR - house_edge_bp) as i128 / (target * 100) as i128) as i64
    } else {
        0
    };
    DiceOutcome {
        roll,
        target,
        won,
        multiplier_bp,
        payout,
    }
}

//! 猫咪农场产出计算
//!
//! 每只猫每小时产出 `base_rate_per_hour * level`，领取时按距离上次领取的秒数折算，
//! 最多累计 `max_accrual_hours` 小时。

use chrono::{DateTime, Utc};

pub fn production_rate(level: i32, base_rate_per_hour: i64) -> i64 {
    base_rate_per_hour * i64::from(level.max(0))
}

pub fn pending_production(
    level: i32,
    base_rate_per_hour: i64,
    last_claimed_at: DateTime<Utc>,
    now: DateTime<Utc>,
    max_accrual_hours: i64,
) -> i64 {
    let elapsed = (now - last_claimed_at)
        .num_seconds()
        .clamp(0, max_accrual_hours.max(0) * 3600);
    let rate = production_rate(level, base_rate_per_hour);
    (rate as i128 * elapsed as i128 / 3600) as i64
}

/// 升级费用随当前等级线性增长
pub fn upgrade_cost(current_level: i32, cat_price: i64) -> i64 {
    cat_price * i64::from(current_level.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_production_rate_scales_with_level() {
        assert_eq!(production_rate(1, 10), 10);
        assert_eq!(production_rate(5, 10), 50);
    }

    #[test]
    fn test_pending_production_partial_hour() {
        let now = Utc::now();
        let last = now - Duration::minutes(30);
        assert_eq!(pending_production(2, 10, last, now, 24), 10);
    }

    #[test]
    fn test_pending_production_is_capped() {
        let now = Utc::now();
        let last = now - Duration::days(10);
        assert_eq!(pending_production(1, 10, last, now, 24), 240);
    }

    #[test]
    fn test_clock_skew_yields_zero() {
        let now = Utc::now();
        let future = now + Duration::hours(1);
        assert_eq!(pending_production(3, 10, future, now, 24), 0);
    }

    #[test]
    fn test_upgrade_cost() {
        assert_eq!(upgrade_cost(1, 500), 500);
        assert_eq!(upgrade_cost(4, 500), 2000);
    }
}

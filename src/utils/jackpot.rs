//! 奖池相关的纯计算

/// 100% = 10000 bp
pub const BP_DENOMINATOR: i64 = 10_000;

/// 一次输掉的下注注入奖池的金额（向下取整）
pub fn contribution(bet: i64, contribution_bp: i64) -> i64 {
    if bet <= 0 || contribution_bp <= 0 {
        return 0;
    }
    (bet as i128 * contribution_bp as i128 / BP_DENOMINATOR as i128) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_percent_of_bet() {
        assert_eq!(contribution(10_000, 100), 100);
        assert_eq!(contribution(250, 100), 2);
    }

    #[test]
    fn test_small_bets_round_down() {
        assert_eq!(contribution(99, 100), 0);
    }

    #[test]
    fn test_non_positive_inputs() {
        assert_eq!(contribution(0, 100), 0);
        assert_eq!(contribution(-500, 100), 0);
        assert_eq!(contribution(500, 0), 0);
    }

    #[test]
    fn test_large_bet_does_not_overflow() {
        assert_eq!(contribution(i64::MAX, 10_000), i64::MAX);
    }
}

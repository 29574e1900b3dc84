use crate::config::GamesConfig;
use crate::database::DbPool;
use crate::entities::{GameKind, game_history_entity as history};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::JackpotService;
use crate::services::user_service::{Wallet, credit, current_balance, debit, load_active_user};
use crate::utils::dice;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

const MAX_RECENT_ROUNDS: u64 = 50;

/// 单个用户的游戏汇总
pub async fn game_stats<C: ConnectionTrait>(db: &C, user_id: i64) -> AppResult<GameStatsResponse> {
    #[derive(Debug, sea_orm::FromQueryResult)]
    struct StatsRow {
        total_rounds: i64,
        wins: i64,
        total_wagered: i64,
        total_won: i64,
    }

    let row = history::Entity::find()
        .filter(history::Column::UserId.eq(user_id))
        .select_only()
        .column_as(Expr::cust("COUNT(*)::BIGINT"), "total_rounds")
        .column_as(
            Expr::cust("COUNT(*) FILTER (WHERE win_amount > 0)::BIGINT"),
            "wins",
        )
        .column_as(Expr::cust("COALESCE(SUM(bet_amount), 0)::BIGINT"), "total_wagered")
        .column_as(Expr::cust("COALESCE(SUM(win_amount), 0)::BIGINT"), "total_won")
        .into_model::<StatsRow>()
        .one(db)
        .await?;

    Ok(row
        .map(|r| GameStatsResponse {
            total_rounds: r.total_rounds,
            wins: r.wins,
            losses: r.total_rounds - r.wins,
            total_wagered: r.total_wagered,
            total_won: r.total_won,
            net: r.total_won - r.total_wagered,
        })
        .unwrap_or_default())
}

#[derive(Clone)]
pub struct GameService {
    pool: DbPool,
    jackpot_service: JackpotService,
    config: GamesConfig,
}

impl GameService {
    pub fn new(
        pool: DbPool,
        jackpot_service: JackpotService,
        config: GamesConfig,
    ) -> Self {
        Self {
            pool,
            jackpot_service,
            config,
        }
    }

    /// 结算一局游戏
    ///
    /// 1. 扣除注额（余额不足则失败）
    /// 2. 派彩（payout 含本金，输为 0）
    /// 3. 写游戏记录
    /// 4. 输掉时按比例注入奖池
    ///
    /// 以上在同一事务中完成。
    pub async fn settle_round(
        &self,
        user_id: i64,
        game: GameKind,
        bet: i64,
        payout: i64,
        multiplier_bp: i64,
    ) -> AppResult<SettledRound> {
        self.validate_bet(bet)?;
        if payout < 0 || multiplier_bp < 0 {
            return Err(AppError::ValidationError(
                "Payout must not be negative".into(),
            ));
        }

        let txn = self.pool.begin().await?;

        load_active_user(&txn, user_id).await?;
        debit(&txn, user_id, Wallet::Main, bet).await?;
        credit(&txn, user_id, Wallet::Main, payout).await?;

        let round = history::ActiveModel {
            user_id: Set(user_id),
            game: Set(game),
            bet_amount: Set(bet),
            win_amount: Set(payout),
            multiplier_bp: Set(multiplier_bp),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let jackpot_contribution = if round.is_loss() {
            self.jackpot_service.contribute(&txn, bet).await?
        } else {
            0
        };

        let balance = current_balance(&txn, user_id, Wallet::Main).await?;

        txn.commit().await?;

        log::debug!(
            "Settled {game} round {} for user {user_id}: bet={bet} payout={payout}",
            round.id
        );

        Ok(SettledRound {
            round,
            balance,
            jackpot_contribution,
        })
    }

    /// Dice：服务端掷骰，小于 target 获胜
    pub async fn play_dice(
        &self,
        user_id: i64,
        request: PlayDiceRequest,
    ) -> AppResult<PlayDiceResponse> {
        dice::validate_target(request.target)?;
        self.validate_bet(request.bet)?;

        let roll = dice::roll(&mut rand::thread_rng());
        let outcome = dice::resolve(request.bet, request.target, roll, self.config.house_edge_bp);
        let applied_multiplier = if outcome.won { outcome.multiplier_bp } else { 0 };

        let settled = self
            .settle_round(
                user_id,
                GameKind::Dice,
                request.bet,
                outcome.payout,
                applied_multiplier,
            )
            .await?;

        Ok(PlayDiceResponse {
            roll: outcome.roll as f64 / 100.0,
            target: outcome.target,
            won: outcome.won,
            multiplier: outcome.multiplier_bp as f64 / 10_000.0,
            payout: outcome.payout,
            balance: settled.balance,
            round: settled.round.into(),
        })
    }

    /// 分页获取用户游戏记录（倒序）
    pub async fn history(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<GameRoundResponse>> {
        let base_query = history::Entity::find().filter(history::Column::UserId.eq(user_id));
        let total = base_query.clone().count(self.pool.as_ref()).await? as i64;

        let items = base_query
            .order_by_desc(history::Column::CreatedAt)
            .order_by_desc(history::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(GameRoundResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    /// 全站最近的游戏记录（公开）
    pub async fn recent(&self, limit: Option<u64>) -> AppResult<Vec<GameRoundResponse>> {
        let limit = limit.unwrap_or(20).clamp(1, MAX_RECENT_ROUNDS);
        let rounds = history::Entity::find()
            .order_by_desc(history::Column::Id)
            .limit(limit)
            .all(self.pool.as_ref())
            .await?;
        Ok(rounds.into_iter().map(Into::into).collect())
    }

    pub async fn stats(&self, user_id: i64) -> AppResult<GameStatsResponse> {
        game_stats(self.pool.as_ref(), user_id).await
    }

    fn validate_bet(&self, bet: i64) -> AppResult<()> {
        if bet < self.config.min_bet || bet > self.config.max_bet {
            return Err(AppError::ValidationError(format!(
                "Bet must be between {} and {}",
                self.config.min_bet, self.config.max_bet
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JackpotConfig;
    use crate::services::user_service::tests::{exec, pool, user};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn round(bet: i64, win: i64) -> history::Model {
        history::Model {
            id: 1,
            user_id: 1,
            game: GameKind::Dice,
            bet_amount: bet,
            win_amount: win,
            multiplier_bp: if win > 0 { 19_800 } else { 0 },
            created_at: Some(Utc::now()),
        }
    }

    fn service(db: DbPool) -> GameService {
        let jackpot = JackpotService::new(db.clone(), JackpotConfig::default());
        GameService::new(db, jackpot, GamesConfig::default())
    }

    #[tokio::test]
    async fn test_loss_feeds_jackpot_one_percent_of_bet() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                // 用户、插入记录、奖池、最新余额
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![round(10_000, 0)]])
                .append_query_results([vec![jackpot(5_000)]])
                .append_query_results([vec![users_balance(0)]])
                // 扣款、奖池累加
                .append_exec_results([exec(1), exec(1)]),
        );

        let settled = service(db)
            .settle_round(1, GameKind::Dice, 10_000, 0, 0)
            .await
            .unwrap();
        assert_eq!(settled.jackpot_contribution, 100);
        assert_eq!(settled.balance, 0);
        assert!(settled.round.is_loss());
    }

    #[tokio::test]
    async fn test_win_does_not_feed_jackpot() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![round(1_000, 1_980)]])
                .append_query_results([vec![users_balance(10_980)]])
                // 扣款、派彩
                .append_exec_results([exec(1), exec(1)]),
        );

        let settled = service(db)
            .settle_round(1, GameKind::Dice, 1_000, 1_980, 19_800)
            .await
            .unwrap();
        assert_eq!(settled.jackpot_contribution, 0);
        assert_eq!(settled.balance, 10_980);
    }

    #[tokio::test]
    async fn test_insufficient_balance_rejects_bet() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_exec_results([exec(0)]),
        );

        let err = service(db)
            .settle_round(1, GameKind::Crash, 50_000, 0, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));
    }

    #[tokio::test]
    async fn test_bet_limits() {
        let db = pool(MockDatabase::new(DatabaseBackend::Postgres));
        let svc = service(db);
        assert!(svc.settle_round(1, GameKind::Wheel, 0, 0, 0).await.is_err());
        let err = svc
            .play_dice(1, PlayDiceRequest { bet: 100, target: 99 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    fn jackpot(amount: i64) -> crate::entities::jackpot_entity::Model {
        crate::entities::jackpot_entity::Model {
            id: 1,
            amount,
            last_winner_id: None,
            last_won_amount: None,
            last_won_at: None,
            updated_at: Some(Utc::now()),
        }
    }

    fn users_balance(balance: i64) -> crate::entities::user_entity::Model {
        crate::entities::user_entity::Model {
            balance,
            ..user(1)
        }
    }
}

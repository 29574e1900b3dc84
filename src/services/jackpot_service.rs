use crate::config::JackpotConfig;
use crate::database::DbPool;
use crate::entities::jackpot_entity as jackpots;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::user_service::{Wallet, credit, load_active_user};
use crate::utils::jackpot::contribution;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

#[derive(Clone)]
pub struct JackpotService {
    pool: DbPool,
    config: JackpotConfig,
}

impl JackpotService {
    pub fn new(pool: DbPool, config: JackpotConfig) -> Self {
        Self { pool, config }
    }

    /// 当前奖池（不存在则按 seed 初始化）
    pub async fn current(&self) -> AppResult<jackpots::Model> {
        Ok(self.ensure_jackpot(self.pool.as_ref()).await?)
    }

    /// 横幅展示用：查询失败时记录日志并返回空奖池
    pub async fn current_or_default(&self) -> JackpotResponse {
        match self.current().await {
            Ok(model) => model.into(),
            Err(e) => {
                log::error!("Failed to load jackpot: {e}");
                JackpotResponse::default()
            }
        }
    }

    /// 输掉的下注按 contribution_bp 注入奖池，返回注入金额
    pub async fn contribute<C: ConnectionTrait>(&self, db: &C, bet: i64) -> AppResult<i64> {
        let amount = contribution(bet, self.config.contribution_bp);
        if amount == 0 {
            return Ok(0);
        }

        let jackpot = self.ensure_jackpot(db).await?;
        jackpots::Entity::update_many()
            .col_expr(
                jackpots::Column::Amount,
                Expr::col(jackpots::Column::Amount).add(amount),
            )
            .col_expr(jackpots::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(jackpots::Column::Id.eq(jackpot.id))
            .exec(db)
            .await?;

        Ok(amount)
    }

    /// 管理员开奖：整个奖池发放给指定用户，奖池重置为 seed
    pub async fn award(&self, admin_id: i64, winner_id: i64) -> AppResult<AwardJackpotResponse> {
        let txn = self.pool.begin().await?;

        load_active_user(&txn, winner_id).await?;
        let jackpot = self.ensure_jackpot(&txn).await?;
        if jackpot.amount <= 0 {
            return Err(AppError::ValidationError("Jackpot is empty".into()));
        }

        let now = Utc::now();
        // 以金额作乐观锁，防止开奖期间有新的累加被覆盖
        let result = jackpots::Entity::update_many()
            .col_expr(jackpots::Column::Amount, Expr::value(self.config.seed))
            .col_expr(jackpots::Column::LastWinnerId, Expr::value(winner_id))
            .col_expr(jackpots::Column::LastWonAmount, Expr::value(jackpot.amount))
            .col_expr(jackpots::Column::LastWonAt, Expr::value(now))
            .col_expr(jackpots::Column::UpdatedAt, Expr::value(now))
            .filter(jackpots::Column::Id.eq(jackpot.id))
            .filter(jackpots::Column::Amount.eq(jackpot.amount))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::Conflict(
                "Jackpot changed during award, please retry".into(),
            ));
        }

        credit(&txn, winner_id, Wallet::Main, jackpot.amount).await?;

        txn.commit().await?;

        log::info!(
            "Jackpot of {} awarded to user {winner_id} by admin {admin_id}",
            jackpot.amount
        );

        let reset = jackpots::Model {
            amount: self.config.seed,
            last_winner_id: Some(winner_id),
            last_won_amount: Some(jackpot.amount),
            last_won_at: Some(now),
            updated_at: Some(now),
            ..jackpot
        };

        Ok(AwardJackpotResponse {
            winner_id,
            amount: reset.last_won_amount.unwrap_or_default(),
            jackpot: reset.into(),
        })
    }

    async fn ensure_jackpot<C: ConnectionTrait>(&self, db: &C) -> Result<jackpots::Model, DbErr> {
        if let Some(m) = jackpots::Entity::find()
            .order_by_asc(jackpots::Column::Id)
            .one(db)
            .await?
        {
            return Ok(m);
        }
        jackpots::ActiveModel {
            amount: Set(self.config.seed),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::user_service::tests::{exec, pool, sql_log, user};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn jackpot(amount: i64) -> jackpots::Model {
        jackpots::Model {
            id: 1,
            amount,
            last_winner_id: None,
            last_won_amount: None,
            last_won_at: None,
            updated_at: Some(Utc::now()),
        }
    }

    fn config() -> JackpotConfig {
        JackpotConfig {
            seed: 500,
            contribution_bp: 100,
        }
    }

    #[tokio::test]
    async fn test_current_initializes_with_seed() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<jackpots::Model>::new()])
                .append_query_results([vec![jackpot(500)]]),
        );
        let service = JackpotService::new(db, config());
        assert_eq!(service.current().await.unwrap().amount, 500);
    }

    #[tokio::test]
    async fn test_current_or_default_degrades_on_error() {
        // 没有准备任何结果，查询会失败
        let db = pool(MockDatabase::new(DatabaseBackend::Postgres));
        let service = JackpotService::new(db, config());
        assert_eq!(service.current_or_default().await.amount, 0);
    }

    #[tokio::test]
    async fn test_contribute_is_one_percent() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![jackpot(800)]])
                .append_exec_results([exec(1)]),
        );
        let service = JackpotService::new(db.clone(), config());
        assert_eq!(service.contribute(db.as_ref(), 25_000).await.unwrap(), 250);
        drop(service);

        // 只累加到已有的奖池行
        let log = sql_log(db);
        assert!(log.contains(r#""jackpots"."id" = $"#), "{log}");
        assert!(log.contains("BigInt(Some(250))"), "{log}");
    }

    #[tokio::test]
    async fn test_contribute_below_one_unit_is_skipped() {
        let db = pool(MockDatabase::new(DatabaseBackend::Postgres));
        let service = JackpotService::new(db.clone(), config());
        assert_eq!(service.contribute(db.as_ref(), 99).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_award_pays_pool_and_resets_to_seed() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(9)]])
                .append_query_results([vec![jackpot(12_345)]])
                .append_exec_results([exec(1), exec(1)]),
        );
        let service = JackpotService::new(db, config());

        let response = service.award(1, 9).await.unwrap();
        assert_eq!(response.amount, 12_345);
        assert_eq!(response.jackpot.amount, 500);
        assert_eq!(response.jackpot.last_winner_id, Some(9));
    }

    #[tokio::test]
    async fn test_award_refuses_empty_pool() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(9)]])
                .append_query_results([vec![jackpot(0)]]),
        );
        let service = JackpotService::new(db, config());
        assert!(matches!(
            service.award(1, 9).await.unwrap_err(),
            AppError::ValidationError(_)
        ));
    }
}

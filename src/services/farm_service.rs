use crate::config::FarmConfig;
use crate::database::DbPool;
use crate::entities::farm_cat_entity as cats;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::user_service::{
    Wallet, credit, current_balance, debit, load_active_user, lock_active_user,
};
use crate::utils::farm::{pending_production, production_rate, upgrade_cost};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct FarmService {
    pool: DbPool,
    config: FarmConfig,
}

impl FarmService {
    pub fn new(pool: DbPool, config: FarmConfig) -> Self {
        Self { pool, config }
    }

    /// 农场总览：每只猫的产出速率、待领取，以及总产出
    pub async fn overview(&self, user_id: i64) -> AppResult<FarmOverviewResponse> {
        let user = load_active_user(self.pool.as_ref(), user_id).await?;
        let list = self.user_cats(self.pool.as_ref(), user_id).await?;
        let now = Utc::now();

        let cats: Vec<FarmCatResponse> = list.iter().map(|c| self.describe(c, now)).collect();
        let total_production_per_hour = cats.iter().map(|c| c.production_per_hour).sum();
        let total_pending = cats.iter().map(|c| c.pending).sum();

        Ok(FarmOverviewResponse {
            cats,
            total_production_per_hour,
            total_pending,
            bonus_balance: user.bonus_balance,
            cat_price: self.config.cat_price,
        })
    }

    /// 购买一只 1 级猫，费用从农场币扣除
    pub async fn buy_cat(&self, user_id: i64) -> AppResult<FarmCatResponse> {
        let txn = self.pool.begin().await?;

        lock_active_user(&txn, user_id).await?;
        let owned = cats::Entity::find()
            .filter(cats::Column::UserId.eq(user_id))
            .count(&txn)
            .await?;
        if owned >= self.config.max_cats {
            return Err(AppError::ValidationError(format!(
                "A farm holds at most {} cats",
                self.config.max_cats
            )));
        }

        debit(&txn, user_id, Wallet::Bonus, self.config.cat_price).await?;

        let now = Utc::now();
        let cat = cats::ActiveModel {
            user_id: Set(user_id),
            level: Set(1),
            last_claimed_at: Set(now),
            created_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!("User {user_id} bought farm cat {}", cat.id);
        Ok(self.describe(&cat, now))
    }

    /// 升级：先按旧等级结算该猫的产出，再扣除升级费用
    pub async fn upgrade_cat(&self, user_id: i64, cat_id: i64) -> AppResult<FarmCatResponse> {
        let txn = self.pool.begin().await?;

        lock_active_user(&txn, user_id).await?;
        let cat = cats::Entity::find_by_id(cat_id)
            .filter(cats::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Cat not found".to_string()))?;
        if cat.level >= self.config.max_level {
            return Err(AppError::ValidationError("Cat is already at max level".into()));
        }

        let now = Utc::now();
        let pending = self.pending_for(&cat, now);
        let cost = upgrade_cost(cat.level, self.config.cat_price);

        credit(&txn, user_id, Wallet::Bonus, pending).await?;
        debit(&txn, user_id, Wallet::Bonus, cost).await?;

        let next_level = cat.level + 1;
        let mut am = cat.into_active_model();
        am.level = Set(next_level);
        am.last_claimed_at = Set(now);
        let upgraded = am.update(&txn).await?;

        txn.commit().await?;

        log::info!("User {user_id} upgraded cat {cat_id} to level {next_level} for {cost}");
        Ok(self.describe(&upgraded, now))
    }

    /// 领取所有猫的产出，记入农场币并刷新领取时间
    pub async fn claim(&self, user_id: i64) -> AppResult<FarmClaimResponse> {
        let txn = self.pool.begin().await?;

        lock_active_user(&txn, user_id).await?;
        let list = self.user_cats(&txn, user_id).await?;
        let now = Utc::now();
        let claimed: i64 = list.iter().map(|c| self.pending_for(c, now)).sum();

        if !list.is_empty() {
            cats::Entity::update_many()
                .col_expr(cats::Column::LastClaimedAt, Expr::value(now))
                .filter(cats::Column::UserId.eq(user_id))
                .exec(&txn)
                .await?;
        }
        credit(&txn, user_id, Wallet::Bonus, claimed).await?;
        let bonus_balance = current_balance(&txn, user_id, Wallet::Bonus).await?;

        txn.commit().await?;

        if claimed > 0 {
            log::info!("User {user_id} claimed {claimed} farm production");
        }
        Ok(FarmClaimResponse {
            claimed,
            bonus_balance,
            claimed_at: now,
        })
    }

    async fn user_cats<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: i64,
    ) -> AppResult<Vec<cats::Model>> {
        Ok(cats::Entity::find()
            .filter(cats::Column::UserId.eq(user_id))
            .order_by_asc(cats::Column::Id)
            .all(db)
            .await?)
    }

    fn pending_for(&self, cat: &cats::Model, now: DateTime<Utc>) -> i64 {
        pending_production(
            cat.level,
            self.config.base_rate_per_hour,
            cat.last_claimed_at,
            now,
            self.config.max_accrual_hours,
        )
    }

    fn describe(&self, cat: &cats::Model, now: DateTime<Utc>) -> FarmCatResponse {
        let next_cost = (cat.level < self.config.max_level)
            .then(|| upgrade_cost(cat.level, self.config.cat_price));
        FarmCatResponse::new(
            cat,
            production_rate(cat.level, self.config.base_rate_per_hour),
            self.pending_for(cat, now),
            next_cost,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user_entity;
    use crate::services::user_service::tests::{exec, pool, sql_log, user};
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn owned(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn cat(id: i64, level: i32, hours_ago: i64) -> cats::Model {
        cats::Model {
            id,
            user_id: 1,
            level,
            last_claimed_at: Utc::now() - Duration::hours(hours_ago),
            created_at: Some(Utc::now()),
        }
    }

    fn config() -> FarmConfig {
        FarmConfig {
            base_rate_per_hour: 10,
            max_level: 3,
            ..FarmConfig::default()
        }
    }

    #[tokio::test]
    async fn test_overview_sums_production() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![cat(1, 1, 1), cat(2, 3, 2)]]),
        );
        let overview = FarmService::new(db, config()).overview(1).await.unwrap();
        assert_eq!(overview.total_production_per_hour, 40);
        assert_eq!(overview.total_pending, 10 + 60);
        // 满级猫没有升级费用
        assert_eq!(overview.cats[1].upgrade_cost, None);
    }

    #[tokio::test]
    async fn test_claim_credits_bonus_balance() {
        let after = user_entity::Model {
            bonus_balance: 1_020,
            ..user(1)
        };
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![cat(1, 2, 1)]])
                .append_query_results([vec![after]])
                // 刷新领取时间、加款
                .append_exec_results([exec(1), exec(1)]),
        );
        let service = FarmService::new(db.clone(), config());
        let claim = service.claim(1).await.unwrap();
        assert_eq!(claim.claimed, 20);
        assert_eq!(claim.bonus_balance, 1_020);
        drop(service);

        // 领取前锁住用户行，并发领取不会重复入账
        let log = sql_log(db);
        assert!(log.contains("FOR UPDATE"), "{log}");
    }

    #[tokio::test]
    async fn test_claim_without_cats() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([Vec::<cats::Model>::new()])
                .append_query_results([vec![user(1)]]),
        );
        let claim = FarmService::new(db, config()).claim(1).await.unwrap();
        assert_eq!(claim.claimed, 0);
    }

    #[tokio::test]
    async fn test_upgrade_at_max_level_rejected() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![cat(1, 3, 0)]]),
        );
        let err = FarmService::new(db, config())
            .upgrade_cat(1, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_upgrade_unknown_cat() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([Vec::<cats::Model>::new()]),
        );
        let err = FarmService::new(db, config())
            .upgrade_cat(1, 42)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_buy_cat_charges_price() {
        let bought = cat(5, 1, 0);
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![owned(1)]])
                .append_query_results([vec![bought]])
                .append_exec_results([exec(1)]),
        );
        let service = FarmService::new(db.clone(), config());
        let response = service.buy_cat(1).await.unwrap();
        assert_eq!(response.id, 5);
        assert_eq!(response.level, 1);
        drop(service);

        let log = sql_log(db);
        assert!(log.contains("FOR UPDATE"), "{log}");
        assert!(log.contains(r#""bonus_balance" >= $"#), "{log}");
        assert!(log.contains("BigInt(Some(500))"), "{log}");
    }

    #[tokio::test]
    async fn test_buy_cat_respects_max_cats() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![owned(2)]]),
        );
        let config = FarmConfig {
            max_cats: 2,
            ..config()
        };
        let err = FarmService::new(db, config).buy_cat(1).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_buy_cat_without_funds() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![owned(0)]])
                .append_exec_results([exec(0)]),
        );
        let err = FarmService::new(db, config()).buy_cat(1).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));
    }

    #[tokio::test]
    async fn test_upgrade_settles_pending_then_charges() {
        let upgraded = cat(1, 2, 0);
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![cat(1, 1, 2)]])
                .append_query_results([vec![upgraded]])
                // 结算产出、扣升级费
                .append_exec_results([exec(1), exec(1)]),
        );
        let service = FarmService::new(db.clone(), config());
        let response = service.upgrade_cat(1, 1).await.unwrap();
        assert_eq!(response.level, 2);
        drop(service);

        // 旧等级 2 小时产出 20，之后扣 cat_price * 1
        let log = sql_log(db);
        let credited = log.find("BigInt(Some(20))").expect("pending credited");
        let charged = log.find("BigInt(Some(500))").expect("upgrade charged");
        assert!(credited < charged, "{log}");
        assert!(log.contains("FOR UPDATE"), "{log}");
    }
}

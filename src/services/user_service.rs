use crate::database::DbPool;
use crate::entities::{
    TransactionStatus, deposit_entity as deposits, farm_cat_entity as cats, user_entity as users,
    withdrawal_entity as withdrawals,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::game_service::game_stats;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

/// 用户的两个余额
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wallet {
    /// 主余额：下注、充值、提现
    Main,
    /// 农场币：买猫、升级、产出
    Bonus,
}

impl Wallet {
    fn column(self) -> users::Column {
        match self {
            Wallet::Main => users::Column::Balance,
            Wallet::Bonus => users::Column::BonusBalance,
        }
    }

    pub fn of(self, user: &users::Model) -> i64 {
        match self {
            Wallet::Main => user.balance,
            Wallet::Bonus => user.bonus_balance,
        }
    }
}

/// 加载用户，不存在返回 404，被封禁返回 403
pub async fn load_active_user<C: ConnectionTrait>(db: &C, user_id: i64) -> AppResult<users::Model> {
    let user = users::Entity::find_by_id(user_id).one(db).await?;
    active_only(user)
}

/// 同 load_active_user，但在事务内对用户行加 FOR UPDATE 锁，
/// 同一用户的并发操作在此排队
pub async fn lock_active_user<C: ConnectionTrait>(db: &C, user_id: i64) -> AppResult<users::Model> {
    let user = users::Entity::find_by_id(user_id)
        .lock_exclusive()
        .one(db)
        .await?;
    active_only(user)
}

fn active_only(user: Option<users::Model>) -> AppResult<users::Model> {
    let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    if user.is_banned {
        return Err(AppError::Forbidden("Account is banned".to_string()));
    }
    Ok(user)
}

/// 原子扣款 (UPDATE ... WHERE balance >= amount)，余额不足返回 InsufficientFunds
pub async fn debit<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    wallet: Wallet,
    amount: i64,
) -> AppResult<()> {
    if amount < 0 {
        return Err(AppError::ValidationError("Amount must not be negative".into()));
    }
    if amount == 0 {
        return Ok(());
    }
    let column = wallet.column();
    let result = users::Entity::update_many()
        .col_expr(column, Expr::col(column).sub(amount))
        .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(users::Column::Id.eq(user_id))
        .filter(column.gte(amount))
        .exec(db)
        .await?;
    if result.rows_affected != 1 {
        return Err(AppError::InsufficientFunds);
    }
    Ok(())
}

/// 原子加款
pub async fn credit<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    wallet: Wallet,
    amount: i64,
) -> AppResult<()> {
    if amount < 0 {
        return Err(AppError::ValidationError("Amount must not be negative".into()));
    }
    if amount == 0 {
        return Ok(());
    }
    let column = wallet.column();
    let result = users::Entity::update_many()
        .col_expr(column, Expr::col(column).add(amount))
        .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(users::Column::Id.eq(user_id))
        .exec(db)
        .await?;
    if result.rows_affected != 1 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(())
}

pub async fn current_balance<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    wallet: Wallet,
) -> AppResult<i64> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(wallet.of(&user))
}

#[derive(Clone)]
pub struct UserService {
    pool: DbPool,
}

impl UserService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn ensure_active(&self, user_id: i64) -> AppResult<users::Model> {
        load_active_user(self.pool.as_ref(), user_id).await
    }

    /// 仅管理员可调用的接口使用
    pub async fn require_admin(&self, user_id: i64) -> AppResult<users::Model> {
        let user = self.ensure_active(user_id).await?;
        if !user.is_admin {
            return Err(AppError::PermissionDenied);
        }
        Ok(user)
    }

    /// 获取用户个人资料和统计信息
    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserProfileResponse> {
        let user = self.get_user(user_id).await?;
        let statistics = self.get_statistics(user_id).await?;
        Ok(UserProfileResponse {
            user: user.into(),
            statistics,
        })
    }

    async fn get_statistics(&self, user_id: i64) -> AppResult<UserStatistics> {
        #[derive(Debug, sea_orm::FromQueryResult)]
        struct SumRow {
            total: i64,
        }

        let games = game_stats(self.pool.as_ref(), user_id).await?;

        let total_deposited = deposits::Entity::find()
            .filter(deposits::Column::UserId.eq(user_id))
            .filter(deposits::Column::Status.eq(TransactionStatus::Approved))
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(amount), 0)::BIGINT"), "total")
            .into_model::<SumRow>()
            .one(self.pool.as_ref())
            .await?
            .map(|r| r.total)
            .unwrap_or(0);

        let total_withdrawn = withdrawals::Entity::find()
            .filter(withdrawals::Column::UserId.eq(user_id))
            .filter(withdrawals::Column::Status.eq(TransactionStatus::Approved))
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(amount), 0)::BIGINT"), "total")
            .into_model::<SumRow>()
            .one(self.pool.as_ref())
            .await?
            .map(|r| r.total)
            .unwrap_or(0);

        let cats_owned = cats::Entity::find()
            .filter(cats::Column::UserId.eq(user_id))
            .count(self.pool.as_ref())
            .await? as i64;

        Ok(UserStatistics {
            total_rounds: games.total_rounds,
            total_wagered: games.total_wagered,
            total_won: games.total_won,
            total_deposited,
            total_withdrawn,
            cats_owned,
        })
    }

    /// 管理员：用户列表（按注册时间倒序）
    pub async fn list_users(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        let base_query = users::Entity::find();
        let total = base_query.clone().count(self.pool.as_ref()).await? as i64;

        let models = base_query
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(self.pool.as_ref())
            .await?;
        let items: Vec<UserResponse> = models.into_iter().map(UserResponse::from).collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    /// 管理员：封禁 / 解封
    pub async fn set_banned(
        &self,
        admin_id: i64,
        user_id: i64,
        banned: bool,
    ) -> AppResult<UserResponse> {
        if admin_id == user_id && banned {
            return Err(AppError::ValidationError("Cannot ban yourself".into()));
        }
        let updated = self
            .update_flag(user_id, users::Column::IsBanned, banned)
            .await?;
        log::info!("User {user_id} banned={banned} by admin {admin_id}");
        Ok(updated.into())
    }

    /// 管理员：授予 / 取消管理员
    pub async fn set_admin(
        &self,
        admin_id: i64,
        user_id: i64,
        is_admin: bool,
    ) -> AppResult<UserResponse> {
        if admin_id == user_id && !is_admin {
            return Err(AppError::ValidationError(
                "Cannot revoke your own admin rights".into(),
            ));
        }
        let updated = self
            .update_flag(user_id, users::Column::IsAdmin, is_admin)
            .await?;
        log::info!("User {user_id} is_admin={is_admin} by admin {admin_id}");
        Ok(updated.into())
    }

    async fn update_flag(
        &self,
        user_id: i64,
        column: users::Column,
        value: bool,
    ) -> AppResult<users::Model> {
        let result = users::Entity::update_many()
            .col_expr(column, Expr::value(value))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user_id))
            .exec(self.pool.as_ref())
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        self.get_user(user_id).await
    }

    /// 管理员：调整主余额，结果不得为负
    pub async fn adjust_balance(
        &self,
        admin_id: i64,
        user_id: i64,
        delta: i64,
    ) -> AppResult<UserResponse> {
        if delta == 0 {
            return Err(AppError::ValidationError("Delta must not be zero".into()));
        }
        self.get_user(user_id).await?;
        if delta > 0 {
            credit(self.pool.as_ref(), user_id, Wallet::Main, delta).await?;
        } else {
            debit(self.pool.as_ref(), user_id, Wallet::Main, -delta).await?;
        }
        log::info!("Balance of user {user_id} adjusted by {delta} (admin {admin_id})");
        Ok(self.get_user(user_id).await?.into())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    pub(crate) fn pool(db: MockDatabase) -> DbPool {
        Arc::new(db.into_connection())
    }

    /// 服务释放连接后，取出执行过的 SQL 日志
    pub(crate) fn sql_log(db: DbPool) -> String {
        let conn = Arc::try_unwrap(db)
            .ok()
            .expect("connection is still held by a service");
        format!("{:?}", conn.into_transaction_log()).replace("\\\"", "\"")
    }

    pub(crate) fn user(id: i64) -> users::Model {
        users::Model {
            id,
            username: format!("player{id}"),
            email: format!("player{id}@example.com"),
            password_hash: "hash".to_string(),
            balance: 10_000,
            bonus_balance: 1_000,
            is_admin: false,
            is_banned: false,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    pub(crate) fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_banning_sets_banned_flag() {
        let banned = users::Model {
            is_banned: true,
            ..user(2)
        };
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1)])
                .append_query_results([vec![banned]]),
        );
        let service = UserService::new(db);

        let response = service.set_banned(1, 2, true).await.unwrap();
        assert!(response.is_banned);
    }

    #[tokio::test]
    async fn test_cannot_ban_self() {
        let db = pool(MockDatabase::new(DatabaseBackend::Postgres));
        let service = UserService::new(db);
        let err = service.set_banned(1, 1, true).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_banned_user_is_not_active() {
        let banned = users::Model {
            is_banned: true,
            ..user(3)
        };
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![banned]]),
        );
        let service = UserService::new(db);
        let err = service.ensure_active(3).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_require_admin() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(4)]]),
        );
        let service = UserService::new(db);
        let err = service.require_admin(4).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_debit_insufficient_funds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();
        let err = debit(&db, 1, Wallet::Main, 50_000).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));
    }

    #[tokio::test]
    async fn test_adjust_balance_cannot_go_negative() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(2)]])
                .append_exec_results([exec(0)]),
        );
        let service = UserService::new(db);
        let err = service.adjust_balance(1, 2, -20_000).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));
    }

    #[tokio::test]
    async fn test_zero_amounts_skip_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        assert!(debit(&db, 1, Wallet::Bonus, 0).await.is_ok());
        assert!(credit(&db, 1, Wallet::Bonus, 0).await.is_ok());
        assert!(credit(&db, 1, Wallet::Main, -5).await.is_err());
    }
}

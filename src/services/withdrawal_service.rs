use crate::config::PaymentsConfig;
use crate::database::DbPool;
use crate::entities::{TransactionStatus, withdrawal_entity as withdrawals};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::user_service::{Wallet, credit, debit, load_active_user};
use crate::utils::validate_amount;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

const MAX_ADDRESS_LEN: usize = 255;

#[derive(Clone)]
pub struct WithdrawalService {
    pool: DbPool,
    config: PaymentsConfig,
}

impl WithdrawalService {
    pub fn new(pool: DbPool, config: PaymentsConfig) -> Self {
        Self { pool, config }
    }

    /// 申请提现：申请时即冻结（扣除）金额，拒绝时退回
    pub async fn create(
        &self,
        user_id: i64,
        request: CreateWithdrawalRequest,
    ) -> AppResult<WithdrawalResponse> {
        validate_amount(request.amount, self.config.min_withdrawal, None)?;
        let address = request.address.trim().to_string();
        if address.is_empty() || address.len() > MAX_ADDRESS_LEN {
            return Err(AppError::ValidationError("Invalid payout address".into()));
        }

        let txn = self.pool.begin().await?;

        load_active_user(&txn, user_id).await?;
        debit(&txn, user_id, Wallet::Main, request.amount).await?;

        let now = Utc::now();
        let withdrawal = withdrawals::ActiveModel {
            user_id: Set(user_id),
            amount: Set(request.amount),
            address: Set(address),
            status: Set(TransactionStatus::Pending),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!(
            "Withdrawal {} of {} requested by user {user_id}",
            withdrawal.id,
            withdrawal.amount
        );
        Ok(withdrawal.into())
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<WithdrawalResponse>> {
        self.list(Some(user_id), None, params).await
    }

    pub async fn list_by_status(
        &self,
        status: Option<TransactionStatus>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<WithdrawalResponse>> {
        self.list(None, status, params).await
    }

    async fn list(
        &self,
        user_id: Option<i64>,
        status: Option<TransactionStatus>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<WithdrawalResponse>> {
        let mut base_query = withdrawals::Entity::find();
        if let Some(user_id) = user_id {
            base_query = base_query.filter(withdrawals::Column::UserId.eq(user_id));
        }
        if let Some(status) = status {
            base_query = base_query.filter(withdrawals::Column::Status.eq(status));
        }

        let total = base_query.clone().count(self.pool.as_ref()).await? as i64;
        let items = base_query
            .order_by_desc(withdrawals::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(WithdrawalResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    /// 审核通过：金额已在申请时扣除，这里只改状态
    pub async fn approve(&self, admin_id: i64, withdrawal_id: i64) -> AppResult<WithdrawalResponse> {
        let withdrawal = self
            .transition(self.pool.as_ref(), admin_id, withdrawal_id, TransactionStatus::Approved)
            .await?;
        log::info!(
            "Withdrawal {withdrawal_id} of {} approved for user {} by admin {admin_id}",
            withdrawal.amount,
            withdrawal.user_id
        );
        Ok(withdrawal.into())
    }

    /// 审核拒绝：退回冻结金额
    pub async fn reject(&self, admin_id: i64, withdrawal_id: i64) -> AppResult<WithdrawalResponse> {
        let txn = self.pool.begin().await?;

        let withdrawal = self
            .transition(&txn, admin_id, withdrawal_id, TransactionStatus::Rejected)
            .await?;
        credit(&txn, withdrawal.user_id, Wallet::Main, withdrawal.amount).await?;

        txn.commit().await?;

        log::info!(
            "Withdrawal {withdrawal_id} rejected by admin {admin_id}, {} refunded",
            withdrawal.amount
        );
        Ok(withdrawal.into())
    }

    async fn transition<C: ConnectionTrait>(
        &self,
        db: &C,
        admin_id: i64,
        withdrawal_id: i64,
        status: TransactionStatus,
    ) -> AppResult<withdrawals::Model> {
        let withdrawal = withdrawals::Entity::find_by_id(withdrawal_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Withdrawal not found".to_string()))?;
        if withdrawal.status != TransactionStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Withdrawal is already {}",
                withdrawal.status
            )));
        }

        let now = Utc::now();
        let result = withdrawals::Entity::update_many()
            .set(withdrawals::ActiveModel {
                status: Set(status),
                reviewed_by: Set(Some(admin_id)),
                updated_at: Set(Some(now)),
                ..Default::default()
            })
            .filter(withdrawals::Column::Id.eq(withdrawal_id))
            .filter(withdrawals::Column::Status.eq(TransactionStatus::Pending))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::Conflict("Withdrawal was already reviewed".into()));
        }

        Ok(withdrawals::Model {
            status,
            reviewed_by: Some(admin_id),
            updated_at: Some(now),
            ..withdrawal
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::user_service::tests::{exec, pool, sql_log, user};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn withdrawal(status: TransactionStatus) -> withdrawals::Model {
        withdrawals::Model {
            id: 3,
            user_id: 1,
            amount: 2_000,
            address: "acct-001".to_string(),
            status,
            reviewed_by: None,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    fn request(amount: i64) -> CreateWithdrawalRequest {
        CreateWithdrawalRequest {
            amount,
            address: "acct-001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_holds_funds() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![withdrawal(TransactionStatus::Pending)]])
                .append_exec_results([exec(1)]),
        );
        let service = WithdrawalService::new(db, PaymentsConfig::default());
        let response = service.create(1, request(2_000)).await.unwrap();
        assert_eq!(response.status, TransactionStatus::Pending);
        assert_eq!(response.amount, 2_000);
    }

    #[tokio::test]
    async fn test_create_with_insufficient_balance() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_exec_results([exec(0)]),
        );
        let service = WithdrawalService::new(db, PaymentsConfig::default());
        assert!(matches!(
            service.create(1, request(999_999)).await.unwrap_err(),
            AppError::InsufficientFunds
        ));
    }

    #[tokio::test]
    async fn test_blank_address_rejected() {
        let db = pool(MockDatabase::new(DatabaseBackend::Postgres));
        let service = WithdrawalService::new(db, PaymentsConfig::default());
        let req = CreateWithdrawalRequest {
            amount: 2_000,
            address: "   ".to_string(),
        };
        assert!(service.create(1, req).await.is_err());
    }

    #[tokio::test]
    async fn test_reject_refunds() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![withdrawal(TransactionStatus::Pending)]])
                .append_exec_results([exec(1), exec(1)]),
        );
        let service = WithdrawalService::new(db, PaymentsConfig::default());
        let response = service.reject(5, 3).await.unwrap();
        assert_eq!(response.status, TransactionStatus::Rejected);
    }

    #[tokio::test]
    async fn test_approve_keeps_held_funds() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![withdrawal(TransactionStatus::Pending)]])
                .append_exec_results([exec(1)]),
        );
        let service = WithdrawalService::new(db.clone(), PaymentsConfig::default());
        let response = service.approve(5, 3).await.unwrap();
        assert_eq!(response.status, TransactionStatus::Approved);
        assert_eq!(response.reviewed_by, Some(5));
        drop(service);

        // 通过只改状态，提现金额在申请时已经扣除
        let log = sql_log(db);
        assert!(!log.contains(r#""users""#), "{log}");
    }

    #[tokio::test]
    async fn test_approve_twice_conflicts() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![withdrawal(TransactionStatus::Approved)]]),
        );
        let service = WithdrawalService::new(db, PaymentsConfig::default());
        assert!(matches!(
            service.approve(5, 3).await.unwrap_err(),
            AppError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_approve_lost_race_conflicts() {
        // 读取时仍是待审核，但条件更新没有命中
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![withdrawal(TransactionStatus::Pending)]])
                .append_exec_results([exec(0)]),
        );
        let service = WithdrawalService::new(db, PaymentsConfig::default());
        assert!(matches!(
            service.approve(5, 3).await.unwrap_err(),
            AppError::Conflict(_)
        ));
    }
}

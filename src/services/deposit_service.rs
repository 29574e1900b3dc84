use crate::config::PaymentsConfig;
use crate::database::DbPool;
use crate::entities::{TransactionStatus, deposit_entity as deposits};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::user_service::{Wallet, credit, load_active_user};
use crate::utils::validate_amount;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct DepositService {
    pool: DbPool,
    config: PaymentsConfig,
}

impl DepositService {
    pub fn new(pool: DbPool, config: PaymentsConfig) -> Self {
        Self { pool, config }
    }

    /// 创建充值申请（待审核）
    pub async fn create(
        &self,
        user_id: i64,
        request: CreateDepositRequest,
    ) -> AppResult<DepositResponse> {
        validate_amount(
            request.amount,
            self.config.min_deposit,
            Some(self.config.max_deposit),
        )?;
        load_active_user(self.pool.as_ref(), user_id).await?;

        let now = Utc::now();
        let deposit = deposits::ActiveModel {
            user_id: Set(user_id),
            amount: Set(request.amount),
            status: Set(TransactionStatus::Pending),
            reference: Set(uuid::Uuid::new_v4().to_string()),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!(
            "Deposit {} of {} requested by user {user_id}",
            deposit.id,
            deposit.amount
        );
        Ok(deposit.into())
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<DepositResponse>> {
        self.list(Some(user_id), None, params).await
    }

    /// 管理员：按状态筛选
    pub async fn list_by_status(
        &self,
        status: Option<TransactionStatus>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<DepositResponse>> {
        self.list(None, status, params).await
    }

    async fn list(
        &self,
        user_id: Option<i64>,
        status: Option<TransactionStatus>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<DepositResponse>> {
        let mut base_query = deposits::Entity::find();
        if let Some(user_id) = user_id {
            base_query = base_query.filter(deposits::Column::UserId.eq(user_id));
        }
        if let Some(status) = status {
            base_query = base_query.filter(deposits::Column::Status.eq(status));
        }

        let total = base_query.clone().count(self.pool.as_ref()).await? as i64;
        let items = base_query
            .order_by_desc(deposits::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(DepositResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    /// 审核通过：状态 pending -> approved，并给用户加款
    pub async fn approve(&self, admin_id: i64, deposit_id: i64) -> AppResult<DepositResponse> {
        let txn = self.pool.begin().await?;

        let deposit = self
            .transition(&txn, admin_id, deposit_id, TransactionStatus::Approved)
            .await?;
        credit(&txn, deposit.user_id, Wallet::Main, deposit.amount).await?;

        txn.commit().await?;

        log::info!(
            "Deposit {deposit_id} of {} approved for user {} by admin {admin_id}",
            deposit.amount,
            deposit.user_id
        );
        Ok(deposit.into())
    }

    /// 审核拒绝：仅修改状态
    pub async fn reject(&self, admin_id: i64, deposit_id: i64) -> AppResult<DepositResponse> {
        let deposit = self
            .transition(self.pool.as_ref(), admin_id, deposit_id, TransactionStatus::Rejected)
            .await?;
        log::info!("Deposit {deposit_id} rejected by admin {admin_id}");
        Ok(deposit.into())
    }

    /// 仅允许从 pending 迁移，条件更新保证同一笔申请只会被处理一次
    async fn transition<C: sea_orm::ConnectionTrait>(
        &self,
        db: &C,
        admin_id: i64,
        deposit_id: i64,
        status: TransactionStatus,
    ) -> AppResult<deposits::Model> {
        let deposit = deposits::Entity::find_by_id(deposit_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Deposit not found".to_string()))?;
        if deposit.status != TransactionStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Deposit is already {}",
                deposit.status
            )));
        }

        let now = Utc::now();
        let result = deposits::Entity::update_many()
            .set(deposits::ActiveModel {
                status: Set(status),
                reviewed_by: Set(Some(admin_id)),
                updated_at: Set(Some(now)),
                ..Default::default()
            })
            .filter(deposits::Column::Id.eq(deposit_id))
            .filter(deposits::Column::Status.eq(TransactionStatus::Pending))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(AppError::Conflict("Deposit was already reviewed".into()));
        }

        Ok(deposits::Model {
            status,
            reviewed_by: Some(admin_id),
            updated_at: Some(now),
            ..deposit
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::user_service::tests::{exec, pool, user};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn deposit(status: TransactionStatus) -> deposits::Model {
        deposits::Model {
            id: 7,
            user_id: 1,
            amount: 5_000,
            status,
            reference: "ref".to_string(),
            reviewed_by: None,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn test_create_deposit_is_pending() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]])
                .append_query_results([vec![deposit(TransactionStatus::Pending)]]),
        );
        let service = DepositService::new(db, PaymentsConfig::default());
        let response = service
            .create(1, CreateDepositRequest { amount: 5_000 })
            .await
            .unwrap();
        assert_eq!(response.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_deposit_below_minimum() {
        let db = pool(MockDatabase::new(DatabaseBackend::Postgres));
        let service = DepositService::new(db, PaymentsConfig::default());
        assert!(
            service
                .create(1, CreateDepositRequest { amount: 1 })
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_approve_credits_user() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![deposit(TransactionStatus::Pending)]])
                // 状态更新、加款
                .append_exec_results([exec(1), exec(1)]),
        );
        let service = DepositService::new(db, PaymentsConfig::default());
        let response = service.approve(99, 7).await.unwrap();
        assert_eq!(response.status, TransactionStatus::Approved);
        assert_eq!(response.reviewed_by, Some(99));
    }

    #[tokio::test]
    async fn test_cannot_review_twice() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![deposit(TransactionStatus::Approved)]]),
        );
        let service = DepositService::new(db, PaymentsConfig::default());
        assert!(matches!(
            service.reject(99, 7).await.unwrap_err(),
            AppError::Conflict(_)
        ));
    }
}

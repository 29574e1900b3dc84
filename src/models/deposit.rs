use crate::entities::{TransactionStatus, deposit_entity, withdrawal_entity};
use crate::models::pagination::PaginationParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDepositRequest {
    /// 金额 (美分)
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepositResponse {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub status: TransactionStatus,
    pub reference: String,
    pub reviewed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<deposit_entity::Model> for DepositResponse {
    fn from(m: deposit_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            amount: m.amount,
            status: m.status,
            reference: m.reference,
            reviewed_by: m.reviewed_by,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateWithdrawalRequest {
    /// 金额 (美分)
    pub amount: i64,
    /// 收款地址
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalResponse {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub address: String,
    pub status: TransactionStatus,
    pub reviewed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<withdrawal_entity::Model> for WithdrawalResponse {
    fn from(m: withdrawal_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            amount: m.amount,
            address: m.address,
            status: m.status,
            reviewed_by: m.reviewed_by,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 管理员按状态查询充值 / 提现
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    pub status: Option<TransactionStatus>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl TransactionQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_query_from_querystring() {
        let query = actix_web::web::Query::<TransactionQuery>::from_query("status=pending&page=2")
            .unwrap()
            .into_inner();
        assert_eq!(query.status, Some(TransactionStatus::Pending));
        assert_eq!(query.pagination().get_offset(), 20);
    }
}

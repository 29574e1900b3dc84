use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{DepositService, WithdrawalService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/deposits",
    tag = "wallet",
    request_body = CreateDepositRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "充值申请已提交", body = DepositResponse),
        (status = 400, description = "金额不在允许范围内"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_deposit(
    deposit_service: web::Data<DepositService>,
    user: AuthenticatedUser,
    request: web::Json<CreateDepositRequest>,
) -> Result<HttpResponse> {
    match deposit_service.create(user.id(), request.into_inner()).await {
        Ok(deposit) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": deposit
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/deposits",
    tag = "wallet",
    params(PaginationParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取充值记录成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_deposits(
    deposit_service: web::Data<DepositService>,
    user: AuthenticatedUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match deposit_service.list_for_user(user.id(), &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/withdrawals",
    tag = "wallet",
    request_body = CreateWithdrawalRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提现申请已提交，金额已冻结", body = WithdrawalResponse),
        (status = 400, description = "金额或收款地址无效，或余额不足"),
        (status = 401, description = "未授权")
    )
)]
pub async fn create_withdrawal(
    withdrawal_service: web::Data<WithdrawalService>,
    user: AuthenticatedUser,
    request: web::Json<CreateWithdrawalRequest>,
) -> Result<HttpResponse> {
    match withdrawal_service
        .create(user.id(), request.into_inner())
        .await
    {
        Ok(withdrawal) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": withdrawal
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/withdrawals",
    tag = "wallet",
    params(PaginationParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取提现记录成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_withdrawals(
    withdrawal_service: web::Data<WithdrawalService>,
    user: AuthenticatedUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match withdrawal_service.list_for_user(user.id(), &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn deposit_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/deposits")
            .route("", web::post().to(create_deposit))
            .route("", web::get().to(list_deposits)),
    )
    .service(
        web::scope("/withdrawals")
            .route("", web::post().to(create_withdrawal))
            .route("", web::get().to(list_withdrawals)),
    );
}

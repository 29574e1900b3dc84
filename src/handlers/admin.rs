use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{DepositService, JackpotService, UserService, WithdrawalService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde::Serialize;
use serde_json::json;

// 管理员接口统一先校验权限，再执行业务
async fn as_admin<T, F, Fut>(
    user_service: &UserService,
    user: AuthenticatedUser,
    action: F,
) -> Result<HttpResponse>
where
    T: Serialize,
    F: FnOnce(i64) -> Fut,
    Fut: std::future::Future<Output = crate::error::AppResult<T>>,
{
    if let Err(e) = user_service.require_admin(user.id()).await {
        log::warn!("User {} attempted an admin operation", user.id());
        return Ok(e.error_response());
    }
    match action(user.id()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    params(PaginationParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "用户列表"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    user: AuthenticatedUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let params = query.into_inner();
    as_admin(&user_service, user, |_| user_service.list_users(&params)).await
}

#[utoipa::path(
    post,
    path = "/admin/users/{id}/ban",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "用户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已封禁", body = UserResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn ban_user(
    user_service: web::Data<UserService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    as_admin(&user_service, user, |admin_id| {
        user_service.set_banned(admin_id, target, true)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/admin/users/{id}/unban",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "用户ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已解封", body = UserResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn unban_user(
    user_service: web::Data<UserService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    as_admin(&user_service, user, |admin_id| {
        user_service.set_banned(admin_id, target, false)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/admin/users/{id}/admin",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "用户ID"),
        ("grant" = Option<bool>, Query, description = "false 表示取消管理员，默认 true")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已更新管理员权限", body = UserResponse),
        (status = 403, description = "需要管理员权限"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn set_admin(
    user_service: web::Data<UserService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    query: web::Query<GrantQuery>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    let grant = query.grant.unwrap_or(true);
    as_admin(&user_service, user, |admin_id| {
        user_service.set_admin(admin_id, target, grant)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/admin/users/{id}/balance",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "用户ID")
    ),
    request_body = AdjustBalanceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "余额已调整", body = UserResponse),
        (status = 400, description = "调整后余额为负"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn adjust_balance(
    user_service: web::Data<UserService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    request: web::Json<AdjustBalanceRequest>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    let delta = request.delta;
    as_admin(&user_service, user, |admin_id| {
        user_service.adjust_balance(admin_id, target, delta)
    })
    .await
}

#[utoipa::path(
    get,
    path = "/admin/deposits",
    tag = "admin",
    params(TransactionQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "充值列表"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_deposits(
    user_service: web::Data<UserService>,
    deposit_service: web::Data<DepositService>,
    user: AuthenticatedUser,
    query: web::Query<TransactionQuery>,
) -> Result<HttpResponse> {
    let params = query.pagination();
    as_admin(&user_service, user, |_| {
        deposit_service.list_by_status(query.status, &params)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/admin/deposits/{id}/approve",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "充值ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已入账", body = DepositResponse),
        (status = 404, description = "充值记录不存在"),
        (status = 409, description = "已审核过")
    )
)]
pub async fn approve_deposit(
    user_service: web::Data<UserService>,
    deposit_service: web::Data<DepositService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    as_admin(&user_service, user, |admin_id| {
        deposit_service.approve(admin_id, id)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/admin/deposits/{id}/reject",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "充值ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已拒绝", body = DepositResponse),
        (status = 404, description = "充值记录不存在"),
        (status = 409, description = "已审核过")
    )
)]
pub async fn reject_deposit(
    user_service: web::Data<UserService>,
    deposit_service: web::Data<DepositService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    as_admin(&user_service, user, |admin_id| {
        deposit_service.reject(admin_id, id)
    })
    .await
}

#[utoipa::path(
    get,
    path = "/admin/withdrawals",
    tag = "admin",
    params(TransactionQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提现列表"),
        (status = 403, description = "需要管理员权限")
    )
)]
pub async fn list_withdrawals(
    user_service: web::Data<UserService>,
    withdrawal_service: web::Data<WithdrawalService>,
    user: AuthenticatedUser,
    query: web::Query<TransactionQuery>,
) -> Result<HttpResponse> {
    let params = query.pagination();
    as_admin(&user_service, user, |_| {
        withdrawal_service.list_by_status(query.status, &params)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/admin/withdrawals/{id}/approve",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "提现ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已通过", body = WithdrawalResponse),
        (status = 404, description = "提现记录不存在"),
        (status = 409, description = "已审核过")
    )
)]
pub async fn approve_withdrawal(
    user_service: web::Data<UserService>,
    withdrawal_service: web::Data<WithdrawalService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    as_admin(&user_service, user, |admin_id| {
        withdrawal_service.approve(admin_id, id)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/admin/withdrawals/{id}/reject",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "提现ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已拒绝并退款", body = WithdrawalResponse),
        (status = 404, description = "提现记录不存在"),
        (status = 409, description = "已审核过")
    )
)]
pub async fn reject_withdrawal(
    user_service: web::Data<UserService>,
    withdrawal_service: web::Data<WithdrawalService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    as_admin(&user_service, user, |admin_id| {
        withdrawal_service.reject(admin_id, id)
    })
    .await
}

#[utoipa::path(
    post,
    path = "/admin/jackpot/award",
    tag = "admin",
    request_body = AwardJackpotRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "奖池已发放", body = AwardJackpotResponse),
        (status = 400, description = "奖池为空"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn award_jackpot(
    user_service: web::Data<UserService>,
    jackpot_service: web::Data<JackpotService>,
    user: AuthenticatedUser,
    request: web::Json<AwardJackpotRequest>,
) -> Result<HttpResponse> {
    let winner_id = request.user_id;
    as_admin(&user_service, user, |admin_id| {
        jackpot_service.award(admin_id, winner_id)
    })
    .await
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/users", web::get().to(list_users))
            .route("/users/{id}/ban", web::post().to(ban_user))
            .route("/users/{id}/unban", web::post().to(unban_user))
            .route("/users/{id}/admin", web::post().to(set_admin))
            .route("/users/{id}/balance", web::post().to(adjust_balance))
            .route("/deposits", web::get().to(list_deposits))
            .route("/deposits/{id}/approve", web::post().to(approve_deposit))
            .route("/deposits/{id}/reject", web::post().to(reject_deposit))
            .route("/withdrawals", web::get().to(list_withdrawals))
            .route("/withdrawals/{id}/approve", web::post().to(approve_withdrawal))
            .route("/withdrawals/{id}/reject", web::post().to(reject_withdrawal))
            .route("/jackpot/award", web::post().to(award_jackpot)),
    );
}

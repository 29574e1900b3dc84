use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::FarmService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/farm/cats",
    tag = "farm",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "农场总览", body = FarmOverviewResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_cats(
    farm_service: web::Data<FarmService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match farm_service.overview(user.id()).await {
        Ok(overview) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": overview
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/farm/cats",
    tag = "farm",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "购买成功", body = FarmCatResponse),
        (status = 400, description = "农场币不足或猫咪数量已满"),
        (status = 401, description = "未授权")
    )
)]
pub async fn buy_cat(
    farm_service: web::Data<FarmService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match farm_service.buy_cat(user.id()).await {
        Ok(cat) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cat
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/farm/cats/{id}/upgrade",
    tag = "farm",
    params(
        ("id" = i64, Path, description = "猫咪ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "升级成功", body = FarmCatResponse),
        (status = 400, description = "农场币不足或已满级"),
        (status = 404, description = "猫咪不存在")
    )
)]
pub async fn upgrade_cat(
    farm_service: web::Data<FarmService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match farm_service.upgrade_cat(user.id(), path.into_inner()).await {
        Ok(cat) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": cat
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/farm/claim",
    tag = "farm",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "领取成功", body = FarmClaimResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn claim(
    farm_service: web::Data<FarmService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match farm_service.claim(user.id()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn farm_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/farm")
            .route("/cats", web::get().to(list_cats))
            .route("/cats", web::post().to(buy_cat))
            .route("/cats/{id}/upgrade", web::post().to(upgrade_cat))
            .route("/claim", web::post().to(claim)),
    );
}

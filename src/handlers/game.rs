use crate::middlewares::AuthenticatedUser;
use crate::models::*;
use crate::services::{GameService, JackpotService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/games/dice",
    tag = "game",
    request_body = PlayDiceRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "结算完成", body = PlayDiceResponse),
        (status = 400, description = "注额或目标值无效，或余额不足"),
        (status = 401, description = "未授权"),
        (status = 403, description = "账号已被封禁")
    )
)]
pub async fn play_dice(
    game_service: web::Data<GameService>,
    user: AuthenticatedUser,
    request: web::Json<PlayDiceRequest>,
) -> Result<HttpResponse> {
    match game_service.play_dice(user.id(), request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/history",
    tag = "game",
    params(PaginationParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取游戏记录成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_history(
    game_service: web::Data<GameService>,
    user: AuthenticatedUser,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match game_service.history(user.id(), &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/stats",
    tag = "game",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取游戏统计成功", body = GameStatsResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_stats(
    game_service: web::Data<GameService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    match game_service.stats(user.id()).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": stats
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/games/recent",
    tag = "game",
    params(RecentRoundsQuery),
    responses(
        (status = 200, description = "全站最近的游戏记录", body = [GameRoundResponse])
    )
)]
pub async fn get_recent(
    game_service: web::Data<GameService>,
    query: web::Query<RecentRoundsQuery>,
) -> Result<HttpResponse> {
    match game_service.recent(query.limit).await {
        Ok(rounds) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": rounds
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/jackpot",
    tag = "game",
    responses(
        (status = 200, description = "当前奖池", body = JackpotResponse)
    )
)]
pub async fn get_jackpot(jackpot_service: web::Data<JackpotService>) -> Result<HttpResponse> {
    let jackpot = jackpot_service.current_or_default().await;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": jackpot
    })))
}

pub fn game_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/games")
            .route("/dice", web::post().to(play_dice))
            .route("/history", web::get().to(get_history))
            .route("/stats", web::get().to(get_stats))
            .route("/recent", web::get().to(get_recent)),
    )
    .route("/jackpot", web::get().to(get_jackpot));
}

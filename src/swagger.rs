use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{GameKind, TransactionStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::user::get_profile,
        handlers::deposit::create_deposit,
        handlers::deposit::list_deposits,
        handlers::deposit::create_withdrawal,
        handlers::deposit::list_withdrawals,
        handlers::game::play_dice,
        handlers::game::get_history,
        handlers::game::get_stats,
        handlers::game::get_recent,
        handlers::game::get_jackpot,
        handlers::farm::list_cats,
        handlers::farm::buy_cat,
        handlers::farm::upgrade_cat,
        handlers::farm::claim,
        handlers::admin::list_users,
        handlers::admin::ban_user,
        handlers::admin::unban_user,
        handlers::admin::set_admin,
        handlers::admin::adjust_balance,
        handlers::admin::list_deposits,
        handlers::admin::approve_deposit,
        handlers::admin::reject_deposit,
        handlers::admin::list_withdrawals,
        handlers::admin::approve_withdrawal,
        handlers::admin::reject_withdrawal,
        handlers::admin::award_jackpot,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RefreshRequest,
            AuthResponse,
            UserResponse,
            UserStatistics,
            UserProfileResponse,
            AdjustBalanceRequest,
            TransactionStatus,
            CreateDepositRequest,
            DepositResponse,
            CreateWithdrawalRequest,
            WithdrawalResponse,
            GameKind,
            PlayDiceRequest,
            PlayDiceResponse,
            GameRoundResponse,
            GameStatsResponse,
            JackpotResponse,
            AwardJackpotRequest,
            AwardJackpotResponse,
            FarmCatResponse,
            FarmOverviewResponse,
            FarmClaimResponse,
            ApiError,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "User profile API"),
        (name = "wallet", description = "Deposits and withdrawals API"),
        (name = "game", description = "Games and jackpot API"),
        (name = "farm", description = "Cat farm API"),
        (name = "admin", description = "Administration API"),
    ),
    info(
        title = "Casino Backend API",
        version = "1.0.0",
        description = "Casino Backend REST API documentation"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/games/dice"));
        assert!(doc.paths.paths.contains_key("/admin/jackpot/award"));
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}

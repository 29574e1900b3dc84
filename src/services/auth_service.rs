use crate::config::FarmConfig;
use crate::database::DbPool;
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};

/// 新用户的初始记录：主余额为 0，农场币为配置的初始值，非管理员、未封禁
pub fn new_user(
    username: &str,
    email: &str,
    password_hash: String,
    starting_bonus: i64,
) -> users::ActiveModel {
    let now = Utc::now();
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        balance: Set(0),
        bonus_balance: Set(starting_bonus),
        is_admin: Set(false),
        is_banned: Set(false),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
        ..Default::default()
    }
}

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    jwt_service: JwtService,
    starting_bonus: i64,
}

impl AuthService {
    pub fn new(pool: DbPool, jwt_service: JwtService, farm: &FarmConfig) -> Self {
        Self {
            pool,
            jwt_service,
            starting_bonus: farm.starting_bonus,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        // 验证输入参数
        let username = request.username.trim();
        let email = normalize_email(&request.email);
        validate_username(username)?;
        validate_email(&email)?;
        validate_password(&request.password)?;

        // 检查用户名 / 邮箱是否已注册
        let existing = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(username))
                    .add(users::Column::Email.eq(email.as_str())),
            )
            .one(self.pool.as_ref())
            .await?;
        if let Some(existing) = existing {
            let field = if existing.username == username {
                "Username"
            } else {
                "Email"
            };
            return Err(AppError::Conflict(format!("{field} is already registered")));
        }

        let password_hash = hash_password(&request.password)?;
        let user = new_user(username, &email, password_hash, self.starting_bonus)
            .insert(self.pool.as_ref())
            .await?;

        log::info!("User {} registered as {}", user.id, user.username);
        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(request.username.trim()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        // 验证密码
        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }
        if user.is_banned {
            return Err(AppError::Forbidden("Account is banned".to_string()));
        }

        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;

        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;
        if user.is_banned {
            return Err(AppError::Forbidden("Account is banned".to_string()));
        }

        self.issue_tokens(user)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.username)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, &user.username)?;

        Ok(AuthResponse {
            user: user.into(),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::user_service::tests::{pool, sql_log, user};
    use sea_orm::{ActiveValue, DatabaseBackend, MockDatabase};

    fn service(db: DbPool) -> AuthService {
        AuthService::new(
            db,
            JwtService::new("secret", 3600, 7200),
            &FarmConfig::default(),
        )
    }

    #[test]
    fn test_new_user_defaults() {
        let am = new_user("lucky_cat", "cat@example.com", "hashed".into(), 1_000);
        assert_eq!(am.balance, ActiveValue::Set(0));
        assert_eq!(am.bonus_balance, ActiveValue::Set(1_000));
        assert_eq!(am.is_admin, ActiveValue::Set(false));
        assert_eq!(am.is_banned, ActiveValue::Set(false));
        assert!(am.id.is_not_set());
    }

    #[tokio::test]
    async fn test_register_creates_user_with_tokens() {
        let created = users::Model {
            balance: 0,
            ..user(1)
        };
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<users::Model>::new()])
                .append_query_results([vec![created]]),
        );
        let svc = service(db.clone());
        let response = svc
            .register(RegisterRequest {
                username: "player1".into(),
                email: "Player1@Example.com".into(),
                password: "password123".into(),
            })
            .await
            .unwrap();
        assert_eq!(response.user.balance, 0);
        assert!(!response.access_token.is_empty());
        assert_ne!(response.access_token, response.refresh_token);
        drop(svc);

        // 入库的是 bcrypt 哈希和规范化后的邮箱，不是明文密码
        let log = sql_log(db);
        assert!(log.contains("$2b$"), "{log}");
        assert!(!log.contains("password123"), "{log}");
        assert!(log.contains("player1@example.com"), "{log}");
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user(1)]]),
        );
        let err = service(db)
            .register(RegisterRequest {
                username: "player1".into(),
                email: "other@example.com".into(),
                password: "password123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_checks_password_and_ban() {
        let hashed = hash_password("password123").unwrap();
        let active = users::Model {
            password_hash: hashed.clone(),
            ..user(1)
        };
        let banned = users::Model {
            password_hash: hashed,
            is_banned: true,
            ..user(2)
        };
        let db = pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![active.clone()], vec![active], vec![banned]]),
        );
        let svc = service(db);

        let ok = svc
            .login(LoginRequest {
                username: "player1".into(),
                password: "password123".into(),
            })
            .await
            .unwrap();
        assert_eq!(ok.user.id, 1);

        let wrong = svc
            .login(LoginRequest {
                username: "player1".into(),
                password: "nope12345".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(wrong, AppError::AuthError(_)));

        let banned = svc
            .login(LoginRequest {
                username: "player2".into(),
                password: "password123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(banned, AppError::Forbidden(_)));
    }
}

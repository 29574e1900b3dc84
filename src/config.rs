use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub jackpot: JackpotConfig,
    #[serde(default)]
    pub games: GamesConfig,
    #[serde(default)]
    pub farm: FarmConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许的前端来源，空表示不限制
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

/// 奖池配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JackpotConfig {
    /// 奖池开奖后重置的初始金额 (美分)
    pub seed: i64,
    /// 输掉的注额中注入奖池的比例 (basis points)
    pub contribution_bp: i64,
}

impl Default for JackpotConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            contribution_bp: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    pub house_edge_bp: i64,
    pub min_bet: i64,
    pub max_bet: i64,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            house_edge_bp: 100,
            min_bet: 10,
            max_bet: 1_000_000,
        }
    }
}

/// 猫咪农场配置，金额单位均为美分
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmConfig {
    pub starting_bonus: i64,
    pub cat_price: i64,
    pub base_rate_per_hour: i64,
    pub max_level: i32,
    pub max_cats: u64,
    pub max_accrual_hours: i64,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            starting_bonus: 1_000,
            cat_price: 500,
            base_rate_per_hour: 10,
            max_level: 10,
            max_cats: 12,
            max_accrual_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub min_deposit: i64,
    pub max_deposit: i64,
    pub min_withdrawal: i64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            min_deposit: 500,
            max_deposit: 10_000_000,
            min_withdrawal: 1_000,
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        allowed_origins: Vec::new(),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    jackpot: JackpotConfig::default(),
                    games: GamesConfig::default(),
                    farm: FarmConfig::default(),
                    payments: PaymentsConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
            env::var(name).ok().and_then(|v| v.parse().ok())
        }

        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(p) = parsed("SERVER_PORT") {
            self.server.port = p;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            self.server.allowed_origins = split_list(&v);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(mc) = parsed("DB_MAX_CONNECTIONS") {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Some(n) = parsed("JWT_ACCESS_EXPIRES_IN") {
            self.jwt.access_token_expires_in = n;
        }
        if let Some(n) = parsed("JWT_REFRESH_EXPIRES_IN") {
            self.jwt.refresh_token_expires_in = n;
        }

        // Jackpot
        if let Some(n) = parsed("JACKPOT_SEED") {
            self.jackpot.seed = n;
        }
        if let Some(n) = parsed("JACKPOT_CONTRIBUTION_BP") {
            self.jackpot.contribution_bp = n;
        }

        // Games
        if let Some(n) = parsed("GAMES_HOUSE_EDGE_BP") {
            self.games.house_edge_bp = n;
        }
        if let Some(n) = parsed("GAMES_MIN_BET") {
            self.games.min_bet = n;
        }
        if let Some(n) = parsed("GAMES_MAX_BET") {
            self.games.max_bet = n;
        }

        // Farm
        if let Some(n) = parsed("FARM_STARTING_BONUS") {
            self.farm.starting_bonus = n;
        }
        if let Some(n) = parsed("FARM_CAT_PRICE") {
            self.farm.cat_price = n;
        }
        if let Some(n) = parsed("FARM_BASE_RATE_PER_HOUR") {
            self.farm.base_rate_per_hour = n;
        }
        if let Some(n) = parsed("FARM_MAX_LEVEL") {
            self.farm.max_level = n;
        }
        if let Some(n) = parsed("FARM_MAX_CATS") {
            self.farm.max_cats = n;
        }
        if let Some(n) = parsed("FARM_MAX_ACCRUAL_HOURS") {
            self.farm.max_accrual_hours = n;
        }

        // Payments
        if let Some(n) = parsed("PAYMENTS_MIN_DEPOSIT") {
            self.payments.min_deposit = n;
        }
        if let Some(n) = parsed("PAYMENTS_MAX_DEPOSIT") {
            self.payments.max_deposit = n;
        }
        if let Some(n) = parsed("PAYMENTS_MIN_WITHDRAWAL") {
            self.payments.min_withdrawal = n;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0..10_000).contains(&self.games.house_edge_bp) {
            return Err("games.house_edge_bp must be within [0, 10000)".into());
        }
        if !(0..=10_000).contains(&self.jackpot.contribution_bp) {
            return Err("jackpot.contribution_bp must be within [0, 10000]".into());
        }
        if self.jackpot.seed < 0 {
            return Err("jackpot.seed must not be negative".into());
        }
        if self.games.min_bet <= 0 || self.games.max_bet < self.games.min_bet {
            return Err("games.min_bet / games.max_bet are inconsistent".into());
        }
        if self.farm.max_level < 1 || self.farm.cat_price <= 0 || self.farm.max_accrual_hours <= 0
        {
            return Err("farm settings must be positive".into());
        }
        if self.payments.min_deposit <= 0 || self.payments.max_deposit < self.payments.min_deposit
        {
            return Err("payments.min_deposit / payments.max_deposit are inconsistent".into());
        }
        Ok(())
    }
}

/// 逗号分隔的列表
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

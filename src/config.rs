use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_connect_timeout: Duration,
    pub auth: AuthConfig,
}

/// Token signing settings shared by the login service and the principal extractor.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("APP_PORT", 3000);
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 10);
        let db_connect_timeout = Duration::from_secs(parse_or("DB_CONNECT_TIMEOUT_SECS", 8));
        let auth = AuthConfig::from_env()?;
        Ok(Self {
            port,
            database_url,
            host,
            db_max_connections,
            db_connect_timeout,
            auth,
        })
    }
}

impl AuthConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        Ok(Self {
            jwt_secret,
            token_ttl_hours: parse_or("JWT_TTL_HOURS", 24),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub mail: Option<MailConfig>,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origin and base of password reset links.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

fn default_port() -> u16 { 5000 }
fn default_frontend_url() -> String { "http://localhost:3001".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// A Postgres URL, or `memory` for the in-process store.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == "memory"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_seconds: u64,
}

fn default_jwt_expiration() -> u64 { 7 * 24 * 60 * 60 }

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub max_requests: i64,
    pub window_seconds: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 100, window_seconds: 15 * 60 }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. WAYFARE__AUTH__JWT_SECRET
            .add_source(config::Environment::with_prefix("WAYFARE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_checked_in_defaults_parse() {
        let config = parse(include_str!("../../config/default.toml"));
        assert_eq!(config.server.port, 5000);
        assert!(config.mail.is_none());
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.auth.jwt_expiration_seconds, 604800);
    }

    #[test]
    fn test_optional_sections() {
        let config = parse(
            r#"
            [server]
            port = 8080
            [database]
            url = "memory"
            [auth]
            jwt_secret = "s3cret"
            [mail]
            smtp_host = "smtp.example.com"
            username = "bot"
            password = "pw"
            from = "Wayfare <bot@example.com>"
            "#,
        );
        assert!(config.database.is_memory());
        assert_eq!(config.server.port, 8080);
        assert!(config.redis.is_none());
        assert_eq!(config.server.frontend_url, "http://localhost:3001");
        assert_eq!(config.mail.unwrap().smtp_host, "smtp.example.com");
        assert_eq!(config.rate_limit.window_seconds, 900);
    }
}

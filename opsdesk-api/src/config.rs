/// Environment-driven server configuration
///
/// Everything the server needs arrives through environment variables
/// (a `.env` file is honored in development):
///
/// - `DATABASE_URL` (required) and `DATABASE_MAX_CONNECTIONS` (default 10)
/// - `API_HOST` / `API_PORT` (default 0.0.0.0:8080)
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `COOKIE_SECURE`: mark session cookies Secure + SameSite=None, for
///   cross-origin HTTPS deployments (default false)
/// - `CORS_ORIGINS`: comma-separated allowed origins, or `*` (default `*`)

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// HTTP surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` means permissive (development)
    pub cors_origins: Vec<String>,

    /// Whether session cookies carry Secure + SameSite=None
    ///
    /// Required when the SPA is served from a different origin over HTTPS.
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token signing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret; generate with `openssl rand -hex 32`
    pub secret: String,
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("{} environment variable is required", name))
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing, a numeric
    /// variable does not parse, or the session secret is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let cookie_secure = matches!(
            env::var("COOKIE_SECURE").as_deref(),
            Ok("true") | Ok("1")
        );

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parsed_or("API_PORT", 8080)?,
                cors_origins,
                cookie_secure,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig { secret: jwt_secret },
        })
    }

    /// The address the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_address_joins_host_and_port() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 9090,
                cors_origins: vec!["*".to_string()],
                cookie_secure: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/opsdesk_test".to_string(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: "0123456789abcdef0123456789abcdef".to_string(),
            },
        };

        assert_eq!(config.bind_address(), "127.0.0.1:9090");
    }
}

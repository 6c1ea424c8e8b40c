use std::env;
use tracing::warn;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Runtime configuration, read from the environment once at startup and
/// passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    /// Base URL the terminal client talks to, e.g. `http://127.0.0.1:8080/api`.
    pub api_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });
        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}/api", host, port));

        Self {
            host,
            port,
            jwt_secret,
            token_ttl_secs,
            api_base_url,
        }
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

//! Server configuration from environment variables.

use std::env;

/// Default port, matching the web client's expectation.
pub const DEFAULT_PORT: u16 = 8080;

/// Default lifetime of issued tokens.
pub const DEFAULT_JWT_EXPIRY_HOURS: u64 = 24;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// Token lifetime in hours.
    pub jwt_expiry_hours: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables, after reading a `.env`
    /// file from the working directory if one exists.
    ///
    /// Required:
    /// - `JWT_SECRET`: Token signing secret
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 8080)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `JWT_EXPIRY_HOURS`: Token lifetime (default: 24)
    ///
    /// The database settings are read separately by `StoreConfig::from_env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "JWT_SECRET".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let port = match env::var("PORT") {
            Ok(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("not a port number: {s}"),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cors_allowed_origins =
            env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string());

        let jwt_expiry_hours = env::var("JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_JWT_EXPIRY_HOURS);

        Ok(Self {
            port,
            log_level,
            cors_allowed_origins,
            jwt_secret,
            jwt_expiry_hours,
        })
    }

    /// Configuration with defaults and the given signing secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            cors_allowed_origins: "*".to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
        }
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .finish()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

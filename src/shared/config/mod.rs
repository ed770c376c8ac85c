//! Application configuration module
//!
//! Configuration is assembled in three layers, later layers winning:
//!
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. An optional TOML file named by the `IMAGEHUB_CONFIG` environment variable
//! 3. Individual environment variables (`.env` is loaded by the binary)
//!
//! The result is checked by `AppConfig::validate`; any error is fatal at
//! startup. Tests build configurations with `AppConfig::builder()`.
//!
//! # Example
//!
//! ```rust
//! use imagehub::shared::config::AppConfig;
//!
//! let config = AppConfig::builder()
//!     .jwt_secret("test-secret")
//!     .bcrypt_cost(4)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.auth.access_token_ttl_secs, 15 * 60);
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional TOML configuration file
pub const CONFIG_FILE_ENV: &str = "IMAGEHUB_CONFIG";

/// Signing algorithm for session tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum JwtAlgorithm {
    #[default]
    HS256,
    HS512,
}

impl std::str::FromStr for JwtAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(JwtAlgorithm::HS256),
            "HS512" => Ok(JwtAlgorithm::HS512),
            other => Err(ConfigError::InvalidValue {
                key: "JWT_ALGORITHM",
                message: format!("unsupported algorithm '{}'", other),
            }),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// PostgreSQL URL; `None` runs against the in-memory store
    pub database_url: Option<String>,
    pub auth: AuthConfig,
    /// SMTP settings; `None` logs outgoing mail instead of sending it
    pub mail: Option<MailConfig>,
    /// Cloudinary credentials; `None` keeps uploads in process memory
    pub cloudinary: Option<CloudinaryConfig>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL, used in links sent by email
    pub public_url: String,
    /// Largest accepted request body (multipart uploads included)
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            public_url: "http://localhost:8000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Token and password settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: JwtAlgorithm,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub email_token_ttl_secs: i64,
    pub password_reset_ttl_secs: i64,
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: JwtAlgorithm::HS256,
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60,
            email_token_ttl_secs: 24 * 60 * 60,
            password_reset_ttl_secs: 60 * 60,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("email_token_ttl_secs", &self.email_token_ttl_secs)
            .field("password_reset_ttl_secs", &self.password_reset_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// SMTP relay settings
#[derive(Clone, Deserialize)]
pub struct MailConfig {
    pub host: String,
    #[serde(default = "default_mail_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    #[serde(default = "default_mail_from_name")]
    pub from_name: String,
}

fn default_mail_port() -> u16 {
    465
}

fn default_mail_from_name() -> String {
    "ImageHub".to_string()
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

/// Cloudinary account settings
#[derive(Clone, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// REST API base, overridable for tests
    #[serde(default = "default_cloudinary_api")]
    pub api_base_url: String,
    /// Delivery (CDN) base used to build transformation URLs
    #[serde(default = "default_cloudinary_delivery")]
    pub delivery_base_url: String,
    /// Top-level folder for uploaded originals
    #[serde(default = "default_cloudinary_folder")]
    pub upload_folder: String,
}

fn default_cloudinary_api() -> String {
    "https://api.cloudinary.com".to_string()
}

fn default_cloudinary_delivery() -> String {
    "https://res.cloudinary.com".to_string()
}

fn default_cloudinary_folder() -> String {
    "ImageHubProjectDB".to_string()
}

impl CloudinaryConfig {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base_url: default_cloudinary_api(),
            delivery_base_url: default_cloudinary_delivery(),
            upload_folder: default_cloudinary_folder(),
        }
    }
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_base_url", &self.api_base_url)
            .field("upload_folder", &self.upload_folder)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the optional TOML file and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Overlay values returned by `lookup` (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("SERVER_PORT") {
            self.server.port = parse_number("SERVER_PORT", &port)?;
        }
        if let Some(url) = var("PUBLIC_URL") {
            self.server.public_url = url;
        }
        if let Some(bytes) = var("MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = parse_number("MAX_UPLOAD_BYTES", &bytes)?;
        }
        if let Some(url) = var("DATABASE_URL") {
            self.database_url = Some(url);
        }

        if let Some(secret) = var("JWT_SECRET").or_else(|| var("SECRET_KEY_JWT")) {
            self.auth.jwt_secret = secret;
        }
        if let Some(alg) = var("JWT_ALGORITHM").or_else(|| var("ALGORITHM")) {
            self.auth.jwt_algorithm = alg.parse()?;
        }
        if let Some(ttl) = var("ACCESS_TOKEN_TTL_SECS") {
            self.auth.access_token_ttl_secs = parse_number("ACCESS_TOKEN_TTL_SECS", &ttl)?;
        }
        if let Some(ttl) = var("REFRESH_TOKEN_TTL_SECS") {
            self.auth.refresh_token_ttl_secs = parse_number("REFRESH_TOKEN_TTL_SECS", &ttl)?;
        }
        if let Some(cost) = var("BCRYPT_COST") {
            self.auth.bcrypt_cost = parse_number("BCRYPT_COST", &cost)?;
        }

        if let Some(host) = var("MAIL_SERVER") {
            let mail = self.mail.get_or_insert_with(|| MailConfig {
                host: String::new(),
                port: default_mail_port(),
                username: String::new(),
                password: String::new(),
                from: String::new(),
                from_name: default_mail_from_name(),
            });
            mail.host = host;
            if let Some(port) = var("MAIL_PORT") {
                mail.port = parse_number("MAIL_PORT", &port)?;
            }
            if let Some(username) = var("MAIL_USERNAME") {
                mail.username = username;
            }
            if let Some(password) = var("MAIL_PASSWORD") {
                mail.password = password;
            }
            if let Some(from) = var("MAIL_FROM") {
                mail.from = from;
            }
            if let Some(name) = var("MAIL_FROM_NAME") {
                mail.from_name = name;
            }
        }

        if let Some(cloud_name) = var("CLD_NAME") {
            let cloudinary = self
                .cloudinary
                .get_or_insert_with(|| CloudinaryConfig::new("", "", ""));
            cloudinary.cloud_name = cloud_name;
            if let Some(key) = var("CLD_API_KEY") {
                cloudinary.api_key = key;
            }
            if let Some(secret) = var("CLD_API_SECRET") {
                cloudinary.api_secret = secret;
            }
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.auth.access_token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "ACCESS_TOKEN_TTL_SECS",
                message: "must be positive".to_string(),
            });
        }
        if self.auth.refresh_token_ttl_secs <= self.auth.access_token_ttl_secs {
            return Err(ConfigError::InvalidValue {
                key: "REFRESH_TOKEN_TTL_SECS",
                message: "must be longer than the access token lifetime".to_string(),
            });
        }
        if self.auth.email_token_ttl_secs <= 0 || self.auth.password_reset_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "auth",
                message: "email and password-reset token lifetimes must be positive".to_string(),
            });
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                message: "must be between 4 and 31".to_string(),
            });
        }
        let public_url = &self.server.public_url;
        if !(public_url.starts_with("http://") || public_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(public_url.clone()));
        }
        if let Some(mail) = &self.mail {
            for (key, value) in [
                ("MAIL_SERVER", &mail.host),
                ("MAIL_USERNAME", &mail.username),
                ("MAIL_PASSWORD", &mail.password),
                ("MAIL_FROM", &mail.from),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::MissingValue(key));
                }
            }
        }
        if let Some(cloudinary) = &self.cloudinary {
            for (key, value) in [
                ("CLD_NAME", &cloudinary.cloud_name),
                ("CLD_API_KEY", &cloudinary.api_key),
                ("CLD_API_SECRET", &cloudinary.api_secret),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::MissingValue(key));
                }
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        message: format!("'{}' is not a valid number", raw),
    })
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.auth.jwt_secret = secret.into();
        self
    }

    pub fn jwt_algorithm(mut self, algorithm: JwtAlgorithm) -> Self {
        self.config.auth.jwt_algorithm = algorithm;
        self
    }

    /// Access and refresh token lifetimes, in seconds
    pub fn token_ttls(mut self, access_secs: i64, refresh_secs: i64) -> Self {
        self.config.auth.access_token_ttl_secs = access_secs;
        self.config.auth.refresh_token_ttl_secs = refresh_secs;
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.config.auth.bcrypt_cost = cost;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn public_url(mut self, url: impl Into<String>) -> Self {
        self.config.server.public_url = url.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn mail(mut self, mail: MailConfig) -> Self {
        self.config.mail = Some(mail);
        self
    }

    pub fn cloudinary(mut self, cloudinary: CloudinaryConfig) -> Self {
        self.config.cloudinary = Some(cloudinary);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("failed to read config file {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to parse config file: {0}")]
    Parse(String),
}

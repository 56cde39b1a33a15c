use serde::{Deserialize, Serialize};
use std::env;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Errors raised while assembling configuration at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub otp: OtpConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub connection: DatabaseConnection,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Where the credential store lives. Either a full URL or discrete parts.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseConnection {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: Option<String>,
        name: String,
    },
}

// Keep credentials out of logs
impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseConnection::Url(_) => f.write_str("Url(<redacted>)"),
            DatabaseConnection::Parts { host, port, user, name, .. } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("name", name)
                .finish(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub password_reset_expiry_minutes: u64,
    pub enable_cors: bool,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("password_reset_expiry_minutes", &self.password_reset_expiry_minutes)
            .field("enable_cors", &self.enable_cors)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    pub ttl_secs: u64,
    pub max_attempts: u32,
    pub sms: SmsProvider,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SmsProvider {
    /// Write the message to the log instead of sending it
    Log,
    Twilio {
        account_sid: String,
        auth_token: String,
        from: String,
    },
}

impl std::fmt::Debug for SmsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmsProvider::Log => f.write_str("Log"),
            SmsProvider::Twilio { account_sid, from, .. } => f
                .debug_struct("Twilio")
                .field("account_sid", account_sid)
                .field("from", from)
                .finish(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let jwt_secret = required(&lookup, "JWT_SECRET")?;
        let connection = database_connection(&lookup)?;

        // Set defaults based on environment, then override with specific env vars
        let defaults = match environment {
            Environment::Production => Self::production(jwt_secret, connection),
            Environment::Staging => Self::staging(jwt_secret, connection),
            Environment::Development => Self::development(jwt_secret, connection),
        };

        defaults.with_env_overrides(&lookup)
    }

    fn with_env_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse("PORT", &v)?;
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_in_range("DATABASE_MAX_CONNECTIONS", &v, 1..=1_000)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_in_range("DATABASE_CONNECTION_TIMEOUT", &v, 1..=3_600)?;
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            // One year at most
            self.security.jwt_expiry_hours = parse_in_range("SECURITY_JWT_EXPIRY_HOURS", &v, 1..=8_760)?;
        }
        if let Some(v) = lookup("SECURITY_BCRYPT_COST") {
            // bcrypt accepts 4..=31
            self.security.bcrypt_cost = parse_in_range("SECURITY_BCRYPT_COST", &v, 4..=31)?;
        }
        if let Some(v) = lookup("SECURITY_PASSWORD_RESET_EXPIRY_MINUTES") {
            self.security.password_reset_expiry_minutes =
                parse_in_range("SECURITY_PASSWORD_RESET_EXPIRY_MINUTES", &v, 1..=1_440)?;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse("SECURITY_ENABLE_CORS", &v)?;
        }

        // OTP overrides
        if let Some(v) = lookup("OTP_TTL_SECS") {
            self.otp.ttl_secs = parse_in_range("OTP_TTL_SECS", &v, 1..=86_400)?;
        }
        if let Some(v) = lookup("OTP_MAX_ATTEMPTS") {
            self.otp.max_attempts = parse_in_range("OTP_MAX_ATTEMPTS", &v, 1..=100)?;
        }
        match lookup("SMS_PROVIDER").as_deref() {
            None | Some("log") => {}
            Some("twilio") => {
                self.otp.sms = SmsProvider::Twilio {
                    account_sid: required(lookup, "TWILIO_ACCOUNT_SID")?,
                    auth_token: required(lookup, "TWILIO_AUTH_TOKEN")?,
                    from: required(lookup, "TWILIO_FROM")?,
                };
            }
            Some(other) => {
                return Err(ConfigError::Invalid { name: "SMS_PROVIDER", value: other.to_string() });
            }
        }

        Ok(self)
    }

    fn development(jwt_secret: String, connection: DatabaseConnection) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 8080 },
            database: DatabaseConfig {
                connection,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                password_reset_expiry_minutes: 15,
                enable_cors: true,
            },
            otp: OtpConfig { ttl_secs: 300, max_attempts: 5, sms: SmsProvider::Log },
        }
    }

    fn staging(jwt_secret: String, connection: DatabaseConnection) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 8080 },
            database: DatabaseConfig {
                connection,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                password_reset_expiry_minutes: 15,
                enable_cors: true,
            },
            otp: OtpConfig { ttl_secs: 300, max_attempts: 5, sms: SmsProvider::Log },
        }
    }

    fn production(jwt_secret: String, connection: DatabaseConnection) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 8080 },
            database: DatabaseConfig {
                connection,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                password_reset_expiry_minutes: 15,
                enable_cors: false,
            },
            otp: OtpConfig { ttl_secs: 180, max_attempts: 3, sms: SmsProvider::Log },
        }
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value: value.to_string() })
}

/// Parse and reject anything outside `range`
fn parse_in_range<T>(name: &'static str, value: &str, range: RangeInclusive<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd,
{
    let parsed: T = parse(name, value)?;
    if !range.contains(&parsed) {
        return Err(ConfigError::Invalid { name, value: value.to_string() });
    }
    Ok(parsed)
}

fn database_connection<F>(lookup: &F) -> Result<DatabaseConnection, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
        return Ok(DatabaseConnection::Url(url));
    }

    let port = match lookup("DB_PORT") {
        Some(v) => parse("DB_PORT", &v)?,
        None => 5432,
    };

    Ok(DatabaseConnection::Parts {
        host: required(lookup, "DB_HOST")?,
        port,
        user: required(lookup, "DB_USER")?,
        password: lookup("DB_PASS"),
        name: required(lookup, "DB_NAME")?,
    })
}

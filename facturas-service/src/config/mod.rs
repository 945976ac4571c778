use secrecy::SecretString;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub tenancy: TenancyConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// The two credential pairs of the application: the admin, free to pick any
/// workspace per request, and the client, locked to one.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub admin_email: String,
    pub admin_password: SecretString,
    pub client_email: String,
    pub client_password: SecretString,
    pub client_workspace_id: i64,
    pub jwt_secret: SecretString,
    #[serde(default = "default_token_expiry_minutes")]
    pub access_token_expiry_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TenancyConfig {
    #[serde(default = "default_workspace_id")]
    pub default_workspace_id: i64,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        TenancyConfig {
            default_workspace_id: default_workspace_id(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TelemetryConfig {
    pub otlp_endpoint: Option<String>,
}

fn default_service_name() -> String {
    "facturas-service".to_string()
}

fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_token_expiry_minutes() -> i64 {
    60
}

fn default_workspace_id() -> i64 {
    1
}

impl AppConfig {
    /// Load from the optional `configuration` file plus `APP__`-prefixed
    /// environment variables (e.g. `APP__DATABASE__URL`).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

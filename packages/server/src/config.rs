use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally visible base URL, used to build absolute file links.
    pub public_url: String,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Insert the default institution list when the table is empty.
    #[serde(default = "default_true")]
    pub seed_institutions: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Require `X-CSRF-Token` on cookie-authenticated state-changing requests.
    #[serde(default = "default_true")]
    pub csrf_protection: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub root: std::path::PathBuf,
    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_true")]
    pub starttls: bool,
}

fn default_true() -> bool {
    true
}
fn default_session_ttl_hours() -> i64 {
    24 * 14
}
fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}
fn default_smtp_host() -> String {
    "localhost".into()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_from_address() -> String {
    "InternHub <noreply@internhub.local>".into()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from_address: default_from_address(),
            starttls: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.public_url", "http://127.0.0.1:3000")?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.root", "./media")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., INTERNHUB__AUTH__JWT_SECRET)
            .add_source(
                Environment::with_prefix("INTERNHUB")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}

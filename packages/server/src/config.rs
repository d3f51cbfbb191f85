use common::notify::smtp::SmtpConfig;
use common::notify::sns::SnsConfig;
use common::storage::s3::S3Config;
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
    pub cors: CorsConfig,
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Pool bounds, sized for a small marketplace deployment by default.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Which notification transport to construct at startup. Both deliver
/// plain subject+body; callers hold a `dyn NotificationChannel` and never
/// see the difference.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifyChannelKind {
    Smtp,
    Sns,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    pub channel: NotifyChannelKind,
    pub smtp: Option<SmtpConfig>,
    pub sns: Option<SnsConfig>,
    /// Destination for the admin "New User Registration" notification:
    /// a topic ARN for SNS, an email address for SMTP. Optional; when
    /// unset, registration skips the admin notification.
    pub admin_recipient: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: S3Config,
    pub notify: NotifyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("notify.channel", "sns")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., AUTOVERSE__STORAGE__BUCKET)
            .add_source(Environment::with_prefix("AUTOVERSE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

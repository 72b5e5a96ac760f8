use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "MEHFIL_ENV";
const CONFIG_DIR_ENV: &str = "MEHFIL_CONFIG_DIR";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub site: SiteSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub images: ImagesSettings,
    #[serde(default)]
    pub payments: PaymentsSettings,
    #[serde(default)]
    pub instagram: InstagramSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|_| std::env::current_dir().map(|cwd| cwd.join("config")))
            .with_context(|| "unable to resolve configuration directory")?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{environment}.toml"));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(config::Environment::with_prefix("MEHFIL").separator("_"));

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        // Override environment field with parsed enum variant.
        settings.environment = match environment.as_str() {
            "local" => Environment::Local,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(anyhow!(
                    "unsupported environment '{}'; expected local/staging/production",
                    other
                ));
            }
        };

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Document store endpoint; `memory://` selects the in-process engine.
    #[serde(default = "DatabaseSettings::default_endpoint")]
    pub endpoint: String,
    #[serde(default = "DatabaseSettings::default_database")]
    pub database: String,
}

impl DatabaseSettings {
    fn default_endpoint() -> String {
        "memory://local".to_string()
    }

    fn default_database() -> String {
        "mehfil".to_string()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            database: Self::default_database(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Public identity of the site; the RSS feed links back through `base_url`.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    #[serde(default = "SiteSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "SiteSettings::default_title")]
    pub title: String,
    #[serde(default = "SiteSettings::default_description")]
    pub description: String,
}

impl SiteSettings {
    fn default_base_url() -> String {
        "https://mehfil.example.com".to_string()
    }

    fn default_title() -> String {
        "Mehfil".to_string()
    }

    fn default_description() -> String {
        "Poems, poets, and shows".to_string()
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            title: Self::default_title(),
            description: Self::default_description(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "AuthSettings::default_session_cookie")]
    pub session_cookie: String,
    #[serde(default = "AuthSettings::default_session_ttl_secs")]
    pub session_ttl_secs: i64,
}

impl AuthSettings {
    fn default_session_cookie() -> String {
        "mehfil_session".to_string()
    }

    fn default_session_ttl_secs() -> i64 {
        // 14 days, the identity provider's maximum session length.
        14 * 24 * 60 * 60
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_cookie: Self::default_session_cookie(),
            session_ttl_secs: Self::default_session_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySettings {
    #[serde(default = "IdentitySettings::default_verify_url")]
    pub verify_url: String,
}

impl IdentitySettings {
    fn default_verify_url() -> String {
        "https://identity.example.com/v1/verify".to_string()
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            verify_url: Self::default_verify_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesSettings {
    #[serde(default = "ImagesSettings::default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
}

impl ImagesSettings {
    fn default_endpoint() -> String {
        "https://images.example.com/upload".to_string()
    }
}

impl Default for ImagesSettings {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            api_key: String::new(),
        }
    }
}

/// Payment gateway credentials; the gateway itself validates the hash.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsSettings {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub salt: String,
    #[serde(default = "PaymentsSettings::default_action_url")]
    pub action_url: String,
}

impl PaymentsSettings {
    fn default_action_url() -> String {
        "https://secure.payu.in/_payment".to_string()
    }
}

impl Default for PaymentsSettings {
    fn default() -> Self {
        Self {
            key: String::new(),
            salt: String::new(),
            action_url: Self::default_action_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstagramSettings {
    #[serde(default = "InstagramSettings::default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "InstagramSettings::default_max_items")]
    pub max_items: usize,
    #[serde(default = "InstagramSettings::default_max_page_fetches")]
    pub max_page_fetches: usize,
}

impl InstagramSettings {
    fn default_api_url() -> String {
        "https://graph.instagram.com".to_string()
    }

    fn default_max_items() -> usize {
        1000
    }

    /// Loop-safety bound on page fetches per request.
    fn default_max_page_fetches() -> usize {
        25
    }
}

impl Default for InstagramSettings {
    fn default() -> Self {
        Self {
            api_url: Self::default_api_url(),
            access_token: String::new(),
            max_items: Self::default_max_items(),
            max_page_fetches: Self::default_max_page_fetches(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
        assert_eq!(settings.server.port, 8080);
        assert!(settings.database.endpoint.starts_with("memory://"));
        assert_eq!(settings.auth.session_cookie, "mehfil_session");
        assert_eq!(settings.instagram.max_page_fetches, 25);
        assert_eq!(settings.instagram.max_items, 1000);
    }
}

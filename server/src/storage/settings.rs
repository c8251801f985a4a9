//! Settings file management

use serde::{Deserialize, Serialize};

use crate::logs::LogLevel;

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Host the API binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the API listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment pipeline configuration
    #[serde(default)]
    pub deploy: DeploySettings,

    /// Reaper worker configuration
    #[serde(default)]
    pub reaper: ReaperSettings,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            host: default_host(),
            port: default_port(),
            deploy: DeploySettings::default(),
            reaper: ReaperSettings::default(),
        }
    }
}

/// Deployment pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploySettings {
    /// Port deployed applications are served on
    #[serde(default = "default_serve_port")]
    pub serve_port: u16,

    /// Embed the access token in the clone URL instead of the
    /// env-based credential header transport
    #[serde(default)]
    pub embed_credentials: bool,

    /// Primary install command
    #[serde(default = "default_install_primary")]
    pub install_primary: Vec<String>,

    /// Fallback install command, tried exactly once
    #[serde(default = "default_install_secondary")]
    pub install_secondary: Vec<String>,

    /// Readiness probe attempts before giving up
    #[serde(default = "default_readiness_attempts")]
    pub readiness_attempts: u32,

    /// Base delay between readiness probes, in milliseconds
    #[serde(default = "default_readiness_base_delay_ms")]
    pub readiness_base_delay_ms: u64,
}

fn default_serve_port() -> u16 {
    5000
}

fn default_install_primary() -> Vec<String> {
    vec!["npm".to_string(), "install".to_string()]
}

fn default_install_secondary() -> Vec<String> {
    vec!["yarn".to_string()]
}

fn default_readiness_attempts() -> u32 {
    10
}

fn default_readiness_base_delay_ms() -> u64 {
    250
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            serve_port: default_serve_port(),
            embed_credentials: false,
            install_primary: default_install_primary(),
            install_secondary: default_install_secondary(),
            readiness_attempts: default_readiness_attempts(),
            readiness_base_delay_ms: default_readiness_base_delay_ms(),
        }
    }
}

/// Reaper worker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaperSettings {
    /// Sweep interval in seconds
    #[serde(default = "default_reaper_interval")]
    pub interval_secs: u64,

    /// Deployment time-to-live in seconds
    #[serde(default = "default_deployment_ttl")]
    pub ttl_secs: u64,
}

fn default_reaper_interval() -> u64 {
    60
}

fn default_deployment_ttl() -> u64 {
    3600
}

impl Default for ReaperSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_reaper_interval(),
            ttl_secs: default_deployment_ttl(),
        }
    }
}

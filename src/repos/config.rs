use std::env;
use std::fs;
use std::path::PathBuf;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Relay configuration, loaded once in `main` and handed to the relay state.
/// File values win over environment variables; the API key has no baked-in
/// default and its absence is reported per request, not at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SluiceConfig {
    #[serde(default)]
    pub deepseek_api_key: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub upstream_url: Option<String>,
    #[serde(default)]
    pub cors_allow_origin: Option<String>,
}

impl Default for SluiceConfig {
    fn default() -> Self {
        SluiceConfig {
            deepseek_api_key: None,
            port: Some(3020),
            upstream_url: Some("https://api.deepseek.com".to_string()),
            cors_allow_origin: Some("*".to_string()),
        }
    }
}

fn get_sluice_config_path() -> PathBuf {
    let mut path = config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sluice");
    path.push("sluice.toml");
    path
}

impl SluiceConfig {
    pub fn load() -> SluiceConfig {
        let path = get_sluice_config_path();
        info!("Loading config from {}", path.display());
        if path.exists() {
            let content = fs::read_to_string(&path).unwrap_or_default();
            toml::from_str(&content).unwrap_or_default()
        } else {
            // Create the directory and file, and write defaults
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let default = SluiceConfig::default();
            let toml_str = toml::to_string_pretty(&default).unwrap_or_default();
            let _ = fs::write(&path, toml_str);
            default
        }
    }

    pub fn api_key(&self) -> Option<String> {
        self.deepseek_api_key
            .clone()
            .or_else(|| env::var("DEEPSEEK_API_KEY").ok())
            .filter(|key| !key.is_empty())
    }

    pub fn port(&self) -> u16 {
        self.port
            .or_else(|| env::var("SLUICE_PORT").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(3020)
    }

    pub fn upstream_url(&self) -> String {
        self.upstream_url
            .clone()
            .or_else(|| env::var("SLUICE_UPSTREAM_URL").ok())
            .unwrap_or_else(|| "https://api.deepseek.com".to_string())
    }

    /// Which origin the relay answers for. The wildcard default keeps the
    /// relay open to any caller; operators narrow it here.
    pub fn cors_allow_origin(&self) -> String {
        self.cors_allow_origin
            .clone()
            .unwrap_or_else(|| "*".to_string())
    }
}

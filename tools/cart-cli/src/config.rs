//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use turbo_cart::StoreConfig;

/// CLI configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Directory holding the saved cart.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// Root of the storefront API serving `/stock/:id` and `/products/:id`.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// JSON fixtures file used instead of the API.
    #[serde(default)]
    pub fixtures: Option<String>,

    /// Cart store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

fn default_storage_dir() -> String {
    ".turbo-cart".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            api_base_url: None,
            fixtures: None,
            store: StoreConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(path, &content)
    }

    /// Parse config text; `path` picks the format by extension.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content).with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }
}

/// Generate a commented default config file.
pub fn generate_default_config() -> String {
    r#"# TurboCart configuration

# Where the cart is saved between runs
storage_dir = ".turbo-cart"

# Storefront API serving /stock/:id and /products/:id
# api_base_url = "http://localhost:3333"

# Offline catalog, used when no API is configured
# fixtures = "server.json"

[store]
storage_key = "@RocketShoes:cart"
# service_timeout_ms = 5000
"#
    .to_string()
}

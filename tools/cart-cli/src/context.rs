//! CLI execution context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use turbo_cache::FileStore;
use turbo_cart::{CartStore, Fixtures, HttpApi, InMemoryCatalog};

use crate::config::CliConfig;
use crate::output::Output;

/// File names searched for, in order, in each directory up to the root.
pub const CONFIG_NAMES: [&str; 3] = ["cart.toml", ".cart.toml", "cart.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            match find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        if let Some(ref path) = config_path {
            output.debug(&format!("Using config: {}", path.display()));
        }

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Open the cart store described by the configuration.
    ///
    /// The storefront API is used when `api_base_url` is set, otherwise the
    /// fixtures file.
    pub fn open_store(&self) -> Result<CartStore> {
        let storage_dir = self.resolve_path(&self.config.storage_dir);
        let storage = FileStore::open(&storage_dir)
            .with_context(|| format!("Failed to open cart storage: {}", storage_dir.display()))?;
        let store_config = self.config.store.clone();

        if let Some(ref base_url) = self.config.api_base_url {
            self.output.debug(&format!("Catalog: {}", base_url));
            let timeout = store_config
                .service_timeout()
                .unwrap_or(Duration::from_secs(10));
            let api = HttpApi::with_timeout(base_url.as_str(), timeout)
                .context("Failed to build HTTP client")?;
            return Ok(CartStore::open_with_config(
                storage,
                api.clone(),
                api,
                store_config,
            ));
        }

        if let Some(ref fixtures) = self.config.fixtures {
            let path = self.resolve_path(fixtures);
            self.output.debug(&format!("Catalog: {}", path.display()));
            let fixtures = Fixtures::load(&path)
                .with_context(|| format!("Failed to load fixtures: {}", path.display()))?;
            let catalog = InMemoryCatalog::from_fixtures(fixtures);
            return Ok(CartStore::open_with_config(
                storage,
                catalog.clone(),
                catalog,
                store_config,
            ));
        }

        bail!("No catalog configured. Set `api_base_url` or `fixtures`, or pass --fixtures.")
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find a config file in the directory tree.
fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                    return Some((config, config_path));
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

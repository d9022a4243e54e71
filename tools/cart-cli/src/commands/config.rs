//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match ctx.config_path {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.info("No config file found, using defaults"),
    }

    ctx.output.kv("storage_dir", &ctx.config.storage_dir);
    ctx.output.kv(
        "api_base_url",
        ctx.config.api_base_url.as_deref().unwrap_or("(none)"),
    );
    ctx.output
        .kv("fixtures", ctx.config.fixtures.as_deref().unwrap_or("(none)"));

    // Store section
    ctx.output.info("");
    ctx.output.info("[store]");
    ctx.output.kv("storage_key", &ctx.config.store.storage_key);
    ctx.output.kv(
        "service_timeout_ms",
        &ctx.config
            .store
            .service_timeout_ms
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| "(none)".to_string()),
    );
    ctx.output.kv(
        "notification_capacity",
        &ctx.config.store.notification_capacity.to_string(),
    );

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

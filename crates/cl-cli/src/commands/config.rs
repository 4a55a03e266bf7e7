//! Config command
//!
//! Inspect and reset the comment-lottery configuration.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::fs;

use cl_core::config::Config;

use super::AppContext;

const REDACTED: &str = "<redacted>";

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration (the cookie is redacted)
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the configuration file path
    Path,

    /// Reset to default configuration
    Reset {
        /// Force reset without confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, ctx: &AppContext) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(ctx, json),
        ConfigCommand::Path => {
            println!("{}", ctx.config_store.path().display());
            Ok(())
        }
        ConfigCommand::Reset { force } => reset_config(ctx, force),
    }
}

/// Copy of `config` safe to print
fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.auth.cookie.is_some() {
        shown.auth.cookie = Some(REDACTED.to_string());
    }
    if let Some(cache) = shown.auth.key_cache.as_mut() {
        cache.credential_fingerprint = REDACTED.to_string();
    }
    shown
}

fn show_config(ctx: &AppContext, as_json: bool) -> Result<()> {
    let config = ctx
        .config_store
        .load()
        .context("Failed to load configuration")?;
    let shown = redacted(&config);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    let location = ctx.config_store.path().display().to_string();
    if ctx.config_store.exists() {
        println!("{}", location.dimmed());
    } else {
        println!("{} {}", location.dimmed(), "(not created yet, showing defaults)".yellow());
    }
    println!();
    println!("{}", toml::to_string_pretty(&shown)?);

    Ok(())
}

fn reset_config(ctx: &AppContext, force: bool) -> Result<()> {
    let config_path = ctx.config_store.path();

    if !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt("Reset configuration to defaults? This also forgets the cookie")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    if config_path.exists() {
        let backup_path = format!(
            "{}.backup-{}",
            config_path.display(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        fs::copy(config_path, &backup_path)
            .with_context(|| format!("Failed to back up {}", config_path.display()))?;
        println!("{} Backed up to {}", "✓".green(), backup_path);
    }

    ctx.config_store
        .save(&Config::default())
        .context("Failed to write configuration")?;

    println!("{} Configuration reset to defaults.", "✓".green());

    Ok(())
}

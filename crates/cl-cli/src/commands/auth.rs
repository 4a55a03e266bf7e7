//! Auth command
//!
//! Store, check and forget the login cookie.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::io::Read;

use cl_core::api::Endpoints;
use cl_integration::verification::missing_cookies;
use cl_integration::{verify_login, ReqwestHttpClient};

use super::AppContext;

/// Auth subcommands
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store the Cookie header of a logged-in browser session
    SetCookie {
        /// Cookie header value, or '-' to read it from stdin
        cookie: String,
    },

    /// Check the stored cookie against the service
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget the stored cookie and cached signing keys
    Logout,
}

/// Execute the auth command
pub fn execute(cmd: AuthCommand, ctx: &AppContext) -> Result<()> {
    match cmd {
        AuthCommand::SetCookie { cookie } => set_cookie(ctx, &cookie),
        AuthCommand::Status { json } => status(ctx, json),
        AuthCommand::Logout => logout(ctx),
    }
}

fn read_cookie(arg: &str) -> Result<String> {
    let raw = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read cookie from stdin")?;
        buf
    } else {
        arg.to_string()
    };

    let cookie = raw.trim();
    if cookie.is_empty() {
        bail!("Cookie is empty");
    }
    Ok(cookie.to_string())
}

fn set_cookie(ctx: &AppContext, arg: &str) -> Result<()> {
    let cookie = read_cookie(arg)?;

    for name in missing_cookies(&cookie) {
        eprintln!(
            "{} Cookie has no {} entry; draws will likely fail",
            "⚠".yellow(),
            name
        );
    }

    ctx.config_store
        .patch(|config| config.auth.set_cookie(Some(cookie)))
        .context("Failed to save cookie")?;

    println!(
        "{} Cookie saved to {}",
        "✓".green(),
        ctx.config_store.path().display()
    );
    println!(
        "Run '{}' to check it.",
        "comment-lottery auth status".cyan()
    );
    Ok(())
}

fn status(ctx: &AppContext, as_json: bool) -> Result<()> {
    let config = ctx
        .config_store
        .load()
        .context("Failed to load configuration")?;

    let http = ReqwestHttpClient::new(&config.http, config.auth.cookie())
        .context("Failed to build HTTP client")?;
    let endpoints = Endpoints::from_config(&config.http);
    let result = super::runtime()?.block_on(verify_login(
        &http,
        &endpoints,
        &config.auth,
        chrono::Utc::now(),
    ));

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.logged_in {
        println!(
            "{} Logged in as {} (UID: {})",
            "✓".green(),
            result.uname.as_deref().unwrap_or("?").bold(),
            result.uid.as_deref().unwrap_or("?")
        );
    } else {
        println!("{} Not logged in", "✗".red());
    }

    for issue in &result.issues {
        println!("  {} {}", "⚠".yellow(), issue);
    }

    Ok(())
}

fn logout(ctx: &AppContext) -> Result<()> {
    if !ctx.config_store.exists() {
        println!("No configuration file; nothing to forget.");
        return Ok(());
    }

    ctx.config_store
        .patch(|config| config.auth.set_cookie(None))
        .context("Failed to update configuration")?;

    println!("{} Cookie and cached signing keys removed.", "✓".green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie_trims() {
        assert_eq!(read_cookie("  SESSDATA=a; b=c \n").unwrap(), "SESSDATA=a; b=c");
    }

    #[test]
    fn test_read_cookie_rejects_blank() {
        assert!(read_cookie("   ").is_err());
    }
}

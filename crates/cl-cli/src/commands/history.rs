//! History command
//!
//! Browse and prune past draws.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use cl_core::draw::{DrawRecord, DrawStorage};
use cl_core::types::DrawId;

use super::AppContext;

/// History subcommands
#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List stored draws, newest first
    List {
        /// Limit number of draws
        #[arg(long, short, default_value = "10")]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a draw
    Show {
        /// Draw ID, or 'latest'
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a draw
    Delete {
        /// Draw ID
        id: String,

        /// Skip confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

/// Execute the history command
pub fn execute(cmd: HistoryCommand, ctx: &AppContext) -> Result<()> {
    let storage = ctx.draw_storage()?;

    match cmd {
        HistoryCommand::List { limit, json } => list_draws(&storage, limit, json),
        HistoryCommand::Show { id, json } => show_draw(&storage, &id, json),
        HistoryCommand::Delete { id, yes } => delete_draw(&storage, &id, yes),
    }
}

fn age(created_at: chrono::DateTime<chrono::Utc>) -> String {
    let hours = chrono::Utc::now()
        .signed_duration_since(created_at)
        .num_hours();
    if hours < 1 {
        "just now".to_string()
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", hours / 24)
    }
}

fn list_draws(storage: &impl DrawStorage, limit: usize, as_json: bool) -> Result<()> {
    let draws: Vec<_> = storage.list()?.into_iter().take(limit).collect();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&draws)?);
        return Ok(());
    }

    if draws.is_empty() {
        println!("No draws found.");
        return Ok(());
    }

    println!("{}", "Draws:".bold().underline());
    println!();

    for info in &draws {
        println!(
            "  {} oid={} type={}: {} of {} matched, {} winners ({})",
            info.id.to_string().green(),
            info.oid,
            info.kind,
            info.matched_count,
            info.candidate_count,
            info.winner_count,
            age(info.created_at).dimmed()
        );
    }

    Ok(())
}

fn resolve(storage: &impl DrawStorage, id: &str) -> Result<DrawRecord> {
    if id == "latest" {
        return storage.latest()?.context("No draws found");
    }
    let id = DrawId::from_string(id)?;
    storage
        .load(&id)
        .with_context(|| format!("Failed to load draw {}", id))
}

fn show_draw(storage: &impl DrawStorage, id: &str, as_json: bool) -> Result<()> {
    let record = resolve(storage, id)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("{} {}", "Draw".bold().underline(), record.id.to_string().green());
    println!();
    println!(
        "  Created:    {}",
        record
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    println!("  Post:       {}", record.query);
    println!("  Filter:     {}", record.criteria.describe());
    println!(
        "  Candidates: {} found, {} matched",
        record.candidate_count, record.matched_count
    );
    println!(
        "  Winners:    {} of {} requested",
        record.winners.len(),
        record.requested_winners
    );
    println!();

    for winner in &record.winners {
        println!(
            "  {} {} (UID: {})",
            "★".yellow(),
            winner.display_name.green(),
            winner.uid
        );
    }

    Ok(())
}

fn delete_draw(storage: &impl DrawStorage, id: &str, yes: bool) -> Result<()> {
    let id = DrawId::from_string(id)?;

    if !storage.exists(&id) {
        anyhow::bail!("Draw not found: {}", id);
    }

    if !yes {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(format!("Delete draw {}?", id))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Delete cancelled.");
            return Ok(());
        }
    }

    storage.delete(&id)?;
    println!("{} Draw {} deleted.", "✓".green(), id);

    Ok(())
}

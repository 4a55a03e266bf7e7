//! Draw command
//!
//! Fetch every comment under a post, filter the commenters and draw winners.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use cl_core::api::{HttpClient, SignedClient};
use cl_core::candidate::{fetch_candidates_with_progress, RelationEnricher};
use cl_core::config::Config;
use cl_core::draw::{clamp_winner_count, draw, DrawRecord, DrawStorage};
use cl_core::filter::filter_candidates;
use cl_core::types::{Candidate, CommentQuery, FilterCriteria, Relation};
use cl_integration::Session;

use super::AppContext;

/// Arguments for the draw command
#[derive(Debug, Args)]
pub struct DrawArgs {
    /// Post id (oid)
    pub oid: String,

    /// Post type (1 video, 11 picture post, 17 text post, ...)
    #[arg(value_name = "TYPE")]
    pub kind: String,

    /// Sort mode: 0/3 hot only, 1 hot + time, 2 time only [default: from config]
    pub mode: Option<String>,

    /// Keep candidates with this relation (none|follow|fan|mutual or 0-3); repeatable
    #[arg(short, long = "relation", value_name = "RELATION")]
    pub relations: Vec<Relation>,

    /// Keep only candidates whose comment the post owner liked
    #[arg(long)]
    pub liked_by_up: bool,

    /// Keep only candidates whose comment you liked
    #[arg(long)]
    pub liked_by_self: bool,

    /// Number of winners [default: from config]
    #[arg(short = 'n', long)]
    pub winners: Option<usize>,

    /// Skip relation lookups even when filtering by relation
    #[arg(long)]
    pub no_enrich: bool,

    /// Never prompt; use flags and configured defaults
    #[arg(long)]
    pub non_interactive: bool,

    /// Do not store the draw in the history
    #[arg(long)]
    pub no_save: bool,

    /// Print the draw record as JSON
    #[arg(long)]
    pub json: bool,
}

impl DrawArgs {
    fn has_filter_flags(&self) -> bool {
        !self.relations.is_empty() || self.liked_by_up || self.liked_by_self
    }

    fn criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::new();
        for relation in &self.relations {
            criteria = criteria.with_relation(*relation);
        }
        if self.liked_by_up {
            criteria = criteria.liked_by_up();
        }
        if self.liked_by_self {
            criteria = criteria.liked_by_self();
        }
        criteria
    }

    fn query(&self, config: &Config) -> CommentQuery {
        CommentQuery::new(&self.oid, &self.kind)
            .with_mode(self.mode.clone().unwrap_or_else(|| config.draw.default_mode.clone()))
    }
}

/// Execute the draw command
pub fn execute(args: DrawArgs, ctx: &AppContext) -> Result<()> {
    let config = ctx
        .config_store
        .load()
        .context("Failed to load configuration")?;
    let interactive =
        !args.non_interactive && !args.json && console::Term::stdout().is_term();

    let record = super::runtime()?.block_on(run_draw(&args, &config, ctx, interactive))?;
    let Some(record) = record else {
        return Ok(());
    };

    if !args.no_save {
        let storage = ctx.draw_storage()?;
        storage.save(&record).context("Failed to save draw")?;
        if !args.json {
            println!(
                "\n{} Draw saved as {}",
                "✓".green(),
                record.id.to_string().cyan()
            );
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }

    Ok(())
}

async fn run_draw(
    args: &DrawArgs,
    config: &Config,
    ctx: &AppContext,
    interactive: bool,
) -> Result<Option<DrawRecord>> {
    let quiet = args.json;
    let query = args.query(config);

    let session = Session::open(config)
        .await
        .context("Failed to open session")?;
    if let Some(cache) = session.refreshed_key_cache() {
        if let Err(e) = ctx
            .config_store
            .patch(|c| c.auth.key_cache = Some(cache.clone()))
        {
            tracing::warn!("Could not persist signing keys: {}", e);
        }
    }
    let client = session.client();

    let spinner = progress_spinner(quiet);
    spinner.set_message(format!("Fetching comments ({})", query));
    let candidates = fetch_candidates_with_progress(client, &query, |page: usize, count: usize| {
        spinner.set_message(format!("Fetched {} pages, {} candidates", page, count));
    })
    .await
    .context("Failed to fetch comments")?;
    spinner.finish_and_clear();

    if !quiet {
        println!(
            "Loaded {} unique candidates.",
            candidates.len().to_string().cyan()
        );
    }
    let candidate_count = candidates.len();

    let criteria = if args.has_filter_flags() || !interactive {
        args.criteria()
    } else {
        prompt_criteria()?
    };

    let candidates = if criteria.needs_relations() && !args.no_enrich {
        let spinner = progress_spinner(quiet);
        spinner.set_message(format!("Resolving relations for {} candidates", candidate_count));
        let candidates =
            resolve_relations(client, candidates, config.http.max_concurrent_lookups).await;
        spinner.finish_and_clear();
        candidates
    } else {
        candidates
    };

    let split = filter_candidates(candidates, &criteria);
    if split.matched.is_empty() {
        if !quiet {
            println!("No candidates matched the filter criteria ({}).", criteria.describe());
        }
        return Ok(None);
    }

    if !quiet {
        println!();
        println!(
            "{} ({}):",
            "Matched candidates".bold().underline(),
            criteria.describe()
        );
        for candidate in &split.matched {
            print_candidate(candidate);
        }
        println!();
    }

    let requested = match args.winners {
        Some(n) => n,
        None if interactive => prompt_winner_count(config.draw.default_winners)?,
        None => config.draw.default_winners,
    };
    let matched_count = split.matched.len();
    let winners = draw(split.matched, requested);
    if winners.len() != requested {
        tracing::info!(
            requested,
            drawn = clamp_winner_count(requested, matched_count),
            "Winner count clamped"
        );
    }

    if !quiet {
        println!("{}", "Winners".bold().underline());
        for winner in &winners {
            println!(
                "  {} Congratulations to {} (UID: {})!",
                "★".yellow(),
                winner.display_name.green().bold(),
                winner.uid
            );
        }
    }

    Ok(Some(DrawRecord::new(
        query,
        criteria,
        candidate_count,
        matched_count,
        requested,
        winners,
    )))
}

/// Look up every candidate's relation. Failed lookups keep the candidate's
/// previous relation and are only logged.
async fn resolve_relations<C: HttpClient>(
    client: &SignedClient<C>,
    candidates: Vec<Candidate>,
    max_concurrent: usize,
) -> Vec<Candidate> {
    let (candidates, report) = RelationEnricher::new(client)
        .with_max_concurrent(max_concurrent)
        .enrich(candidates)
        .await;
    if report.failed > 0 {
        tracing::info!(
            failed = report.failed,
            resolved = report.resolved,
            "Some relation lookups failed"
        );
    }
    candidates
}

fn progress_spinner(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_candidate(candidate: &Candidate) {
    let mut marks = Vec::new();
    if candidate.relation != Relation::None {
        marks.push(candidate.relation.to_string());
    }
    if candidate.liked_by_up {
        marks.push("liked by UP".to_string());
    }
    if candidate.liked_by_self {
        marks.push("liked by me".to_string());
    }

    let marks = if marks.is_empty() {
        String::new()
    } else {
        format!(" [{}]", marks.join(", "))
    };
    println!(
        "  - {} (UID: {}){}",
        candidate.display_name,
        candidate.uid,
        marks.dimmed()
    );
}

fn prompt_criteria() -> Result<FilterCriteria> {
    use dialoguer::{Confirm, Select};

    println!("Please choose filters:");
    let items = [
        "no filter",
        "0 = none",
        "1 = follow",
        "2 = fan",
        "3 = mutual",
    ];
    let choice = Select::new()
        .with_prompt("Relation filter")
        .items(&items)
        .default(0)
        .interact()?;

    let mut criteria = FilterCriteria::new();
    if choice > 0 {
        criteria = criteria.with_relation(Relation::ALL[choice - 1]);
    }

    if Confirm::new()
        .with_prompt("Keep only users liked by the UP?")
        .default(false)
        .interact()?
    {
        criteria = criteria.liked_by_up();
    }

    if Confirm::new()
        .with_prompt("Keep only comments you liked?")
        .default(false)
        .interact()?
    {
        criteria = criteria.liked_by_self();
    }

    Ok(criteria)
}

fn prompt_winner_count(default: usize) -> Result<usize> {
    let count = dialoguer::Input::<usize>::new()
        .with_prompt("Number of winners")
        .default(default)
        .interact_text()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: DrawArgs,
    }

    fn parse(argv: &[&str]) -> DrawArgs {
        let mut full = vec!["draw"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_criteria_from_flags() {
        let args = parse(&["123", "11", "-r", "fan", "--relation", "3", "--liked-by-up"]);
        assert!(args.has_filter_flags());

        let criteria = args.criteria();
        assert_eq!(
            criteria,
            FilterCriteria::new()
                .with_relation(Relation::Fan)
                .with_relation(Relation::Mutual)
                .liked_by_up()
        );
    }

    #[test]
    fn test_mode_defaults_from_config() {
        let mut config = Config::default();
        let args = parse(&["123", "11"]);
        assert!(!args.has_filter_flags());
        assert_eq!(args.query(&config), CommentQuery::new("123", "11"));

        config.draw.default_mode = "3".to_string();
        assert_eq!(args.query(&config).mode, "3");

        let args = parse(&["123", "11", "1", "-n", "4"]);
        assert_eq!(args.query(&config).mode, "1");
        assert_eq!(args.winners, Some(4));
    }

    #[tokio::test]
    async fn test_failed_lookups_keep_previous_relation() {
        use cl_core::api::mock::ScriptedHttpClient;
        use cl_core::api::Endpoints;
        use cl_core::error::LotteryError;
        use cl_core::signing::{RequestSigner, SigningContext};
        use serde_json::json;

        let http = ScriptedHttpClient::new().route("/x/space/wbi/acc/relation", |request| {
            match request.param("mid") {
                Some("1") => Ok(json!({
                    "code": 0,
                    "message": "0",
                    "data": {
                        "relation": {"attribute": 2},
                        "be_relation": {"attribute": 0}
                    }
                })),
                _ => Err(LotteryError::Transport("timed out".to_string())),
            }
        });
        let context = SigningContext::new(
            "7cd084941338484aae1ad9425b84077c",
            "4932caff0ff746eab6f01bf08b70ac45",
        )
        .unwrap();
        let client = SignedClient::new(http, RequestSigner::new(context), Endpoints::default());

        let candidates = vec![
            Candidate::new("1", "a", ""),
            Candidate::new("2", "b", "").with_relation(Relation::Fan),
            Candidate::new("3", "c", ""),
        ];
        let resolved = resolve_relations(&client, candidates, 2).await;

        let relations: Vec<Relation> = resolved.iter().map(|c| c.relation).collect();
        assert_eq!(relations, vec![Relation::Follow, Relation::Fan, Relation::None]);
        assert_eq!(client.http().count("/x/space/wbi/acc/relation"), 3);
    }

    #[test]
    fn test_invalid_relation_rejected() {
        let result = TestCli::try_parse_from(["draw", "1", "1", "--relation", "friend"]);
        assert!(result.is_err());
    }
}

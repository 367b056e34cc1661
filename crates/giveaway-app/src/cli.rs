// Command-line interface: argument definitions and command execution.
//
// Commands return the text meant for stdout so the binary stays a thin
// wrapper and tests can drive whole runs.

use crate::config::{self, Config};
use crate::post::Shortcode;
use crate::report;
use crate::source;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use giveaway_core::{aggregate_with, draw_winner, RandomSource, RngSource, Tally};
use std::path::{Path, PathBuf};
use tracing::info;

/// Tally recipe-link giveaway entries from a post's comments and draw a winner.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: config/giveaway.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute participants and probabilities, writing CSV and JSON reports
    Tally(TallyArgs),
    /// Pick one weighted random winner
    Draw(DrawArgs),
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct CountingArgs {
    /// Count only unique recipe IDs per user across all comments
    #[arg(long)]
    pub dedupe_recipes_per_user: bool,

    /// Count each recipe link in a comment as an entry (ignored with --dedupe-recipes-per-user)
    #[arg(long)]
    pub count_multiple_links_per_comment: bool,
}

#[derive(Args, Debug)]
pub struct TallyArgs {
    /// Comment dump (JSON array, or JSON Lines with .jsonl/.ndjson)
    #[arg(long)]
    pub comments: PathBuf,

    /// Post URL of the giveaway, e.g. https://www.instagram.com/p/SHORTCODE/
    #[arg(long)]
    pub post_url: Option<String>,

    #[command(flatten)]
    pub counting: CountingArgs,

    /// Path to write the CSV summary
    #[arg(long)]
    pub out_csv: Option<PathBuf>,

    /// Path to write the JSON details
    #[arg(long)]
    pub out_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DrawArgs {
    /// Comment dump to tally before drawing
    #[arg(long, required_unless_present = "participants", conflicts_with = "participants")]
    pub comments: Option<PathBuf>,

    /// JSON report from a previous tally run
    #[arg(long)]
    pub participants: Option<PathBuf>,

    /// Post URL of the giveaway, shown in the output
    #[arg(long)]
    pub post_url: Option<String>,

    /// Count only unique recipe IDs per user (requires --comments)
    #[arg(long, conflicts_with = "participants")]
    pub dedupe_recipes_per_user: bool,

    /// Count each recipe link in a comment as an entry (requires --comments)
    #[arg(long, conflicts_with = "participants")]
    pub count_multiple_links_per_comment: bool,

    /// Seed for a reproducible draw (default: fresh entropy)
    #[arg(long)]
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run a parsed command line and return its console output.
pub fn run(cli: Cli) -> anyhow::Result<String> {
    let config =
        config::load_config(cli.config.as_deref()).context("failed to load configuration")?;
    match cli.command {
        Command::Tally(args) => run_tally(&config, args),
        Command::Draw(args) => run_draw(&config, args),
    }
}

fn parse_post(post_url: Option<&str>) -> anyhow::Result<Option<Shortcode>> {
    post_url
        .map(Shortcode::from_post_url)
        .transpose()
        .context("invalid --post-url")
}

/// Load and aggregate a comment dump with the configured mode.
fn tally_comments(config: &Config, counting: CountingArgs, path: &Path) -> anyhow::Result<Tally> {
    let flags = config::CountingConfig {
        count_multiple_links_per_comment: config.counting.count_multiple_links_per_comment
            || counting.count_multiple_links_per_comment,
        dedupe_recipes_per_user: config.counting.dedupe_recipes_per_user
            || counting.dedupe_recipes_per_user,
    };
    let extractor = config.links.extractor()?;
    let loaded = source::load_comments(path).context("failed to load comments")?;
    Ok(aggregate_with(
        &loaded.records,
        flags.mode(),
        &extractor,
        chrono::Utc::now(),
    ))
}

fn run_tally(config: &Config, args: TallyArgs) -> anyhow::Result<String> {
    let post = parse_post(args.post_url.as_deref())?;
    let tally = tally_comments(config, args.counting, &args.comments)?;

    let out_csv = args
        .out_csv
        .unwrap_or_else(|| PathBuf::from(&config.output.csv));
    let out_json = args
        .out_json
        .unwrap_or_else(|| PathBuf::from(&config.output.json));
    report::write_csv(&out_csv, &tally)?;
    report::write_json(&out_json, &tally)?;
    info!(
        "Wrote {} participants to {} and {}",
        tally.len(),
        out_csv.display(),
        out_json.display()
    );

    let mut out = report::render_table(&tally, post.as_ref());
    out.push('\n');
    out.push_str(&format!("Wrote CSV: {}\n", out_csv.display()));
    out.push_str(&format!("Wrote JSON: {}\n", out_json.display()));
    Ok(out)
}

fn run_draw(config: &Config, args: DrawArgs) -> anyhow::Result<String> {
    let post = parse_post(args.post_url.as_deref())?;
    let tally = match (&args.comments, &args.participants) {
        (Some(comments), _) => {
            let counting = CountingArgs {
                dedupe_recipes_per_user: args.dedupe_recipes_per_user,
                count_multiple_links_per_comment: args.count_multiple_links_per_comment,
            };
            tally_comments(config, counting, comments)?
        }
        (None, Some(participants)) => Tally::from_participants(
            source::load_participants(participants).context("failed to load participants")?,
        ),
        (None, None) => anyhow::bail!("either --comments or --participants is required"),
    };

    let mut source: Box<dyn RandomSource> = match args.seed {
        Some(seed) => {
            info!("Drawing with fixed seed {}", seed);
            Box::new(RngSource::seeded(seed))
        }
        None => Box::new(RngSource::from_entropy()),
    };
    let winner = draw_winner(&tally, source.as_mut());

    let mut out = String::new();
    if let Some(code) = &post {
        out.push_str(&format!("Post: {}\n", code.canonical_url()));
    }
    out.push_str(&report::render_winner(winner.as_ref()));
    Ok(out)
}

// Giveaway entry point.
//
// 1. Initialize tracing (log to file, stdout is reserved for reports)
// 2. Parse the command line
// 3. Run the command and print its output

use giveaway_app::cli::{self, Cli};

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    info!("giveaway starting: {:?}", cli.command);

    match cli::run(cli) {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(e) => {
            error!("giveaway failed: {:#}", e);
            Err(e)
        }
    }
}

/// Initialize tracing to log to `logs/giveaway.log`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("giveaway.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("giveaway=info,giveaway_app=info,giveaway_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

//! snipreview - interactive LLM code snippet reviewer
//!
//! Reads code snippets from the terminal, sends them to an LLM provider
//! with a category-specific review prompt, and prints the review. Provider
//! rate limits are handled with a fixed warm-up delay, exponential backoff
//! and a cooldown between reviews.
//!
//! Exit codes:
//!   0 - Session ended normally (Exit, end of input, or Ctrl+C)
//!   1 - Runtime error (configuration, provider setup, terminal I/O),
//!       or a one-shot review (--review-type) failed
//!   2 - Session ended because rate-limit retries were exhausted

mod cli;
mod client;
mod config;
mod models;
mod report;
mod review;
mod session;
#[cfg(test)]
mod testing;
mod ui;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use models::ReviewCategory;
use session::{SessionEnd, SessionLoop};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use ui::TerminalUi;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a .env file
    dotenvy::dotenv().ok();

    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("snipreview v{}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration: {:?}", config.model);

    match run_session(args, config).await {
        Ok(SessionEnd::RetriesExhausted) => std::process::exit(2),
        Ok(SessionEnd::ReviewFailed) => std::process::exit(1),
        Ok(end) => {
            debug!("Session ended: {:?}", end);
            Ok(())
        }
        Err(e) => {
            error!("Session failed: {}", e);
            eprintln!("\nError: {:?}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .snipreview.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to choose the provider, model and display language.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so they never interleave with review text on stdout.
fn init_logging(args: &Args, config: &Config) {
    let level = if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                // Logging is not up yet
                eprintln!("Warning: ignoring {}: {:#}", config::CONFIG_FILE_NAME, e);
                Config::default()
            }
        },
    };

    config.merge_with_args(args);
    Ok(config)
}

/// Build the client and terminal, then run the interactive session.
async fn run_session(args: Args, config: Config) -> Result<SessionEnd> {
    let client = client::build_client(&config.model, args.api_key.clone())
        .context("Failed to set up the review client")?;

    let mut ui = TerminalUi::new(config.display.language.clone());
    let session = SessionLoop::new(&*client);

    let review_category = args
        .review_type
        .as_deref()
        .map(|review_type| review_type.parse::<ReviewCategory>())
        .transpose()?;

    let end = match review_category {
        Some(category) => session.run_once(&mut ui, category).await?,
        None => session.run(&mut ui).await?,
    };

    if end == SessionEnd::RetriesExhausted {
        warn!("Exiting to avoid compounding the provider's rate limit");
    }

    Ok(end)
}

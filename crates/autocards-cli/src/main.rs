//! Command-line runner for autocards.
//!
//! Reads an `autocards.toml`, creates cards from the configured source and
//! delivers them to Anki.

use std::path::PathBuf;
use std::process::ExitCode;

use autocards::config::{DeliveryTarget, ImageKind, SourceKind};
use autocards::{AnkiClient, Config, RunReport};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Arguments
// ============================================================================

/// Create flashcards in bulk from phrases or images and deliver them to Anki.
#[derive(Parser, Debug)]
#[command(name = "autocards")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "autocards.toml")]
    config: PathBuf,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create cards from the source and deliver everything pending
    Run {
        /// Override the configured source
        #[arg(long, value_enum)]
        source: Option<SourceArg>,
    },
    /// List cards created but not yet delivered
    Pending,
    /// Validate the configuration, print a summary and check that AnkiConnect answers
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceArg {
    /// Phrases from the text file
    Text,
    /// Text read from images
    Image,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Text => SourceKind::Text,
            SourceArg::Image => SourceKind::Image,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn run(mut config: Config, source: Option<SourceArg>) -> autocards::Result<()> {
    if let Some(source) = source {
        config.source.kind = source.into();
        config.validate()?;
    }

    info!(
        source = ?config.source.kind,
        target = ?config.delivery.target,
        "starting run"
    );

    let mut automaton = config.automaton()?;
    let report = automaton.run_task().await?;
    print_report(&report);
    Ok(())
}

fn pending(config: &Config) -> autocards::Result<()> {
    let cards = config.card_store().return_sources()?;
    if cards.is_empty() {
        println!("No pending cards.");
        return Ok(());
    }

    println!("{} pending card(s):", cards.len());
    for card in cards {
        println!("  {}  ({})", card.front, card.source);
    }
    Ok(())
}

async fn check(config: &Config) {
    println!("Configuration OK");
    match config.source.kind {
        SourceKind::Text => println!(
            "  source:   text file {}",
            config.resolve(&config.source.text_file).display()
        ),
        SourceKind::Image => {
            let location = match config.image.kind {
                ImageKind::Local => "local folder",
                ImageKind::Drive => "drive folder",
            };
            println!("  source:   images in {} '{}'", location, config.image.folder);
        }
    }
    match config.delivery.target {
        DeliveryTarget::AnkiConnect => {
            println!("  delivery: AnkiConnect at {}", config.anki_connect.url)
        }
        DeliveryTarget::AnkiWeb => println!(
            "  delivery: AnkiWeb via {} ({})",
            config.anki_web.browser, config.anki_web.webdriver_url
        ),
    }
    println!(
        "  deck:     {}",
        config.deck_name().unwrap_or_else(|| "(default)".to_string())
    );
    println!("  store:    {}", config.kv_store().path().display());

    if config.delivery.target == DeliveryTarget::AnkiConnect {
        let c = &config.anki_connect;
        match AnkiClient::with_url(c.url.clone(), c.api_key.clone())
            .version()
            .await
        {
            Ok(version) => println!("  anki:     AnkiConnect v{} reachable", version),
            Err(e) => println!("  anki:     not reachable ({})", e),
        }
    }
}

fn print_report(report: &RunReport) {
    if report.is_empty() {
        println!("Nothing to deliver.");
        return;
    }
    println!(
        "Pending from earlier runs: {}\nCreated: {}\nInserted: {}\nFailed (kept for next run): {}",
        report.pending, report.created, report.inserted, report.failed
    );
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match Config::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!(config = %args.config.display(), "could not load configuration");
            eprintln!("Error: {}: {}", args.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Command::Run { source } => run(config, source).await,
        Command::Pending => pending(&config),
        Command::Check => {
            check(&config).await;
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

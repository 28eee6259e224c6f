use clap::Parser;
use media_unpack::{Cli, CliExtractor, Error, ToolSet, Unpacker};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            report(&e);
            return 1;
        }
    };

    let today = chrono::Local::now().date_naive();
    let root = cli.root_dir();
    let source = config.source_path(&root);
    let dest = config.output_path(&root, today);

    if !source.is_dir() {
        report(&Error::SourceMissing(source));
        return 1;
    }

    let tools = ToolSet::discover(&config.tools);
    if tools.is_empty() {
        report(&Error::NoToolsAvailable);
        return 1;
    }
    info!(tools = ?tools.available(), "extraction tools available");

    let extractor = Arc::new(CliExtractor::from_config(tools, &config.extraction));
    let unpacker = Unpacker::new(config.extraction, extractor);

    match unpacker.run(&source, &dest).await {
        Ok(summary) => {
            for (archive, reason) in &summary.failures {
                warn!(?archive, %reason, "archive kept after failure");
            }
            info!(
                output = ?dest,
                succeeded = summary.stats.succeeded,
                failed = summary.stats.failed,
                "done"
            );
            0
        }
        Err(e) => {
            report(&e);
            1
        }
    }
}

/// `-v` flags win over `RUST_LOG`; without them `RUST_LOG` or `info` applies
fn init_logging(cli: &Cli) {
    let filter = if cli.verbose > 0 {
        EnvFilter::new(cli.log_filter())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn report(e: &Error) {
    error!(error = %e, suggestion = %e.suggestion(), "media-unpack cannot continue");
}

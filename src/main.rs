use bank_sync::utils::error::{ErrorSeverity, SyncError};
use bank_sync::utils::{logger, validation::Validate};
use bank_sync::{CliArgs, RunSummary};
use clap::Parser;

fn exit_code(e: &SyncError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report(summary: &RunSummary, dry_run: bool) {
    for (writer, result) in &summary.written {
        tracing::info!("{}: {}", writer, result.describe(dry_run));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting bank-sync {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Loading configuration from: {}", args.config);

    let config = match args.load_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            tracing::error!("Suggestion: {}", e.recovery_suggestion());
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(exit_code(&e));
        }
    };
    if args.dry_run {
        tracing::info!("DRY RUN MODE - nothing will be sent");
    }

    let engine = config.build_engine(args.dry_run)?;
    let interval = config.interval();

    loop {
        match engine.run().await {
            Ok(summary) => report(&summary, args.dry_run),
            Err(e) => {
                tracing::error!(
                    "Sync run failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

                if interval.is_none() || !e.is_retryable() {
                    eprintln!("{}", e.user_friendly_message());
                    std::process::exit(exit_code(&e));
                }
            }
        }

        match interval {
            Some(delay) => {
                tracing::info!("Waiting {:?} until next run", delay);
                tokio::time::sleep(delay).await;
            }
            None => break,
        }
    }

    Ok(())
}

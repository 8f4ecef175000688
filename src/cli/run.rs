//! Handler for the `run` command.

use tabled::{Table, Tabled};
use tokio::signal;
use tracing::info;

use crate::batch::{
    HistoryTransformer, JobOutcome, JobParameters, JobRunner, SqliteHistorySink,
    SqliteStoreSource, StopToken,
};
use crate::cli::RunArgs;
use crate::db;
use crate::error::{Error, Result};

#[derive(Tabled)]
struct OutcomeRow {
    status: String,
    #[tabled(rename = "items read")]
    items_read: u64,
    #[tabled(rename = "items written")]
    items_written: u64,
    #[tabled(rename = "items skipped")]
    items_skipped: u64,
    #[tabled(rename = "chunks committed")]
    chunks_committed: u64,
    error: String,
}

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_ref())?;

    // Apply CLI overrides
    if let Some(chunk_size) = args.chunk_size {
        config.job.chunk_size = chunk_size;
    }
    if let Some(ref url) = args.database_url {
        config.database.url = url.clone();
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.init_logging();
    info!(
        database = %config.database.url,
        address = %args.address,
        chunk_size = config.job.chunk_size,
        "storebatch starting"
    );

    let pool = db::create_pool(&config.database.url, config.database.pool_size)?;
    db::run_migrations(&pool)?;

    let params = JobParameters::new(args.address.clone()).with_chunk_size(config.job.chunk_size);
    let source = SqliteStoreSource::new(pool.clone(), &params.address, params.chunk_size);
    let sink = SqliteHistorySink::new(pool);

    let stop = StopToken::new();
    let runner = JobRunner::new(params, source, HistoryTransformer::new(), sink)
        .with_skip_policy(config.job.skip_policy())
        .with_write_attempts(config.job.write_attempts)
        .with_stop_token(stop.clone());

    let mut handle = tokio::task::spawn_blocking(move || runner.run());
    let outcome = tokio::select! {
        result = &mut handle => result.map_err(|e| Error::Worker(e.to_string()))?,
        _ = signal::ctrl_c() => {
            info!("shutdown signal received, finishing current chunk");
            stop.request();
            handle.await.map_err(|e| Error::Worker(e.to_string()))?
        }
    };

    report(&outcome, args.json)?;
    info!("storebatch stopped");

    match outcome.error {
        None => Ok(()),
        Some(e) => Err(e.into()),
    }
}

fn report(outcome: &JobOutcome, as_json: bool) -> Result<()> {
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(outcome).map_err(|e| Error::Worker(e.to_string()))?
        );
        return Ok(());
    }

    let row = OutcomeRow {
        status: format!("{:?}", outcome.status),
        items_read: outcome.summary.items_read,
        items_written: outcome.summary.items_written,
        items_skipped: outcome.summary.items_skipped,
        chunks_committed: outcome.summary.chunks_committed,
        error: outcome
            .error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".into()),
    };
    println!("{}", Table::new(vec![row]));
    Ok(())
}

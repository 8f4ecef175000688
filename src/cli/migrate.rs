//! Handler for the `migrate` command.

use tracing::info;

use crate::cli::MigrateArgs;
use crate::db;
use crate::error::Result;

/// Execute the migrate command.
pub fn execute(args: &MigrateArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_ref())?;
    if let Some(ref url) = args.database_url {
        config.database.url = url.clone();
    }

    config.init_logging();

    let pool = db::create_pool(&config.database.url, config.database.pool_size)?;
    db::run_migrations(&pool)?;

    info!(database = %config.database.url, "migrations applied");
    println!("migrations applied to {}", config.database.url);
    Ok(())
}

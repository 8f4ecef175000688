//! Handlers for the `check` subcommands.

use crate::cli::CheckCommand;
use crate::config::Config;
use crate::error::Result;

/// Execute a check command.
pub fn execute(command: &CheckCommand) -> Result<()> {
    match command {
        CheckCommand::Config(args) => {
            let config = Config::load(&args.config)?;
            println!(
                "config ok: database={} chunk_size={} write_attempts={}",
                config.database.url, config.job.chunk_size, config.job.write_attempts
            );
            Ok(())
        }
    }
}

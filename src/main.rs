use clap::Parser;
use storebatch::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Migrate(args) => cli::migrate::execute(args),
        Commands::Check(command) => cli::check::execute(command),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

//! services/api/src/bin/dermascan.rs
//!
//! Command-line client: accounts, analysis submissions and history.

use clap::Parser;
use dermascan_api::{
    cli::{App, Cli},
    config::Config,
    error::ApiError,
    logging,
};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let cli = Cli::parse();

    let config = Config::from_env()?;
    logging::init(config.log_level);
    debug!("Using storage directory {}", config.storage_dir.display());

    let app = App::open(&config).await?;
    let mut stdout = std::io::stdout();
    app.execute(cli.command, &mut stdout).await
}

//! Entry point wiring CLI dispatch to the scoring library.

mod cli;

use anyhow::Result;
use cli::Cli;
use datasheet_eval::{config::Settings, logging};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load()?;
    logging::init_tracing(settings.log_file.as_deref())?;

    info!(?cli, "starting command");
    cli.dispatch(settings)
}

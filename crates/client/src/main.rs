use std::io;

use anyhow::Context;
use clap::Parser;

use pantry_client::PantryList;
use pantry_client::cli::{Cli, run};
use pantry_infra::{PantryDataAccess, StoreConfig};
use pantry_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.plain_logs {
        pantry_observability::init_with(LogFormat::Compact);
    } else {
        pantry_observability::init();
    }

    let config = StoreConfig::from_env().context("invalid store configuration")?;
    let handle = config.connect().context("failed to set up the pantry store")?;
    let list = PantryList::new(PantryDataAccess::new(handle), config.search_debounce);

    run(cli.command, cli.json, &list, &mut io::stdout().lock()).await
}

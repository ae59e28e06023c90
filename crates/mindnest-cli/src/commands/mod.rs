pub mod account;
pub mod activity;
pub mod badges;
pub mod checkin;
pub mod config;
pub mod history;
pub mod reward;
pub mod sentiment;

use mindnest_core::{Config, LedgerDb};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the ledger in the data directory with the saved configuration.
pub fn open_ledger() -> Result<LedgerDb, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing::debug!(?config, "opening ledger");
    Ok(LedgerDb::open_default(&config)?)
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

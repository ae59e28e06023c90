use chrono::Utc;
use clap::Subcommand;

use super::{open_ledger, print_json, CommandResult};

#[derive(Subcommand)]
pub enum AccountAction {
    /// Register the user if new and record a login
    Login {
        /// User identifier
        user: String,
    },
    /// Show coins, streaks and badges
    Show {
        /// User identifier
        user: String,
    },
}

pub fn run(action: AccountAction) -> CommandResult {
    let db = open_ledger()?;
    match action {
        AccountAction::Login { user } => print_json(&db.create_account(&user, Utc::now())?),
        AccountAction::Show { user } => print_json(&db.account(&user)?),
    }
}

use chrono::Utc;
use clap::Subcommand;

use super::{open_ledger, print_json, CommandResult};

#[derive(Subcommand)]
pub enum BadgesAction {
    /// Award any newly qualified badges
    Check {
        /// User identifier
        user: String,
    },
    /// Show the catalog with earned flags
    List {
        /// User identifier
        user: String,
    },
}

pub fn run(action: BadgesAction) -> CommandResult {
    let db = open_ledger()?;
    match action {
        BadgesAction::Check { user } => {
            print_json(&db.check_and_award_badges(&user, Utc::now())?)
        }
        BadgesAction::List { user } => print_json(&db.badge_catalog_for(&user)?),
    }
}

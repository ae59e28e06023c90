use chrono::Utc;
use clap::Subcommand;

use super::{open_ledger, print_json, CommandResult};

#[derive(Subcommand)]
pub enum RewardAction {
    /// Grant coins, limited by the reason's daily cap
    Add {
        /// User identifier
        user: String,
        /// Requested amount
        #[arg(allow_hyphen_values = true)]
        coins: i64,
        /// Reward reason
        #[arg(long, default_value = "daily_challenge")]
        reason: String,
    },
}

pub fn run(action: RewardAction) -> CommandResult {
    let db = open_ledger()?;
    match action {
        RewardAction::Add {
            user,
            coins,
            reason,
        } => {
            let outcome = db.award_coins(&user, coins, &reason, Utc::now())?;
            if outcome.is_cap_reached() {
                eprintln!("daily cap reached for '{reason}'");
            }
            print_json(&outcome)
        }
    }
}

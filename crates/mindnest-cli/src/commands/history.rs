use clap::Args;
use mindnest_core::storage::DEFAULT_HISTORY_LIMIT;

use super::{open_ledger, print_json, CommandResult};

#[derive(Args)]
pub struct HistoryArgs {
    /// User identifier
    user: String,
    /// Maximum number of records, newest first
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    limit: usize,
}

pub fn run(args: HistoryArgs) -> CommandResult {
    let db = open_ledger()?;
    print_json(&db.recent_history(&args.user, args.limit)?)
}

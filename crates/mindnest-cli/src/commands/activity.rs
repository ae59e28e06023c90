use chrono::Utc;
use clap::Args;
use mindnest_core::HistoryKind;

use super::{open_ledger, print_json, CommandResult};

#[derive(Args)]
pub struct ActivityArgs {
    /// User identifier
    user: String,
    /// Activity type: game, video, music, journal, feedback or login
    kind: HistoryKind,
    /// JSON payload stored with the record
    #[arg(long, default_value = "{}")]
    data: String,
}

pub fn run(args: ActivityArgs) -> CommandResult {
    let data: serde_json::Value = serde_json::from_str(&args.data)?;
    if !data.is_object() {
        return Err("--data must be a JSON object".into());
    }
    let db = open_ledger()?;
    print_json(&db.log_activity(&args.user, args.kind, data, Utc::now())?)
}

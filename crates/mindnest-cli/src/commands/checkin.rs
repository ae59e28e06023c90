use chrono::Utc;
use clap::Args;
use mindnest_core::{Config, LedgerDb};
use serde_json::json;

use super::{print_json, CommandResult};

#[derive(Args)]
pub struct CheckinArgs {
    /// User identifier
    user: String,
    /// Mood label (e.g. "Happy", "Anxious")
    #[arg(long)]
    mood: Option<String>,
    /// Free-text note, scored by the sentiment model
    #[arg(long)]
    text: Option<String>,
}

pub fn run(args: CheckinArgs) -> CommandResult {
    let config = Config::load()?;
    let db = LedgerDb::open_default(&config)?;
    let outcome = db.record_check_in(
        &args.user,
        args.mood.as_deref(),
        args.text.as_deref(),
        Utc::now(),
    )?;

    let sentiment = match args.text.as_deref() {
        Some(text) => Some(config.sentiment_service()?.predict(text)),
        None => None,
    };
    print_json(&json!({
        "streak": outcome.streak,
        "coins_awarded": outcome.coins_awarded,
        "coins": outcome.coins,
        "new_badges": outcome.new_badges,
        "sentiment": sentiment,
    }))
}

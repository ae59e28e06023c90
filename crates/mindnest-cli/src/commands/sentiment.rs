use clap::Subcommand;
use mindnest_core::sentiment::seed::seed_examples;
use mindnest_core::{Config, LedgerDb};

use super::{print_json, CommandResult};

#[derive(Subcommand)]
pub enum SentimentAction {
    /// Retrain from check-in, journal and feedback history
    Train {
        /// Also include the built-in starter corpus
        #[arg(long)]
        with_seed: bool,
    },
    /// Train on the built-in starter corpus only
    Seed,
    /// Classify a piece of text
    Predict {
        /// Text to classify
        text: String,
    },
}

pub fn run(action: SentimentAction) -> CommandResult {
    let config = Config::load()?;
    let mut service = config.sentiment_service()?;
    match action {
        SentimentAction::Train { with_seed } => {
            let db = LedgerDb::open_default(&config)?;
            let mut examples = db.training_examples()?;
            if with_seed {
                examples.extend(seed_examples());
            }
            let outcome = service.train(&examples)?;
            if !outcome.trained {
                eprintln!("model not updated");
            }
            print_json(&outcome)
        }
        SentimentAction::Seed => print_json(&service.train(&seed_examples())?),
        SentimentAction::Predict { text } => print_json(&service.predict(&text)),
    }
}

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "mindnest-cli", version, about = "Mindnest CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account registration and lookup
    Account {
        #[command(subcommand)]
        action: commands::account::AccountAction,
    },
    /// Record a daily mood check-in
    Checkin(commands::checkin::CheckinArgs),
    /// Coin rewards
    Reward {
        #[command(subcommand)]
        action: commands::reward::RewardAction,
    },
    /// Badge evaluation and catalog
    Badges {
        #[command(subcommand)]
        action: commands::badges::BadgesAction,
    },
    /// Log a game, video, music, journal or feedback activity
    Activity(commands::activity::ActivityArgs),
    /// Recent history of a user
    History(commands::history::HistoryArgs),
    /// Sentiment model training and prediction
    Sentiment {
        #[command(subcommand)]
        action: commands::sentiment::SentimentAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Account { .. } => "account",
            Commands::Checkin(_) => "checkin",
            Commands::Reward { .. } => "reward",
            Commands::Badges { .. } => "badges",
            Commands::Activity(_) => "activity",
            Commands::History(_) => "history",
            Commands::Sentiment { .. } => "sentiment",
            Commands::Config { .. } => "config",
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = cli.command.name(), "dispatching");
    let result = match cli.command {
        Commands::Account { action } => commands::account::run(action),
        Commands::Checkin(args) => commands::checkin::run(args),
        Commands::Reward { action } => commands::reward::run(action),
        Commands::Badges { action } => commands::badges::run(action),
        Commands::Activity(args) => commands::activity::run(args),
        Commands::History(args) => commands::history::run(args),
        Commands::Sentiment { action } => commands::sentiment::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

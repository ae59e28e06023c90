//! # Mindnest Core Library
//!
//! Reward economy and mood analysis behind the Mindnest wellness app. The
//! `mindnest-cli` binary is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Streaks**: calendar-day streak arithmetic in a configurable UTC offset
//! - **Rewards**: per-reason daily caps applied to coin grants
//! - **Badges**: a static catalog evaluated against account stats
//! - **Sentiment**: a multinomial naive-Bayes text classifier with a JSON model blob
//! - **Storage**: SQLite ledger for accounts, history and badges, TOML configuration
//!
//! ## Key Components
//!
//! - [`LedgerDb`]: transactional check-in, reward and badge operations
//! - [`StreakLedger`]: pure streak computation
//! - [`RewardPolicy`]: daily cap planning
//! - [`SentimentService`]: persisted classifier
//! - [`Config`]: application configuration management

pub mod account;
pub mod badges;
pub mod error;
pub mod history;
pub mod rewards;
pub mod sentiment;
pub mod storage;
pub mod streak;

pub use account::UserAccount;
pub use badges::{BadgeCatalog, BadgeDefinition, BadgeStats, EarnedBadge};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use history::{HistoryKind, HistoryRecord};
pub use rewards::{RewardOutcome, RewardPolicy, RewardStatus};
pub use sentiment::{
    Prediction, SentimentClassifier, SentimentExample, SentimentLabel, SentimentService,
};
pub use storage::{CheckInOutcome, Config, LedgerDb, LedgerSettings};
pub use streak::{StreakLedger, StreakState, StreakUpdate};

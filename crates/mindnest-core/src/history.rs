//! Append-only activity history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Kind of a history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Checkin,
    Reward,
    Login,
    Game,
    Video,
    Music,
    Feedback,
    Journal,
}

impl HistoryKind {
    pub const ALL: [HistoryKind; 8] = [
        HistoryKind::Checkin,
        HistoryKind::Reward,
        HistoryKind::Login,
        HistoryKind::Game,
        HistoryKind::Video,
        HistoryKind::Music,
        HistoryKind::Feedback,
        HistoryKind::Journal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryKind::Checkin => "checkin",
            HistoryKind::Reward => "reward",
            HistoryKind::Login => "login",
            HistoryKind::Game => "game",
            HistoryKind::Video => "video",
            HistoryKind::Music => "music",
            HistoryKind::Feedback => "feedback",
            HistoryKind::Journal => "journal",
        }
    }

    /// Activities that pay out activity coins when logged.
    pub fn earns_activity_coins(&self) -> bool {
        matches!(self, HistoryKind::Game | HistoryKind::Video)
    }

    /// Kinds whose `data.text` can serve as classifier training input.
    pub fn carries_training_text(&self) -> bool {
        matches!(
            self,
            HistoryKind::Checkin | HistoryKind::Journal | HistoryKind::Feedback
        )
    }
}

impl fmt::Display for HistoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HistoryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "type".to_string(),
                message: format!("unknown history type '{s}'"),
            })
    }
}

/// One immutable history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

//! Reward-related view of a user account.

use serde::{Deserialize, Serialize};

use crate::badges::{BadgeStats, EarnedBadge};
use crate::streak::StreakState;

/// Coins, streaks and badges of one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: String,
    pub coins: i64,
    pub streaks: StreakState,
    pub badges: Vec<EarnedBadge>,
}

impl UserAccount {
    /// Stats snapshot read by badge predicates.
    pub fn badge_stats(&self) -> BadgeStats {
        BadgeStats {
            current_streak: self.streaks.current,
            longest_streak: self.streaks.longest,
            coins: self.coins,
        }
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }
}

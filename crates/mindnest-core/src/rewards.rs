//! Coin reward planning with per-reason daily caps.
//!
//! [`RewardPolicy::plan`] is pure: given the amount already granted today for
//! a reason it decides how much of a request may be paid out. The storage
//! layer sums today's granted amounts from history and applies the plan in
//! the same transaction (see [`crate::storage::LedgerDb::award_coins`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;

/// Reason used for the daily challenge reward.
pub const REASON_DAILY_CHALLENGE: &str = "daily_challenge";

/// Reason used for coins granted by a new daily check-in.
pub const REASON_CHECKIN: &str = "checkin";

/// Default daily cap for [`REASON_DAILY_CHALLENGE`].
pub const DAILY_CHALLENGE_CAP: i64 = 25;

/// How a reward request was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStatus {
    /// The full requested amount was granted.
    Granted,
    /// The cap allowed only part of the request.
    Partial,
    /// Nothing was granted; today's allowance for the reason is used up.
    CapReached,
}

/// Amount to grant for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardPlan {
    pub requested: i64,
    pub awarded: i64,
    pub status: RewardStatus,
    /// Cap that applied to the reason, if any.
    pub cap: Option<i64>,
}

/// Committed result of a reward request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardOutcome {
    pub awarded: i64,
    pub new_balance: i64,
    pub status: RewardStatus,
}

impl RewardOutcome {
    pub fn is_cap_reached(&self) -> bool {
        self.status == RewardStatus::CapReached
    }
}

/// Daily cap table keyed by reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    caps: BTreeMap<String, i64>,
    default_daily_cap: Option<i64>,
}

impl RewardPolicy {
    /// Policy with the stock caps (`daily_challenge` = 25, everything else uncapped).
    pub fn new() -> Self {
        Self::uncapped().with_cap(REASON_DAILY_CHALLENGE, DAILY_CHALLENGE_CAP)
    }

    /// Policy without any caps.
    pub fn uncapped() -> Self {
        Self {
            caps: BTreeMap::new(),
            default_daily_cap: None,
        }
    }

    pub fn from_caps(caps: BTreeMap<String, i64>, default_daily_cap: Option<i64>) -> Self {
        Self {
            caps,
            default_daily_cap,
        }
    }

    pub fn with_cap(mut self, reason: impl Into<String>, cap: i64) -> Self {
        self.caps.insert(reason.into(), cap);
        self
    }

    /// Cap applied to reasons missing from the table.
    pub fn with_default_cap(mut self, cap: Option<i64>) -> Self {
        self.default_daily_cap = cap;
        self
    }

    /// Daily cap for `reason`, falling back to the default cap.
    ///
    /// Check-in coins only fall under an explicit `checkin` entry; the
    /// default cap never shrinks them.
    pub fn cap_for(&self, reason: &str) -> Option<i64> {
        match self.caps.get(reason) {
            Some(cap) => Some(*cap),
            None if reason == REASON_CHECKIN => None,
            None => self.default_daily_cap,
        }
    }

    /// Decide how much of `requested` may be granted given what was already
    /// granted today for the same reason.
    ///
    /// # Errors
    /// Returns a validation error for a non-positive amount or a blank reason.
    pub fn plan(
        &self,
        requested: i64,
        reason: &str,
        granted_today: i64,
    ) -> Result<AwardPlan, ValidationError> {
        validate_request(requested, reason)?;

        let cap = self.cap_for(reason);
        let awarded = match cap {
            None => requested,
            Some(cap) => requested.min(cap.saturating_sub(granted_today).max(0)),
        };
        let status = if awarded == 0 {
            RewardStatus::CapReached
        } else if awarded < requested {
            RewardStatus::Partial
        } else {
            RewardStatus::Granted
        };

        Ok(AwardPlan {
            requested,
            awarded,
            status,
            cap,
        })
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject non-positive amounts and blank reasons.
pub fn validate_request(requested: i64, reason: &str) -> Result<(), ValidationError> {
    if requested <= 0 {
        return Err(ValidationError::NonPositiveAmount { amount: requested });
    }
    if reason.trim().is_empty() {
        return Err(ValidationError::MissingField("reason"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_reason_grants_everything() {
        let policy = RewardPolicy::new();
        let plan = policy.plan(500, "game", 10_000).unwrap();
        assert_eq!(plan.awarded, 500);
        assert_eq!(plan.status, RewardStatus::Granted);
        assert_eq!(plan.cap, None);
    }

    #[test]
    fn daily_challenge_sequence_is_10_10_5_0() {
        let policy = RewardPolicy::new();
        let mut granted = 0;
        let mut awarded = Vec::new();
        for _ in 0..4 {
            let plan = policy.plan(10, REASON_DAILY_CHALLENGE, granted).unwrap();
            granted += plan.awarded;
            awarded.push((plan.awarded, plan.status));
        }
        assert_eq!(
            awarded,
            vec![
                (10, RewardStatus::Granted),
                (10, RewardStatus::Granted),
                (5, RewardStatus::Partial),
                (0, RewardStatus::CapReached),
            ]
        );
    }

    #[test]
    fn over_granted_history_never_goes_negative() {
        let policy = RewardPolicy::uncapped().with_cap("bonus", 10);
        let plan = policy.plan(3, "bonus", 50).unwrap();
        assert_eq!(plan.awarded, 0);
        assert_eq!(plan.status, RewardStatus::CapReached);
    }

    #[test]
    fn default_cap_applies_to_unlisted_reasons() {
        let policy = RewardPolicy::new().with_default_cap(Some(100));
        assert_eq!(policy.cap_for("game"), Some(100));
        assert_eq!(policy.cap_for(REASON_DAILY_CHALLENGE), Some(25));
        assert_eq!(policy.plan(80, "game", 40).unwrap().awarded, 60);
    }

    #[test]
    fn default_cap_leaves_checkin_coins_alone() {
        let policy = RewardPolicy::new().with_default_cap(Some(2));
        assert_eq!(policy.cap_for(REASON_CHECKIN), None);
        assert_eq!(policy.plan(5, REASON_CHECKIN, 0).unwrap().awarded, 5);

        let explicit = policy.with_cap(REASON_CHECKIN, 3);
        assert_eq!(explicit.plan(5, REASON_CHECKIN, 0).unwrap().awarded, 3);
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        let policy = RewardPolicy::new();
        assert!(matches!(
            policy.plan(0, "game", 0),
            Err(ValidationError::NonPositiveAmount { amount: 0 })
        ));
        assert!(matches!(
            policy.plan(-5, "game", 0),
            Err(ValidationError::NonPositiveAmount { amount: -5 })
        ));
    }

    #[test]
    fn rejects_blank_reason() {
        assert!(matches!(
            validate_request(5, "  "),
            Err(ValidationError::MissingField("reason"))
        ));
    }
}

//! Day-granularity check-in streaks.
//!
//! The ledger is a pure function over the stored streak snapshot and the
//! instant of the new check-in. Instants are reduced to calendar days in a
//! fixed UTC offset for comparison only; callers store the full timestamp.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Streak fields of a user account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current: u32,
    pub longest: u32,
    pub last_check_in: Option<DateTime<Utc>>,
}

/// Result of applying one check-in to a [`StreakState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub current: u32,
    pub longest: u32,
    /// False when the user already checked in on the same calendar day.
    pub is_new_check_in_today: bool,
    /// The stored check-in lies on a later day than `now`.
    pub clock_skew: bool,
}

/// Computes streak transitions in a fixed calendar offset.
#[derive(Debug, Clone, Copy)]
pub struct StreakLedger {
    offset: FixedOffset,
}

impl StreakLedger {
    /// Ledger with UTC calendar days.
    pub fn new() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Ledger whose calendar days start at local midnight for `minutes` east of UTC.
    pub fn with_utc_offset_minutes(minutes: i32) -> Result<Self, ValidationError> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "streak.utc_offset_minutes".to_string(),
                message: format!("{minutes} is outside -1439..=1439"),
            })?;
        Ok(Self { offset })
    }

    /// Calendar day an instant falls on.
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Half-open `[start, end)` window of the calendar day containing `instant`.
    pub fn day_window(&self, instant: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let local_midnight = self.day_of(instant).and_time(NaiveTime::MIN);
        let utc_midnight =
            local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        let start = Utc.from_utc_datetime(&utc_midnight);
        (start, start + Duration::days(1))
    }

    /// Apply a check-in made at `now` to the stored streak snapshot.
    pub fn compute(&self, state: &StreakState, now: DateTime<Utc>) -> StreakUpdate {
        let today = self.day_of(now);
        let last_day = state.last_check_in.map(|t| self.day_of(t));

        match last_day {
            Some(day) if day == today => StreakUpdate {
                current: state.current,
                longest: state.longest,
                is_new_check_in_today: false,
                clock_skew: false,
            },
            Some(day) if day > today => {
                tracing::warn!(
                    last_check_in = ?state.last_check_in,
                    now = %now,
                    "last check-in is later than now; treating as already checked in today"
                );
                StreakUpdate {
                    current: state.current,
                    longest: state.longest,
                    is_new_check_in_today: false,
                    clock_skew: true,
                }
            }
            _ => {
                let current = if last_day.is_some() && last_day == today.pred_opt() {
                    state.current.saturating_add(1)
                } else {
                    1
                };
                StreakUpdate {
                    current,
                    longest: state.longest.max(current),
                    is_new_check_in_today: true,
                    clock_skew: false,
                }
            }
        }
    }
}

impl Default for StreakLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a check-in using UTC calendar days.
pub fn compute_streak(
    last_check_in: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    current: u32,
    longest: u32,
) -> StreakUpdate {
    StreakLedger::new().compute(
        &StreakState {
            current,
            longest,
            last_check_in,
        },
        now,
    )
}

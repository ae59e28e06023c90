//! SQLite adapter for the reward economy.
//!
//! Every public operation runs in one `BEGIN IMMEDIATE` transaction, so the
//! read of prior state (today's granted coins, held badges, streak snapshot)
//! and the writes that depend on it are serialized per database file. This
//! holds across threads sharing a handle, separate handles and separate
//! processes. A balance change and its history record commit or roll back
//! together.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::config::Config;
use super::data_dir;
use super::migrations;
use crate::account::UserAccount;
use crate::badges::{self, BadgeCatalog, EarnedBadge};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::history::{HistoryKind, HistoryRecord};
use crate::rewards::{
    validate_request, RewardOutcome, RewardPolicy, RewardStatus, REASON_CHECKIN,
};
use crate::sentiment::{label_for_record, SentimentExample};
use crate::streak::{StreakLedger, StreakState, StreakUpdate};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default page size for [`LedgerDb::recent_history`].
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// What a grant does when it would push the balance past `i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnOverflow {
    /// Fail the call; nothing is written.
    Reject,
    /// Grant only what still fits.
    Saturate,
}

/// Tunables applied by the ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub policy: RewardPolicy,
    pub streak: StreakLedger,
    pub checkin_coins: i64,
    pub activity_coins: i64,
}

impl LedgerSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            policy: config.reward_policy(),
            streak: config.streak_ledger()?,
            checkin_coins: config.rewards.checkin_coins,
            activity_coins: config.rewards.activity_coins,
        })
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            policy: RewardPolicy::new(),
            streak: StreakLedger::new(),
            checkin_coins: 5,
            activity_coins: 5,
        }
    }
}

/// Result of a check-in.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInOutcome {
    pub streak: StreakUpdate,
    pub coins_awarded: i64,
    /// Balance after the check-in.
    pub coins: i64,
    pub new_badges: Vec<EarnedBadge>,
}

/// Result of logging an activity.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityOutcome {
    pub record: HistoryRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<RewardOutcome>,
}

/// SQLite database holding accounts, history and badges.
pub struct LedgerDb {
    conn: Mutex<Connection>,
    settings: LedgerSettings,
}

impl LedgerDb {
    /// Open `<data_dir>/mindnest.db` with settings from `config`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open_default(config: &Config) -> Result<Self> {
        let path = data_dir()?.join("mindnest.db");
        Self::open(&path, LedgerSettings::from_config(config)?)
    }

    /// Open the database at `path`.
    pub fn open(path: &Path, settings: LedgerSettings) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(path = %path.display(), journal_mode = %mode, "opened ledger database");
        Self::init(conn, settings)
    }

    /// Open an in-memory database.
    pub fn open_memory(settings: LedgerSettings) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, settings)
    }

    fn init(conn: Connection, settings: LedgerSettings) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            settings,
        })
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Database(DatabaseError::Poisoned))
    }

    /// Register a user on first login; later logins leave reward fields alone.
    ///
    /// Each call appends a `login` history record.
    pub fn create_account(&self, user_id: &str, now: DateTime<Utc>) -> Result<UserAccount> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("user_id").into());
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let created = tx.execute(
            "INSERT OR IGNORE INTO users (user_id, created_at, updated_at) VALUES (?1, ?2, ?2)",
            params![user_id, timestamp(now)],
        )? == 1;
        insert_history(&tx, user_id, HistoryKind::Login, None, None, &json!({}), now)?;
        let account = load_account(&tx, user_id)?;
        tx.commit()?;

        if created {
            tracing::info!(user_id, "registered account");
        }
        Ok(account)
    }

    /// Current coins, streaks and badges.
    pub fn account(&self, user_id: &str) -> Result<UserAccount> {
        let conn = self.lock()?;
        load_account(&conn, user_id)
    }

    /// Grant up to `requested` coins for `reason`, honouring the daily cap.
    ///
    /// # Errors
    /// `Validation` for a non-positive amount or blank reason, `NotFound` for
    /// an unknown user, `Database` when storage fails (nothing is committed).
    pub fn award_coins(
        &self,
        user_id: &str,
        requested: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<RewardOutcome> {
        validate_request(requested, reason)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user(&tx, user_id)?;
        let outcome = apply_award(
            &tx,
            &self.settings,
            user_id,
            requested,
            reason,
            OnOverflow::Reject,
            now,
        )?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Record a mood check-in: streak, then check-in coins, then badges.
    ///
    /// A second check-in on the same calendar day is logged but changes no
    /// streak, coin or badge state.
    pub fn record_check_in(
        &self,
        user_id: &str,
        mood: Option<&str>,
        text: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome> {
        let mood = mood
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("Neutral");

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let account = load_account(&tx, user_id)?;
        let update = self.settings.streak.compute(&account.streaks, now);

        tx.execute(
            "UPDATE users
             SET current_streak = ?2, longest_streak = ?3, last_check_in = ?4, updated_at = ?4
             WHERE user_id = ?1",
            params![user_id, update.current, update.longest, timestamp(now)],
        )?;

        let mut data = json!({
            "mood": mood,
            "new_check_in": update.is_new_check_in_today,
            "streak": update.current,
        });
        if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
            data["text"] = json!(text);
        }
        insert_history(&tx, user_id, HistoryKind::Checkin, None, None, &data, now)?;

        let (coins_awarded, coins) = if update.is_new_check_in_today {
            let reward = apply_award(
                &tx,
                &self.settings,
                user_id,
                self.settings.checkin_coins,
                REASON_CHECKIN,
                OnOverflow::Saturate,
                now,
            )?;
            (reward.awarded, reward.new_balance)
        } else {
            (0, account.coins)
        };

        let new_badges = award_new_badges(&tx, user_id, now)?;
        tx.commit()?;

        tracing::info!(
            user_id,
            streak = update.current,
            longest = update.longest,
            new_day = update.is_new_check_in_today,
            coins_awarded,
            "check-in recorded"
        );
        Ok(CheckInOutcome {
            streak: update,
            coins_awarded,
            coins,
            new_badges,
        })
    }

    /// Award every badge the user now qualifies for and does not hold yet.
    ///
    /// Returns only the badges granted by this call; usually empty.
    pub fn check_and_award_badges(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<EarnedBadge>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user(&tx, user_id)?;
        let awarded = award_new_badges(&tx, user_id, now)?;
        tx.commit()?;
        Ok(awarded)
    }

    /// Every catalog badge with the user's earned flag.
    pub fn badge_catalog_for(&self, user_id: &str) -> Result<BadgeCatalog> {
        let conn = self.lock()?;
        let account = load_account(&conn, user_id)?;
        let held: HashSet<String> = account.badges.into_iter().map(|b| b.id).collect();
        Ok(badges::catalog_status(&held))
    }

    /// Append a generic activity record. `game` and `video` also pay out
    /// activity coins through the capped reward path.
    ///
    /// `reward` and `checkin` records are rejected here; they are written
    /// only by [`Self::award_coins`] and [`Self::record_check_in`].
    pub fn log_activity(
        &self,
        user_id: &str,
        kind: HistoryKind,
        data: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<ActivityOutcome> {
        if matches!(kind, HistoryKind::Reward | HistoryKind::Checkin) {
            return Err(ValidationError::InvalidValue {
                field: "type".to_string(),
                message: format!("'{kind}' records are written by the ledger"),
            }
            .into());
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_user(&tx, user_id)?;
        let record = insert_history(&tx, user_id, kind, None, None, &data, now)?;
        let reward = if kind.earns_activity_coins() {
            Some(apply_award(
                &tx,
                &self.settings,
                user_id,
                self.settings.activity_coins,
                kind.as_str(),
                OnOverflow::Saturate,
                now,
            )?)
        } else {
            None
        };
        tx.commit()?;
        Ok(ActivityOutcome { record, reward })
    }

    /// Newest-first history of one user.
    pub fn recent_history(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, kind, data, timestamp FROM history
             WHERE user_id = ?1
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![user_id, limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, user_id, kind, data, ts) = row?;
            records.push(HistoryRecord {
                id,
                user_id,
                kind: kind.parse().map_err(|e: ValidationError| corrupt("kind", e))?,
                data: serde_json::from_str(&data).map_err(|e| corrupt("data", e))?,
                timestamp: parse_timestamp("timestamp", &ts)?,
            });
        }
        Ok(records)
    }

    /// Labelled training examples from check-in, journal and feedback text.
    ///
    /// Records without text or without a mood/rating are skipped.
    pub fn training_examples(&self) -> Result<Vec<SentimentExample>> {
        let conn = self.lock()?;
        let kinds = HistoryKind::ALL
            .iter()
            .filter(|kind| kind.carries_training_text())
            .map(|kind| format!("'{}'", kind.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT id, data FROM history
             WHERE kind IN ({kinds})
             ORDER BY timestamp, rowid"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut examples = Vec::new();
        for row in rows {
            let (id, raw) = row?;
            let data: serde_json::Value = match serde_json::from_str(&raw) {
                Ok(data) => data,
                Err(err) => {
                    tracing::warn!(id, error = %err, "skipping history record with invalid data");
                    continue;
                }
            };
            let Some(text) = data
                .get("text")
                .and_then(|t| t.as_str())
                .map(str::trim)
                .filter(|t| !t.is_empty())
            else {
                continue;
            };
            if let Some(label) = label_for_record(&data) {
                examples.push(SentimentExample::new(text, label));
            }
        }
        Ok(examples)
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(column, e))
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> CoreError {
    CoreError::Database(DatabaseError::CorruptValue {
        column: column.to_string(),
        message: err.to_string(),
    })
}

fn ensure_user(conn: &Connection, user_id: &str) -> Result<()> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM users WHERE user_id = ?1",
            [user_id],
            |_| Ok(()),
        )
        .optional()?;
    exists.ok_or_else(|| CoreError::user_not_found(user_id))
}

fn load_account(conn: &Connection, user_id: &str) -> Result<UserAccount> {
    let row = conn
        .query_row(
            "SELECT coins, current_streak, longest_streak, last_check_in
             FROM users WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()?;
    let Some((coins, current, longest, last_check_in)) = row else {
        return Err(CoreError::user_not_found(user_id));
    };

    let mut stmt = conn.prepare(
        "SELECT badge_id, name, icon, date_earned FROM badges
         WHERE user_id = ?1
         ORDER BY date_earned, rowid",
    )?;
    let rows = stmt.query_map([user_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;
    let mut earned = Vec::new();
    for row in rows {
        let (id, name, icon, date_earned) = row?;
        earned.push(EarnedBadge {
            id,
            name,
            icon,
            date_earned: parse_timestamp("date_earned", &date_earned)?,
        });
    }

    Ok(UserAccount {
        user_id: user_id.to_string(),
        coins,
        streaks: StreakState {
            current,
            longest,
            last_check_in: last_check_in
                .as_deref()
                .map(|t| parse_timestamp("last_check_in", t))
                .transpose()?,
        },
        badges: earned,
    })
}

fn insert_history(
    conn: &Connection,
    user_id: &str,
    kind: HistoryKind,
    reason: Option<&str>,
    coins: Option<i64>,
    data: &serde_json::Value,
    now: DateTime<Utc>,
) -> Result<HistoryRecord> {
    let id = uuid::Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO history (id, user_id, kind, reason, coins, data, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            user_id,
            kind.as_str(),
            reason,
            coins,
            serde_json::to_string(data)?,
            timestamp(now),
        ],
    )?;
    Ok(HistoryRecord {
        id,
        user_id: user_id.to_string(),
        kind,
        data: data.clone(),
        timestamp: now,
    })
}

/// Sum today's granted coins for `reason`, apply the cap, then increment the
/// balance and append the reward record. Callers hold an immediate transaction.
fn apply_award(
    conn: &Connection,
    settings: &LedgerSettings,
    user_id: &str,
    requested: i64,
    reason: &str,
    on_overflow: OnOverflow,
    now: DateTime<Utc>,
) -> Result<RewardOutcome> {
    let (day_start, day_end) = settings.streak.day_window(now);
    let granted_today: i64 = conn.query_row(
        "SELECT COALESCE(SUM(coins), 0) FROM history
         WHERE user_id = ?1 AND kind = 'reward' AND reason = ?2
           AND timestamp >= ?3 AND timestamp < ?4",
        params![user_id, reason, timestamp(day_start), timestamp(day_end)],
        |row| row.get(0),
    )?;

    let plan = settings.policy.plan(requested, reason, granted_today)?;

    let balance: i64 = conn.query_row(
        "SELECT coins FROM users WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    let headroom = i64::MAX - balance;
    let (awarded, status) = if plan.awarded <= headroom {
        (plan.awarded, plan.status)
    } else {
        match on_overflow {
            OnOverflow::Reject => {
                return Err(ValidationError::InvalidValue {
                    field: "coins".to_string(),
                    message: format!(
                        "awarding {} to a balance of {balance} overflows",
                        plan.awarded
                    ),
                }
                .into());
            }
            OnOverflow::Saturate if headroom == 0 => (0, RewardStatus::CapReached),
            OnOverflow::Saturate => (headroom, RewardStatus::Partial),
        }
    };

    let new_balance = balance + awarded;
    if awarded > 0 {
        conn.execute(
            "UPDATE users SET coins = ?2, updated_at = ?3 WHERE user_id = ?1",
            params![user_id, new_balance, timestamp(now)],
        )?;
        insert_history(
            conn,
            user_id,
            HistoryKind::Reward,
            Some(reason),
            Some(awarded),
            &json!({ "coins": awarded, "reason": reason }),
            now,
        )?;
        tracing::info!(user_id, reason, requested, awarded, new_balance, "coins awarded");
    } else {
        tracing::warn!(user_id, reason, granted_today, cap = ?plan.cap, "daily cap reached");
    }

    Ok(RewardOutcome {
        awarded,
        new_balance,
        status,
    })
}

/// Evaluate the catalog against the stored stats and insert new badges.
///
/// `INSERT OR IGNORE` on the `(user_id, badge_id)` key makes the append
/// idempotent even if a badge is evaluated twice.
fn award_new_badges(
    conn: &Connection,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<EarnedBadge>> {
    let account = load_account(conn, user_id)?;
    let held: HashSet<String> = account.badges.iter().map(|b| b.id.clone()).collect();

    let mut awarded = Vec::new();
    for badge in badges::evaluate_badges(&account.badge_stats(), &held) {
        let earned = badge.earn(now);
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO badges (user_id, badge_id, name, icon, date_earned)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, earned.id, earned.name, earned.icon, timestamp(now)],
        )?;
        if inserted == 1 {
            awarded.push(earned);
        }
    }

    if !awarded.is_empty() {
        tracing::info!(
            user_id,
            badges = ?awarded.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(),
            "badges awarded"
        );
    }
    Ok(awarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn db() -> LedgerDb {
        LedgerDb::open_memory(LedgerSettings::default()).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, h, 0, 0).unwrap()
    }

    #[test]
    fn new_account_is_zeroed() {
        let db = db();
        let account = db.create_account("u1", at(1, 9)).unwrap();
        assert_eq!(account.coins, 0);
        assert_eq!(account.streaks, StreakState::default());
        assert!(account.badges.is_empty());
    }

    #[test]
    fn repeated_login_keeps_balance_and_logs_each_login() {
        let db = db();
        db.create_account("u1", at(1, 9)).unwrap();
        db.award_coins("u1", 30, "game", at(1, 10)).unwrap();
        let again = db.create_account("u1", at(1, 11)).unwrap();
        assert_eq!(again.coins, 30);

        let logins = db
            .recent_history("u1", DEFAULT_HISTORY_LIMIT)
            .unwrap()
            .into_iter()
            .filter(|r| r.kind == HistoryKind::Login)
            .count();
        assert_eq!(logins, 2);
    }

    #[test]
    fn blank_user_id_is_rejected() {
        assert!(matches!(
            db().create_account("  ", at(1, 9)),
            Err(CoreError::Validation(ValidationError::MissingField("user_id")))
        ));
    }

    #[test]
    fn unknown_user_is_not_found() {
        let db = db();
        assert!(matches!(
            db.award_coins("ghost", 5, "game", at(1, 9)),
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            db.record_check_in("ghost", None, None, at(1, 9)),
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            db.check_and_award_badges("ghost", at(1, 9)),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn reward_history_records_granted_not_requested() {
        let db = db();
        db.create_account("u1", at(1, 9)).unwrap();
        db.award_coins("u1", 20, "daily_challenge", at(1, 9)).unwrap();
        let partial = db.award_coins("u1", 20, "daily_challenge", at(1, 10)).unwrap();
        assert_eq!(partial.awarded, 5);

        let rewards: Vec<i64> = db
            .recent_history("u1", 10)
            .unwrap()
            .into_iter()
            .filter(|r| r.kind == HistoryKind::Reward)
            .map(|r| r.data["coins"].as_i64().unwrap())
            .collect();
        assert_eq!(rewards, vec![5, 20]);
    }

    #[test]
    fn cap_resets_on_the_next_day() {
        let db = db();
        db.create_account("u1", at(1, 9)).unwrap();
        db.award_coins("u1", 25, "daily_challenge", at(1, 23)).unwrap();
        let next = db.award_coins("u1", 10, "daily_challenge", at(2, 0)).unwrap();
        assert_eq!(next.awarded, 10);
        assert_eq!(next.new_balance, 35);
    }

    #[test]
    fn overflowing_award_is_rejected_without_writes() {
        let db = db();
        db.create_account("u1", at(1, 9)).unwrap();
        db.award_coins("u1", i64::MAX, "bonus", at(1, 9)).unwrap();
        let history_before = db.recent_history("u1", DEFAULT_HISTORY_LIMIT).unwrap().len();

        let err = db.award_coins("u1", 1, "other", at(1, 10)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidValue { .. })
        ));
        assert_eq!(db.account("u1").unwrap().coins, i64::MAX);
        assert_eq!(
            db.recent_history("u1", DEFAULT_HISTORY_LIMIT).unwrap().len(),
            history_before
        );
    }

    #[test]
    fn full_balance_still_allows_check_in() {
        let db = db();
        db.create_account("u1", at(1, 9)).unwrap();
        db.award_coins("u1", i64::MAX - 2, "bonus", at(1, 9)).unwrap();

        let first = db.record_check_in("u1", Some("Happy"), None, at(1, 10)).unwrap();
        assert_eq!(first.coins_awarded, 2);
        assert_eq!(first.coins, i64::MAX);

        let next = db.record_check_in("u1", Some("Happy"), None, at(2, 10)).unwrap();
        assert_eq!(next.streak.current, 2);
        assert_eq!(next.coins_awarded, 0);
        assert_eq!(next.coins, i64::MAX);

        let game = db
            .log_activity("u1", HistoryKind::Game, json!({}), at(2, 11))
            .unwrap();
        assert_eq!(game.reward.unwrap().status, RewardStatus::CapReached);
    }

    #[test]
    fn default_cap_does_not_shrink_check_in_coins() {
        let settings = LedgerSettings {
            policy: RewardPolicy::new().with_default_cap(Some(2)),
            ..LedgerSettings::default()
        };
        let db = LedgerDb::open_memory(settings).unwrap();
        db.create_account("u1", at(1, 9)).unwrap();

        let outcome = db.record_check_in("u1", None, None, at(1, 9)).unwrap();
        assert_eq!(outcome.coins_awarded, 5);
        assert_eq!(db.award_coins("u1", 5, "game", at(1, 9)).unwrap().awarded, 2);
    }

    #[test]
    fn game_activity_pays_coins_but_music_does_not() {
        let db = db();
        db.create_account("u1", at(1, 9)).unwrap();
        let game = db
            .log_activity("u1", HistoryKind::Game, json!({"score": 12}), at(1, 9))
            .unwrap();
        assert_eq!(game.reward.unwrap().awarded, 5);

        let music = db
            .log_activity("u1", HistoryKind::Music, json!({"track": "rain"}), at(1, 9))
            .unwrap();
        assert!(music.reward.is_none());
        assert_eq!(db.account("u1").unwrap().coins, 5);
    }

    #[test]
    fn ledger_owned_kinds_cannot_be_logged_directly() {
        let db = db();
        db.create_account("u1", at(1, 9)).unwrap();
        assert!(matches!(
            db.log_activity("u1", HistoryKind::Reward, json!({"coins": 999}), at(1, 9)),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn history_is_newest_first_and_limited() {
        let db = db();
        db.create_account("u1", at(1, 9)).unwrap();
        for h in 10..15 {
            db.log_activity("u1", HistoryKind::Music, json!({"hour": h}), at(1, h))
                .unwrap();
        }
        let recent = db.recent_history("u1", 3).unwrap();
        let hours: Vec<i64> = recent.iter().map(|r| r.data["hour"].as_i64().unwrap()).collect();
        assert_eq!(hours, vec![14, 13, 12]);
    }

    #[test]
    fn training_examples_use_mood_then_rating() {
        let db = db();
        db.create_account("u1", at(1, 9)).unwrap();
        db.record_check_in("u1", Some("Happy"), Some("lovely walk"), at(1, 9))
            .unwrap();
        db.record_check_in("u1", Some("Sad"), None, at(2, 9)).unwrap();
        db.log_activity(
            "u1",
            HistoryKind::Feedback,
            json!({"text": "meh app", "rating": 1}),
            at(2, 10),
        )
        .unwrap();
        db.log_activity("u1", HistoryKind::Journal, json!({"text": "no label"}), at(2, 11))
            .unwrap();

        let examples = db.training_examples().unwrap();
        assert_eq!(
            examples,
            vec![
                SentimentExample::new("lovely walk", crate::sentiment::SentimentLabel::Positive),
                SentimentExample::new("meh app", crate::sentiment::SentimentLabel::Negative),
            ]
        );
    }

    #[test]
    fn settings_from_config_reject_invalid_values() {
        let mut config = Config::default();
        config.rewards.checkin_coins = 0;
        assert!(LedgerSettings::from_config(&config).is_err());
    }
}

//! Threshold badges.
//!
//! Badges are plain data records (`metric >= threshold`) evaluated by one
//! comparator. Evaluation is idempotent against the set of held ids; the
//! storage layer persists results with insert-if-absent semantics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stat a badge threshold is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeMetric {
    /// Always satisfied; the badge is granted on first evaluation.
    Always,
    CurrentStreak,
    LongestStreak,
    Coins,
}

/// Snapshot of the stats badge predicates read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub coins: i64,
}

/// Static badge definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub metric: BadgeMetric,
    pub threshold: i64,
}

impl BadgeDefinition {
    /// Whether `stats` satisfy this badge.
    pub fn is_met(&self, stats: &BadgeStats) -> bool {
        let value = match self.metric {
            BadgeMetric::Always => return true,
            BadgeMetric::CurrentStreak => i64::from(stats.current_streak),
            BadgeMetric::LongestStreak => i64::from(stats.longest_streak),
            BadgeMetric::Coins => stats.coins,
        };
        value >= self.threshold
    }

    /// Earned record stamped at `at`.
    pub fn earn(&self, at: DateTime<Utc>) -> EarnedBadge {
        EarnedBadge {
            id: self.id.to_string(),
            name: self.name.to_string(),
            icon: self.icon.to_string(),
            date_earned: at,
        }
    }
}

/// A badge held by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedBadge {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub date_earned: DateTime<Utc>,
}

/// Catalog entry with the user's earned flag.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeStatus {
    #[serde(flatten)]
    pub badge: BadgeDefinition,
    pub earned: bool,
}

/// All badges with earned flags.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeCatalog {
    pub all_badges: Vec<BadgeStatus>,
    pub earned_count: usize,
}

const CATALOG: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: "first-step",
        name: "First Step",
        description: "Complete your first check-in",
        icon: "[Footprint]",
        metric: BadgeMetric::Always,
        threshold: 0,
    },
    BadgeDefinition {
        id: "week-warrior",
        name: "Week Warrior",
        description: "Maintain a 7-day streak",
        icon: "[Fire]",
        metric: BadgeMetric::CurrentStreak,
        threshold: 7,
    },
    BadgeDefinition {
        id: "month-master",
        name: "Month Master",
        description: "Maintain a 30-day streak",
        icon: "[Crown]",
        metric: BadgeMetric::CurrentStreak,
        threshold: 30,
    },
    BadgeDefinition {
        id: "century",
        name: "Century Club",
        description: "Reach a 100-day streak",
        icon: "[Perfect]",
        metric: BadgeMetric::CurrentStreak,
        threshold: 100,
    },
    BadgeDefinition {
        id: "peak-performance",
        name: "Peak Performance",
        description: "Reach a longest streak of 30 days",
        icon: "[Mountain]",
        metric: BadgeMetric::LongestStreak,
        threshold: 30,
    },
    BadgeDefinition {
        id: "golden-achievement",
        name: "Golden Achievement",
        description: "Reach 100 coins",
        icon: "[Trophy]",
        metric: BadgeMetric::Coins,
        threshold: 100,
    },
    BadgeDefinition {
        id: "wellness-champion",
        name: "Wellness Champion",
        description: "Reach 500 coins",
        icon: "[Gold Medal]",
        metric: BadgeMetric::Coins,
        threshold: 500,
    },
];

/// The fixed, ordered badge list.
pub fn catalog() -> &'static [BadgeDefinition] {
    CATALOG
}

/// Look up a badge by id.
pub fn find(id: &str) -> Option<&'static BadgeDefinition> {
    CATALOG.iter().find(|b| b.id == id)
}

/// Badges from the catalog newly earned with `stats`.
pub fn evaluate_badges(
    stats: &BadgeStats,
    held_ids: &HashSet<String>,
) -> Vec<&'static BadgeDefinition> {
    evaluate_in_order(CATALOG.iter(), stats, held_ids)
}

/// Evaluate an arbitrary ordering of definitions.
///
/// A badge id is granted at most once per call even if it appears twice.
pub fn evaluate_in_order<'a>(
    definitions: impl IntoIterator<Item = &'a BadgeDefinition>,
    stats: &BadgeStats,
    held_ids: &HashSet<String>,
) -> Vec<&'a BadgeDefinition> {
    let mut now_held: HashSet<&str> = held_ids.iter().map(String::as_str).collect();
    let mut awarded = Vec::new();

    for badge in definitions {
        if now_held.contains(badge.id) || !badge.is_met(stats) {
            continue;
        }
        now_held.insert(badge.id);
        awarded.push(badge);
    }
    awarded
}

/// Catalog with earned flags for the given held ids.
pub fn catalog_status(held_ids: &HashSet<String>) -> BadgeCatalog {
    let all_badges: Vec<BadgeStatus> = CATALOG
        .iter()
        .map(|badge| BadgeStatus {
            badge: badge.clone(),
            earned: held_ids.contains(badge.id),
        })
        .collect();
    BadgeCatalog {
        earned_count: held_ids.len(),
        all_badges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(current: u32, longest: u32, coins: i64) -> BadgeStats {
        BadgeStats {
            current_streak: current,
            longest_streak: longest,
            coins,
        }
    }

    fn ids(badges: &[&BadgeDefinition]) -> Vec<&'static str> {
        badges.iter().map(|b| b.id).collect()
    }

    #[test]
    fn fresh_user_gets_first_step_only() {
        let awarded = evaluate_badges(&stats(1, 1, 5), &HashSet::new());
        assert_eq!(ids(&awarded), vec!["first-step"]);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let awarded = evaluate_badges(&stats(7, 30, 100), &HashSet::new());
        assert_eq!(
            ids(&awarded),
            vec!["first-step", "week-warrior", "peak-performance", "golden-achievement"]
        );

        let below = evaluate_badges(&stats(6, 29, 99), &HashSet::new());
        assert_eq!(ids(&below), vec!["first-step"]);
    }

    #[test]
    fn every_badge_at_maximum_stats() {
        let awarded = evaluate_badges(&stats(100, 100, 500), &HashSet::new());
        assert_eq!(awarded.len(), catalog().len());
    }

    #[test]
    fn second_evaluation_is_empty() {
        let s = stats(30, 30, 250);
        let mut held = HashSet::new();
        for badge in evaluate_badges(&s, &held) {
            held.insert(badge.id.to_string());
        }
        assert!(evaluate_badges(&s, &held).is_empty());
    }

    #[test]
    fn duplicated_definitions_grant_once() {
        let week = find("week-warrior").unwrap();
        let awarded = evaluate_in_order([week, week], &stats(10, 10, 0), &HashSet::new());
        assert_eq!(awarded.len(), 1);
    }

    #[test]
    fn permuted_order_yields_same_set() {
        let s = stats(31, 45, 120);
        let forward: HashSet<_> = ids(&evaluate_badges(&s, &HashSet::new())).into_iter().collect();
        let reversed_order = evaluate_in_order(catalog().iter().rev(), &s, &HashSet::new());
        let reversed: HashSet<_> = ids(&reversed_order).into_iter().collect();
        assert_eq!(forward, reversed);
    }

    #[test]
    fn catalog_ids_are_unique() {
        let unique: HashSet<_> = catalog().iter().map(|b| b.id).collect();
        assert_eq!(unique.len(), catalog().len());
    }

    #[test]
    fn catalog_status_marks_earned() {
        let held: HashSet<String> = ["century".to_string()].into_iter().collect();
        let status = catalog_status(&held);
        assert_eq!(status.earned_count, 1);
        assert!(status.all_badges.iter().any(|b| b.badge.id == "century" && b.earned));
        assert!(status.all_badges.iter().filter(|b| b.earned).count() == 1);
    }
}

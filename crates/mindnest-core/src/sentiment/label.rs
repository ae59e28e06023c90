//! Sentiment labels and the lookup that derives them from moods and ratings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-way sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Fixed label order; argmax ties resolve to the earlier label.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const POSITIVE_MOODS: &[&str] = &[
    "happy",
    "very happy",
    "calm",
    "excited",
    "relaxed",
    "content",
];

const NEGATIVE_MOODS: &[&str] = &[
    "sad",
    "very sad",
    "anxious",
    "angry",
    "frustrated",
    "depressed",
];

/// Map a mood word to a label. Unknown or missing moods are neutral.
pub fn mood_to_label(mood: Option<&str>) -> SentimentLabel {
    let Some(mood) = mood else {
        return SentimentLabel::Neutral;
    };
    let mood = mood.trim().to_lowercase();
    if POSITIVE_MOODS.contains(&mood.as_str()) {
        SentimentLabel::Positive
    } else if NEGATIVE_MOODS.contains(&mood.as_str()) {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Map a numeric rating: `>= 4` positive, `<= 2` negative, otherwise neutral.
pub fn rating_to_label(rating: f64) -> SentimentLabel {
    if rating >= 4.0 {
        SentimentLabel::Positive
    } else if rating <= 2.0 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Label for a history payload: `mood` wins, then a numeric `rating`.
///
/// Returns `None` when the payload carries neither.
pub fn label_for_record(data: &serde_json::Value) -> Option<SentimentLabel> {
    match data.get("mood").and_then(|m| m.as_str()) {
        Some(mood) if !mood.trim().is_empty() => Some(mood_to_label(Some(mood))),
        _ => data
            .get("rating")
            .and_then(|r| r.as_f64())
            .map(rating_to_label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn moods_are_case_insensitive() {
        assert_eq!(mood_to_label(Some("Happy")), SentimentLabel::Positive);
        assert_eq!(mood_to_label(Some("ANXIOUS")), SentimentLabel::Negative);
        assert_eq!(mood_to_label(Some(" Very Sad ")), SentimentLabel::Negative);
    }

    #[test]
    fn unknown_or_missing_moods_are_neutral() {
        assert_eq!(mood_to_label(Some("Bored")), SentimentLabel::Neutral);
        assert_eq!(mood_to_label(None), SentimentLabel::Neutral);
    }

    #[test]
    fn rating_boundaries() {
        assert_eq!(rating_to_label(5.0), SentimentLabel::Positive);
        assert_eq!(rating_to_label(4.0), SentimentLabel::Positive);
        assert_eq!(rating_to_label(3.0), SentimentLabel::Neutral);
        assert_eq!(rating_to_label(2.5), SentimentLabel::Neutral);
        assert_eq!(rating_to_label(2.0), SentimentLabel::Negative);
        assert_eq!(rating_to_label(1.0), SentimentLabel::Negative);
    }

    #[test]
    fn record_prefers_mood_over_rating() {
        let data = json!({"text": "x", "mood": "sad", "rating": 5});
        assert_eq!(label_for_record(&data), Some(SentimentLabel::Negative));

        let rated = json!({"text": "x", "rating": 5});
        assert_eq!(label_for_record(&rated), Some(SentimentLabel::Positive));

        assert_eq!(label_for_record(&json!({"text": "x"})), None);
    }
}

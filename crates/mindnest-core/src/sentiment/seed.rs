//! Built-in starter corpus used before enough user data exists.

use super::classifier::SentimentExample;
use super::label::SentimentLabel;

const SEED: &[(&str, SentimentLabel)] = &[
    ("I feel fantastic and happy today", SentimentLabel::Positive),
    ("I am so grateful and content", SentimentLabel::Positive),
    ("This made me smile and relax", SentimentLabel::Positive),
    ("Had a calm and relaxed evening", SentimentLabel::Positive),
    ("Feeling happy and excited about life", SentimentLabel::Positive),
    ("I am sad and depressed", SentimentLabel::Negative),
    ("Feeling anxious and stressed out", SentimentLabel::Negative),
    ("I am angry and upset", SentimentLabel::Negative),
    ("Everything feels hopeless and sad", SentimentLabel::Negative),
    ("So frustrated and tired of everything", SentimentLabel::Negative),
    ("It was an ordinary day", SentimentLabel::Neutral),
    ("I went to work and did chores", SentimentLabel::Neutral),
    ("No strong feelings either way", SentimentLabel::Neutral),
    ("Had lunch and read the news", SentimentLabel::Neutral),
    ("Just a regular afternoon at the office", SentimentLabel::Neutral),
];

/// Labelled starter examples, balanced across the three labels.
pub fn seed_examples() -> Vec<SentimentExample> {
    SEED.iter()
        .map(|(text, label)| SentimentExample::new(*text, *label))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_balanced() {
        let examples = seed_examples();
        for label in SentimentLabel::ALL {
            assert_eq!(examples.iter().filter(|e| e.label == label).count(), 5);
        }
    }
}

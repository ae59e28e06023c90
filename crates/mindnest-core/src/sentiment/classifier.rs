//! Multinomial naive Bayes sentiment classifier.
//!
//! Training counts tokens per label; prediction sums log-probabilities with
//! Laplace smoothing and normalises them into confidences that sum to one.
//! Every `train` call builds a fresh model so that the labels always reflect
//! the current mood lookup.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::label::SentimentLabel;
use super::tokenizer::tokenize;

/// Minimum labelled examples needed to train.
pub const DEFAULT_MIN_EXAMPLES: usize = 5;

/// Default additive smoothing.
pub const DEFAULT_SMOOTHING: f64 = 1.0;

const MODEL_VERSION: u32 = 1;

/// One labelled training document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentExample {
    pub text: String,
    pub label: SentimentLabel,
}

impl SentimentExample {
    pub fn new(text: impl Into<String>, label: SentimentLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainOutcome {
    pub trained: bool,
    pub example_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Per-label confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: SentimentLabel,
    pub score: f64,
}

/// Predicted label with the full confidence distribution, highest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: SentimentLabel,
    pub confidences: Vec<LabelScore>,
}

impl Prediction {
    /// Default returned for blank input or when no model is trained.
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidences: Vec::new(),
        }
    }
}

/// Token frequency tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    version: u32,
    smoothing: f64,
    total_documents: u64,
    documents: BTreeMap<SentimentLabel, u64>,
    token_totals: BTreeMap<SentimentLabel, u64>,
    token_counts: BTreeMap<SentimentLabel, BTreeMap<String, u64>>,
    vocabulary: BTreeSet<String>,
}

impl NaiveBayesModel {
    fn empty(smoothing: f64) -> Self {
        Self {
            version: MODEL_VERSION,
            smoothing,
            total_documents: 0,
            documents: BTreeMap::new(),
            token_totals: BTreeMap::new(),
            token_counts: BTreeMap::new(),
            vocabulary: BTreeSet::new(),
        }
    }

    fn add_document(&mut self, tokens: &[String], label: SentimentLabel) {
        self.total_documents += 1;
        *self.documents.entry(label).or_default() += 1;
        *self.token_totals.entry(label).or_default() += tokens.len() as u64;

        let counts = self.token_counts.entry(label).or_default();
        for token in tokens {
            *counts.entry(token.clone()).or_default() += 1;
            self.vocabulary.insert(token.clone());
        }
    }

    pub fn total_documents(&self) -> u64 {
        self.total_documents
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Unnormalised log-probability of `tokens` under each label.
    ///
    /// Tokens never seen in training are ignored.
    fn log_scores(&self, tokens: &[String]) -> [(SentimentLabel, f64); 3] {
        let alpha = self.smoothing;
        let label_count = SentimentLabel::ALL.len() as f64;
        let vocab = self.vocabulary.len() as f64;

        SentimentLabel::ALL.map(|label| {
            let docs = self.documents.get(&label).copied().unwrap_or(0) as f64;
            let prior = (docs + alpha) / (self.total_documents as f64 + alpha * label_count);
            let total = self.token_totals.get(&label).copied().unwrap_or(0) as f64;
            let counts = self.token_counts.get(&label);

            let likelihood: f64 = tokens
                .iter()
                .filter(|token| self.vocabulary.contains(*token))
                .map(|token| {
                    let count = counts
                        .and_then(|c| c.get(token))
                        .copied()
                        .unwrap_or(0) as f64;
                    ((count + alpha) / (total + alpha * vocab)).ln()
                })
                .sum();

            (label, prior.ln() + likelihood)
        })
    }

    fn predict_tokens(&self, tokens: &[String]) -> Prediction {
        let scores = self.log_scores(tokens);
        let max = scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<(SentimentLabel, f64)> =
            scores.iter().map(|(l, s)| (*l, (s - max).exp())).collect();
        let sum: f64 = exp.iter().map(|(_, e)| e).sum();

        let mut confidences: Vec<LabelScore> = exp
            .into_iter()
            .map(|(label, e)| LabelScore {
                label,
                score: e / sum,
            })
            .collect();

        // Stable sort keeps the fixed label order among equal scores.
        confidences.sort_by(|a, b| b.score.total_cmp(&a.score));

        Prediction {
            label: confidences[0].label,
            confidences,
        }
    }
}

/// Classifier with a configurable training threshold.
#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    min_examples: usize,
    smoothing: f64,
    model: Option<NaiveBayesModel>,
}

impl SentimentClassifier {
    pub fn new() -> Self {
        Self {
            min_examples: DEFAULT_MIN_EXAMPLES,
            smoothing: DEFAULT_SMOOTHING,
            model: None,
        }
    }

    pub fn with_min_examples(mut self, min_examples: usize) -> Self {
        self.min_examples = min_examples;
        self
    }

    /// Additive smoothing; non-positive or non-finite values fall back to the default.
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = if smoothing.is_finite() && smoothing > 0.0 {
            smoothing
        } else {
            DEFAULT_SMOOTHING
        };
        self
    }

    /// Classifier around a previously trained model.
    pub fn with_model(mut self, model: NaiveBayesModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn model(&self) -> Option<&NaiveBayesModel> {
        self.model.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Replace the model with one trained from `examples`.
    ///
    /// Examples with no usable tokens are skipped. When fewer than the
    /// configured minimum remain, nothing changes and `trained` is false.
    pub fn train(&mut self, examples: &[SentimentExample]) -> TrainOutcome {
        let mut model = NaiveBayesModel::empty(self.smoothing);
        let mut used = 0;
        for example in examples {
            let tokens = tokenize(&example.text);
            if tokens.is_empty() {
                continue;
            }
            model.add_document(&tokens, example.label);
            used += 1;
        }

        if used < self.min_examples {
            tracing::info!(
                examples = used,
                required = self.min_examples,
                "not enough labelled examples to train"
            );
            return TrainOutcome {
                trained: false,
                example_count: used,
                message: Some(format!(
                    "Not enough labelled examples ({used}); at least {} required",
                    self.min_examples
                )),
            };
        }

        tracing::info!(
            examples = used,
            vocabulary = model.vocabulary_size(),
            "sentiment model trained"
        );
        self.model = Some(model);
        TrainOutcome {
            trained: true,
            example_count: used,
            message: None,
        }
    }

    /// Classify `text`.
    pub fn predict(&self, text: &str) -> Prediction {
        let Some(model) = &self.model else {
            return Prediction::neutral();
        };
        if text.trim().is_empty() {
            return Prediction::neutral();
        }

        let tokens = tokenize(text);
        let prediction = model.predict_tokens(&tokens);
        tracing::debug!(
            sample = %text.chars().take(80).collect::<String>(),
            label = %prediction.label,
            "sentiment prediction"
        );
        prediction
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

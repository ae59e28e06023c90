//! Bayesian sentiment classification for journal and feedback text.
//!
//! - [`label`]: mood/rating to label mapping used to build training data
//! - [`tokenizer`]: case-normalised word tokens
//! - [`classifier`]: multinomial naive Bayes model
//! - [`store`]: JSON model blob on disk, loaded lazily and replaced on retrain

pub mod classifier;
pub mod label;
pub mod seed;
pub mod store;
pub mod tokenizer;

pub use classifier::{
    LabelScore, NaiveBayesModel, Prediction, SentimentClassifier, SentimentExample, TrainOutcome,
};
pub use label::{label_for_record, mood_to_label, rating_to_label, SentimentLabel};
pub use store::{ModelStore, SentimentService};

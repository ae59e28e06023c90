//! On-disk model blob and the lazily loaded classifier around it.

use std::path::{Path, PathBuf};

use super::classifier::{
    NaiveBayesModel, Prediction, SentimentClassifier, SentimentExample, TrainOutcome,
};
use crate::error::Result;
use crate::storage::data_dir;

/// JSON file holding a trained [`NaiveBayesModel`].
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/sentiment/model.json`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("sentiment").join("model.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored model, `None` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<NaiveBayesModel>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let model = serde_json::from_str(&content)?;
        Ok(Some(model))
    }

    /// Replace the stored model.
    ///
    /// Writes a sibling temp file and renames it over the target so readers
    /// never observe a half-written blob.
    pub fn save(&self, model: &NaiveBayesModel) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string(model)?)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), "saved sentiment model");
        Ok(())
    }
}

/// Classifier backed by a [`ModelStore`], loaded on first use.
#[derive(Debug)]
pub struct SentimentService {
    store: ModelStore,
    template: SentimentClassifier,
    loaded: Option<SentimentClassifier>,
}

impl SentimentService {
    /// `template` supplies training settings; its model, if any, is ignored
    /// in favour of the stored one.
    pub fn new(store: ModelStore, template: SentimentClassifier) -> Self {
        Self {
            store,
            template,
            loaded: None,
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    fn classifier(&mut self) -> &SentimentClassifier {
        let Self {
            store,
            template,
            loaded,
        } = self;
        loaded.get_or_insert_with(|| load_classifier(store, template))
    }

    pub fn is_trained(&mut self) -> bool {
        self.classifier().is_trained()
    }

    pub fn predict(&mut self, text: &str) -> Prediction {
        self.classifier().predict(text)
    }

    /// Full retrain. The stored model is replaced only on success; too few
    /// examples or a failed write leave both disk and memory untouched.
    pub fn train(&mut self, examples: &[SentimentExample]) -> Result<TrainOutcome> {
        let mut candidate = self.classifier().clone();
        let outcome = candidate.train(examples);
        if !outcome.trained {
            return Ok(outcome);
        }
        if let Some(model) = candidate.model() {
            self.store.save(model)?;
        }
        self.loaded = Some(candidate);
        Ok(outcome)
    }
}

fn load_classifier(store: &ModelStore, template: &SentimentClassifier) -> SentimentClassifier {
    let base = template.clone();
    match store.load() {
        Ok(Some(model)) => {
            tracing::info!(path = %store.path().display(), "loaded sentiment model");
            base.with_model(model)
        }
        Ok(None) => {
            tracing::debug!(path = %store.path().display(), "no sentiment model on disk");
            base
        }
        Err(err) => {
            tracing::warn!(
                path = %store.path().display(),
                error = %err,
                "failed to load sentiment model; starting untrained"
            );
            base
        }
    }
}

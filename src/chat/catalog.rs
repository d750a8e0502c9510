//! Human-readable model labels mapped to API model identifiers.

use serde::{Deserialize, Serialize};

/// Label of the built-in default model.
pub const DEFAULT_MODEL_LABEL: &str = "Llama 3.1 8B";

/// Identifier of the built-in default model.
pub const DEFAULT_MODEL_ID: &str = "llama-3.1-8b-instant";

/// One selectable model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOption {
    /// Label shown in the model picker.
    pub label: String,
    /// Identifier sent to the completion API.
    pub id: String,
}

/// Ordered model catalog. The first entry is the default selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<ModelOption>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::empty().with_model(DEFAULT_MODEL_LABEL, DEFAULT_MODEL_ID)
    }
}

impl ModelCatalog {
    /// Catalog with no entries. Fill it with [`ModelCatalog::with_model`].
    #[must_use]
    pub const fn empty() -> Self {
        Self { models: Vec::new() }
    }

    /// Add a model. A label already present is remapped to the new id.
    #[must_use]
    pub fn with_model(mut self, label: impl Into<String>, id: impl Into<String>) -> Self {
        let label = label.into();
        let id = id.into();
        match self.models.iter_mut().find(|m| m.label == label) {
            Some(existing) => existing.id = id,
            None => self.models.push(ModelOption { label, id }),
        }
        self
    }

    /// The default model, if the catalog is not empty.
    #[must_use]
    pub fn default_model(&self) -> Option<&ModelOption> {
        self.models.first()
    }

    /// Identifier of the default model, falling back to [`DEFAULT_MODEL_ID`].
    #[must_use]
    pub fn default_model_id(&self) -> &str {
        self.default_model().map_or(DEFAULT_MODEL_ID, |m| m.id.as_str())
    }

    /// Find a model by its label.
    #[must_use]
    pub fn by_label(&self, label: &str) -> Option<&ModelOption> {
        self.models.iter().find(|m| m.label == label)
    }

    /// Find a model by its API identifier.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&ModelOption> {
        self.models.iter().find(|m| m.id == id)
    }

    /// All models in picker order.
    #[must_use]
    pub fn models(&self) -> &[ModelOption] {
        &self.models
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

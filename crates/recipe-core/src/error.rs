use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("tagger binary not found: {0}")]
    TaggerNotFound(String),

    #[error("tagging failed: {0}")]
    Tagging(String),

    #[error("unknown entity category: {0}")]
    MissingCategory(String),

    #[error("unknown category code: {0}")]
    MissingCategoryCode(i64),

    #[error("word not in classifier vocabulary: {0}")]
    UnknownVocabulary(String),

    #[error("malformed artifact {path}: {reason}")]
    MalformedArtifact { path: PathBuf, reason: String },

    #[error("invalid reference table: {0}")]
    InvalidReference(String),

    #[error("action category not found: {0}")]
    MissingActionCategory(String),

    #[error("invalid path segment '{0}'")]
    InvalidPathSegment(String),

    #[error("malformed ingredient line '{0}': expected name and quantity separated by U+3000")]
    MalformedIngredient(String),

    #[error("invalid recipe record: {0}")]
    InvalidRecord(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RecipeError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecipeError>;

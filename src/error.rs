//! Error and warning types for ERD generation.
//!
//! Fatal conditions are [`ErdError`] values and abort the pipeline before
//! any document text is produced. Non-fatal conditions are collected as
//! [`ErdWarning`] values and returned next to the document.

use crate::schema::AssociationKind;
use std::fmt;
use thiserror::Error;

/// Fatal errors raised while turning model metadata into a diagram
#[derive(Debug, Error)]
pub enum ErdError {
    /// The source does not expose the expected metadata contract
    #[error("source does not expose a model schema: {0}")]
    SchemaContract(String),

    /// Filtering removed every entity, or the schema declares none
    #[error(
        "no models left to draw. Check that the source declares entities and that --include/--exclude do not filter them all out"
    )]
    EmptyModelSet,

    /// The external layout engine failed
    #[error("render engine failed: {0}")]
    RenderEngine(String),

    /// Invalid option value
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ErdError {
    pub fn schema_contract(message: impl Into<String>) -> Self {
        ErdError::SchemaContract(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        ErdError::Config(message.into())
    }

    pub fn render(message: impl Into<String>) -> Self {
        ErdError::RenderEngine(message.into())
    }
}

/// Non-fatal issues found while classifying relationships
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErdWarning {
    /// A relationship references an entity that is not part of the selection
    UnrenderableRelationship {
        source: String,
        target: String,
        through: Option<String>,
        kind: AssociationKind,
        /// The referenced name that could not be resolved
        missing: String,
    },
}

impl fmt::Display for ErdWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErdWarning::UnrenderableRelationship {
                source,
                target,
                through,
                kind,
                missing,
            } => {
                write!(f, "Skipped {} {} → {}", kind, source, target)?;
                if let Some(t) = through {
                    write!(f, " (through {})", t)?;
                }
                write!(f, ": '{}' is not in the selected models", missing)
            }
        }
    }
}

/// Collects warnings during a pipeline run
#[derive(Debug, Default)]
pub struct WarningCollector {
    warnings: Vec<ErdWarning>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning, ignoring exact duplicates
    pub fn add(&mut self, warning: ErdWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn into_warnings(self) -> Vec<ErdWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skipped(missing: &str) -> ErdWarning {
        ErdWarning::UnrenderableRelationship {
            source: "song".to_string(),
            target: "artist".to_string(),
            through: Some("artistSong".to_string()),
            kind: AssociationKind::ManyToMany,
            missing: missing.to_string(),
        }
    }

    #[test]
    fn test_warning_display() {
        let text = skipped("artistSong").to_string();
        assert!(text.contains("song → artist"));
        assert!(text.contains("(through artistSong)"));
        assert!(text.contains("'artistSong'"));
    }

    #[test]
    fn test_collector_deduplicates() {
        let mut collector = WarningCollector::new();
        collector.add(skipped("artist"));
        collector.add(skipped("artist"));
        collector.add(skipped("artistSong"));
        assert_eq!(collector.len(), 2);
    }
}

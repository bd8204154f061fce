//! ERD (Entity-Relationship Diagram) generation module.
//!
//! This module provides:
//! - Entity selection with include/exclude and association filters
//! - Relationship classification with per-pair conflict resolution
//! - Graphviz DOT output with entity tables and cardinality arrows
//!
//! The pipeline is synchronous and keeps no state between calls.

pub mod classify;
pub mod format;
pub mod select;

pub use classify::{classify, Classification, EdgeSpec};
pub use format::{to_dot, ArrowShape, ArrowShapes, DiagramStyle, Direction};
pub use select::{EntityFilter, Selection};

use crate::error::{ErdError, ErdWarning};
use crate::schema::{Schema, TypeRegistry};
use tracing::{debug, warn};

/// Everything that shapes the document besides the schema itself
#[derive(Debug, Clone)]
pub struct DiagramOptions {
    pub filter: EntityFilter,
    /// Draw one row per attribute
    pub columns: bool,
    pub arrow_shapes: ArrowShapes,
    pub style: DiagramStyle,
    pub types: TypeRegistry,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            filter: EntityFilter::default(),
            columns: true,
            arrow_shapes: ArrowShapes::default(),
            style: DiagramStyle::default(),
            types: TypeRegistry::new(),
        }
    }
}

/// A generated diagram description
#[derive(Debug, Clone)]
pub struct ErdDocument {
    /// DOT source text
    pub source: String,
    /// Number of node statements
    pub node_count: usize,
    /// Number of edge statements
    pub edge_count: usize,
    /// Relationships that were left out
    pub warnings: Vec<ErdWarning>,
}

/// Run the selector, classifier and emitter over a schema.
///
/// Fatal errors are returned before any text is produced.
pub fn build_document(schema: &Schema, options: &DiagramOptions) -> Result<ErdDocument, ErdError> {
    let selection = Selection::new(schema, &options.filter)?;
    let nodes = selection.nodes(&options.filter);
    let Classification { edges, warnings } =
        classify(&selection, &options.filter, &options.arrow_shapes);

    if !warnings.is_empty() {
        warn!(
            skipped = warnings.len(),
            "some relationships reference models outside the selection and were not drawn"
        );
    }

    let source = to_dot(
        &nodes,
        &edges,
        options.columns,
        &options.style,
        &options.types,
    );

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        bytes = source.len(),
        "generated diagram document"
    );

    Ok(ErdDocument {
        source,
        node_count: nodes.len(),
        edge_count: edges.len(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Association, AssociationKind, Attribute, AttributeType, Entity};

    fn schema() -> Schema {
        Schema::new(vec![
            Entity::new("Song")
                .attribute(Attribute::new("id", AttributeType::Integer).primary_key())
                .association(
                    Association::new(AssociationKind::ManyToMany, "Artist").through("ArtistSong"),
                ),
            Entity::new("Artist")
                .attribute(Attribute::new("id", AttributeType::Integer).primary_key()),
            Entity::new("ArtistSong")
                .attribute(Attribute::new("songId", AttributeType::Integer).references("Song")),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_document() {
        let doc = build_document(&schema(), &DiagramOptions::default()).unwrap();
        assert_eq!(doc.node_count, 3);
        assert_eq!(doc.edge_count, 1);
        assert!(doc.warnings.is_empty());
        assert!(doc.source.contains("\"Song\" -> \"ArtistSong\""));
        assert!(!doc.source.contains("\"Song\" -> \"Artist\""));
    }

    #[test]
    fn test_build_document_is_deterministic() {
        let schema = schema();
        let options = DiagramOptions::default();
        let first = build_document(&schema, &options).unwrap();
        let second = build_document(&schema, &options).unwrap();
        assert_eq!(first.source, second.source);
    }

    #[test]
    fn test_empty_selection_emits_nothing() {
        let options = DiagramOptions {
            filter: EntityFilter::from_lists(Some(&["Nope".to_string()][..]), &[], None).unwrap(),
            ..DiagramOptions::default()
        };
        let result = build_document(&schema(), &options);
        assert!(matches!(result, Err(ErdError::EmptyModelSet)));
    }
}

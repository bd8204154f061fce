//! Entity-relationship diagrams from ORM model metadata.
//!
//! The pipeline selects entities from a [`schema::Schema`], merges their
//! relationships into one edge per entity pair and emits a Graphviz
//! description, which a [`render::Renderer`] turns into an image.

pub mod config;
pub mod erd;
pub mod error;
pub mod json_schema;
pub mod render;
pub mod schema;

use config::ErdConfig;
use erd::{build_document, ErdDocument};
use error::ErdError;
use render::Renderer;

/// A rendered diagram together with its description
#[derive(Debug, Clone)]
pub struct Diagram {
    pub document: ErdDocument,
    /// Bytes produced by the layout engine
    pub artifact: Vec<u8>,
}

/// Load the schema and produce the diagram description without rendering
pub fn generate_dot(config: &ErdConfig) -> Result<ErdDocument, ErdError> {
    let schema = config.source.load()?;
    build_document(&schema, &config.diagram)
}

/// Load the schema, produce the description and hand it to the renderer.
///
/// Renderer failures are returned unchanged.
pub fn generate(config: &ErdConfig, renderer: &dyn Renderer) -> Result<Diagram, ErdError> {
    let document = generate_dot(config)?;
    let artifact = renderer.render(&document.source, config.format, config.engine)?;
    Ok(Diagram { document, artifact })
}

//! Configuration for ERD generation.
//!
//! Options come from command-line flags and an optional YAML config file.
//! Flags take precedence over file values.

use crate::erd::{ArrowShapes, DiagramOptions, DiagramStyle, Direction, EntityFilter};
use crate::error::ErdError;
use crate::render::{LayoutEngine, RenderFormat};
use crate::schema::{load_schema, AttributeType, Schema, TypeRegistry};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where the model metadata comes from
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Path to a schema document
    Path(PathBuf),
    /// An already loaded schema
    Loaded(Schema),
}

impl SchemaSource {
    /// Load the schema, reading the document if needed
    pub fn load(&self) -> Result<Cow<'_, Schema>, ErdError> {
        match self {
            SchemaSource::Path(path) => load_schema(path).map(Cow::Owned),
            SchemaSource::Loaded(schema) => Ok(Cow::Borrowed(schema)),
        }
    }
}

/// Runtime configuration for a diagram run
#[derive(Debug, Clone)]
pub struct ErdConfig {
    pub source: SchemaSource,
    pub diagram: DiagramOptions,
    pub format: RenderFormat,
    pub engine: LayoutEngine,
}

impl ErdConfig {
    /// Create a new builder
    pub fn builder() -> ErdConfigBuilder {
        ErdConfigBuilder::default()
    }
}

/// Split a comma-separated list, trimming items and dropping empty ones
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builder for ErdConfig
#[derive(Default)]
pub struct ErdConfigBuilder {
    source: Option<PathBuf>,
    schema: Option<Schema>,
    config_file: Option<PathBuf>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    associations: Option<Vec<String>>,
    columns: Option<bool>,
    arrow_shapes: Vec<String>,
    arrow_size: Option<f64>,
    color: Option<String>,
    line_width: Option<f64>,
    direction: Option<String>,
    format: Option<String>,
    engine: Option<String>,
    type_labels: Vec<(String, String)>,
}

impl ErdConfigBuilder {
    /// Path to a schema document
    pub fn source(mut self, path: Option<PathBuf>) -> Self {
        self.source = path;
        self
    }

    /// Use an in-memory schema instead of a document
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Comma-separated entity names or patterns to keep
    pub fn include(mut self, list: Option<&str>) -> Self {
        self.include = list.map(parse_list);
        self
    }

    /// Comma-separated entity names or patterns to drop
    pub fn exclude(mut self, list: Option<&str>) -> Self {
        self.exclude = list.map(parse_list);
        self
    }

    /// Comma-separated entity names restricting which relationships are drawn
    pub fn associations(mut self, list: Option<&str>) -> Self {
        self.associations = list.map(parse_list);
        self
    }

    pub fn columns(mut self, columns: Option<bool>) -> Self {
        self.columns = columns;
        self
    }

    /// Arrow shape overrides in `KIND=SOURCE,TARGET` form
    pub fn arrow_shapes(mut self, overrides: Vec<String>) -> Self {
        self.arrow_shapes = overrides;
        self
    }

    pub fn arrow_size(mut self, size: Option<f64>) -> Self {
        self.arrow_size = size;
        self
    }

    pub fn color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    pub fn line_width(mut self, width: Option<f64>) -> Self {
        self.line_width = width;
        self
    }

    pub fn direction(mut self, direction: Option<String>) -> Self {
        self.direction = direction;
        self
    }

    pub fn format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }

    pub fn engine(mut self, engine: Option<String>) -> Self {
        self.engine = engine;
        self
    }

    /// Type label override, e.g. `STRING` drawn as `VARCHAR`
    pub fn type_label(mut self, tag: impl Into<String>, label: impl Into<String>) -> Self {
        self.type_labels.push((tag.into(), label.into()));
        self
    }

    /// Build the ErdConfig
    pub fn build(self) -> Result<ErdConfig, ErdError> {
        let file = match &self.config_file {
            Some(path) => ErdYamlConfig::load(path)?,
            None => ErdYamlConfig::default(),
        };

        // Source: CLI path, in-memory schema, then config file
        let source = if let Some(path) = self.source {
            SchemaSource::Path(path)
        } else if let Some(schema) = self.schema {
            SchemaSource::Loaded(schema)
        } else if let Some(path) = &file.source {
            SchemaSource::Path(resolve_relative(path, self.config_file.as_deref()))
        } else {
            return Err(ErdError::config(
                "a schema source is required (path to a schema document)",
            ));
        };

        let include = self.include.or_else(|| file.include.clone().map(NameList::into_vec));
        let exclude = self
            .exclude
            .or_else(|| file.exclude.clone().map(NameList::into_vec))
            .unwrap_or_default();
        let associations = self
            .associations
            .or_else(|| file.associations.clone().map(NameList::into_vec));
        let filter = EntityFilter::from_lists(
            include.as_deref(),
            &exclude,
            associations.as_deref(),
        )?;

        // File overrides first so CLI overrides win for the same kind
        let mut arrow_shapes = ArrowShapes::default();
        for (kind, pair) in file.arrow_shapes.iter().flatten() {
            let entry = format!("{}={}", kind, pair.join(","));
            let (kind, source_shape, target_shape) = ArrowShapes::parse_override(&entry)?;
            arrow_shapes.set(kind, source_shape, target_shape);
        }
        for entry in &self.arrow_shapes {
            let (kind, source_shape, target_shape) = ArrowShapes::parse_override(entry)?;
            arrow_shapes.set(kind, source_shape, target_shape);
        }

        let style = build_style(&self.color, self.line_width, self.arrow_size, &self.direction, &file)?;

        let mut types = TypeRegistry::with_labels(file.type_labels.iter().flatten());
        for (tag, label) in self.type_labels {
            types.set_label(AttributeType::from_tag(&tag), label);
        }

        let format = match self.format.or_else(|| file.format.clone()) {
            Some(f) => f.parse().map_err(ErdError::Config)?,
            None => RenderFormat::default(),
        };
        let engine = match self.engine.or_else(|| file.engine.clone()) {
            Some(e) => e.parse().map_err(ErdError::Config)?,
            None => LayoutEngine::default(),
        };

        Ok(ErdConfig {
            source,
            diagram: DiagramOptions {
                filter,
                columns: self.columns.or(file.columns).unwrap_or(true),
                arrow_shapes,
                style,
                types,
            },
            format,
            engine,
        })
    }
}

fn build_style(
    color: &Option<String>,
    line_width: Option<f64>,
    arrow_size: Option<f64>,
    direction: &Option<String>,
    file: &ErdYamlConfig,
) -> Result<DiagramStyle, ErdError> {
    let defaults = DiagramStyle::default();

    let direction: Direction = match direction.as_ref().or(file.direction.as_ref()) {
        Some(d) => d.parse().map_err(ErdError::Config)?,
        None => defaults.direction,
    };

    let style = DiagramStyle {
        graph_name: file.graph_name.clone().unwrap_or(defaults.graph_name),
        direction,
        color: color
            .clone()
            .or_else(|| file.color.clone())
            .unwrap_or(defaults.color),
        line_width: line_width.or(file.line_width).unwrap_or(defaults.line_width),
        arrow_size: arrow_size.or(file.arrow_size).unwrap_or(defaults.arrow_size),
        font_size: file.font_size.unwrap_or(defaults.font_size),
        header_color: file.header_color.clone().unwrap_or(defaults.header_color),
        pad: file.pad.unwrap_or(defaults.pad),
        node_sep: file.node_sep.unwrap_or(defaults.node_sep),
        rank_sep: file.rank_sep.unwrap_or(defaults.rank_sep),
        overlap: file.overlap.unwrap_or(defaults.overlap),
    };

    for (name, value) in [
        ("line width", style.line_width),
        ("arrow size", style.arrow_size),
        ("pad", style.pad),
        ("node separation", style.node_sep),
        ("rank separation", style.rank_sep),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ErdError::config(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
    }
    if style.graph_name.is_empty() {
        return Err(ErdError::config("graph name cannot be empty"));
    }

    Ok(style)
}

/// Paths in a config file are relative to the file's directory
fn resolve_relative(path: &Path, config_file: Option<&Path>) -> PathBuf {
    match config_file.and_then(Path::parent) {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

/// Entity list given either as a comma-separated string or a sequence
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum NameList {
    Csv(String),
    List(Vec<String>),
}

impl NameList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            NameList::Csv(s) => parse_list(&s),
            NameList::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ErdYamlConfig {
    /// Schema document path, relative to this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<NameList>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<NameList>,

    /// Only draw relationships touching these entities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associations: Option<NameList>,

    /// Draw attribute rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<bool>,

    /// Per-kind arrow shapes: `HasOne: [none, tee]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_shapes: Option<BTreeMap<String, Vec<String>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrow_size: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,

    /// lr, rl, tb or bt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pad: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_sep: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_sep: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_name: Option<String>,

    /// Output format passed to the layout engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Graphviz layout engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    /// Labels drawn for attribute types: `STRING: VARCHAR`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_labels: Option<BTreeMap<String, String>>,
}

impl ErdYamlConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ErdError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ErdError::config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| ErdError::config(format!("invalid config {}: {}", path.display(), e)))
    }
}

//! Schema document loading.
//!
//! A schema document lists entities in order, each with its attributes and
//! the associations it declares:
//!
//! ```yaml
//! entities:
//!   - name: song
//!     attributes:
//!       - { name: id, type: INTEGER, primary_key: true }
//!       - { name: albumId, type: INTEGER, references: album }
//!     associations:
//!       - { kind: BelongsTo, target: album }
//! ```

use super::{Association, AssociationKind, Attribute, AttributeType, Entity, Schema};
use crate::error::ErdError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Serialized form of a model schema
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SchemaDocument {
    /// Entities in declaration order
    pub entities: Vec<EntityDef>,
}

/// Serialized entity
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntityDef {
    /// Unique entity name
    pub name: String,
    /// Attributes in column order
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    /// Associations declared by this entity
    #[serde(default)]
    pub associations: Vec<AssociationDef>,
}

/// Serialized attribute
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AttributeDef {
    pub name: String,
    /// Type tag, e.g. `INTEGER` or `STRING(255)`
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary_key: bool,
    /// Referenced entity when this attribute is a foreign key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

/// Serialized association
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssociationDef {
    /// BelongsToMany, BelongsTo, HasMany or HasOne (cardinality names are accepted too)
    pub kind: String,
    /// Target entity name
    pub target: String,
    /// Join entity name for BelongsToMany
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<String>,
    /// Alias label
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl SchemaDocument {
    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self, ErdError> {
        serde_yaml_ng::from_str(content)
            .map_err(|e| ErdError::schema_contract(format!("invalid schema document: {}", e)))
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self, ErdError> {
        serde_json::from_str(content)
            .map_err(|e| ErdError::schema_contract(format!("invalid schema document: {}", e)))
    }

    /// Convert into a schema, checking kinds and entity name uniqueness
    pub fn into_schema(self) -> Result<Schema, ErdError> {
        let mut entities = Vec::with_capacity(self.entities.len());

        for def in self.entities {
            let mut entity = Entity::new(def.name);

            for attr in def.attributes {
                entity.attributes.push(Attribute {
                    name: attr.name,
                    ty: AttributeType::from_tag(&attr.ty),
                    is_primary_key: attr.primary_key,
                    references: attr.references,
                });
            }

            for assoc in def.associations {
                let kind: AssociationKind = assoc.kind.parse().map_err(|e: String| {
                    ErdError::schema_contract(format!("entity '{}': {}", entity.name, e))
                })?;
                entity.associations.push(Association {
                    kind,
                    target: assoc.target,
                    through: assoc.through,
                    alias: assoc.alias,
                });
            }

            entities.push(entity);
        }

        Schema::new(entities)
    }
}

impl Schema {
    /// Load a schema from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self, ErdError> {
        SchemaDocument::from_yaml_str(content)?.into_schema()
    }

    /// Load a schema from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self, ErdError> {
        SchemaDocument::from_json_str(content)?.into_schema()
    }
}

/// Load a schema document from a file. `.json` files are read as JSON,
/// everything else as YAML.
pub fn load_schema(path: &Path) -> Result<Schema, ErdError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ErdError::schema_contract(format!("cannot read {}: {}", path.display(), e))
    })?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let schema = if is_json {
        Schema::from_json_str(&content)
    } else {
        Schema::from_yaml_str(&content)
    }
    .map_err(|e| match e {
        ErdError::SchemaContract(msg) => {
            ErdError::schema_contract(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;

    debug!(
        path = %path.display(),
        entities = schema.len(),
        "loaded schema document"
    );
    Ok(schema)
}

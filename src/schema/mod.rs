//! Model metadata consumed by the ERD pipeline.
//!
//! This module provides:
//! - Data models for entities, attributes and declared associations
//! - A static type-tag table for attribute types
//! - Loading of schema documents (YAML/JSON) with contract checks
//! - Memoized unique-through collections for aggregate instances
//!
//! Associations reference their targets by name. Names are resolved against
//! the schema's lookup table only after the whole schema is loaded, so an
//! entity may refer to one declared later in the document.

mod loader;
mod types;
mod unique;

pub use loader::*;
pub use types::*;
pub use unique::*;

use crate::error::ErdError;
use ahash::AHashMap;
use std::fmt;
use std::str::FromStr;

/// Cardinality of a declared association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssociationKind {
    /// `belongsToMany`: joined through another entity
    ManyToMany,
    /// `belongsTo`: the source holds the foreign key
    ManyToOne,
    /// `hasMany`: the target holds the foreign key
    OneToMany,
    /// `hasOne`
    OneToOne,
}

impl AssociationKind {
    /// Processing order for conflict resolution. Later kinds override
    /// arrow shapes set by earlier ones on the same node pair.
    pub const PRECEDENCE: [AssociationKind; 4] = [
        AssociationKind::ManyToMany,
        AssociationKind::ManyToOne,
        AssociationKind::OneToMany,
        AssociationKind::OneToOne,
    ];

    /// Name used by the association declaration API
    pub fn declaration_name(self) -> &'static str {
        match self {
            AssociationKind::ManyToMany => "BelongsToMany",
            AssociationKind::ManyToOne => "BelongsTo",
            AssociationKind::OneToMany => "HasMany",
            AssociationKind::OneToOne => "HasOne",
        }
    }

    /// Position in [`AssociationKind::PRECEDENCE`]
    pub fn precedence(self) -> usize {
        match self {
            AssociationKind::ManyToMany => 0,
            AssociationKind::ManyToOne => 1,
            AssociationKind::OneToMany => 2,
            AssociationKind::OneToOne => 3,
        }
    }
}

impl FromStr for AssociationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "belongstomany" | "manytomany" => Ok(AssociationKind::ManyToMany),
            "belongsto" | "manytoone" => Ok(AssociationKind::ManyToOne),
            "hasmany" | "onetomany" => Ok(AssociationKind::OneToMany),
            "hasone" | "onetoone" => Ok(AssociationKind::OneToOne),
            _ => Err(format!(
                "Unknown association kind: {}. Valid options: BelongsToMany, BelongsTo, HasMany, HasOne",
                s
            )),
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.declaration_name())
    }
}

/// A named, typed field on an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Field name
    pub name: String,
    /// Type tag
    pub ty: AttributeType,
    /// Whether this attribute is (part of) the primary key
    pub is_primary_key: bool,
    /// Entity referenced by this attribute, if it is a foreign key
    pub references: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_primary_key: false,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn references(mut self, entity: impl Into<String>) -> Self {
        self.references = Some(entity.into());
        self
    }

    pub fn is_foreign_key(&self) -> bool {
        self.references.is_some()
    }
}

/// An association as declared on its source entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub kind: AssociationKind,
    /// Target entity name
    pub target: String,
    /// Join entity name for many-to-many associations
    pub through: Option<String>,
    /// Alias label (`as`)
    pub alias: Option<String>,
}

impl Association {
    pub fn new(kind: AssociationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            through: None,
            alias: None,
        }
    }

    pub fn through(mut self, entity: impl Into<String>) -> Self {
        self.through = Some(entity.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// A record type with ordered attributes and declared associations
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub associations: Vec<Association>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            associations: Vec::new(),
        }
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn association(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    /// Relationships declared by this entity, by name
    pub fn relationships(&self) -> impl Iterator<Item = Relationship<'_>> {
        self.associations.iter().map(move |a| Relationship {
            source: &self.name,
            target: &a.target,
            kind: a.kind,
            through: a.through.as_deref(),
            alias: a.alias.as_deref(),
        })
    }
}

/// A directed association between two entities, referenced by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub kind: AssociationKind,
    pub through: Option<&'a str>,
    pub alias: Option<&'a str>,
}

impl<'a> Relationship<'a> {
    /// The two node names this relationship connects.
    ///
    /// A many-to-many association with a join entity is drawn between the
    /// source and the join entity rather than the target.
    pub fn participants(&self) -> (&'a str, &'a str) {
        match (self.kind, self.through) {
            (AssociationKind::ManyToMany, Some(through)) => (self.source, through),
            _ => (self.source, self.target),
        }
    }
}

/// Complete model schema, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: Vec<Entity>,
    by_name: AHashMap<String, usize>,
}

impl Schema {
    /// Build a schema, rejecting duplicate entity names
    pub fn new(entities: Vec<Entity>) -> Result<Self, ErdError> {
        let mut by_name = AHashMap::with_capacity(entities.len());
        for (idx, entity) in entities.iter().enumerate() {
            if by_name.insert(entity.name.clone(), idx).is_some() {
                return Err(ErdError::schema_contract(format!(
                    "entity '{}' is declared more than once",
                    entity.name
                )));
            }
        }
        Ok(Self { entities, by_name })
    }

    /// Get an entity by name
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.by_name.get(name).map(|&idx| &self.entities[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over entities in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// All declared relationships, entity by entity
    pub fn relationships(&self) -> impl Iterator<Item = Relationship<'_>> {
        self.entities.iter().flat_map(|e| e.relationships())
    }
}

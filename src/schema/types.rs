//! Attribute type tags and the label registry used when drawing columns.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use std::fmt;

/// Attribute type classification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeType {
    String,
    Char,
    Text,
    Citext,
    TinyInt,
    SmallInt,
    MediumInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Decimal,
    Boolean,
    Time,
    /// Date with time
    Date,
    /// Date without time
    DateOnly,
    Now,
    Uuid,
    UuidV1,
    UuidV4,
    Hstore,
    Json,
    Jsonb,
    Blob,
    Enum,
    Array,
    Range,
    Geometry,
    Geography,
    Inet,
    Cidr,
    MacAddr,
    /// Computed attribute with no backing column
    Virtual,
    /// Any other tag, rendered verbatim
    Other(String),
}

/// Canonical tag for every known type, in table order
static CANONICAL_TAGS: &[(&str, AttributeType)] = &[
    ("STRING", AttributeType::String),
    ("CHAR", AttributeType::Char),
    ("TEXT", AttributeType::Text),
    ("CITEXT", AttributeType::Citext),
    ("TINYINT", AttributeType::TinyInt),
    ("SMALLINT", AttributeType::SmallInt),
    ("MEDIUMINT", AttributeType::MediumInt),
    ("INTEGER", AttributeType::Integer),
    ("BIGINT", AttributeType::BigInt),
    ("FLOAT", AttributeType::Float),
    ("REAL", AttributeType::Real),
    ("DOUBLE", AttributeType::Double),
    ("DECIMAL", AttributeType::Decimal),
    ("BOOLEAN", AttributeType::Boolean),
    ("TIME", AttributeType::Time),
    ("DATE", AttributeType::Date),
    ("DATEONLY", AttributeType::DateOnly),
    ("NOW", AttributeType::Now),
    ("UUID", AttributeType::Uuid),
    ("UUIDV1", AttributeType::UuidV1),
    ("UUIDV4", AttributeType::UuidV4),
    ("HSTORE", AttributeType::Hstore),
    ("JSON", AttributeType::Json),
    ("JSONB", AttributeType::Jsonb),
    ("BLOB", AttributeType::Blob),
    ("ENUM", AttributeType::Enum),
    ("ARRAY", AttributeType::Array),
    ("RANGE", AttributeType::Range),
    ("GEOMETRY", AttributeType::Geometry),
    ("GEOGRAPHY", AttributeType::Geography),
    ("INET", AttributeType::Inet),
    ("CIDR", AttributeType::Cidr),
    ("MACADDR", AttributeType::MacAddr),
    ("VIRTUAL", AttributeType::Virtual),
];

/// Upper-cased tag (canonical or alias) to type
static TAG_LOOKUP: Lazy<AHashMap<&'static str, AttributeType>> = Lazy::new(|| {
    let mut map: AHashMap<&'static str, AttributeType> = CANONICAL_TAGS
        .iter()
        .map(|(tag, ty)| (*tag, ty.clone()))
        .collect();

    // Common spellings from SQL dialects and other ORMs
    for (alias, ty) in [
        ("VARCHAR", AttributeType::String),
        ("CHARACTER", AttributeType::Char),
        ("INT", AttributeType::Integer),
        ("INT4", AttributeType::Integer),
        ("INT8", AttributeType::BigInt),
        ("DOUBLE PRECISION", AttributeType::Double),
        ("NUMERIC", AttributeType::Decimal),
        ("BOOL", AttributeType::Boolean),
        ("DATETIME", AttributeType::Date),
        ("TIMESTAMP", AttributeType::Date),
        ("BYTEA", AttributeType::Blob),
    ] {
        map.insert(alias, ty);
    }
    map
});

impl AttributeType {
    /// Parse a type tag such as `STRING(10000)` or `decimal(10, 2)`.
    ///
    /// Parameter lists are dropped. Unknown tags are kept verbatim.
    pub fn from_tag(tag: &str) -> Self {
        let base = tag.split('(').next().unwrap_or(tag).trim();
        let upper = base.to_uppercase();

        TAG_LOOKUP
            .get(upper.as_str())
            .cloned()
            .unwrap_or_else(|| AttributeType::Other(tag.trim().to_string()))
    }

    /// Canonical tag name
    pub fn tag(&self) -> &str {
        match self {
            AttributeType::Other(s) => s,
            known => CANONICAL_TAGS
                .iter()
                .find(|(_, ty)| ty == known)
                .map(|(tag, _)| *tag)
                .unwrap_or("UNKNOWN"),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Maps attribute types to the labels drawn in entity tables.
///
/// Starts from the canonical tag table; overrides replace the label of a
/// single type.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    overrides: AHashMap<AttributeType, String>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with label overrides keyed by type tag
    pub fn with_labels<I, K, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut registry = Self::new();
        for (tag, label) in labels {
            registry.set_label(AttributeType::from_tag(tag.as_ref()), label);
        }
        registry
    }

    pub fn set_label(&mut self, ty: AttributeType, label: impl Into<String>) {
        self.overrides.insert(ty, label.into());
    }

    /// Label for a type
    pub fn label<'a>(&'a self, ty: &'a AttributeType) -> &'a str {
        self.overrides
            .get(ty)
            .map(String::as_str)
            .unwrap_or_else(|| ty.tag())
    }
}

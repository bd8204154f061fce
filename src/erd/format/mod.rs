//! Output formatting options for ERD documents.

mod dot;

pub use dot::to_dot;

use crate::error::ErdError;
use crate::schema::AssociationKind;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Graphviz arrow name: up to four primitive shapes, each with optional
/// `o` (open) and `l`/`r` (half) modifiers, or one of the legacy names.
static ARROW_SHAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:o?[lr]?(?:box|crow|curve|icurve|diamond|dot|inv|none|normal|tee|vee)){1,4}|invdot|invodot|ediamond|open|halfopen|empty|invempty)$",
    )
    .unwrap()
});

/// Layout direction for diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Left to right
    #[default]
    LR,
    /// Right to left
    RL,
    /// Top to bottom
    TB,
    /// Bottom to top
    BT,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lr" | "left-right" | "horizontal" => Ok(Direction::LR),
            "rl" | "right-left" => Ok(Direction::RL),
            "tb" | "td" | "top-bottom" | "top-down" | "vertical" => Ok(Direction::TB),
            "bt" | "bottom-top" | "bottom-up" => Ok(Direction::BT),
            _ => Err(format!(
                "Unknown direction: {}. Valid options: lr, rl, tb, bt",
                s
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LR => write!(f, "LR"),
            Direction::RL => write!(f, "RL"),
            Direction::TB => write!(f, "TB"),
            Direction::BT => write!(f, "BT"),
        }
    }
}

/// A validated Graphviz arrow shape name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrowShape(String);

impl ArrowShape {
    pub fn none() -> Self {
        ArrowShape("none".to_string())
    }

    pub fn crow() -> Self {
        ArrowShape("crow".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ArrowShape {
    type Err = ErdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if ARROW_SHAPE_RE.is_match(&name) {
            Ok(ArrowShape(name))
        } else {
            Err(ErdError::config(format!("unknown arrow shape: {}", s.trim())))
        }
    }
}

impl fmt::Display for ArrowShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arrow shape pair (at source, at target) for every association kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrowShapes {
    pairs: [(ArrowShape, ArrowShape); 4],
}

impl Default for ArrowShapes {
    fn default() -> Self {
        Self {
            pairs: [
                // BelongsToMany
                (ArrowShape::none(), ArrowShape::crow()),
                // BelongsTo
                (ArrowShape::crow(), ArrowShape::none()),
                // HasMany
                (ArrowShape::none(), ArrowShape::crow()),
                // HasOne
                (ArrowShape::none(), ArrowShape::none()),
            ],
        }
    }
}

impl ArrowShapes {
    /// Shapes drawn at the (source, target) ends for a kind
    pub fn get(&self, kind: AssociationKind) -> (&ArrowShape, &ArrowShape) {
        let (source, target) = &self.pairs[kind.precedence()];
        (source, target)
    }

    pub fn set(&mut self, kind: AssociationKind, source: ArrowShape, target: ArrowShape) {
        self.pairs[kind.precedence()] = (source, target);
    }

    /// Parse an override in `KIND=SOURCE,TARGET` form, e.g. `HasOne=none,tee`
    pub fn parse_override(entry: &str) -> Result<(AssociationKind, ArrowShape, ArrowShape), ErdError> {
        let (kind, shapes) = entry.split_once('=').ok_or_else(|| {
            ErdError::config(format!(
                "arrow shape override must look like KIND=SOURCE,TARGET: {}",
                entry
            ))
        })?;
        let kind: AssociationKind = kind.parse().map_err(ErdError::Config)?;
        let pair: Vec<&str> = shapes.split(',').collect();
        match pair.as_slice() {
            [source, target] => Ok((kind, source.parse()?, target.parse()?)),
            _ => Err(ErdError::config(format!(
                "arrow shape override for {} needs exactly two shapes: {}",
                kind, shapes
            ))),
        }
    }
}

/// Cosmetic rendering parameters. None of these change graph topology.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramStyle {
    pub graph_name: String,
    pub direction: Direction,
    pub color: String,
    pub line_width: f64,
    pub arrow_size: f64,
    pub font_size: u32,
    pub header_color: String,
    pub pad: f64,
    pub node_sep: f64,
    pub rank_sep: f64,
    pub overlap: bool,
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self {
            graph_name: "models_diagram".to_string(),
            direction: Direction::LR,
            color: "black".to_string(),
            line_width: 0.75,
            arrow_size: 0.6,
            font_size: 10,
            header_color: "lightblue".to_string(),
            pad: 0.5,
            node_sep: 0.5,
            rank_sep: 2.0,
            overlap: false,
        }
    }
}

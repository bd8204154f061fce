//! Relationship classification and conflict resolution.
//!
//! Every relationship between two selected entities contributes arrow
//! shapes to exactly one [`EdgeSpec`] per unordered node pair. Kinds are
//! processed in [`AssociationKind::PRECEDENCE`] order, so a `HasOne`
//! declared next to a `BelongsToMany` on the same pair decides the final
//! arrow shapes.

use super::format::{ArrowShape, ArrowShapes};
use super::select::{EntityFilter, Selection};
use crate::error::{ErdWarning, WarningCollector};
use crate::schema::{AssociationKind, Relationship};
use ahash::AHashMap;
use tracing::debug;

/// A resolved connector between two node names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeSpec {
    /// Connector between two distinct nodes, in first-seen orientation
    Link {
        tail: String,
        tail_shape: ArrowShape,
        head: String,
        head_shape: ArrowShape,
    },
    /// Self-referencing connector, drawn with a single arrow shape
    Loop { node: String, shape: ArrowShape },
}

impl EdgeSpec {
    /// Arrow shape stored for a node name, if the edge touches it
    pub fn shape_at(&self, name: &str) -> Option<&ArrowShape> {
        match self {
            EdgeSpec::Link {
                tail,
                tail_shape,
                head,
                head_shape,
            } => {
                if tail == name {
                    Some(tail_shape)
                } else if head == name {
                    Some(head_shape)
                } else {
                    None
                }
            }
            EdgeSpec::Loop { node, shape } => (node == name).then_some(shape),
        }
    }

    fn assign(&mut self, name: &str, new_shape: &ArrowShape) {
        match self {
            EdgeSpec::Link {
                tail,
                tail_shape,
                head,
                head_shape,
            } => {
                if tail == name {
                    *tail_shape = new_shape.clone();
                } else if head == name {
                    *head_shape = new_shape.clone();
                }
            }
            EdgeSpec::Loop { node, shape } => {
                if node == name {
                    *shape = new_shape.clone();
                }
            }
        }
    }
}

/// Unordered node pair; a self-loop is keyed by its single name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PairKey {
    Pair(String, String),
    Single(String),
}

impl PairKey {
    fn new(a: &str, b: &str) -> Self {
        if a == b {
            PairKey::Single(a.to_string())
        } else if a < b {
            PairKey::Pair(a.to_string(), b.to_string())
        } else {
            PairKey::Pair(b.to_string(), a.to_string())
        }
    }
}

/// Output of classification
#[derive(Debug, Default)]
pub struct Classification {
    /// Edges in first-created order
    pub edges: Vec<EdgeSpec>,
    /// Relationships that could not be drawn
    pub warnings: Vec<ErdWarning>,
}

/// Collect the drawable relationships of a selection, in schema order.
///
/// Relationships outside the association filter are dropped silently. The
/// rest are drawable when their target and (if present) join entity are
/// selected; otherwise they are reported as warnings.
pub fn collect_relationships<'a>(
    selection: &Selection<'a>,
    filter: &EntityFilter,
    warnings: &mut WarningCollector,
) -> Vec<Relationship<'a>> {
    let mut kept = Vec::new();

    for entity in selection.entities() {
        for rel in entity.relationships() {
            if !filter.matches_relationship(&rel) {
                continue;
            }

            let missing = [Some(rel.target), rel.through]
                .into_iter()
                .flatten()
                .find(|name| !selection.contains(name));

            if let Some(missing) = missing {
                debug!(
                    source = rel.source,
                    target = rel.target,
                    missing,
                    "skipping unrenderable relationship"
                );
                warnings.add(ErdWarning::UnrenderableRelationship {
                    source: rel.source.to_string(),
                    target: rel.target.to_string(),
                    through: rel.through.map(str::to_string),
                    kind: rel.kind,
                    missing: missing.to_string(),
                });
                continue;
            }

            kept.push(rel);
        }
    }

    kept
}

/// Merge relationships into one edge per node pair.
///
/// Later kinds in precedence order overwrite the shapes of earlier ones;
/// within a kind, later relationships overwrite earlier ones.
pub fn resolve_edges(relationships: &[Relationship<'_>], shapes: &ArrowShapes) -> Vec<EdgeSpec> {
    let mut edges: Vec<EdgeSpec> = Vec::new();
    let mut index: AHashMap<PairKey, usize> = AHashMap::new();

    for kind in AssociationKind::PRECEDENCE {
        let (source_shape, target_shape) = shapes.get(kind);

        for rel in relationships.iter().filter(|r| r.kind == kind) {
            let (a, b) = rel.participants();
            let key = PairKey::new(a, b);

            match index.get(&key) {
                Some(&idx) => {
                    let edge = &mut edges[idx];
                    if a == b {
                        edge.assign(a, target_shape);
                    } else {
                        edge.assign(a, source_shape);
                        edge.assign(b, target_shape);
                    }
                }
                None => {
                    let edge = if a == b {
                        EdgeSpec::Loop {
                            node: a.to_string(),
                            shape: target_shape.clone(),
                        }
                    } else {
                        EdgeSpec::Link {
                            tail: a.to_string(),
                            tail_shape: source_shape.clone(),
                            head: b.to_string(),
                            head_shape: target_shape.clone(),
                        }
                    };
                    index.insert(key, edges.len());
                    edges.push(edge);
                }
            }
        }
    }

    edges
}

/// Classify all drawable relationships of a selection
pub fn classify(
    selection: &Selection<'_>,
    filter: &EntityFilter,
    shapes: &ArrowShapes,
) -> Classification {
    let mut warnings = WarningCollector::new();
    let relationships = collect_relationships(selection, filter, &mut warnings);
    let edges = resolve_edges(&relationships, shapes);

    debug!(
        relationships = relationships.len(),
        edges = edges.len(),
        skipped = warnings.len(),
        "classified relationships"
    );

    Classification {
        edges,
        warnings: warnings.into_warnings(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Association, Entity, Schema};
    use pretty_assertions::assert_eq;

    fn link(tail: &str, tail_shape: &str, head: &str, head_shape: &str) -> EdgeSpec {
        EdgeSpec::Link {
            tail: tail.to_string(),
            tail_shape: tail_shape.parse().unwrap(),
            head: head.to_string(),
            head_shape: head_shape.parse().unwrap(),
        }
    }

    fn run(schema: &Schema) -> Classification {
        let filter = EntityFilter::default();
        let selection = Selection::new(schema, &filter).unwrap();
        classify(&selection, &filter, &ArrowShapes::default())
    }

    #[test]
    fn test_one_to_one_overrides_many_to_many() {
        let schema = Schema::new(vec![
            Entity::new("X")
                .association(Association::new(AssociationKind::OneToOne, "Y"))
                .association(Association::new(AssociationKind::ManyToMany, "Y")),
            Entity::new("Y"),
        ])
        .unwrap();

        let result = run(&schema);
        assert_eq!(result.edges, vec![link("X", "none", "Y", "none")]);
    }

    #[test]
    fn test_reverse_declarations_merge_into_one_edge() {
        let schema = Schema::new(vec![
            Entity::new("album").association(Association::new(AssociationKind::OneToMany, "song")),
            Entity::new("song").association(Association::new(AssociationKind::ManyToOne, "album")),
        ])
        .unwrap();

        // BelongsTo is processed first and fixes the orientation
        let result = run(&schema);
        assert_eq!(result.edges, vec![link("song", "crow", "album", "none")]);
    }

    #[test]
    fn test_later_kind_overwrites_both_slots() {
        let schema = Schema::new(vec![
            Entity::new("user").association(Association::new(AssociationKind::ManyToOne, "team")),
            Entity::new("team").association(Association::new(AssociationKind::OneToOne, "user")),
        ])
        .unwrap();

        let result = run(&schema);
        assert_eq!(result.edges, vec![link("user", "none", "team", "none")]);
    }

    #[test]
    fn test_self_loop_collapses_to_single_shape() {
        let schema = Schema::new(vec![Entity::new("Employee")
            .association(Association::new(AssociationKind::ManyToOne, "Employee").alias("manager"))
            .association(Association::new(AssociationKind::OneToMany, "Employee").alias("reports"))])
        .unwrap();

        let result = run(&schema);
        assert_eq!(
            result.edges,
            vec![EdgeSpec::Loop {
                node: "Employee".to_string(),
                shape: ArrowShape::crow(),
            }]
        );
    }

    #[test]
    fn test_self_loop_does_not_touch_other_edges() {
        let schema = Schema::new(vec![
            Entity::new("Employee")
                .association(Association::new(AssociationKind::ManyToOne, "Dept"))
                .association(Association::new(AssociationKind::OneToOne, "Employee")),
            Entity::new("Dept"),
        ])
        .unwrap();

        let result = run(&schema);
        assert_eq!(result.edges.len(), 2);
        assert_eq!(result.edges[0], link("Employee", "crow", "Dept", "none"));
        assert_eq!(
            result.edges[1],
            EdgeSpec::Loop {
                node: "Employee".to_string(),
                shape: ArrowShape::none(),
            }
        );
    }

    #[test]
    fn test_through_entity_redirects_edge() {
        let schema = Schema::new(vec![
            Entity::new("Song").association(
                Association::new(AssociationKind::ManyToMany, "Artist").through("ArtistSong"),
            ),
            Entity::new("Artist"),
            Entity::new("ArtistSong"),
        ])
        .unwrap();

        let result = run(&schema);
        assert_eq!(result.edges, vec![link("Song", "none", "ArtistSong", "crow")]);
        assert!(result.edges[0].shape_at("Artist").is_none());
    }

    #[test]
    fn test_missing_through_entity_is_skipped() {
        let schema = Schema::new(vec![
            Entity::new("Song").association(
                Association::new(AssociationKind::ManyToMany, "Artist").through("ArtistSong"),
            ),
            Entity::new("Artist"),
        ])
        .unwrap();

        let result = run(&schema);
        assert!(result.edges.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            &result.warnings[0],
            ErdWarning::UnrenderableRelationship { missing, .. } if missing == "ArtistSong"
        ));
    }

    #[test]
    fn test_filtered_out_target_is_skipped() {
        let schema = Schema::new(vec![
            Entity::new("song").association(Association::new(AssociationKind::ManyToOne, "album")),
            Entity::new("album"),
        ])
        .unwrap();
        let exclude = vec!["album".to_string()];
        let filter = EntityFilter::from_lists(None, &exclude, None).unwrap();
        let selection = Selection::new(&schema, &filter).unwrap();

        let result = classify(&selection, &filter, &ArrowShapes::default());
        assert!(result.edges.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_edges_in_first_created_order() {
        let schema = Schema::new(vec![
            Entity::new("a")
                .association(Association::new(AssociationKind::OneToOne, "b"))
                .association(Association::new(AssociationKind::ManyToOne, "c")),
            Entity::new("b").association(Association::new(AssociationKind::ManyToMany, "c")),
            Entity::new("c"),
        ])
        .unwrap();

        let result = run(&schema);
        let order: Vec<_> = result
            .edges
            .iter()
            .map(|e| match e {
                EdgeSpec::Link { tail, head, .. } => format!("{}-{}", tail, head),
                EdgeSpec::Loop { node, .. } => node.clone(),
            })
            .collect();
        // BelongsToMany first, then BelongsTo, then HasOne
        assert_eq!(order, vec!["b-c", "a-c", "a-b"]);
    }

    #[test]
    fn test_conflicting_through_entities_last_wins() {
        // Two join entities for the same pair: each yields its own edge and
        // a later declaration on an existing pair overwrites its shapes.
        // There is no stricter tie-break.
        let schema = Schema::new(vec![
            Entity::new("song")
                .association(Association::new(AssociationKind::ManyToMany, "artist").through("credits"))
                .association(Association::new(AssociationKind::ManyToMany, "artist").through("features")),
            Entity::new("credits")
                .association(Association::new(AssociationKind::ManyToMany, "x").through("song")),
            Entity::new("artist"),
            Entity::new("features"),
            Entity::new("x"),
        ])
        .unwrap();

        let result = run(&schema);
        assert_eq!(
            result.edges,
            vec![
                link("song", "crow", "credits", "none"),
                link("song", "none", "features", "crow"),
            ]
        );
    }

    #[test]
    fn test_custom_arrow_shapes() {
        let schema = Schema::new(vec![
            Entity::new("user").association(Association::new(AssociationKind::OneToOne, "profile")),
            Entity::new("profile"),
        ])
        .unwrap();
        let mut shapes = ArrowShapes::default();
        shapes.set(
            AssociationKind::OneToOne,
            "tee".parse().unwrap(),
            "odot".parse().unwrap(),
        );

        let filter = EntityFilter::default();
        let selection = Selection::new(&schema, &filter).unwrap();
        let result = classify(&selection, &filter, &shapes);
        assert_eq!(result.edges, vec![link("user", "tee", "profile", "odot")]);
    }

    #[test]
    fn test_association_filter_drops_unrelated_relationships() {
        let schema = Schema::new(vec![
            Entity::new("song")
                .association(Association::new(AssociationKind::ManyToOne, "album"))
                .association(Association::new(AssociationKind::ManyToOne, "genre")),
            Entity::new("album"),
            Entity::new("genre"),
        ])
        .unwrap();
        let associations = vec!["genre".to_string()];
        let filter = EntityFilter::from_lists(None, &[], Some(associations.as_slice())).unwrap();
        let selection = Selection::new(&schema, &filter).unwrap();

        let result = classify(&selection, &filter, &ArrowShapes::default());
        assert_eq!(result.edges, vec![link("song", "crow", "genre", "none")]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_filtered_relationships_are_not_reported_as_skipped() {
        let schema = Schema::new(vec![
            Entity::new("song")
                .association(Association::new(AssociationKind::ManyToOne, "album"))
                .association(Association::new(AssociationKind::ManyToOne, "genre")),
            Entity::new("album")
                .association(Association::new(AssociationKind::ManyToOne, "label")),
            Entity::new("genre"),
            Entity::new("label"),
        ])
        .unwrap();
        let exclude = vec!["genre".to_string(), "label".to_string()];
        let associations = vec!["song".to_string()];
        let filter =
            EntityFilter::from_lists(None, &exclude, Some(associations.as_slice())).unwrap();
        let selection = Selection::new(&schema, &filter).unwrap();

        let result = classify(&selection, &filter, &ArrowShapes::default());

        // album -> label is outside the association filter, so it is not a warning
        assert_eq!(result.edges, vec![link("song", "crow", "album", "none")]);
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            &result.warnings[0],
            ErdWarning::UnrenderableRelationship { missing, .. } if missing == "genre"
        ));
    }
}

//! Entity selection: include/exclude filters and the association filter.

use crate::error::ErdError;
use crate::schema::{Entity, Relationship, Schema};
use ahash::AHashSet;
use glob::Pattern;
use tracing::debug;

/// Which entities and relationships take part in the diagram
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    /// Keep only entities matching one of these patterns
    pub include: Option<Vec<Pattern>>,
    /// Remove entities matching any of these patterns (applied after include)
    pub exclude: Vec<Pattern>,
    /// Keep only relationships whose source or target is named here
    pub associations: Option<Vec<String>>,
}

impl EntityFilter {
    /// Build a filter from plain name lists. Entries are glob patterns, so a
    /// bare name matches exactly itself.
    pub fn from_lists(
        include: Option<&[String]>,
        exclude: &[String],
        associations: Option<&[String]>,
    ) -> Result<Self, ErdError> {
        Ok(Self {
            include: include.map(compile_patterns).transpose()?,
            exclude: compile_patterns(exclude)?,
            associations: associations.map(|a| a.to_vec()),
        })
    }

    /// Whether a relationship passes the association filter
    pub fn matches_relationship(&self, rel: &Relationship<'_>) -> bool {
        match &self.associations {
            None => true,
            Some(names) => names.iter().any(|n| n == rel.source || n == rel.target),
        }
    }

    /// Whether an entity is drawn as a node. With an association filter,
    /// only entities declaring at least one matching association are drawn.
    pub fn draws_entity(&self, entity: &Entity) -> bool {
        if self.associations.is_none() {
            return true;
        }
        entity
            .relationships()
            .any(|rel| self.matches_relationship(&rel))
    }
}

fn compile_patterns(names: &[String]) -> Result<Vec<Pattern>, ErdError> {
    names
        .iter()
        .map(|n| {
            Pattern::new(n)
                .map_err(|e| ErdError::config(format!("invalid entity pattern '{}': {}", n, e)))
        })
        .collect()
}

/// The filtered entity set, in schema order
#[derive(Debug)]
pub struct Selection<'a> {
    entities: Vec<&'a Entity>,
    names: AHashSet<&'a str>,
}

impl<'a> Selection<'a> {
    /// Apply include, then exclude.
    ///
    /// Fails with [`ErdError::EmptyModelSet`] when nothing is left.
    pub fn new(schema: &'a Schema, filter: &EntityFilter) -> Result<Self, ErdError> {
        let entities: Vec<&Entity> = schema
            .iter()
            .filter(|e| match &filter.include {
                Some(patterns) => patterns.iter().any(|p| p.matches(&e.name)),
                None => true,
            })
            .filter(|e| !filter.exclude.iter().any(|p| p.matches(&e.name)))
            .collect();

        if entities.is_empty() {
            return Err(ErdError::EmptyModelSet);
        }

        debug!(
            selected = entities.len(),
            total = schema.len(),
            "selected entities"
        );

        let names = entities.iter().map(|e| e.name.as_str()).collect();
        Ok(Self { entities, names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Selected entities in schema order
    pub fn entities(&self) -> &[&'a Entity] {
        &self.entities
    }

    /// Entities drawn as nodes under the given filter
    pub fn nodes(&self, filter: &EntityFilter) -> Vec<&'a Entity> {
        self.entities
            .iter()
            .copied()
            .filter(|e| filter.draws_entity(e))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Association, AssociationKind};

    fn music_schema() -> Schema {
        Schema::new(vec![
            Entity::new("playlist"),
            Entity::new("artist"),
            Entity::new("album")
                .association(Association::new(AssociationKind::OneToMany, "song"))
                .association(Association::new(AssociationKind::ManyToOne, "artist")),
            Entity::new("song")
                .association(Association::new(AssociationKind::ManyToOne, "album")),
            Entity::new("songInfo"),
        ])
        .unwrap()
    }

    fn names<'a>(entities: &[&'a Entity]) -> Vec<&'a str> {
        entities.iter().map(|e| e.name.as_str()).collect()
    }

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_filter_keeps_everything() {
        let schema = music_schema();
        let selection = Selection::new(&schema, &EntityFilter::default()).unwrap();
        assert_eq!(selection.len(), 5);
    }

    #[test]
    fn test_include_keeps_schema_order() {
        let schema = music_schema();
        let include = list(&["song", "album"]);
        let filter = EntityFilter::from_lists(Some(include.as_slice()), &[], None).unwrap();
        let selection = Selection::new(&schema, &filter).unwrap();
        assert_eq!(names(selection.entities()), vec!["album", "song"]);
    }

    #[test]
    fn test_include_ignores_unknown_names() {
        let schema = music_schema();
        let include = list(&["song", "lyrics"]);
        let filter = EntityFilter::from_lists(Some(include.as_slice()), &[], None).unwrap();
        let selection = Selection::new(&schema, &filter).unwrap();
        assert_eq!(names(selection.entities()), vec!["song"]);
    }

    #[test]
    fn test_exclude_applies_after_include() {
        let schema = music_schema();
        let include = list(&["song", "album"]);
        let exclude = list(&["album"]);
        let filter = EntityFilter::from_lists(Some(include.as_slice()), &exclude, None).unwrap();
        let selection = Selection::new(&schema, &filter).unwrap();
        assert_eq!(names(selection.entities()), vec!["song"]);
        assert!(!selection.contains("album"));
    }

    #[test]
    fn test_glob_patterns() {
        let schema = music_schema();
        let exclude = list(&["song*"]);
        let filter = EntityFilter::from_lists(None, &exclude, None).unwrap();
        let selection = Selection::new(&schema, &filter).unwrap();
        assert_eq!(names(selection.entities()), vec!["playlist", "artist", "album"]);
    }

    #[test]
    fn test_empty_selection_fails() {
        let schema = music_schema();
        let exclude = list(&["*"]);
        let filter = EntityFilter::from_lists(None, &exclude, None).unwrap();
        let result = Selection::new(&schema, &filter);
        assert!(matches!(result, Err(ErdError::EmptyModelSet)));
    }

    #[test]
    fn test_empty_schema_fails() {
        let schema = Schema::new(vec![]).unwrap();
        let result = Selection::new(&schema, &EntityFilter::default());
        assert!(matches!(result, Err(ErdError::EmptyModelSet)));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let include = list(&["[song"]);
        let result = EntityFilter::from_lists(Some(include.as_slice()), &[], None);
        assert!(matches!(result, Err(ErdError::Config(_))));
    }

    #[test]
    fn test_association_filter_limits_nodes() {
        let schema = music_schema();
        let associations = list(&["artist"]);
        let filter = EntityFilter::from_lists(None, &[], Some(associations.as_slice())).unwrap();
        let selection = Selection::new(&schema, &filter).unwrap();

        // Only album declares an association touching artist
        assert_eq!(names(&selection.nodes(&filter)), vec!["album"]);
        // The selection itself is unaffected
        assert_eq!(selection.len(), 5);
    }
}

//! Unique items reachable through a nested collection.
//!
//! Mirrors the "unique X through Y" virtual attribute found on model
//! aggregates: an album's artists are the artists of its songs, with
//! duplicates removed. The derived list is memoized per instance and the
//! memo is dropped whenever the nested collection changes.

use ahash::AHashSet;
use std::hash::Hash;

/// Memoized unique-through collection for one aggregate instance
#[derive(Debug, Clone)]
pub struct UniqueThrough<T, K> {
    /// Near collection: each element carries its deep items
    groups: Vec<Vec<T>>,
    key: fn(&T) -> K,
    cached: Option<Option<Vec<T>>>,
    computations: usize,
}

impl<T, K> UniqueThrough<T, K>
where
    T: Clone,
    K: Eq + Hash,
{
    pub fn new(groups: Vec<Vec<T>>, key: fn(&T) -> K) -> Self {
        Self {
            groups,
            key,
            cached: None,
            computations: 0,
        }
    }

    /// Unique deep items in first-seen order, or `None` when there are none
    pub fn get(&mut self) -> Option<&[T]> {
        if self.cached.is_none() {
            self.cached = Some(self.compute());
            self.computations += 1;
        }
        self.cached.as_ref().and_then(|c| c.as_deref())
    }

    /// Replace the near collection
    pub fn replace(&mut self, groups: Vec<Vec<T>>) {
        self.groups = groups;
        self.cached = None;
    }

    /// Append one near element with its deep items
    pub fn push_group(&mut self, group: Vec<T>) {
        self.groups.push(group);
        self.cached = None;
    }

    /// Mutable access to the near collection. Drops the memo.
    pub fn groups_mut(&mut self) -> &mut Vec<Vec<T>> {
        self.cached = None;
        &mut self.groups
    }

    pub fn groups(&self) -> &[Vec<T>] {
        &self.groups
    }

    /// How many times the derived collection has been computed
    pub fn computations(&self) -> usize {
        self.computations
    }

    fn compute(&self) -> Option<Vec<T>> {
        let mut seen = AHashSet::new();
        let unique: Vec<T> = self
            .groups
            .iter()
            .flatten()
            .filter(|item| seen.insert((self.key)(*item)))
            .cloned()
            .collect();

        if unique.is_empty() {
            None
        } else {
            Some(unique)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Artist {
        id: u32,
        name: &'static str,
    }

    fn artist(id: u32, name: &'static str) -> Artist {
        Artist { id, name }
    }

    fn artist_id(a: &Artist) -> u32 {
        a.id
    }

    #[test]
    fn test_unique_by_key_in_first_seen_order() {
        let tegan = artist(0, "Tegan and Sara");
        let yyy = artist(1, "The Yeah Yeah Yeahs");
        let sleater = artist(2, "Sleater Kinney");
        let miley = artist(3, "Miley Cyrus");
        let jett = artist(4, "Joan Jett");

        let mut artists = UniqueThrough::new(
            vec![
                vec![tegan.clone()],
                vec![sleater.clone()],
                vec![yyy.clone()],
                vec![yyy.clone()],
                vec![miley.clone(), jett.clone()],
            ],
            artist_id,
        );

        assert_eq!(
            artists.get().unwrap(),
            &[tegan, sleater, yyy, miley, jett][..]
        );
    }

    #[test]
    fn test_empty_is_none() {
        let mut artists: UniqueThrough<Artist, u32> =
            UniqueThrough::new(vec![vec![], vec![]], artist_id);
        assert!(artists.get().is_none());
    }

    #[test]
    fn test_result_is_cached() {
        let mut artists = UniqueThrough::new(vec![vec![artist(1, "a")], vec![artist(2, "b")]], artist_id);
        artists.get();
        artists.get();
        assert_eq!(artists.computations(), 1);
    }

    #[test]
    fn test_empty_result_is_cached_too() {
        let mut artists: UniqueThrough<Artist, u32> = UniqueThrough::new(vec![], artist_id);
        assert!(artists.get().is_none());
        assert!(artists.get().is_none());
        assert_eq!(artists.computations(), 1);
    }

    #[test]
    fn test_mutation_invalidates_cache() {
        let mut artists = UniqueThrough::new(vec![vec![artist(1, "a")]], artist_id);
        assert_eq!(artists.get().unwrap().len(), 1);

        artists.push_group(vec![artist(2, "b"), artist(1, "a")]);
        assert_eq!(artists.get().unwrap().len(), 2);
        assert_eq!(artists.computations(), 2);

        artists.groups_mut()[0].clear();
        let ids: Vec<u32> = artists.get().unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1]);

        artists.replace(vec![]);
        assert!(artists.get().is_none());
        assert_eq!(artists.computations(), 4);
    }

    #[test]
    fn test_instances_do_not_share_memo() {
        let mut first = UniqueThrough::new(vec![vec![artist(1, "a")]], artist_id);
        let mut second = first.clone();
        second.push_group(vec![artist(2, "b")]);

        assert_eq!(first.get().unwrap().len(), 1);
        assert_eq!(second.get().unwrap().len(), 2);
        assert_eq!(first.groups().len(), 1);
    }
}

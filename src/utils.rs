//! Mapping capability shared by `RobinHoodMap` and the standard library map

use crate::RobinHoodMap;
use std::{
    collections::{HashMap, hash_map},
    hash::{BuildHasher, Hash},
};

/// The operations a key-value container offers, independent of its storage.
///
/// Code written against this trait runs unchanged on a [`RobinHoodMap`] and on a
/// [`HashMap`], which is how the property tests and benchmarks compare the two.
pub trait Mapping<K, V> {
    /// Iterator over the stored pairs
    type Iter<'a>: Iterator<Item = (&'a K, &'a V)>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Returns the value stored for `key`
    fn get(&self, key: &K) -> Option<&V>;

    /// Stores `value` under `key`, returning the replaced value
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Removes `key`, returning its value
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Returns the number of stored pairs
    fn len(&self) -> usize;

    /// Iterates over the stored pairs in no particular order
    fn iter(&self) -> Self::Iter<'_>;

    /// Returns true if nothing is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the given key is stored
    fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the keys as a Vec
    fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Returns the values as a Vec
    fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }
}

impl<K, V, S> Mapping<K, V> for RobinHoodMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Iter<'a>
        = crate::table::Iter<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn get(&self, key: &K) -> Option<&V> {
        Self::get(self, key)
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Self::insert(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        Self::remove(self, key)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        Self::iter(self)
    }
}

impl<K, V, S> Mapping<K, V> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Iter<'a>
        = hash_map::Iter<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn get(&self, key: &K) -> Option<&V> {
        Self::get(self, key)
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Self::insert(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        Self::remove(self, key)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn iter(&self) -> Self::Iter<'_> {
        Self::iter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the same sequence against any mapping and returns its sorted contents
    fn exercise<M: Mapping<String, i32>>(map: &mut M) -> Vec<(String, i32)> {
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);
        map.insert("c".to_string(), 3);
        map.insert("a".to_string(), 10);
        map.remove(&"b".to_string());

        let mut pairs: Vec<(String, i32)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_same_behaviour_as_std() {
        let mut ours = RobinHoodMap::new();
        let mut std_map = HashMap::new();

        assert_eq!(exercise(&mut ours), exercise(&mut std_map));
        assert_eq!(Mapping::len(&ours), 2);
    }

    #[test]
    fn test_keys_and_values() {
        let mut map = RobinHoodMap::new();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);
        map.insert("c".to_string(), 3);

        let mut keys = Mapping::keys(&map);
        keys.sort(); // Sort for predictable comparison

        let mut values = Mapping::values(&map);
        values.sort_unstable();

        assert_eq!(keys, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_contains_key() {
        let mut map = RobinHoodMap::new();
        map.insert("a".to_string(), 1);

        assert!(Mapping::contains_key(&map, &"a".to_string()));
        assert!(!Mapping::contains_key(&map, &"b".to_string()));
        assert!(!Mapping::is_empty(&map));
    }
}

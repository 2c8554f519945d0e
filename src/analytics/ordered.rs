//! Insertion-ordered map used for distributions and per-key breakdowns.
//!
//! Keys serialize as a JSON object in the order they were first seen, which
//! keeps report output stable across runs.

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use std::{collections::HashMap, fmt, marker::PhantomData};

#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

/// Occurrence count per key
pub type Distribution = OrderedMap<u64>;

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Returns the value for `key`, inserting `V::default()` on first sight
    pub fn entry_or_default(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        let i = match self.index.get(key) {
            Some(&i) => i,
            None => {
                self.entries.push((key.to_string(), V::default()));
                let i = self.entries.len() - 1;
                self.index.insert(key.to_string(), i);
                i
            }
        };
        &mut self.entries[i].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Stable sort: entries comparing equal keep their first-seen order
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&V, &V) -> std::cmp::Ordering,
    {
        self.entries.sort_by(|a, b| compare(&a.1, &b.1));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
    }
}

impl OrderedMap<u64> {
    pub fn increment(&mut self, key: &str) {
        *self.entry_or_default(key) += 1;
    }

    pub fn count(&self, key: &str) -> u64 {
        self.get(key).copied().unwrap_or(0)
    }

    /// Counts every key yielded by `keys`
    pub fn tally<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut distribution = Self::new();
        for key in keys {
            distribution.increment(key);
        }
        distribution
    }

    /// The `limit` highest counts; ties keep first-seen order
    pub fn most_common(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self.iter().map(|(k, &v)| (k, v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);
        ranked
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            match map.index.get(&key) {
                Some(&i) => map.entries[i].1 = value,
                None => {
                    map.index.insert(key.clone(), map.entries.len());
                    map.entries.push((key, value));
                }
            }
        }
        Ok(map)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_keeps_first_seen_order() {
        let distribution = Distribution::tally(["open", "closed", "open", "completed"]);
        let keys: Vec<&str> = distribution.keys().collect();
        assert_eq!(keys, vec!["open", "closed", "completed"]);
        assert_eq!(distribution.count("open"), 2);
        assert_eq!(distribution.count("missing"), 0);
    }

    #[test]
    fn test_most_common_breaks_ties_by_insertion() {
        let distribution = Distribution::tally(["x", "y", "z", "y", "x"]);
        let top = distribution.most_common(2);
        assert_eq!(top, vec![("x", 2), ("y", 2)]);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let distribution = Distribution::tally(["b", "a", "b"]);
        let json = serde_json::to_string(&distribution).unwrap();
        assert_eq!(json, r#"{"b":2,"a":1}"#);

        let back: Distribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, distribution);
    }

    #[test]
    fn test_sort_by_reindexes_lookups() {
        let mut distribution = Distribution::tally(["a", "b", "b"]);
        distribution.sort_by(|x, y| y.cmp(x));
        assert_eq!(distribution.keys().next(), Some("b"));
        assert_eq!(distribution.count("a"), 1);
        assert_eq!(distribution.count("b"), 2);
    }
}

//! # Mutation Records
//!
//! The persisted representation of a block's dynamic shape: an ordered,
//! attribute-keyed string map. One record per block.
//!
//! ## Design
//!
//! - Attribute order is part of the persistence contract, so entries are kept
//!   in insertion order rather than in a hash map
//! - Setting an existing key overwrites its value in place (position is kept)
//! - Typed readers (`get_int`, `get_bool`) never fail: malformed text reads
//!   as `None` and the caller clamps or skips

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ordered attribute map persisted for a single block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationRecord {
    entries: Vec<(String, String)>,
}

impl MutationRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set an attribute. Overwrites in place if the key already exists,
    /// otherwise appends.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Get an attribute value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the record contains an attribute
    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Read an attribute as a decimal integer. `None` if absent or malformed.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.trim().parse().ok()
    }

    /// Read an attribute written as the literal text `"true"`/`"false"`.
    /// `None` if absent or anything else.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for MutationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = MutationRecord;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string-to-string attribute map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut record = MutationRecord::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            record.set(key, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for MutationRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_preserves_insertion_order() {
        let mut record = MutationRecord::new();
        record.set("numArgs", "2");
        record.set("arg0", "x");
        record.set("arg1", "y");

        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["numArgs", "arg0", "arg1"]);
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut record = MutationRecord::new();
        record.set("a", "1");
        record.set("b", "2");
        record.set("a", "3");

        assert_eq!(record.get("a"), Some("3"));
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_typed_readers() {
        let mut record = MutationRecord::new();
        record.set("count", "3");
        record.set("neg", "-5");
        record.set("flag", "true");
        record.set("junk", "banana");

        assert_eq!(record.get_int("count"), Some(3));
        assert_eq!(record.get_int("neg"), Some(-5));
        assert_eq!(record.get_int("junk"), None);
        assert_eq!(record.get_int("missing"), None);
        assert_eq!(record.get_bool("flag"), Some(true));
        assert_eq!(record.get_bool("junk"), None);
    }

    #[test]
    fn test_serde_round_trip_keeps_order() {
        let mut record = MutationRecord::new();
        record.set("_expanded", "2");
        record.set("_input_init", "true");

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"_expanded":"2","_input_init":"true"}"#);

        let restored: MutationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);
    }
}

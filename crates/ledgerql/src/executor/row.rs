//! Row representation for query execution.
//!
//! A row is a mapping from field name to [`Value`]. Rows produced by a
//! join carry the union of both inputs' fields, each re-keyed with the
//! owning table's name and an underscore to disambiguate collisions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Value;

/// A single row of named values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: BTreeMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the value of a field, reading an absent field as null.
    pub fn get_or_null(&self, field: &str) -> Value {
        self.fields.get(field).cloned().unwrap_or(Value::Null)
    }

    /// Sets a field, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Returns true if the row has the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns an iterator over `(field, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Returns an iterator over the field names in field order.
    pub fn field_names(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Returns a copy of this row with every field re-keyed as
    /// `<table>_<field>`.
    pub fn prefixed(&self, table: &str) -> Row {
        self.fields
            .iter()
            .map(|(field, value)| (format!("{}_{}", table, field), value.clone()))
            .collect()
    }

    /// Returns the union of this row's fields and `other`'s. On a key
    /// collision `other` wins, which cannot happen for join output since
    /// both sides are prefixed with distinct table names first.
    pub fn merged(mut self, other: Row) -> Row {
        self.fields.extend(other.fields);
        self
    }

    /// Projects this row down to the given fields, omitting any that
    /// are absent.
    pub fn project<'a, I: IntoIterator<Item = &'a str>>(&self, fields: I) -> Row {
        fields
            .into_iter()
            .filter_map(|field| {
                self.fields
                    .get(field)
                    .map(|value| (field.to_string(), value.clone()))
            })
            .collect()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

//! Log records and their structured fields

use crate::Level;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt::Display;

/// Structured key/value pairs attached to a record.
///
/// Keys keep their insertion order. Inserting an existing key replaces its
/// value but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(IndexMap<String, String>);

impl Fields {
    /// Empty field set
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Inserts or replaces `key`
    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) -> &mut Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Inserts every pair of `other`, later values winning
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl<K: Into<String>, V: Display> Extend<(K, V)> for Fields {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// A single log event
#[derive(Debug, Clone)]
pub struct Record<'a> {
    /// When the event was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: Level,
    /// The log message
    pub message: Cow<'a, str>,
    /// Structured fields
    pub fields: Cow<'a, Fields>,
}

impl<'a> Record<'a> {
    /// Create a record stamped with the current time
    #[inline]
    pub fn new(level: Level, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields: Cow::Owned(Fields::new()),
        }
    }

    /// Builder-style method for attaching fields
    #[inline]
    #[must_use]
    pub fn with_fields(mut self, fields: &'a Fields) -> Self {
        self.fields = Cow::Borrowed(fields);
        self
    }

    /// Builder-style method for overriding the timestamp
    #[inline]
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

//! `Key=Value;Key=Value;` connection string grammar as printed by az.

use std::fmt;
use std::str::FromStr;

use crate::error::{AzError, Result};

/// Ordered key/value pairs of a connection string. Keys keep the case az
/// printed them in and lookups are exact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionProperties {
    entries: Vec<(String, String)>,
}

impl ConnectionProperties {
    /// Parse a connection string.
    ///
    /// Surrounding quotes and trailing `;` on the whole string are ignored.
    /// Each entry splits on its first `=`, so values may contain `=`
    /// (base64 account keys do). Empty entries are skipped.
    pub fn parse(raw: &str) -> Result<Self> {
        let body = raw.trim().trim_matches('"').trim_end_matches(';');

        let mut props = Self::default();
        for entry in body.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| AzError::Parse(format!("entry '{}' has no '='", entry)))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(AzError::Parse(format!("entry '{}' has an empty key", entry)));
            }
            props.insert(key, value.trim());
        }
        Ok(props)
    }

    /// Insert or replace a property
    pub fn insert(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Self::get), but a missing key is a parse error
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| AzError::Parse(format!("missing '{}' property", key)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for ConnectionProperties {
    type Err = AzError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Canonical form: `k=v;` for every entry, in order
impl fmt::Display for ConnectionProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            write!(f, "{}={};", key, value)?;
        }
        Ok(())
    }
}

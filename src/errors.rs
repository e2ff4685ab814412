//! Validation error collections.
//!
//! `Errors` accumulates validation messages keyed by attribute name. Merging
//! a nested record's collection copies every pair under its original key and
//! never renames or mutates the source, so repeated validation runs settle
//! on the same set of messages.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Insertion ordered collection of validation messages per attribute.
///
/// Adding the same `(attribute, message)` pair twice keeps a single copy,
/// which makes merges from nested records idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Errors {
    entries: Vec<(String, Vec<String>)>,
}

impl Errors {
    /// Create an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Total number of messages across all attributes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.1.len()).sum()
    }

    /// Whether the collection holds no messages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a message for an attribute, ignoring an exact duplicate
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        let attribute = attribute.into();
        let message = message.into();
        match self.entries.iter_mut().find(|entry| entry.0 == attribute) {
            Some(entry) => {
                if !entry.1.contains(&message) {
                    entry.1.push(message);
                }
            }
            None => self.entries.push((attribute, vec![message])),
        }
    }

    /// Copy every `(attribute, message)` pair from another collection.
    ///
    /// Keys are preserved as they appear in `other`. The source collection
    /// is left untouched and duplicate pairs are not added twice.
    pub fn merge(&mut self, other: &Errors) {
        for (attribute, messages) in other.iter() {
            for message in messages {
                self.add(attribute, message.clone());
            }
        }
    }

    /// Messages recorded for one attribute, empty when there are none
    #[must_use]
    pub fn get(&self, attribute: &str) -> &[String] {
        self.entries
            .iter()
            .find(|entry| entry.0 == attribute)
            .map(|entry| entry.1.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any message is recorded for the attribute
    #[must_use]
    pub fn contains(&self, attribute: &str) -> bool {
        self.entries.iter().any(|entry| entry.0 == attribute)
    }

    /// Attribute names with at least one message, in insertion order
    #[must_use]
    pub fn attribute_names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.0.as_str()).collect()
    }

    /// Human readable messages, attribute name prepended.
    ///
    /// Messages filed under `base` describe the whole object and are
    /// returned as they are.
    #[must_use]
    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = Vec::with_capacity(self.len());
        for (attribute, attribute_messages) in self.iter() {
            for message in attribute_messages {
                if attribute == "base" {
                    messages.push(message.clone());
                } else {
                    messages.push(format!("{} {}", humanize(attribute), message));
                }
            }
        }
        messages
    }

    /// Remove every message
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over `(attribute, messages)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|entry| (entry.0.as_str(), entry.1.as_slice()))
    }
}

fn humanize(attribute: &str) -> String {
    let spaced = attribute.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

impl Serialize for Errors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (attribute, messages) in &self.entries {
            map.serialize_entry(attribute, messages)?;
        }
        map.end()
    }
}

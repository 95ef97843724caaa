//! Result normalization: hoists identity-bearing objects out of a nested
//! payload into a flat `type -> id -> document` table.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::config::DocumentKeys;

/// `type name -> (id -> normalized document)`.
pub type Documents = HashMap<String, HashMap<String, Value>>;

/// Walks JSON values depth-first and replaces every document with its id.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    keys: DocumentKeys,
}

impl Normalizer {
    pub fn new(keys: DocumentKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &DocumentKeys {
        &self.keys
    }

    /// Returns `(typename, id)` if the object carries both identity keys as strings.
    pub fn identity<'a>(&self, object: &'a Map<String, Value>) -> Option<(&'a str, &'a str)> {
        let id = object.get(&self.keys.id)?.as_str()?;
        let typename = object.get(&self.keys.typename)?.as_str()?;
        Some((typename, id))
    }

    pub fn is_document(&self, value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|object| self.identity(object).is_some())
    }

    /// Normalize `value`, writing every discovered document into `into`.
    ///
    /// The returned value mirrors the input's structure with each document
    /// replaced by its id string. Writing an existing `(type, id)` replaces
    /// the previous document wholesale. Input is assumed acyclic.
    ///
    /// ```
    /// use serde_json::json;
    /// use superbia_store::{Documents, Normalizer};
    ///
    /// let mut documents = Documents::new();
    /// let value = Normalizer::default().normalize(
    ///     &json!({ "id": "1", "_typename": "User", "name": "Ada" }),
    ///     &mut documents,
    /// );
    ///
    /// assert_eq!(value, json!("1"));
    /// assert_eq!(documents["User"]["1"]["name"], "Ada");
    /// ```
    pub fn normalize(&self, value: &Value, into: &mut Documents) -> Value {
        match value {
            Value::Array(elements) => Value::Array(
                elements
                    .iter()
                    .map(|element| self.normalize(element, into))
                    .collect(),
            ),
            Value::Object(object) => {
                let normalized: Map<String, Value> = object
                    .iter()
                    .map(|(key, field)| (key.clone(), self.normalize(field, into)))
                    .collect();

                match self.identity(object) {
                    Some((typename, id)) => {
                        into.entry(typename.to_string())
                            .or_default()
                            .insert(id.to_string(), Value::Object(normalized));
                        Value::String(id.to_string())
                    }
                    None => Value::Object(normalized),
                }
            }
            // null, strings, numbers and booleans pass through
            other => other.clone(),
        }
    }
}

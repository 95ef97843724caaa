//! Identity and pagination configuration shared by every store of one `Api`.

use serde::{Deserialize, Serialize};

/// The two object keys that make a JSON object a document.
///
/// An object is a document only if both keys are present and hold strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentKeys {
    pub id: String,
    pub typename: String,
}

impl Default for DocumentKeys {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            typename: "_typename".to_string(),
        }
    }
}

impl DocumentKeys {
    pub fn new(id: impl Into<String>, typename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            typename: typename.into(),
        }
    }
}

/// Configuration for an [`Api`](crate::Api) and the stores it owns.
///
/// Deserializes from partial JSON; missing fields fall back to defaults.
///
/// ```
/// use superbia_store::{ApiConfig, DocumentKeys};
///
/// let config = ApiConfig::default()
///     .with_keys(DocumentKeys::new("id", "__typename__"))
///     .with_pagination_suffix("Connection");
///
/// assert_eq!(config.keys.typename, "__typename__");
/// assert!(config.is_pagination_type("UserConnection"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub keys: DocumentKeys,
    /// Type names ending with this marker are treated as pagination results.
    pub pagination_suffix: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            keys: DocumentKeys::default(),
            pagination_suffix: "Pagination".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(mut self, keys: DocumentKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_pagination_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.pagination_suffix = suffix.into();
        self
    }

    pub fn is_pagination_type(&self, typename: &str) -> bool {
        typename.ends_with(&self.pagination_suffix)
    }
}

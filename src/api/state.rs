use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::normalize::Documents;
use crate::request::Requests;

/// Snapshot of both stores, laid out exactly like their in-memory tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub documents: Documents,
    pub requests: Requests,
}

impl PersistedState {
    pub fn to_json(&self) -> Result<String, ApiError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(json)?)
    }
}

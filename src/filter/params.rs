//! Raw caller parameters, as they arrive from a query string or JSON body

use serde::{Deserialize, Serialize};

/// A parameter that may arrive as a JSON number or as a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl ParamValue {
    /// Text form, trimmed
    pub fn as_text(&self) -> String {
        match self {
            ParamValue::Int(n) => n.to_string(),
            ParamValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Int(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Int(n as i64)
    }
}

impl From<u64> for ParamValue {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => ParamValue::Int(n),
            Err(_) => ParamValue::Text(n.to_string()),
        }
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

/// Unvalidated filter and paging parameters.
///
/// Only `FilterSpec::from_params` turns these into something the planner
/// accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilterParams {
    #[serde(default)]
    pub status: Option<ParamValue>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub recent_errors: Vec<String>,
    #[serde(default)]
    pub start: Option<ParamValue>,
    #[serde(default)]
    pub length: Option<ParamValue>,
}

impl RawFilterParams {
    /// Sets the status code
    pub fn with_status(mut self, status: impl Into<ParamValue>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the free-text search
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Adds a recent-error function id
    pub fn with_recent_error(mut self, function_id: impl Into<String>) -> Self {
        self.recent_errors.push(function_id.into());
        self
    }

    /// Sets start and length
    pub fn with_paging(mut self, start: impl Into<ParamValue>, length: impl Into<ParamValue>) -> Self {
        self.start = Some(start.into());
        self.length = Some(length.into());
        self
    }
}

//! Install and uninstall request bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{self, Result};

/// A request to install (or locate) a package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageRequest {
    #[serde(default)]
    pub name: String,
    /// Pinned version; latest when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Install options, nested objects or dotted names
    #[serde(default, alias = "config")]
    pub options: Map<String, Value>,
}

impl PackageRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: Value) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    /// Parse an install request body
    pub fn parse(body: &[u8]) -> Result<Self> {
        let request: Self = serde_json::from_slice(body)
            .map_err(|e| error::request::parse_failed(e.to_string()))?;
        request.validated()
    }

    /// Parse an uninstall request body; `name` from the path replaces any
    /// name in the body, and an empty body is allowed
    pub fn parse_for_name(body: &[u8], name: &str) -> Result<Self> {
        let mut request = if body.iter().all(u8::is_ascii_whitespace) {
            Self::default()
        } else {
            serde_json::from_slice(body).map_err(|e| error::request::parse_failed(e.to_string()))?
        };
        request.name = name.to_string();
        request.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.name.trim().is_empty() {
            return Err(error::request::parse_failed("missing package name"));
        }
        if self.version.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(error::request::parse_failed("empty package version"));
        }
        Ok(self)
    }
}

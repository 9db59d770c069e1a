//! Package configuration schemas
//!
//! Catalogs describe install options with a JSON-Schema-like `config.json`.
//! Only what install validation needs is kept: nested `properties` are
//! flattened into dotted option names (`redis.memory`), each with an
//! optional type, default and required flag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{self, Result};

/// JSON type an option value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl OptionType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(OptionType::String),
            "integer" => Some(OptionType::Integer),
            "number" => Some(OptionType::Number),
            "boolean" => Some(OptionType::Boolean),
            "array" => Some(OptionType::Array),
            "object" => Some(OptionType::Object),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            OptionType::String => "string",
            OptionType::Integer => "integer",
            OptionType::Number => "number",
            OptionType::Boolean => "boolean",
            OptionType::Array => "array",
            OptionType::Object => "object",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            OptionType::String => value.is_string(),
            OptionType::Integer => value.is_i64() || value.is_u64(),
            OptionType::Number => value.is_number(),
            OptionType::Boolean => value.is_boolean(),
            OptionType::Array => value.is_array(),
            OptionType::Object => value.is_object(),
        }
    }
}

/// One recognised install option
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSpec {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<OptionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Install options a package recognises, keyed by dotted name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSchema {
    options: BTreeMap<String, OptionSpec>,
}

/// Options after validation: supplied values merged over defaults
pub type ResolvedOptions = BTreeMap<String, Value>;

impl ConfigSchema {
    pub fn new(options: BTreeMap<String, OptionSpec>) -> Self {
        Self { options }
    }

    /// Build from a JSON-Schema-style object (`config.json`)
    pub fn from_json_schema(schema: &Value) -> Self {
        let mut options = BTreeMap::new();
        collect_properties(schema, "", &mut options);
        Self { options }
    }

    pub fn options(&self) -> &BTreeMap<String, OptionSpec> {
        &self.options
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn has_options_under(&self, prefix: &str) -> bool {
        let prefix = format!("{prefix}.");
        self.options
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(name, _)| name.starts_with(&prefix))
    }

    /// Validate `supplied` against this schema and fill in defaults.
    ///
    /// Supplied options may be nested objects or dotted names. Unknown
    /// options, values of the wrong type and required options with neither
    /// a value nor a default are rejected.
    pub fn resolve(&self, package: &str, supplied: &Map<String, Value>) -> Result<ResolvedOptions> {
        let mut given = BTreeMap::new();
        self.flatten_supplied(package, "", supplied, &mut given)?;

        let mut resolved = ResolvedOptions::new();
        for (name, spec) in &self.options {
            match given.remove(name) {
                Some(value) => {
                    if let Some(kind) = spec.kind {
                        if !kind.accepts(&value) {
                            return Err(error::request::invalid_option_type(name, kind.name()));
                        }
                    }
                    resolved.insert(name.clone(), value);
                }
                None => match &spec.default {
                    Some(default) => {
                        resolved.insert(name.clone(), default.clone());
                    }
                    None if spec.required => {
                        return Err(error::request::missing_option(package, name));
                    }
                    None => {}
                },
            }
        }

        Ok(resolved)
    }

    fn flatten_supplied(
        &self,
        package: &str,
        prefix: &str,
        supplied: &Map<String, Value>,
        out: &mut BTreeMap<String, Value>,
    ) -> Result<()> {
        for (key, value) in supplied {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if self.options.contains_key(&path) {
                out.insert(path, value.clone());
            } else if let (Value::Object(nested), true) = (value, self.has_options_under(&path)) {
                self.flatten_supplied(package, &path, nested, out)?;
            } else {
                return Err(error::request::unknown_option(package, path));
            }
        }
        Ok(())
    }
}

fn collect_properties(schema: &Value, prefix: &str, out: &mut BTreeMap<String, OptionSpec>) {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for (key, property) in properties {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        // Objects with their own properties are namespaces, not options
        if property.get("properties").is_some_and(Value::is_object) {
            collect_properties(property, &path, out);
            continue;
        }

        out.insert(
            path,
            OptionSpec {
                kind: property
                    .get("type")
                    .and_then(Value::as_str)
                    .and_then(OptionType::parse),
                default: property.get("default").cloned(),
                description: property
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                required: required.contains(&key.as_str()),
            },
        );
    }
}

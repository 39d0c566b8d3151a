use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ArgumentError;

pub const DEFAULT_LOOKUP_LIMIT: u64 = 50;
pub const DEFAULT_ASSOCIATION_LIMIT: u64 = 10;
pub const DEFAULT_LANGUAGE: &str = "en";

/// Options of a concept lookup.
///
/// Unset and falsy values (`Some(0)`, `Some("")`) fall back to the defaults:
/// `limit = 50`, `offset = 0`, no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Only `"core"` has an effect, restricting results to core sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl LookupOptions {
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Shorthand for `filter("core")`
    pub fn core(self) -> Self {
        self.filter("core")
    }

    pub fn from_json(value: &Value) -> Result<Self, ArgumentError> {
        let obj = as_options(value)?;
        Ok(Self {
            limit: count(obj, "limit")?,
            offset: count(obj, "offset")?,
            filter: text(obj, "filter")?,
        })
    }
}

/// Options of a text to URI resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl UriOptions {
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Accepts either `{"language": "ja"}` or the bare language code `"ja"`.
    pub fn from_json(value: &Value) -> Result<Self, ArgumentError> {
        if let Value::String(language) = value {
            return Ok(Self {
                language: (!language.is_empty()).then(|| language.clone()),
            });
        }
        let obj = as_options(value)?;
        Ok(Self {
            language: text(obj, "language")?,
        })
    }
}

/// Options shared by association and relatedness queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Keep only results starting with this concept URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl AssociationOptions {
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn from_json(value: &Value) -> Result<Self, ArgumentError> {
        let obj = as_options(value)?;
        Ok(Self {
            limit: count(obj, "limit")?,
            filter: text(obj, "filter")?,
        })
    }
}

/// Free-form search parameters, serialized in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchParams(Map<String, Value>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn from_json(value: &Value) -> Result<Self, ArgumentError> {
        Ok(Self(as_options(value)?.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flatten into query pairs.
    ///
    /// Arrays repeat their key once per element; `null`, objects and nested
    /// arrays serialize as an empty value.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.0.len());
        for (key, value) in &self.0 {
            match value {
                Value::Array(items) => {
                    for item in items {
                        pairs.push((key.clone(), scalar(item)));
                    }
                }
                other => pairs.push((key.clone(), scalar(other))),
            }
        }
        pairs
    }
}

impl From<Map<String, Value>> for SearchParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// `null`, `false`, `0` and `""` select the default of a key.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn as_options(value: &Value) -> Result<&Map<String, Value>, ArgumentError> {
    value.as_object().ok_or(ArgumentError::InvalidType("options"))
}

fn count(obj: &Map<String, Value>, key: &'static str) -> Result<Option<u64>, ArgumentError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) if is_falsy(v) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or(ArgumentError::InvalidType(key)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ArgumentError::InvalidType(key)),
        Some(_) => Err(ArgumentError::InvalidType(key)),
    }
}

fn text(obj: &Map<String, Value>, key: &'static str) -> Result<Option<String>, ArgumentError> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) if is_falsy(v) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ArgumentError::InvalidType(key)),
    }
}

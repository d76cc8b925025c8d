use serde_json::{Map, Value};
use std::collections::HashMap;

/// A composed statement fragment plus the parameters for its `$n` placeholders,
/// in placeholder order.
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

impl SqlResult {
    pub fn new(query: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }
}

/// Optional listing parameters as they arrived (query string or JSON body).
///
/// Every accessor treats a missing or malformed value as absent; nothing here
/// can fail.
#[derive(Debug, Clone, Default)]
pub struct FilterParams(Map<String, Value>);

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Integer parameter: accepts a JSON integer or a numeric string.
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean flag: accepts `true`/`false`, `1`/`0` and their string forms.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.0.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(true),
                Some(0) => Some(false),
                _ => None,
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Non-empty trimmed text.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()),
            _ => None,
        }
    }
}

impl From<HashMap<String, String>> for FilterParams {
    fn from(query: HashMap<String, String>) -> Self {
        Self(query.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

impl From<Map<String, Value>> for FilterParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

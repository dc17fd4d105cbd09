use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Request parameters sent to the gateway and fed into the signer.
///
/// Keys are unique and kept in ordinal order, so insertion order never
/// affects the signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParamSet(BTreeMap<String, Value>);

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert only when the value is present and not an empty string.
    pub fn insert_non_empty(&mut self, key: impl Into<String>, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.insert(key, v);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Flatten into `(key, value)` string pairs for a query string.
    /// Null entries are dropped.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), render_value(v)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Render a parameter value the way it appears in the signed string.
///
/// Strings are used verbatim, numbers and booleans in their natural form,
/// objects and arrays as compact JSON.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Convert an amount to a JSON number without a spurious `.0` on whole values,
/// so `100.0` signs as `100` and `0.01` as `0.01`.
pub(crate) fn amount_value(amount: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if amount.fract() == 0.0 && amount.abs() < MAX_EXACT {
        Value::from(amount as i64)
    } else {
        Value::from(amount)
    }
}

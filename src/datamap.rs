//! Ordered key/value maps used as render data and dictionaries.
//!
//! Keys keep the position of their first insertion; inserting an
//! existing key replaces the value in place. Substitution order (and
//! with it chained substitution) follows that position.

use kstring::KString;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Text(String),
    Map(DataMap),
}

impl DataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            DataValue::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&DataMap> {
        match self {
            DataValue::Text(_) => None,
            DataValue::Map(m) => Some(m),
        }
    }

    /// Strings, numbers and booleans become text, objects nested maps.
    /// Null and arrays have no template representation.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(DataValue::Text(s.clone())),
            Value::Number(n) => Some(DataValue::Text(n.to_string())),
            Value::Bool(b) => Some(DataValue::Text(b.to_string())),
            Value::Object(obj) => {
                let mut m = DataMap::new();
                for (k, v) in obj {
                    if let Some(v) = DataValue::from_json(v) {
                        m.insert(k.as_str(), v);
                    }
                }
                Some(DataValue::Map(m))
            }
            Value::Null | Value::Array(_) => None,
        }
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::Text(s.into())
    }
}
impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::Text(s)
    }
}
impl From<DataMap> for DataValue {
    fn from(m: DataMap) -> Self {
        DataValue::Map(m)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataMap(Vec<(KString, DataValue)>);

impl DataMap {
    pub fn new() -> Self {
        DataMap(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.0.iter().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_text()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the replaced value, if any.
    pub fn insert(&mut self, key: &str, value: impl Into<DataValue>) -> Option<DataValue> {
        let value = value.into();
        if let Some((_, v)) = self.0.iter_mut().find(|(k, _)| k.as_str() == key) {
            Some(std::mem::replace(v, value))
        } else {
            self.0.push((KString::from_ref(key), value));
            None
        }
    }

    /// Builder variant of `insert`.
    pub fn with(mut self, key: &str, value: impl Into<DataValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<DataValue> {
        let i = self.0.iter().position(|(k, _)| k.as_str() == key)?;
        Some(self.0.remove(i).1)
    }

    /// Insert all entries of `other`; its values win.
    pub fn extend_from(&mut self, other: &DataMap) {
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }
}

impl<'s, V: Into<DataValue>> FromIterator<(&'s str, V)> for DataMap {
    fn from_iter<I: IntoIterator<Item = (&'s str, V)>>(iter: I) -> Self {
        let mut m = DataMap::new();
        for (k, v) in iter {
            m.insert(k, v);
        }
        m
    }
}

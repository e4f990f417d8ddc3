//! The structured log event the pipeline operates on.
//!
//! This is deliberately framework-neutral: adapters such as
//! [`crate::slog::MaskingDrain`] translate their own records into a
//! [`LogEvent`] and back.

use std::{error::Error as StdError, fmt};

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A primitive property value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Text. The only kind of value that operators inspect.
    Str(String),
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Unit,
    Null,
}

/// The value of a single log property.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Scalar(ScalarValue),
    /// Nested data. Passed through untouched.
    Structured(JsonValue),
}

impl PropertyValue {
    /// Returns the text of a string scalar, `None` for anything else.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Scalar(ScalarValue::Str(value)) => Some(value),
            _ => None,
        }
    }
}

/// Strings display as themselves, everything else as JSON.
impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.as_str() {
            return f.write_str(text);
        }
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Scalar(ScalarValue::Str(value.to_string()))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Scalar(ScalarValue::Str(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Scalar(ScalarValue::Bool(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Scalar(ScalarValue::I64(value))
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        Self::Scalar(ScalarValue::U64(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Scalar(ScalarValue::F64(value))
    }
}

impl From<ScalarValue> for PropertyValue {
    fn from(value: ScalarValue) -> Self {
        Self::Scalar(value)
    }
}

impl From<JsonValue> for PropertyValue {
    fn from(value: JsonValue) -> Self {
        Self::Structured(value)
    }
}

/// A named property of a log event.
#[derive(Clone, Debug, PartialEq)]
pub struct LogProperty {
    pub name: String,
    pub value: PropertyValue,
}

/// Insertion-ordered property set with unique names.
///
/// Serializes as a map from property name to value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties {
    entries: Vec<LogProperty>,
}

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`.
    ///
    /// An existing property keeps its position and its previous value is
    /// returned.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                self.entries.push(LogProperty { name, value });
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogProperty> {
        self.entries.iter()
    }

    /// Builds a set from entries already known to have unique names.
    pub(crate) fn from_unique(entries: Vec<LogProperty>) -> Self {
        Self { entries }
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (name, value) in iter {
            properties.insert(name, value);
        }
        properties
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a LogProperty;
    type IntoIter = std::slice::Iter<'a, LogProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Properties {
    type Item = LogProperty;
    type IntoIter = std::vec::IntoIter<LogProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Properties {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}

/// The error attached to a log event.
pub type AttachedError = Box<dyn StdError + Send + Sync + 'static>;

/// A log event as seen by the masking pipeline: properties plus an optional
/// attached error.
#[derive(Default)]
pub struct LogEvent {
    properties: Properties,
    error: Option<AttachedError>,
}

impl LogEvent {
    #[must_use]
    pub fn new(properties: Properties) -> Self {
        Self {
            properties,
            error: None,
        }
    }

    /// Attaches an error to the event.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<AttachedError>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.error.as_deref()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_properties(self) -> Properties {
        self.properties
    }
}

impl fmt::Debug for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEvent")
            .field("properties", &self.properties)
            .field("error", &self.error.as_ref().map(ToString::to_string))
            .finish()
    }
}

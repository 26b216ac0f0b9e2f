use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable identity of a member record
///
/// The members endpoint encodes ids as numeric strings (`"id": "7"`), other
/// sources use plain numbers. Both forms deserialize to the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        RecordId(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(RecordId(n)),
            RawId::Text(s) => s
                .trim()
                .parse::<u64>()
                .map(RecordId)
                .map_err(|_| de::Error::custom(format!("record id '{}' is not an integer", s))),
        }
    }
}

/// A single member row: an id plus free-form fields kept in source order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,

    /// Every field except `id`, passed through untouched
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// The inline-editable columns, in display order
pub const EDITABLE_FIELDS: [&str; 3] = ["name", "email", "role"];

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder used by loaders and tests
    pub fn with_field(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String value of a field, empty when absent or not a string
    pub fn text(&self, field: &str) -> &str {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.text("name")
    }

    pub fn email(&self) -> &str {
        self.text("email")
    }

    pub fn role(&self) -> &str {
        self.text("role")
    }

    /// Replace a field with a string value. Returns true if the record changed.
    pub fn set_field(&mut self, field: &str, value: &str) -> bool {
        match self.fields.get(field) {
            Some(Value::String(current)) if current == value => false,
            _ => {
                self.fields
                    .insert(field.to_string(), Value::String(value.to_string()));
                true
            }
        }
    }

    /// All string-typed field values; the only values search looks at
    pub fn string_values(&self) -> impl Iterator<Item = &str> {
        self.fields.values().filter_map(Value::as_str)
    }

    /// Format a field for a table cell
    pub fn display_field(&self, field: &str) -> String {
        match self.fields.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Null) | None => String::new(),
            Some(v) => v.to_string(),
        }
    }
}

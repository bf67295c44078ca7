use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend-assigned identifier. Comparison is strict: `1` and `"1"` differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

impl RecordId {
    /// Read an id out of a JSON value; only integers and strings qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RecordId::Text(s.clone())),
            Value::Number(n) => n.as_i64().map(RecordId::Number),
            _ => None,
        }
    }

    /// Parse a command-line id: all-digit input becomes a number.
    pub fn parse_loose(raw: &str) -> Self {
        raw.parse::<i64>()
            .map(RecordId::Number)
            .unwrap_or_else(|_| RecordId::Text(raw.to_string()))
    }
}

/// A record that can live in a [`super::ResourceStore`].
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> Option<RecordId>;
}

impl Resource for Value {
    fn id(&self) -> Option<RecordId> {
        self.get("id").and_then(RecordId::from_value)
    }
}

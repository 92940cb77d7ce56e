pub mod api;

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

pub use api::{decode_payload, path, ApiClient, ApiConfig, FetchError, ResourceSource};

pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Opaque identifier for users and snapshots. The API hands these out as
/// either JSON numbers or strings; both are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let val = Value::deserialize(deserializer)?;
        match val {
            Value::String(s) => Ok(Id(s)),
            Value::Number(n) => Ok(Id(n.to_string())),
            _ => Err(serde::de::Error::custom("expected string or number for id")),
        }
    }
}

/// Display form of a snapshot capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let val = Value::deserialize(deserializer)?;
        match val {
            Value::String(s) => Ok(Timestamp(s)),
            Value::Number(n) => match n.as_i64() {
                Some(ms) => Ok(Timestamp(format_timestamp_ms(ms))),
                None => Ok(Timestamp(n.to_string())),
            },
            _ => Err(serde::de::Error::custom(
                "expected string or epoch milliseconds for datetime",
            )),
        }
    }
}

/// Formats epoch milliseconds in UTC; out-of-range values fall back to the raw number.
pub fn format_timestamp_ms(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(at) => at.format(TIMESTAMP_FORMAT).to_string(),
        None => ms.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    Male,
    #[default]
    Female,
}

impl Gender {
    pub const MALE_CODE: &'static str = "m";

    /// Exactly the male code selects `Male`; any other value is `Female`.
    pub fn from_code(code: &str) -> Self {
        if code == Self::MALE_CODE {
            Gender::Male
        } else {
            Gender::Female
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub uid: Id,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub uid: Option<Id>,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_gender")]
    pub gender: Gender,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub birthday: String,
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotSummary {
    pub id: Id,
    pub datetime: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotDetail {
    #[serde(default)]
    pub ss_id: Option<Id>,
    #[serde(default)]
    pub datetime: Option<Timestamp>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default, flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Feelings {
    pub hunger: f64,
    pub thirst: f64,
    pub exhaustion: f64,
    pub happiness: f64,
}

/// Fixed three-decimal rendering used for every feelings metric.
pub fn format_metric(value: f64) -> String {
    format!("{value:.3}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub width: Option<u64>,
    pub height: Option<u64>,
}

impl ImageRef {
    /// Image payloads carry the resource URL under their own field name.
    pub fn from_field(field: &str, payload: &Value) -> Option<Self> {
        let url = payload.get(field)?.as_str()?.to_string();
        Some(Self {
            url,
            width: payload.get("width").and_then(Value::as_u64),
            height: payload.get("height").and_then(Value::as_u64),
        })
    }

    pub fn dimensions(&self) -> Option<(u64, u64)> {
        self.width.zip(self.height)
    }
}

fn deserialize_gender<'de, D>(deserializer: D) -> Result<Gender, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    Ok(match val {
        Value::String(s) => Gender::from_code(&s),
        _ => Gender::Female,
    })
}

/// Accepts strings and scalars, rendering non-strings with their JSON text.
fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    match val {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(serde::de::Error::custom("expected a scalar value")),
    }
}

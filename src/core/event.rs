use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// Severity attached to every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Error => "error",
        }
    }
}

/// Action label carried by login and request records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Request,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Login => "LOGIN",
            Action::Request => "REQUEST",
        }
    }
}

/// Outcome label carried by login records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginResult {
    Success,
    Failed,
}

impl LoginResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginResult::Success => "SUCCESS",
            LoginResult::Failed => "FAILED",
        }
    }
}

/// Error value reported by a simulated service failure.
///
/// It never propagates; it only travels inside a record's `err` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedFailure(String);

impl SimulatedFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl std::fmt::Display for SimulatedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for SimulatedFailure {}

/// Typed value of a single record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Duration(Duration),
    TraceId(Uuid),
    Error(SimulatedFailure),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            FieldValue::Duration(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<Duration> for FieldValue {
    fn from(value: Duration) -> Self {
        FieldValue::Duration(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::TraceId(value)
    }
}

impl From<SimulatedFailure> for FieldValue {
    fn from(value: SimulatedFailure) -> Self {
        FieldValue::Error(value)
    }
}

impl From<Action> for FieldValue {
    fn from(value: Action) -> Self {
        FieldValue::Str(value.as_str().to_string())
    }
}

impl From<LoginResult> for FieldValue {
    fn from(value: LoginResult) -> Self {
        FieldValue::Str(value.as_str().to_string())
    }
}

/// One structured log record, built by a generator and handed to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Severity level.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
    /// Time the record was produced.
    pub timestamp: DateTime<Utc>,
    /// Named fields in emission order.
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl EventRecord {
    pub fn new(level: Level, timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp,
            fields: Vec::new(),
        }
    }

    pub fn info(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self::new(Level::Info, timestamp, message)
    }

    pub fn error(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self::new(Level::Error, timestamp, message)
    }

    /// Appends a field, keeping insertion order.
    pub fn with_field(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
        self.fields.push((name, value.into()));
        self
    }

    /// Returns the first field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(key, _)| *key).collect()
    }
}

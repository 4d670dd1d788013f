//! Shared type definitions for the relief console.
//!
//! These mirror the backend's JSON contracts. Open-ended parts of the payloads
//! (`Alert::payload`, `Plan::assignment`, log records) stay as generic JSON so
//! the console never depends on their exact shape.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One reported incident from the alert feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Opaque identifier, unique within a feed snapshot
    #[serde(deserialize_with = "de::opaque_id")]
    pub id: String,

    /// Category label (free-form, e.g. "rainfall", "earthquake")
    #[serde(rename = "type", default, deserialize_with = "de::lenient_string")]
    pub kind: String,

    /// Human-readable place name
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub location: String,

    /// Report timestamp as supplied by the feed
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub time: String,

    /// Upstream reporter, when the feed names one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Reporter confidence in [0, 1]; `None` when absent or non-numeric
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub confidence: Option<f64>,

    /// Open-ended structured detail
    #[serde(default, deserialize_with = "de::object_or_empty")]
    pub payload: Map<String, Value>,
}

impl Alert {
    /// Create a bare alert with an empty payload.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            location: location.into(),
            time: String::new(),
            source: None,
            confidence: None,
            payload: Map::new(),
        }
    }

    /// Set the reporter confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set a payload field.
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Set `payload.severity`.
    pub fn with_severity(self, severity: &str) -> Self {
        self.with_payload("severity", severity)
    }

    /// Set `payload.lat` / `payload.lon`.
    pub fn with_coordinates(self, lat: f64, lon: f64) -> Self {
        self.with_payload("lat", lat).with_payload("lon", lon)
    }

    /// Set the report timestamp.
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    /// Recognized severity from `payload.severity`, if any.
    pub fn severity(&self) -> Option<Severity> {
        self.payload
            .get("severity")
            .and_then(Value::as_str)
            .and_then(Severity::parse)
    }

    /// Geo-coordinates as `(lat, lon)`, only when both are present and numeric.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.payload.get("lat").and_then(de::number_like)?;
        let lon = self.payload.get("lon").and_then(de::number_like)?;
        Some((lat, lon))
    }

    /// Report time in local time, when the feed supplied RFC 3339.
    pub fn reported_at(&self) -> Option<DateTime<Local>> {
        DateTime::parse_from_rfc3339(&self.time)
            .ok()
            .map(|t| t.with_timezone(&Local))
    }

    /// Report time for display; falls back to the raw feed value.
    pub fn display_time(&self) -> String {
        match self.reported_at() {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None if self.time.is_empty() => "-".to_string(),
            None => self.time.clone(),
        }
    }

    /// Confidence for display ("-" when absent).
    pub fn display_confidence(&self) -> String {
        match self.confidence {
            Some(c) => format!("{c}"),
            None => "-".to_string(),
        }
    }
}

/// Recognized values of `payload.severity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Parse a severity label; unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// A generated response plan for one alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Alert the plan was generated for, when the server echoes it
    #[serde(default, deserialize_with = "de::lenient_opt_string")]
    pub event_id: Option<String>,

    /// Server-declared overall risk
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub risk: Option<f64>,

    /// Ordered task descriptors (order is display order)
    #[serde(default, deserialize_with = "de::task_list")]
    pub tasks: Vec<PlanTask>,

    /// Resource-to-task mapping, opaque to the console
    #[serde(default)]
    pub assignment: Option<Value>,
}

impl Plan {
    /// Server risk, defaulting to 0 when the server declared none.
    pub fn server_risk(&self) -> f64 {
        self.risk.unwrap_or(0.0)
    }

    /// Assignment pretty-printed verbatim, if any.
    pub fn assignment_dump(&self) -> Option<String> {
        self.assignment
            .as_ref()
            .map(|a| serde_json::to_string_pretty(a).unwrap_or_else(|_| a.to_string()))
    }
}

/// One task descriptor inside a [`Plan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanTask(pub Value);

impl PlanTask {
    /// Task label (`task` field), defaulting to "task".
    pub fn label(&self) -> &str {
        self.0
            .get("task")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("task")
    }

    /// Task detail (`details` field), else a raw dump of the descriptor.
    pub fn detail(&self) -> String {
        match self.0.get("details") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(v) if !v.is_null() && !matches!(v, Value::String(_)) => v.to_string(),
            _ => self.0.to_string(),
        }
    }
}

/// One opaque record from the log stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogRecord(pub Value);

impl LogRecord {
    /// Generic single-line structured dump.
    pub fn dump(&self) -> String {
        self.0.to_string()
    }
}

/// Body of `GET /api/logs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogsEnvelope {
    #[serde(default)]
    pub logs: Option<Vec<LogRecord>>,
}

impl LogsEnvelope {
    /// Records in received order; a missing or null `logs` field is empty.
    pub fn into_records(self) -> Vec<LogRecord> {
        self.logs.unwrap_or_default()
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub time: Option<String>,
}

impl HealthStatus {
    /// Whether the backend reported itself healthy.
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Lenient field decoders for feed payloads.
mod de {
    use serde::{Deserialize, Deserializer, de::Error};
    use serde_json::{Map, Value};

    use super::PlanTask;

    pub fn number_like(v: &Value) -> Option<f64> {
        let n = match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        n.is_finite().then_some(n)
    }

    pub fn opaque_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!("invalid alert id: {other}"))),
        }
    }

    pub fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    pub fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    pub fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(number_like(&Value::deserialize(d)?))
    }

    pub fn object_or_empty<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Map<String, Value>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => map,
            _ => Map::new(),
        })
    }

    pub fn task_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PlanTask>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().map(PlanTask).collect(),
            _ => Vec::new(),
        })
    }
}

//! Domain Models
//!
//! Consultation outcomes, multi-model comparisons and persisted memory records.

use chrono::{DateTime, Local, Utc};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

/// Current time as fractional Unix seconds
pub fn unix_timestamp() -> f64 {
    timestamp_of(Utc::now())
}

fn timestamp_of(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

/// ctime-style local time, e.g. `Mon Oct 19 12:00:00 2026`
pub fn ctime(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%a %b %e %H:%M:%S %Y")
        .to_string()
}

/// Response text or failure cause; exactly one is present
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsultOutcome {
    Response { response: String },
    Error { error: String },
}

/// Outcome of consulting one model, as recorded in a comparison
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsultResult {
    #[serde(flatten)]
    outcome: ConsultOutcome,
    success: bool,
    timestamp: f64,
}

impl ConsultResult {
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            outcome: ConsultOutcome::Response {
                response: response.into(),
            },
            success: true,
            timestamp: unix_timestamp(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            outcome: ConsultOutcome::Error {
                error: error.into(),
            },
            success: false,
            timestamp: unix_timestamp(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.success
    }

    pub const fn outcome(&self) -> &ConsultOutcome {
        &self.outcome
    }

    pub fn response(&self) -> Option<&str> {
        match &self.outcome {
            ConsultOutcome::Response { response } => Some(response),
            ConsultOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ConsultOutcome::Error { error } => Some(error),
            ConsultOutcome::Response { .. } => None,
        }
    }

    pub const fn timestamp(&self) -> f64 {
        self.timestamp
    }
}

/// Metadata describing a comparison run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetadata {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub models_used: Vec<String>,
    pub timestamp: f64,
}

/// Per-model results in request order, plus run metadata.
///
/// Serializes as `{"comparison": {model: result, ...}, "metadata": {...}}`
/// with the comparison keys in request order.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonResult {
    entries: Vec<(String, ConsultResult)>,
    metadata: ComparisonMetadata,
}

impl ComparisonResult {
    /// `entries` must hold one result per model, in request order
    pub fn new(
        prompt: impl Into<String>,
        system_prompt: Option<String>,
        entries: Vec<(String, ConsultResult)>,
    ) -> Self {
        let models_used = entries.iter().map(|(model, _)| model.clone()).collect();
        Self {
            entries,
            metadata: ComparisonMetadata {
                prompt: prompt.into(),
                system_prompt,
                models_used,
                timestamp: unix_timestamp(),
            },
        }
    }

    pub fn entries(&self) -> &[(String, ConsultResult)] {
        &self.entries
    }

    pub fn get(&self, model: &str) -> Option<&ConsultResult> {
        self.entries
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, result)| result)
    }

    pub const fn metadata(&self) -> &ComparisonMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of models that answered successfully
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.is_success()).count()
    }
}

struct OrderedEntries<'a>(&'a [(String, ConsultResult)]);

impl Serialize for OrderedEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (model, result) in self.0 {
            map.serialize_entry(model, result)?;
        }
        map.end()
    }
}

impl Serialize for ComparisonResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ComparisonResult", 2)?;
        state.serialize_field("comparison", &OrderedEntries(&self.entries))?;
        state.serialize_field("metadata", &self.metadata)?;
        state.end()
    }
}

/// Creation stamp stored under `_meta`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryMeta {
    pub created_at: f64,
    pub created_iso: String,
}

/// A persisted consultation. Written once, never modified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub key: Option<String>,
    pub prompt: String,
    pub model: Option<String>,
    pub response: String,
    #[serde(rename = "_meta")]
    pub meta: MemoryMeta,
}

impl MemoryRecord {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            key: None,
            prompt: prompt.into(),
            model: None,
            response: response.into(),
            meta: MemoryMeta {
                created_at: timestamp_of(now),
                created_iso: ctime(now),
            },
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: Option<impl Into<String>>) -> Self {
        self.key = key.map(Into::into);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: Option<impl Into<String>>) -> Self {
        self.model = model.map(Into::into);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn consult_result_has_exactly_one_field() {
        let ok = serde_json::to_value(ConsultResult::success("hello")).unwrap();
        assert_eq!(ok["response"], "hello");
        assert_eq!(ok["success"], true);
        assert!(ok.get("error").is_none());
        assert!(ok["timestamp"].as_f64().unwrap() > 0.0);

        let err = serde_json::to_value(ConsultResult::failure("boom")).unwrap();
        assert_eq!(err["error"], "boom");
        assert_eq!(err["success"], false);
        assert!(err.get("response").is_none());
    }

    #[test]
    fn consult_result_round_trips() {
        let original = ConsultResult::failure("boom");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: ConsultResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.error(), Some("boom"));
        assert!(!parsed.is_success());
    }

    #[test]
    fn comparison_keeps_request_order() {
        let result = ComparisonResult::new(
            "hi",
            None,
            vec![
                ("zeta".into(), ConsultResult::success("z")),
                ("alpha".into(), ConsultResult::failure("down")),
            ],
        );

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.find("\"zeta\"").unwrap() < json.find("\"alpha\"").unwrap());

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["models_used"], serde_json::json!(["zeta", "alpha"]));
        assert_eq!(value["metadata"]["system_prompt"], serde_json::Value::Null);
        assert_eq!(result.succeeded(), 1);
        assert_eq!(result.get("alpha").unwrap().error(), Some("down"));
    }

    #[test]
    fn memory_record_layout() {
        let record = MemoryRecord::new("p", "r")
            .with_key(None::<String>)
            .with_model(Some("m1"));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["key"], serde_json::Value::Null);
        assert_eq!(value["model"], "m1");
        assert!(value["_meta"]["created_at"].as_f64().is_some());
        assert!(value["_meta"]["created_iso"].as_str().is_some());
    }

    #[test]
    fn ctime_shape() {
        let at = Utc.with_ymd_and_hms(2026, 10, 5, 12, 0, 0).unwrap();
        let formatted = ctime(at);
        // Weekday, month, space-padded day, time, year
        let parts: Vec<_> = formatted.split_whitespace().collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[4], "2026");
    }
}

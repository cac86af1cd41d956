//! Domain Entities
//!
//! `ScammerRecord` is the validated, storable record. `ScammerCandidate` is
//! whatever the client sent: every field is optional, enum/number fields
//! stay raw JSON, and string/list fields fall back to raw JSON on a type
//! mismatch, so a bad member becomes a field error instead of a rejected body.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_objects::{Location, ScamType, ScammerStatus, VictimReport};

/// RFC 3339 timestamps with millisecond precision, always `Z`
///
/// Fixed width, so stored values sort lexically in time order.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom("expected an RFC 3339 timestamp"))
    }
}

// ============================================================================
// Record
// ============================================================================

/// Validated scammer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScammerRecord {
    /// Store-assigned id; never part of the stored body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub email_aliases: Vec<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub ip_addresses: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub websites: Vec<String>,
    pub scam_types: Vec<ScamType>,
    #[serde(default)]
    pub reported_locations: Vec<Location>,
    #[serde(default)]
    pub victims: Vec<VictimReport>,
    #[serde(default)]
    pub status: ScammerStatus,
    pub threat_level: u8,
    #[serde(with = "timestamp")]
    pub first_reported: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub total_reported_losses: f64,
    #[serde(default)]
    pub known_associates: Vec<String>,
    #[serde(default)]
    pub notes: Vec<BTreeMap<String, String>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub evidence_files: Vec<String>,
}

impl ScammerRecord {
    /// Body to persist (id stripped)
    pub fn to_document(&self) -> serde_json::Result<Value> {
        let mut body = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut body {
            map.remove("id");
        }
        Ok(body)
    }
}

// ============================================================================
// Candidate
// ============================================================================

/// Field as sent: the expected shape, or the raw JSON when it has another type
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Typed(T),
    Invalid(Value),
}

impl<T> Lenient<T> {
    pub fn typed(&self) -> Option<&T> {
        match self {
            Lenient::Typed(value) => Some(value),
            Lenient::Invalid(_) => None,
        }
    }
}

pub type LenientList<T> = Option<Lenient<Vec<T>>>;
pub type LenientString = Option<Lenient<String>>;

/// Unvalidated record input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScammerCandidate {
    pub email: LenientString,
    pub email_aliases: LenientList<String>,
    pub phone_numbers: LenientList<String>,
    pub ip_addresses: LenientList<String>,
    pub aliases: LenientList<String>,
    pub websites: LenientList<String>,
    pub scam_types: LenientList<Value>,
    pub reported_locations: LenientList<LocationCandidate>,
    pub victims: LenientList<VictimCandidate>,
    pub status: Option<Value>,
    pub threat_level: Option<Value>,
    pub first_reported: Option<Value>,
    /// Accepted for compatibility; always overwritten
    pub last_updated: Option<Value>,
    pub total_reported_losses: Option<Value>,
    pub known_associates: LenientList<String>,
    pub notes: LenientList<BTreeMap<String, String>>,
    pub tags: LenientList<String>,
    pub evidence_files: LenientList<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationCandidate {
    pub country: LenientString,
    pub city: LenientString,
    pub coordinates: Option<GeoPointCandidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeoPointCandidate {
    #[serde(rename = "type")]
    pub kind: LenientString,
    pub coordinates: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VictimCandidate {
    pub report_id: LenientString,
    pub date_reported: Option<Value>,
    pub amount_lost: Option<Value>,
    pub currency: LenientString,
    pub scam_type: Option<Value>,
    pub description: LenientString,
    pub evidence_urls: LenientList<String>,
    pub contact_method: LenientString,
}

// ============================================================================
// Validation errors
// ============================================================================

/// One violated constraint, addressed by field path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// e.g. `reportedLocations[0].coordinates.coordinates`
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

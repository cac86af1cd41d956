//! Domain Value Objects
//!
//! Enumerations and embedded documents of a scammer record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Enumerations
// ============================================================================

/// Kind of fraud a scammer perpetrates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScamType {
    Phishing,
    Investment,
    Romance,
    TechSupport,
    Cryptocurrency,
    IdentityTheft,
    AdvanceFee,
    Other,
}

impl ScamType {
    pub const ALL: [ScamType; 8] = [
        ScamType::Phishing,
        ScamType::Investment,
        ScamType::Romance,
        ScamType::TechSupport,
        ScamType::Cryptocurrency,
        ScamType::IdentityTheft,
        ScamType::AdvanceFee,
        ScamType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScamType::Phishing => "phishing",
            ScamType::Investment => "investment",
            ScamType::Romance => "romance",
            ScamType::TechSupport => "tech_support",
            ScamType::Cryptocurrency => "cryptocurrency",
            ScamType::IdentityTheft => "identity_theft",
            ScamType::AdvanceFee => "advance_fee",
            ScamType::Other => "other",
        }
    }
}

impl fmt::Display for ScamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScamType {
    type Err = UnknownMember;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScamType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownMember::new(&ScamType::ALL.map(|t| t.as_str())))
    }
}

/// Investigation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScammerStatus {
    Active,
    Inactive,
    #[default]
    UnderInvestigation,
    Confirmed,
    Blocked,
}

impl ScammerStatus {
    pub const ALL: [ScammerStatus; 5] = [
        ScammerStatus::Active,
        ScammerStatus::Inactive,
        ScammerStatus::UnderInvestigation,
        ScammerStatus::Confirmed,
        ScammerStatus::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScammerStatus::Active => "active",
            ScammerStatus::Inactive => "inactive",
            ScammerStatus::UnderInvestigation => "under_investigation",
            ScammerStatus::Confirmed => "confirmed",
            ScammerStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for ScammerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScammerStatus {
    type Err = UnknownMember;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScammerStatus::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownMember::new(&ScammerStatus::ALL.map(|t| t.as_str())))
    }
}

/// Value outside an enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Input should be one of: {expected}")]
pub struct UnknownMember {
    pub expected: String,
}

impl UnknownMember {
    fn new(members: &[&str]) -> Self {
        Self {
            expected: members.join(", "),
        }
    }
}

// ============================================================================
// Embedded documents
// ============================================================================

/// GeoJSON point. `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: (f64, f64),
}

impl GeoPoint {
    pub const KIND: &'static str = "Point";

    pub fn longitude(&self) -> f64 {
        self.coordinates.0
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.1
    }
}

/// A place the scammer was reported from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoPoint>,
}

/// One victim's report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VictimReport {
    pub report_id: String,
    #[serde(with = "crate::domain::entities::timestamp")]
    pub date_reported: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_lost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub scam_type: ScamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub evidence_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_method: Option<String>,
}

// ============================================================================
// Listing
// ============================================================================

/// Sort order for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScammerSort {
    /// `status` ascending, then `threatLevel` descending
    #[default]
    Threat,
    /// `lastUpdated` descending
    Recent,
}

impl FromStr for ScammerSort {
    type Err = UnknownMember;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "threat" => Ok(ScammerSort::Threat),
            "recent" => Ok(ScammerSort::Recent),
            _ => Err(UnknownMember::new(&["threat", "recent"])),
        }
    }
}

/// Listing criteria; every filter is an equality match backed by an index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScammerQuery {
    pub status: Option<ScammerStatus>,
    pub scam_type: Option<ScamType>,
    pub country: Option<String>,
    pub sort: ScammerSort,
    pub limit: usize,
}

//! Domain Services
//!
//! The record validator. Every rule runs; violations are collected rather
//! than returned at the first failure. A successful pass always stamps
//! `lastUpdated` with the validation time.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use kernel::email::Email;
use serde_json::Value;
use url::Url;

use crate::domain::entities::{
    GeoPointCandidate, Lenient, LenientList, LenientString, LocationCandidate, ScammerCandidate,
    ScammerRecord, ValidationError, VictimCandidate, timestamp,
};
use crate::domain::value_objects::{GeoPoint, Location, ScamType, ScammerStatus, VictimReport};

pub const THREAT_LEVEL_MIN: i64 = 1;
pub const THREAT_LEVEL_MAX: i64 = 5;
pub const COUNTRY_MIN_CHARS: usize = 2;
pub const COUNTRY_MAX_CHARS: usize = 100;
pub const CITY_MAX_CHARS: usize = 100;
pub const CURRENCY_MAX_CHARS: usize = 3;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;
pub const CONTACT_METHOD_MAX_CHARS: usize = 100;

const FIELD_REQUIRED: &str = "Field required";
const EXPECTED_STRING: &str = "Input should be a valid string";
const EXPECTED_STRINGS: &str = "Input should be a valid list of strings";

/// Validate with the current time
pub fn validate(candidate: &ScammerCandidate) -> Result<ScammerRecord, Vec<ValidationError>> {
    validate_at(candidate, Utc::now())
}

/// Validate a candidate as of `now`
///
/// `firstReported` falls back to `now`; `lastUpdated` is always `now`.
pub fn validate_at(
    candidate: &ScammerCandidate,
    now: DateTime<Utc>,
) -> Result<ScammerRecord, Vec<ValidationError>> {
    let mut check = Checker::default();

    let email = match check.text("email", &candidate.email) {
        Some(raw) => check.email("email", raw),
        None if candidate.email.is_none() => check.fail("email", FIELD_REQUIRED),
        None => None,
    };

    let email_aliases: Vec<String> = check
        .list("emailAliases", &candidate.email_aliases, EXPECTED_STRINGS)
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| check.email(&format!("emailAliases[{}]", i), raw))
        .collect();

    let phone_numbers = check.strings("phoneNumbers", &candidate.phone_numbers);
    let ip_addresses = check.strings("ipAddresses", &candidate.ip_addresses);
    let aliases = check.strings("aliases", &candidate.aliases);
    let websites = check.urls("websites", &candidate.websites);

    let scam_types = match &candidate.scam_types {
        None => check.fail("scamTypes", FIELD_REQUIRED),
        Some(Lenient::Invalid(_)) => check.fail("scamTypes", "Input should be a valid list"),
        Some(Lenient::Typed(values)) if values.is_empty() => {
            check.fail("scamTypes", "At least one scam type is required")
        }
        Some(Lenient::Typed(values)) => {
            let mut seen = HashSet::new();
            let parsed: Vec<ScamType> = values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| check.member::<ScamType>(&format!("scamTypes[{}]", i), v))
                .filter(|t| seen.insert(*t))
                .collect();
            Some(parsed)
        }
    };

    let reported_locations: Vec<Location> = check
        .list(
            "reportedLocations",
            &candidate.reported_locations,
            "Input should be a valid list of locations",
        )
        .iter()
        .enumerate()
        .filter_map(|(i, loc)| check.location(&format!("reportedLocations[{}]", i), loc))
        .collect();

    let mut report_ids = HashSet::new();
    let victims: Vec<VictimReport> = check
        .list("victims", &candidate.victims, "Input should be a valid list of victim reports")
        .iter()
        .enumerate()
        .filter_map(|(i, victim)| {
            check.victim(&format!("victims[{}]", i), victim, &mut report_ids, now)
        })
        .collect();

    let status = match &candidate.status {
        None => Some(ScammerStatus::default()),
        Some(v) => check.member::<ScammerStatus>("status", v),
    };

    let threat_level = match &candidate.threat_level {
        None => check.fail("threatLevel", FIELD_REQUIRED),
        Some(v) => check.threat_level(v),
    };

    let first_reported = match &candidate.first_reported {
        None => Some(now),
        Some(v) => check.timestamp("firstReported", v),
    };

    let total_reported_losses = match &candidate.total_reported_losses {
        None => Some(0.0),
        Some(v) => match v.as_f64() {
            Some(n) => Some(n),
            None => check.fail("totalReportedLosses", "Input should be a valid number"),
        },
    };

    let known_associates = check.strings("knownAssociates", &candidate.known_associates);
    let notes = check
        .list(
            "notes",
            &candidate.notes,
            "Input should be a valid list of string maps",
        )
        .to_vec();
    let tags = check.strings("tags", &candidate.tags);
    let evidence_files = check.strings("evidenceFiles", &candidate.evidence_files);

    if !check.errors.is_empty() {
        return Err(check.errors);
    }

    // Every `None` above pushed an error, so these are all present here.
    match (
        email,
        scam_types,
        status,
        threat_level,
        first_reported,
        total_reported_losses,
    ) {
        (
            Some(email),
            Some(scam_types),
            Some(status),
            Some(threat_level),
            Some(first_reported),
            Some(total_reported_losses),
        ) => Ok(ScammerRecord {
            id: None,
            email,
            email_aliases,
            phone_numbers,
            ip_addresses,
            aliases,
            websites,
            scam_types,
            reported_locations,
            victims,
            status,
            threat_level,
            first_reported,
            last_updated: now,
            total_reported_losses,
            known_associates,
            notes,
            tags,
            evidence_files,
        }),
        _ => Err(vec![ValidationError::new("", "Incomplete record")]),
    }
}

/// Re-validate a stored record against new input
///
/// Same rules as [`validate_at`]; `id` and `firstReported` are kept from
/// the stored record.
pub fn revalidate(
    existing: &ScammerRecord,
    candidate: &ScammerCandidate,
    now: DateTime<Utc>,
) -> Result<ScammerRecord, Vec<ValidationError>> {
    let mut record = validate_at(candidate, now)?;
    record.id = existing.id.clone();
    record.first_reported = existing.first_reported;
    Ok(record)
}

// ============================================================================
// Field checks
// ============================================================================

#[derive(Default)]
struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    /// Record a violation; returns `None` so callers can use it as a value
    fn fail<T>(&mut self, field: impl Into<String>, message: impl Into<String>) -> Option<T> {
        self.errors.push(ValidationError::new(field, message));
        None
    }

    /// String field; absent and wrongly typed both yield `None`, only the
    /// latter records a violation
    fn text<'a>(&mut self, field: &str, value: &'a LenientString) -> Option<&'a str> {
        match value {
            None => None,
            Some(Lenient::Typed(raw)) => Some(raw.as_str()),
            Some(Lenient::Invalid(_)) => self.fail(field, EXPECTED_STRING),
        }
    }

    /// List field; absent means empty
    fn list<'a, T>(&mut self, field: &str, value: &'a LenientList<T>, expected: &str) -> &'a [T] {
        match value {
            Some(Lenient::Typed(items)) => items.as_slice(),
            Some(Lenient::Invalid(_)) => {
                self.fail::<()>(field, expected);
                &[]
            }
            None => &[],
        }
    }

    fn strings(&mut self, field: &str, value: &LenientList<String>) -> Vec<String> {
        self.list(field, value, EXPECTED_STRINGS).to_vec()
    }

    fn email(&mut self, field: &str, raw: &str) -> Option<String> {
        match Email::new(raw) {
            Ok(email) => Some(email.into_db()),
            Err(e) => self.fail(field, format!("Invalid email: {}", e)),
        }
    }

    fn url(&mut self, field: &str, raw: &str) -> Option<String> {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
                Some(url.to_string())
            }
            Ok(_) => self.fail(field, "URL scheme should be 'http' or 'https'"),
            Err(e) => self.fail(field, format!("Invalid URL: {}", e)),
        }
    }

    fn urls(&mut self, field: &str, value: &LenientList<String>) -> Vec<String> {
        self.list(field, value, EXPECTED_STRINGS)
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| self.url(&format!("{}[{}]", field, i), raw))
            .collect()
    }

    fn member<T>(&mut self, field: &str, value: &Value) -> Option<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = value.as_str() else {
            return self.fail(field, EXPECTED_STRING);
        };
        match raw.parse::<T>() {
            Ok(member) => Some(member),
            Err(e) => self.fail(field, e.to_string()),
        }
    }

    fn max_chars(&mut self, field: &str, value: &LenientString, max: usize) -> Option<String> {
        let value = self.text(field, value)?;
        if value.chars().count() > max {
            return self.fail(field, format!("String should have at most {} characters", max));
        }
        Some(value.to_string())
    }

    fn timestamp(&mut self, field: &str, value: &Value) -> Option<DateTime<Utc>> {
        match value.as_str().and_then(timestamp::parse) {
            Some(dt) => Some(dt),
            None => self.fail(field, "Input should be an RFC 3339 datetime"),
        }
    }

    fn threat_level(&mut self, value: &Value) -> Option<u8> {
        let level = value
            .as_i64()
            .or_else(|| value.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64));
        match level {
            None => self.fail("threatLevel", "Input should be a valid integer"),
            Some(n) if !(THREAT_LEVEL_MIN..=THREAT_LEVEL_MAX).contains(&n) => self.fail(
                "threatLevel",
                format!(
                    "Input should be between {} and {}",
                    THREAT_LEVEL_MIN, THREAT_LEVEL_MAX
                ),
            ),
            Some(n) => u8::try_from(n).ok(),
        }
    }

    fn location(&mut self, path: &str, candidate: &LocationCandidate) -> Option<Location> {
        let errors_before = self.errors.len();

        let country_field = format!("{}.country", path);
        let country = match self.text(&country_field, &candidate.country) {
            None if candidate.country.is_none() => self.fail(country_field, FIELD_REQUIRED),
            None => None,
            Some(c) => {
                let len = c.chars().count();
                if len < COUNTRY_MIN_CHARS {
                    self.fail(
                        format!("{}.country", path),
                        format!("String should have at least {} characters", COUNTRY_MIN_CHARS),
                    )
                } else if len > COUNTRY_MAX_CHARS {
                    self.fail(
                        format!("{}.country", path),
                        format!("String should have at most {} characters", COUNTRY_MAX_CHARS),
                    )
                } else {
                    Some(c.to_string())
                }
            }
        };

        let city = self.max_chars(&format!("{}.city", path), &candidate.city, CITY_MAX_CHARS);

        let coordinates = candidate
            .coordinates
            .as_ref()
            .and_then(|point| self.geo_point(&format!("{}.coordinates", path), point));

        if self.errors.len() > errors_before {
            return None;
        }
        Some(Location {
            country: country?,
            city,
            coordinates,
        })
    }

    fn geo_point(&mut self, path: &str, candidate: &GeoPointCandidate) -> Option<GeoPoint> {
        let errors_before = self.errors.len();

        let kind = self
            .text(&format!("{}.type", path), &candidate.kind)
            .unwrap_or(GeoPoint::KIND);
        if kind != GeoPoint::KIND {
            self.fail::<()>(format!("{}.type", path), "GeoJSON type should be 'Point'");
        }

        let field = format!("{}.coordinates", path);
        let pair = match &candidate.coordinates {
            None => return self.fail(field, FIELD_REQUIRED),
            Some(Value::Array(items)) if items.len() == 2 => {
                match (items[0].as_f64(), items[1].as_f64()) {
                    (Some(lon), Some(lat)) => (lon, lat),
                    _ => return self.fail(field, "Coordinates should be numbers"),
                }
            }
            Some(_) => return self.fail(field, "Coordinates should be [longitude, latitude]"),
        };

        let (longitude, latitude) = pair;
        if !(-180.0..=180.0).contains(&longitude) {
            self.fail::<()>(field.clone(), "Longitude must be between -180 and 180");
        }
        if !(-90.0..=90.0).contains(&latitude) {
            self.fail::<()>(field, "Latitude must be between -90 and 90");
        }

        (self.errors.len() == errors_before).then(|| GeoPoint {
            kind: GeoPoint::KIND.to_string(),
            coordinates: pair,
        })
    }

    fn victim(
        &mut self,
        path: &str,
        candidate: &VictimCandidate,
        seen_report_ids: &mut HashSet<String>,
        now: DateTime<Utc>,
    ) -> Option<VictimReport> {
        let errors_before = self.errors.len();

        let report_id_field = format!("{}.reportId", path);
        let report_id = match self.text(&report_id_field, &candidate.report_id).map(str::trim) {
            None if matches!(candidate.report_id, Some(Lenient::Invalid(_))) => None,
            None | Some("") => self.fail(report_id_field, FIELD_REQUIRED),
            Some(id) if !seen_report_ids.insert(id.to_string()) => {
                self.fail(format!("{}.reportId", path), "Duplicate reportId in record")
            }
            Some(id) => Some(id.to_string()),
        };

        let date_reported = match &candidate.date_reported {
            None => Some(now),
            Some(v) => self.timestamp(&format!("{}.dateReported", path), v),
        };

        let amount_lost = match &candidate.amount_lost {
            None => None,
            Some(v) => match v.as_f64() {
                Some(n) if n >= 0.0 => Some(n),
                Some(_) => self.fail(
                    format!("{}.amountLost", path),
                    "Input should be greater than or equal to 0",
                ),
                None => self.fail(format!("{}.amountLost", path), "Input should be a valid number"),
            },
        };

        let currency = self.max_chars(
            &format!("{}.currency", path),
            &candidate.currency,
            CURRENCY_MAX_CHARS,
        );

        let scam_type = match &candidate.scam_type {
            None => self.fail(format!("{}.scamType", path), FIELD_REQUIRED),
            Some(v) => self.member::<ScamType>(&format!("{}.scamType", path), v),
        };

        let description = self.max_chars(
            &format!("{}.description", path),
            &candidate.description,
            DESCRIPTION_MAX_CHARS,
        );

        let evidence_urls = self.urls(&format!("{}.evidenceUrls", path), &candidate.evidence_urls);

        let contact_method = self.max_chars(
            &format!("{}.contactMethod", path),
            &candidate.contact_method,
            CONTACT_METHOD_MAX_CHARS,
        );

        if self.errors.len() > errors_before {
            return None;
        }
        Some(VictimReport {
            report_id: report_id?,
            date_reported: date_reported?,
            amount_lost,
            currency,
            scam_type: scam_type?,
            description,
            evidence_urls,
            contact_method,
        })
    }
}

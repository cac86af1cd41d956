//! Index Plan
//!
//! Indexes the `scammers` collection needs before it serves queries.
//! Applying the plan twice is a no-op; index names are derived from keys.

use platform::document::{IndexModel, SortOrder};

/// Record collection
pub const SCAMMERS_COLLECTION: &str = "scammers";

pub fn scammer_index_plan() -> Vec<IndexModel> {
    vec![
        IndexModel::ascending("email").unique(),
        IndexModel::ascending("phoneNumbers").multikey(),
        IndexModel::ascending("ipAddresses").multikey(),
        IndexModel::ascending("status").then("threatLevel", SortOrder::Descending),
        IndexModel::ascending("scamTypes").multikey(),
        IndexModel::ascending("reportedLocations.country").multikey(),
        IndexModel::descending("lastUpdated"),
    ]
}

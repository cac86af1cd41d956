//! Document Store
//!
//! A small document-collection contract (insert-one, find, replace-one,
//! delete-many, create-index) with per-document atomicity only.
//!
//! Two backends implement it:
//! - [`MemoryDocumentStore`] - process-local, used by tests and when no database is configured
//! - [`PgDocumentStore`] - PostgreSQL, one JSONB table per collection
//!
//! Unique indexes are enforced by the backend at write time; callers must treat
//! [`DocumentStoreError::DuplicateKey`] as the authoritative uniqueness signal.

mod memory;
mod postgres;

use std::cmp::Ordering;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

// ============================================================================
// Errors
// ============================================================================

/// Document store errors
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// A unique index rejected the write (or the index build)
    #[error("Duplicate key in collection '{collection}' (index {index})")]
    DuplicateKey { collection: String, index: String },

    /// An index with the same keys but different options already exists
    #[error("Index {index} on '{collection}' already exists with different options")]
    IndexConflict { collection: String, index: String },

    /// Collection names are restricted to `[A-Za-z0-9_]`
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    /// Only JSON objects can be stored
    #[error("Document must be a JSON object")]
    InvalidDocument,

    /// Backend could not be reached
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// Backend reported an error
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocumentStoreError {
    /// Whether the store itself is unreachable (as opposed to a rejected operation)
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}

pub type DocumentResult<T> = Result<T, DocumentStoreError>;

// ============================================================================
// Indexes
// ============================================================================

/// Key direction inside an index or sort definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// `1` / `-1`, as used in index names
    pub fn as_i8(self) -> i8 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

/// Index declaration: ordered key paths plus uniqueness
///
/// A multikey index serves [`Filter::Contains`] over an array field; its key
/// order is ignored and it cannot be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexModel {
    keys: Vec<(String, SortOrder)>,
    unique: bool,
    multikey: bool,
}

impl IndexModel {
    pub fn new(keys: Vec<(String, SortOrder)>) -> Self {
        Self {
            keys,
            unique: false,
            multikey: false,
        }
    }

    /// Single-field ascending index
    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(vec![(field.into(), SortOrder::Ascending)])
    }

    /// Single-field descending index
    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(vec![(field.into(), SortOrder::Descending)])
    }

    /// Append another key (compound index)
    pub fn then(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.keys.push((field.into(), order));
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self.multikey = false;
        self
    }

    /// Index array membership instead of whole-value order
    pub fn multikey(mut self) -> Self {
        self.multikey = true;
        self.unique = false;
        self
    }

    pub fn keys(&self) -> &[(String, SortOrder)] {
        &self.keys
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_multikey(&self) -> bool {
        self.multikey
    }

    /// Deterministic name derived from the key list, e.g. `status_1_threatLevel_-1`
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, order)| format!("{}_{}", field, order.as_i8()))
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unique {
            write!(f, "{} (unique)", self.name())
        } else {
            f.write_str(&self.name())
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Query filter
///
/// Paths are dotted (`reportedLocations.country`).
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    /// Value at the path (through objects only) equals the value
    Eq(String, Value),
    /// The array named by the first path segment holds an element whose
    /// remaining path equals the value (`scamTypes`, `reportedLocations.country`)
    Contains(String, Value),
    /// Field is absent or null
    Missing(String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(path.into(), value.into())
    }

    pub fn contains(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Contains(path.into(), value.into())
    }

    pub fn missing(path: impl Into<String>) -> Self {
        Filter::Missing(path.into())
    }

    /// Evaluate against a document
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(path, expected) => {
                lookup(document, path).is_some_and(|v| values_equal(v, expected))
            }
            Filter::Contains(path, expected) => {
                let (head, rest) = match path.split_once('.') {
                    Some((head, rest)) => (head, Some(rest)),
                    None => (path.as_str(), None),
                };
                lookup(document, head)
                    .and_then(Value::as_array)
                    .is_some_and(|items| {
                        items.iter().any(|item| match rest {
                            Some(rest) => lookup(item, rest).is_some_and(|v| values_equal(v, expected)),
                            None => values_equal(item, expected),
                        })
                    })
            }
            Filter::Missing(path) => resolve_path(document, path)
                .into_iter()
                .all(Value::is_null),
            Filter::And(filters) => filters.iter().all(|f| f.matches(document)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(document)),
        }
    }
}

/// Sort and limit for [`DocumentStore::find`]
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub sort: Vec<(String, SortOrder)>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// Documents
// ============================================================================

/// A stored document and its store-assigned id
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: Uuid,
    pub body: Value,
}

impl StoredDocument {
    pub fn deserialize<T: DeserializeOwned>(&self) -> DocumentResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

// ============================================================================
// Store trait
// ============================================================================

/// Document store contract
#[trait_variant::make(DocumentStore: Send)]
pub trait LocalDocumentStore {
    /// Insert a document, returning its new id
    async fn insert_one(&self, collection: &str, document: Value) -> DocumentResult<Uuid>;

    /// Fetch a document by id
    async fn get(&self, collection: &str, id: Uuid) -> DocumentResult<Option<StoredDocument>>;

    /// First document matching the filter
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DocumentResult<Option<StoredDocument>>;

    /// All documents matching the filter, sorted and limited
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> DocumentResult<Vec<StoredDocument>>;

    /// Replace a document by id. Returns false when no document matched.
    async fn replace_one(&self, collection: &str, id: Uuid, document: Value)
    -> DocumentResult<bool>;

    /// Delete matching documents, returning the count
    async fn delete_many(&self, collection: &str, filter: &Filter) -> DocumentResult<u64>;

    /// Create an index. Idempotent for an identical declaration. Returns the index name.
    async fn create_index(&self, collection: &str, index: &IndexModel) -> DocumentResult<String>;

    async fn list_indexes(&self, collection: &str) -> DocumentResult<Vec<IndexModel>>;

    /// Connectivity check
    async fn ping(&self) -> DocumentResult<()>;
}

// ============================================================================
// Runtime-selected backend
// ============================================================================

/// Backend chosen at startup
#[derive(Clone)]
pub enum DocumentStoreBackend {
    Memory(MemoryDocumentStore),
    Postgres(PgDocumentStore),
}

impl DocumentStoreBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentStoreBackend::Memory(_) => "memory",
            DocumentStoreBackend::Postgres(_) => "postgres",
        }
    }
}

impl DocumentStore for DocumentStoreBackend {
    async fn insert_one(&self, collection: &str, document: Value) -> DocumentResult<Uuid> {
        match self {
            Self::Memory(s) => DocumentStore::insert_one(s, collection, document).await,
            Self::Postgres(s) => DocumentStore::insert_one(s, collection, document).await,
        }
    }

    async fn get(&self, collection: &str, id: Uuid) -> DocumentResult<Option<StoredDocument>> {
        match self {
            Self::Memory(s) => DocumentStore::get(s, collection, id).await,
            Self::Postgres(s) => DocumentStore::get(s, collection, id).await,
        }
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DocumentResult<Option<StoredDocument>> {
        match self {
            Self::Memory(s) => DocumentStore::find_one(s, collection, filter).await,
            Self::Postgres(s) => DocumentStore::find_one(s, collection, filter).await,
        }
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> DocumentResult<Vec<StoredDocument>> {
        match self {
            Self::Memory(s) => DocumentStore::find(s, collection, filter, options).await,
            Self::Postgres(s) => DocumentStore::find(s, collection, filter, options).await,
        }
    }

    async fn replace_one(
        &self,
        collection: &str,
        id: Uuid,
        document: Value,
    ) -> DocumentResult<bool> {
        match self {
            Self::Memory(s) => DocumentStore::replace_one(s, collection, id, document).await,
            Self::Postgres(s) => DocumentStore::replace_one(s, collection, id, document).await,
        }
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> DocumentResult<u64> {
        match self {
            Self::Memory(s) => DocumentStore::delete_many(s, collection, filter).await,
            Self::Postgres(s) => DocumentStore::delete_many(s, collection, filter).await,
        }
    }

    async fn create_index(&self, collection: &str, index: &IndexModel) -> DocumentResult<String> {
        match self {
            Self::Memory(s) => DocumentStore::create_index(s, collection, index).await,
            Self::Postgres(s) => DocumentStore::create_index(s, collection, index).await,
        }
    }

    async fn list_indexes(&self, collection: &str) -> DocumentResult<Vec<IndexModel>> {
        match self {
            Self::Memory(s) => DocumentStore::list_indexes(s, collection).await,
            Self::Postgres(s) => DocumentStore::list_indexes(s, collection).await,
        }
    }

    async fn ping(&self) -> DocumentResult<()> {
        match self {
            Self::Memory(s) => DocumentStore::ping(s).await,
            Self::Postgres(s) => DocumentStore::ping(s).await,
        }
    }
}

// ============================================================================
// Value helpers
// ============================================================================

/// Resolve a dotted path, descending through arrays
pub(crate) fn resolve_path<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
    fn walk<'a>(value: &'a Value, segments: &[&str], out: &mut Vec<&'a Value>) {
        let Some((head, rest)) = segments.split_first() else {
            out.push(value);
            return;
        };
        match value {
            Value::Object(map) => {
                if let Some(child) = map.get(*head) {
                    walk(child, rest, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    walk(item, segments, out);
                }
            }
            _ => {}
        }
    }

    let segments: Vec<&str> = path.split('.').collect();
    let mut out = Vec::new();
    walk(document, &segments, &mut out);
    out
}

/// Follow a dotted path through objects only
pub(crate) fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |value, segment| value.as_object()?.get(segment))
}

/// Equality that treats `5` and `5.0` as the same number
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Total order over JSON values (null < numbers < strings < objects < arrays < booleans)
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Number(_) => 1,
            Value::String(_) => 2,
            Value::Object(_) => 3,
            Value::Array(_) => 4,
            Value::Bool(_) => 5,
        }
    }

    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(0.0)
            .total_cmp(&y.as_f64().unwrap_or(0.0)),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Collection names double as SQL identifiers
pub(crate) fn validate_collection(collection: &str) -> DocumentResult<()> {
    let valid = !collection.is_empty()
        && collection.len() <= 40
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DocumentStoreError::InvalidCollection(collection.to_string()))
    }
}

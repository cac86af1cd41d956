//! Document Store Repository Implementation

use std::sync::Arc;

use kernel::id::ScammerId;
use platform::document::{DocumentStore, DocumentStoreError, Filter, FindOptions, SortOrder};

use crate::domain::entities::ScammerRecord;
use crate::domain::index_plan::{SCAMMERS_COLLECTION, scammer_index_plan};
use crate::domain::repository::ScammerRepository;
use crate::domain::value_objects::{ScammerQuery, ScammerSort};
use crate::error::{ScammerError, ScammerResult};

/// Document-store-backed scammer repository
pub struct DocumentScammerRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for DocumentScammerRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S> DocumentScammerRepository<S>
where
    S: DocumentStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> ScammerRepository for DocumentScammerRepository<S>
where
    S: DocumentStore + Send + Sync + 'static,
{
    async fn insert(&self, record: &ScammerRecord) -> ScammerResult<ScammerId> {
        let document = record.to_document()?;
        self.store
            .insert_one(SCAMMERS_COLLECTION, document)
            .await
            .map(ScammerId::from_uuid)
            .map_err(map_write_error)
    }

    async fn get(&self, id: ScammerId) -> ScammerResult<Option<ScammerRecord>> {
        let Some(stored) = self.store.get(SCAMMERS_COLLECTION, id.into_uuid()).await? else {
            return Ok(None);
        };
        let mut record: ScammerRecord = stored.deserialize()?;
        record.id = Some(stored.id.to_string());
        Ok(Some(record))
    }

    async fn replace(&self, id: ScammerId, record: &ScammerRecord) -> ScammerResult<bool> {
        let document = record.to_document()?;
        self.store
            .replace_one(SCAMMERS_COLLECTION, id.into_uuid(), document)
            .await
            .map_err(map_write_error)
    }

    async fn list(&self, query: &ScammerQuery) -> ScammerResult<Vec<ScammerRecord>> {
        let found = self
            .store
            .find(SCAMMERS_COLLECTION, &query_filter(query), &find_options(query))
            .await?;

        found
            .into_iter()
            .map(|stored| -> ScammerResult<ScammerRecord> {
                let mut record: ScammerRecord = stored.deserialize()?;
                record.id = Some(stored.id.to_string());
                Ok(record)
            })
            .collect()
    }

    async fn prune_missing_email(&self) -> ScammerResult<u64> {
        Ok(self
            .store
            .delete_many(SCAMMERS_COLLECTION, &Filter::missing("email"))
            .await?)
    }

    async fn apply_index_plan(&self) -> ScammerResult<Vec<String>> {
        let mut names = Vec::new();
        for index in scammer_index_plan() {
            let name = self.store.create_index(SCAMMERS_COLLECTION, &index).await?;
            tracing::info!(collection = SCAMMERS_COLLECTION, index = %name, "Index ensured");
            names.push(name);
        }
        Ok(names)
    }
}

fn map_write_error(err: DocumentStoreError) -> ScammerError {
    match err {
        DocumentStoreError::DuplicateKey { index, .. } => {
            tracing::info!(index = %index, "Scammer write hit unique index");
            ScammerError::DuplicateEmail
        }
        other => ScammerError::Store(other),
    }
}

/// Equality and array-membership filters; each is backed by an index in the plan
fn query_filter(query: &ScammerQuery) -> Filter {
    let mut clauses = Vec::new();
    if let Some(status) = query.status {
        clauses.push(Filter::eq("status", status.as_str()));
    }
    if let Some(scam_type) = query.scam_type {
        clauses.push(Filter::contains("scamTypes", scam_type.as_str()));
    }
    if let Some(country) = &query.country {
        clauses.push(Filter::contains("reportedLocations.country", country.as_str()));
    }

    match clauses.len() {
        0 => Filter::All,
        1 => clauses.remove(0),
        _ => Filter::And(clauses),
    }
}

fn find_options(query: &ScammerQuery) -> FindOptions {
    let options = match query.sort {
        ScammerSort::Threat => FindOptions::default()
            .sort_by("status", SortOrder::Ascending)
            .sort_by("threatLevel", SortOrder::Descending),
        ScammerSort::Recent => {
            FindOptions::default().sort_by("lastUpdated", SortOrder::Descending)
        }
    };
    options.limit(query.limit)
}

//! In-memory document store
//!
//! Writes are serialised behind a single `RwLock`; unique-index checks run in
//! the same critical section as the write they guard.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    DocumentResult, DocumentStore, DocumentStoreError, Filter, FindOptions, IndexModel,
    StoredDocument, compare_values, resolve_path, validate_collection, values_equal,
};

#[derive(Default)]
struct Collection {
    /// Insertion order is the natural order
    documents: Vec<(Uuid, Value)>,
    indexes: Vec<IndexModel>,
}

impl Collection {
    /// Name of the first unique index the candidate would violate
    fn unique_violation(&self, candidate: &Value, skip: Option<Uuid>) -> Option<String> {
        self.indexes
            .iter()
            .filter(|index| index.is_unique())
            .find(|index| {
                let key = index_key(index, candidate);
                self.documents
                    .iter()
                    .filter(|(id, _)| Some(*id) != skip)
                    .any(|(_, existing)| keys_equal(&index_key(index, existing), &key))
            })
            .map(IndexModel::name)
    }
}

/// Index key tuple; absent fields index as null
fn index_key(index: &IndexModel, document: &Value) -> Vec<Value> {
    index
        .keys()
        .iter()
        .map(|(path, _)| {
            resolve_path(document, path)
                .into_iter()
                .next()
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect()
}

fn keys_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
}

/// Process-local document store
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn insert_one(&self, collection: &str, document: Value) -> DocumentResult<Uuid> {
        validate_collection(collection)?;
        if !document.is_object() {
            return Err(DocumentStoreError::InvalidDocument);
        }

        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();

        if let Some(index) = coll.unique_violation(&document, None) {
            return Err(DocumentStoreError::DuplicateKey {
                collection: collection.to_string(),
                index,
            });
        }

        let id = Uuid::new_v4();
        coll.documents.push((id, document));
        Ok(id)
    }

    async fn get(&self, collection: &str, id: Uuid) -> DocumentResult<Option<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|coll| {
            coll.documents
                .iter()
                .find(|(doc_id, _)| *doc_id == id)
                .map(|(id, body)| StoredDocument {
                    id: *id,
                    body: body.clone(),
                })
        }))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DocumentResult<Option<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|coll| {
            coll.documents
                .iter()
                .find(|(_, body)| filter.matches(body))
                .map(|(id, body)| StoredDocument {
                    id: *id,
                    body: body.clone(),
                })
        }))
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> DocumentResult<Vec<StoredDocument>> {
        let collections = self.collections.read().await;
        let Some(coll) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<StoredDocument> = coll
            .documents
            .iter()
            .filter(|(_, body)| filter.matches(body))
            .map(|(id, body)| StoredDocument {
                id: *id,
                body: body.clone(),
            })
            .collect();

        if !options.sort.is_empty() {
            // Stable sort keeps insertion order for ties
            matched.sort_by(|a, b| {
                options
                    .sort
                    .iter()
                    .map(|(path, order)| {
                        let left = resolve_path(&a.body, path).into_iter().next();
                        let right = resolve_path(&b.body, path).into_iter().next();
                        let ordering = compare_values(
                            left.unwrap_or(&Value::Null),
                            right.unwrap_or(&Value::Null),
                        );
                        match order {
                            super::SortOrder::Ascending => ordering,
                            super::SortOrder::Descending => ordering.reverse(),
                        }
                    })
                    .find(|ordering| ordering.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        if let Some(limit) = options.limit {
            matched.truncate(limit);
        }

        Ok(matched)
    }

    async fn replace_one(
        &self,
        collection: &str,
        id: Uuid,
        document: Value,
    ) -> DocumentResult<bool> {
        if !document.is_object() {
            return Err(DocumentStoreError::InvalidDocument);
        }

        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let Some(position) = coll.documents.iter().position(|(doc_id, _)| *doc_id == id) else {
            return Ok(false);
        };

        if let Some(index) = coll.unique_violation(&document, Some(id)) {
            return Err(DocumentStoreError::DuplicateKey {
                collection: collection.to_string(),
                index,
            });
        }

        coll.documents[position].1 = document;
        Ok(true)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> DocumentResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = coll.documents.len();
        coll.documents.retain(|(_, body)| !filter.matches(body));
        Ok((before - coll.documents.len()) as u64)
    }

    async fn create_index(&self, collection: &str, index: &IndexModel) -> DocumentResult<String> {
        validate_collection(collection)?;

        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();
        let name = index.name();

        if let Some(existing) = coll.indexes.iter().find(|i| i.name() == name) {
            if existing == index {
                return Ok(name);
            }
            return Err(DocumentStoreError::IndexConflict {
                collection: collection.to_string(),
                index: name,
            });
        }

        if index.is_unique() {
            let keys: Vec<Vec<Value>> = coll
                .documents
                .iter()
                .map(|(_, body)| index_key(index, body))
                .collect();
            let has_duplicates = keys
                .iter()
                .enumerate()
                .any(|(i, key)| keys[i + 1..].iter().any(|other| keys_equal(key, other)));
            if has_duplicates {
                return Err(DocumentStoreError::DuplicateKey {
                    collection: collection.to_string(),
                    index: name,
                });
            }
        }

        coll.indexes.push(index.clone());
        Ok(name)
    }

    async fn list_indexes(&self, collection: &str) -> DocumentResult<Vec<IndexModel>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|coll| coll.indexes.clone())
            .unwrap_or_default())
    }

    async fn ping(&self) -> DocumentResult<()> {
        Ok(())
    }
}

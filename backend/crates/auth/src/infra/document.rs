//! Document Store Repository Implementation
//!
//! Credentials live in the `users` collection:
//! `{username, email, passwordHash, disabled}`.

use std::sync::Arc;

use kernel::email::Email;
use kernel::id::CredentialId;
use platform::document::{DocumentStore, DocumentStoreError, Filter, IndexModel};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Credential, NewCredential};
use crate::domain::repository::CredentialRepository;
use crate::domain::value_object::{user_name::UserName, user_password::UserPassword};
use crate::error::{AuthError, AuthResult};

/// Collection holding credentials
pub const USERS_COLLECTION: &str = "users";

/// Indexes that must exist before credentials are written
///
/// These unique indexes are what makes registration race-free.
pub fn users_index_plan() -> Vec<IndexModel> {
    vec![
        IndexModel::ascending("username").unique(),
        IndexModel::ascending("email").unique(),
    ]
}

/// Document-store-backed credential repository
pub struct DocumentCredentialRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for DocumentCredentialRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S> DocumentCredentialRepository<S>
where
    S: DocumentStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Apply the users index plan (idempotent)
    ///
    /// Failure here must stop startup.
    pub async fn ensure_indexes(&self) -> AuthResult<()> {
        for index in users_index_plan() {
            let name = self.store.create_index(USERS_COLLECTION, &index).await?;
            tracing::info!(collection = USERS_COLLECTION, index = %name, "Index ensured");
        }
        Ok(())
    }
}

impl<S> CredentialRepository for DocumentCredentialRepository<S>
where
    S: DocumentStore + Send + Sync + 'static,
{
    async fn create(&self, credential: &NewCredential) -> AuthResult<CredentialId> {
        let document = serde_json::to_value(CredentialDocument {
            username: credential.username.as_str().to_string(),
            email: credential.email.as_str().to_string(),
            password_hash: credential.password_hash.as_phc_string().to_string(),
            disabled: false,
        })
        .map_err(DocumentStoreError::from)?;

        match self.store.insert_one(USERS_COLLECTION, document).await {
            Ok(id) => Ok(CredentialId::from_uuid(id)),
            Err(DocumentStoreError::DuplicateKey { index, .. }) => {
                tracing::info!(index = %index, "Credential insert hit unique index");
                Err(AuthError::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Credential>> {
        let found = self
            .store
            .find_one(USERS_COLLECTION, &Filter::eq("username", username))
            .await?;

        found
            .map(|stored| -> AuthResult<Credential> {
                let doc: CredentialDocument = stored.deserialize()?;
                Ok(doc.into_credential(CredentialId::from_uuid(stored.id)))
            })
            .transpose()
    }

    async fn exists_by_username_or_email(
        &self,
        username: &UserName,
        email: &Email,
    ) -> AuthResult<bool> {
        let filter = Filter::Or(vec![
            Filter::eq("username", username.as_str()),
            Filter::eq("email", email.as_str()),
        ]);
        Ok(self
            .store
            .find_one(USERS_COLLECTION, &filter)
            .await?
            .is_some())
    }
}

/// Persisted credential layout
#[derive(Debug, Serialize, Deserialize)]
struct CredentialDocument {
    username: String,
    email: String,
    #[serde(rename = "passwordHash")]
    password_hash: String,
    #[serde(default)]
    disabled: bool,
}

impl CredentialDocument {
    fn into_credential(self, id: CredentialId) -> Credential {
        Credential {
            id,
            username: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash: UserPassword::from_stored(self.password_hash),
            disabled: self.disabled,
        }
    }
}

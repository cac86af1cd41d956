//! PostgreSQL document store
//!
//! Each collection is a table `(id UUID, seq BIGSERIAL, doc JSONB)` created on
//! first use. Indexes are expression indexes over the JSONB body: btree on
//! `(doc -> 'field')` for equality and sorting, GIN `jsonb_path_ops` on the
//! array root for membership. Filters compile to the same literal expressions
//! so the planner can match them. Index declarations are recorded in
//! `document_indexes` so they can be listed and compared on re-application.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    DocumentResult, DocumentStore, DocumentStoreError, Filter, FindOptions, IndexModel,
    SortOrder, StoredDocument, validate_collection,
};

/// PostgreSQL-backed document store
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    ensured: Arc<Mutex<HashSet<String>>>,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            ensured: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the collection table on first use
    async fn ensure_collection(&self, collection: &str) -> DocumentResult<()> {
        validate_collection(collection)?;

        let mut ensured = self.ensured.lock().await;
        if ensured.contains(collection) {
            return Ok(());
        }

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS "{collection}" (
                id UUID PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                doc JSONB NOT NULL
            )
            "#
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(collection, e))?;

        ensured.insert(collection.to_string());
        tracing::debug!(collection = %collection, "Collection table ready");
        Ok(())
    }

    async fn ensure_index_registry(&self) -> DocumentResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS document_indexes (
                collection TEXT NOT NULL,
                name TEXT NOT NULL,
                keys JSONB NOT NULL,
                is_unique BOOLEAN NOT NULL,
                is_multikey BOOLEAN NOT NULL DEFAULT FALSE,
                PRIMARY KEY (collection, name)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("document_indexes", e))?;
        Ok(())
    }
}

impl DocumentStore for PgDocumentStore {
    async fn insert_one(&self, collection: &str, document: Value) -> DocumentResult<Uuid> {
        if !document.is_object() {
            return Err(DocumentStoreError::InvalidDocument);
        }
        self.ensure_collection(collection).await?;

        let id = Uuid::new_v4();
        sqlx::query(&format!(
            r#"INSERT INTO "{collection}" (id, doc) VALUES ($1, $2)"#
        ))
        .bind(id)
        .bind(Json(document))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(collection, e))?;

        Ok(id)
    }

    async fn get(&self, collection: &str, id: Uuid) -> DocumentResult<Option<StoredDocument>> {
        self.ensure_collection(collection).await?;

        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            r#"SELECT id, doc FROM "{collection}" WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(collection, e))?;

        Ok(row.map(DocumentRow::into_stored))
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> DocumentResult<Option<StoredDocument>> {
        let mut docs = self
            .find(collection, filter, &FindOptions::default().limit(1))
            .await?;
        Ok(docs.pop())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> DocumentResult<Vec<StoredDocument>> {
        self.ensure_collection(collection).await?;

        let mut builder = select_query(collection, filter, options);
        let rows = builder
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(collection, e))?;

        Ok(rows.into_iter().map(DocumentRow::into_stored).collect())
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
        self.ensure_collection(collection).await?;

        let result = sqlx::query(&format!(
            r#"UPDATE "{collection}" SET doc = $2 WHERE id = $1"#
        ))
        .bind(id)
        .bind(Json(document))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(collection, e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> DocumentResult<u64> {
        self.ensure_collection(collection).await?;

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            r#"DELETE FROM "{collection}" WHERE "#
        ));
        push_filter(&mut builder, filter);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(collection, e))?;

        Ok(result.rows_affected())
    }

    async fn create_index(&self, collection: &str, index: &IndexModel) -> DocumentResult<String> {
        self.ensure_collection(collection).await?;
        self.ensure_index_registry().await?;

        let name = index.name();

        let existing = sqlx::query_as::<_, (bool, bool)>(
            "SELECT is_unique, is_multikey FROM document_indexes WHERE collection = $1 AND name = $2",
        )
        .bind(collection)
        .bind(&name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(collection, e))?;

        match existing {
            Some((unique, multikey))
                if unique == index.is_unique() && multikey == index.is_multikey() =>
            {
                return Ok(name);
            }
            Some(_) => {
                return Err(DocumentStoreError::IndexConflict {
                    collection: collection.to_string(),
                    index: name,
                });
            }
            None => {}
        }

        sqlx::query(&create_index_sql(collection, index))
            .execute(&self.pool)
            .await
            .map_err(|e| match map_sqlx_error(collection, e) {
                DocumentStoreError::DuplicateKey { collection, .. } => {
                    DocumentStoreError::DuplicateKey {
                        collection,
                        index: name.clone(),
                    }
                }
                other => other,
            })?;

        let keys: Vec<(String, i8)> = index
            .keys()
            .iter()
            .map(|(field, order)| (field.clone(), order.as_i8()))
            .collect();

        sqlx::query(
            r#"
            INSERT INTO document_indexes (collection, name, keys, is_unique, is_multikey)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (collection, name) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(&name)
        .bind(Json(keys))
        .bind(index.is_unique())
        .bind(index.is_multikey())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(collection, e))?;

        tracing::info!(collection = %collection, index = %index, "Index created");
        Ok(name)
    }

    async fn list_indexes(&self, collection: &str) -> DocumentResult<Vec<IndexModel>> {
        validate_collection(collection)?;
        self.ensure_index_registry().await?;

        let rows = sqlx::query_as::<_, IndexRow>(
            "SELECT keys, is_unique, is_multikey FROM document_indexes WHERE collection = $1 ORDER BY name",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(collection, e))?;

        Ok(rows.into_iter().map(IndexRow::into_model).collect())
    }

    async fn ping(&self) -> DocumentResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("-", e))?;
        Ok(())
    }
}

// ============================================================================
// SQL generation
// ============================================================================

/// SQL/JSON path for a dotted field path: `a.b` -> `$."a"."b"`
fn json_path(path: &str) -> String {
    let mut out = String::from("$");
    for segment in path.split('.') {
        out.push_str(".\"");
        out.push_str(&segment.replace('\\', "\\\\").replace('"', "\\\""));
        out.push('"');
    }
    out
}

fn push_filter(builder: &mut QueryBuilder<'static, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {
            builder.push("TRUE");
        }
        Filter::Eq(path, value) => {
            builder.push(key_expression(path));
            builder.push(" = ");
            builder.push_bind(Json(value.clone()));
            builder.push("::jsonb");
        }
        Filter::Contains(path, value) => {
            let (root, rest) = match path.split_once('.') {
                Some((root, rest)) => (root, Some(rest)),
                None => (path.as_str(), None),
            };
            let element = match rest {
                Some(rest) => rest
                    .rsplit('.')
                    .fold(value.clone(), |inner, segment| {
                        Value::Object(Map::from_iter([(segment.to_string(), inner)]))
                    }),
                None => value.clone(),
            };
            builder.push(key_expression(root));
            builder.push(" @> ");
            builder.push_bind(Json(json!([element])));
            builder.push("::jsonb");
        }
        Filter::Missing(path) if !path.contains('.') => {
            let key = key_expression(path);
            builder.push(format!("({key} IS NULL OR {key} = 'null'::jsonb)"));
        }
        Filter::Missing(path) => {
            builder.push("NOT jsonb_path_exists(doc, ");
            builder.push_bind(format!("{} ? (@ != null)", json_path(path)));
            builder.push("::jsonpath)");
        }
        Filter::And(filters) | Filter::Or(filters) if filters.is_empty() => {
            builder.push(if matches!(filter, Filter::And(_)) {
                "TRUE"
            } else {
                "FALSE"
            });
        }
        Filter::And(filters) | Filter::Or(filters) => {
            let joiner = if matches!(filter, Filter::And(_)) {
                " AND "
            } else {
                " OR "
            };
            builder.push("(");
            for (i, f) in filters.iter().enumerate() {
                if i > 0 {
                    builder.push(joiner);
                }
                push_filter(builder, f);
            }
            builder.push(")");
        }
    }
}

fn select_query(
    collection: &str,
    filter: &Filter,
    options: &FindOptions,
) -> QueryBuilder<'static, Postgres> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!(r#"SELECT id, doc FROM "{collection}" WHERE "#));
    push_filter(&mut builder, filter);

    builder.push(" ORDER BY ");
    for (path, order) in &options.sort {
        builder.push(key_expression(path));
        builder.push(match order {
            SortOrder::Ascending => " ASC, ",
            SortOrder::Descending => " DESC, ",
        });
    }
    builder.push("seq");

    if let Some(limit) = options.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit as i64);
    }
    builder
}

/// PostgreSQL index names are schema-wide, so they carry the collection
fn pg_index_name(collection: &str, index: &IndexModel) -> String {
    let keys = index
        .keys()
        .iter()
        .map(|(field, order)| {
            let dir = match order {
                SortOrder::Ascending => "asc",
                SortOrder::Descending => "desc",
            };
            format!("{}_{}", field.replace('.', "_"), dir)
        })
        .collect::<Vec<_>>()
        .join("_");
    format!("{collection}_{keys}")
}

/// Literal JSONB expression for a field; indexes and filters must agree on it
fn key_expression(field: &str) -> String {
    if field.contains('.') {
        let segments = field
            .split('.')
            .map(|segment| format!("\"{}\"", segment.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect::<Vec<_>>()
            .join(",");
        format!("(doc #> '{{{}}}')", segments.replace('\'', "''"))
    } else {
        format!("(doc -> '{}')", field.replace('\'', "''"))
    }
}

fn create_index_sql(collection: &str, index: &IndexModel) -> String {
    if index.is_multikey() {
        let mut roots: Vec<&str> = Vec::new();
        for (field, _) in index.keys() {
            let root = field.split('.').next().unwrap_or(field);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        let columns = roots
            .iter()
            .map(|root| format!("{} jsonb_path_ops", key_expression(root)))
            .collect::<Vec<_>>()
            .join(", ");
        return format!(
            r#"CREATE INDEX IF NOT EXISTS "{}" ON "{}" USING GIN ({})"#,
            pg_index_name(collection, index),
            collection,
            columns
        );
    }

    let columns = index
        .keys()
        .iter()
        .map(|(field, order)| match order {
            SortOrder::Ascending => key_expression(field),
            SortOrder::Descending => format!("{} DESC", key_expression(field)),
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"CREATE {}INDEX IF NOT EXISTS "{}" ON "{}" ({})"#,
        if index.is_unique() { "UNIQUE " } else { "" },
        pg_index_name(collection, index),
        collection,
        columns
    )
}

fn map_sqlx_error(collection: &str, err: sqlx::Error) -> DocumentStoreError {
    match &err {
        // unique_violation
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            DocumentStoreError::DuplicateKey {
                collection: collection.to_string(),
                index: db_err.constraint().unwrap_or("unknown").to_string(),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            DocumentStoreError::Unavailable(err.to_string())
        }
        _ => DocumentStoreError::Database(err),
    }
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    doc: Json<Value>,
}

impl DocumentRow {
    fn into_stored(self) -> StoredDocument {
        StoredDocument {
            id: self.id,
            body: self.doc.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct IndexRow {
    keys: Json<Vec<(String, i8)>>,
    is_unique: bool,
    is_multikey: bool,
}

impl IndexRow {
    fn into_model(self) -> IndexModel {
        let keys = self
            .keys
            .0
            .into_iter()
            .map(|(field, dir)| {
                let order = if dir < 0 {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                };
                (field, order)
            })
            .collect();
        let model = IndexModel::new(keys);
        if self.is_unique {
            model.unique()
        } else if self.is_multikey {
            model.multikey()
        } else {
            model
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_path() {
        assert_eq!(json_path("email"), r#"$."email""#);
        assert_eq!(
            json_path("reportedLocations.country"),
            r#"$."reportedLocations"."country""#
        );
    }

    #[test]
    fn test_filter_sql_binds_values() {
        let filter = Filter::Or(vec![
            Filter::eq("username", "alice"),
            Filter::eq("email", json!("a@x.com")),
        ]);
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 WHERE ");
        push_filter(&mut builder, &filter);

        let sql = builder.sql();
        assert!(sql.contains(" OR "));
        assert!(sql.contains("$2::jsonb"));
        assert!(!sql.contains("alice"));
    }

    #[test]
    fn test_filter_sql_scalar_eq_matches_btree_expression() {
        let mut builder = QueryBuilder::<Postgres>::new("");
        push_filter(&mut builder, &Filter::eq("email", "a@x.com"));
        assert_eq!(builder.sql(), "(doc -> 'email') = $1::jsonb");

        // Same text as the indexed expression
        assert!(
            create_index_sql("users", &IndexModel::ascending("email").unique())
                .contains("((doc -> 'email'))")
        );

        let mut builder = QueryBuilder::<Postgres>::new("");
        push_filter(&mut builder, &Filter::eq("location.country", "Ghana"));
        assert_eq!(
            builder.sql(),
            r#"(doc #> '{"location","country"}') = $1::jsonb"#
        );
    }

    #[test]
    fn test_filter_sql_contains_uses_containment() {
        let mut builder = QueryBuilder::<Postgres>::new("");
        push_filter(&mut builder, &Filter::contains("scamTypes", "phishing"));
        assert_eq!(builder.sql(), "(doc -> 'scamTypes') @> $1::jsonb");

        let mut builder = QueryBuilder::<Postgres>::new("");
        push_filter(
            &mut builder,
            &Filter::And(vec![
                Filter::eq("status", "active"),
                Filter::contains("reportedLocations.country", "Ghana"),
            ]),
        );
        assert_eq!(
            builder.sql(),
            "((doc -> 'status') = $1::jsonb AND (doc -> 'reportedLocations') @> $2::jsonb)"
        );
        assert!(!builder.sql().contains("jsonb_path_exists"));
    }

    #[test]
    fn test_filter_sql_missing() {
        let mut builder = QueryBuilder::<Postgres>::new("");
        push_filter(&mut builder, &Filter::Missing("deletedAt".into()));
        assert_eq!(
            builder.sql(),
            "((doc -> 'deletedAt') IS NULL OR (doc -> 'deletedAt') = 'null'::jsonb)"
        );

        let mut builder = QueryBuilder::<Postgres>::new("");
        push_filter(&mut builder, &Filter::Missing("a.b".into()));
        assert_eq!(builder.sql(), "NOT jsonb_path_exists(doc, $1::jsonpath)");
    }

    #[test]
    fn test_key_expression_escapes_literals() {
        assert_eq!(key_expression("it's"), "(doc -> 'it''s')");
        assert_eq!(key_expression(r#"a."b"#), r#"(doc #> '{"a","\"b"}')"#);
    }

    #[test]
    fn test_empty_boolean_filters() {
        let mut builder = QueryBuilder::<Postgres>::new("");
        push_filter(&mut builder, &Filter::And(vec![]));
        assert_eq!(builder.sql(), "TRUE");

        let mut builder = QueryBuilder::<Postgres>::new("");
        push_filter(&mut builder, &Filter::Or(vec![]));
        assert_eq!(builder.sql(), "FALSE");
    }

    #[test]
    fn test_select_query_sort_and_limit() {
        let options = FindOptions::default()
            .sort_by("status", SortOrder::Ascending)
            .sort_by("threatLevel", SortOrder::Descending)
            .limit(10);
        let builder = select_query("scammers", &Filter::All, &options);

        assert_eq!(
            builder.sql(),
            r#"SELECT id, doc FROM "scammers" WHERE TRUE ORDER BY (doc -> 'status') ASC, (doc -> 'threatLevel') DESC, seq LIMIT $1"#
        );
    }

    #[test]
    fn test_create_index_sql() {
        let unique = IndexModel::ascending("email").unique();
        assert_eq!(
            create_index_sql("scammers", &unique),
            r#"CREATE UNIQUE INDEX IF NOT EXISTS "scammers_email_asc" ON "scammers" ((doc -> 'email'))"#
        );

        let compound = IndexModel::ascending("status").then("threatLevel", SortOrder::Descending);
        assert_eq!(
            create_index_sql("scammers", &compound),
            r#"CREATE INDEX IF NOT EXISTS "scammers_status_asc_threatLevel_desc" ON "scammers" ((doc -> 'status'), (doc -> 'threatLevel') DESC)"#
        );

        let nested = IndexModel::ascending("location.country");
        assert!(create_index_sql("scammers", &nested).contains(r#"((doc #> '{"location","country"}'))"#));
    }

    #[test]
    fn test_create_multikey_index_sql() {
        let tags = IndexModel::ascending("scamTypes").multikey();
        assert_eq!(
            create_index_sql("scammers", &tags),
            r#"CREATE INDEX IF NOT EXISTS "scammers_scamTypes_asc" ON "scammers" USING GIN ((doc -> 'scamTypes') jsonb_path_ops)"#
        );

        let nested = IndexModel::ascending("reportedLocations.country").multikey();
        assert_eq!(
            create_index_sql("scammers", &nested),
            r#"CREATE INDEX IF NOT EXISTS "scammers_reportedLocations_country_asc" ON "scammers" USING GIN ((doc -> 'reportedLocations') jsonb_path_ops)"#
        );
    }
}

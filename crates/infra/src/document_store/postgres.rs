//! Postgres-backed document store.
//!
//! Each collection is one table:
//!
//! ```sql
//! CREATE TABLE <collection> (
//!     id   UUID PRIMARY KEY,
//!     seq  BIGSERIAL NOT NULL,
//!     doc  JSONB NOT NULL
//! );
//! ```
//!
//! `seq` records insertion order and is the natural order of `find_many`.
//! Partial updates use JSONB concatenation (`doc || $set`), so a single
//! `UPDATE` statement is the whole read-modify-write.
//!
//! ## Error Mapping
//!
//! Every sqlx error becomes `StoreError::Backend` with the operation name and
//! the driver message embedded.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool, Row};
use tracing::{instrument, Span};

use stockroom_core::ItemId;

use super::{Document, DocumentStore, Filter, Predicate, StoreError, ID_FIELD};

/// Postgres-backed document collection.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and handles
/// connection sharing.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
    collection: String,
}

impl PostgresDocumentStore {
    /// Create a store over `collection`.
    ///
    /// The name is spliced into SQL, so only `[a-z_][a-z0-9_]*` is accepted.
    pub fn new(pool: PgPool, collection: impl Into<String>) -> Result<Self, StoreError> {
        let collection = collection.into();
        if !is_valid_collection(&collection) {
            return Err(StoreError::InvalidCollection(collection));
        }
        Ok(Self {
            pool: Arc::new(pool),
            collection,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Create the collection table if it does not exist yet.
    #[instrument(skip(self), fields(collection = %self.collection), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                doc JSONB NOT NULL
            )
            "#,
            self.collection
        );
        sqlx::query(&sql)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self, doc), fields(collection = %self.collection, id = tracing::field::Empty), err)]
    async fn insert_one(&self, mut doc: Document) -> Result<Document, StoreError> {
        let id = ItemId::new();
        Span::current().record("id", tracing::field::display(id));
        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2) RETURNING doc", self.collection);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Json(Value::Object(doc)))
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_one", e))?;
        decode_row(&row)
    }

    #[instrument(skip(self), fields(collection = %self.collection, id = %id), err)]
    async fn find_one(&self, id: ItemId) -> Result<Option<Document>, StoreError> {
        let sql = format!("SELECT doc FROM {} WHERE id = $1", self.collection);
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_one", e))?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self, filter), fields(collection = %self.collection, predicates = filter.predicates().len(), count = tracing::field::Empty), err)]
    async fn find_many(&self, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let sql = select_sql(&self.collection, filter);
        let mut query = sqlx::query(&sql);
        for predicate in filter.predicates() {
            let value = match predicate {
                Predicate::Gt { value, .. } | Predicate::Lt { value, .. } => *value,
            };
            query = query.bind(predicate.field().to_string()).bind(value);
        }

        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_many", e))?;

        let docs = rows.iter().map(decode_row).collect::<Result<Vec<_>, _>>()?;
        Span::current().record("count", docs.len());
        Ok(docs)
    }

    #[instrument(skip(self, set), fields(collection = %self.collection, id = %id), err)]
    async fn update_one(&self, id: ItemId, mut set: Document) -> Result<Option<Document>, StoreError> {
        set.remove(ID_FIELD);

        let sql = format!(
            "UPDATE {} SET doc = doc || $2 WHERE id = $1 RETURNING doc",
            self.collection
        );
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(Json(Value::Object(set)))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_one", e))?;
        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self), fields(collection = %self.collection, id = %id), err)]
    async fn delete_one(&self, id: ItemId) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.collection);
        let res = sqlx::query(&sql)
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_one", e))?;
        Ok(res.rows_affected() > 0)
    }
}

/// Build the `SELECT` for a filter. Each predicate binds two parameters: the
/// field name and the bound. Non-numeric values compare as NULL and never match.
fn select_sql(collection: &str, filter: &Filter) -> String {
    let mut sql = format!("SELECT doc FROM {collection}");
    for (idx, predicate) in filter.predicates().iter().enumerate() {
        let field_param = idx * 2 + 1;
        let value_param = field_param + 1;
        let op = match predicate {
            Predicate::Gt { .. } => ">",
            Predicate::Lt { .. } => "<",
        };
        sql.push_str(if idx == 0 { " WHERE " } else { " AND " });
        sql.push_str(&format!(
            "(CASE WHEN jsonb_typeof(doc -> ${field_param}) = 'number' THEN (doc ->> ${field_param})::float8 END) {op} ${value_param}"
        ));
    }
    sql.push_str(" ORDER BY seq ASC");
    sql
}

fn decode_row(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    let Json(value): Json<Value> = row
        .try_get("doc")
        .map_err(|e| StoreError::Corrupt(format!("failed to read doc column: {e}")))?;
    match value {
        Value::Object(doc) => Ok(doc),
        other => Err(StoreError::Corrupt(format!("expected a JSON object, got {other}"))),
    }
}

fn is_valid_collection(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolClosed => StoreError::Backend(format!("connection pool closed in {}", operation)),
        sqlx::Error::PoolTimedOut => StoreError::Backend(format!("connection pool timed out in {}", operation)),
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_are_restricted() {
        assert!(is_valid_collection("items"));
        assert!(is_valid_collection("_items_2"));
        assert!(!is_valid_collection(""));
        assert!(!is_valid_collection("2items"));
        assert!(!is_valid_collection("items; DROP TABLE x"));
        assert!(!is_valid_collection("Items"));
    }

    #[test]
    fn select_without_predicates_lists_in_insertion_order() {
        assert_eq!(select_sql("items", &Filter::all()), "SELECT doc FROM items ORDER BY seq ASC");
    }

    #[test]
    fn select_numbers_parameters_per_predicate() {
        let sql = select_sql("items", &Filter::all().gt("price", 1.0).lt("price", 2.0));
        assert!(sql.contains(" WHERE (CASE WHEN jsonb_typeof(doc -> $1) = 'number' THEN (doc ->> $1)::float8 END) > $2"));
        assert!(sql.contains(" AND (CASE WHEN jsonb_typeof(doc -> $3) = 'number' THEN (doc ->> $3)::float8 END) < $4"));
        assert!(sql.ends_with(" ORDER BY seq ASC"));
    }
}

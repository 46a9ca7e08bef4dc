//! Postgres-backed document store.
//!
//! All collections share one table, `documents(collection, id, doc JSONB)`.
//! Filters are translated to JSONB operators so the same [`Filter`] values
//! work against both backends.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Anything else | - | `Backend` |
//!
//! ## Conditional writes
//!
//! `compare_and_swap` and `delete_if` add `doc = $current` to the `WHERE`
//! clause. JSONB equality is structural, so a concurrent write that changed
//! any field makes the statement affect zero rows.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use super::{Document, DocumentStore, Filter, StoreError};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT        NOT NULL,
    id          TEXT        NOT NULL,
    doc         JSONB       NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (collection, id)
)
"#;

/// Create the shared `documents` table if it is missing.
#[instrument(skip(pool), err)]
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(CREATE_TABLE)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("migrate", e))?;
    Ok(())
}

/// Document store for one collection on top of a shared connection pool.
pub struct PostgresDocumentStore<D> {
    pool: Arc<PgPool>,
    _doc: PhantomData<fn() -> D>,
}

impl<D> Clone for PostgresDocumentStore<D> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            _doc: PhantomData,
        }
    }
}

impl<D: Document> PostgresDocumentStore<D> {
    pub fn from_shared(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            _doc: PhantomData,
        }
    }
}

fn encode<D: Document>(doc: &D) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(doc).map_err(|e| StoreError::Codec(e.to_string()))
}

fn decode<D: Document>(row: &sqlx::postgres::PgRow) -> Result<D, StoreError> {
    let value: serde_json::Value = row
        .try_get("doc")
        .map_err(|e| StoreError::Codec(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| StoreError::Codec(e.to_string()))
}

/// Escape `%`, `_` and `\` so user input is matched literally by `ILIKE`.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {}
        Filter::Eq { field, value } => {
            qb.push(" AND doc->>")
                .push_bind(*field)
                .push(" = ")
                .push_bind(value.clone());
        }
        Filter::Lt { field, value } => {
            qb.push(" AND (doc->>")
                .push_bind(*field)
                .push(")::float8 < ")
                .push_bind(*value);
        }
        Filter::ContainsAny { fields, needle } => {
            if fields.is_empty() {
                qb.push(" AND FALSE");
                return;
            }
            let pattern = format!("%{}%", escape_like(needle));
            qb.push(" AND (");
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push("doc->>")
                    .push_bind(*field)
                    .push(" ILIKE ")
                    .push_bind(pattern.clone());
            }
            qb.push(")");
        }
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for PostgresDocumentStore<D> {
    #[instrument(skip(self, id), fields(collection = D::COLLECTION, id = %id), err)]
    async fn find(&self, id: &D::Id) -> Result<Option<D>, StoreError> {
        let row = sqlx::query("SELECT doc FROM documents WHERE collection = $1 AND id = $2")
            .bind(D::COLLECTION)
            .bind(id.to_string())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        row.as_ref().map(decode::<D>).transpose()
    }

    #[instrument(skip(self), fields(collection = D::COLLECTION), err)]
    async fn find_all(&self, filter: &Filter) -> Result<Vec<D>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM documents WHERE collection = ");
        qb.push_bind(D::COLLECTION);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at ASC, id ASC");

        let rows = qb
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_all", e))?;

        rows.iter().map(decode::<D>).collect()
    }

    #[instrument(skip(self, doc), fields(collection = D::COLLECTION, id = %doc.id()), err)]
    async fn insert(&self, doc: D) -> Result<D, StoreError> {
        let json = encode(&doc)?;
        sqlx::query("INSERT INTO documents (collection, id, doc) VALUES ($1, $2, $3)")
            .bind(D::COLLECTION)
            .bind(doc.id().to_string())
            .bind(json)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(doc)
    }

    #[instrument(skip(self, doc), fields(collection = D::COLLECTION, id = %doc.id()), err)]
    async fn update(&self, doc: D) -> Result<Option<D>, StoreError> {
        let json = encode(&doc)?;
        let result = sqlx::query(
            "UPDATE documents SET doc = $3, updated_at = NOW() WHERE collection = $1 AND id = $2",
        )
        .bind(D::COLLECTION)
        .bind(doc.id().to_string())
        .bind(json)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        Ok((result.rows_affected() == 1).then_some(doc))
    }

    #[instrument(skip(self, current, next), fields(collection = D::COLLECTION, id = %current.id()), err)]
    async fn compare_and_swap(&self, current: &D, next: D) -> Result<bool, StoreError> {
        if current.id() != next.id() {
            return Err(StoreError::Backend(format!(
                "{}: cannot swap document {} for {}",
                D::COLLECTION,
                current.id(),
                next.id()
            )));
        }
        let expected = encode(current)?;
        let replacement = encode(&next)?;
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET doc = $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2 AND doc = $4
            "#,
        )
        .bind(D::COLLECTION)
        .bind(current.id().to_string())
        .bind(replacement)
        .bind(expected)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("compare_and_swap", e))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, id), fields(collection = D::COLLECTION, id = %id), err)]
    async fn delete(&self, id: &D::Id) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(D::COLLECTION)
            .bind(id.to_string())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, current), fields(collection = D::COLLECTION, id = %current.id()), err)]
    async fn delete_if(&self, current: &D) -> Result<bool, StoreError> {
        let expected = encode(current)?;
        let result = sqlx::query(
            "DELETE FROM documents WHERE collection = $1 AND id = $2 AND doc = $3",
        )
        .bind(D::COLLECTION)
        .bind(current.id().to_string())
        .bind(expected)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_if", e))?;
        Ok(result.rows_affected() == 1)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            StoreError::Duplicate(format!("{operation}: {}", db_err.message()))
        }
        other => StoreError::Backend(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn filters_render_as_jsonb_predicates() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM documents WHERE collection = ");
        qb.push_bind("products");
        push_filter(&mut qb, &Filter::contains_any(&["name", "description"], "shoe"));
        assert_eq!(
            qb.sql(),
            "SELECT doc FROM documents WHERE collection = $1 AND (doc->>$2 ILIKE $3 OR doc->>$4 ILIKE $5)"
        );

        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM documents WHERE collection = ");
        qb.push_bind("products");
        push_filter(&mut qb, &Filter::lt("stockCount", 10.0));
        assert_eq!(
            qb.sql(),
            "SELECT doc FROM documents WHERE collection = $1 AND (doc->>$2)::float8 < $3"
        );
    }
}

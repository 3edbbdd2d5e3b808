// src/db/providers.rs
//
// Read side of the provider document store. Records are JSON documents
// keyed by opaque ID; the CRUD layer owns writes, the pipeline only
// reads (put_provider exists for that layer and for tests).

use rusqlite::{params, OptionalExtension};

use super::connection::Database;
use crate::domain::provider::Provider;
use crate::errors::ServerError;

/// All provider documents, ordered by ID so batch runs are stable.
/// Documents that no longer parse are skipped with a warning rather than
/// failing the whole run.
pub fn list_providers(db: &Database) -> Result<Vec<Provider>, ServerError> {
    let docs: Vec<(String, String)> = db.with_conn(|conn| {
        let mut stmt = conn
            .prepare("SELECT id, doc FROM providers ORDER BY id")
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })?;

    let mut providers = Vec::with_capacity(docs.len());
    for (id, doc) in docs {
        match parse_doc(&id, &doc) {
            Ok(p) => providers.push(p),
            Err(e) => eprintln!("⚠️ Skipping unreadable provider doc {id}: {e}"),
        }
    }
    Ok(providers)
}

pub fn get_provider(db: &Database, id: &str) -> Result<Provider, ServerError> {
    let doc: Option<String> = db.with_conn(|conn| {
        conn.query_row(
            "SELECT doc FROM providers WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| ServerError::DbError(e.to_string()))
    })?;

    match doc {
        Some(doc) => parse_doc(id, &doc),
        None => Err(ServerError::NotFound),
    }
}

/// Upsert a provider document. The write path belongs to the CRUD
/// layer; the pipeline uses this only in tests.
pub fn put_provider(db: &Database, provider: &Provider) -> Result<(), ServerError> {
    let doc = serde_json::to_string(provider)
        .map_err(|e| ServerError::DbError(format!("serialize provider: {e}")))?;

    db.with_conn(|conn| {
        conn.execute(
            r#"
            INSERT INTO providers (id, doc)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET doc = excluded.doc, updated_at = datetime('now')
            "#,
            params![provider.id.as_str(), doc.as_str()],
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;
        Ok(())
    })
}

fn parse_doc(id: &str, doc: &str) -> Result<Provider, ServerError> {
    let mut provider: Provider = serde_json::from_str(doc)
        .map_err(|e| ServerError::DbError(format!("provider doc {id}: {e}")))?;
    // The row key wins over whatever the document body claims.
    provider.id = id.to_string();
    Ok(provider)
}

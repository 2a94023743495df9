// Database queries: CRUD operations for the documents table.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use super::models::{Document, NewDocument};
use crate::keywords::KeywordSet;
use crate::pipeline::ProcessedDocument;

const DOCUMENT_COLUMNS: &str = "id, file_name, file_path, content_type, file_size, title, text,
    keywords, keyword_scores, score_scale, language, created_at, processed_at";

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    let keywords_json: String = row.get(7)?;
    let scores_json: String = row.get(8)?;
    let scale_json: String = row.get(9)?;
    let language: String = row.get(10)?;

    let keyword_set = KeywordSet {
        keywords: serde_json::from_str(&keywords_json).unwrap_or_default(),
        scores: serde_json::from_str(&scores_json).unwrap_or_default(),
        language: Some(language).filter(|l| !l.is_empty()),
        scale: serde_json::from_str(&scale_json).unwrap_or_default(),
    };

    Ok(Document {
        id: row.get(0)?,
        file_name: row.get(1)?,
        file_path: row.get(2)?,
        content_type: row.get(3)?,
        file_size: row.get(4)?,
        title: row.get(5)?,
        text: row.get(6)?,
        keyword_set,
        created_at: row.get(11)?,
        processed_at: row.get(12)?,
    })
}

// --- Documents ---

/// Store a new document record and return its generated id.
pub fn insert_document(conn: &Connection, doc: &NewDocument) -> Result<String> {
    let id = uuid::Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO documents (id, file_name, file_path, content_type, file_size)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, doc.file_name, doc.file_path, doc.content_type, doc.file_size],
    )
    .with_context(|| format!("Failed to insert document {}", doc.file_name))?;
    Ok(id)
}

/// Look up one document by id.
pub fn get_document(conn: &Connection, id: &str) -> Result<Option<Document>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"
    ))?;
    let result = stmt.query_row(params![id], document_from_row).optional()?;
    Ok(result)
}

/// Documents newest first, optionally capped.
pub fn list_documents(conn: &Connection, limit: Option<u32>) -> Result<Vec<Document>> {
    // SQLite treats a negative LIMIT as "no limit"
    let limit = limit.map(i64::from).unwrap_or(-1);
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?1"
    ))?;

    let rows = stmt.query_map(params![limit], document_from_row)?;

    let mut documents = Vec::new();
    for row in rows {
        documents.push(row?);
    }
    Ok(documents)
}

/// Persist one extraction run. Text, language, keywords and scores are
/// replaced together in a single statement.
///
/// Returns false when no document has that id.
pub fn save_extraction(conn: &Connection, id: &str, result: &ProcessedDocument) -> Result<bool> {
    let keywords_json = serde_json::to_string(&result.keywords.keywords)?;
    let scores_json = serde_json::to_string(&result.keywords.scores)?;
    let scale_json = serde_json::to_string(&result.keywords.scale)?;

    let updated = conn.execute(
        "UPDATE documents
         SET text = ?1, language = ?2, keywords = ?3, keyword_scores = ?4,
             score_scale = ?5, processed_at = datetime('now')
         WHERE id = ?6",
        params![
            result.text,
            result.language.as_deref().unwrap_or(""),
            keywords_json,
            scores_json,
            scale_json,
            id,
        ],
    )?;
    Ok(updated > 0)
}

/// Record the title read from a PDF's metadata.
pub fn set_title(conn: &Connection, id: &str, title: &str) -> Result<()> {
    conn.execute(
        "UPDATE documents SET title = ?1 WHERE id = ?2",
        params![title, id],
    )?;
    Ok(())
}

/// Case-insensitive substring search over file name, text and keywords.
pub fn search_documents(conn: &Connection, query: &str) -> Result<Vec<Document>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents
         WHERE instr(lower(file_name), lower(?1)) > 0
            OR instr(lower(text), lower(?1)) > 0
            OR instr(lower(keywords), lower(?1)) > 0
         ORDER BY created_at DESC, rowid DESC"
    ))?;

    let rows = stmt.query_map(params![query], document_from_row)?;

    let mut documents = Vec::new();
    for row in rows {
        documents.push(row?);
    }
    Ok(documents)
}

/// Remove a document row. Returns false if it didn't exist.
pub fn delete_document(conn: &Connection, id: &str) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// Total number of stored documents.
pub fn document_count(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
    Ok(count)
}

/// Document counts per detected language, most common first. Unknown
/// language is reported as "".
pub fn language_breakdown(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT language, COUNT(*) AS n FROM documents
         GROUP BY language
         ORDER BY n DESC, language ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut breakdown = Vec::new();
    for row in rows {
        breakdown.push(row?);
    }
    Ok(breakdown)
}

// rusqlite's optional() helper: converts "no rows" into None
use rusqlite::OptionalExtension;

// Database trait: backend-agnostic async interface for all DB operations.
//
// SqliteDatabase is the only implementor today. Methods are async so the
// pipeline's bulk re-processing can hold an `Arc<dyn Database>` across
// await points while documents are extracted on the blocking pool.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{Document, NewDocument};
use crate::pipeline::ProcessedDocument;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Documents ---

    /// Store a new document record and return its generated id.
    async fn insert_document(&self, doc: &NewDocument) -> Result<String>;

    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// Documents newest first, optionally capped.
    async fn list_documents(&self, limit: Option<u32>) -> Result<Vec<Document>>;

    /// Case-insensitive substring search over file name, text and keywords.
    async fn search_documents(&self, query: &str) -> Result<Vec<Document>>;

    /// Persist one extraction run in a single write. Returns false when the
    /// id is unknown.
    async fn save_extraction(&self, id: &str, result: &ProcessedDocument) -> Result<bool>;

    async fn set_title(&self, id: &str, title: &str) -> Result<()>;

    async fn delete_document(&self, id: &str) -> Result<bool>;

    // --- Status ---

    async fn document_count(&self) -> Result<i64>;

    /// (language, count) pairs, most common first. "" = unknown.
    async fn language_breakdown(&self) -> Result<Vec<(String, i64)>>;
}

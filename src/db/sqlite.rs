// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Send.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.
//
// The free functions in queries.rs stay usable on a bare Connection, which
// is what the query tests exercise.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{Document, NewDocument};
use super::traits::Database;
use crate::pipeline::ProcessedDocument;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn insert_document(&self, doc: &NewDocument) -> Result<String> {
        let conn = self.conn.lock().await;
        super::queries::insert_document(&conn, doc)
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.conn.lock().await;
        super::queries::get_document(&conn, id)
    }

    async fn list_documents(&self, limit: Option<u32>) -> Result<Vec<Document>> {
        let conn = self.conn.lock().await;
        super::queries::list_documents(&conn, limit)
    }

    async fn search_documents(&self, query: &str) -> Result<Vec<Document>> {
        let conn = self.conn.lock().await;
        super::queries::search_documents(&conn, query)
    }

    async fn save_extraction(&self, id: &str, result: &ProcessedDocument) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::save_extraction(&conn, id, result)
    }

    async fn set_title(&self, id: &str, title: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::set_title(&conn, id, title)
    }

    async fn delete_document(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        super::queries::delete_document(&conn, id)
    }

    async fn document_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::document_count(&conn)
    }

    async fn language_breakdown(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.conn.lock().await;
        super::queries::language_breakdown(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;

    async fn test_db() -> SqliteDatabase {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteDatabase::new(conn)
    }

    fn new_doc(name: &str) -> NewDocument {
        NewDocument {
            file_name: name.to_string(),
            file_path: Some(format!("/uploads/{name}")),
            content_type: "text/plain".to_string(),
            file_size: None,
        }
    }

    #[tokio::test]
    async fn test_trait_table_count() {
        let db = test_db().await;
        assert_eq!(db.table_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_trait_document_roundtrip() {
        let db = test_db().await;
        let id = db.insert_document(&new_doc("notes.txt")).await.unwrap();
        let doc = db.get_document(&id).await.unwrap().unwrap();
        assert_eq!(doc.file_name, "notes.txt");
        assert_eq!(doc.file_path.as_deref(), Some("/uploads/notes.txt"));
        assert_eq!(db.document_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_trait_save_and_search() {
        let db = test_db().await;
        let id = db.insert_document(&new_doc("notes.txt")).await.unwrap();
        let result = ProcessedDocument {
            text: "Quarterly revenue grew".to_string(),
            language: Some("en".to_string()),
            ..Default::default()
        };
        assert!(db.save_extraction(&id, &result).await.unwrap());

        let hits = db.search_documents("revenue").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].language(), "en");

        let breakdown = db.language_breakdown().await.unwrap();
        assert_eq!(breakdown, vec![("en".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_trait_list_and_delete() {
        let db = test_db().await;
        let a = db.insert_document(&new_doc("a.txt")).await.unwrap();
        let b = db.insert_document(&new_doc("b.txt")).await.unwrap();
        db.set_title(&b, "Bee").await.unwrap();

        let listed = db.list_documents(None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, b);
        assert_eq!(listed[0].display_name(), "Bee");

        assert!(db.delete_document(&a).await.unwrap());
        assert!(db.get_document(&a).await.unwrap().is_none());
        assert_eq!(db.list_documents(Some(10)).await.unwrap().len(), 1);
    }
}

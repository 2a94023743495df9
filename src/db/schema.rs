// Database schema: table creation and migrations.
//
// We use a simple version-based migration approach: a `schema_version` table
// tracks which migrations have run, and each migration is a function that
// executes SQL statements.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::models::{parse_legacy_frequency, parse_legacy_keywords};
use crate::keywords::ScoreScale;

/// Create all tables if they don't exist yet.
///
/// This is idempotent and safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per uploaded document plus its latest extraction result
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,                       -- UUID v4
            file_name TEXT NOT NULL,
            file_path TEXT,                            -- stored copy; NULL = nothing to re-process
            content_type TEXT NOT NULL DEFAULT '',
            file_size INTEGER,
            text TEXT NOT NULL DEFAULT '',
            keywords TEXT NOT NULL DEFAULT '[]',       -- JSON array, best first
            keyword_scores TEXT NOT NULL DEFAULT '{}', -- JSON object, phrase -> raw score
            language TEXT NOT NULL DEFAULT '',         -- ISO 639-1, '' = unknown
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            processed_at TEXT
        );

        -- Newest-first listing and bulk re-processing
        CREATE INDEX IF NOT EXISTS idx_documents_created
            ON documents(created_at);

        -- Language breakdown in `docsift status`
        CREATE INDEX IF NOT EXISTS idx_documents_language
            ON documents(language);
        ",
    )
    .context("Failed to create database tables")?;

    // Record initial schema version if not already set
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [1],
    )?;

    // Migration v2: record which scale keyword_scores are on. Rows written
    // before this were all produced by the relevance ranker.
    run_migration(conn, 2, |c| {
        c.execute_batch(
            "ALTER TABLE documents ADD COLUMN score_scale TEXT NOT NULL DEFAULT '{\"kind\":\"relevance\"}';",
        )
    })?;

    // Migration v3: rewrite keyword columns stored in older shapes (plain
    // text, list of {word,count,percent} dicts, JSON-encoded strings) into
    // the canonical JSON list + score map.
    run_migration(conn, 3, canonicalize_keyword_columns)?;

    // Migration v4: PDF /Title metadata captured at ingest.
    run_migration(conn, 4, |c| {
        c.execute_batch("ALTER TABLE documents ADD COLUMN title TEXT;")
    })?;

    Ok(())
}

/// Run a migration if it hasn't been applied yet.
/// The migration function receives the connection and should execute its SQL.
fn run_migration<F>(conn: &Connection, version: i64, migrate: F) -> Result<()>
where
    F: FnOnce(&Connection) -> rusqlite::Result<()>,
{
    let already_applied: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM schema_version WHERE version = ?1",
        [version],
        |row| row.get(0),
    )?;

    if !already_applied {
        migrate(conn).with_context(|| format!("Migration v{version} failed"))?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
    }

    Ok(())
}

/// Normalize every row's keyword columns to the canonical shape.
///
/// Phrases are lowercased and deduplicated, first wins. Rows that carry
/// relevance scores keep only the phrases that have one, so every stored
/// keyword keeps exactly one score. Unscored `{word, count}` lists become
/// frequency sets with their counts as scores. Anything else left unscored
/// is dropped; `docsift reprocess` regenerates the full set.
pub(crate) fn canonicalize_keyword_columns(conn: &Connection) -> rusqlite::Result<()> {
    let rows: Vec<(String, String, String, String)> = {
        let mut stmt =
            conn.prepare("SELECT id, keywords, keyword_scores, score_scale FROM documents")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        collected
    };

    for (id, raw_keywords, raw_scores, raw_scale) in rows {
        let legacy_scores: HashMap<String, f64> =
            serde_json::from_str(&raw_scores).unwrap_or_default();

        // Score keys may predate lowercasing too
        let mut scores: HashMap<String, f64> = HashMap::new();
        for (phrase, score) in legacy_scores {
            scores.entry(phrase.trim().to_lowercase()).or_insert(score);
        }

        let (keywords, scale) = match parse_legacy_frequency(&raw_keywords) {
            Some(legacy) if scores.is_empty() => {
                let mut keywords = Vec::with_capacity(legacy.counts.len());
                for (phrase, count) in legacy.counts {
                    scores.insert(phrase.clone(), count);
                    keywords.push(phrase);
                }
                let scale = ScoreScale::Frequency {
                    total_tokens: legacy.total_tokens,
                };
                (keywords, to_json(&scale)?)
            }
            _ => {
                let keywords: Vec<String> = parse_legacy_keywords(&raw_keywords)
                    .into_iter()
                    .filter(|k| scores.contains_key(k))
                    .collect();
                (keywords, raw_scale.clone())
            }
        };
        let kept: HashSet<&String> = keywords.iter().collect();
        scores.retain(|phrase, _| kept.contains(phrase));

        let keywords_json = to_json(&keywords)?;
        let scores_json = to_json(&scores)?;
        if keywords_json != raw_keywords || scores_json != raw_scores || scale != raw_scale {
            conn.execute(
                "UPDATE documents SET keywords = ?1, keyword_scores = ?2, score_scale = ?3
                 WHERE id = ?4",
                params![keywords_json, scores_json, scale, id],
            )?;
        }
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        // Running create_tables twice should not error
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        // schema_version, documents = 2 tables
        assert_eq!(table_count(&conn).unwrap(), 2i64);
    }

    #[test]
    fn test_all_migrations_recorded() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        let max: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(max, 4);
    }

    #[test]
    fn test_score_scale_and_title_columns() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO documents (id, file_name, title) VALUES ('d1', 'a.pdf', 'A Title')",
            [],
        )
        .unwrap();

        let (scale, title): (String, String) = conn
            .query_row(
                "SELECT score_scale, title FROM documents WHERE id = 'd1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(scale, r#"{"kind":"relevance"}"#);
        assert_eq!(title, "A Title");
    }

    #[test]
    fn test_canonicalize_legacy_dict_shape() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO documents (id, file_name, keywords, keyword_scores)
             VALUES ('d1', 'a.pdf', ?1, ?2)",
            params![
                r#"[{"word":"Invoice","count":2,"percent":66.7},{"word":"paid","count":1,"percent":33.3},{"word":"unscored"}]"#,
                r#"{"invoice":0.1,"PAID":0.2}"#,
            ],
        )
        .unwrap();

        canonicalize_keyword_columns(&conn).unwrap();

        let (keywords, scores): (String, String) = conn
            .query_row(
                "SELECT keywords, keyword_scores FROM documents WHERE id = 'd1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        let keywords: Vec<String> = serde_json::from_str(&keywords).unwrap();
        let scores: HashMap<String, f64> = serde_json::from_str(&scores).unwrap();
        assert_eq!(keywords, vec!["invoice", "paid"]);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["invoice"], 0.1);
        assert_eq!(scores["paid"], 0.2);
    }

    #[test]
    fn test_canonicalize_unscored_counts_become_frequency_set() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO documents (id, file_name, keywords) VALUES ('d1', 'a.pdf', ?1)",
            params![
                r#"[{"word":"Invoice","count":2,"percent":50.0},{"word":"paid","count":1,"percent":25.0}]"#
            ],
        )
        .unwrap();

        canonicalize_keyword_columns(&conn).unwrap();

        let (keywords, scores, scale): (String, String, String) = conn
            .query_row(
                "SELECT keywords, keyword_scores, score_scale FROM documents WHERE id = 'd1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        let keywords: Vec<String> = serde_json::from_str(&keywords).unwrap();
        let scores: HashMap<String, f64> = serde_json::from_str(&scores).unwrap();
        let scale: ScoreScale = serde_json::from_str(&scale).unwrap();
        assert_eq!(keywords, vec!["invoice", "paid"]);
        assert_eq!(scores["invoice"], 2.0);
        assert_eq!(scores["paid"], 1.0);
        assert_eq!(scale, ScoreScale::Frequency { total_tokens: 4 });
    }

    #[test]
    fn test_canonicalize_leaves_canonical_rows_alone() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        conn.execute(
            "INSERT INTO documents (id, file_name, keywords, keyword_scores)
             VALUES ('d1', 'a.pdf', '[\"alpha\"]', '{\"alpha\":0.5}')",
            [],
        )
        .unwrap();

        canonicalize_keyword_columns(&conn).unwrap();

        let keywords: String = conn
            .query_row("SELECT keywords FROM documents WHERE id = 'd1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(keywords, r#"["alpha"]"#);
    }
}

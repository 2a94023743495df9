// docsift: document text extraction and keyword ranking.
//
// This is the library root. Each module corresponds to a stage of the
// document-to-keyword pipeline, plus the storage and terminal layers
// the CLI drives it through.

pub mod config;
pub mod db;
pub mod export;
pub mod extract;
pub mod keywords;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod status;

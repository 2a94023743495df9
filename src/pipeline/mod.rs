// Pipeline orchestration.
//
// process.rs runs one document through extract -> detect -> rank; reprocess.rs
// drives that over every stored document and writes the results back.

pub mod process;
pub mod reprocess;

pub use process::{Pipeline, ProcessedDocument};
pub use reprocess::ReprocessSummary;

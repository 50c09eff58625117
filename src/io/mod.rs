//! File export for recorded summaries.

pub mod export;

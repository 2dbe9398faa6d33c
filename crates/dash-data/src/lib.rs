//! Data ingestion layer for the refrigeration-chamber dashboard.
//!
//! Decodes uploaded spreadsheets, cleans them into chart-ready tables and
//! memoizes the result per file contents.

pub mod cache;
pub mod ingest;
pub mod reader;

pub use dash_core as core;

//! Runtime layer of the refrigeration-chamber dashboard.
//!
//! Owns the dashboard session (uploaded files, selections, colors, table
//! cache), assembles the individual and comparison views, and loads
//! spreadsheets from disk.

pub mod loader;
pub mod session;
pub mod views;

pub use dash_core as core;
pub use dash_data as data;

//! Core types for the refrigeration-chamber dashboard.
//!
//! Holds the raw and clean table model, the canonical variable catalog,
//! chart descriptions, time parsing helpers, formatting and CLI settings.
//! Nothing in this crate performs I/O beyond the settings file.

pub mod catalog;
pub mod charts;
pub mod error;
pub mod formatting;
pub mod models;
pub mod palette;
pub mod settings;
pub mod time_utils;

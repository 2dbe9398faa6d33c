//! Terminal UI layer for the refrigeration chamber dashboard.
//!
//! Provides themes, header, notice and picker components, chart rendering,
//! the individual and comparison tabs, and the main application event loop
//! built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod comparison_view;
pub mod components;
pub mod individual_view;
pub mod themes;

pub use dash_runtime as runtime;

//! Reusable line-building widgets.

pub mod header;
pub mod notices;
pub mod picker;

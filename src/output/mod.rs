//! Output formatting module
//!
//! Renders report data and smoke run outcomes for the terminal.

mod formatter;

pub use formatter::{OutputFormat, ReportFormatter};

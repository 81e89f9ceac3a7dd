//! ENEX export document construction.
//!
//! # Responsibility
//! - Render note records into ENEX `note` elements.
//! - Assemble one `en-export` document per batch and serialize it.
//!
//! # Invariants
//! - Note content is embedded as a raw-text (CDATA) node holding a complete
//!   content document, so it is never escaped twice.
//! - Producer identity is derived from the crate version.

pub mod builder;
pub mod content;
pub mod render;
pub mod time;
pub mod title;
pub mod tree;

/// Producer name written on the export root.
pub const APP_NAME: &str = "keepenex: Keep-to-ENEX Converter";
/// Value of every note's `source-application` attribute.
pub const SOURCE_APPLICATION: &str = "Google Keep (Keep-to-ENEX Converter)";

/// Export format version, taken from the crate version.
pub fn format_version() -> &'static str {
    crate::core_version()
}

/// Value of every note's `source` attribute.
pub fn code_name() -> String {
    format!("keep-converter.keepenex-{}", format_version())
}

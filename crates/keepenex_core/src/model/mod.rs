//! Source note model for Keep export records.
//!
//! # Responsibility
//! - Define the immutable record shape read from one export JSON file.
//! - Keep every consumed field explicit; no dynamic lookups downstream.
//!
//! # Invariants
//! - Every record carries the path it was read from (`provenance`).
//! - Records are never mutated after the record source builds them.

pub mod note;

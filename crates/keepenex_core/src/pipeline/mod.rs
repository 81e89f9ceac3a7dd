//! Record stream stages between the source and the document builder.
//!
//! # Responsibility
//! - Select records with composable inclusion/exclusion predicates.
//! - Group the selected stream into bounded, ordered batches.
//!
//! # Invariants
//! - Stream order is preserved through every stage.
//! - Source errors pass through untouched so the driver can abort on them.

pub mod batch;
pub mod filter;

pub use batch::{batched, Batches, DEFAULT_BATCH_SIZE};
pub use filter::{filter_records, FilteredRecords, NoteFilter};

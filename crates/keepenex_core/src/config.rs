//! Conversion options.
//!
//! # Responsibility
//! - Hold every knob the driver needs: record filter, batch size, tags.
//! - Provide the defaults used when the CLI passes nothing.
//!
//! # Invariants
//! - `batch_size` is never zero (enforced by the type).
//! - Universal tag names are non-blank after [`ConvertOptions::validate`].

use crate::enex::render::TagPolicy;
use crate::pipeline::{NoteFilter, DEFAULT_BATCH_SIZE};
use std::num::NonZeroUsize;

/// Options for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub filter: NoteFilter,
    /// Maximum notes per output document.
    pub batch_size: NonZeroUsize,
    pub tags: TagPolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            filter: NoteFilter::default(),
            batch_size: default_batch_size(),
            tags: TagPolicy::default(),
        }
    }
}

impl ConvertOptions {
    /// Checks invariants the types cannot express.
    ///
    /// # Errors
    /// - Returns a message naming the first blank universal tag.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(index) = self
            .tags
            .universal_tags
            .iter()
            .position(|tag| tag.trim().is_empty())
        {
            return Err(format!("universal tag #{} is blank", index + 1));
        }
        Ok(())
    }
}

/// Default batch size as a non-zero value.
pub fn default_batch_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN)
}

//! Duplicate-entity analysis over flattened applications.

pub mod resolver;

pub use resolver::{
    analyze_duplicate_ids, CanonicalReason, DuplicateClass, DuplicateGroupReport,
    RowDuplicateMetadata,
};

//! Raw export ingestion: strict JSON loading and record flattening.

pub mod flatten;
pub mod loader;

pub use flatten::{flatten_applications, flatten_spending_items};
pub use loader::load_raw_records;

//! Rule evaluation over raw and cleaned rows.

pub mod applications;
pub mod matrix;
pub mod scalars;
pub mod spending;

pub use applications::ApplicationValidator;
pub use matrix::FlagMatrix;
pub use spending::{validate_spending_postclean, validate_spending_preclean};

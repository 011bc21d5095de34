pub mod classification;
pub mod constructors;
pub mod types;

// Re-export main types and constructors
pub use constructors::*;
pub use types::{BoxError, Error, Kind, Result};

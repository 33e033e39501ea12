pub mod audit;
pub(crate) mod macros;
pub mod overtime;
pub mod stats;

// Re-export all models for easy importing
pub use audit::*;
pub use overtime::*;
pub use stats::*;

pub mod overtime;
pub mod shared;
pub mod stats;

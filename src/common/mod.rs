// Common module - shared types used across all modules

pub mod field;

// Re-export commonly used types for convenience
pub use field::{FieldError, FieldValue, FormField};

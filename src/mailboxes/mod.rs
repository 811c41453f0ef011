// src/mailboxes/mod.rs

pub mod models;
pub mod pipeline;
pub mod validators;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use models::{EmailProvider, FormServices, MailboxForm};
pub use pipeline::{FieldOutcome, ValidationSession};

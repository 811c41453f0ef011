// src/services/mod.rs
//
// Remote check clients shared by the async validators

pub mod availability;
pub mod password_strength;

// Re-export commonly used types for convenience
pub use availability::{
    AvailabilityCheck, AvailabilityError, MailboxAvailability, TitanAvailabilityService,
    DEFAULT_API_BASE_URL,
};
pub use password_strength::{
    PasswordStrengthCheck, PasswordStrengthError, WpcomPasswordStrengthService,
};

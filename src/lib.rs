// src/lib.rs
//
// Field validation pipeline for email mailbox provisioning forms.
//
// Composable, stateless-per-call validators applied in caller-defined order
// to individual form fields, with two asynchronous remote checks
// (mailbox-name availability, password strength). Rule violations are
// recorded on the field; the form layer reads them to decide whether
// submission is blocked.

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod common;
pub mod mailboxes;
pub mod services;

// ============================================================================
// COMMON RE-EXPORTS
// ============================================================================

pub use common::{FieldError, FieldValue, FormField};
pub use mailboxes::{EmailProvider, FieldOutcome, FormServices, MailboxForm, ValidationSession};
pub use services::{
    AvailabilityCheck, AvailabilityError, MailboxAvailability, PasswordStrengthCheck,
    PasswordStrengthError, TitanAvailabilityService, WpcomPasswordStrengthService,
};

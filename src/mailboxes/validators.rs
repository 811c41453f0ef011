// src/mailboxes/validators.rs

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::warn;

use crate::common::{FieldError, FieldValue, FormField};
use crate::services::{AvailabilityCheck, MailboxAvailability, PasswordStrengthCheck};

use super::models::EmailProvider;

// ============================================================================
// Rule Contract
// ============================================================================

/// One validation rule for one field.
///
/// Rules are pure functions of the field plus whatever comparison data was
/// injected at construction (domain name, known mailbox names, length
/// limits). A rule reports a violation by returning `Err`; it never writes
/// to the field itself - recording the error is the pipeline's job, which is
/// also where the "never clobber an existing error" invariant lives.
#[async_trait]
pub trait FieldRule<T>: Send + Sync {
    async fn check(&self, field: &FormField<T>) -> Result<(), FieldError>;
}

// ============================================================================
// Messages and Limits
// ============================================================================

pub const FIELD_REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_EMAIL_MESSAGE: &str = "Please supply a valid email address.";

/// Shown whenever a remote check could not be completed, replacing any
/// findings accumulated for the field so far. Both async validators use
/// this same transport-failure path.
pub const REMOTE_CHECK_FAILED_MESSAGE: &str =
    "An error occurred while validating. Please try again.";

const PASSWORD_MAXIMUM_LENGTH: usize = 100;

// ============================================================================
// Patterns
// ============================================================================

// Local part of a mailbox address: letters, digits, dashes, underscores,
// with single periods as interior separators (never leading, trailing, or
// doubled).
static MAILBOX_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9a-z_-](\.?[0-9a-z_-])*$").unwrap());

// Same shape with apostrophes admitted, for providers that accept them.
static MAILBOX_NAME_WITH_APOSTROPHES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9a-z_'-](\.?[0-9a-z_'-])*$").unwrap());

// WHATWG email syntax pattern.
static EMAIL_SYNTAX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

/// Syntactic well-formedness of a full email address.
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_SYNTAX_PATTERN.is_match(address)
}

// ============================================================================
// Synchronous Rules
// ============================================================================

/// Rejects blank or missing values on required fields.
pub struct RequiredValidator;

#[async_trait]
impl<T> FieldRule<T> for RequiredValidator
where
    T: FieldValue + Send + Sync,
{
    async fn check(&self, field: &FormField<T>) -> Result<(), FieldError> {
        if !field.is_required {
            return Ok(());
        }
        match &field.value {
            Some(value) if !value.is_blank() => Ok(()),
            _ => Err(FieldError::single(FIELD_REQUIRED_MESSAGE)),
        }
    }
}

/// Required-ness gated on visibility: a hidden field is never required,
/// whatever its `is_required` flag says.
pub struct RequiredIfVisibleValidator;

#[async_trait]
impl FieldRule<String> for RequiredIfVisibleValidator {
    async fn check(&self, field: &FormField<String>) -> Result<(), FieldError> {
        if !field.is_visible {
            return Ok(());
        }
        RequiredValidator.check(field).await
    }
}

pub struct MaximumStringLengthValidator {
    maximum_length: usize,
}

impl MaximumStringLengthValidator {
    pub fn new(maximum_length: usize) -> Self {
        Self { maximum_length }
    }
}

#[async_trait]
impl FieldRule<String> for MaximumStringLengthValidator {
    async fn check(&self, field: &FormField<String>) -> Result<(), FieldError> {
        let length = field.value_str().chars().count();
        if length > self.maximum_length {
            return Err(FieldError::single(format!(
                "This field can't be longer than {} characters.",
                self.maximum_length
            )));
        }
        Ok(())
    }
}

/// Validates the local part of the mailbox address: accepted character set
/// first, then syntactic validity of the composed `value@domain` address.
/// Both checks run and both messages are reported, in that order.
pub struct MailboxNameValidator {
    domain_name: Option<String>,
    domain_field_has_error: bool,
    supports_apostrophes: bool,
}

impl MailboxNameValidator {
    pub fn new(
        domain_name: Option<String>,
        domain_field_has_error: bool,
        supports_apostrophes: bool,
    ) -> Self {
        Self {
            domain_name,
            domain_field_has_error,
            supports_apostrophes,
        }
    }
}

#[async_trait]
impl FieldRule<String> for MailboxNameValidator {
    async fn check(&self, field: &FormField<String>) -> Result<(), FieldError> {
        let value = field.value_str();
        let mut messages = Vec::new();

        let pattern = if self.supports_apostrophes {
            &MAILBOX_NAME_WITH_APOSTROPHES_PATTERN
        } else {
            &MAILBOX_NAME_PATTERN
        };
        if !pattern.is_match(value) {
            messages.push(if self.supports_apostrophes {
                "Only numbers, letters, dashes, underscores, apostrophes, and periods are allowed."
                    .to_string()
            } else {
                "Only numbers, letters, dashes, underscores, and periods are allowed.".to_string()
            });
        }

        // Skip the composed-address check when the domain field carries its
        // own error, so an unrelated domain problem isn't double-reported here.
        if let Some(domain_name) = &self.domain_name {
            if !self.domain_field_has_error
                && !is_valid_email(&format!("{}@{}", value, domain_name))
            {
                messages.push(INVALID_EMAIL_MESSAGE.to_string());
            }
        }

        match FieldError::from_messages(messages) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Validates the alternate recovery email address. The field is optional, so
/// a blank value passes; a present value must be a well-formed address on a
/// domain other than the mailbox's own.
pub struct PasswordResetEmailValidator {
    mailbox_domain: String,
}

impl PasswordResetEmailValidator {
    pub fn new(mailbox_domain: impl Into<String>) -> Self {
        Self {
            mailbox_domain: mailbox_domain.into(),
        }
    }
}

#[async_trait]
impl FieldRule<String> for PasswordResetEmailValidator {
    async fn check(&self, field: &FormField<String>) -> Result<(), FieldError> {
        let value = field.value_str().trim();
        if value.is_empty() {
            return Ok(());
        }

        let mut messages = Vec::new();

        if !is_valid_email(value) {
            messages.push(INVALID_EMAIL_MESSAGE.to_string());
        }

        if let Some((_, domain)) = value.rsplit_once('@') {
            if domain.eq_ignore_ascii_case(&self.mailbox_domain) {
                messages.push(format!(
                    "This email address must have a different domain than {}. Please use a different email address.",
                    self.mailbox_domain
                ));
            }
        }

        match FieldError::from_messages(messages) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Password Rule
// ============================================================================

/// Password acceptability: every local rule is evaluated unconditionally and
/// every violation is appended in rule order, then the remote strength
/// service's verdict is appended after the local findings. A transport
/// failure on the remote check replaces the accumulated list with the single
/// generic retry message.
pub struct PasswordValidator {
    minimum_length: usize,
    domain_name: String,
    mailbox_name: Option<String>,
    strength_service: Arc<dyn PasswordStrengthCheck>,
}

impl PasswordValidator {
    pub fn new(
        minimum_length: usize,
        domain_name: impl Into<String>,
        mailbox_name: Option<String>,
        strength_service: Arc<dyn PasswordStrengthCheck>,
    ) -> Self {
        Self {
            minimum_length,
            domain_name: domain_name.into(),
            mailbox_name,
            strength_service,
        }
    }
}

#[async_trait]
impl FieldRule<String> for PasswordValidator {
    async fn check(&self, field: &FormField<String>) -> Result<(), FieldError> {
        let value = field.value_str();
        let mut messages = Vec::new();

        let length = value.chars().count();
        if length < self.minimum_length {
            messages.push(format!(
                "Your password must be at least {} characters long.",
                self.minimum_length
            ));
        }
        if length > PASSWORD_MAXIMUM_LENGTH {
            messages.push(format!(
                "Your password can't be longer than {} characters.",
                PASSWORD_MAXIMUM_LENGTH
            ));
        }
        if value.starts_with(' ') {
            messages.push("Your password can't start with a white space.".to_string());
        }
        // Only printable ASCII (0x20-0x7E) is accepted; name the first
        // offending character found.
        if let Some(offender) = value.chars().find(|c| {
            let code = *c as u32;
            !(0x20..=0x7e).contains(&code)
        }) {
            messages.push(format!(
                "Your password can't accept '{}' as a character.",
                offender
            ));
        }
        if value.ends_with(' ') {
            messages.push("Your password can't end with a white space.".to_string());
        }

        let domain_label = self
            .domain_name
            .split('.')
            .next()
            .unwrap_or(&self.domain_name);
        if !domain_label.is_empty()
            && value.to_lowercase().contains(&domain_label.to_lowercase())
        {
            messages.push(format!(
                "Your password can't contain your domain name ({}).",
                domain_label
            ));
        }

        if let Some(mailbox_name) = &self.mailbox_name {
            if !mailbox_name.is_empty()
                && value.to_lowercase().contains(&mailbox_name.to_lowercase())
            {
                messages.push(format!(
                    "Your password can't contain your email address name ({}).",
                    mailbox_name
                ));
            }
        }

        match self.strength_service.assess(value).await {
            Ok(violations) => messages.extend(violations),
            Err(e) => {
                warn!(error = %e, "Password strength check could not be completed");
                return Err(FieldError::single(REMOTE_CHECK_FAILED_MESSAGE));
            }
        }

        match FieldError::from_messages(messages) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Duplicate-Name Rules
// ============================================================================

/// Which message template a duplicate match renders. The comparison logic is
/// identical for both; only the wording differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateMailboxMessage {
    /// The name is already a mailbox in the user's account.
    ExistingAccount,
    /// The name was already entered earlier in the same form.
    PreviouslySpecified,
}

impl DuplicateMailboxMessage {
    fn render(&self, email_address: &str) -> String {
        match self {
            DuplicateMailboxMessage::ExistingAccount => {
                format!("{} already exists in your account.", email_address)
            }
            DuplicateMailboxMessage::PreviouslySpecified => {
                format!("{} has already been specified.", email_address)
            }
        }
    }
}

/// Case-insensitive comparison of the trimmed value against a collection of
/// known mailbox local names on the same domain.
pub struct DuplicateMailboxNamesValidator {
    domain_name: String,
    known_names: Vec<String>,
    message: DuplicateMailboxMessage,
}

impl DuplicateMailboxNamesValidator {
    /// Rejects names that already exist as mailboxes in the account.
    pub fn against_existing_account(
        domain_name: impl Into<String>,
        known_names: Vec<String>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            known_names,
            message: DuplicateMailboxMessage::ExistingAccount,
        }
    }

    /// Rejects names already entered earlier in the same form session.
    pub fn against_previous_entries(
        domain_name: impl Into<String>,
        known_names: Vec<String>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            known_names,
            message: DuplicateMailboxMessage::PreviouslySpecified,
        }
    }
}

#[async_trait]
impl FieldRule<String> for DuplicateMailboxNamesValidator {
    async fn check(&self, field: &FormField<String>) -> Result<(), FieldError> {
        let value = field.value_str().trim();
        if value.is_empty() {
            return Ok(());
        }

        // Report the address with the known name's casing, not whatever
        // casing the user happened to type.
        if let Some(matched) = self
            .known_names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(value))
        {
            let email_address = format!("{}@{}", matched, self.domain_name);
            return Err(FieldError::single(self.message.render(&email_address)));
        }
        Ok(())
    }
}

// ============================================================================
// Availability Rule
// ============================================================================

/// Remote mailbox-name availability check. Providers without a server-side
/// check (Google) never issue a request at all; for the rest, a non-success
/// answer from the service becomes an "is not available" error carrying the
/// service's own message, and a transport failure becomes the generic retry
/// message.
pub struct MailboxNameAvailabilityValidator {
    domain_name: String,
    provider: EmailProvider,
    availability_service: Arc<dyn AvailabilityCheck>,
}

impl MailboxNameAvailabilityValidator {
    pub fn new(
        domain_name: impl Into<String>,
        provider: EmailProvider,
        availability_service: Arc<dyn AvailabilityCheck>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            provider,
            availability_service,
        }
    }
}

#[async_trait]
impl FieldRule<String> for MailboxNameAvailabilityValidator {
    async fn check(&self, field: &FormField<String>) -> Result<(), FieldError> {
        if !self.provider.has_availability_check() {
            return Ok(());
        }

        let value = field.value_str().trim();
        if value.is_empty() {
            return Ok(());
        }

        match self
            .availability_service
            .check_mailbox(&self.domain_name, value)
            .await
        {
            Ok(MailboxAvailability::Available) => Ok(()),
            Ok(MailboxAvailability::Unavailable { status, message }) => {
                warn!(status, "Mailbox name rejected by availability service");
                Err(FieldError::single(format!(
                    "{}@{} is not available: {}",
                    value, self.domain_name, message
                )))
            }
            Err(e) => {
                warn!(error = %e, "Mailbox availability check could not be completed");
                Err(FieldError::single(REMOTE_CHECK_FAILED_MESSAGE))
            }
        }
    }
}

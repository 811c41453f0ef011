// src/mailboxes/models.rs

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::common::FormField;
use crate::services::{
    AvailabilityCheck, PasswordStrengthCheck, TitanAvailabilityService,
    WpcomPasswordStrengthService,
};

use super::pipeline::ValidationSession;
use super::validators::{
    DuplicateMailboxNamesValidator, FieldRule, MailboxNameAvailabilityValidator,
    MailboxNameValidator, MaximumStringLengthValidator, PasswordResetEmailValidator,
    PasswordValidator, RequiredIfVisibleValidator, RequiredValidator,
};

// ============================================================================
// Field Names
// ============================================================================

pub const FIELD_DOMAIN: &str = "domain";
pub const FIELD_MAILBOX_NAME: &str = "mailbox";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_PASSWORD_RESET_EMAIL: &str = "password_reset_email";

/// RFC 5321 local-part limit.
pub const MAILBOX_NAME_MAXIMUM_LENGTH: usize = 64;

// ============================================================================
// Providers
// ============================================================================

/// The email provider a mailbox is being provisioned on. Providers differ in
/// which characters they accept, their password policy, and whether a
/// server-side name-availability check exists at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailProvider {
    Titan,
    Google,
}

impl EmailProvider {
    /// Google provisioning has no server-side mailbox-name check; the
    /// availability validator is a no-op for it.
    pub fn has_availability_check(&self) -> bool {
        matches!(self, EmailProvider::Titan)
    }

    pub fn supports_apostrophes(&self) -> bool {
        matches!(self, EmailProvider::Google)
    }

    pub fn minimum_password_length(&self) -> usize {
        match self {
            EmailProvider::Titan => 10,
            EmailProvider::Google => 12,
        }
    }
}

// ============================================================================
// Services
// ============================================================================

/// The remote checks a form needs, behind traits so tests can substitute
/// fakes for the HTTP clients.
#[derive(Clone)]
pub struct FormServices {
    pub availability: Arc<dyn AvailabilityCheck>,
    pub password_strength: Arc<dyn PasswordStrengthCheck>,
}

impl FormServices {
    /// Production wiring: both checks against the configured API base.
    pub fn from_env(client: Client) -> Self {
        Self {
            availability: Arc::new(TitanAvailabilityService::from_env(client.clone())),
            password_strength: Arc::new(WpcomPasswordStrengthService::from_env(client)),
        }
    }
}

// ============================================================================
// Mailbox Form
// ============================================================================

/// One mailbox's worth of form fields plus the comparison data the
/// validators need: the names already provisioned in the account and the
/// names entered earlier in the same multi-mailbox form.
///
/// The form owns the canonical rule ordering per field; `validate` runs all
/// fields through a session. Fields are created fresh per form session and
/// nothing persists beyond it.
#[derive(Clone)]
pub struct MailboxForm {
    pub provider: EmailProvider,
    pub domain: FormField<String>,
    pub mailbox_name: FormField<String>,
    pub password: FormField<String>,
    pub password_reset_email: FormField<String>,
    pub existing_mailbox_names: Vec<String>,
    pub previously_specified_names: Vec<String>,
}

impl MailboxForm {
    pub fn new(provider: EmailProvider, domain_name: impl Into<String>) -> Self {
        Self {
            provider,
            domain: FormField::text(FIELD_DOMAIN, domain_name.into()),
            mailbox_name: FormField::text(FIELD_MAILBOX_NAME, ""),
            password: FormField::text(FIELD_PASSWORD, ""),
            password_reset_email: FormField::text(FIELD_PASSWORD_RESET_EMAIL, "").optional(),
            existing_mailbox_names: Vec::new(),
            previously_specified_names: Vec::new(),
        }
    }

    pub fn domain_name(&self) -> &str {
        self.domain.value_str()
    }

    /// Ordered rules for the mailbox-name field. Cheap local rules first,
    /// the remote availability check last so it only runs on names that
    /// passed everything else.
    pub fn mailbox_name_rules(&self, services: &FormServices) -> Vec<Arc<dyn FieldRule<String>>> {
        let domain_name = self.domain_name().to_string();
        vec![
            Arc::new(RequiredValidator),
            Arc::new(MaximumStringLengthValidator::new(MAILBOX_NAME_MAXIMUM_LENGTH)),
            Arc::new(MailboxNameValidator::new(
                Some(domain_name.clone()),
                self.domain.has_error(),
                self.provider.supports_apostrophes(),
            )),
            Arc::new(DuplicateMailboxNamesValidator::against_existing_account(
                domain_name.clone(),
                self.existing_mailbox_names.clone(),
            )),
            Arc::new(DuplicateMailboxNamesValidator::against_previous_entries(
                domain_name.clone(),
                self.previously_specified_names.clone(),
            )),
            Arc::new(MailboxNameAvailabilityValidator::new(
                domain_name,
                self.provider,
                services.availability.clone(),
            )),
        ]
    }

    /// Ordered rules for the password field.
    pub fn password_rules(&self, services: &FormServices) -> Vec<Arc<dyn FieldRule<String>>> {
        let mailbox_name = self.mailbox_name.value_str().trim();
        vec![
            Arc::new(RequiredValidator),
            Arc::new(PasswordValidator::new(
                self.provider.minimum_password_length(),
                self.domain_name(),
                (!mailbox_name.is_empty()).then(|| mailbox_name.to_string()),
                services.password_strength.clone(),
            )),
        ]
    }

    /// Ordered rules for the alternate recovery email field.
    pub fn password_reset_email_rules(&self) -> Vec<Arc<dyn FieldRule<String>>> {
        vec![
            Arc::new(RequiredIfVisibleValidator),
            Arc::new(PasswordResetEmailValidator::new(self.domain_name())),
        ]
    }

    /// Validate every field of the form through `session`. Returns whether
    /// the form is submittable.
    pub async fn validate(&mut self, session: &ValidationSession, services: &FormServices) -> bool {
        self.mailbox_name.clear_error();
        self.password.clear_error();
        self.password_reset_email.clear_error();

        let mailbox_name_rules = self.mailbox_name_rules(services);
        let password_rules = self.password_rules(services);
        let password_reset_email_rules = self.password_reset_email_rules();

        session
            .run_field(&mut self.mailbox_name, &mailbox_name_rules)
            .await;
        session.run_field(&mut self.password, &password_rules).await;
        session
            .run_field(&mut self.password_reset_email, &password_reset_email_rules)
            .await;

        self.is_valid()
    }

    pub fn is_valid(&self) -> bool {
        !self.domain.has_error()
            && !self.mailbox_name.has_error()
            && !self.password.has_error()
            && !self.password_reset_email.has_error()
    }
}

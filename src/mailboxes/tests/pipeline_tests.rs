// src/mailboxes/tests/pipeline_tests.rs

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::super::fakes::*;
    use crate::common::{FieldError, FormField};
    use crate::mailboxes::models::{EmailProvider, FormServices, MailboxForm};
    use crate::mailboxes::pipeline::{FieldOutcome, ValidationSession};
    use crate::mailboxes::validators::{
        FieldRule, RequiredValidator, FIELD_REQUIRED_MESSAGE,
    };

    /// Rule that counts how often it ran, with a fixed verdict.
    struct CountingRule {
        calls: AtomicUsize,
        error: Option<&'static str>,
    }

    impl CountingRule {
        fn passing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                error: None,
            }
        }

        fn failing(message: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                error: Some(message),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FieldRule<String> for CountingRule {
        async fn check(&self, _field: &FormField<String>) -> Result<(), FieldError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.error {
                Some(message) => Err(FieldError::single(message)),
                None => Ok(()),
            }
        }
    }

    /// Rule that invalidates the session mid-check, simulating a user edit
    /// arriving while a remote check is in flight.
    struct InvalidatingRule {
        session: Arc<ValidationSession>,
    }

    #[async_trait]
    impl FieldRule<String> for InvalidatingRule {
        async fn check(&self, _field: &FormField<String>) -> Result<(), FieldError> {
            self.session.invalidate();
            Err(FieldError::single("stale finding"))
        }
    }

    fn form_services(availability: Arc<FakeAvailabilityService>) -> FormServices {
        FormServices {
            availability,
            password_strength: Arc::new(ScriptedStrengthService),
        }
    }

    // ------------------------------------------------------------------
    // run_field
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_rules_after_a_failure_do_not_run() {
        let session = ValidationSession::new();
        let mut field = FormField::text("mailbox", "");
        let trailing = Arc::new(CountingRule::passing());

        let rules: Vec<Arc<dyn FieldRule<String>>> =
            vec![Arc::new(RequiredValidator), trailing.clone()];
        let outcome = session.run_field(&mut field, &rules).await;

        assert_eq!(outcome, FieldOutcome::Completed);
        assert_eq!(field.error, Some(FieldError::single(FIELD_REQUIRED_MESSAGE)));
        assert_eq!(trailing.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rerunning_an_errored_field_changes_nothing() {
        let session = ValidationSession::new();
        let mut field = FormField::text("mailbox", "jane");
        let rule = Arc::new(CountingRule::failing("first finding"));
        let rules: Vec<Arc<dyn FieldRule<String>>> = vec![rule.clone()];

        session.run_field(&mut field, &rules).await;
        let first_error = field.error.clone();

        session.run_field(&mut field, &rules).await;

        assert_eq!(field.error, first_error);
        assert_eq!(rule.call_count(), 1, "errored field must not be re-checked");
    }

    #[tokio::test]
    async fn test_stale_results_are_discarded() {
        let session = Arc::new(ValidationSession::new());
        let mut field = FormField::text("mailbox", "jane");
        let rules: Vec<Arc<dyn FieldRule<String>>> = vec![Arc::new(InvalidatingRule {
            session: session.clone(),
        })];

        let outcome = session.run_field(&mut field, &rules).await;

        assert_eq!(outcome, FieldOutcome::Superseded);
        assert!(!field.has_error(), "stale finding must not land on the field");
    }

    #[tokio::test]
    async fn test_invalidate_bumps_generation() {
        let session = ValidationSession::new();
        assert_eq!(session.generation(), 0);
        assert_eq!(session.invalidate(), 1);
        assert_eq!(session.generation(), 1);
    }

    // ------------------------------------------------------------------
    // MailboxForm
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_well_formed_titan_form_is_valid() {
        let availability = Arc::new(FakeAvailabilityService::new(AvailabilityBehavior::Available));
        let services = form_services(availability.clone());
        let session = ValidationSession::new();

        let mut form = MailboxForm::new(EmailProvider::Titan, "example.com");
        form.mailbox_name.value = Some("jane.doe".to_string());
        form.password.value = Some("fluffy-pancake-42".to_string());
        form.password_reset_email.value = Some("jane@other.org".to_string());

        assert!(form.validate(&session, &services).await);
        assert_eq!(availability.call_count(), 1);
    }

    #[tokio::test]
    async fn test_taken_name_blocks_submission() {
        let availability = Arc::new(FakeAvailabilityService::new(
            AvailabilityBehavior::Unavailable {
                status: 409,
                message: "taken",
            },
        ));
        let services = form_services(availability);
        let session = ValidationSession::new();

        let mut form = MailboxForm::new(EmailProvider::Titan, "example.com");
        form.mailbox_name.value = Some("jane".to_string());
        form.password.value = Some("fluffy-pancake-42".to_string());

        assert!(!form.validate(&session, &services).await);
        assert_eq!(
            form.mailbox_name.error,
            Some(FieldError::single(
                "jane@example.com is not available: taken"
            ))
        );
        assert!(!form.password.has_error());
    }

    #[tokio::test]
    async fn test_google_form_never_queries_availability() {
        let availability = Arc::new(FakeAvailabilityService::new(AvailabilityBehavior::Fail));
        let services = form_services(availability.clone());
        let session = ValidationSession::new();

        let mut form = MailboxForm::new(EmailProvider::Google, "example.com");
        form.mailbox_name.value = Some("o'brien".to_string());
        form.password.value = Some("fluffy-pancake-4242".to_string());

        assert!(form.validate(&session, &services).await);
        assert_eq!(availability.call_count(), 0);
    }

    #[tokio::test]
    async fn test_existing_names_checked_before_availability() {
        let availability = Arc::new(FakeAvailabilityService::new(AvailabilityBehavior::Available));
        let services = form_services(availability.clone());
        let session = ValidationSession::new();

        let mut form = MailboxForm::new(EmailProvider::Titan, "example.com");
        form.existing_mailbox_names = vec!["jane".to_string()];
        form.mailbox_name.value = Some("JANE".to_string());
        form.password.value = Some("fluffy-pancake-42".to_string());

        assert!(!form.validate(&session, &services).await);
        assert_eq!(
            form.mailbox_name.error,
            Some(FieldError::single(
                "jane@example.com already exists in your account."
            ))
        );
        assert_eq!(
            availability.call_count(),
            0,
            "a name already in error must not be queried"
        );
    }

    #[tokio::test]
    async fn test_revalidation_clears_previous_errors() {
        let availability = Arc::new(FakeAvailabilityService::new(AvailabilityBehavior::Available));
        let services = form_services(availability);
        let session = ValidationSession::new();

        let mut form = MailboxForm::new(EmailProvider::Titan, "example.com");
        form.password.value = Some("fluffy-pancake-42".to_string());

        // First pass: blank mailbox name fails the required check
        assert!(!form.validate(&session, &services).await);
        assert!(form.mailbox_name.has_error());

        // After an edit, validation starts clean and passes
        session.invalidate();
        form.mailbox_name.value = Some("jane".to_string());
        assert!(form.validate(&session, &services).await);
        assert!(!form.mailbox_name.has_error());
    }

    #[tokio::test]
    async fn test_password_transport_failure_blocks_submission_with_one_message() {
        let availability = Arc::new(FakeAvailabilityService::new(AvailabilityBehavior::Available));
        let services = form_services(availability);
        let session = ValidationSession::new();

        let mut form = MailboxForm::new(EmailProvider::Titan, "example.com");
        form.mailbox_name.value = Some("jane".to_string());
        form.password.value = Some("testerror".to_string());

        assert!(!form.validate(&session, &services).await);
        assert_eq!(form.password.error_messages().len(), 1);
    }
}

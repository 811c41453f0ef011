// src/mailboxes/pipeline.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::common::FormField;

use super::validators::FieldRule;

/// How a pipeline run for one field ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Every applicable rule ran; the field's error reflects the result.
    Completed,
    /// The session was invalidated while an async rule was in flight. The
    /// late result was discarded and the field was left untouched from that
    /// point on.
    Superseded,
}

/// Runs ordered rule sequences against form fields.
///
/// The session owns two invariants the individual rules rely on:
///
/// - a rule never runs against a field that already carries an error, so
///   lower-priority rules can't clobber or pile onto an earlier finding;
/// - a result that resolves after the session was invalidated (the user
///   edited the form while a remote check was in flight) is discarded
///   rather than applied over newer state.
///
/// Fields are independent: sequences for different fields may run
/// concurrently against the same session.
pub struct ValidationSession {
    generation: AtomicU64,
}

impl ValidationSession {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Mark every in-flight validation stale. Call on any form edit.
    pub fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run `rules` in order against `field`, stopping at the first rule that
    /// leaves the field in error.
    pub async fn run_field<T>(
        &self,
        field: &mut FormField<T>,
        rules: &[Arc<dyn FieldRule<T>>],
    ) -> FieldOutcome
    where
        T: Send + Sync,
    {
        let snapshot = self.generation();

        for rule in rules {
            if field.has_error() {
                break;
            }

            let result = rule.check(field).await;

            if self.generation() != snapshot {
                debug!(field = %field.name, "Discarding stale validation result");
                return FieldOutcome::Superseded;
            }

            if let Err(error) = result {
                field.set_error(error);
            }
        }

        FieldOutcome::Completed
    }
}

impl Default for ValidationSession {
    fn default() -> Self {
        Self::new()
    }
}

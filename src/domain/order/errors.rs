use chrono::NaiveDate;

use super::aggregate::Step;
use super::validation::ValidationErrors;
use super::value_objects::{OrderKind, ShippingMethod};
use crate::gateway::SubmissionError;

// ============================================================================
// Wizard Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("File rejected: {0}")]
    FileRejected(String),

    #[error("Pickup is not available for this address")]
    PickupUnavailable,

    #[error("Pickup date {0} is outside the offered window")]
    PickupDateUnavailable(NaiveDate),

    #[error("Collection method {method} does not apply to {kind} orders")]
    MethodNotAllowed {
        kind: OrderKind,
        method: ShippingMethod,
    },

    #[error("No step after {0:?}")]
    NoNextStep(Step),

    #[error("Orders can only be placed from the review step (currently {0:?})")]
    NotOnReviewStep(Step),

    #[error("A submission is already in flight")]
    SubmissionInProgress,

    #[error("Order already placed; start a new order to make changes")]
    Completed,

    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),
}

impl WizardError {
    /// Field errors to show inline, if this is a validation-type failure
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            WizardError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

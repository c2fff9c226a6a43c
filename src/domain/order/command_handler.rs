use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::domain::aggregate::Aggregate;
use crate::gateway::{SubmissionError, SubmissionGateway};
use crate::metrics::Metrics;

use super::aggregate::{OrderWizard, Step};
use super::commands::WizardCommand;
use super::errors::WizardError;
use super::events::WizardEvent;
use super::preview::{InMemoryPreviews, PreviewAllocator};
use super::review::{project, ReviewSummary};
use super::validation::{fields, Section, ValidationErrors};
use super::value_objects::{OrderConfirmation, OrderDraft, PhotoFile};

// ============================================================================
// Wizard Controller
// ============================================================================
//
// Orchestrates: Command -> OrderWizard -> Events, plus everything around
// them that is not a pure state change: visible field errors, photo preview
// handles, metrics and the asynchronous order submission.
//
// ============================================================================

pub struct WizardController {
    wizard: OrderWizard,
    gateway: SubmissionGateway,
    previews: Arc<dyn PreviewAllocator>,
    metrics: Option<Arc<Metrics>>,
}

impl WizardController {
    pub fn new(wizard: OrderWizard, gateway: SubmissionGateway) -> Self {
        Self {
            wizard,
            gateway,
            previews: Arc::new(InMemoryPreviews::new()),
            metrics: None,
        }
    }

    pub fn with_previews(mut self, previews: Arc<dyn PreviewAllocator>) -> Self {
        self.previews = previews;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> &OrderWizard {
        &self.wizard
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.wizard.draft
    }

    pub fn step(&self) -> Step {
        self.wizard.step
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.wizard.errors
    }

    pub fn result(&self) -> Option<&OrderConfirmation> {
        self.wizard.result.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.wizard.submitting
    }

    pub fn review(&self) -> ReviewSummary {
        project(&self.wizard.draft)
    }

    pub fn pickup_eligible(&self) -> bool {
        self.wizard.pickup_eligible()
    }

    pub fn pickup_dates(&self) -> Vec<NaiveDate> {
        self.wizard.pickup_dates()
    }

    /// Run a command against the wizard
    pub fn dispatch(&mut self, command: WizardCommand) -> Result<Vec<WizardEvent>, WizardError> {
        let events = match self.wizard.handle_command(&command) {
            Ok(events) => events,
            Err(err) => {
                self.record_rejection(&command, &err);
                return Err(err);
            }
        };

        for event in &events {
            self.wizard.apply_event(event);
            self.after_event(event);
        }

        if command.mutates_draft() {
            self.revalidate();
        }

        Ok(events)
    }

    /// Validate the current step and move forward
    pub fn go_next(&mut self) -> Result<Step, WizardError> {
        self.dispatch(WizardCommand::Next)?;
        Ok(self.wizard.step)
    }

    pub fn go_prev(&mut self) -> Result<Step, WizardError> {
        self.dispatch(WizardCommand::Back)?;
        Ok(self.wizard.step)
    }

    /// Validate the whole draft, send it to the order service and store the
    /// confirmation. A failure leaves the wizard on the review step with a
    /// retryable failure recorded. Dropping the future mid-call counts as a
    /// failure too.
    pub async fn submit(&mut self) -> Result<OrderConfirmation, WizardError> {
        let draft = self.begin_submit()?;
        let gateway = self.gateway.clone();
        let mut in_flight = InFlight {
            controller: self,
            started: Instant::now(),
            settled: false,
        };
        let outcome = gateway.submit(&draft).await;
        in_flight.settle(outcome)
    }

    /// First half of `submit`: checks and marks the wizard as submitting.
    /// Returns the snapshot to send.
    pub fn begin_submit(&mut self) -> Result<OrderDraft, WizardError> {
        let events = match self.wizard.begin_submission() {
            Ok(events) => events,
            Err(err) => {
                if let WizardError::Validation(errors) = &err {
                    self.record_validation_failures(errors);
                    self.show_errors(errors.clone());
                }
                tracing::warn!(
                    session_id = %self.wizard.session_id,
                    error = %err,
                    "Submission blocked"
                );
                return Err(err);
            }
        };

        for event in &events {
            self.wizard.apply_event(event);
        }

        tracing::info!(
            session_id = %self.wizard.session_id,
            kind = %self.wizard.draft.kind,
            "Submitting order"
        );

        Ok(self.wizard.draft.clone())
    }

    /// Second half of `submit`: records the order service's answer
    pub fn finish_submit(
        &mut self,
        outcome: Result<OrderConfirmation, SubmissionError>,
        elapsed: Duration,
    ) -> Result<OrderConfirmation, WizardError> {
        let kind = self.wizard.draft.kind.as_str();

        match outcome {
            Ok(confirmation) => {
                self.wizard
                    .apply_event(&WizardEvent::SubmissionSucceeded(confirmation.clone()));
                if let Some(metrics) = &self.metrics {
                    metrics.record_submission(kind, "success", elapsed.as_secs_f64());
                }
                tracing::info!(
                    session_id = %self.wizard.session_id,
                    order_id = %confirmation.order_id,
                    elapsed_ms = elapsed.as_millis(),
                    "Order placed"
                );
                Ok(confirmation)
            }
            Err(err) => {
                self.wizard.apply_event(&WizardEvent::SubmissionFailed {
                    reason: err.to_string(),
                });
                if let Some(metrics) = &self.metrics {
                    let outcome = match err {
                        SubmissionError::TimedOut(_) => "timed_out",
                        SubmissionError::Rejected => "rejected",
                        _ => "failed",
                    };
                    metrics.record_submission(kind, outcome, elapsed.as_secs_f64());
                }
                tracing::error!(
                    session_id = %self.wizard.session_id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "Order submission failed"
                );
                Err(WizardError::Submission(err))
            }
        }
    }

    /// Release a submission whose caller went away before the answer came back
    fn abandon_submit(&mut self, elapsed: Duration) {
        if !self.wizard.submitting {
            return;
        }
        self.wizard.apply_event(&WizardEvent::SubmissionFailed {
            reason: "Submission cancelled".to_string(),
        });
        if let Some(metrics) = &self.metrics {
            metrics.record_submission(self.wizard.draft.kind.as_str(), "cancelled", elapsed.as_secs_f64());
        }
        tracing::warn!(
            session_id = %self.wizard.session_id,
            elapsed_ms = elapsed.as_millis(),
            "Order submission cancelled"
        );
    }

    fn after_event(&mut self, event: &WizardEvent) {
        match event {
            WizardEvent::StepChanged { from, to } => {
                self.wizard.errors = ValidationErrors::new();
                if let Some(metrics) = &self.metrics {
                    metrics.record_step_transition(step_label(*from), step_label(*to));
                }
                tracing::debug!(
                    session_id = %self.wizard.session_id,
                    from = ?from,
                    to = ?to,
                    "Wizard step changed"
                );
            }
            WizardEvent::PhotoAttached(file) => {
                self.replace_preview(Some(file.clone()));
            }
            WizardEvent::PhotoRemoved => {
                self.replace_preview(None);
            }
            _ => {}
        }
    }

    fn replace_preview(&mut self, file: Option<PhotoFile>) {
        if let Some(old) = self.wizard.draft.photo.preview_url.take() {
            self.previews.revoke(&old);
        }
        self.wizard.draft.photo.preview_url = file.map(|f| self.previews.allocate(&f));
    }

    fn record_rejection(&mut self, command: &WizardCommand, err: &WizardError) {
        match err {
            WizardError::Validation(errors) => {
                self.record_validation_failures(errors);
                self.show_errors(errors.clone());
            }
            WizardError::FileRejected(reason) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_photo_rejection();
                }
                self.wizard.errors.clear_sections(&[Section::Photo]);
                self.wizard.errors.add(fields::PHOTO_FILE, reason.clone());
            }
            _ => {}
        }

        tracing::warn!(
            session_id = %self.wizard.session_id,
            command = command.name(),
            error = %err,
            "Command rejected"
        );
    }

    fn record_validation_failures(&self, errors: &ValidationErrors) {
        if let Some(metrics) = &self.metrics {
            for section in errors.sections() {
                metrics.record_validation_failure(section.as_str());
            }
        }
    }

    fn show_errors(&mut self, errors: ValidationErrors) {
        self.wizard.errors = errors;
    }

    /// Once errors are visible, recheck the current step so a corrected
    /// field clears its message
    fn revalidate(&mut self) {
        if self.wizard.errors.is_empty() {
            return;
        }
        let sections = self.wizard.step.sections(self.wizard.draft.kind);
        self.wizard.errors = match self.wizard.validate(sections) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
    }
}

impl Drop for WizardController {
    fn drop(&mut self) {
        if let Some(url) = self.wizard.draft.photo.preview_url.take() {
            self.previews.revoke(&url);
        }
    }
}

/// Pending `WizardController::submit`; settles as cancelled if dropped first
struct InFlight<'a> {
    controller: &'a mut WizardController,
    started: Instant,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(
        &mut self,
        outcome: Result<OrderConfirmation, SubmissionError>,
    ) -> Result<OrderConfirmation, WizardError> {
        self.settled = true;
        self.controller.finish_submit(outcome, self.started.elapsed())
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.controller.abandon_submit(self.started.elapsed());
        }
    }
}

fn step_label(step: Step) -> &'static str {
    match step {
        Step::Kind => "kind",
        Step::Details => "details",
        Step::Collection => "collection",
        Step::Review => "review",
    }
}

// ============================================================================
// Shared Handle
// ============================================================================

/// Clonable handle for UIs where several controls reach the same wizard.
/// The lock is released while the order service is called, so `submitting`
/// is what keeps a second submit out. A submission runs on its own task and
/// is recorded even if the caller stops waiting.
#[derive(Clone)]
pub struct WizardHandle {
    inner: Arc<Mutex<WizardController>>,
}

impl WizardHandle {
    pub fn new(controller: WizardController) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    pub async fn dispatch(&self, command: WizardCommand) -> Result<Vec<WizardEvent>, WizardError> {
        self.inner.lock().await.dispatch(command)
    }

    pub async fn submit(&self) -> Result<OrderConfirmation, WizardError> {
        let inner = self.inner.clone();
        let started = Instant::now();
        let task = tokio::spawn(async move {
            let (draft, gateway) = {
                let mut controller = inner.lock().await;
                let draft = controller.begin_submit()?;
                (draft, controller.gateway.clone())
            };

            let outcome = gateway.submit(&draft).await;

            inner.lock().await.finish_submit(outcome, started.elapsed())
        });

        match task.await {
            Ok(result) => result,
            Err(err) => {
                self.inner.lock().await.abandon_submit(started.elapsed());
                Err(WizardError::Submission(SubmissionError::Remote(format!(
                    "submission task failed: {}",
                    err
                ))))
            }
        }
    }

    /// Run `f` against the controller under the lock
    pub async fn with<R>(&self, f: impl FnOnce(&WizardController) -> R) -> R {
        let controller = self.inner.lock().await;
        f(&controller)
    }
}

use eventhub_client::{encode, EventApi, SubmitError};
use eventhub_models::{EventDraft, EventField, EventId, FieldValue, FieldValueError, SubmitMode};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::outcome::OutcomeRouter;
use crate::schema::{EventSchema, ValidationErrors};

/// Where the form is in the submit workflow. Invalid input and failed
/// submissions both land back in `Editing`, as does any edit made after
/// `Navigated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Validating,
    Submitting,
    Navigated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(ValidationErrors),
    /// Another submission is still in flight.
    AlreadySubmitting,
    Succeeded { event_id: EventId, path: String },
    Failed(SubmitError),
    /// The form was torn down before the response arrived.
    Cancelled,
}

#[derive(Debug)]
struct FormState {
    initial: EventDraft,
    values: EventDraft,
    errors: ValidationErrors,
    dirty: BTreeSet<EventField>,
    touched: BTreeSet<EventField>,
    phase: FormPhase,
    submit_count: u32,
}

/// Clears the in-progress flag on every exit path of `submit`.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single owner of an event draft, its validity and the submit flag.
pub struct EventForm<A> {
    api: A,
    router: OutcomeRouter,
    mode: SubmitMode,
    schema: EventSchema,
    state: Mutex<FormState>,
    submitting: AtomicBool,
    cancel: CancellationToken,
}

impl<A: EventApi> EventForm<A> {
    pub fn new(api: A, router: OutcomeRouter, mode: SubmitMode, initial: EventDraft) -> Self {
        Self {
            api,
            router,
            mode,
            schema: EventSchema::default(),
            state: Mutex::new(FormState {
                values: initial.clone(),
                initial,
                errors: ValidationErrors::default(),
                dirty: BTreeSet::new(),
                touched: BTreeSet::new(),
                phase: FormPhase::Editing,
                submit_count: 0,
            }),
            submitting: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_schema(mut self, schema: EventSchema) -> Self {
        self.schema = schema;
        self
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn set_phase(&self, phase: FormPhase) {
        self.lock().phase = phase;
    }

    pub fn mode(&self) -> &SubmitMode {
        &self.mode
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Write one field and re-validate it plus any field whose rules read it.
    pub fn set_field(&self, field: EventField, value: FieldValue) -> Result<(), FieldValueError> {
        let mut state = self.lock();
        state.values.set(field, value)?;
        state.dirty.insert(field);
        state.touched.insert(field);
        if state.phase == FormPhase::Navigated {
            state.phase = FormPhase::Editing;
        }
        for dependent in EventSchema::dependents(field) {
            let messages = self.schema.validate_field(&state.values, *dependent);
            state.errors.set(*dependent, messages);
        }
        Ok(())
    }

    pub fn values(&self) -> EventDraft {
        self.lock().values.clone()
    }

    pub fn errors(&self) -> ValidationErrors {
        self.lock().errors.clone()
    }

    pub fn field_errors(&self, field: EventField) -> Vec<String> {
        self.lock().errors.get(field).to_vec()
    }

    pub fn is_valid(&self) -> bool {
        let state = self.lock();
        self.schema.validate(&state.values).is_ok()
    }

    pub fn is_dirty(&self) -> bool {
        let state = self.lock();
        !state.dirty.is_empty() && state.values != state.initial
    }

    pub fn is_touched(&self, field: EventField) -> bool {
        self.lock().touched.contains(&field)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> FormPhase {
        self.lock().phase
    }

    pub fn submit_count(&self) -> u32 {
        self.lock().submit_count
    }

    pub fn submit_label(&self) -> &'static str {
        match (&self.mode, self.is_submitting()) {
            (SubmitMode::Create, false) => "Create Event",
            (SubmitMode::Create, true) => "Creating...",
            (SubmitMode::Update(_), false) => "Update Event",
            (SubmitMode::Update(_), true) => "Updating...",
        }
    }

    /// Restore the values the form was mounted with.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.values = state.initial.clone();
        state.errors = ValidationErrors::default();
        state.dirty.clear();
        state.touched.clear();
        state.phase = FormPhase::Editing;
    }

    /// Stop caring about any in-flight submission. A late response is
    /// ignored: no navigation, no notification.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    /// Token cancelled when the form is torn down or dropped.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Validate, encode, send and route the result. A call made while
    /// another is pending does nothing.
    pub async fn submit(&self) -> SubmitOutcome {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("submit ignored, a submission is already in flight");
            return SubmitOutcome::AlreadySubmitting;
        }
        let _in_flight = InFlight(&self.submitting);

        if self.cancel.is_cancelled() {
            return SubmitOutcome::Cancelled;
        }

        let validated = {
            let mut state = self.lock();
            state.phase = FormPhase::Validating;
            state.submit_count += 1;
            state.touched.extend(EventField::ALL);
            match self.schema.validate(&state.values) {
                Ok(validated) => {
                    state.errors = ValidationErrors::default();
                    state.phase = FormPhase::Submitting;
                    validated
                }
                Err(errors) => {
                    tracing::debug!(%errors, "event draft rejected");
                    state.errors = errors.clone();
                    state.phase = FormPhase::Editing;
                    return SubmitOutcome::Invalid(errors);
                }
            }
        };

        let payload = encode(&validated);
        tracing::info!(
            mode = ?self.mode,
            parts = payload.parts().len(),
            has_image = payload.file().is_some(),
            "submitting event"
        );

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = self.api.submit_event(&self.mode, payload) => Some(result),
        };
        let Some(result) = result.filter(|_| !self.cancel.is_cancelled()) else {
            tracing::info!("form torn down, dropping submission result");
            self.set_phase(FormPhase::Editing);
            return SubmitOutcome::Cancelled;
        };

        self.router.dispatch(&self.mode, &result);
        match result {
            Ok(event_id) => {
                self.set_phase(FormPhase::Navigated);
                let path = event_id.detail_path();
                SubmitOutcome::Succeeded { event_id, path }
            }
            Err(err) => {
                self.set_phase(FormPhase::Editing);
                SubmitOutcome::Failed(err)
            }
        }
    }
}

impl<A> Drop for EventForm<A> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{History, Toaster};
    use chrono::{Duration, TimeZone, Utc};
    use eventhub_client::{EncodedPayload, SubmissionResult};
    use eventhub_models::SelectedFile;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tokio::sync::Notify;

    struct FakeApi {
        calls: AtomicUsize,
        response: SubmissionResult,
        gate: Option<Arc<Notify>>,
        last: Mutex<Option<(SubmitMode, EncodedPayload)>>,
    }

    impl FakeApi {
        fn answering(response: SubmissionResult) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response,
                gate: None,
                last: Mutex::new(None),
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EventApi for FakeApi {
        async fn submit_event(&self, mode: &SubmitMode, payload: EncodedPayload) -> SubmissionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((mode.clone(), payload));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.response.clone()
        }
    }

    struct Harness {
        form: EventForm<FakeApi>,
        history: Arc<History>,
        toaster: Arc<Toaster>,
    }

    fn harness(api: FakeApi, mode: SubmitMode) -> Harness {
        let history = Arc::new(History::default());
        let toaster = Arc::new(Toaster::default());
        let router = OutcomeRouter::new(history.clone(), toaster.clone());
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
        let form = EventForm::new(api, router, mode, EventDraft::defaults_at(now));
        Harness {
            form,
            history,
            toaster,
        }
    }

    fn fill_launch(form: &EventForm<FakeApi>) {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
        form.set_field(EventField::Title, "Launch".into()).unwrap();
        form.set_field(EventField::Description, "desc".into()).unwrap();
        form.set_field(EventField::Location, "Online".into()).unwrap();
        form.set_field(EventField::Url, "https://x.com".into()).unwrap();
        form.set_field(EventField::StartDate, start.into()).unwrap();
        form.set_field(EventField::EndDate, (start + Duration::hours(2)).into())
            .unwrap();
        form.set_field(EventField::CategoryId, "c1".into()).unwrap();
        form.set_field(EventField::Price, "0".into()).unwrap();
        form.set_field(EventField::IsFree, true.into()).unwrap();
    }

    #[tokio::test]
    async fn successful_submit_navigates_to_new_event() {
        let h = harness(
            FakeApi::answering(Ok(EventId::new("e42"))),
            SubmitMode::Create,
        );
        fill_launch(&h.form);
        assert!(h.form.is_valid());

        let outcome = h.form.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Succeeded {
                event_id: EventId::new("e42"),
                path: "/events/e42".into()
            }
        );
        assert_eq!(h.history.current().as_deref(), Some("/events/e42"));
        assert_eq!(h.form.phase(), FormPhase::Navigated);
        assert!(!h.form.is_submitting());

        let last = h.form.api().last.lock().unwrap();
        let (mode, payload) = last.as_ref().unwrap();
        assert_eq!(*mode, SubmitMode::Create);
        assert_eq!(payload.text_fields().count(), 8);
        assert!(payload.file().is_none());
    }

    #[tokio::test]
    async fn editing_after_success_returns_to_editing() {
        let h = harness(
            FakeApi::answering(Ok(EventId::new("e42"))),
            SubmitMode::Create,
        );
        fill_launch(&h.form);
        h.form.submit().await;
        assert_eq!(h.form.phase(), FormPhase::Navigated);

        h.form.set_field(EventField::Title, "Launch again".into()).unwrap();
        assert_eq!(h.form.phase(), FormPhase::Editing);
    }

    #[tokio::test]
    async fn server_error_notifies_and_keeps_form_editable() {
        let h = harness(
            FakeApi::answering(Err(SubmitError::server(409, Some("Duplicate title".into())))),
            SubmitMode::Create,
        );
        fill_launch(&h.form);

        let outcome = h.form.submit().await;
        assert!(matches!(outcome, SubmitOutcome::Failed(ref e) if e.message == "Duplicate title"));
        let toasts = h.toaster.active();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].notification.description, "Duplicate title");
        assert_eq!(
            toasts[0].notification.duration,
            std::time::Duration::from_secs(3)
        );
        assert!(h.history.current().is_none());

        assert_eq!(h.form.phase(), FormPhase::Editing);
        assert!(!h.form.is_submitting());
        h.form.set_field(EventField::Title, "Launch 2".into()).unwrap();
        assert_eq!(h.form.values().title, "Launch 2");
        h.form.submit().await;
        assert_eq!(h.form.api().calls(), 2);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_client() {
        let h = harness(
            FakeApi::answering(Ok(EventId::new("e1"))),
            SubmitMode::Create,
        );
        fill_launch(&h.form);
        h.form.set_field(EventField::Title, "".into()).unwrap();

        let SubmitOutcome::Invalid(errors) = h.form.submit().await else {
            panic!("expected validation failure");
        };
        assert!(errors.contains(EventField::Title));
        assert_eq!(h.form.field_errors(EventField::Title), ["Title is required"]);
        assert_eq!(h.form.api().calls(), 0);
        assert_eq!(h.form.phase(), FormPhase::Editing);
        assert!(!h.form.is_submitting());
        assert!(h.form.is_touched(EventField::Location));
    }

    #[tokio::test]
    async fn second_submit_while_pending_is_a_no_op() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            FakeApi::answering(Ok(EventId::new("e9"))).gated(gate.clone()),
            SubmitMode::Create,
        );
        fill_launch(&h.form);

        let (first, second) = tokio::join!(h.form.submit(), async {
            assert!(h.form.is_submitting());
            assert_eq!(h.form.submit_label(), "Creating...");
            let outcome = h.form.submit().await;
            gate.notify_one();
            outcome
        });

        assert!(matches!(first, SubmitOutcome::Succeeded { .. }));
        assert_eq!(second, SubmitOutcome::AlreadySubmitting);
        assert_eq!(h.form.api().calls(), 1);
        assert!(!h.form.is_submitting());
        assert_eq!(h.form.submit_label(), "Create Event");
    }

    #[tokio::test]
    async fn teardown_drops_late_response() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            FakeApi::answering(Ok(EventId::new("e5"))).gated(gate.clone()),
            SubmitMode::Create,
        );
        fill_launch(&h.form);
        let token = h.form.cancellation_token();

        let (outcome, _) = tokio::join!(h.form.submit(), async {
            h.form.teardown();
        });

        assert_eq!(outcome, SubmitOutcome::Cancelled);
        assert!(token.is_cancelled());
        assert!(h.history.current().is_none());
        assert!(h.toaster.active().is_empty());
        assert!(!h.form.is_submitting());
        assert_eq!(h.form.submit().await, SubmitOutcome::Cancelled);
    }

    #[tokio::test]
    async fn update_mode_labels_and_target() {
        let h = harness(
            FakeApi::answering(Ok(EventId::new("e3"))),
            SubmitMode::Update(EventId::new("e3")),
        );
        assert_eq!(h.form.submit_label(), "Update Event");
        fill_launch(&h.form);
        h.form.submit().await;
        let last = h.form.api().last.lock().unwrap();
        assert_eq!(last.as_ref().unwrap().0, SubmitMode::Update(EventId::new("e3")));
    }

    #[test]
    fn changing_a_date_revalidates_the_other() {
        let h = harness(
            FakeApi::answering(Ok(EventId::new("e1"))),
            SubmitMode::Create,
        );
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap();
        h.form
            .set_field(EventField::EndDate, (start + Duration::hours(1)).into())
            .unwrap();
        assert!(h.form.field_errors(EventField::EndDate).is_empty());

        h.form
            .set_field(EventField::StartDate, (start + Duration::hours(3)).into())
            .unwrap();
        assert_eq!(
            h.form.field_errors(EventField::EndDate),
            ["End date must not be before the start date"]
        );

        h.form
            .set_field(EventField::EndDate, (start + Duration::hours(4)).into())
            .unwrap();
        assert!(h.form.field_errors(EventField::EndDate).is_empty());
    }

    #[test]
    fn toggling_free_revalidates_price() {
        let h = harness(
            FakeApi::answering(Ok(EventId::new("e1"))),
            SubmitMode::Create,
        );
        h.form.set_field(EventField::Price, "".into()).unwrap();
        assert_eq!(h.form.field_errors(EventField::Price), ["Price is required"]);
        h.form.set_field(EventField::IsFree, true.into()).unwrap();
        assert!(h.form.field_errors(EventField::Price).is_empty());
    }

    #[test]
    fn image_is_owned_by_the_draft_and_reset_restores_defaults() {
        let h = harness(
            FakeApi::answering(Ok(EventId::new("e1"))),
            SubmitMode::Create,
        );
        assert!(!h.form.is_dirty());
        h.form
            .set_field(
                EventField::Image,
                SelectedFile::new("poster.png", None, vec![1, 2]).into(),
            )
            .unwrap();
        assert!(h.form.is_dirty());
        assert_eq!(
            h.form.values().image.map(|f| f.file_name),
            Some("poster.png".to_string())
        );

        assert!(h.form.set_field(EventField::Image, "x".into()).is_err());

        h.form.reset();
        assert!(h.form.values().image.is_none());
        assert!(!h.form.is_dirty());
        assert!(h.form.errors().is_empty());
    }
}

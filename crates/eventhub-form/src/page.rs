use chrono::Utc;
use eventhub_client::EventApi;
use eventhub_models::{Event, EventDraft, SubmitMode};

use crate::form::EventForm;
use crate::outcome::OutcomeRouter;
use crate::schema::EventSchema;

/// Routed page hosting an event form.
pub struct EventPage<A> {
    heading: &'static str,
    form: EventForm<A>,
}

impl<A: EventApi> EventPage<A> {
    pub fn create(api: A, router: OutcomeRouter, schema: EventSchema) -> Self {
        let draft = EventDraft::defaults_at(Utc::now());
        Self {
            heading: "Create Event",
            form: EventForm::new(api, router, SubmitMode::Create, draft).with_schema(schema),
        }
    }

    /// Page for editing `existing`, pre-filled with its current values.
    pub fn update(api: A, router: OutcomeRouter, schema: EventSchema, existing: &Event) -> Self {
        let mode = SubmitMode::Update(existing.id.clone());
        Self {
            heading: "Update Event",
            form: EventForm::new(api, router, mode, EventDraft::from_event(existing))
                .with_schema(schema),
        }
    }

    pub fn heading(&self) -> &'static str {
        self.heading
    }

    pub fn form(&self) -> &EventForm<A> {
        &self.form
    }
}

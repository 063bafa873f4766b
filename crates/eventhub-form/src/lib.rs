pub mod form;
pub mod notify;
pub mod outcome;
pub mod page;
pub mod schema;

pub use form::{EventForm, FormPhase, SubmitOutcome};
pub use notify::{History, Toast, ToastId, Toaster};
pub use outcome::{Dispatched, Navigator, Notification, NotificationVariant, Notifier, OutcomeRouter};
pub use page::EventPage;
pub use schema::{EventSchema, ValidationErrors};

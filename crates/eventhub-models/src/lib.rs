pub mod event;
pub mod file;
pub mod user;

pub use event::{
    Event, EventDraft, EventField, EventId, FieldValue, FieldValueError, SubmitMode,
    ValidatedEvent,
};
pub use file::{FileError, SelectedFile};
pub use user::User;

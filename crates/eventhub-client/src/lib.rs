pub mod client;
pub mod encode;
pub mod error;

pub use client::{EventApi, EventClient};
pub use encode::{encode, EncodedPayload, Part, IMAGE_FIELD};
pub use error::{ClientError, SubmissionResult, SubmitError, SubmitErrorKind, FALLBACK_MESSAGE};

use eventhub_client::{SubmissionResult, SubmitError};
use eventhub_models::SubmitMode;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

/// Moves the user interface to another view.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Shows transient notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub duration: Duration,
    pub variant: NotificationVariant,
}

/// What the router did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    Navigated(String),
    Notified(Notification),
}

/// Sends a finished submission either to the event's detail view or to a
/// failure notification.
#[derive(Clone)]
pub struct OutcomeRouter {
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    notification_duration: Duration,
}

impl OutcomeRouter {
    pub fn new(navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            navigator,
            notifier,
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
        }
    }

    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    pub fn dispatch(&self, mode: &SubmitMode, result: &SubmissionResult) -> Dispatched {
        match result {
            Ok(event_id) => {
                let path = event_id.detail_path();
                tracing::info!(%event_id, %path, "event saved, navigating");
                self.navigator.navigate(&path);
                Dispatched::Navigated(path)
            }
            Err(err) => {
                tracing::info!(code = err.kind.code(), message = %err.message, "event submission failed");
                let notification = self.failure_notification(mode, err);
                self.notifier.notify(notification.clone());
                Dispatched::Notified(notification)
            }
        }
    }

    /// The notification shown for a failed submission in `mode`.
    pub fn failure_notification(&self, mode: &SubmitMode, err: &SubmitError) -> Notification {
        let title = match mode {
            SubmitMode::Create => "Event creation failed.",
            SubmitMode::Update(_) => "Event update failed.",
        };
        Notification {
            title: title.to_string(),
            description: err.message.clone(),
            duration: self.notification_duration,
            variant: NotificationVariant::Destructive,
        }
    }
}

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use crate::outcome::{Navigator, Notification, Notifier};

/// Toasts kept on screen at once; a newer toast pushes out the oldest.
pub const DEFAULT_TOAST_LIMIT: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub notification: Notification,
    pub expires_at: Instant,
}

#[derive(Debug, Default)]
struct ToastState {
    next_id: u64,
    active: Vec<Toast>,
}

/// In-memory notifier holding time-limited, dismissible toasts.
#[derive(Debug)]
pub struct Toaster {
    limit: usize,
    state: Mutex<ToastState>,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::with_limit(DEFAULT_TOAST_LIMIT)
    }
}

impl Toaster {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            state: Mutex::new(ToastState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ToastState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn show_at(&self, notification: Notification, now: Instant) -> ToastId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = ToastId(state.next_id);
        let expires_at = now + notification.duration;
        state.active.insert(
            0,
            Toast {
                id,
                notification,
                expires_at,
            },
        );
        let limit = self.limit;
        state.active.truncate(limit);
        id
    }

    /// Returns false if the toast was already gone.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let mut state = self.lock();
        let before = state.active.len();
        state.active.retain(|toast| toast.id != id);
        state.active.len() != before
    }

    /// Toasts still visible at `now`, newest first. Expired ones are dropped.
    pub fn active_at(&self, now: Instant) -> Vec<Toast> {
        let mut state = self.lock();
        state.active.retain(|toast| toast.expires_at > now);
        state.active.clone()
    }

    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }
}

impl Notifier for Toaster {
    fn notify(&self, notification: Notification) {
        self.show_at(notification, Instant::now());
    }
}

/// In-memory navigator recording every visited path.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }
}

impl Navigator for History {
    fn navigate(&self, path: &str) {
        self.lock().push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::NotificationVariant;
    use std::time::Duration;

    fn toast(text: &str) -> Notification {
        Notification {
            title: "Event creation failed.".into(),
            description: text.into(),
            duration: Duration::from_secs(3),
            variant: NotificationVariant::Destructive,
        }
    }

    #[test]
    fn toast_expires_after_its_duration() {
        let toaster = Toaster::default();
        let now = Instant::now();
        toaster.show_at(toast("Duplicate title"), now);

        let visible = toaster.active_at(now + Duration::from_millis(2_999));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].notification.description, "Duplicate title");
        assert!(toaster.active_at(now + Duration::from_secs(3)).is_empty());
    }

    #[test]
    fn toast_can_be_dismissed_early() {
        let toaster = Toaster::default();
        let now = Instant::now();
        let id = toaster.show_at(toast("a"), now);
        assert!(toaster.dismiss(id));
        assert!(!toaster.dismiss(id));
        assert!(toaster.active_at(now).is_empty());
    }

    #[test]
    fn newest_toast_replaces_oldest_at_limit() {
        let toaster = Toaster::with_limit(2);
        let now = Instant::now();
        toaster.show_at(toast("first"), now);
        toaster.show_at(toast("second"), now);
        toaster.show_at(toast("third"), now);
        let texts: Vec<_> = toaster
            .active_at(now)
            .into_iter()
            .map(|t| t.notification.description)
            .collect();
        assert_eq!(texts, vec!["third", "second"]);
    }

    #[test]
    fn history_tracks_navigation() {
        let history = History::default();
        assert!(history.current().is_none());
        history.navigate("/events/create");
        history.navigate("/events/e1");
        assert_eq!(history.current().as_deref(), Some("/events/e1"));
        assert_eq!(history.entries().len(), 2);
    }
}

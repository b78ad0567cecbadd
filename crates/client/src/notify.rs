//! Transient user notifications.
//!
//! Operations that fail in a way the user should hear about (stock limits,
//! rejected payments, a failed cart merge) push a [`Notice`] into the
//! injected [`Notifier`] instead of returning an error. The presentation
//! layer drains and renders them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    fn info(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Info, message));
    }

    fn success(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Success, message));
    }

    fn warning(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Warning, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Error, message));
    }
}

/// A [`Notifier`] that queues notices until drained.
#[derive(Debug, Clone, Default)]
pub struct NoticeQueue {
    notices: Arc<Mutex<VecDeque<Notice>>>,
}

impl NoticeQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued notice, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut q| q.drain(..).collect())
            .unwrap_or_default()
    }

    /// Number of queued notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.lock().map(|q| q.len()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, notice: Notice) {
        tracing::debug!(level = %notice.level, message = %notice.message, "Notice");
        if let Ok(mut q) = self.notices.lock() {
            q.push_back(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drains_in_order() {
        let queue = NoticeQueue::new();
        queue.warning("Only 3 left");
        queue.success("Added to cart");
        assert_eq!(queue.len(), 2);

        let notices = queue.drain();
        assert_eq!(notices[0], Notice::new(NoticeLevel::Warning, "Only 3 left"));
        assert_eq!(notices[1].level, NoticeLevel::Success);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clones_share_queue() {
        let queue = NoticeQueue::new();
        let handle = queue.clone();
        handle.error("Payment failed");
        assert_eq!(queue.drain().len(), 1);
    }
}

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short user-facing message, the equivalent of a toast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Emits notices as tracing events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => {
                info!(event_name = "client.notice", level = "success", message = %notice.message)
            }
            NoticeLevel::Error => {
                warn!(event_name = "client.notice", level = "error", message = %notice.message)
            }
        }
    }
}

/// Keeps every notice so callers can report what a user would have seen.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
    forward: Option<Arc<dyn Notifier>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records notices and also hands each one to `next`.
    pub fn forwarding(next: Arc<dyn Notifier>) -> Self {
        Self { notices: Mutex::new(Vec::new()), forward: Some(next) }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|notices| notices.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|notice| notice.level == NoticeLevel::Error)
            .map(|notice| notice.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Some(next) = &self.forward {
            next.notify(notice.clone());
        }
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

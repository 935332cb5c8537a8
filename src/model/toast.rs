use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generation-ordered toast identifier (later toasts have larger ids)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastId(pub u64);

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Callback attached to a toast button
pub type ToastTrigger = Arc<dyn Fn() + Send + Sync>;

/// A labelled button on a toast
#[derive(Clone)]
pub struct ToastAction {
    pub label: String,
    trigger: ToastTrigger,
}

impl ToastAction {
    pub fn new(label: impl Into<String>, trigger: impl Fn() + Send + Sync + 'static) -> Self {
        ToastAction {
            label: label.into(),
            trigger: Arc::new(trigger),
        }
    }

    pub fn fire(&self) {
        (self.trigger)();
    }
}

impl fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Producer-side request; the queue assigns id, timestamp and default duration
#[derive(Debug, Clone)]
pub struct NewToast {
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    /// `None` = use the kind's default, `Some(ZERO)` = persistent
    pub duration: Option<Duration>,
    pub action: Option<ToastAction>,
}

impl NewToast {
    pub fn new(kind: ToastKind, title: impl Into<String>) -> Self {
        NewToast {
            kind,
            title: title.into(),
            message: None,
            duration: None,
            action: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, title)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Never auto-dismissed
    pub fn persistent(self) -> Self {
        self.duration(Duration::ZERO)
    }

    pub fn action(mut self, action: ToastAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// A notification sitting in the queue
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub title: String,
    pub message: Option<String>,
    pub action: Option<ToastAction>,
    /// Zero = persistent
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
}

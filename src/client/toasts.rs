//! Transient notifications with self-expiry.
//!
//! Every toast with a non-zero duration carries its own expiry deadline.
//! The owning event loop calls [`ToastQueue::expire`] when the earliest one
//! passes; readers going through [`ToastQueue::visible`] never see an
//! expired toast even if that tick hasn't happened yet.

use std::collections::VecDeque;
use std::fmt;

use chrono::Utc;
use tokio::time::Instant;
use tracing::debug;

use crate::model::config::ToastConfig;
use crate::model::toast::{NewToast, Toast, ToastId};

use super::timer::Deadline;

#[derive(Debug)]
struct Entry {
    toast: Toast,
    expiry: Deadline,
}

/// FIFO queue of toasts, oldest first
#[derive(Debug)]
pub struct ToastQueue {
    config: ToastConfig,
    entries: VecDeque<Entry>,
    next_id: u64,
}

impl ToastQueue {
    pub fn new(config: ToastConfig) -> Self {
        ToastQueue {
            config,
            entries: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Append a toast and schedule its expiry. Returns its id.
    pub fn enqueue(&mut self, toast: NewToast) -> ToastId {
        self.enqueue_at(toast, Instant::now())
    }

    pub fn enqueue_at(&mut self, toast: NewToast, now: Instant) -> ToastId {
        let id = ToastId(self.next_id);
        self.next_id += 1;

        let duration = toast
            .duration
            .unwrap_or_else(|| self.config.duration_for(toast.kind));
        let mut expiry = Deadline::new();
        if !duration.is_zero()
            && let Some(at) = now.checked_add(duration)
        {
            expiry.arm(at);
        }

        debug!(id = id.0, kind = ?toast.kind, ?duration, "toast enqueued");
        self.entries.push_back(Entry {
            toast: Toast {
                id,
                kind: toast.kind,
                title: toast.title,
                message: toast.message,
                action: toast.action,
                duration,
                created_at: Utc::now(),
            },
            expiry,
        });
        id
    }

    /// Enqueue an error toast whose message is taken from `err`, falling
    /// back to the configured default when `err` renders as blank.
    pub fn enqueue_error(&mut self, title: impl Into<String>, err: &(impl fmt::Display + ?Sized)) -> ToastId {
        let message = error_message(err, &self.config.fallback_error_message);
        self.enqueue(NewToast::error(title).message(message))
    }

    /// Remove a toast now, cancelling its expiry. Returns false if it was
    /// already gone.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        match self.entries.iter().position(|e| e.toast.id == id) {
            Some(index) => {
                if let Some(mut entry) = self.entries.remove(index) {
                    entry.expiry.cancel();
                }
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every toast whose expiry has passed; returns their ids
    pub fn expire(&mut self, now: Instant) -> Vec<ToastId> {
        let mut expired = Vec::new();
        self.entries.retain_mut(|entry| {
            if entry.expiry.fire_if_due(now) {
                expired.push(entry.toast.id);
                false
            } else {
                true
            }
        });
        if !expired.is_empty() {
            debug!(count = expired.len(), "toasts expired");
        }
        expired
    }

    /// Toasts still on screen at `now`, in insertion order
    pub fn visible(&self, now: Instant) -> impl Iterator<Item = &Toast> {
        self.entries
            .iter()
            .filter(move |e| e.expiry.at().is_none_or(|at| at > now))
            .map(|e| &e.toast)
    }

    pub fn get(&self, id: ToastId) -> Option<&Toast> {
        self.entries.iter().find(|e| e.toast.id == id).map(|e| &e.toast)
    }

    /// Earliest pending expiry
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().filter_map(|e| e.expiry.at()).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Human-readable message for an arbitrary failure
pub fn error_message(err: &(impl fmt::Display + ?Sized), fallback: &str) -> String {
    let rendered = err.to_string();
    let trimmed = rendered.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

//! The server the board client confirms its mutations against.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::model::{MemberId, MemberUpdate, TaskId, TaskStatus};

/// Why the server rejected a call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("{0}")]
    Validation(String),
    #[error("session is no longer valid")]
    Unauthenticated,
    #[error("not allowed: {0}")]
    Forbidden(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Remote task/member mutation calls. Implementations resolve `Ok` on
/// server-side success and reject with a `RemoteError` on anything else.
/// Retries, if any, belong here and not in the caller.
#[async_trait]
pub trait RemoteBoard: Send + Sync {
    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> Result<(), RemoteError>;

    async fn update_member(&self, id: MemberId, update: &MemberUpdate) -> Result<(), RemoteError>;

    async fn remove_member(&self, id: MemberId) -> Result<(), RemoteError>;
}

/// A call received by [`MemoryRemote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    UpdateTaskStatus(TaskId, TaskStatus),
    UpdateMember(MemberId, MemberUpdate),
    RemoveMember(MemberId),
}

/// In-process remote that records every call and answers from a script of
/// queued failures (empty script = accept). Used for offline runs and tests.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    calls: Mutex<Vec<RemoteCall>>,
    failures: Mutex<VecDeque<RemoteError>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next call with `error`
    pub fn fail_next(&self, error: RemoteError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn answer(&self, call: RemoteCall) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        match self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteBoard for MemoryRemote {
    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> Result<(), RemoteError> {
        self.answer(RemoteCall::UpdateTaskStatus(id, status))
    }

    async fn update_member(&self, id: MemberId, update: &MemberUpdate) -> Result<(), RemoteError> {
        self.answer(RemoteCall::UpdateMember(id, update.clone()))
    }

    async fn remove_member(&self, id: MemberId) -> Result<(), RemoteError> {
        self.answer(RemoteCall::RemoveMember(id))
    }
}

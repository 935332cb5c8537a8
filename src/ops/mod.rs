pub mod member_ops;
pub mod optimistic;
pub mod permission_ops;
pub mod task_ops;

use crate::io::remote::RemoteError;
use crate::model::{MemberId, TaskId};

/// Error type for board mutations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl BoardError {
    /// True when the server no longer recognizes the session
    pub fn is_authentication(&self) -> bool {
        matches!(self, BoardError::Remote(RemoteError::Unauthenticated))
    }
}

use crate::io::remote::RemoteBoard;
use crate::model::board::BoardState;
use crate::model::task::{Task, TaskId, TaskStatus};

use super::BoardError;
use super::optimistic::{Memento, OptimisticController, Outcome};

impl Memento<TaskId> for BoardState {
    type Snapshot = Option<Task>;

    fn capture(&self, key: &TaskId) -> Option<Task> {
        self.tasks.get(key).cloned()
    }

    fn restore(&mut self, key: &TaskId, snapshot: Option<Task>) {
        match snapshot {
            Some(task) => {
                self.tasks.insert(*key, task);
            }
            None => {
                self.tasks.shift_remove(key);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Local transitions
// ---------------------------------------------------------------------------

/// Move a task to another column. Setting the status it already has is a
/// no-op.
pub fn set_status(board: &mut BoardState, id: TaskId, status: TaskStatus) -> Result<(), BoardError> {
    let task = board.task_mut(id).ok_or(BoardError::TaskNotFound(id))?;
    if task.status == status {
        return Ok(());
    }
    task.status = status;
    Ok(())
}

// ---------------------------------------------------------------------------
// Optimistic transitions
// ---------------------------------------------------------------------------

/// Move a task optimistically: the board shows `status` at once and reverts
/// if the server rejects the move.
pub async fn move_task(
    controller: &OptimisticController<BoardState>,
    remote: &dyn RemoteBoard,
    id: TaskId,
    status: TaskStatus,
) -> Result<Outcome, BoardError> {
    controller
        .apply(
            id,
            |board: &mut BoardState| set_status(board, id, status),
            || async move {
                remote
                    .update_task_status(id, status)
                    .await
                    .map_err(BoardError::from)
            },
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::remote::{MemoryRemote, RemoteCall, RemoteError};
    use pretty_assertions::assert_eq;

    fn board() -> OptimisticController<BoardState> {
        OptimisticController::new(BoardState::from_parts(
            vec![
                Task::new(TaskId(1), "Ship release").with_status(TaskStatus::InProgress),
                Task::new(TaskId(2), "Write notes"),
            ],
            Vec::new(),
        ))
    }

    fn status_of(controller: &OptimisticController<BoardState>, id: TaskId) -> Option<TaskStatus> {
        controller.read(|b| b.task(id).map(|t| t.status))
    }

    #[test]
    fn set_status_reports_unknown_task() {
        let mut state = BoardState::new();
        assert_eq!(
            set_status(&mut state, TaskId(5), TaskStatus::Done),
            Err(BoardError::TaskNotFound(TaskId(5)))
        );
    }

    #[tokio::test]
    async fn confirmed_move_sticks() {
        let controller = board();
        let remote = MemoryRemote::new();
        let outcome = move_task(&controller, &remote, TaskId(1), TaskStatus::Done).await;
        assert_eq!(outcome, Ok(Outcome::Committed));
        assert_eq!(status_of(&controller, TaskId(1)), Some(TaskStatus::Done));
        assert_eq!(
            remote.calls(),
            vec![RemoteCall::UpdateTaskStatus(TaskId(1), TaskStatus::Done)]
        );
    }

    #[tokio::test]
    async fn network_failure_reverts_to_in_progress() {
        let controller = board();
        let remote = MemoryRemote::new();
        remote.fail_next(RemoteError::Network("connection reset".into()));

        let outcome = move_task(&controller, &remote, TaskId(1), TaskStatus::Done).await;

        assert_eq!(
            outcome,
            Err(BoardError::Remote(RemoteError::Network("connection reset".into())))
        );
        assert_eq!(status_of(&controller, TaskId(1)), Some(TaskStatus::InProgress));
    }

    #[tokio::test]
    async fn moving_to_current_status_sends_nothing() {
        let controller = board();
        let remote = MemoryRemote::new();
        let outcome = move_task(&controller, &remote, TaskId(2), TaskStatus::Todo).await;
        assert_eq!(outcome, Ok(Outcome::Unchanged));
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_task_sends_nothing() {
        let controller = board();
        let remote = MemoryRemote::new();
        let outcome = move_task(&controller, &remote, TaskId(99), TaskStatus::Done).await;
        assert_eq!(outcome, Err(BoardError::TaskNotFound(TaskId(99))));
        assert!(remote.calls().is_empty());
    }
}

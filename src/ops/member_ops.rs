use crate::io::remote::RemoteBoard;
use crate::model::board::BoardState;
use crate::model::member::{Member, MemberId, MemberUpdate};

use super::BoardError;
use super::optimistic::{Memento, OptimisticController, Outcome};

/// Members snapshot with their list position, so a rolled-back removal
/// puts the member back where it was.
impl Memento<MemberId> for BoardState {
    type Snapshot = Option<(usize, Member)>;

    fn capture(&self, key: &MemberId) -> Option<(usize, Member)> {
        self.members
            .get_full(key)
            .map(|(index, _, member)| (index, member.clone()))
    }

    fn restore(&mut self, key: &MemberId, snapshot: Option<(usize, Member)>) {
        match snapshot {
            Some((index, member)) => {
                if let Some(slot) = self.members.get_mut(key) {
                    *slot = member;
                } else {
                    let index = index.min(self.members.len());
                    self.members.shift_insert(index, *key, member);
                }
            }
            None => {
                self.members.shift_remove(key);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Local edits
// ---------------------------------------------------------------------------

pub fn apply_update(board: &mut BoardState, id: MemberId, update: &MemberUpdate) -> Result<(), BoardError> {
    let member = board.member_mut(id).ok_or(BoardError::MemberNotFound(id))?;
    update.apply_to(member);
    Ok(())
}

pub fn remove(board: &mut BoardState, id: MemberId) -> Result<(), BoardError> {
    board
        .members
        .shift_remove(&id)
        .map(|_| ())
        .ok_or(BoardError::MemberNotFound(id))
}

// ---------------------------------------------------------------------------
// Optimistic edits
// ---------------------------------------------------------------------------

pub async fn update_member(
    controller: &OptimisticController<BoardState>,
    remote: &dyn RemoteBoard,
    id: MemberId,
    update: MemberUpdate,
) -> Result<Outcome, BoardError> {
    let update = &update;
    controller
        .apply(
            id,
            |board: &mut BoardState| apply_update(board, id, update),
            || async move {
                remote
                    .update_member(id, update)
                    .await
                    .map_err(BoardError::from)
            },
        )
        .await
}

pub async fn remove_member(
    controller: &OptimisticController<BoardState>,
    remote: &dyn RemoteBoard,
    id: MemberId,
) -> Result<Outcome, BoardError> {
    controller
        .apply(
            id,
            |board: &mut BoardState| remove(board, id),
            || async move { remote.remove_member(id).await.map_err(BoardError::from) },
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::remote::{MemoryRemote, RemoteCall, RemoteError};
    use pretty_assertions::assert_eq;

    fn team() -> OptimisticController<BoardState> {
        OptimisticController::new(BoardState::from_parts(
            Vec::new(),
            vec![
                Member::new(MemberId(1), "Ada", "ada@example.com", "admin"),
                Member::new(MemberId(2), "Bo", "bo@example.com", "member"),
                Member::new(MemberId(3), "Cy", "cy@example.com", "member"),
            ],
        ))
    }

    fn member_ids(controller: &OptimisticController<BoardState>) -> Vec<MemberId> {
        controller.read(|b| b.members.keys().copied().collect())
    }

    #[tokio::test]
    async fn rejected_edit_restores_member() {
        let controller = team();
        let remote = MemoryRemote::new();
        remote.fail_next(RemoteError::Validation("email already taken".into()));
        let before = controller.read(|b| b.member(MemberId(2)).cloned());

        let update = MemberUpdate {
            email: Some("ada@example.com".into()),
            ..Default::default()
        };
        let outcome = update_member(&controller, &remote, MemberId(2), update).await;

        assert!(outcome.is_err());
        assert_eq!(controller.read(|b| b.member(MemberId(2)).cloned()), before);
    }

    #[tokio::test]
    async fn confirmed_edit_sends_partial_update() {
        let controller = team();
        let remote = MemoryRemote::new();
        let update = MemberUpdate {
            role: Some("admin".into()),
            ..Default::default()
        };

        let outcome = update_member(&controller, &remote, MemberId(3), update.clone()).await;

        assert_eq!(outcome, Ok(Outcome::Committed));
        assert_eq!(
            controller.read(|b| b.member(MemberId(3)).map(|m| m.role.clone())),
            Some("admin".to_string())
        );
        assert_eq!(remote.calls(), vec![RemoteCall::UpdateMember(MemberId(3), update)]);
    }

    #[tokio::test]
    async fn empty_edit_is_a_no_op() {
        let controller = team();
        let remote = MemoryRemote::new();
        let outcome = update_member(&controller, &remote, MemberId(1), MemberUpdate::default()).await;
        assert_eq!(outcome, Ok(Outcome::Unchanged));
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_removal_reinserts_at_original_position() {
        let controller = team();
        let remote = MemoryRemote::new();
        remote.fail_next(RemoteError::Forbidden("cannot remove".into()));

        let outcome = remove_member(&controller, &remote, MemberId(2)).await;

        assert_eq!(
            outcome,
            Err(BoardError::Remote(RemoteError::Forbidden("cannot remove".into())))
        );
        assert_eq!(member_ids(&controller), vec![MemberId(1), MemberId(2), MemberId(3)]);
    }

    #[tokio::test]
    async fn confirmed_removal_drops_member() {
        let controller = team();
        let remote = MemoryRemote::new();
        let outcome = remove_member(&controller, &remote, MemberId(1)).await;
        assert_eq!(outcome, Ok(Outcome::Committed));
        assert_eq!(member_ids(&controller), vec![MemberId(2), MemberId(3)]);
    }

    #[tokio::test]
    async fn removing_unknown_member_fails_locally() {
        let controller = team();
        let remote = MemoryRemote::new();
        let outcome = remove_member(&controller, &remote, MemberId(9)).await;
        assert_eq!(outcome, Err(BoardError::MemberNotFound(MemberId(9))));
        assert!(remote.calls().is_empty());
    }
}

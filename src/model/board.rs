use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::member::{Member, MemberId};
use super::task::{Task, TaskId};

/// The client's local copy of one board: the store optimistic mutations
/// write into. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    #[serde(default)]
    pub tasks: IndexMap<TaskId, Task>,
    #[serde(default)]
    pub members: IndexMap<MemberId, Member>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from server listings
    pub fn from_parts(tasks: Vec<Task>, members: Vec<Member>) -> Self {
        BoardState {
            tasks: tasks.into_iter().map(|t| (t.id, t)).collect(),
            members: members.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut Member> {
        self.members.get_mut(&id)
    }
}

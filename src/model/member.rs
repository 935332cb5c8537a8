use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a team member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member#{}", self.0)
    }
}

/// A member of the team, as listed on the members page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
    /// Role name (e.g. `admin`, `member`)
    pub role: String,
}

impl Member {
    pub fn new(
        id: MemberId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Member {
            id,
            name: name.into(),
            email: email.into(),
            role: role.into(),
        }
    }
}

/// Partial update of a member; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl MemberUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }

    /// Write the present fields onto `member`
    pub fn apply_to(&self, member: &mut Member) {
        if let Some(name) = &self.name {
            member.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            member.email.clone_from(email);
        }
        if let Some(role) = &self.role {
            member.role.clone_from(role);
        }
    }
}

use serde::Serialize;

use crate::model::config::Settings;
use crate::model::permission::Identity;
use crate::ops::permission_ops::Decision;
use crate::server::guard::Denial;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CheckJson {
    pub path: String,
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct PermissionsJson {
    pub id: u64,
    pub email: String,
    pub role_id: u64,
    pub permissions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn check_to_json(path: &str, verdict: &Result<(), Denial>) -> CheckJson {
    match verdict {
        Ok(()) => CheckJson {
            path: path.to_string(),
            decision: Decision::Allow,
            status: None,
            message: None,
        },
        Err(denial) => CheckJson {
            path: path.to_string(),
            decision: Decision::Deny,
            status: Some(denial.status),
            message: Some(denial.message.clone()),
        },
    }
}

pub fn permissions_to_json(identity: &Identity) -> PermissionsJson {
    PermissionsJson {
        id: identity.id,
        email: identity.email.clone(),
        role_id: identity.role_id,
        permissions: identity
            .permissions
            .granted()
            .iter()
            .map(|p| p.to_string())
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn format_settings(settings: &Settings) -> String {
    let s = &settings.session;
    let t = &settings.toasts;
    let a = &settings.auth;
    let lines = [
        format!("session.timeout_minutes = {}", s.timeout_minutes),
        format!("session.activity_throttle_ms = {}", s.activity_throttle_ms),
        format!("session.warning_lead_minutes = {}", s.warning_lead_minutes),
        format!("toasts.default_duration_ms = {}", t.default_duration_ms),
        format!("toasts.error_duration_ms = {}", t.error_duration_ms),
        format!("toasts.fallback_error_message = {:?}", t.fallback_error_message),
        format!("auth.unauthenticated_message = {:?}", a.unauthenticated_message),
        format!("auth.forbidden_message = {:?}", a.forbidden_message),
    ];
    lines.join("\n")
}

pub fn format_check(path: &str, verdict: &Result<(), Denial>) -> String {
    match verdict {
        Ok(()) => format!("allow {}", path),
        Err(denial) => format!("deny {} ({} {})", path, denial.status, denial.message),
    }
}

pub fn format_permissions(identity: &Identity) -> String {
    let mut out = format!(
        "{} (id {}, role {})",
        identity.email, identity.id, identity.role_id
    );
    let granted = identity.permissions.granted();
    if granted.is_empty() {
        out.push_str("\n  (none)");
    }
    for path in granted {
        out.push_str(&format!("\n  {}", path));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::AuthMessages;
    use crate::model::permission::PermissionTree;
    use insta::assert_snapshot;

    fn alice() -> Identity {
        Identity {
            id: 7,
            email: "alice@example.com".into(),
            role_id: 2,
            permissions: PermissionTree::new()
                .grant("task", "edit")
                .grant("member", "view"),
        }
    }

    #[test]
    fn settings_text() {
        assert_snapshot!(format_settings(&Settings::default()), @r#"
        session.timeout_minutes = 30
        session.activity_throttle_ms = 1000
        session.warning_lead_minutes = 1
        toasts.default_duration_ms = 5000
        toasts.error_duration_ms = 7000
        toasts.fallback_error_message = "An unexpected error occurred"
        auth.unauthenticated_message = "Authentication required"
        auth.forbidden_message = "Permission denied"
        "#);
    }

    #[test]
    fn check_text_shows_status_on_deny() {
        let messages = AuthMessages::default();
        assert_snapshot!(format_check("task.edit", &Ok(())), @"allow task.edit");
        assert_snapshot!(
            format_check("task.delete", &Err(Denial::forbidden(&messages))),
            @"deny task.delete (403 Permission denied)"
        );
        assert_snapshot!(
            format_check("task.delete", &Err(Denial::unauthenticated(&messages))),
            @"deny task.delete (401 Authentication required)"
        );
    }

    #[test]
    fn permissions_text_is_sorted() {
        assert_snapshot!(format_permissions(&alice()), @r"
        alice@example.com (id 7, role 2)
          member.view
          task.edit
        ");
    }

    #[test]
    fn check_json_omits_status_on_allow() {
        let json = serde_json::to_string(&check_to_json("task.edit", &Ok(()))).unwrap();
        assert_eq!(json, r#"{"path":"task.edit","decision":"allow"}"#);
    }
}

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::services::Claims;
use crate::profiles::repo::Profile;
use crate::state::AppState;

/// Closed role set. Anything the store hands back that is not one of these
/// resolves to `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Normal,
    Worker,
    Head,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Role {
        match raw.trim().to_lowercase().as_str() {
            "worker" => Role::Worker,
            "head" => Role::Head,
            "admin" => Role::Admin,
            _ => Role::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Normal => "normal",
            Role::Worker => "worker",
            Role::Head => "head",
            Role::Admin => "admin",
        }
    }
}

/// What a handler gets to ask about the caller.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResolvedIdentity {
    pub role: Role,
    pub is_admin: bool,
    pub is_worker: bool,
    pub is_head: bool,
    pub email_verified: bool,
}

impl ResolvedIdentity {
    pub fn new(role: Role, email_verified: bool) -> Self {
        Self {
            role,
            is_admin: role == Role::Admin,
            is_worker: role == Role::Worker,
            is_head: role == Role::Head,
            email_verified,
        }
    }

    /// Submit capability: workers and heads propose events.
    pub fn can_submit(&self) -> bool {
        self.is_worker || self.is_head
    }
}

/// Resolve the caller's role from the stored profile. A missing profile is an
/// expected first-login state, not a fault: one is materialized with role
/// normal, and if even that write fails the caller still gets a valid
/// default-normal identity.
pub async fn resolve(state: &AppState, claims: &Claims) -> ResolvedIdentity {
    match Profile::find_by_id(&state.db, claims.sub).await {
        Ok(Some(profile)) => {
            ResolvedIdentity::new(Role::parse(&profile.role), profile.email_verified)
        }
        Ok(None) => {
            if let Err(e) =
                Profile::create_default(&state.db, claims.sub, &claims.email, claims.email_verified)
                    .await
            {
                warn!(error = %e, user_id = %claims.sub, "profile provisioning failed");
            }
            ResolvedIdentity::new(Role::Normal, claims.email_verified)
        }
        Err(e) => {
            warn!(error = %e, user_id = %claims.sub, "profile lookup failed");
            ResolvedIdentity::new(Role::Normal, claims.email_verified)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("  Admin "), Role::Admin);
        assert_eq!(Role::parse("WORKER"), Role::Worker);
        assert_eq!(Role::parse("Head"), Role::Head);
        assert_eq!(Role::parse("normal"), Role::Normal);
    }

    #[test]
    fn unrecognized_and_missing_roles_default_to_normal() {
        assert_eq!(Role::parse(""), Role::Normal);
        assert_eq!(Role::parse("superuser"), Role::Normal);
        assert_eq!(Role::parse("user"), Role::Normal);
        assert_eq!(Role::parse("  "), Role::Normal);
    }

    #[test]
    fn normal_identity_has_no_capabilities() {
        let id = ResolvedIdentity::new(Role::Normal, false);
        assert!(!id.is_admin);
        assert!(!id.is_worker);
        assert!(!id.is_head);
        assert!(!id.can_submit());
    }

    #[test]
    fn capability_flags_follow_role() {
        let admin = ResolvedIdentity::new(Role::Admin, true);
        assert!(admin.is_admin && !admin.is_worker && !admin.is_head);
        assert!(!admin.can_submit());

        let worker = ResolvedIdentity::new(Role::Worker, true);
        assert!(worker.is_worker && worker.can_submit());

        let head = ResolvedIdentity::new(Role::Head, true);
        assert!(head.is_head && head.can_submit());
    }

    #[test]
    fn role_round_trips_through_as_str() {
        for role in [Role::Normal, Role::Worker, Role::Head, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
    }
}

/**
 * Role Policy
 *
 * Decides whether a verified caller may perform an operation, from the
 * caller's role and, for owned resources, whether the caller owns it.
 *
 * Handlers load the resource first (a missing resource is `404`) and then
 * call `Policy::enforce`, so an existing resource the caller may not touch
 * answers `403`.
 *
 * | Policy | Required role | Owner override |
 * |---|---|---|
 * | `EDIT_PHOTO`, `TAG_PHOTO`, `DELETE_PHOTO` | admin | yes |
 * | `EDIT_COMMENT` | admin | yes |
 * | `DELETE_COMMENT` | moderator | yes |
 * | `MANAGE_TRANSFORM` | admin | yes |
 * | `CHANGE_ROLE` | admin | no |
 */

use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthenticatedUser;
use crate::shared::Role;

/// Allow if the caller's role meets `required`, or if owner override is on
/// and the caller owns the resource
pub fn authorize(
    caller_role: Role,
    required: Role,
    caller_id: Uuid,
    owner_id: Option<Uuid>,
    allow_owner_override: bool,
) -> bool {
    if caller_role.satisfies(required) {
        return true;
    }
    allow_owner_override && owner_id == Some(caller_id)
}

/// A named authorization rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub required_role: Role,
    pub allow_owner_override: bool,
}

impl Policy {
    /// Only `role` (or higher) may proceed
    pub const fn role(required_role: Role) -> Self {
        Self {
            required_role,
            allow_owner_override: false,
        }
    }

    /// The owner may proceed, as may anyone with `role` or higher
    pub const fn owner_or(required_role: Role) -> Self {
        Self {
            required_role,
            allow_owner_override: true,
        }
    }

    pub fn allows(&self, caller: &AuthenticatedUser, owner_id: Option<Uuid>) -> bool {
        authorize(
            caller.role,
            self.required_role,
            caller.user_id,
            owner_id,
            self.allow_owner_override,
        )
    }

    /// Fail with `Forbidden` unless the rule allows `caller`
    pub fn enforce(
        &self,
        caller: &AuthenticatedUser,
        owner_id: Option<Uuid>,
    ) -> Result<(), BackendError> {
        if self.allows(caller, owner_id) {
            return Ok(());
        }
        tracing::warn!(
            "User {} ({}) denied: requires {}{}",
            caller.user_id,
            caller.role,
            self.required_role,
            if self.allow_owner_override { " or ownership" } else { "" }
        );
        Err(BackendError::forbidden(format!(
            "Requires role {}{}",
            self.required_role,
            if self.allow_owner_override { " or ownership" } else { "" }
        )))
    }
}

pub const EDIT_PHOTO: Policy = Policy::owner_or(Role::Admin);
pub const TAG_PHOTO: Policy = Policy::owner_or(Role::Admin);
pub const DELETE_PHOTO: Policy = Policy::owner_or(Role::Admin);
pub const EDIT_COMMENT: Policy = Policy::owner_or(Role::Admin);
pub const DELETE_COMMENT: Policy = Policy::owner_or(Role::Moderator);
pub const MANAGE_TRANSFORM: Policy = Policy::owner_or(Role::Admin);
pub const CHANGE_ROLE: Policy = Policy::role(Role::Admin);

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "x@example.com".to_string(),
            username: "x".to_string(),
            role,
        }
    }

    #[test]
    fn test_owner_override() {
        let owner = caller(Role::Regular);
        let other = caller(Role::Regular);
        assert!(EDIT_PHOTO.allows(&owner, Some(owner.user_id)));
        assert!(!EDIT_PHOTO.allows(&other, Some(owner.user_id)));
        assert!(EDIT_PHOTO.allows(&caller(Role::Admin), Some(owner.user_id)));
    }

    #[test]
    fn test_moderator_deletes_comments_but_cannot_edit() {
        let author = Uuid::new_v4();
        let moderator = caller(Role::Moderator);
        assert!(DELETE_COMMENT.enforce(&moderator, Some(author)).is_ok());
        assert!(EDIT_COMMENT.enforce(&moderator, Some(author)).is_err());
    }

    #[test]
    fn test_change_role_ignores_ownership() {
        let moderator = caller(Role::Moderator);
        assert!(!CHANGE_ROLE.allows(&moderator, Some(moderator.user_id)));
        assert!(CHANGE_ROLE.allows(&caller(Role::Admin), None));
    }

    #[test]
    fn test_missing_owner_never_matches() {
        let regular = caller(Role::Regular);
        assert!(!authorize(Role::Regular, Role::Admin, regular.user_id, None, true));
    }

    #[test]
    fn test_enforce_returns_forbidden() {
        let err = MANAGE_TRANSFORM
            .enforce(&caller(Role::Moderator), Some(Uuid::new_v4()))
            .unwrap_err();
        assert_eq!(err.code(), "forbidden");
    }
}

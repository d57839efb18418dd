//! Decision Handlers
//!
//! Each handler is a pure function of the caller's claims, one requirement,
//! and optionally a resource. Missing or unparseable claims always deny.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::claims::{ClaimKeys, Claims, UserId};
use super::hierarchy;
use super::permission::{Permission, Role};
use super::policy;
use super::requirement::Requirement;
use super::resource::OwnableResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    MissingRole,
    MissingIdentity,
    PermissionNotGranted,
    RoleTooLow,
    RoleNotAllowed,
    NotOwner,
    UnownedResource,
}

impl DenyReason {
    /// Stable machine-readable code, matching the serialized form
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::MissingRole => "missing_role",
            DenyReason::MissingIdentity => "missing_identity",
            DenyReason::PermissionNotGranted => "permission_not_granted",
            DenyReason::RoleTooLow => "role_too_low",
            DenyReason::RoleNotAllowed => "role_not_allowed",
            DenyReason::NotOwner => "not_owner",
            DenyReason::UnownedResource => "unowned_resource",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DenyReason::MissingRole => "role claim missing or invalid",
            DenyReason::MissingIdentity => "identity claim missing or invalid",
            DenyReason::PermissionNotGranted => "role lacks the required permission",
            DenyReason::RoleTooLow => "role is below the required role",
            DenyReason::RoleNotAllowed => "role is not in the allowed set",
            DenyReason::NotOwner => "caller does not own the resource",
            DenyReason::UnownedResource => "resource has no owner to check against",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }

    fn from_check(allowed: bool, otherwise: DenyReason) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny(otherwise)
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("ALLOW"),
            Decision::Deny(reason) => write!(f, "DENY ({})", reason),
        }
    }
}

/// What to do with a resource that exposes neither an owner nor a creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnownedResourcePolicy {
    #[default]
    Allow,
    Deny,
}

/// Role must be granted `permission`
pub fn check_permission(claims: &Claims, keys: &ClaimKeys, permission: Permission) -> Decision {
    let Some(role) = claims.role(keys) else {
        return Decision::Deny(DenyReason::MissingRole);
    };
    Decision::from_check(
        policy::has_permission(role, permission),
        DenyReason::PermissionNotGranted,
    )
}

/// Role must equal `required` or rank strictly above it
pub fn check_role(claims: &Claims, keys: &ClaimKeys, required: Role) -> Decision {
    let Some(role) = claims.role(keys) else {
        return Decision::Deny(DenyReason::MissingRole);
    };
    Decision::from_check(hierarchy::satisfies(role, required), DenyReason::RoleTooLow)
}

pub fn check_authenticated(claims: &Claims, keys: &ClaimKeys) -> Decision {
    Decision::from_check(claims.identity(keys).is_some(), DenyReason::MissingIdentity)
}

/// Exact role membership; the hierarchy is not consulted
pub fn check_any_role(claims: &Claims, keys: &ClaimKeys, requirement: &Requirement) -> Decision {
    let Some(role) = claims.role(keys) else {
        return Decision::Deny(DenyReason::MissingRole);
    };
    Decision::from_check(requirement.allows_role(role), DenyReason::RoleNotAllowed)
}

/// Permission check followed by the ownership rules for `resource`
pub fn check_resource(
    claims: &Claims,
    keys: &ClaimKeys,
    permission: Permission,
    resource: Option<&dyn OwnableResource>,
    unowned: UnownedResourcePolicy,
) -> Decision {
    let Some(user_id) = claims.identity(keys) else {
        return Decision::Deny(DenyReason::MissingIdentity);
    };
    let Some(role) = claims.role(keys) else {
        return Decision::Deny(DenyReason::MissingRole);
    };

    if !policy::has_permission(role, permission) {
        return Decision::Deny(DenyReason::PermissionNotGranted);
    }

    let Some(resource) = resource else {
        return Decision::Allow;
    };

    if role == Role::Admin {
        return Decision::Allow;
    }

    let teacher = role == Role::Teacher;
    // Resource ids go through the same normalization as the identity claim
    let matches = |raw: &str| UserId::parse(raw).as_ref() == Some(&user_id);
    if let Some(owner) = resource.owner_id() {
        return Decision::from_check(matches(owner) || teacher, DenyReason::NotOwner);
    }
    if let Some(creator) = resource.creator_id() {
        return Decision::from_check(matches(creator) || teacher, DenyReason::NotOwner);
    }

    tracing::warn!(
        user = %user_id,
        role = %role,
        permission = %permission,
        policy = ?unowned,
        "Resource exposes no owner or creator; applying unowned-resource policy"
    );
    match unowned {
        UnownedResourcePolicy::Allow => Decision::Allow,
        UnownedResourcePolicy::Deny => Decision::Deny(DenyReason::UnownedResource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rbac::resource::ResourceRef;

    fn keys() -> ClaimKeys {
        ClaimKeys::default()
    }

    #[test]
    fn test_permission_handler() {
        let student = Claims::for_principal("u1", "Student");
        assert_eq!(check_permission(&student, &keys(), Permission::ReadCourse), Decision::Allow);
        assert_eq!(
            check_permission(&student, &keys(), Permission::CreateCourse),
            Decision::Deny(DenyReason::PermissionNotGranted)
        );
    }

    #[test]
    fn test_role_handler_hierarchy() {
        let admin = Claims::for_principal("a", "Admin");
        let teacher = Claims::for_principal("t", "Teacher");
        let student = Claims::for_principal("s", "Student");

        assert_eq!(check_role(&admin, &keys(), Role::Teacher), Decision::Allow);
        assert_eq!(check_role(&teacher, &keys(), Role::Teacher), Decision::Allow);
        assert_eq!(
            check_role(&student, &keys(), Role::Teacher),
            Decision::Deny(DenyReason::RoleTooLow)
        );
    }

    #[test]
    fn test_fail_closed_without_role() {
        let anonymous = Claims::new().with("nameid", "u1");
        for p in Permission::ALL {
            assert_eq!(
                check_permission(&anonymous, &keys(), p),
                Decision::Deny(DenyReason::MissingRole)
            );
        }
        for r in Role::ALL {
            assert_eq!(check_role(&anonymous, &keys(), r), Decision::Deny(DenyReason::MissingRole));
        }
    }

    #[test]
    fn test_resource_ownership() {
        let perm = Permission::ReadUser;
        let allow = UnownedResourcePolicy::Allow;
        let student = Claims::for_principal("u1", "Student");
        let teacher = Claims::for_principal("t1", "Teacher");
        let admin = Claims::for_principal("a1", "Admin");

        let own = ResourceRef::owned_by("u1");
        let other = ResourceRef::owned_by("u2");

        assert_eq!(check_resource(&student, &keys(), perm, Some(&own), allow), Decision::Allow);
        assert_eq!(
            check_resource(&student, &keys(), perm, Some(&other), allow),
            Decision::Deny(DenyReason::NotOwner)
        );
        assert_eq!(check_resource(&teacher, &keys(), perm, Some(&other), allow), Decision::Allow);
        assert_eq!(check_resource(&admin, &keys(), perm, Some(&other), allow), Decision::Allow);
    }

    #[test]
    fn test_resource_creator_field() {
        let perm = Permission::ReadCourse;
        let student = Claims::for_principal("u1", "Student");
        let allow = UnownedResourcePolicy::Allow;

        let mine = ResourceRef::created_by("u1");
        let theirs = ResourceRef::created_by("u7");
        assert_eq!(check_resource(&student, &keys(), perm, Some(&mine), allow), Decision::Allow);
        assert_eq!(
            check_resource(&student, &keys(), perm, Some(&theirs), allow),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn test_owner_field_takes_precedence_over_creator() {
        let student = Claims::for_principal("u1", "Student");
        let resource = ResourceRef {
            owner_id: Some("u2".to_string()),
            created_by: Some("u1".to_string()),
        };
        assert_eq!(
            check_resource(
                &student,
                &keys(),
                Permission::ReadUser,
                Some(&resource),
                UnownedResourcePolicy::Allow
            ),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn test_resource_requires_base_permission_and_identity() {
        let student = Claims::for_principal("u1", "Student");
        let own = ResourceRef::owned_by("u1");
        assert_eq!(
            check_resource(
                &student,
                &keys(),
                Permission::DeleteUser,
                Some(&own),
                UnownedResourcePolicy::Allow
            ),
            Decision::Deny(DenyReason::PermissionNotGranted)
        );

        let no_id = Claims::new().with("role", "Admin");
        assert_eq!(
            check_resource(&no_id, &keys(), Permission::ReadUser, None, UnownedResourcePolicy::Allow),
            Decision::Deny(DenyReason::MissingIdentity)
        );
    }

    #[test]
    fn test_unowned_resource_policy() {
        let student = Claims::for_principal("u1", "Student");
        let bare = ResourceRef::unowned();
        let perm = Permission::ReadLesson;

        assert_eq!(
            check_resource(&student, &keys(), perm, Some(&bare), UnownedResourcePolicy::Allow),
            Decision::Allow
        );
        assert_eq!(
            check_resource(&student, &keys(), perm, Some(&bare), UnownedResourcePolicy::Deny),
            Decision::Deny(DenyReason::UnownedResource)
        );
        assert_eq!(
            check_resource(&student, &keys(), perm, None, UnownedResourcePolicy::Deny),
            Decision::Allow
        );
    }

    #[test]
    fn test_ownership_ignores_surrounding_whitespace() {
        let perm = Permission::ViewProgress;
        let allow = UnownedResourcePolicy::Allow;

        let padded_owner = ResourceRef::owned_by(" u1 ");
        let student = Claims::for_principal("u1", "Student");
        assert_eq!(check_resource(&student, &keys(), perm, Some(&padded_owner), allow), Decision::Allow);

        let owner = ResourceRef::owned_by("u1");
        let padded_caller = Claims::for_principal(" u1", "Student");
        assert_eq!(check_resource(&padded_caller, &keys(), perm, Some(&owner), allow), Decision::Allow);

        let padded_creator = ResourceRef::created_by("u1\t");
        assert_eq!(check_resource(&student, &keys(), perm, Some(&padded_creator), allow), Decision::Allow);

        let blank_owner = ResourceRef::owned_by("   ");
        assert_eq!(
            check_resource(&student, &keys(), perm, Some(&blank_owner), allow),
            Decision::Deny(DenyReason::NotOwner)
        );
    }

    #[test]
    fn test_decision_serialization() {
        let json = serde_json::to_value(Decision::Deny(DenyReason::NotOwner)).unwrap();
        assert_eq!(json, serde_json::json!({"decision": "deny", "reason": "not_owner"}));
        let json = serde_json::to_value(Decision::Allow).unwrap();
        assert_eq!(json, serde_json::json!({"decision": "allow"}));

        let reason = DenyReason::PermissionNotGranted;
        assert_eq!(serde_json::to_value(reason).unwrap(), serde_json::json!(reason.code()));
    }
}

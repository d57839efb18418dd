//! Requirement Model
//!
//! The predicate a named policy resolves to.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::permission::{Permission, Role};

pub const REQUIRE_AUTHENTICATION: &str = "RequireAuthentication";
pub const ADMIN_ONLY: &str = "AdminOnly";
pub const TEACHER_OR_ADMIN: &str = "TeacherOrAdmin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Requirement {
    /// Role must be granted the permission
    Permission(Permission),
    /// Role must be this role or higher
    Role(Role),
    /// Any caller with a valid identity
    Authenticated,
    /// Role must be one of these, no hierarchy
    AnyRole(BTreeSet<Role>),
}

impl Requirement {
    pub fn permission(permission: Permission) -> Self {
        Requirement::Permission(permission)
    }

    pub fn role(role: Role) -> Self {
        Requirement::Role(role)
    }

    pub fn any_role<I: IntoIterator<Item = Role>>(roles: I) -> Self {
        Requirement::AnyRole(roles.into_iter().collect())
    }

    pub fn allows_role(&self, role: Role) -> bool {
        match self {
            Requirement::AnyRole(roles) => roles.contains(&role),
            _ => false,
        }
    }

    /// Policy name the standard registry binds this requirement to
    pub fn policy_name(&self) -> Option<String> {
        match self {
            Requirement::Permission(p) => Some(format!("Permission.{}", p)),
            Requirement::Role(r) => Some(format!("Role.{}", r)),
            Requirement::Authenticated | Requirement::AnyRole(_) => None,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Permission(p) => write!(f, "permission {}", p),
            Requirement::Role(r) => write!(f, "role {} or higher", r),
            Requirement::Authenticated => f.write_str("authenticated caller"),
            Requirement::AnyRole(roles) => {
                let names: Vec<&str> = roles.iter().map(|r| r.name()).collect();
                write!(f, "one of [{}]", names.join(", "))
            }
        }
    }
}

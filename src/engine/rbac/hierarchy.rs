//! Role hierarchy: Student < Teacher < Admin
//!
//! Only used for role requirements. Permission membership never consults it.

use super::permission::Role;

/// Ordinal of a role; 0 is reserved for roles outside the hierarchy
pub fn rank(role: Role) -> u8 {
    match role {
        Role::Student => 1,
        Role::Teacher => 2,
        Role::Admin => 3,
    }
}

pub fn is_higher(role: Role, than: Role) -> bool {
    rank(role) > rank(than)
}

/// Exact match or any strictly higher role
pub fn satisfies(held: Role, required: Role) -> bool {
    held == required || is_higher(held, required)
}

//! Role-Permission Map
//!
//! Fixed permission matrix for every role. Built once and shared read-only
//! for the life of the process.

use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use super::permission::{Permission, Role};

const STUDENT_PERMISSIONS: &[Permission] = &[
    Permission::ReadUser,
    Permission::UpdateUser,
    Permission::ReadCourse,
    Permission::ReadLesson,
    Permission::ReadExercise,
    Permission::StartStudySession,
    Permission::SubmitAnswers,
    Permission::ViewProgress,
    Permission::AccessBeginnerLevel,
];

const TEACHER_PERMISSIONS: &[Permission] = &[
    Permission::ReadUser,
    Permission::UpdateUser,
    Permission::CreateCourse,
    Permission::ReadCourse,
    Permission::UpdateCourse,
    Permission::PublishCourse,
    Permission::ManageCourseContent,
    Permission::CreateLesson,
    Permission::ReadLesson,
    Permission::UpdateLesson,
    Permission::PublishLesson,
    Permission::ManageLessonContent,
    Permission::CreateExercise,
    Permission::ReadExercise,
    Permission::UpdateExercise,
    Permission::ManageExercises,
    Permission::StartStudySession,
    Permission::SubmitAnswers,
    Permission::ViewProgress,
    Permission::ViewAllProgress,
    Permission::ManageStudySessions,
    Permission::AccessBeginnerLevel,
    Permission::AccessIntermediateLevel,
    Permission::AccessAdvancedLevel,
    Permission::AccessAllLevels,
    Permission::ViewReports,
];

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::CreateUser,
    Permission::ReadUser,
    Permission::UpdateUser,
    Permission::DeleteUser,
    Permission::ManageUserRoles,
    Permission::CreateCourse,
    Permission::ReadCourse,
    Permission::UpdateCourse,
    Permission::DeleteCourse,
    Permission::PublishCourse,
    Permission::ManageCourseContent,
    Permission::CreateLesson,
    Permission::ReadLesson,
    Permission::UpdateLesson,
    Permission::DeleteLesson,
    Permission::PublishLesson,
    Permission::ManageLessonContent,
    Permission::CreateExercise,
    Permission::ReadExercise,
    Permission::UpdateExercise,
    Permission::DeleteExercise,
    Permission::ManageExercises,
    Permission::StartStudySession,
    Permission::SubmitAnswers,
    Permission::ViewProgress,
    Permission::ViewAllProgress,
    Permission::ManageStudySessions,
    Permission::ManageSystem,
    Permission::ViewAuditLogs,
    Permission::ManageSettings,
    Permission::ViewReports,
    Permission::AccessBeginnerLevel,
    Permission::AccessIntermediateLevel,
    Permission::AccessAdvancedLevel,
    Permission::AccessAllLevels,
];

static SHARED: OnceLock<RolePermissionMap> = OnceLock::new();

/// Immutable Role -> permission set mapping
#[derive(Debug, Clone)]
pub struct RolePermissionMap {
    grants: HashMap<Role, BTreeSet<Permission>>,
    empty: BTreeSet<Permission>,
}

impl RolePermissionMap {
    /// Build the map from the fixed matrix
    pub fn new() -> Self {
        let mut grants = HashMap::new();
        for role in Role::ALL {
            let granted = match role {
                Role::Student => STUDENT_PERMISSIONS,
                Role::Teacher => TEACHER_PERMISSIONS,
                Role::Admin => ADMIN_PERMISSIONS,
            };
            grants.insert(role, granted.iter().copied().collect());
        }
        Self {
            grants,
            empty: BTreeSet::new(),
        }
    }

    /// Process-wide instance, built on first use
    pub fn shared() -> &'static RolePermissionMap {
        SHARED.get_or_init(RolePermissionMap::new)
    }

    /// Permissions granted to a role; empty if the role has no entry
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Permission> {
        self.grants.get(&role).unwrap_or(&self.empty)
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.permissions_for(role).contains(&permission)
    }
}

impl Default for RolePermissionMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand over the shared map
pub fn permissions_for(role: Role) -> &'static BTreeSet<Permission> {
    RolePermissionMap::shared().permissions_for(role)
}

pub fn has_permission(role: Role, permission: Permission) -> bool {
    RolePermissionMap::shared().has_permission(role, permission)
}

/// Full catalog in declaration order
pub fn all_permissions() -> &'static [Permission] {
    &Permission::ALL
}

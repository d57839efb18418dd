//! Permission and Role Catalog
//!
//! Closed enumerations of every capability and principal category known to
//! the platform. Declaration order is significant: policy names and catalog
//! listings are generated in this order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::error::AuthzError;

/// Atomic capabilities, grouped by domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    // User management
    CreateUser,
    ReadUser,
    UpdateUser,
    DeleteUser,
    ManageUserRoles,

    // Course management
    CreateCourse,
    ReadCourse,
    UpdateCourse,
    DeleteCourse,
    PublishCourse,
    ManageCourseContent,

    // Lesson management
    CreateLesson,
    ReadLesson,
    UpdateLesson,
    DeleteLesson,
    PublishLesson,
    ManageLessonContent,

    // Exercise management
    CreateExercise,
    ReadExercise,
    UpdateExercise,
    DeleteExercise,
    ManageExercises,

    // Study & progress
    StartStudySession,
    SubmitAnswers,
    ViewProgress,
    ViewAllProgress,
    ManageStudySessions,

    // System administration
    ManageSystem,
    ViewAuditLogs,
    ManageSettings,
    ViewReports,

    // Content access
    AccessBeginnerLevel,
    AccessIntermediateLevel,
    AccessAdvancedLevel,
    AccessAllLevels,
}

/// Domain a permission belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionGroup {
    User,
    Course,
    Lesson,
    Exercise,
    Study,
    System,
    Content,
}

impl Permission {
    /// Every permission, in declaration order
    pub const ALL: [Permission; 35] = [
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

    pub fn name(self) -> &'static str {
        match self {
            Permission::CreateUser => "CreateUser",
            Permission::ReadUser => "ReadUser",
            Permission::UpdateUser => "UpdateUser",
            Permission::DeleteUser => "DeleteUser",
            Permission::ManageUserRoles => "ManageUserRoles",
            Permission::CreateCourse => "CreateCourse",
            Permission::ReadCourse => "ReadCourse",
            Permission::UpdateCourse => "UpdateCourse",
            Permission::DeleteCourse => "DeleteCourse",
            Permission::PublishCourse => "PublishCourse",
            Permission::ManageCourseContent => "ManageCourseContent",
            Permission::CreateLesson => "CreateLesson",
            Permission::ReadLesson => "ReadLesson",
            Permission::UpdateLesson => "UpdateLesson",
            Permission::DeleteLesson => "DeleteLesson",
            Permission::PublishLesson => "PublishLesson",
            Permission::ManageLessonContent => "ManageLessonContent",
            Permission::CreateExercise => "CreateExercise",
            Permission::ReadExercise => "ReadExercise",
            Permission::UpdateExercise => "UpdateExercise",
            Permission::DeleteExercise => "DeleteExercise",
            Permission::ManageExercises => "ManageExercises",
            Permission::StartStudySession => "StartStudySession",
            Permission::SubmitAnswers => "SubmitAnswers",
            Permission::ViewProgress => "ViewProgress",
            Permission::ViewAllProgress => "ViewAllProgress",
            Permission::ManageStudySessions => "ManageStudySessions",
            Permission::ManageSystem => "ManageSystem",
            Permission::ViewAuditLogs => "ViewAuditLogs",
            Permission::ManageSettings => "ManageSettings",
            Permission::ViewReports => "ViewReports",
            Permission::AccessBeginnerLevel => "AccessBeginnerLevel",
            Permission::AccessIntermediateLevel => "AccessIntermediateLevel",
            Permission::AccessAdvancedLevel => "AccessAdvancedLevel",
            Permission::AccessAllLevels => "AccessAllLevels",
        }
    }

    pub fn group(self) -> PermissionGroup {
        use Permission::*;
        match self {
            CreateUser | ReadUser | UpdateUser | DeleteUser | ManageUserRoles => PermissionGroup::User,
            CreateCourse | ReadCourse | UpdateCourse | DeleteCourse | PublishCourse
            | ManageCourseContent => PermissionGroup::Course,
            CreateLesson | ReadLesson | UpdateLesson | DeleteLesson | PublishLesson
            | ManageLessonContent => PermissionGroup::Lesson,
            CreateExercise | ReadExercise | UpdateExercise | DeleteExercise | ManageExercises => {
                PermissionGroup::Exercise
            }
            StartStudySession | SubmitAnswers | ViewProgress | ViewAllProgress
            | ManageStudySessions => PermissionGroup::Study,
            ManageSystem | ViewAuditLogs | ManageSettings | ViewReports => PermissionGroup::System,
            AccessBeginnerLevel | AccessIntermediateLevel | AccessAdvancedLevel | AccessAllLevels => {
                PermissionGroup::Content
            }
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Permission {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| AuthzError::UnknownPermission(s.to_string()))
    }
}

/// Principal categories. `Ord` follows declaration order and only keeps role
/// sets deterministic; use `hierarchy` for "role or higher" checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];

    pub fn name(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Admin => "Admin",
        }
    }

    /// Numeric code the credential issuer writes into the role claim
    pub fn code(self) -> u8 {
        match self {
            Role::Student => 0,
            Role::Teacher => 1,
            Role::Admin => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Role::ALL.iter().copied().find(|r| r.code() == code)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the exact variant name or its numeric code.
impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(role) = Role::ALL.iter().copied().find(|r| r.name() == s) {
            return Ok(role);
        }
        s.parse::<u8>()
            .ok()
            .and_then(Role::from_code)
            .ok_or_else(|| AuthzError::UnknownRole(s.to_string()))
    }
}

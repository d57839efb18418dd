use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use studygate_lib::engine::rbac::{
    has_permission, permissions_for, Claims, Decision, DenyReason, Enforcer, OwnableResource,
    Permission, PolicyRegistry, ResourceRef, Role, RouteTable,
};

fn enforcer() -> Enforcer {
    Enforcer::new(PolicyRegistry::standard().expect("standard registry"))
}

/// A typed application resource opting into ownership checks
struct Enrollment {
    user_id: String,
}

impl OwnableResource for Enrollment {
    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

struct Course {
    created_by: String,
}

impl OwnableResource for Course {
    fn creator_id(&self) -> Option<&str> {
        Some(&self.created_by)
    }
}

/// Implements neither ownership accessor
struct SystemSetting;

impl OwnableResource for SystemSetting {}

#[test]
fn test_role_hierarchy_via_policies() {
    let enforcer = enforcer();
    let admin = Claims::for_principal("a1", "Admin");
    let teacher = Claims::for_principal("t1", "Teacher");
    let student = Claims::for_principal("s1", "Student");

    assert_eq!(enforcer.evaluate(&admin, "Role.Teacher").unwrap(), Decision::Allow);
    assert_eq!(
        enforcer.evaluate(&student, "Role.Teacher").unwrap(),
        Decision::Deny(DenyReason::RoleTooLow)
    );
    assert_eq!(enforcer.evaluate(&teacher, "Role.Teacher").unwrap(), Decision::Allow);
    assert_eq!(enforcer.evaluate(&student, "Role.Student").unwrap(), Decision::Allow);
}

#[test]
fn test_fail_closed_for_every_requirement() {
    let enforcer = enforcer();
    let no_role = Claims::new().with("nameid", "u1");
    let bad_role = Claims::for_principal("u1", "Principal");

    for name in enforcer.registry().policy_names() {
        if name == "RequireAuthentication" {
            continue;
        }
        for claims in [&no_role, &bad_role] {
            let decision = enforcer.evaluate(claims, &name).unwrap();
            assert_eq!(decision, Decision::Deny(DenyReason::MissingRole), "policy {}", name);
        }
    }
}

#[test]
fn test_permission_policies_match_role_map() {
    let enforcer = enforcer();
    for role in Role::ALL {
        let claims = Claims::for_principal("u1", role.name());
        for permission in Permission::ALL {
            let decision = enforcer
                .evaluate(&claims, &format!("Permission.{}", permission))
                .unwrap();
            assert_eq!(decision.is_allowed(), has_permission(role, permission));
            assert_eq!(decision.is_allowed(), permissions_for(role).contains(&permission));
        }
    }
}

#[test]
fn test_role_sets_are_not_nested_by_hierarchy() {
    let teacher: &BTreeSet<Permission> = permissions_for(Role::Teacher);
    let admin = permissions_for(Role::Admin);
    assert!(teacher.is_subset(admin));
    assert!(!teacher.contains(&Permission::DeleteCourse));
    assert!(!permissions_for(Role::Student).contains(&Permission::ViewReports));
}

#[test]
fn test_resource_ownership_rules() {
    let enforcer = enforcer();
    let policy = "Permission.ViewProgress";

    let student = Claims::for_principal("u1", "Student");
    let teacher = Claims::for_principal("t1", "Teacher");
    let admin = Claims::for_principal("a1", "Admin");

    let own = Enrollment { user_id: "u1".to_string() };
    let other = Enrollment { user_id: "u2".to_string() };

    assert_eq!(
        enforcer.evaluate_with_resource(&student, policy, Some(&own)).unwrap(),
        Decision::Allow
    );
    assert_eq!(
        enforcer.evaluate_with_resource(&student, policy, Some(&other)).unwrap(),
        Decision::Deny(DenyReason::NotOwner)
    );
    assert_eq!(
        enforcer.evaluate_with_resource(&teacher, policy, Some(&other)).unwrap(),
        Decision::Allow
    );
    assert_eq!(
        enforcer.evaluate_with_resource(&admin, policy, Some(&other)).unwrap(),
        Decision::Allow
    );
}

#[test]
fn test_creator_rules() {
    let enforcer = enforcer();
    let student = Claims::for_principal("u1", "Student");
    let foreign = Course { created_by: "t9".to_string() };
    let mine = Course { created_by: "u1".to_string() };

    assert!(enforcer
        .evaluate_with_resource(&student, "Permission.ReadCourse", Some(&mine))
        .unwrap()
        .is_allowed());
    assert!(!enforcer
        .evaluate_with_resource(&student, "Permission.ReadCourse", Some(&foreign))
        .unwrap()
        .is_allowed());
    // Permission check comes before ownership
    assert_eq!(
        enforcer
            .evaluate_with_resource(&student, "Permission.UpdateCourse", Some(&mine))
            .unwrap(),
        Decision::Deny(DenyReason::PermissionNotGranted)
    );
}

#[test]
fn test_unowned_resource_defaults_to_allow() {
    let enforcer = enforcer();
    let student = Claims::for_principal("u1", "Student");
    assert_eq!(
        enforcer
            .evaluate_with_resource(&student, "Permission.ReadLesson", Some(&SystemSetting))
            .unwrap(),
        Decision::Allow
    );
}

#[test]
fn test_evaluation_is_idempotent() {
    let enforcer = enforcer();
    let student = Claims::for_principal("u1", "Student");
    let other = ResourceRef::owned_by("u2");

    let first = enforcer
        .evaluate_with_resource(&student, "Permission.ReadUser", Some(&other))
        .unwrap();
    let second = enforcer
        .evaluate_with_resource(&student, "Permission.ReadUser", Some(&other))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_evaluation() {
    let enforcer = Arc::new(enforcer());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let enforcer = Arc::clone(&enforcer);
            thread::spawn(move || {
                let user = format!("u{}", i);
                let claims = Claims::for_principal(&user, "Student");
                let own = ResourceRef::owned_by(&user);
                let other = ResourceRef::owned_by("someone-else");
                for _ in 0..200 {
                    assert!(enforcer
                        .evaluate_with_resource(&claims, "Permission.ViewProgress", Some(&own))
                        .unwrap()
                        .is_allowed());
                    assert!(!enforcer
                        .evaluate_with_resource(&claims, "Permission.ViewProgress", Some(&other))
                        .unwrap()
                        .is_allowed());
                    assert!(!enforcer.evaluate(&claims, "AdminOnly").unwrap().is_allowed());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("evaluator thread panicked");
    }
}

#[test]
fn test_policy_names_cover_catalog_exactly() {
    let names = enforcer().registry().policy_names();

    let permission_names: Vec<_> = names.iter().filter(|n| n.starts_with("Permission.")).collect();
    let role_names: Vec<_> = names.iter().filter(|n| n.starts_with("Role.")).collect();
    assert_eq!(permission_names.len(), Permission::ALL.len());
    assert_eq!(role_names.len(), Role::ALL.len());

    let fixed: Vec<_> = names
        .iter()
        .filter(|n| !n.starts_with("Permission.") && !n.starts_with("Role."))
        .map(String::as_str)
        .collect();
    assert_eq!(fixed, vec!["RequireAuthentication", "AdminOnly", "TeacherOrAdmin"]);
}

#[test]
fn test_route_table_dispatch() {
    let enforcer = enforcer();
    let routes = RouteTable::builder(enforcer.registry())
        .guard("DELETE /api/users/{id}", "Permission.DeleteUser")
        .and_then(|b| b.guard("GET /api/reports", "TeacherOrAdmin"))
        .expect("valid routes")
        .build();

    let teacher = Claims::for_principal("t1", "Teacher");
    let policy = routes.policy_for("DELETE /api/users/{id}").unwrap();
    assert!(!enforcer.evaluate(&teacher, policy).unwrap().is_allowed());

    let policy = routes.policy_for("GET /api/reports").unwrap();
    assert!(enforcer.evaluate(&teacher, policy).unwrap().is_allowed());
}

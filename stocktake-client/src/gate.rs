//! Role-based permission policy
//!
//! A pure first-match policy over the built-in roles. Custom or unresolved
//! roles never reach this function; role resolution maps them to
//! [`Role::Viewer`] beforehand.

use stocktake_api_types::{Action, Resource, Role};

/// Resources managers administer and staff can read.
const OPERATIONS: [Resource; 3] = [Resource::Assets, Resource::Employees, Resource::Assignments];

/// Decide whether `role` may perform `action` on `resource`.
pub fn allows(role: Role, resource: Resource, action: Action) -> bool {
    match role {
        Role::SuperAdmin => true,
        Role::TenantAdmin => true,
        Role::Manager => OPERATIONS.contains(&resource),
        Role::Staff => OPERATIONS.contains(&resource) && action == Action::Read,
        Role::Viewer => action == Action::Read,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn allowed_count(role: Role) -> usize {
        Resource::ALL
            .iter()
            .flat_map(|r| Action::ALL.iter().map(move |a| (*r, *a)))
            .filter(|(r, a)| allows(role, *r, *a))
            .count()
    }

    #[test]
    fn admins_are_unrestricted() {
        assert_eq!(allowed_count(Role::SuperAdmin), 35);
        assert_eq!(allowed_count(Role::TenantAdmin), 35);
    }

    #[test]
    fn manager_controls_operations_resources_only() {
        // 3 resources x 5 actions
        assert_eq!(allowed_count(Role::Manager), 15);
        assert!(allows(Role::Manager, Resource::Assets, Action::Delete));
        assert!(allows(Role::Manager, Resource::Assignments, Action::Manage));
        assert!(!allows(Role::Manager, Resource::Users, Action::Read));
        assert!(!allows(Role::Manager, Resource::Settings, Action::Update));
    }

    #[test]
    fn staff_reads_operations_resources_only() {
        assert_eq!(allowed_count(Role::Staff), 3);
        assert!(allows(Role::Staff, Resource::Assets, Action::Read));
        assert!(!allows(Role::Staff, Resource::Assets, Action::Update));
        assert!(!allows(Role::Staff, Resource::AuditLogs, Action::Read));
    }

    #[test]
    fn viewer_reads_everything_and_writes_nothing() {
        // 7 resources, read only
        assert_eq!(allowed_count(Role::Viewer), 7);
        assert!(allows(Role::Viewer, Resource::AuditLogs, Action::Read));
        assert!(allows(Role::Viewer, Resource::Users, Action::Read));
        assert!(!allows(Role::Viewer, Resource::Assets, Action::Create));
        assert!(!allows(Role::Viewer, Resource::Roles, Action::Manage));
    }

    #[test]
    fn no_role_writes_without_an_explicit_grant() {
        for resource in Resource::ALL {
            for action in Action::ALL {
                if *action == Action::Read {
                    continue;
                }
                assert!(!allows(Role::Viewer, *resource, *action));
                assert!(!allows(Role::Staff, *resource, *action));
            }
        }
    }

    proptest! {
        /// Grants only narrow along staff < manager < tenant_admin, and no
        /// write ever reaches staff or viewer.
        #[test]
        fn grants_narrow_with_weaker_roles(resource_index in 0usize..7, action_index in 0usize..5) {
            let resource = Resource::ALL[resource_index];
            let action = Action::ALL[action_index];
            if allows(Role::Staff, resource, action) {
                prop_assert!(allows(Role::Manager, resource, action));
            }
            if allows(Role::Manager, resource, action) {
                prop_assert!(allows(Role::TenantAdmin, resource, action));
            }
            if action != Action::Read {
                prop_assert!(!allows(Role::Staff, resource, action));
                prop_assert!(!allows(Role::Viewer, resource, action));
            }
        }
    }
}

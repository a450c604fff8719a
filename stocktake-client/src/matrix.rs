//! Permission matrix editing
//!
//! In-memory editing buffer for a role's grants, used by the console's role
//! commands. The backend stores grants as resource → action set; `manage` is
//! an umbrella that implies every action and never coexists with explicit
//! actions in the stored set.

use stocktake_api_types::{Action, PermissionGrants, Resource};

/// Editable view over a role's permission grants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionMatrix {
    grants: PermissionGrants,
}

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_grants(grants: PermissionGrants) -> Self {
        Self { grants }
    }

    pub fn grants(&self) -> &PermissionGrants {
        &self.grants
    }

    pub fn into_grants(self) -> PermissionGrants {
        self.grants
    }

    /// Flip one action on a resource.
    ///
    /// Toggling `manage` replaces the whole set: on when absent, empty when
    /// present. Toggling an explicit action while `manage` is present first
    /// expands `manage` into all explicit actions, then applies the toggle,
    /// so the clicked action ends up off and the rest stay on.
    pub fn toggle(&mut self, resource: Resource, action: Action) {
        let actions = self.grants.entry(resource).or_default();

        if action == Action::Manage {
            let had_manage = actions.contains(&Action::Manage);
            actions.clear();
            if !had_manage {
                actions.insert(Action::Manage);
            }
            return;
        }

        if actions.remove(&Action::Manage) {
            for explicit in Action::ALL {
                if *explicit != Action::Manage {
                    actions.insert(*explicit);
                }
            }
        }
        if !actions.insert(action) {
            actions.remove(&action);
        }
    }

    /// Whether the edited grants allow `action` on `resource`; `manage`
    /// implies every action.
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        self.grants
            .get(&resource)
            .is_some_and(|actions| actions.contains(&Action::Manage) || actions.contains(&action))
    }
}

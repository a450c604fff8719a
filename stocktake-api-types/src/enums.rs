use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing a closed enum from console or config input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[$docs:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$docs])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Console input is forgiving about case and hyphens.
                let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
                match normalized.as_str() {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Built-in access roles, ordered from most to least privileged.
    Role {
        SuperAdmin => "super_admin",
        TenantAdmin => "tenant_admin",
        Manager => "manager",
        Staff => "staff",
        Viewer => "viewer",
    }
);

wire_enum!(
    /// Permission-bearing resource categories.
    Resource {
        Assets => "assets",
        Employees => "employees",
        Assignments => "assignments",
        Users => "users",
        Roles => "roles",
        Settings => "settings",
        AuditLogs => "audit_logs",
    }
);

wire_enum!(
    /// Actions a role can be granted on a resource. `Manage` implies all of
    /// the others and never coexists with them in a stored grant.
    Action {
        Create => "create",
        Read => "read",
        Update => "update",
        Delete => "delete",
        Manage => "manage",
    }
);

wire_enum!(
    /// Lifecycle state of an inventory asset.
    AssetStatus {
        Available => "available",
        Assigned => "assigned",
        Maintenance => "maintenance",
        Retired => "retired",
    }
);

wire_enum!(
    AssignmentStatus {
        Active => "active",
        Returned => "returned",
    }
);

wire_enum!(
    /// Activation state of a user account. Deleting a user is really a
    /// transition to `inactive`.
    AccountStatus {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
);

wire_enum!(
    TenantStatus {
        Active => "active",
        Suspended => "suspended",
        Deleted => "deleted",
    }
);

wire_enum!(
    SubscriptionPlan {
        Free => "free",
        Trial => "trial",
        Basic => "basic",
        Premium => "premium",
        Enterprise => "enterprise",
    }
);

wire_enum!(
    SubscriptionStatus {
        Active => "active",
        Cancelled => "cancelled",
        Expired => "expired",
    }
);

wire_enum!(
    InvoiceStatus {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_to_wire_strings() {
        assert_eq!(serde_json::to_string(&Role::TenantAdmin).unwrap(), "\"tenant_admin\"");
        assert_eq!(serde_json::to_string(&Resource::AuditLogs).unwrap(), "\"audit_logs\"");
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
    }

    #[test]
    fn parsing_tolerates_case_and_hyphens() {
        assert_eq!("Tenant-Admin".parse::<Role>().unwrap(), Role::TenantAdmin);
        assert_eq!("audit-logs".parse::<Resource>().unwrap(), Resource::AuditLogs);
        assert_eq!(" manage ".parse::<Action>().unwrap(), Action::Manage);
    }

    #[test]
    fn parse_error_names_the_offender() {
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown Role 'owner'");
    }

    #[test]
    fn display_round_trips_through_parse() {
        for status in AssetStatus::ALL {
            assert_eq!(status.to_string().parse::<AssetStatus>().unwrap(), *status);
        }
    }
}

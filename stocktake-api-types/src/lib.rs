//! Wire types for the Stocktake asset management API.
//!
//! This crate holds the types shared between the REST client and the console:
//! typed ids, the closed role/resource/action vocabulary, domain payloads
//! matching the backend's snake_case JSON, and request envelopes including
//! the tri-state [`FieldEdit`] used for partial updates.

pub mod domain;
pub mod edit;
pub mod enums;
pub mod ids;
pub mod requests;

// Re-export main types for convenience
pub use domain::{
    Asset, Assignment, AssignmentWithDetails, AuditLog, Employee, Invoice, PermissionGrants,
    RoleDefinition, Subscription, Tenant, User, UserInfo,
};
pub use edit::FieldEdit;
pub use enums::{
    AccountStatus, Action, AssetStatus, AssignmentStatus, InvoiceStatus, Resource, Role,
    SubscriptionPlan, SubscriptionStatus, TenantStatus, UnknownVariant,
};
pub use ids::{
    AssetId, AssignmentId, AuditLogId, EmployeeId, InvoiceId, RoleId, SubscriptionId, TenantId,
    UserId,
};
pub use requests::{
    AssetFilter, AssignmentFilter, AuditLogFilter, ChangeRoleResponse, CreateAsset,
    CreateAssignment, CreateEmployee, CreateRole, CreateUser, EmployeeFilter, MessageResponse,
    ReturnAssignment, SignupRequest, SignupResponse, UpdateAsset, UpdateEmployee, UpdateRole,
    UpdateTenant, UpdateUser, UpgradeResponse, UserFilter,
};

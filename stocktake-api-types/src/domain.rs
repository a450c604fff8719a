use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::enums::*;
use crate::ids::*;

/// Stored permission grants of a role: resource to granted actions.
///
/// Ordered maps keep serialization deterministic, which matters for the
/// matrix editor's change detection and for test fixtures.
pub type PermissionGrants = BTreeMap<Resource, BTreeSet<Action>>;

/// Tenant organization, including its subscription summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    pub theme: Option<serde_json::Value>,
    pub status: TenantStatus,
    pub subscription_plan: SubscriptionPlan,
    pub subscription_status: SubscriptionStatus,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub settings: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated caller as reported by `GET /api/auth/me`.
///
/// `role` is parsed leniently: a role name outside the built-in set reads as
/// `None`, which downstream resolution treats the same as "no role yet".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub tenant_id: Option<TenantId>,
    #[serde(default, deserialize_with = "lenient_role")]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: Option<AccountStatus>,
}

fn lenient_role<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Role>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| s.parse().ok()))
}

/// Tenant user record as returned by the user administration endpoints.
///
/// Unlike [`UserInfo`] the role keeps its raw wire string so custom role
/// names defined by the tenant still display in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub role: String,
    pub status: AccountStatus,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inventory asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    pub asset_tag: String,
    pub name: String,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<f64>,
    pub status: AssetStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee an asset can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single hand-out of an asset to an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub asset_id: AssetId,
    pub employee_id: EmployeeId,
    pub assigned_by: Option<UserId>,
    pub assigned_date: NaiveDate,
    pub returned_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignment enriched with display names by the list/detail endpoints.
///
/// Create and return responses carry the bare assignment, so the enrichment
/// fields are optional and the core record is flattened in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentWithDetails {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub asset_name: Option<String>,
    pub asset_tag: Option<String>,
    pub employee_name: Option<String>,
}

/// Role definition with its permission grants. System roles are seeded at
/// tenant signup and cannot be modified or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: RoleId,
    pub tenant_id: Option<TenantId>,
    pub name: String,
    #[serde(default)]
    pub permissions: PermissionGrants,
    pub is_system_role: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub tenant_id: TenantId,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Billing invoice attached to a subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub tenant_id: TenantId,
    pub subscription_id: Option<SubscriptionId>,
    pub amount: f64,
    pub currency: String,
    pub status: InvoiceStatus,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable audit trail entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub tenant_id: Option<TenantId>,
    pub user_id: Option<UserId>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::edit::FieldEdit;
use crate::enums::*;
use crate::ids::*;

// Update payloads use two shapes per field. Fields the backend requires are
// `Option<T>`: absent means unchanged and clearing is impossible by
// construction. Nullable fields are `FieldEdit<T>` so callers can also erase
// the stored value with an explicit null.

/// Payload for `POST /api/assets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAsset {
    pub asset_tag: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    /// Defaults to `available` server-side when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AssetStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for `PUT /api/assets/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAsset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub brand: FieldEdit<String>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub model: FieldEdit<String>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub serial_number: FieldEdit<String>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub purchase_date: FieldEdit<NaiveDate>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub purchase_price: FieldEdit<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AssetStatus>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub notes: FieldEdit<String>,
}

/// Payload for `POST /api/employees`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEmployee {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// Payload for `PUT /api/employees/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEmployee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub department: FieldEdit<String>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub position: FieldEdit<String>,
}

/// Payload for `POST /api/assignments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssignment {
    pub asset_id: AssetId,
    pub employee_id: EmployeeId,
    pub assigned_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for `PUT /api/assignments/{id}/return`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReturnAssignment {
    /// Defaults to today server-side when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Payload for `POST /api/users`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    /// Omitted means the backend generates an invite password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
}

/// Payload for `PUT /api/users/{id}`. Role changes go through the dedicated
/// change-role endpoint instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub mobile: FieldEdit<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
}

/// Payload for `POST /api/roles`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub permissions: crate::domain::PermissionGrants,
}

/// Payload for `PUT /api/roles/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRole {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<crate::domain::PermissionGrants>,
}

/// Payload for `PUT /api/tenants/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTenant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "FieldEdit::is_unchanged")]
    pub logo_url: FieldEdit<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
}

/// Payload for `POST /api/auth/signup`: provisions a tenant together with
/// its first tenant_admin user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub organization_name: String,
}

/// Response of `POST /api/auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub email: String,
    pub message: String,
}

/// Confirmation envelope returned by destructive endpoints that do not echo
/// a record (user deactivation, role deletion, subscription cancellation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response of `POST /api/users/{id}/change-role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleResponse {
    pub message: String,
    pub user: crate::domain::User,
}

/// Response of `POST /api/subscription/upgrade`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeResponse {
    pub message: String,
    pub subscription: crate::domain::Subscription,
}

// List filters below map to query parameters; `None` fields are left off the
// request entirely.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetFilter {
    pub status: Option<AssetStatus>,
    pub category: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentFilter {
    pub status: Option<AssignmentStatus>,
    pub asset_id: Option<AssetId>,
    pub employee_id: Option<EmployeeId>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLogFilter {
    pub user_id: Option<UserId>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_asset_omits_unchanged_nulls_cleared_and_sets_values() {
        let update = UpdateAsset {
            name: Some("MacBook Air M3".to_string()),
            serial_number: FieldEdit::Clear,
            purchase_price: FieldEdit::Set(1299.0),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "MacBook Air M3",
                "serial_number": null,
                "purchase_price": 1299.0
            })
        );
    }

    #[test]
    fn untouched_update_serializes_to_empty_object() {
        let value = serde_json::to_value(UpdateEmployee::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn create_asset_skips_absent_optionals() {
        let create = CreateAsset {
            asset_tag: "LT-0001".to_string(),
            name: "ThinkPad T14".to_string(),
            category: "laptop".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&create).unwrap();
        assert_eq!(
            value,
            json!({ "asset_tag": "LT-0001", "name": "ThinkPad T14", "category": "laptop" })
        );
    }
}

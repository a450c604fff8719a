//! Console command implementations, one module per command category

use stocktake_api_types::FieldEdit;

pub mod asset;
pub mod assignment;
pub mod audit;
pub mod auth;
pub mod dashboard;
pub mod employee;
pub mod role;
pub mod subscription;
pub mod tenant;
pub mod user;

pub use asset::AssetCommand;
pub use assignment::AssignmentCommand;
pub use audit::AuditCommand;
pub use auth::AuthCommand;
pub use dashboard::DashboardCommand;
pub use employee::EmployeeCommand;
pub use role::RoleCommand;
pub use subscription::SubscriptionCommand;
pub use tenant::TenantCommand;
pub use user::UserCommand;

/// Record a tri-state field edit in an update command's change summary.
pub(crate) fn note_edit<T: std::fmt::Display>(
    changes: &mut Vec<String>,
    field: &str,
    edit: &FieldEdit<T>,
) {
    match edit {
        FieldEdit::Unchanged => {}
        FieldEdit::Clear => changes.push(format!("{} -> (cleared)", field)),
        FieldEdit::Set(value) => changes.push(format!("{} -> {}", field, value)),
    }
}

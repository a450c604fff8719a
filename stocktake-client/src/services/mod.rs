//! Typed domain services
//!
//! One stateless wrapper per backend resource. Every operation is a single
//! HTTP call through the shared [`ApiTransport`](crate::transport::ApiTransport);
//! there are no retries, no caching and no batching at this layer.

pub mod assets;
pub mod assignments;
pub mod audit;
pub mod auth;
pub mod employees;
pub mod roles;
pub mod subscriptions;
pub mod tenants;
pub mod users;

pub use assets::AssetService;
pub use assignments::AssignmentService;
pub use audit::AuditService;
pub use auth::AuthService;
pub use employees::EmployeeService;
pub use roles::RoleService;
pub use subscriptions::SubscriptionService;
pub use tenants::TenantService;
pub use users::UserService;

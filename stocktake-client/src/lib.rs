//! Stocktake API client
//!
//! The client side of the Stocktake asset management system: a session
//! provider over a GoTrue-compatible identity API, post-sign-in user/tenant
//! resolution, an advisory role-based permission gate, a permission-matrix
//! editor, and typed domain services that all share one HTTP transport with
//! centralized error mapping.
//!
//! Authorization here is advisory: the gate decides what the console offers,
//! while the backend remains the authority on every request.

pub mod client;
pub mod errors;
pub mod gate;
pub mod matrix;
pub mod resolver;
pub mod services;
pub mod session;
pub mod transport;

// Re-export the handle and the types callers touch routinely
pub use client::StocktakeClient;
pub use errors::{ClientError, ClientResult};
pub use matrix::PermissionMatrix;
pub use resolver::{AuthContext, ContextSnapshot, RoleResolution};
pub use session::{IdentityUser, Session, SessionEvent, SessionProvider, TokenSource};
pub use transport::ApiTransport;

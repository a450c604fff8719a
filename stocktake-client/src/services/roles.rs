//! Role definition endpoints
//!
//! System roles are seeded at signup and rejected for update/delete by the
//! backend; the console additionally hides those affordances.

use stocktake_api_types::{CreateRole, MessageResponse, RoleDefinition, RoleId, UpdateRole};

use crate::errors::ClientResult;
use crate::transport::ApiTransport;

pub struct RoleService<'a> {
    transport: &'a ApiTransport,
}

impl<'a> RoleService<'a> {
    pub(crate) fn new(transport: &'a ApiTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self) -> ClientResult<Vec<RoleDefinition>> {
        self.transport.get("/api/roles").await
    }

    pub async fn get(&self, id: RoleId) -> ClientResult<RoleDefinition> {
        self.transport.get(&format!("/api/roles/{id}")).await
    }

    pub async fn create(&self, request: &CreateRole) -> ClientResult<RoleDefinition> {
        self.transport.post("/api/roles", request).await
    }

    pub async fn update(&self, id: RoleId, request: &UpdateRole) -> ClientResult<RoleDefinition> {
        self.transport.put(&format!("/api/roles/{id}"), request).await
    }

    pub async fn delete(&self, id: RoleId) -> ClientResult<MessageResponse> {
        self.transport.delete_json(&format!("/api/roles/{id}")).await
    }
}

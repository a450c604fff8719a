//! Tenant user administration endpoints

use stocktake_api_types::{
    ChangeRoleResponse, CreateUser, MessageResponse, Role, UpdateUser, User, UserFilter, UserId,
};

use crate::errors::ClientResult;
use crate::transport::ApiTransport;

pub struct UserService<'a> {
    transport: &'a ApiTransport,
}

impl<'a> UserService<'a> {
    pub(crate) fn new(transport: &'a ApiTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self, filter: &UserFilter) -> ClientResult<Vec<User>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(skip) = filter.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        self.transport.get_query("/api/users", &query).await
    }

    pub async fn get(&self, id: UserId) -> ClientResult<User> {
        self.transport.get(&format!("/api/users/{id}")).await
    }

    pub async fn create(&self, request: &CreateUser) -> ClientResult<User> {
        self.transport.post("/api/users", request).await
    }

    pub async fn update(&self, id: UserId, request: &UpdateUser) -> ClientResult<User> {
        self.transport.put(&format!("/api/users/{id}"), request).await
    }

    /// Soft delete: the backend flips the account to `inactive` and answers
    /// with a confirmation message.
    pub async fn deactivate(&self, id: UserId) -> ClientResult<MessageResponse> {
        self.transport.delete_json(&format!("/api/users/{id}")).await
    }

    /// Role changes go through a dedicated endpoint; the new role travels as
    /// a query parameter.
    pub async fn change_role(&self, id: UserId, new_role: Role) -> ClientResult<ChangeRoleResponse> {
        let query = [("new_role", new_role.to_string())];
        self.transport
            .post_query(&format!("/api/users/{id}/change-role"), &query)
            .await
    }
}

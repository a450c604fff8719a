//! Assignment endpoints
//!
//! List and detail responses arrive enriched with asset/employee display
//! names; create and return echo the bare assignment record.

use stocktake_api_types::{
    Assignment, AssignmentFilter, AssignmentId, AssignmentWithDetails, CreateAssignment,
    ReturnAssignment,
};

use crate::errors::ClientResult;
use crate::transport::ApiTransport;

pub struct AssignmentService<'a> {
    transport: &'a ApiTransport,
}

impl<'a> AssignmentService<'a> {
    pub(crate) fn new(transport: &'a ApiTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self, filter: &AssignmentFilter) -> ClientResult<Vec<AssignmentWithDetails>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = filter.status {
            query.push(("status", status.to_string()));
        }
        if let Some(asset_id) = filter.asset_id {
            query.push(("asset_id", asset_id.to_string()));
        }
        if let Some(employee_id) = filter.employee_id {
            query.push(("employee_id", employee_id.to_string()));
        }
        if let Some(skip) = filter.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        self.transport.get_query("/api/assignments", &query).await
    }

    pub async fn get(&self, id: AssignmentId) -> ClientResult<AssignmentWithDetails> {
        self.transport.get(&format!("/api/assignments/{id}")).await
    }

    /// The backend requires the asset to be `available` and the employee to
    /// exist; violations come back as validation errors with a detail.
    pub async fn create(&self, request: &CreateAssignment) -> ClientResult<Assignment> {
        self.transport.post("/api/assignments", request).await
    }

    /// Mark an assignment returned. The returned date defaults to today
    /// server-side when omitted.
    pub async fn return_asset(
        &self,
        id: AssignmentId,
        request: &ReturnAssignment,
    ) -> ClientResult<Assignment> {
        self.transport
            .put(&format!("/api/assignments/{id}/return"), request)
            .await
    }
}

//! Audit log endpoints (read-only)

use stocktake_api_types::{AuditLog, AuditLogFilter, AuditLogId};

use crate::errors::ClientResult;
use crate::transport::ApiTransport;

pub struct AuditService<'a> {
    transport: &'a ApiTransport,
}

impl<'a> AuditService<'a> {
    pub(crate) fn new(transport: &'a ApiTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self, filter: &AuditLogFilter) -> ClientResult<Vec<AuditLog>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(user_id) = filter.user_id {
            query.push(("user_id", user_id.to_string()));
        }
        if let Some(action) = &filter.action {
            query.push(("action", action.clone()));
        }
        if let Some(resource_type) = &filter.resource_type {
            query.push(("resource_type", resource_type.clone()));
        }
        if let Some(start_date) = filter.start_date {
            query.push(("start_date", start_date.to_string()));
        }
        if let Some(end_date) = filter.end_date {
            query.push(("end_date", end_date.to_string()));
        }
        if let Some(skip) = filter.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        self.transport.get_query("/api/audit-logs", &query).await
    }

    pub async fn get(&self, id: AuditLogId) -> ClientResult<AuditLog> {
        self.transport.get(&format!("/api/audit-logs/{id}")).await
    }
}

//! Subscription and billing endpoints

use stocktake_api_types::{
    Invoice, MessageResponse, Subscription, SubscriptionPlan, UpgradeResponse,
};

use crate::errors::ClientResult;
use crate::transport::ApiTransport;

pub struct SubscriptionService<'a> {
    transport: &'a ApiTransport,
}

impl<'a> SubscriptionService<'a> {
    pub(crate) fn new(transport: &'a ApiTransport) -> Self {
        Self { transport }
    }

    pub async fn current(&self) -> ClientResult<Subscription> {
        self.transport.get("/api/subscription").await
    }

    /// Switch plans; the backend opens a fresh 30-day period.
    pub async fn upgrade(&self, plan: SubscriptionPlan) -> ClientResult<UpgradeResponse> {
        let query = [("plan", plan.to_string())];
        self.transport
            .post_query("/api/subscription/upgrade", &query)
            .await
    }

    /// Cancel at period end; the subscription stays active until then.
    pub async fn cancel(&self) -> ClientResult<MessageResponse> {
        self.transport.post_query("/api/subscription/cancel", &[]).await
    }

    /// Invoices are admin-only; other roles receive a Forbidden error.
    pub async fn invoices(&self) -> ClientResult<Vec<Invoice>> {
        self.transport.get("/api/subscription/invoices").await
    }
}

//! Asset endpoints

use stocktake_api_types::{Asset, AssetFilter, AssetId, AssetStatus, CreateAsset, UpdateAsset};

use crate::errors::ClientResult;
use crate::transport::ApiTransport;

pub struct AssetService<'a> {
    transport: &'a ApiTransport,
}

impl<'a> AssetService<'a> {
    pub(crate) fn new(transport: &'a ApiTransport) -> Self {
        Self { transport }
    }

    pub async fn list(&self, filter: &AssetFilter) -> ClientResult<Vec<Asset>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = filter.status {
            query.push(("status", status.to_string()));
        }
        if let Some(category) = &filter.category {
            query.push(("category", category.clone()));
        }
        if let Some(skip) = filter.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = filter.limit {
            query.push(("limit", limit.to_string()));
        }
        self.transport.get_query("/api/assets", &query).await
    }

    /// Assets currently eligible for a new assignment.
    pub async fn assignable(&self) -> ClientResult<Vec<Asset>> {
        self.list(&AssetFilter {
            status: Some(AssetStatus::Available),
            ..Default::default()
        })
        .await
    }

    pub async fn get(&self, id: AssetId) -> ClientResult<Asset> {
        self.transport.get(&format!("/api/assets/{id}")).await
    }

    pub async fn create(&self, request: &CreateAsset) -> ClientResult<Asset> {
        self.transport.post("/api/assets", request).await
    }

    pub async fn update(&self, id: AssetId, request: &UpdateAsset) -> ClientResult<Asset> {
        self.transport.put(&format!("/api/assets/{id}"), request).await
    }

    pub async fn delete(&self, id: AssetId) -> ClientResult<()> {
        self.transport.delete(&format!("/api/assets/{id}")).await
    }
}

//! Storage endpoint service.

use crate::gateway::Gateway;
use crate::models::StorageEndpoint;

const STORAGE_ENDPOINTS_PATH: &str = "storage/storageendpoints.svc/";

pub struct StorageEndpointService<'a> {
    gateway: &'a Gateway,
}

impl<'a> StorageEndpointService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    pub async fn get_storage_endpoints(&self, suppress_errors: bool) -> Vec<StorageEndpoint> {
        let url = self.gateway.config().api_url(STORAGE_ENDPOINTS_PATH);
        self.gateway
            .get::<Vec<StorageEndpoint>>(&url, &[], suppress_errors, false)
            .await
            .unwrap_or_default()
    }

    /// Find an active storage endpoint by id.
    pub async fn find_active(&self, storage_endpoint_id: &str) -> Option<StorageEndpoint> {
        self.get_storage_endpoints(true)
            .await
            .into_iter()
            .find(|endpoint| endpoint.active && endpoint.id == storage_endpoint_id)
    }
}

/// The default active endpoint, falling back to the first one listed.
pub fn default_endpoint(endpoints: &[StorageEndpoint]) -> Option<&StorageEndpoint> {
    endpoints
        .iter()
        .find(|endpoint| endpoint.default && endpoint.active)
        .or_else(|| endpoints.first())
}

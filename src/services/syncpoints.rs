//! Syncpoint service.

use crate::gateway::Gateway;
use crate::models::SyncPoint;

const SYNCPOINTS_PATH: &str = "syncpoint/syncpoints.svc/";
const SYNCPOINT_PATH: &str = "syncpoint/syncpoint.svc/";

/// Client for `syncpoints.svc` and `syncpoint.svc`.
pub struct SyncPointService<'a> {
    gateway: &'a Gateway,
}

impl<'a> SyncPointService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    fn syncpoint_url(&self, syncpoint_id: i64) -> String {
        format!("{}{}", self.gateway.config().api_url(SYNCPOINT_PATH), syncpoint_id)
    }

    /// List the syncpoints visible to the user.
    pub async fn get_syncpoints(&self, suppress_errors: bool) -> Vec<SyncPoint> {
        let url = self.gateway.config().api_url(SYNCPOINTS_PATH);
        self.gateway
            .get::<Vec<SyncPoint>>(&url, &[], suppress_errors, false)
            .await
            .unwrap_or_default()
    }

    pub async fn get_syncpoint(&self, syncpoint_id: i64, suppress_errors: bool) -> Option<SyncPoint> {
        self.gateway
            .get(&self.syncpoint_url(syncpoint_id), &[], suppress_errors, false)
            .await
    }

    /// Create syncpoints and return the created records.
    pub async fn create_syncpoints(&self, syncpoints: &[SyncPoint]) -> Vec<SyncPoint> {
        let url = self.gateway.config().api_url(SYNCPOINTS_PATH);
        self.gateway
            .post_json::<_, Vec<SyncPoint>>(&url, syncpoints)
            .await
            .unwrap_or_default()
    }

    pub async fn update_syncpoint(&self, syncpoint: &SyncPoint) -> Option<SyncPoint> {
        self.gateway
            .put(&self.syncpoint_url(syncpoint.id), syncpoint)
            .await
    }

    /// Delete a syncpoint. Its folders should be deleted first.
    pub async fn delete_syncpoint(&self, syncpoint_id: i64) {
        let _: Option<SyncPoint> = self.gateway.delete(&self.syncpoint_url(syncpoint_id)).await;
    }
}

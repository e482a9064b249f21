//! Folder service.

use crate::gateway::Gateway;
use crate::models::Folder;

/// Client for `folder_folders.svc` and `folder.svc`.
pub struct FolderService<'a> {
    gateway: &'a Gateway,
}

impl<'a> FolderService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    fn folder_url(&self, syncpoint_id: i64, folder_id: i64) -> String {
        self.gateway.config().api_url(&format!(
            "sync/folder.svc/{}/folder/{}?include=active",
            syncpoint_id, folder_id
        ))
    }

    /// Create folders under `parent_folder_id` and return the created records.
    pub async fn create_folders(
        &self,
        syncpoint_id: i64,
        parent_folder_id: i64,
        folders: &[Folder],
    ) -> Vec<Folder> {
        let url = self.gateway.config().api_url(&format!(
            "sync/folder_folders.svc/{}/folder/{}/folders",
            syncpoint_id, parent_folder_id
        ));
        self.gateway
            .post_json::<_, Vec<Folder>>(&url, folders)
            .await
            .unwrap_or_default()
    }

    /// Retrieve a folder together with its active files and subfolders.
    pub async fn get_folder(
        &self,
        syncpoint_id: i64,
        folder_id: i64,
        suppress_errors: bool,
    ) -> Option<Folder> {
        self.gateway
            .get(&self.folder_url(syncpoint_id, folder_id), &[], suppress_errors, false)
            .await
    }

    pub async fn delete_folder(&self, syncpoint_id: i64, folder_id: i64) {
        let _: Option<Folder> = self
            .gateway
            .delete(&self.folder_url(syncpoint_id, folder_id))
            .await;
    }
}

//! Content API walkthrough: syncpoints, folders, files and share links.

use tracing::{error, info, warn};

use crate::gateway::Gateway;
use crate::models::{
    File, Folder, FolderStatus, Link, LinkExpirationPolicy, PasswordProtectPolicy,
    ShareLinkPolicy, SyncPoint, SyncPointType,
};
use crate::services::storage::default_endpoint;

const SYNCPOINT_NAME: &str = "NewSyncPoint";
const FOLDER_NAME: &str = "NewFolder";
const DEFAULT_FILE_NAME: &str = "newFile.txt";
const DEFAULT_FILE_BODY: &[u8] = b"file body";
const LINK_EXPIRE_IN_DAYS: u32 = 2;

/// Runs the content walkthrough, carrying identifiers from step to step.
pub struct ContentSample<'a> {
    gateway: &'a Gateway,
    created_syncpoint: Option<SyncPoint>,
    created_folder: Option<Folder>,
    uploaded_file: Option<File>,
    generated_link: Option<Link>,
}

impl<'a> ContentSample<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self {
            gateway,
            created_syncpoint: None,
            created_folder: None,
            uploaded_file: None,
            generated_link: None,
        }
    }

    pub fn created_syncpoint(&self) -> Option<&SyncPoint> {
        self.created_syncpoint.as_ref()
    }

    pub fn created_folder(&self) -> Option<&Folder> {
        self.created_folder.as_ref()
    }

    pub fn uploaded_file(&self) -> Option<&File> {
        self.uploaded_file.as_ref()
    }

    pub fn generated_link(&self) -> Option<&Link> {
        self.generated_link.as_ref()
    }

    /// Run every step in order: list storage endpoints and syncpoints,
    /// create a syncpoint and a folder, upload, inspect and download a file,
    /// share it via a link, then delete the link, the folder and the
    /// syncpoint.
    pub async fn execute(&mut self) {
        self.get_storage_endpoints().await;
        self.get_syncpoints().await;
        self.create_syncpoint().await;
        self.create_folder().await;
        self.get_folder().await;
        self.upload_file().await;
        self.get_file().await;
        self.download_file().await;
        self.generate_link().await;
        self.get_link().await;
        self.delete_link().await;
        self.delete_folder().await;
        self.delete_syncpoint().await;
    }

    async fn get_storage_endpoints(&self) {
        let endpoints = self
            .gateway
            .storage_endpoints()
            .get_storage_endpoints(true)
            .await;
        info!("Retrieved {} storage endpoints.", endpoints.len());
    }

    async fn get_syncpoints(&self) {
        let syncpoints = self.gateway.syncpoints().get_syncpoints(true).await;
        info!("Retrieved {} syncpoints.", syncpoints.len());
    }

    async fn create_syncpoint(&mut self) {
        info!("Starting SyncPoint creation..");
        let endpoints = self
            .gateway
            .storage_endpoints()
            .get_storage_endpoints(true)
            .await;
        let Some(endpoint) = default_endpoint(&endpoints) else {
            error!("Cannot create a syncpoint as the user does not have storage endpoints.");
            return;
        };

        let syncpoint = SyncPoint {
            kind: Some(SyncPointType::Custom),
            name: SYNCPOINT_NAME.to_string(),
            mapped: Some(true),
            download_enabled: Some(true),
            upload_enabled: Some(true),
            path: Some(String::new()),
            storage_endpoint_id: endpoint.id.clone(),
            ..SyncPoint::default()
        };

        let created = self
            .gateway
            .syncpoints()
            .create_syncpoints(&[syncpoint])
            .await
            .into_iter()
            .next();

        match created {
            Some(syncpoint) => {
                info!("Finished SyncPoint creation. New SyncPoint id: {}", syncpoint.id);
                self.created_syncpoint = Some(syncpoint);
            }
            None => error!("An error occurred during SyncPoint creation."),
        }
    }

    async fn create_folder(&mut self) {
        info!("Starting Folder creation..");
        let Some(syncpoint) = &self.created_syncpoint else {
            error!("No SyncPoint was created. No Folder will be created.");
            return;
        };

        let folder = Folder {
            name: FOLDER_NAME.to_string(),
            status: Some(FolderStatus::Added),
            ..Folder::default()
        };

        let created = self
            .gateway
            .folders()
            .create_folders(syncpoint.id, syncpoint.root_folder_id, &[folder])
            .await
            .into_iter()
            .next();

        match created {
            Some(folder) => {
                info!("Finished Folder creation. New Folder id: {}", folder.folder_id);
                self.created_folder = Some(folder);
            }
            None => error!("No folder was created."),
        }
    }

    async fn get_folder(&self) {
        let (Some(syncpoint), Some(folder)) = (&self.created_syncpoint, &self.created_folder)
        else {
            warn!("No Folder was created. Nothing to retrieve.");
            return;
        };

        let retrieved = self
            .gateway
            .folders()
            .get_folder(syncpoint.id, folder.folder_id, true)
            .await;

        if retrieved.is_some() {
            info!(
                "Retrieved folder with SyncPointId={} and FolderId={}",
                syncpoint.id, folder.folder_id
            );
        } else {
            error!(
                "Could not find folder with SyncPointId={} and FolderId={}",
                syncpoint.id, folder.folder_id
            );
        }
    }

    async fn upload_file(&self) {
        info!("Starting File upload..");
        let Some(syncpoint) = &self.created_syncpoint else {
            error!("The syncpoint was not created at previous steps. No File will be uploaded.");
            return;
        };

        let Some(root_folder) = self
            .gateway
            .folders()
            .get_folder(syncpoint.id, syncpoint.root_folder_id, true)
            .await
        else {
            error!("Could not retrieve the root folder of the syncpoint. No File will be uploaded.");
            return;
        };

        let endpoint = self
            .gateway
            .storage_endpoints()
            .get_storage_endpoints(true)
            .await
            .into_iter()
            .find(|endpoint| endpoint.id == syncpoint.storage_endpoint_id);
        let Some(endpoint) = endpoint else {
            error!(
                "Storage endpoint {} of the syncpoint was not found. No File will be uploaded.",
                syncpoint.storage_endpoint_id
            );
            return;
        };
        let Some(storage_url) = endpoint.primary_url() else {
            error!("Storage endpoint {} has no URL. No File will be uploaded.", endpoint.id);
            return;
        };
        info!("Using storage endpoint {} - {}", endpoint.id, endpoint.name);

        let files = self.gateway.files();
        let result = match &self.gateway.config().upload_file_path {
            Some(path) => {
                files
                    .upload_local_file(storage_url, &root_folder.virtual_path, syncpoint.id, path)
                    .await
            }
            None => {
                files
                    .upload_file(
                        storage_url,
                        &root_folder.virtual_path,
                        DEFAULT_FILE_NAME,
                        syncpoint.id,
                        DEFAULT_FILE_BODY.to_vec(),
                    )
                    .await
            }
        };

        match result {
            Some(result) => info!("Finished File upload. File upload result: {}", result),
            None => error!("The File upload did not report a result."),
        }
    }

    async fn get_file(&mut self) {
        info!("Retrieving the 1st file in the created syncpoint..");
        let Some(syncpoint) = &self.created_syncpoint else {
            error!("The syncpoint was not created at previous steps. No file will be retrieved.");
            return;
        };

        let root_folder = self
            .gateway
            .folders()
            .get_folder(syncpoint.id, syncpoint.root_folder_id, true)
            .await;
        let Some(file_id) = root_folder
            .as_ref()
            .and_then(|folder| folder.files.first())
            .map(|file| file.file_id)
        else {
            info!("No files in the syncpoint.");
            return;
        };

        match self.gateway.files().get_file(syncpoint.id, file_id, true).await {
            Some(file) => {
                info!("Retrieved file with SyncPointId={}: {}", syncpoint.id, file);
                self.uploaded_file = Some(file);
            }
            None => error!(
                "Could not find file with SyncPointId={} and FileId={}",
                syncpoint.id, file_id
            ),
        }
    }

    async fn download_file(&self) {
        let (Some(syncpoint), Some(file)) = (&self.created_syncpoint, &self.uploaded_file) else {
            warn!("No file was retrieved at previous steps. Nothing to download.");
            return;
        };

        info!("Downloading the file {}..", file.filename);
        match self
            .gateway
            .files()
            .download_file(syncpoint.id, file.file_id, true)
            .await
        {
            Some(content) => {
                info!("Successfully downloaded the file. File size : {} Bytes.", content.len());
                info!("{}", String::from_utf8_lossy(&content));
            }
            None => error!("Could not download the file."),
        }
        info!("Finished downloading the file {}.", file.filename);
    }

    async fn generate_link(&mut self) {
        info!("Generating share link for the uploaded file..");
        let Some(file) = &self.uploaded_file else {
            error!("No files were uploaded in the new syncpoint. The link will not be generated.");
            return;
        };

        let link = Link {
            sync_point_id: file.syncpoint_id,
            virtual_path: format!("{}{}", file.virtual_path, file.filename),
            link_expire_in_days: Some(LINK_EXPIRE_IN_DAYS),
            link_expiration_policy: Some(LinkExpirationPolicy::Enabled),
            share_link_policy: Some(ShareLinkPolicy::AllowAll),
            password_protect_policy: Some(PasswordProtectPolicy::Disabled),
            ..Link::default()
        };

        let generated = self.gateway.links().generate_links(&[link]).await;
        match generated.into_iter().next() {
            Some(link) => {
                info!(
                    "Generated a link with URL = {}, token = {}.",
                    link.download_url, link.token
                );
                self.generated_link = Some(link);
            }
            None => error!("No links were generated."),
        }
    }

    async fn get_link(&self) {
        let Some(link) = &self.generated_link else {
            warn!("No share link was generated. Nothing to retrieve.");
            return;
        };

        info!("Retrieving a share link with token = {}...", link.token);
        if self.gateway.links().get_link(&link.token, true).await.is_some() {
            info!("Retrieved a share link with token = {}.", link.token);
        } else {
            error!("Could not retrieve a share link with token = {}.", link.token);
        }
    }

    async fn delete_link(&self) {
        let Some(link) = &self.generated_link else {
            warn!("No share link was generated. Nothing to delete.");
            return;
        };

        info!("Deleting a share link with token = {}...", link.token);
        self.gateway.links().delete_link(&link.token).await;
        info!("Deleted a share link with token = {}.", link.token);
    }

    async fn delete_folder(&self) {
        info!("Starting Folder deleting..");
        match (&self.created_syncpoint, &self.created_folder) {
            (Some(syncpoint), Some(folder)) => {
                self.gateway
                    .folders()
                    .delete_folder(syncpoint.id, folder.folder_id)
                    .await;
                info!("Finished Folder deleting.");
            }
            _ => info!("No Folder was created. Nothing to delete."),
        }
    }

    async fn delete_syncpoint(&self) {
        info!("Starting SyncPoint deleting..");
        match &self.created_syncpoint {
            Some(syncpoint) => {
                self.gateway.syncpoints().delete_syncpoint(syncpoint.id).await;
                info!("Finished SyncPoint deleting.");
            }
            None => info!("No SyncPoint was created. Nothing to delete."),
        }
    }
}

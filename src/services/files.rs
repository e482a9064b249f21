//! File service: metadata, upload and download.
//!
//! Metadata lives behind the API gateway, while file bytes are uploaded to
//! and downloaded from the syncpoint's storage endpoint directly.

use std::path::Path;

use chrono::{DateTime, Utc};
use reqwest::{Method, Url};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{ApiError, Result};
use crate::gateway::{ApiRequest, Credentials, Gateway, MultipartForm, STORAGE_AUTHORIZATION_HEADER};
use crate::models::File;

/// Timestamp format of the upload form, e.g. `2024-01-15T10:30Z`.
const UPLOAD_TIME_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

pub struct FileService<'a> {
    gateway: &'a Gateway,
}

impl<'a> FileService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Retrieve file metadata.
    pub async fn get_file(&self, syncpoint_id: i64, file_id: i64, suppress_errors: bool) -> Option<File> {
        let url = self
            .gateway
            .config()
            .api_url(&format!("sync/file.svc/{}/file/{}", syncpoint_id, file_id));
        self.gateway.get(&url, &[], suppress_errors, false).await
    }

    /// Upload `data` as `filename` into the folder at `folder_path`.
    ///
    /// # Arguments
    /// * `storage_endpoint_url` - Base URL of the syncpoint's storage endpoint
    /// * `folder_path` - Virtual path of the destination folder
    /// * `filename` - Name of the new file
    /// * `syncpoint_id` - The syncpoint the folder belongs to
    /// * `data` - File content
    ///
    /// Returns the raw upload result reported by the storage endpoint.
    pub async fn upload_file(
        &self,
        storage_endpoint_url: &str,
        folder_path: &str,
        filename: &str,
        syncpoint_id: i64,
        data: Vec<u8>,
    ) -> Option<String> {
        let file_path = format!("{}{}", folder_path, filename);
        let url = match upload_url(storage_endpoint_url, &file_path) {
            Ok(url) => url,
            Err(err) => {
                warn!(storage_endpoint_url, error = %err, "Could not build the upload URL");
                return None;
            }
        };

        let form = upload_form(filename, data, syncpoint_id, Utc::now());
        let request = self
            .storage_request(Method::POST, url.as_str())
            .multipart(form);

        self.gateway.fetch_text(&request).await
    }

    /// Upload a local file into the folder at `folder_path`.
    pub async fn upload_local_file<P: AsRef<Path>>(
        &self,
        storage_endpoint_url: &str,
        folder_path: &str,
        syncpoint_id: i64,
        local_path: P,
    ) -> Option<String> {
        let local_path = local_path.as_ref();
        let Some(filename) = local_path.file_name().and_then(|n| n.to_str()) else {
            warn!(path = %local_path.display(), "Upload path has no file name");
            return None;
        };

        let data = match tokio::fs::read(local_path).await {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %local_path.display(), error = %err, "Could not read the file to upload");
                return None;
            }
        };

        self.upload_file(storage_endpoint_url, folder_path, filename, syncpoint_id, data)
            .await
    }

    /// Download the latest version of a file from its storage endpoint.
    pub async fn download_file(
        &self,
        syncpoint_id: i64,
        file_id: i64,
        suppress_errors: bool,
    ) -> Option<Vec<u8>> {
        let Some(file) = self.get_file(syncpoint_id, file_id, true).await else {
            warn!(syncpoint_id, file_id, "Cannot download a file whose metadata is unavailable");
            return None;
        };

        let Some(syncpoint) = self
            .gateway
            .syncpoints()
            .get_syncpoint(syncpoint_id, suppress_errors)
            .await
        else {
            warn!(syncpoint_id, "Cannot download from an unavailable syncpoint");
            return None;
        };

        let Some(endpoint) = self
            .gateway
            .storage_endpoints()
            .find_active(&syncpoint.storage_endpoint_id)
            .await
        else {
            warn!(
                storage_endpoint_id = %syncpoint.storage_endpoint_id,
                "No active storage endpoint found for the syncpoint"
            );
            return None;
        };

        let Some(base_url) = endpoint.primary_url() else {
            warn!(storage_endpoint_id = %endpoint.id, "Storage endpoint has no URL");
            return None;
        };

        let url = format!(
            "{}/v2/files?syncpoint_id={}&file_version_id={}",
            base_url, syncpoint_id, file.latest_version_id
        );

        info!(filename = %file.filename, "Downloading file");
        self.gateway
            .execute(&self.storage_request(Method::GET, &url))
            .await
    }

    /// Request to a storage endpoint, carrying the storage vault credentials
    /// when machine-token authentication is enabled.
    fn storage_request(&self, method: Method, url: &str) -> ApiRequest {
        let config = self.gateway.config();
        let request = ApiRequest::new(method, url);

        if config.machine_token_auth_enabled {
            request
                .header(STORAGE_AUTHORIZATION_HEADER, config.storage_token.clone())
                .credentials(Credentials::MachineBearer)
        } else {
            request
        }
    }
}

/// `{storage}/v2/mime/files?filepath={form-encoded path}`.
pub fn upload_url(storage_endpoint_url: &str, file_path: &str) -> Result<Url> {
    let base = format!("{}/v2/mime/files", storage_endpoint_url.trim_end_matches('/'));
    let mut url = Url::parse(&base).map_err(|err| ApiError::InvalidUrl(format!("{}: {}", base, err)))?;
    url.query_pairs_mut().append_pair("filepath", file_path);
    Ok(url)
}

/// Multipart body expected by the storage endpoint's upload call.
pub fn upload_form(
    filename: &str,
    data: Vec<u8>,
    syncpoint_id: i64,
    now: DateTime<Utc>,
) -> MultipartForm {
    let sha256 = sha256_hex(&data);
    let timestamp = now.format(UPLOAD_TIME_FORMAT).to_string();
    let mime_type = mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string();

    MultipartForm::new()
        .file("fileData", data, filename, mime_type)
        .text("sha256", sha256)
        .session_key("sessionKey")
        .text("virtualFolderId", syncpoint_id.to_string())
        .text("creationTimeUtc", timestamp.clone())
        .text("lastWriteTimeUtc", timestamp)
        .text("fileDone", "")
}

/// Lowercase hex SHA-256 digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

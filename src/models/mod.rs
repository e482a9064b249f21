//! Data models for Syncplicity API requests and responses.

pub mod wire;

use serde::{Deserialize, Serialize};

crate::wire_enum! {
    /// Kind of a syncpoint.
    pub enum SyncPointType {
        Unknown = 0,
        MyDocuments = 1,
        MyMusic = 2,
        MyPictures = 3,
        Desktop = 4,
        Favorites = 5,
        Custom = 6,
    }
}

crate::wire_enum! {
    pub enum FolderStatus {
        Unknown = 0,
        Added = 1,
        Removed = 2,
    }
}

crate::wire_enum! {
    /// User account status.
    pub enum UserAccountStatus {
        Unknown = 0,
        Disabled = 1,
        Enabled = 2,
        Delinquent = 3,
        PendingActivation = 4,
        Unverified = 5,
        Suspended = 6,
    }
}

crate::wire_enum! {
    pub enum LinkExpirationPolicy {
        Disabled = 0,
        Enabled = 1,
    }
}

crate::wire_enum! {
    /// Who may open a share link.
    pub enum ShareLinkPolicy {
        Unknown = 0,
        Disabled = 1,
        InternalOnly = 2,
        AllowAll = 3,
        IntendedOnly = 4,
    }
}

crate::wire_enum! {
    pub enum PasswordProtectPolicy {
        Unknown = 0,
        Disabled = 1,
        Enabled = 2,
    }
}

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// A top-level mapped folder tree tied to one storage endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncPoint {
    #[serde(default, skip_serializing_if = "is_default")]
    pub id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(
        rename = "Type",
        default,
        deserialize_with = "wire::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<SyncPointType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub root_folder_id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub storage_endpoint_id: String,
}

/// A folder inside a syncpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Folder {
    #[serde(default, skip_serializing_if = "is_default")]
    pub syncpoint_id: i64,
    #[serde(default, skip_serializing_if = "is_default")]
    pub folder_id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub virtual_path: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<FolderStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<File>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<Folder>,
}

/// File metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct File {
    #[serde(default)]
    pub syncpoint_id: i64,
    #[serde(default)]
    pub file_id: i64,
    #[serde(default)]
    pub latest_version_id: i64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub virtual_path: String,
    #[serde(default)]
    pub length: Option<u64>,
}

impl std::fmt::Display for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{} (id {}", self.virtual_path, self.filename, self.file_id)?;
        if let Some(length) = self.length {
            write!(f, ", {}", format_size(length))?;
        }
        write!(f, ", version {})", self.latest_version_id)
    }
}

/// Byte count scaled to the largest unit that keeps it at or above one.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// A share link granting access to a file path within a syncpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Link {
    #[serde(default, skip_serializing_if = "is_default")]
    pub sync_point_id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub virtual_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_expire_in_days: Option<u32>,
    #[serde(
        default,
        deserialize_with = "wire::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub link_expiration_policy: Option<LinkExpirationPolicy>,
    #[serde(
        default,
        deserialize_with = "wire::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub share_link_policy: Option<ShareLinkPolicy>,
    #[serde(
        default,
        deserialize_with = "wire::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub password_protect_policy: Option<PasswordProtectPolicy>,
}

/// A physical storage location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageEndpoint {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub urls: Vec<StorageEndpointUrl>,
}

impl StorageEndpoint {
    /// First URL of the endpoint; storage calls are addressed to it.
    pub fn primary_url(&self) -> Option<&str> {
        self.urls
            .first()
            .map(|u| u.url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageEndpointUrl {
    #[serde(default)]
    pub url: String,
}

/// A user account within a company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    #[serde(
        default,
        deserialize_with = "wire::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_status: Option<UserAccountStatus>,
}

/// A user group. Members of a group share access to the same folders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
}

/// OAuth2 token response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub user_company_id: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

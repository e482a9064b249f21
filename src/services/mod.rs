//! Typed clients for the Syncplicity provisioning and content services.
//!
//! Each client borrows the shared [`Gateway`] and only knows its URL
//! templates. List endpoints always return a `Vec`, empty when the service
//! returned nothing.

pub mod files;
pub mod folders;
pub mod groups;
pub mod links;
pub mod storage;
pub mod syncpoints;
pub mod users;

pub use files::FileService;
pub use folders::FolderService;
pub use groups::GroupService;
pub use links::LinkService;
pub use storage::StorageEndpointService;
pub use syncpoints::SyncPointService;
pub use users::UserService;

use crate::gateway::Gateway;

impl Gateway {
    pub fn syncpoints(&self) -> SyncPointService<'_> {
        SyncPointService::new(self)
    }

    pub fn folders(&self) -> FolderService<'_> {
        FolderService::new(self)
    }

    pub fn files(&self) -> FileService<'_> {
        FileService::new(self)
    }

    pub fn links(&self) -> LinkService<'_> {
        LinkService::new(self)
    }

    pub fn storage_endpoints(&self) -> StorageEndpointService<'_> {
        StorageEndpointService::new(self)
    }

    pub fn groups(&self) -> GroupService<'_> {
        GroupService::new(self)
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(self)
    }
}

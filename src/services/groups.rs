//! Group provisioning service.

use crate::gateway::Gateway;
use crate::models::{Group, User};

pub struct GroupService<'a> {
    gateway: &'a Gateway,
}

impl<'a> GroupService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Create groups in a company and return the created records.
    pub async fn create_groups(&self, company_id: &str, groups: &[Group]) -> Vec<Group> {
        let url = self
            .gateway
            .config()
            .api_url(&format!("provisioning/groups.svc/{}/groups", company_id));
        self.gateway
            .post_json::<_, Vec<Group>>(&url, groups)
            .await
            .unwrap_or_default()
    }

    /// Add existing users to a group.
    pub async fn add_group_members(&self, group_id: &str, members: &[User]) -> Vec<User> {
        let url = self
            .gateway
            .config()
            .api_url(&format!("provisioning/group_members.svc/{}", group_id));
        self.gateway
            .post_json::<_, Vec<User>>(&url, members)
            .await
            .unwrap_or_default()
    }

    pub async fn delete_group(&self, group_id: &str) {
        let url = self
            .gateway
            .config()
            .api_url(&format!("provisioning/group.svc/{}", group_id));
        let _: Option<Group> = self.gateway.delete(&url).await;
    }
}

//! User provisioning service.

use crate::gateway::Gateway;
use crate::models::User;

const USERS_PATH: &str = "provisioning/users.svc/";

pub struct UserService<'a> {
    gateway: &'a Gateway,
}

impl<'a> UserService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    fn user_url(&self, email: &str) -> String {
        self.gateway
            .config()
            .api_url(&format!("provisioning/user.svc/{}", urlencoding::encode(email)))
    }

    /// Create users in the token owner's company.
    pub async fn create_users(&self, users: &[User]) -> Vec<User> {
        let url = self.gateway.config().api_url(USERS_PATH);
        self.gateway
            .post_json::<_, Vec<User>>(&url, users)
            .await
            .unwrap_or_default()
    }

    pub async fn get_user(&self, email: &str, suppress_errors: bool) -> Option<User> {
        self.gateway
            .get(&self.user_url(email), &[], suppress_errors, false)
            .await
    }

    pub async fn update_user(&self, user: &User) -> Option<User> {
        self.gateway
            .put(&self.user_url(&user.email_address), user)
            .await
    }

    pub async fn delete_user(&self, email: &str) {
        let _: Option<User> = self.gateway.delete(&self.user_url(email)).await;
    }
}

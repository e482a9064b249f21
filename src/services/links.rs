//! Share link service.

use crate::gateway::Gateway;
use crate::models::Link;

const LINKS_PATH: &str = "syncpoint/links.svc/";

pub struct LinkService<'a> {
    gateway: &'a Gateway,
}

impl<'a> LinkService<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    fn link_url(&self, token: &str) -> String {
        self.gateway
            .config()
            .api_url(&format!("syncpoint/link.svc/{}", urlencoding::encode(token)))
    }

    /// Generate share links and return the generated records.
    pub async fn generate_links(&self, links: &[Link]) -> Vec<Link> {
        let url = self.gateway.config().api_url(LINKS_PATH);
        self.gateway
            .post_json::<_, Vec<Link>>(&url, links)
            .await
            .unwrap_or_default()
    }

    pub async fn get_link(&self, token: &str, suppress_errors: bool) -> Option<Link> {
        self.gateway
            .get(&self.link_url(token), &[], suppress_errors, false)
            .await
    }

    pub async fn delete_link(&self, token: &str) {
        let _: Option<Link> = self.gateway.delete(&self.link_url(token)).await;
    }
}

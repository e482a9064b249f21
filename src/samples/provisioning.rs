//! Provisioning API walkthrough: users, groups and group membership.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::{GROUP_NAME_PREFIX, SIMPLE_PASSWORD};
use crate::gateway::Gateway;
use crate::models::{Group, User};

const SAMPLE_USER_COUNT: usize = 2;

pub struct ProvisioningSample<'a> {
    gateway: &'a Gateway,
    created_users: Vec<User>,
    created_group: Option<Group>,
}

impl<'a> ProvisioningSample<'a> {
    pub fn new(gateway: &'a Gateway) -> Self {
        Self {
            gateway,
            created_users: Vec::new(),
            created_group: None,
        }
    }

    pub fn created_users(&self) -> &[User] {
        &self.created_users
    }

    pub fn created_group(&self) -> Option<&Group> {
        self.created_group.as_ref()
    }

    /// Create users, rename one, create a group with the users as members,
    /// then delete the group and the users.
    pub async fn execute(&mut self) {
        let suffix = Utc::now().timestamp();

        self.create_users(suffix).await;
        self.update_user().await;
        self.create_group(suffix).await;
        self.add_group_members().await;
        self.delete_group().await;
        self.delete_users().await;
    }

    async fn create_users(&mut self, suffix: i64) {
        info!("Starting User creation..");
        let owner_email = &self.gateway.config().owner_email;
        let Some((local, domain)) = owner_email.split_once('@') else {
            error!("Owner email {} is not an email address. No users will be created.", owner_email);
            return;
        };

        let users: Vec<User> = (1..=SAMPLE_USER_COUNT)
            .map(|index| User {
                email_address: format!("{}+sample{}-{}@{}", local, index, suffix, domain),
                first_name: "Sample".to_string(),
                last_name: format!("User{}", index),
                password: SIMPLE_PASSWORD.to_string(),
                ..User::default()
            })
            .collect();

        self.created_users = self.gateway.users().create_users(&users).await;
        if self.created_users.is_empty() {
            error!("No users were created.");
        } else {
            info!("Finished User creation. Created {} users.", self.created_users.len());
        }
    }

    async fn update_user(&self) {
        let Some(user) = self.created_users.first() else {
            warn!("No users were created. Nothing to update.");
            return;
        };

        let renamed = User {
            email_address: user.email_address.clone(),
            first_name: "Renamed".to_string(),
            last_name: user.last_name.clone(),
            ..User::default()
        };

        match self.gateway.users().update_user(&renamed).await {
            Some(updated) => info!(
                "Updated user {}. New name: {} {}",
                updated.email_address, updated.first_name, updated.last_name
            ),
            None => info!("Sent update for user {}.", renamed.email_address),
        }
    }

    async fn create_group(&mut self, suffix: i64) {
        info!("Starting Group creation..");
        let company_id = self.gateway.session().company_id().await;
        if company_id.is_empty() {
            error!("The token does not carry a company id. No group will be created.");
            return;
        }

        let group = Group {
            name: format!("{}{}", GROUP_NAME_PREFIX, suffix),
            owner: Some(User {
                email_address: self.gateway.config().owner_email.clone(),
                ..User::default()
            }),
            ..Group::default()
        };

        let created = self
            .gateway
            .groups()
            .create_groups(&company_id, &[group])
            .await
            .into_iter()
            .next();

        match created {
            Some(group) => {
                info!("Finished Group creation. New Group id: {}", group.id);
                self.created_group = Some(group);
            }
            None => error!("No group was created."),
        }
    }

    async fn add_group_members(&self) {
        let Some(group) = &self.created_group else {
            warn!("No group was created. No members will be added.");
            return;
        };
        if self.created_users.is_empty() {
            warn!("No users were created. No members will be added.");
            return;
        }

        let members: Vec<User> = self
            .created_users
            .iter()
            .map(|user| User {
                email_address: user.email_address.clone(),
                ..User::default()
            })
            .collect();

        let added = self
            .gateway
            .groups()
            .add_group_members(&group.id, &members)
            .await;
        info!("Added {} members to group {}.", added.len(), group.id);
    }

    async fn delete_group(&self) {
        info!("Starting Group deleting..");
        match &self.created_group {
            Some(group) => {
                self.gateway.groups().delete_group(&group.id).await;
                info!("Finished Group deleting.");
            }
            None => info!("No Group was created. Nothing to delete."),
        }
    }

    async fn delete_users(&self) {
        info!("Starting User deleting..");
        if self.created_users.is_empty() {
            info!("No users were created. Nothing to delete.");
            return;
        }

        for user in &self.created_users {
            self.gateway.users().delete_user(&user.email_address).await;
        }
        info!("Finished User deleting.");
    }
}

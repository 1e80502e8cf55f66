//! Business logic services

pub mod catalog;
pub mod messages;
pub mod notifications;
pub mod ratings;
pub mod transactions;
pub mod users;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub transactions: transactions::TransactionsService,
    pub messages: messages::MessagesService,
    pub ratings: ratings::RatingsService,
    pub notifications: notifications::NotificationsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            transactions: transactions::TransactionsService::new(Arc::new(repository.clone())),
            messages: messages::MessagesService::new(repository.clone()),
            ratings: ratings::RatingsService::new(repository.clone()),
            notifications: notifications::NotificationsService::new(repository.clone()),
            repository,
        }
    }
}

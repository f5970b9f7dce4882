//! Business logic services

pub mod catalog;
pub mod loans;
pub mod redis;
pub mod users;

use chrono::{Local, NaiveDate};

use crate::{
    config::{AuthConfig, CatalogConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    pub redis: redis::RedisService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        catalog_config: CatalogConfig,
        redis_service: redis::RedisService,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), catalog_config.clone()),
            loans: loans::LoansService::new(repository.clone(), catalog_config),
            users: users::UsersService::new(repository.clone(), auth_config),
            redis: redis_service,
            repository,
        }
    }
}

/// The server's local calendar date
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

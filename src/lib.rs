pub mod app;
pub mod config;
pub mod domain;
pub mod infra;
pub mod screens;

use std::sync::Arc;

use crate::config::{ClientConfig, MediaSettings};
use crate::infra::{remote::RemoteDataService, rest::RestClient, storage::PublicStorage};

#[derive(Clone)]
pub struct AppState {
    pub remote: Arc<dyn RemoteDataService>,
    pub storage: PublicStorage,
    pub media: MediaSettings,
}

impl AppState {
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let remote = RestClient::new(config)?;
        Ok(Self::with_remote(config, Arc::new(remote)))
    }

    pub fn with_remote(config: &ClientConfig, remote: Arc<dyn RemoteDataService>) -> Self {
        Self {
            remote,
            storage: PublicStorage::new(config),
            media: config.media,
        }
    }
}

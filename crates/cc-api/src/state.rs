//! Application state.

use cc_store::{
    ApplicationRepository, JobRepository, LifecycleCoordinator, NotificationRepository,
    StoreClient, UserRepository,
};

use crate::auth::TokenSigner;
use crate::config::ApiConfig;
use crate::error::ApiResult;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub users: UserRepository,
    pub jobs: JobRepository,
    pub applications: ApplicationRepository,
    pub notifications: NotificationRepository,
    pub lifecycle: LifecycleCoordinator,
    pub token_signer: TokenSigner,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> ApiResult<Self> {
        let client = StoreClient::from_env().await?;
        let token_signer = TokenSigner::from_env()?;
        Ok(Self::with_client(config, client, token_signer))
    }

    /// Assemble state around an existing store client.
    pub fn with_client(config: ApiConfig, client: StoreClient, token_signer: TokenSigner) -> Self {
        Self {
            config,
            users: UserRepository::new(client.clone()),
            jobs: JobRepository::new(client.clone()),
            applications: ApplicationRepository::new(client.clone()),
            notifications: NotificationRepository::new(client.clone()),
            lifecycle: LifecycleCoordinator::new(client),
            token_signer,
        }
    }
}

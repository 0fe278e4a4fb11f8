use std::sync::Arc;

use anyhow::Context;
use ferry_client::{
    AuthFailureHandler, AuthService, BookingService, HttpClient, OfflineQueue,
    VerificationService,
};
use ferry_config::FerryConfig;
use ferry_store::DeviceStorage;

use crate::cli::GlobalFlags;

/// Load layered config and apply flag overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<FerryConfig> {
    let mut config = FerryConfig::load_with_dotenv().context("failed to load ferry config")?;
    if let Some(app) = flags.app {
        config.api.app = app;
    }
    tracing::debug!(app = %config.app(), base_url = %config.api.base_url, "config loaded");
    Ok(config)
}

/// Everything a command handler needs.
pub struct AppContext {
    pub config: FerryConfig,
    pub storage: DeviceStorage,
    pub client: Arc<HttpClient>,
}

impl AppContext {
    pub fn init(config: FerryConfig) -> anyhow::Result<Self> {
        let storage = DeviceStorage::open(&config).context("failed to open device storage")?;
        let on_auth_failure: Arc<dyn AuthFailureHandler> = Arc::new(session_expired);
        let client = HttpClient::from_config(&config, storage.clone(), on_auth_failure)
            .context("failed to build HTTP client")?;
        Ok(Self {
            config,
            storage,
            client: Arc::new(client),
        })
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(Arc::clone(&self.client))
    }

    pub fn verification(&self) -> VerificationService {
        VerificationService::new(Arc::clone(&self.client))
    }

    pub fn offline_queue(&self) -> OfflineQueue {
        OfflineQueue::with_max_retries(
            self.verification(),
            self.storage.clone(),
            self.config.queue.max_retries,
        )
    }

    pub fn bookings(&self) -> BookingService {
        BookingService::new(Arc::clone(&self.client), &self.config.api.base_url)
    }
}

fn session_expired() {
    tracing::warn!("token refresh failed; stored session cleared");
    eprintln!("session expired, run `ferry auth login`");
}

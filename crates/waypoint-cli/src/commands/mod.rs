pub mod checklist;
pub mod flows;
mod render;
pub mod session;

use anyhow::{Context, Result};
use waypoint_application::{Collaborators, SessionService, open_session_store};
use waypoint_core::config::WaypointConfig;
use waypoint_infrastructure::{ConfigService, HttpFlowClient};

/// Everything a command needs: configuration plus a restored session.
pub struct App {
    pub config: WaypointConfig,
    pub service: SessionService,
}

impl App {
    /// Loads configuration, restores the stored session and waits for any
    /// resume fetch to finish.
    pub async fn open() -> Result<Self> {
        let config = ConfigService::new()
            .context("Failed to locate configuration")?
            .load()
            .context("Failed to load configuration")?;
        let store = open_session_store(&config)?;
        let client = HttpFlowClient::from_config(&config);
        tracing::debug!("[App] Using flow API at {}", client.base_url());

        let mut service = SessionService::start(store, Collaborators::from_client(client));
        service.settle().await;
        Ok(Self { config, service })
    }
}

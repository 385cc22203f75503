//! Flow collaborator traits.
//!
//! Flow data lives behind a network service. These traits decouple the session
//! lifecycle from how flows are actually fetched (HTTP API, fixtures in tests).

use super::model::{FlowPayload, FlowSummary};
use crate::error::FetchError;
use async_trait::async_trait;

/// Resolves a flow identifier into its full step list.
#[async_trait]
pub trait FlowResolver: Send + Sync {
    /// Fetches the flow with the given id.
    ///
    /// # Returns
    ///
    /// - `Ok(FlowPayload)`: flow resolved
    /// - `Err(FetchError::NotFound)`: no such flow
    /// - `Err(FetchError::Unreachable)`: the service could not be reached
    async fn fetch_flow(&self, flow_id: &str) -> Result<FlowPayload, FetchError>;
}

/// Lists the flows a user can choose from.
#[async_trait]
pub trait FlowCatalog: Send + Sync {
    async fn list_flows(&self) -> Result<Vec<FlowSummary>, FetchError>;
}

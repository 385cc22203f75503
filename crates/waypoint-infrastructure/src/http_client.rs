//! HTTP client for the flow API.
//!
//! One client implements all three collaborators:
//! - `GET  /flow/{flow_id}`   → [`FlowResolver`]
//! - `POST /recommend-flow`   → [`Recommender`]
//! - `GET  /flows`            → [`FlowCatalog`]

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use waypoint_core::config::WaypointConfig;
use waypoint_core::error::FetchError;
use waypoint_core::flow::{FlowCatalog, FlowPayload, FlowResolver, FlowSummary};
use waypoint_core::intake::{IntakeAnswers, Recommendation, Recommender};

#[derive(Debug, Deserialize)]
struct FlowListResponse {
    #[serde(default)]
    flows: Vec<FlowSummary>,
}

/// reqwest-based client for the flow API.
#[derive(Clone)]
pub struct HttpFlowClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpFlowClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &WaypointConfig) -> Self {
        Self::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends the request and decodes a JSON body.
    ///
    /// `not_found` decides what a 404 means for this endpoint.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
        not_found: impl FnOnce() -> FetchError,
    ) -> Result<T, FetchError> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::unreachable(format!("Failed to fetch {}: {}", what, e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::unreachable(format!(
                "Flow API error for {} ({}): {}",
                what, status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::unreachable(format!("Failed to parse {}: {}", what, e)))
    }
}

#[async_trait]
impl FlowResolver for HttpFlowClient {
    async fn fetch_flow(&self, flow_id: &str) -> Result<FlowPayload, FetchError> {
        let url = format!("{}/flow/{}", self.base_url, flow_id);
        tracing::debug!("[HttpFlowClient] GET {}", url);
        self.send_json(self.client.get(&url), &format!("flow '{}'", flow_id), || {
            FetchError::not_found(flow_id)
        })
        .await
    }
}

#[async_trait]
impl Recommender for HttpFlowClient {
    async fn recommend(&self, answers: &IntakeAnswers) -> Result<Recommendation, FetchError> {
        let url = format!("{}/recommend-flow", self.base_url);
        tracing::debug!("[HttpFlowClient] POST {}", url);
        self.send_json(self.client.post(&url).json(answers), "recommendation", || {
            FetchError::unreachable("Recommendation endpoint not found")
        })
        .await
    }
}

#[async_trait]
impl FlowCatalog for HttpFlowClient {
    async fn list_flows(&self) -> Result<Vec<FlowSummary>, FetchError> {
        let url = format!("{}/flows", self.base_url);
        tracing::debug!("[HttpFlowClient] GET {}", url);
        let list: FlowListResponse = self
            .send_json(self.client.get(&url), "flow list", || {
                FetchError::unreachable("Flow list endpoint not found")
            })
            .await?;
        Ok(list.flows)
    }
}

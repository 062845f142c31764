//! Typed boundary to the concierge REST backend.
//!
//! The workflow depends on the [`ConciergeApi`] trait only; the `reqwest`
//! implementation lives in [`http`] so tests can substitute an in-process
//! double.

pub mod http;

use async_trait::async_trait;
use serde::Deserialize;

use crate::session::Session;
use crate::workflows::application::domain::{ApplicationSummary, Money, ServiceDefinition};
use crate::workflows::application::submission::ServiceApplyRequest;

pub use http::HttpConciergeApi;

/// Operations the backend exposes to this client.
#[async_trait]
pub trait ConciergeApi: Send + Sync {
    /// Fetches the full service catalog (`GET /viewService`).
    async fn view_services(&self) -> Result<Vec<ServiceDefinition>, ApiError>;

    /// Fetches the slider and service list for the landing screen (`GET /home`).
    async fn home(&self) -> Result<HomeData, ApiError>;

    /// Fetches the user's stored-value balance (`GET /wallet_balance`).
    async fn wallet_balance(&self, session: &Session) -> Result<Money, ApiError>;

    /// Lists the user's submitted applications (`GET /view_service_apply`).
    async fn view_applications(
        &self,
        session: &Session,
    ) -> Result<Vec<ApplicationSummary>, ApiError>;

    /// Dispatches the final multipart submission (`POST /serviceApply`).
    async fn service_apply(
        &self,
        session: &Session,
        request: &ServiceApplyRequest,
    ) -> Result<ServiceApplyResponse, ApiError>;
}

/// Landing-screen payload.
#[derive(Debug, Clone, Deserialize)]
pub struct HomeData {
    #[serde(default)]
    pub slider: Vec<SliderItem>,
    #[serde(default)]
    pub service: Vec<ServiceDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SliderItem {
    #[serde(default)]
    pub id: Option<u64>,
    pub image: String,
}

/// Submission verdict: `status == 1` is the only success encoding.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceApplyResponse {
    pub status: i64,
    #[serde(default)]
    pub message: Option<String>,
}

impl ServiceApplyResponse {
    pub fn is_success(&self) -> bool {
        self.status == 1
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to construct the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: &'static str },
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("the session is no longer valid, please log in again")]
    Unauthorized,
    #[error("{endpoint} answered HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("unexpected response from {endpoint}: {detail}")]
    Decode {
        endpoint: &'static str,
        detail: String,
    },
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::ApiConfig;
use crate::session::Session;
use crate::workflows::application::domain::{ApplicationSummary, Money, ServiceDefinition};
use crate::workflows::application::submission::ServiceApplyRequest;

use super::{ApiError, ConciergeApi, HomeData, ServiceApplyResponse};

/// The submission POST carries file parts; give it more room than the
/// default request timeout.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

/// `reqwest`-backed implementation of [`ConciergeApi`].
pub struct HttpConciergeApi {
    client: Client,
    base_url: String,
}

/// Backend envelopes everything under a `data` key.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    #[serde(default)]
    service: Vec<ServiceDefinition>,
}

#[derive(Debug, Deserialize)]
struct WalletData {
    balance: Money,
}

impl HttpConciergeApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(|source| {
            if source.is_timeout() {
                ApiError::Timeout { endpoint }
            } else {
                ApiError::Network { endpoint, source }
            }
        })?;

        let response = check_status(endpoint, response)?;
        response.json().await.map_err(|source| ApiError::Decode {
            endpoint,
            detail: source.to_string(),
        })
    }
}

fn check_status(endpoint: &'static str, response: Response) -> Result<Response, ApiError> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        status if status.is_success() => Ok(response),
        status => Err(ApiError::Status {
            endpoint,
            status: status.as_u16(),
        }),
    }
}

#[async_trait]
impl ConciergeApi for HttpConciergeApi {
    async fn view_services(&self) -> Result<Vec<ServiceDefinition>, ApiError> {
        let endpoint = "/viewService";
        let envelope: Envelope<CatalogData> = self
            .send_json(endpoint, self.client.get(self.url(endpoint)))
            .await?;
        debug!(count = envelope.data.service.len(), "fetched service catalog");
        Ok(envelope.data.service)
    }

    async fn home(&self) -> Result<HomeData, ApiError> {
        let endpoint = "/home";
        let envelope: Envelope<HomeData> = self
            .send_json(endpoint, self.client.get(self.url(endpoint)))
            .await?;
        Ok(envelope.data)
    }

    async fn wallet_balance(&self, session: &Session) -> Result<Money, ApiError> {
        let endpoint = "/wallet_balance";
        let envelope: Envelope<WalletData> = self
            .send_json(
                endpoint,
                self.client.get(self.url(endpoint)).bearer_auth(&session.token),
            )
            .await?;
        Ok(envelope.data.balance)
    }

    async fn view_applications(
        &self,
        session: &Session,
    ) -> Result<Vec<ApplicationSummary>, ApiError> {
        let endpoint = "/view_service_apply";
        let envelope: Envelope<Vec<ApplicationSummary>> = self
            .send_json(
                endpoint,
                self.client.get(self.url(endpoint)).bearer_auth(&session.token),
            )
            .await?;
        Ok(envelope.data)
    }

    async fn service_apply(
        &self,
        session: &Session,
        request: &ServiceApplyRequest,
    ) -> Result<ServiceApplyResponse, ApiError> {
        let endpoint = "/serviceApply";

        let mut form = Form::new();
        for (name, value) in request.fields() {
            form = form.text(name, value);
        }
        for (index, document) in request.documents.iter().enumerate() {
            let part = Part::bytes(document.file.bytes.clone())
                .file_name(document.file.file_name.clone())
                .mime_str(document.file.mime_type.as_ref())
                .map_err(|source| ApiError::Decode {
                    endpoint,
                    detail: format!("invalid document mime type: {source}"),
                })?;
            form = form.part(format!("docname[{index}]"), part);
        }

        debug!(
            service_id = request.service_id,
            documents = request.documents.len(),
            "dispatching application"
        );

        self.send_json(
            endpoint,
            self.client
                .post(self.url(endpoint))
                .bearer_auth(&session.token)
                .timeout(SUBMIT_TIMEOUT)
                .multipart(form),
        )
        .await
    }
}

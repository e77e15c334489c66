//! HTTP adapter for the dashboard API
//!
//! Every call is a single JSON request. Non-2xx responses are turned into
//! [`RemoteCallFailure`] carrying the most specific message the body
//! offers.

use crate::config::FileApiConfig;
use async_trait::async_trait;
use paramlab_application::{
    ExperimentList, ExperimentsApi, MetricsApi, RemoteCallFailure, ResponsesApi,
};
use paramlab_domain::{
    Comparison, Experiment, ExperimentId, ExperimentPatch, ExperimentStats, GenerationOutcome,
    GenerationRequest, MetricsResult, NewExperiment, ResponseId,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// `GET /experiments` answers either a wrapped list or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Wrapped(ExperimentList),
    Bare(Vec<Experiment>),
}

impl From<ListBody> for ExperimentList {
    fn from(body: ListBody) -> Self {
        match body {
            ListBody::Wrapped(list) => list,
            ListBody::Bare(experiments) => ExperimentList {
                total: Some(experiments.len()),
                experiments,
            },
        }
    }
}

#[derive(Serialize)]
struct ResponseIdsBody<'a> {
    response_ids: &'a [ResponseId],
}

/// [`ResourceClient`](paramlab_application::ResourceClient) backed by the
/// dashboard's REST API.
#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    client: Client,
    base_url: String,
}

impl HttpResourceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteCallFailure> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("paramlab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteCallFailure::new(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(api: &FileApiConfig) -> Result<Self, RemoteCallFailure> {
        Self::new(api.normalized_base_url(), api.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteCallFailure> {
        let response = self.dispatch(request).await?;
        response.json::<T>().await.map_err(|e| {
            warn!("Malformed response body: {}", e);
            RemoteCallFailure::new(format!("Invalid response from server: {}", e))
        })
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), RemoteCallFailure> {
        self.dispatch(request).await.map(|_| ())
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<reqwest::Response, RemoteCallFailure> {
        let request = request
            .build()
            .map_err(|e| RemoteCallFailure::new(format!("Invalid request: {}", e)))?;
        let method = request.method().clone();
        let url = request.url().clone();
        let start = Instant::now();

        let response = self.client.execute(request).await.map_err(|e| {
            warn!("{} {} failed: {}", method, url, e);
            transport_failure(&e)
        })?;

        let status = response.status();
        debug!(
            "{} {} -> {} ({}ms)",
            method,
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let failure = failure_from_body(status, &body);
        warn!("{} {} rejected: {}", method, url, failure);
        Err(failure)
    }
}

fn transport_failure(err: &reqwest::Error) -> RemoteCallFailure {
    if err.is_timeout() {
        RemoteCallFailure::new("Request timed out")
    } else if err.is_connect() {
        RemoteCallFailure::new("Could not connect to the server")
    } else {
        RemoteCallFailure::new(format!("Request failed: {}", err))
    }
}

/// Pick the user-facing message out of an error body.
///
/// Looks at `detail`, `message` and `error` in that order. A `detail` list
/// (validation errors) is joined by its `msg` entries. Falls back to the
/// status text.
fn failure_from_body(status: StatusCode, body: &str) -> RemoteCallFailure {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|key| json.get(key).and_then(message_of))
        });

    let message = from_body.unwrap_or_else(|| {
        format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )
    });
    RemoteCallFailure::with_status(message, status.as_u16())
}

fn message_of(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s.clone()),
                    other => other.get("msg").and_then(|m| m.as_str()).map(str::to_string),
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => None,
    }
}

#[async_trait]
impl ExperimentsApi for HttpResourceClient {
    async fn get_all(&self) -> Result<ExperimentList, RemoteCallFailure> {
        let body: ListBody = self.send(self.client.get(self.url("/experiments"))).await?;
        Ok(body.into())
    }

    async fn get_by_id(&self, id: &ExperimentId) -> Result<Experiment, RemoteCallFailure> {
        self.send(self.client.get(self.url(&format!("/experiments/{}", id))))
            .await
    }

    async fn create(&self, data: &NewExperiment) -> Result<Experiment, RemoteCallFailure> {
        self.send(self.client.post(self.url("/experiments")).json(data))
            .await
    }

    async fn update(
        &self,
        id: &ExperimentId,
        patch: &ExperimentPatch,
    ) -> Result<Experiment, RemoteCallFailure> {
        self.send(
            self.client
                .put(self.url(&format!("/experiments/{}", id)))
                .json(patch),
        )
        .await
    }

    async fn delete(&self, id: &ExperimentId) -> Result<(), RemoteCallFailure> {
        self.send_empty(self.client.delete(self.url(&format!("/experiments/{}", id))))
            .await
    }

    async fn stats(&self, id: &ExperimentId) -> Result<ExperimentStats, RemoteCallFailure> {
        self.send(
            self.client
                .get(self.url(&format!("/experiments/{}/stats", id))),
        )
        .await
    }
}

#[async_trait]
impl ResponsesApi for HttpResourceClient {
    async fn generate(
        &self,
        payload: &GenerationRequest,
    ) -> Result<GenerationOutcome, RemoteCallFailure> {
        self.send(
            self.client
                .post(self.url("/responses/generate"))
                .json(payload),
        )
        .await
    }
}

#[async_trait]
impl MetricsApi for HttpResourceClient {
    async fn calculate(&self, response_id: &ResponseId) -> Result<MetricsResult, RemoteCallFailure> {
        self.send(
            self.client
                .post(self.url(&format!("/metrics/calculate/{}", response_id))),
        )
        .await
    }

    async fn calculate_batch(
        &self,
        responses: &[ResponseId],
    ) -> Result<Vec<MetricsResult>, RemoteCallFailure> {
        self.send(
            self.client
                .post(self.url("/metrics/calculate-batch"))
                .json(&ResponseIdsBody {
                    response_ids: responses,
                }),
        )
        .await
    }

    async fn compare(&self, response_ids: &[ResponseId]) -> Result<Comparison, RemoteCallFailure> {
        self.send(
            self.client
                .post(self.url("/metrics/compare"))
                .json(&ResponseIdsBody { response_ids }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string_wins() {
        let failure = failure_from_body(
            StatusCode::NOT_FOUND,
            r#"{"detail": "Experiment not found", "message": "ignored"}"#,
        );
        assert_eq!(failure.message(), "Experiment not found");
        assert_eq!(failure.status(), Some(404));
    }

    #[test]
    fn test_validation_detail_list_is_joined() {
        let body = r#"{"detail": [
            {"loc": ["body", "name"], "msg": "field required"},
            {"loc": ["body", "prompt"], "msg": "field required"}
        ]}"#;
        let failure = failure_from_body(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(failure.message(), "field required; field required");
    }

    #[test]
    fn test_message_and_error_fields() {
        let failure = failure_from_body(StatusCode::BAD_REQUEST, r#"{"message": "bad seed"}"#);
        assert_eq!(failure.message(), "bad seed");

        let failure = failure_from_body(StatusCode::BAD_GATEWAY, r#"{"error": "upstream down"}"#);
        assert_eq!(failure.message(), "upstream down");
    }

    #[test]
    fn test_falls_back_to_status_text() {
        let failure = failure_from_body(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(failure.message(), "HTTP 500 Internal Server Error");

        let failure = failure_from_body(StatusCode::SERVICE_UNAVAILABLE, r#"{"detail": ""}"#);
        assert_eq!(failure.message(), "HTTP 503 Service Unavailable");
    }

    #[test]
    fn test_list_body_accepts_both_shapes() {
        let wrapped: ListBody = serde_json::from_str(r#"{"experiments": [], "total": 0}"#).unwrap();
        assert_eq!(ExperimentList::from(wrapped).total, Some(0));

        let bare: ListBody = serde_json::from_str("[]").unwrap();
        let list = ExperimentList::from(bare);
        assert!(list.experiments.is_empty());
        assert_eq!(list.total, Some(0));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            HttpResourceClient::new("http://localhost:8000/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(
            client.url("/experiments"),
            "http://localhost:8000/api/experiments"
        );
    }
}

//! API client for communicating with the Decision Maker API

use decision_lib::{
    HealthResponse, Intent, MetricSet, PodInfo, ReadinessResponse, SchedulingIntent,
};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Status { status: StatusCode, message: String },
}

/// API client for the Decision Maker API
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        // Relative joins replace the last path segment unless it ends in '/'
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.base_url.join(path)?;
        let response = self.client.get(url).send().await?;
        decode(response, &[]).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.base_url.join(path)?;
        let response = self.client.post(url).json(body).send().await?;
        decode(response, &[]).await
    }

    /// GET a status endpoint whose body is meaningful on 503 as well
    async fn get_status<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.base_url.join(path)?;
        let response = self.client.get(url).send().await?;
        decode(response, &[StatusCode::SERVICE_UNAVAILABLE]).await
    }

    pub async fn list_intents(&self) -> Result<Vec<SchedulingIntent>, ApiError> {
        let envelope: Envelope<SchedulingList> = self.get("api/v1/scheduling/strategies").await?;
        Ok(envelope.data.map(|list| list.scheduling).unwrap_or_default())
    }

    pub async fn submit_intents(&self, intents: &[Intent]) -> Result<(), ApiError> {
        let _: Envelope<serde_json::Value> = self
            .post("api/v1/intents", &IntentsRequest { intents })
            .await?;
        Ok(())
    }

    /// Latest scheduler telemetry, `None` until the scheduler has reported
    pub async fn get_metrics(&self) -> Result<Option<MetricSet>, ApiError> {
        let envelope: Envelope<MetricSet> = self.get("api/v1/metrics").await?;
        Ok(envelope.data)
    }

    pub async fn push_metrics(&self, snapshot: &MetricSet) -> Result<(), ApiError> {
        let _: Envelope<serde_json::Value> = self.post("api/v1/metrics", snapshot).await?;
        Ok(())
    }

    pub async fn pod_pids(&self) -> Result<Vec<PodInfo>, ApiError> {
        let response: PodPidsResponse = self.get("api/v1/pods/pids").await?;
        Ok(response.pods)
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        self.get_status("healthz").await
    }

    pub async fn readiness(&self) -> Result<ReadinessResponse, ApiError> {
        self.get_status("readyz").await
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    accepted: &[StatusCode],
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() && !accepted.contains(&status) {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(ApiError::Status { status, message });
    }

    Ok(response.json().await?)
}

// API response types

#[derive(Debug, Serialize)]
struct IntentsRequest<'a> {
    intents: &'a [Intent],
}

/// Common `{success, data, timestamp}` wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingList {
    #[serde(default)]
    pub scheduling: Vec<SchedulingIntent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodPidsResponse {
    #[serde(default)]
    pub pods: Vec<PodInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let client = ApiClient::new("http://node-a:8080/decision").unwrap();
        assert_eq!(client.base_url().as_str(), "http://node-a:8080/decision/");
        assert_eq!(
            client.base_url().join("api/v1/metrics").unwrap().as_str(),
            "http://node-a:8080/decision/api/v1/metrics"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_list_intents() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/scheduling/strategies")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": true,
                    "data": {"scheduling": [{
                        "pid": 101,
                        "priority": true,
                        "executionTime": 20000,
                        "commandRegex": "nginx",
                        "selectors": [{"key": "app", "value": "web"}]
                    }]},
                    "timestamp": "2026-01-01T00:00:00Z"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let intents = client.list_intents().await.unwrap();

        mock.assert_async().await;
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].pid, 101);
        assert!(intents[0].priority);
        assert_eq!(intents[0].selectors[0].key, "app");
    }

    #[tokio::test]
    async fn test_submit_intents_wraps_batch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/intents")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"^\{"intents":\["#.to_string()),
                Matcher::Regex(r#""podID":"pod-a""#.to_string()),
                Matcher::Regex(r#""priority":3"#.to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"success":true,"timestamp":"2026-01-01T00:00:00Z"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let intent = Intent {
            pod_id: "pod-a".to_string(),
            priority: 3,
            ..Default::default()
        };
        client.submit_intents(&[intent]).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_metrics_without_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/metrics")
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "message": "No metrics data available yet. Waiting for scheduler to report metrics.",
                    "data": null
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        assert!(client.get_metrics().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_metrics_with_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/metrics")
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": {"usersched_last_run_at": 42, "nr_queued": 7, "nr_running": 2},
                    "timestamp": "2026-01-01T00:00:00Z"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let snapshot = client.get_metrics().await.unwrap().unwrap();
        assert_eq!(snapshot.user_sched_last_run_at, 42);
        assert_eq!(snapshot.nr_queued, 7);
        assert_eq!(snapshot.nr_online_cpus, 0);
    }

    #[tokio::test]
    async fn test_server_error_surfaces_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/pods/pids")
            .with_status(500)
            .with_body(r#"{"success":false,"error":"Failed to get pod-pid mappings"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        match client.pod_pids().await {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(message, "Failed to get pod-pid mappings");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_health_accepts_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(503)
            .with_body(
                json!({
                    "status": "unhealthy",
                    "components": {
                        "discovery": {
                            "status": "unhealthy",
                            "message": "cannot read /proc",
                            "last_check_timestamp": 0
                        }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let health = client.health().await.unwrap();
        assert_eq!(health.status, decision_lib::ComponentStatus::Unhealthy);
        assert_eq!(
            health.components["discovery"].message.as_deref(),
            Some("cannot read /proc")
        );
    }
}

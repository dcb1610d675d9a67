//! API client for communicating with the prediction server

use anyhow::{Context, Result};
use predictor_lib::{HealthResponse, PropertyPrediction, ReadinessResponse};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::HashMap;
use url::Url;

/// Body returned by `POST /predict`; exactly one of the two shapes is populated
#[derive(Debug, Clone, Deserialize)]
pub struct PredictReply {
    pub success: bool,
    #[serde(default)]
    pub properties: Option<PropertyPrediction>,
    #[serde(default)]
    pub ratio: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Combined `/healthz` and `/readyz` answers
#[derive(Debug, Clone)]
pub struct ServerStatus {
    pub health: HealthResponse,
    pub readiness: ReadinessResponse,
}

/// API client for the prediction server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// GET where 503 still carries a meaningful JSON body
    async fn get_health_endpoint<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send_get(path).await?;
        let status = response.status();

        if !status.is_success() && status != StatusCode::SERVICE_UNAVAILABLE {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Make a POST request with a urlencoded form body
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &HashMap<String, String>,
    ) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    async fn send_get(&self, path: &str) -> Result<Response> {
        let url = self.base_url.join(path).context("Invalid path")?;
        self.client
            .get(url)
            .send()
            .await
            .context("Failed to send request")
    }

    /// Submit composite parameters; blank or absent fields take the server defaults
    pub async fn predict(&self, fields: &HashMap<String, String>) -> Result<PredictReply> {
        self.post_form("/predict", fields).await
    }

    pub async fn status(&self) -> Result<ServerStatus> {
        let health = self.get_health_endpoint("/healthz").await?;
        let readiness = self.get_health_endpoint("/readyz").await?;
        Ok(ServerStatus { health, readiness })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predictor_lib::{columns, ComponentStatus};

    #[tokio::test]
    async fn test_predict_success_reply() {
        let mut server = mockito::Server::new_async().await;
        let body = format!(
            r#"{{"properties":{{"{}":73.12,"{}":2456.7}},"ratio":2.9188,"success":true}}"#,
            columns::TENSILE_ELASTIC_MODULUS,
            columns::TENSILE_STRENGTH
        );
        let mock = server
            .mock("POST", "/predict")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let reply = client.predict(&HashMap::new()).await.unwrap();

        mock.assert_async().await;
        assert!(reply.success);
        let properties = reply.properties.unwrap();
        assert!((properties.elastic_modulus - 73.12).abs() < 1e-9);
        assert!((properties.tensile_strength - 2456.7).abs() < 1e-9);
        assert_eq!(reply.ratio, Some(2.9188));
        assert!(reply.error.is_none());
    }

    #[tokio::test]
    async fn test_predict_failure_reply() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Model is not loaded","success":false}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let reply = client.predict(&HashMap::new()).await.unwrap();

        assert!(!reply.success);
        assert!(reply.properties.is_none());
        assert_eq!(reply.error.as_deref(), Some("Model is not loaded"));
    }

    #[tokio::test]
    async fn test_status_accepts_unavailable_health_endpoints() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"unhealthy","components":{"predictor":{"status":"unhealthy","message":"missing files","checked_at":"2026-01-01T00:00:00+00:00"}}}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/readyz")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ready":false,"reason":"Model artifacts not loaded"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let status = client.status().await.unwrap();

        assert_eq!(status.health.status, ComponentStatus::Unhealthy);
        assert!(!status.readiness.ready);
        assert_eq!(
            status.readiness.reason.as_deref(),
            Some("Model artifacts not loaded")
        );
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/healthz")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.status().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }
}

use crate::models::{Provider, ServiceRequest};
use crate::services::Scorer;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the scoring service
#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("Scoring service unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed scoring response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ScorerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ScorerError::Malformed(err.to_string())
        } else {
            ScorerError::Unavailable(err.to_string())
        }
    }
}

/// Body sent to the scoring service for one (request, provider) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    #[serde(rename = "requestDescription")]
    pub request_description: String,
    #[serde(rename = "providerSkills")]
    pub provider_skills: Vec<String>,
}

impl ScoreRequest {
    pub fn new(request: &ServiceRequest, provider: &Provider) -> Self {
        Self {
            request_id: request.id.clone(),
            provider_id: provider.id.clone(),
            request_description: request.enriched_context(),
            provider_skills: provider.skills.clone(),
        }
    }
}

/// Scoring service answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: f64,
    #[serde(default)]
    pub explanation: String,
}

/// HTTP client for the external scoring service
pub struct ScorerClient {
    url: String,
    client: Client,
}

impl ScorerClient {
    /// Create a new scorer client posting to `url`
    pub fn new(url: String, timeout: Duration) -> Result<Self, ScorerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScorerError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Score a single provider against a request
    pub async fn score(
        &self,
        request: &ServiceRequest,
        provider: &Provider,
    ) -> Result<ScoreResponse, ScorerError> {
        let body = ScoreRequest::new(request, provider);

        let response = self.client.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            return Err(ScorerError::Unavailable(format!(
                "Scoring service returned {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        let parsed: ScoreResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ScorerError::Malformed(e.to_string()))?;

        tracing::trace!(
            "Scored provider {} for request {}: {}",
            provider.id,
            request.id,
            parsed.score
        );

        Ok(parsed)
    }
}

#[async_trait]
impl Scorer for ScorerClient {
    async fn score(
        &self,
        request: &ServiceRequest,
        provider: &Provider,
    ) -> Result<ScoreResponse, ScorerError> {
        ScorerClient::score(self, request, provider).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn request() -> ServiceRequest {
        ServiceRequest {
            id: "R1".to_string(),
            title: "Fix sink".to_string(),
            description: "Leaky pipe".to_string(),
            location: None,
            budget: 50.0,
            status: "open".to_string(),
            user_id: "U1".to_string(),
        }
    }

    fn provider() -> Provider {
        Provider {
            id: "P1".to_string(),
            email: "p1@example.com".to_string(),
            role: "provider".to_string(),
            skills: vec!["plumbing".to_string()],
        }
    }

    fn client_for(server: &mockito::ServerGuard) -> ScorerClient {
        ScorerClient::new(format!("{}/score", server.url()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_score_sends_enriched_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/score")
            .match_body(Matcher::Json(serde_json::json!({
                "requestId": "R1",
                "providerId": "P1",
                "requestDescription": "Leaky pipe Fix sink",
                "providerSkills": ["plumbing"],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"score": 0.9, "explanation": "skill match"}"#)
            .create_async()
            .await;

        let result = client_for(&server).score(&request(), &provider()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.score, 0.9);
        assert_eq!(result.explanation, "skill match");
    }

    #[tokio::test]
    async fn test_missing_explanation_defaults_to_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/score")
            .with_status(200)
            .with_body(r#"{"score": 1.5}"#)
            .create_async()
            .await;

        let result = client_for(&server).score(&request(), &provider()).await.unwrap();

        assert_eq!(result.score, 1.5);
        assert!(result.explanation.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/score")
            .with_status(200)
            .with_body(r#"{"error": "model exploded"}"#)
            .create_async()
            .await;

        let err = client_for(&server).score(&request(), &provider()).await.unwrap_err();

        assert!(matches!(err, ScorerError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/score")
            .with_status(503)
            .create_async()
            .await;

        let err = client_for(&server).score(&request(), &provider()).await.unwrap_err();

        assert!(matches!(err, ScorerError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let client = ScorerClient::new(
            "http://127.0.0.1:1/score".to_string(),
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.score(&request(), &provider()).await.unwrap_err();

        assert!(matches!(err, ScorerError::Unavailable(_)));
    }
}

// Service exports
pub mod postgres;
pub mod scorer;

pub use postgres::{PostgresClient, PostgresError};
pub use scorer::{ScoreRequest, ScoreResponse, ScorerClient, ScorerError};

use crate::models::{Provider, ServiceRequest};
use async_trait::async_trait;

/// Read-only source of service requests and providers
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Fetch one service request, failing with `PostgresError::NotFound` when absent
    async fn get_request(&self, id: &str) -> Result<ServiceRequest, PostgresError>;

    /// Fetch every user with the provider role; empty when there are none
    async fn list_providers(&self) -> Result<Vec<Provider>, PostgresError>;

    async fn health_check(&self) -> bool;
}

/// External capability that scores one provider against one request
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(
        &self,
        request: &ServiceRequest,
        provider: &Provider,
    ) -> Result<ScoreResponse, ScorerError>;
}

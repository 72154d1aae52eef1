use crate::core::{ranking::rank_by_score, scoring::ScoreOutcome};
use crate::models::{ScoredProvider, ServiceRequest};
use crate::services::{MatchStore, PostgresError, Scorer};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

/// Fatal outcomes of a ranking run
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Request not found: {0}")]
    NotFound(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] PostgresError),
}

impl From<PostgresError> for MatchError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::NotFound(msg) => MatchError::NotFound(msg),
            other => MatchError::Retrieval(other),
        }
    }
}

/// Result of a successful ranking run
#[derive(Debug)]
pub struct MatchResult {
    pub request: ServiceRequest,
    pub matches: Vec<ScoredProvider>,
    pub degraded: usize,
}

/// Ranks every provider against a service request
///
/// # Pipeline Stages
/// 1. Resolve the request (the only fatal dependency besides storage errors)
/// 2. Load providers
/// 3. Score each provider, substituting 0.0 when scoring fails
/// 4. Sort by score, descending
///
/// With `concurrency == 1` providers are scored strictly one after another.
/// Higher values keep up to that many scoring calls in flight; results are
/// still gathered in provider order, so the output does not depend on which
/// call finishes first.
#[derive(Clone)]
pub struct RankingPipeline {
    store: Arc<dyn MatchStore>,
    scorer: Arc<dyn Scorer>,
    concurrency: usize,
}

impl RankingPipeline {
    pub fn new(store: Arc<dyn MatchStore>, scorer: Arc<dyn Scorer>) -> Self {
        Self {
            store,
            scorer,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn store(&self) -> &Arc<dyn MatchStore> {
        &self.store
    }

    /// Rank all providers for the request identified by `request_id`
    pub async fn run(&self, request_id: &str) -> Result<MatchResult, MatchError> {
        let request = self.store.get_request(request_id).await.map_err(|e| {
            tracing::warn!("Error finding request {}: {}", request_id, e);
            MatchError::from(e)
        })?;

        tracing::info!("Found request {}: {}", request.id, request.title);

        let providers = self.store.list_providers().await.map_err(|e| {
            tracing::error!("Error finding providers: {}", e);
            MatchError::Retrieval(e)
        })?;

        let total = providers.len();
        let providers: Vec<_> = providers
            .into_iter()
            .filter(|provider| {
                if !provider.is_eligible() {
                    tracing::warn!("Skipping user {} with role {}", provider.id, provider.role);
                }
                provider.is_eligible()
            })
            .collect();

        tracing::info!("Found {} providers ({} eligible)", total, providers.len());

        let scorer = &self.scorer;
        let request_ref = &request;

        let scored: Vec<ScoredProvider> = stream::iter(providers)
            .map(|provider| async move {
                let outcome = ScoreOutcome::from(scorer.score(request_ref, &provider).await);
                if let ScoreOutcome::Degraded { reason } = &outcome {
                    tracing::warn!(
                        "Scoring failed for provider {} on request {}, using 0.0: {}",
                        provider.id,
                        request_ref.id,
                        reason
                    );
                }
                outcome.into_scored(provider)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let degraded = scored.iter().filter(|s| s.degraded).count();
        let matches = rank_by_score(scored);

        tracing::info!(
            "Ranked {} providers for request {} ({} degraded)",
            matches.len(),
            request.id,
            degraded
        );

        Ok(MatchResult {
            request,
            matches,
            degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use crate::services::{ScoreResponse, ScorerError};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FixedStore {
        request: Option<ServiceRequest>,
        providers: Result<Vec<Provider>, ()>,
    }

    #[async_trait]
    impl MatchStore for FixedStore {
        async fn get_request(&self, id: &str) -> Result<ServiceRequest, PostgresError> {
            self.request
                .clone()
                .filter(|r| r.id == id)
                .ok_or_else(|| PostgresError::NotFound(id.to_string()))
        }

        async fn list_providers(&self) -> Result<Vec<Provider>, PostgresError> {
            self.providers
                .clone()
                .map_err(|_| PostgresError::SqlxError(sqlx::Error::PoolTimedOut))
        }

        async fn health_check(&self) -> bool {
            true
        }
    }

    struct TableScorer(HashMap<String, f64>);

    #[async_trait]
    impl Scorer for TableScorer {
        async fn score(
            &self,
            _request: &ServiceRequest,
            provider: &Provider,
        ) -> Result<ScoreResponse, ScorerError> {
            self.0
                .get(&provider.id)
                .map(|score| ScoreResponse {
                    score: *score,
                    explanation: String::new(),
                })
                .ok_or_else(|| ScorerError::Unavailable("connection refused".to_string()))
        }
    }

    fn request() -> ServiceRequest {
        ServiceRequest {
            id: "R1".to_string(),
            title: "Fix sink".to_string(),
            description: "Leaky pipe".to_string(),
            location: None,
            budget: 0.0,
            status: "open".to_string(),
            user_id: "U1".to_string(),
        }
    }

    fn provider(id: &str, role: &str) -> Provider {
        Provider {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            role: role.to_string(),
            skills: vec![],
        }
    }

    fn pipeline(providers: Result<Vec<Provider>, ()>, scores: &[(&str, f64)]) -> RankingPipeline {
        let store = FixedStore {
            request: Some(request()),
            providers,
        };
        let scorer = TableScorer(scores.iter().map(|(id, s)| (id.to_string(), *s)).collect());
        RankingPipeline::new(Arc::new(store), Arc::new(scorer))
    }

    #[tokio::test]
    async fn test_failed_scoring_keeps_provider() {
        let pipeline = pipeline(
            Ok(vec![provider("P2", "provider"), provider("P1", "provider")]),
            &[("P1", 0.9)],
        );

        let result = pipeline.run("R1").await.unwrap();

        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].provider.id, "P1");
        assert_eq!(result.matches[1].provider.id, "P2");
        assert_eq!(result.matches[1].score, 0.0);
        assert!(result.matches[1].degraded);
        assert_eq!(result.degraded, 1);
    }

    #[tokio::test]
    async fn test_unknown_request_is_not_found() {
        let pipeline = pipeline(Ok(vec![provider("P1", "provider")]), &[("P1", 0.5)]);

        let err = pipeline.run("missing").await.unwrap_err();

        assert!(matches!(err, MatchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_provider_storage_failure_is_retrieval_error() {
        let pipeline = pipeline(Err(()), &[]);

        let err = pipeline.run("R1").await.unwrap_err();

        assert!(matches!(err, MatchError::Retrieval(_)));
    }

    struct BrokenLookupStore;

    #[async_trait]
    impl MatchStore for BrokenLookupStore {
        async fn get_request(&self, _id: &str) -> Result<ServiceRequest, PostgresError> {
            Err(PostgresError::SqlxError(sqlx::Error::PoolTimedOut))
        }

        async fn list_providers(&self) -> Result<Vec<Provider>, PostgresError> {
            Ok(vec![provider("P1", "provider")])
        }

        async fn health_check(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_request_lookup_storage_failure_is_retrieval_error() {
        let pipeline = RankingPipeline::new(
            Arc::new(BrokenLookupStore),
            Arc::new(TableScorer(HashMap::new())),
        );

        let err = pipeline.run("R1").await.unwrap_err();

        assert!(matches!(err, MatchError::Retrieval(PostgresError::SqlxError(_))));
    }

    #[tokio::test]
    async fn test_ineligible_users_are_skipped() {
        let pipeline = pipeline(
            Ok(vec![provider("P1", "provider"), provider("C1", "client")]),
            &[("P1", 0.4), ("C1", 0.8)],
        );

        let result = pipeline.run("R1").await.unwrap();

        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].provider.id, "P1");
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let pipeline = pipeline(Ok(vec![]), &[]).with_concurrency(0);
        assert_eq!(pipeline.concurrency(), 1);
    }
}

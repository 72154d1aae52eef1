use crate::models::{Provider, ScoredProvider};
use crate::services::{ScoreResponse, ScorerError};

/// Score substituted when the scoring service cannot produce one
pub const DEGRADED_SCORE: f64 = 0.0;

/// Result of scoring one provider
///
/// A failed scoring call is never fatal: it becomes `Degraded`, which still
/// ranks the provider, at [`DEGRADED_SCORE`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored { score: f64, explanation: String },
    Degraded { reason: String },
}

impl ScoreOutcome {
    pub fn score(&self) -> f64 {
        match self {
            ScoreOutcome::Scored { score, .. } => *score,
            ScoreOutcome::Degraded { .. } => DEGRADED_SCORE,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ScoreOutcome::Degraded { .. })
    }

    /// Attach the outcome to its provider
    pub fn into_scored(self, provider: Provider) -> ScoredProvider {
        ScoredProvider {
            score: self.score(),
            degraded: self.is_degraded(),
            provider,
        }
    }
}

impl From<Result<ScoreResponse, ScorerError>> for ScoreOutcome {
    fn from(result: Result<ScoreResponse, ScorerError>) -> Self {
        match result {
            Ok(response) => ScoreOutcome::Scored {
                score: response.score,
                explanation: response.explanation,
            },
            Err(e) => ScoreOutcome::Degraded {
                reason: e.to_string(),
            },
        }
    }
}

// Core ranking exports
pub mod pipeline;
pub mod ranking;
pub mod scoring;

pub use pipeline::{MatchError, MatchResult, RankingPipeline};
pub use ranking::{is_ranked, rank_by_score};
pub use scoring::{ScoreOutcome, DEGRADED_SCORE};

//! Matching Engine - ranks service providers for MatchOS service requests
//!
//! Each match run loads a service request and every provider, asks an
//! external scoring service for a score per provider, and returns the
//! providers ordered by score. A failed scoring call never removes a
//! provider from the result; it is ranked with a score of zero instead.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchError, MatchResult, RankingPipeline, ScoreOutcome, rank_by_score};
pub use models::{MatchRequest, MatchResponse, Provider, ScoredProvider, ServiceRequest};
pub use services::{MatchStore, Scorer};

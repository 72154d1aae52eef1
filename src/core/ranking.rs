use crate::models::ScoredProvider;

/// Sort scored providers by score, highest first
///
/// The sort is stable, so equal scores keep the order in which providers
/// were loaded. NaN scores rank first (IEEE total order).
pub fn rank_by_score(mut scored: Vec<ScoredProvider>) -> Vec<ScoredProvider> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// True when every adjacent pair is in descending score order
pub fn is_ranked(scored: &[ScoredProvider]) -> bool {
    scored.windows(2).all(|pair| pair[0].score.total_cmp(&pair[1].score).is_ge())
}

// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Provider, ScoredProvider, ServiceRequest, PROVIDER_ROLE};
pub use requests::MatchRequest;
pub use responses::{ErrorResponse, HealthResponse, MatchResponse, ServiceInfo};

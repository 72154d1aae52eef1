use serde::{Deserialize, Serialize};

/// Request to rank providers for a service request
///
/// Any string is accepted as an id; ids that match no request are reported
/// as not found by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    #[serde(alias = "request_id", rename = "requestId")]
    pub request_id: String,
}

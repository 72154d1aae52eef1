use serde::{Deserialize, Serialize};

/// Role a user must carry to be considered as a match candidate
pub const PROVIDER_ROLE: &str = "provider";

/// Service request being matched against providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub budget: f64,
    pub status: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl ServiceRequest {
    /// Text sent to the scorer: description enriched with the title
    pub fn enriched_context(&self) -> String {
        format!("{} {}", self.description, self.title)
    }
}

/// User with the provider role and the skills they offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Provider {
    pub id: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Provider {
    pub fn is_eligible(&self) -> bool {
        self.role == PROVIDER_ROLE
    }
}

/// Provider paired with the score it received for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredProvider {
    pub provider: Provider,
    pub score: f64,
    /// Set when `score` is the substitute for a failed scoring call
    #[serde(skip)]
    pub degraded: bool,
}

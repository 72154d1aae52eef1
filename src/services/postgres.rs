use crate::models::{Provider, ServiceRequest};
use crate::services::MatchStore;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when reading from PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Read-only PostgreSQL client for service requests and providers
///
/// The pool is created once at startup and shared by every worker; call
/// [`PostgresClient::close`] on shutdown.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL at {}", redact_url(url));

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Fetch a single service request by id
    ///
    /// Ids that are not UUIDs cannot match any row and are reported as
    /// not found without querying.
    pub async fn get_request(&self, id: &str) -> Result<ServiceRequest, PostgresError> {
        let uuid = Uuid::parse_str(id)
            .map_err(|_| PostgresError::NotFound(format!("Request {} not found", id)))?;

        let query = r#"
            SELECT
                id::text AS id,
                title,
                description,
                location::text AS location,
                COALESCE(budget, 0)::float8 AS budget,
                status::text AS status,
                user_id::text AS user_id
            FROM request
            WHERE id = $1
        "#;

        let request = sqlx::query_as::<_, ServiceRequest>(query)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| PostgresError::NotFound(format!("Request {} not found", id)))?;

        tracing::debug!("Loaded request {} ({})", request.id, request.title);

        Ok(request)
    }

    /// Fetch every user with the provider role
    pub async fn list_providers(&self) -> Result<Vec<Provider>, PostgresError> {
        let query = r#"
            SELECT
                id::text AS id,
                email,
                role::text AS role,
                COALESCE(skills, '{}'::text[]) AS skills
            FROM users
            WHERE role = 'provider'
        "#;

        let providers = sqlx::query_as::<_, Provider>(query)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Loaded {} providers", providers.len());

        Ok(providers)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    /// Close the pool, waiting for checked-out connections to be returned
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}

#[async_trait]
impl MatchStore for PostgresClient {
    async fn get_request(&self, id: &str) -> Result<ServiceRequest, PostgresError> {
        PostgresClient::get_request(self, id).await
    }

    async fn list_providers(&self) -> Result<Vec<Provider>, PostgresError> {
        PostgresClient::list_providers(self).await
    }

    async fn health_check(&self) -> bool {
        match PostgresClient::health_check(self).await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("PostgreSQL health check failed: {}", e);
                false
            }
        }
    }
}

/// Strip the password from a connection URL before logging it
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let credentials = &url[scheme_end + 3..at];
            match credentials.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

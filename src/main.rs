use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use matching_engine::config::{LoggingSettings, Settings};
use matching_engine::core::RankingPipeline;
use matching_engine::routes::{self, AppState};
use matching_engine::services::{PostgresClient, ScorerClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Initialize logging; `RUST_LOG` takes precedence over the configured level
fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_logging(&LoggingSettings {
                level: "info".to_string(),
                format: "json".to_string(),
            });
            return Err(startup_error("Failed to load configuration", e));
        }
    };

    init_logging(&settings.logging);

    info!("Starting MatchOS matching engine...");

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?,
    );

    info!("PostgreSQL client initialized");

    let scorer = Arc::new(
        ScorerClient::new(
            settings.scorer.url.clone(),
            Duration::from_secs(settings.scorer.timeout_secs),
        )
        .map_err(|e| startup_error("Failed to create scorer client", e))?,
    );

    info!(
        "Scorer client targeting {} (timeout: {}s, concurrency: {})",
        scorer.url(),
        settings.scorer.timeout_secs,
        settings.scorer.concurrency
    );

    let pipeline = RankingPipeline::new(postgres.clone(), scorer)
        .with_concurrency(settings.scorer.concurrency);

    let app_state = AppState { pipeline };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Matching engine running on {}:{}", host, port);

    let result = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    postgres.close().await;
    info!("Matching engine stopped");

    result
}

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use thesis_match::config::Settings;
use thesis_match::core::Matcher;
use thesis_match::routes::{self, handle_json_payload_error, handle_query_payload_error, AppState};
use thesis_match::services::PostgresClient;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting Thesis Match scoring service...");
    info!("Configuration loaded successfully");

    // Initialize PostgreSQL client (optional - scoring works without it)
    let store = match &settings.database {
        Some(db) => {
            let client = PostgresClient::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;

            info!(
                "PostgreSQL client initialized (max: {} connections)",
                db.max_connections.unwrap_or(10)
            );
            Some(Arc::new(client))
        }
        None => {
            warn!("No database configured, theses and results will not be persisted");
            None
        }
    };

    // Initialize matcher with configured weights
    let weights = settings.scoring_weights();
    let matcher = Matcher::new(weights).map_err(|e| {
        error!("Invalid scoring weights: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Matcher initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        matcher,
        store,
        matching: settings.matching.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

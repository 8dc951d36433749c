use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wavelength_algo::config::{LoggingSettings, Settings};
use wavelength_algo::core::Matcher;
use wavelength_algo::routes::{self, handle_json_payload_error, matches::AppState};

fn config_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e))
}

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level)),
        )
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Logging is configured from the settings, so nothing is logged before they load
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        config_error(e)
    })?;

    init_logging(&settings.logging);

    info!("Starting Wavelength scoring service...");

    let matcher = Matcher::new(settings.scoring).map_err(|e| {
        error!("Invalid scoring table: {}", e);
        config_error(e)
    })?;

    info!(
        "Matcher initialized ({} A clusters, {} B clusters, tau {})",
        matcher.config().clusters.a.len(),
        matcher.config().clusters.b.len(),
        matcher.config().ranking.tau
    );

    let app_state = AppState { matcher };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(
                web::JsonConfig::default()
                    .limit(4 * 1024 * 1024)
                    .error_handler(handle_json_payload_error),
            )
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

mod config;
mod ingest;
mod model;
mod predict;
mod routes;
mod schema;
#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use config::ServerConfig;
use model::LoadedArtifacts;
use routes::configure_routes;
use schema::FULL_FEATURE_COUNT;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    log::info!("Configuration: {:?}", config);

    let artifacts = LoadedArtifacts::load(&config.model_path, &config.scaler_path);
    log::info!("Model expects: {} features", artifacts.expected_features());
    log::info!("Using columns: {:?}", artifacts.schema().names());
    if artifacts.ready().is_some() && artifacts.expected_features() < FULL_FEATURE_COUNT {
        log::warn!(
            "Only the first {} of {} canonical features are used; check that the model was trained on that prefix",
            artifacts.expected_features(),
            FULL_FEATURE_COUNT
        );
    }

    let bind_address = config.bind_address();
    let artifacts = web::Data::new(artifacts);
    let config = web::Data::new(config);

    log::info!("Starting server on {}", bind_address);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(artifacts.clone())
            .configure(|cfg| configure_routes(cfg, config.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}

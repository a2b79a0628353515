mod config;
mod model;
mod recommendations;
mod routes;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::AppConfig;
use model::Model;
use routes::configure_routes;
use std::env;
use std::path::Path;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let model = Model::load(&config.model_path);
    if !model.is_loaded() {
        log::warn!("Starting without a model; /predict will answer 503");
    }

    let frontend_dir = if Path::new(&config.frontend_dir).is_dir() {
        log::info!("Serving frontend from {}", config.frontend_dir);
        Some(config.frontend_dir.clone())
    } else {
        log::warn!("Frontend directory {} not found", config.frontend_dir);
        None
    };

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    let model = web::Data::new(model);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(model.clone())
            .app_data(config.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}

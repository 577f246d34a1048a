mod classifier;
mod config;
mod error;
mod handlers;
mod models;
mod preprocess;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use log::{error, info};
use std::io;
use std::sync::Arc;

use classifier::OnnxClassifier;
use config::Config;
use handlers::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    config.validate().map_err(|e| {
        error!("invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let classifier = OnnxClassifier::load(&config).map_err(|e| {
        error!("failed to load model: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let state = web::Data::new(AppState {
        predictor: Arc::new(classifier),
        image_size: config.image_size,
    });

    info!("Server running at http://{}", config.bind);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::routes)
    })
    .bind(&config.bind)?
    .run()
    .await
}

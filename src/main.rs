use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use std::io;

use config::{ApiCredentials, Config};
use store::Backend;

mod config;
mod errors;
mod handlers;
mod models;
mod store;
mod utils;

pub struct AppState {
    pub backend: Backend,
    pub credentials: Option<ApiCredentials>,
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("{e}");
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let backend = Backend::open(
        config.backend,
        &config.data_path,
        config.session_idle_timeout,
    )
    .map_err(|e| {
        log::error!("could not open note storage: {e}");
        io::Error::new(io::ErrorKind::Other, e.to_string())
    })?;
    log::info!(
        "serving notes from the {:?} backend ({})",
        config.backend,
        config.data_path.display()
    );
    if config.credentials.is_none() {
        log::info!("API credentials are not configured, note secrets stay hidden");
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(config.rate_limit_interval_secs)
        .burst_size(config.rate_limit_burst)
        .finish()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid rate limit"))?;

    let state = web::Data::new(AppState {
        backend,
        credentials: config.credentials.clone(),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .expose_headers([header::LOCATION])
                    .max_age(3600),
            )
            .wrap(Governor::new(&governor_conf))
            .wrap(Logger::default())
            .configure(handlers::config_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod directory;
mod docs;
mod error;
mod leave;
mod model;
mod models;
mod routes;
#[cfg(test)]
mod test_support;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::leave::calendar::HolidayCalendar;
use crate::utils::employee_cache::ActiveEmployeeCache;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Time-off service is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "timeoff.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(server_addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url).await?;

    if let Some((username, password)) = &config.bootstrap_admin {
        let created = directory::bootstrap_admin(&pool, username, password)
            .await
            .context("failed to create bootstrap administrator")?;
        if created {
            info!(username = %username, "Bootstrap administrator created");
        }
    }

    let calendar = match &config.holidays_file {
        Some(path) => HolidayCalendar::load(path)?,
        None => HolidayCalendar::built_in(),
    };

    let cache = ActiveEmployeeCache::new(config.active_cache_ttl);
    let pool_for_cache_warmup = pool.clone();
    let cache_for_warmup = cache.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = cache_for_warmup.warmup(&pool_for_cache_warmup, 250).await {
            error!(error = %e, "Failed to warm up active employee cache");
        }
    });

    let server_addr = config.server_addr.clone();
    let pool = Data::new(pool);
    let calendar = Data::new(calendar);
    let cache = Data::new(cache);
    let config_data = Data::new(config.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard matches the JS/CSS assets
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(pool.clone())
            .app_data(config_data.clone())
            .app_data(calendar.clone())
            .app_data(cache.clone())
            .service(index)
            // auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}

use std::sync::Arc;

use actix_governor::Governor;
use actix_web::middleware::NormalizePath;
use actix_web::web::{self, Data};
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use employee_portal::config::Config;
use employee_portal::db::init_db;
use employee_portal::docs::ApiDoc;
use employee_portal::routes;
use employee_portal::store::{EmployeeStore, MySqlEmployeeStore};

#[get("/")]
async fn index() -> impl Responder {
    "Employee portal is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // refuses to start without DATABASE_URL
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;
    let store: Arc<dyn EmployeeStore> = Arc::new(MySqlEmployeeStore::new(pool));

    let limiter = routes::limiter_from(&config)?;
    let frontend_url = config.frontend_url.clone();
    let server_store = store.clone();

    info!(host = %config.host, port = config.port, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(routes::security_headers())
            .wrap(Governor::new(&limiter))
            .wrap(routes::cors(&frontend_url))
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::from(server_store.clone()))
            .service(index)
            .configure(routes::configure)
            .default_service(web::to(routes::not_found))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    // HttpServer handles SIGINT/SIGTERM and drains workers before returning
    info!("Server stopped, closing store");
    store.close().await;

    Ok(())
}

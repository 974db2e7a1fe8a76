use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use registrar::{Coordinator, MemorySession};
use registrar_http::HttpDirectory;
use registrar_server::{config::Config, routes};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let coordinator = Data::new(Coordinator::new(HttpDirectory::new(&config.upstream)?));
    let session = Data::new(MemorySession::new(config.session_token.clone()));

    info!(
        bind = %config.bind,
        upstream = %config.upstream.base_url(),
        "starting registrar"
    );
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(coordinator.clone())
            .app_data(session.clone())
            .configure(routes::configure::<HttpDirectory>)
    })
    .bind(config.bind)?
    .run()
    .await?;
    Ok(())
}

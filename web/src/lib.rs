//! The admin HTTP surface (§10.5): a small `actix-web` service exposing
//! the admin verbs of §6 as JSON POST endpoints under
//! `/connectors/{name}/{verb}`, plus `GET /connectors/{name}/status` and
//! `GET /connectors`. Handlers only read/write `SupervisorRegistry`; they
//! never touch translation logic directly.

pub mod handlers;
pub mod result;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use supervisor::SupervisorRegistry;

/// Builds and runs the admin HTTP server bound to `bind_addr`. Runs until
/// the process is terminated; callers `tokio::spawn` this alongside the
/// connector supervisor tasks so both share the same `SharedStatusTable`
/// within one process (§5).
pub async fn serve(registry: Arc<SupervisorRegistry>, bind_addr: &str) -> std::io::Result<()> {
    tracing::info!(bind_addr, "starting admin HTTP server");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(registry.clone()))
            .wrap(Cors::permissive())
            .service(web::resource("/connectors").route(web::get().to(handlers::list)))
            .service(web::resource("/connectors/{name}/status").route(web::get().to(handlers::status)))
            .service(web::resource("/connectors/{name}/{verb}").route(web::post().to(handlers::dispatch)))
    })
    .bind(bind_addr)?
    .run()
    .await
}

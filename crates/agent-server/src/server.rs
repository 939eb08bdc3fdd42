use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::io;

use crate::handlers;
use crate::state::{AppState, ServerConfig};

/// Registers every `/api/v1` route. `AppState` must be supplied as app data.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/chat", web::post().to(handlers::chat::handler))
            .route("/chat/stream", web::post().to(handlers::stream::handler))
            .route("/stop/{conversation_key}", web::post().to(handlers::stop::handler))
            .route(
                "/history/{conversation_key}",
                web::get().to(handlers::history::get_history),
            )
            .route(
                "/history/{conversation_key}",
                web::delete().to(handlers::history::clear_history),
            )
            .route("/history-stats", web::get().to(handlers::history::stats))
            .route("/tools", web::get().to(handlers::tools::list))
            .route("/tools/refresh", web::post().to(handlers::tools::refresh))
            .route("/health", web::get().to(handlers::health::handler)),
    );
}

pub async fn run_server(config: ServerConfig) -> io::Result<()> {
    let state = web::Data::new(AppState::from_config(&config).await);

    log::info!("Listening on 0.0.0.0:{}", config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind(format!("0.0.0.0:{}", config.port))?
    .run()
    .await
}

use actix_web::{web, HttpRequest, HttpResponse, Responder};

use super::call_context;
use crate::state::AppState;

pub async fn list(state: web::Data<AppState>) -> impl Responder {
    let tools = state.tools.catalogue();

    HttpResponse::Ok().json(serde_json::json!({
        "count": tools.len(),
        "tools": tools,
    }))
}

/// Re-runs discovery across every provider.
pub async fn refresh(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let tools = state.tools.discover_all(&call_context(&req)).await;
    log::info!("Tool catalogue refreshed: {} tools", tools.len());

    HttpResponse::Ok().json(serde_json::json!({
        "count": tools.len(),
        "tools": tools,
    }))
}

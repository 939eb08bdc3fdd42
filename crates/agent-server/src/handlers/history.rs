use actix_web::{web, HttpResponse, Responder};
use agent_core::MAX_ENTRIES_PER_KEY;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn get_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> impl Responder {
    let conversation_key = path.into_inner();
    let limit = query.limit.unwrap_or(MAX_ENTRIES_PER_KEY);
    let messages = state.history.recent(&conversation_key, limit);

    HttpResponse::Ok().json(serde_json::json!({
        "conversation_key": conversation_key,
        "messages": messages,
    }))
}

pub async fn clear_history(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let conversation_key = path.into_inner();
    let cleared = state.history.clear(&conversation_key);
    log::info!("[{}] History cleared: {}", conversation_key, cleared);

    HttpResponse::Ok().json(serde_json::json!({
        "conversation_key": conversation_key,
        "cleared": cleared,
    }))
}

pub async fn stats(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.history.stats())
}

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct StopResponse {
    success: bool,
    message: String,
}

pub async fn handler(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let conversation_key = path.into_inner();
    log::info!("[{}] Stop request received", conversation_key);

    if state.cancel(&conversation_key).await {
        HttpResponse::Ok().json(StopResponse {
            success: true,
            message: "Streaming stopped".to_string(),
        })
    } else {
        log::warn!("[{}] No active stream found", conversation_key);
        HttpResponse::NotFound().json(StopResponse {
            success: false,
            message: "No active stream found".to_string(),
        })
    }
}

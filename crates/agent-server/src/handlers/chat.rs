use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use super::{call_context, ChatRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub conversation_key: String,
    pub reply: String,
}

pub async fn handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ChatRequest>,
) -> impl Responder {
    if body.message.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "message must not be empty"
        }));
    }

    let conversation_key = body.conversation_key();
    log::info!("[{}] Chat request received", conversation_key);

    let reply = state
        .orchestrator
        .chat(&conversation_key, &body.message, &call_context(&req))
        .await;

    HttpResponse::Ok().json(ChatResponse {
        conversation_key,
        reply,
    })
}

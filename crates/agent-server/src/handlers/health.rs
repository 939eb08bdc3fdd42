use actix_web::{web, HttpResponse, Responder};

use crate::state::AppState;

pub async fn handler(state: web::Data<AppState>) -> impl Responder {
    let providers = state.tools.health().await;

    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "providers": providers,
    }))
}

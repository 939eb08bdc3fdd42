use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use agent_loop::StreamRequest;

use super::{call_context, ChatRequest};
use crate::sse::SseSink;
use crate::state::AppState;

/// Header carrying the conversation key, useful when the server generated it.
pub const CONVERSATION_KEY_HEADER: &str = "X-Conversation-Key";

pub async fn handler(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: web::Json<ChatRequest>,
) -> impl Responder {
    if payload.message.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "message must not be empty"
        }));
    }

    let conversation_key = payload.conversation_key();
    log::info!("[{}] Stream started", conversation_key);

    let registration = state.register_cancel_token(&conversation_key).await;
    let request = StreamRequest::new(conversation_key.clone(), payload.into_inner().message)
        .with_context(call_context(&req))
        .with_cancel(registration.token.clone());

    let (sink, body) = SseSink::channel();
    let state = state.get_ref().clone();
    let key = conversation_key.clone();

    tokio::spawn(async move {
        state.streamer.chat_stream(request, sink).await;
        state.release_cancel_token(&key, &registration).await;
        log::debug!("[{}] Stream finished", key);
    });

    HttpResponse::Ok()
        .append_header((header::CONTENT_TYPE, "text/event-stream"))
        .append_header((header::CACHE_CONTROL, "no-cache"))
        .append_header((header::CONNECTION, "keep-alive"))
        .append_header((CONVERSATION_KEY_HEADER, conversation_key))
        .streaming(body)
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use agent_core::StreamEvent;
    use agent_llm::AssistantReply;
    use serde_json::json;

    use super::CONVERSATION_KEY_HEADER;
    use crate::handlers::test_support::{app_state, CannedLlm};
    use crate::server::app_config;

    fn parse_frames(body: &[u8]) -> Vec<StreamEvent> {
        std::str::from_utf8(body)
            .unwrap()
            .split("\n\n")
            .filter_map(|frame| frame.strip_prefix("data: "))
            .map(|json| serde_json::from_str(json).unwrap())
            .collect()
    }

    #[actix_web::test]
    async fn stream_relays_events_as_sse_frames() {
        let state = app_state(CannedLlm::new(vec![AssistantReply::default()], &["Hel", "lo"]));
        let app = test::init_service(App::new().app_data(state.clone()).configure(app_config)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/chat/stream")
            .set_json(json!({"conversation_key": "k1", "message": "hi"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/event-stream"
        );
        assert_eq!(resp.headers().get(CONVERSATION_KEY_HEADER).unwrap(), "k1");

        let body = test::read_body(resp).await;
        let events = parse_frames(&body);

        assert_eq!(events[0], StreamEvent::status("Discovering available tools..."));
        assert_eq!(events[1], StreamEvent::Heartbeat);
        assert_eq!(
            events.last(),
            Some(&StreamEvent::Complete {
                content: "Hello".to_string()
            })
        );
        assert_eq!(state.history.len("k1"), 2);
    }
}

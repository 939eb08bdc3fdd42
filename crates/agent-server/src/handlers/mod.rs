pub mod chat;
pub mod health;
pub mod history;
pub mod stop;
pub mod stream;
pub mod tools;

use actix_web::http::header;
use actix_web::HttpRequest;
use agent_tools::CallContext;
use serde::Deserialize;
use uuid::Uuid;

/// Body shared by `/chat` and `/chat/stream`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_key: Option<String>,
    pub message: String,
}

impl ChatRequest {
    pub fn conversation_key(&self) -> String {
        self.conversation_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

/// Forwards an incoming bearer token as the tool credential for this turn only.
pub fn call_context(req: &HttpRequest) -> CallContext {
    let credential = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    match credential {
        Some(token) => CallContext::with_credential(token),
        None => CallContext::default(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn bearer_header_becomes_call_credential() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc123"))
            .to_http_request();

        assert_eq!(call_context(&req), CallContext::with_credential("abc123"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic Zm9vOmJhcg=="))
            .to_http_request();

        assert_eq!(call_context(&req), CallContext::default());
    }

    #[test]
    fn blank_key_gets_generated() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"conversation_key": "  ", "message": "hi"}"#).unwrap();

        assert!(Uuid::parse_str(&request.conversation_key()).is_ok());
    }
}

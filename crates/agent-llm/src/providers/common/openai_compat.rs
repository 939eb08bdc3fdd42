//! OpenAI-compatible request serialization helpers.
//!
//! Both the router and responder calls speak the chat-completions shape. These helpers build
//! the JSON body without leaking internal `agent_core::Message` fields (like `id` /
//! `created_at`) and read the non-streamed response back.

use agent_core::{Message, ToolCall, ToolSchema};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::provider::Result;
use crate::types::AssistantReply;

/// Convert internal [`Message`] values to an OpenAI-compatible JSON array.
///
/// This intentionally omits internal fields like `id` and `created_at`.
pub fn messages_to_openai_compat_json(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let mut msg = json!({
                "role": m.role.as_str(),
                "content": m.content,
            });

            if let Some(tool_call_id) = &m.tool_call_id {
                msg["tool_call_id"] = json!(tool_call_id);
            }

            if let Some(tool_calls) = &m.tool_calls {
                msg["tool_calls"] = json!(tool_calls);
            }

            msg
        })
        .collect()
}

/// Build a chat-completions request body.
///
/// `tools` and `tool_choice` are only present when at least one tool is attached.
pub fn build_openai_compat_body(
    model: &str,
    messages: &[Message],
    tools: &[ToolSchema],
    stream: bool,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages_to_openai_compat_json(messages),
        "stream": stream,
    });

    if !tools.is_empty() {
        body["tools"] = json!(tools);
        body["tool_choice"] = json!("auto");
    }

    body
}

#[derive(Debug, Deserialize)]
struct OpenAICompatCompletion {
    #[serde(default)]
    choices: Vec<OpenAICompatChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatChoice {
    message: OpenAICompatMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

/// Read `choices[0].message` out of a non-streamed completion body.
///
/// A body with no choices yields an empty reply rather than an error.
pub fn parse_openai_compat_completion(body: &str) -> Result<AssistantReply> {
    let completion: OpenAICompatCompletion = serde_json::from_str(body)?;

    let Some(choice) = completion.choices.into_iter().next() else {
        return Ok(AssistantReply::default());
    };

    Ok(AssistantReply {
        content: choice.message.content,
        tool_calls: choice.message.tool_calls.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{FunctionSchema, Role};

    fn listing_tool() -> ToolSchema {
        ToolSchema {
            schema_type: "function".to_string(),
            function: FunctionSchema {
                name: "findListings".to_string(),
                description: "Search listings".to_string(),
                parameters: json!({"type": "object", "properties": {"city": {"type": "string"}}}),
            },
        }
    }

    #[test]
    fn messages_omit_internal_fields() {
        let out = messages_to_openai_compat_json(&[Message::user("Hello")]);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["role"], "user");
        assert_eq!(out[0]["content"], "Hello");
        assert!(out[0].get("id").is_none());
        assert!(out[0].get("created_at").is_none());
    }

    #[test]
    fn messages_handle_all_roles() {
        let messages = vec![
            Message::system("You are helpful"),
            Message::user("Hello"),
            Message::assistant("Hi there"),
            Message::tool_result("call_1", "Result"),
        ];

        let out = messages_to_openai_compat_json(&messages);
        let roles: Vec<&str> = out.iter().map(|m| m["role"].as_str().unwrap()).collect();

        assert_eq!(roles, vec!["system", "user", "assistant", "tool"]);
        assert_eq!(out[3]["tool_call_id"], "call_1");
    }

    #[test]
    fn pending_tool_call_message_has_null_content() {
        let message =
            Message::assistant_tool_calls(vec![ToolCall::new("call_1", "findListings", "{}")]);
        assert_eq!(message.role, Role::Assistant);

        let out = messages_to_openai_compat_json(&[message]);

        assert!(out[0]["content"].is_null());
        assert_eq!(out[0]["tool_calls"][0]["function"]["name"], "findListings");
    }

    #[test]
    fn body_with_tools_sets_auto_tool_choice() {
        let body =
            build_openai_compat_body("router-model", &[Message::user("hi")], &[listing_tool()], false);

        assert_eq!(body["model"], "router-model");
        assert_eq!(body["stream"], false);
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "findListings");
    }

    #[test]
    fn body_without_tools_omits_tool_fields() {
        let body = build_openai_compat_body("responder-model", &[Message::user("hi")], &[], true);

        assert_eq!(body["stream"], true);
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn completion_with_tool_calls_parses() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null,"tool_calls":[
            {"id":"call_1","type":"function","function":{"name":"findListings","arguments":"{\"city\":\"Portland\"}"}}
        ]}}]}"#;

        let reply = parse_openai_compat_completion(body).unwrap();

        assert!(reply.content.is_none());
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].name(), "findListings");
        assert_eq!(reply.tool_calls[0].function.arguments, r#"{"city":"Portland"}"#);
    }

    #[test]
    fn completion_with_text_parses() {
        let body = r#"{"choices":[{"message":{"content":"Hello!"}}]}"#;

        let reply = parse_openai_compat_completion(body).unwrap();

        assert_eq!(reply.non_empty_content(), Some("Hello!"));
        assert!(reply.tool_calls.is_empty());
    }

    #[test]
    fn completion_without_choices_is_empty_reply() {
        let reply = parse_openai_compat_completion(r#"{"choices":[]}"#).unwrap();
        assert_eq!(reply, AssistantReply::default());
    }

    #[test]
    fn invalid_completion_body_errors() {
        assert!(parse_openai_compat_completion("{not json").is_err());
    }
}

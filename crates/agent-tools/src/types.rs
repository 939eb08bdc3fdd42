use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-call options. Credentials travel with the call, never on the shared client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    pub credential: Option<String>,
}

impl CallContext {
    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            credential: Some(credential.into()),
        }
    }
}

/// Body of `POST /tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    pub arguments: Value,
}

/// Raw payload returned by a provider for a tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolCallResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ToolCallResponse {
    pub fn success(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(Value::String(message.into())),
        }
    }

    /// The provider-reported error, if any. `null` counts as no error.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderHealth {
    pub id: String,
    pub healthy: bool,
}

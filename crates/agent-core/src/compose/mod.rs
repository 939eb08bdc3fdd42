//! Builds the user-side message that carries a tool's result into the responder call.

use serde_json::Value;

use crate::tools::ToolCall;

/// Tools whose results get a tailored framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolKind {
    FindListings,
    GetAnalytics,
    SendReport,
    Unknown(String),
}

impl ToolKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "findListings" | "find_listings" => ToolKind::FindListings,
            "getAnalytics" | "get_analytics" => ToolKind::GetAnalytics,
            "sendReport" | "send_report" => ToolKind::SendReport,
            other => ToolKind::Unknown(other.to_string()),
        }
    }
}

pub fn build_tool_context_message(
    user_message: &str,
    tool_call: &ToolCall,
    tool_result: &Value,
) -> String {
    let request = format!("User request: \"{}\"", user_message);

    match ToolKind::from_name(tool_call.name()) {
        ToolKind::FindListings => {
            let listings = listing_items(tool_result);
            if listings.is_empty() {
                format!(
                    "{request}\n\nI searched the listings but found no properties matching this request.\n\n\
                     Let the user know nothing matched and suggest how they could broaden the search."
                )
            } else {
                format!(
                    "{request}\n\nI found {} {} matching this request:\n{}\n\n\
                     Present these properties to the user in a friendly, helpful way. Mention the key \
                     details of each one and do not invent properties that are not listed above.",
                    listings.len(),
                    if listings.len() == 1 { "property" } else { "properties" },
                    pretty(&Value::Array(listings)),
                )
            }
        }
        ToolKind::GetAnalytics => format!(
            "{request}\n\nHere is the analytics data retrieved for this request:\n{}\n\n\
             Explain the most important insights from this data clearly and concisely.",
            pretty(tool_result)
        ),
        ToolKind::SendReport => format!(
            "{request}\n\nI attempted to send the requested report. Outcome:\n{}\n\n\
             Tell the user whether the report was sent, based only on this outcome.",
            pretty(tool_result)
        ),
        ToolKind::Unknown(_) => format!(
            "{request}\n\nTool result: {}\n\nUse this result to answer the user's request.",
            tool_result
        ),
    }
}

/// Listing results arrive either as a bare array or wrapped in an object.
fn listing_items(result: &Value) -> Vec<Value> {
    match result {
        Value::Array(items) => items.clone(),
        Value::Object(map) => ["listings", "properties", "results"]
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

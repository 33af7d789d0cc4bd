//! Wire types for the chat endpoint.
//!
//! Outbound: an OpenAI-chat-completion-like request with a bounded message
//! history. Inbound: SSE `data:` payloads shaped like completion chunks, plus
//! a `metadata` side channel reporting the model the server routed to.

use serde::{Deserialize, Serialize};

use crate::catalog::{AUTO_MODEL_ID, WEB_SEARCH_SUFFIX};
use crate::store::{ConversationMessage, Sender};

/// SSE payload marking the end of meaningful content. Not an error.
pub const DONE_SENTINEL: &str = "[DONE]";

/// SSE event name whose following `data:` line carries routing metadata.
pub const METADATA_EVENT: &str = "metadata";

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Request body sent to the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub stream: bool,
    pub messages: Vec<WireMessage>,
}

/// One `{role, content}` pair of the outbound history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// A streamed completion chunk. Fields we do not consume are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Payload of the `metadata` side channel.
///
/// The server also reports its classification verdict here; only the final
/// model id is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamMetadata {
    #[serde(default)]
    pub final_model_used_for_generation: Option<String>,
}

/// Token usage reported on the stream. Diagnostics only, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// The model id put on the wire for a selection.
///
/// `auto` passes through untouched; a concrete id gains the web-search
/// suffix when augmentation is enabled.
#[must_use]
pub fn wire_model_id(selected: &str, web_search: bool) -> String {
    if web_search && selected != AUTO_MODEL_ID {
        let mut id = String::with_capacity(selected.len() + WEB_SEARCH_SUFFIX.len());
        id.push_str(selected);
        id.push_str(WEB_SEARCH_SUFFIX);
        id
    } else {
        selected.to_string()
    }
}

#[inline]
fn role_for(sender: Sender) -> &'static str {
    match sender {
        Sender::User => ROLE_USER,
        Sender::Ai => ROLE_ASSISTANT,
    }
}

/// Derive the outbound history: the last `limit` prior messages as
/// `{role, content}` pairs, followed by the new user input.
///
/// Reasoning and model metadata never go on the wire.
#[must_use]
pub fn history_payload(
    messages: &[ConversationMessage],
    limit: usize,
    input: &str,
) -> Vec<WireMessage> {
    let start = messages.len().saturating_sub(limit);
    let recent = &messages[start..];
    let mut payload = Vec::with_capacity(recent.len() + 1);
    for msg in recent {
        payload.push(WireMessage {
            role: role_for(msg.sender).to_string(),
            content: msg.content.clone(),
        });
    }
    payload.push(WireMessage {
        role: ROLE_USER.to_string(),
        content: input.to_string(),
    });
    payload
}

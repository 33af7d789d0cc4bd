//! Stream parsing: line decoding and event classification.

pub mod decoder;

pub use decoder::{LineBatch, LineDecoder};

use crate::protocol::{
    ChatCompletionChunk, StreamMetadata, TokenUsage, DONE_SENTINEL, METADATA_EVENT,
};

/// A classified event from the decoded line stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Final model id reported by the metadata side channel.
    Model(String),
    /// Incremental text for one or both channels of the open response.
    Delta {
        content: Option<String>,
        reasoning: Option<String>,
    },
    /// Token usage diagnostics carried on a chunk.
    Usage(TokenUsage),
    /// The termination sentinel. Not content, not an error.
    Done,
}

/// Folds decoded lines into [`StreamEvent`]s.
///
/// The metadata event name and its `data:` payload are separate lines that
/// may arrive in separate network reads, so "the next data line carries
/// metadata" is classifier state rather than a peek into the decoder buffer.
#[derive(Debug, Default)]
pub struct EventClassifier {
    awaiting_metadata: bool,
}

impl EventClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one decoded, trimmed line, appending events to `out`.
    ///
    /// Malformed JSON payloads are logged and skipped; they never abort the
    /// stream. Lines that fit no known shape are ignored.
    pub fn classify_into(&mut self, line: &str, out: &mut Vec<StreamEvent>) {
        if line.is_empty() || line.starts_with(':') {
            return;
        }

        if let Some(event_name) = line.strip_prefix("event:") {
            self.awaiting_metadata = event_name.trim() == METADATA_EVENT;
            return;
        }

        let Some(payload) = strip_data_prefix(line) else {
            return;
        };

        if self.awaiting_metadata {
            self.awaiting_metadata = false;
            match serde_json::from_str::<StreamMetadata>(payload) {
                Ok(metadata) => {
                    if let Some(model) = metadata.final_model_used_for_generation {
                        out.push(StreamEvent::Model(model));
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, payload, "skipping undecodable metadata payload");
                }
            }
            return;
        }

        if payload == DONE_SENTINEL {
            out.push(StreamEvent::Done);
            return;
        }
        if payload.is_empty() {
            return;
        }

        match serde_json::from_str::<ChatCompletionChunk>(payload) {
            Ok(chunk) => {
                if let Some(choice) = chunk.choices.first() {
                    let content = choice.delta.content.clone();
                    let reasoning = choice.delta.reasoning.clone();
                    if content.is_some() || reasoning.is_some() {
                        out.push(StreamEvent::Delta { content, reasoning });
                    }
                }
                if let Some(usage) = chunk.usage {
                    out.push(StreamEvent::Usage(usage));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, payload, "skipping undecodable stream payload");
            }
        }
    }

    /// Classify one line and return its events.
    #[must_use]
    pub fn classify(&mut self, line: &str) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        self.classify_into(line, &mut out);
        out
    }
}

#[inline]
fn strip_data_prefix(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("data:")?;
    Some(rest.trim())
}

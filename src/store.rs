//! The UI-visible conversation state.
//!
//! [`MessageStore`] is the single source of truth for rendering. It is
//! mutated only by the orchestrator and the flush scheduler; renderers
//! observe it through [`MessageStore::subscribe`] and read snapshots.

use std::time::SystemTime;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::util::MessageIdGenerator;

/// Opaque unique identifier, stable for a message's lifetime.
pub type MessageId = uuid::Uuid;

/// Sentinel model value shown while server-side auto-routing is still
/// deciding. A display convention, not a protocol guarantee: any model
/// string the server reports is treated as opaque text.
pub const CLASSIFYING_MODEL: &str = "classifying";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

/// One conversation entry.
///
/// While `is_streaming` is true, `content` and `reasoning` only ever grow;
/// `model` transitions at most from unset/`classifying` to a concrete id.
/// Once `is_streaming` turns false the message never streams again.
#[derive(Debug, Clone)]
pub struct ConversationMessage {
    pub id: MessageId,
    pub content: String,
    pub sender: Sender,
    pub timestamp: SystemTime,
    pub model: Option<String>,
    pub reasoning: Option<String>,
    pub is_streaming: bool,
}

/// Append-only message list with a revision channel for observers.
pub struct MessageStore {
    messages: RwLock<Vec<ConversationMessage>>,
    revision: watch::Sender<u64>,
    ids: MessageIdGenerator,
}

impl MessageStore {
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            messages: RwLock::new(Vec::new()),
            revision,
            ids: MessageIdGenerator::new(),
        }
    }

    /// Mint a new, not-yet-pushed message with a fresh id and timestamp.
    #[must_use]
    pub fn new_message(&self, sender: Sender) -> ConversationMessage {
        ConversationMessage {
            id: self.ids.next_id(),
            content: String::new(),
            sender,
            timestamp: SystemTime::now(),
            model: None,
            reasoning: None,
            is_streaming: false,
        }
    }

    /// Observe store revisions. The receiver's value is an opaque counter;
    /// every visible mutation bumps it.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn push(&self, message: ConversationMessage) {
        self.messages.write().push(message);
        self.bump();
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<ConversationMessage> {
        self.messages.read().clone()
    }

    #[must_use]
    pub fn get(&self, id: MessageId) -> Option<ConversationMessage> {
        self.messages.read().iter().find(|m| m.id == id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Apply accumulated stream state to a message that is still streaming.
    ///
    /// A no-op once the message has been finalized, so a flush racing the
    /// end of the stream cannot resurrect or truncate it.
    pub fn apply_stream_update(&self, id: MessageId, content: &str, reasoning: Option<&str>) {
        let mut changed = false;
        {
            let mut messages = self.messages.write();
            if let Some(msg) = messages.iter_mut().find(|m| m.id == id && m.is_streaming) {
                msg.content.clear();
                msg.content.push_str(content);
                msg.reasoning = reasoning.map(str::to_string);
                changed = true;
            }
        }
        if changed {
            self.bump();
        }
    }

    /// Record the concrete model reported by the metadata side channel.
    pub fn set_model(&self, id: MessageId, model: &str) {
        let mut changed = false;
        {
            let mut messages = self.messages.write();
            if let Some(msg) = messages.iter_mut().find(|m| m.id == id) {
                msg.model = Some(model.to_string());
                changed = true;
            }
        }
        if changed {
            self.bump();
        }
    }

    /// Final flush: apply the complete content/reasoning, resolve the model,
    /// and stop streaming. Terminal for the message.
    ///
    /// `model` of `Some` overwrites; `None` keeps a concrete preselected id
    /// but clears a leftover `classifying` placeholder (routing never
    /// resolved).
    pub fn finalize(
        &self,
        id: MessageId,
        content: String,
        reasoning: Option<String>,
        model: Option<String>,
    ) {
        let mut changed = false;
        {
            let mut messages = self.messages.write();
            if let Some(msg) = messages.iter_mut().find(|m| m.id == id) {
                msg.content = content;
                msg.reasoning = reasoning;
                match model {
                    Some(model) => msg.model = Some(model),
                    None => {
                        if msg.model.as_deref() == Some(CLASSIFYING_MODEL) {
                            msg.model = None;
                        }
                    }
                }
                msg.is_streaming = false;
                changed = true;
            }
        }
        if changed {
            self.bump();
        }
    }

    /// Replace the message content with an error description and stop
    /// streaming. Terminal for the message.
    pub fn finalize_error(&self, id: MessageId, error_content: String) {
        let mut changed = false;
        {
            let mut messages = self.messages.write();
            if let Some(msg) = messages.iter_mut().find(|m| m.id == id) {
                msg.content = error_content;
                msg.is_streaming = false;
                changed = true;
            }
        }
        if changed {
            self.bump();
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

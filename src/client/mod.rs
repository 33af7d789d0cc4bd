//! Conversation orchestration: send a user message, stream the reply.
//!
//! One exchange moves through Sending (request issued, placeholder visible),
//! Streaming (pipeline running), and Finalized or Errored. All ephemeral
//! state is keyed by message id, so concurrent exchanges never cross-talk;
//! errors are terminal for their own exchange only.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;

use crate::accumulator::StreamAccumulators;
use crate::catalog::AUTO_MODEL_ID;
use crate::config::AppConfig;
use crate::error::ChatError;
use crate::observability::log_stream_usage;
use crate::protocol::{self, ChatRequest};
use crate::scheduler::FlushScheduler;
use crate::store::{MessageId, MessageStore, Sender, CLASSIFYING_MODEL};
use crate::stream::{EventClassifier, LineBatch, LineDecoder, StreamEvent};
use crate::transport::ChatTransport;

/// Placeholder model shown on the AI message before the stream resolves it.
fn placeholder_model(selected: &str) -> Option<String> {
    if selected == AUTO_MODEL_ID {
        Some(CLASSIFYING_MODEL.to_string())
    } else if selected.is_empty() {
        None
    } else {
        Some(selected.to_string())
    }
}

struct ExchangeCleanup<'a> {
    client: &'a ChatClient,
    id: MessageId,
    armed: bool,
}

impl Drop for ExchangeCleanup<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.client.scheduler.deregister(self.id);
            self.client.accumulators.remove(self.id);
        }
    }
}

pub struct ChatClient {
    transport: ChatTransport,
    store: Arc<MessageStore>,
    accumulators: Arc<StreamAccumulators>,
    scheduler: FlushScheduler,
    selected_model: String,
    web_search: bool,
    history_limit: usize,
    read_timeout: Duration,
}

impl ChatClient {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(MessageStore::new());
        let accumulators = Arc::new(StreamAccumulators::new());
        let scheduler = FlushScheduler::new(Arc::clone(&store), Arc::clone(&accumulators));
        Self {
            transport: ChatTransport::new(&config.endpoint),
            store,
            accumulators,
            scheduler,
            selected_model: config.chat.default_model.clone(),
            web_search: config.chat.web_search,
            history_limit: config.chat.history_limit,
            read_timeout: Duration::from_secs(config.endpoint.read_timeout_secs),
        }
    }

    /// The conversation state this client mutates.
    #[must_use]
    pub fn store(&self) -> &Arc<MessageStore> {
        &self.store
    }

    #[must_use]
    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    /// Send a user message and stream the reply to completion.
    ///
    /// Returns the AI message id once the exchange has finalized — whether
    /// it succeeded or ended in an error message — or `None` when the
    /// trimmed input was empty and nothing was sent. Failures never
    /// propagate as `Err`: they land in the AI message as
    /// `Error: <message>` and the message stops streaming.
    pub async fn send_message(&self, input: &str) -> Option<MessageId> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        let request = ChatRequest {
            model: protocol::wire_model_id(&self.selected_model, self.web_search),
            stream: true,
            messages: protocol::history_payload(
                &self.store.snapshot(),
                self.history_limit,
                trimmed,
            ),
        };

        // Both messages become visible before the network call begins.
        let mut user_message = self.store.new_message(Sender::User);
        user_message.content = trimmed.to_string();
        self.store.push(user_message);

        let mut ai_message = self.store.new_message(Sender::Ai);
        ai_message.model = placeholder_model(&self.selected_model);
        ai_message.is_streaming = true;
        let ai_id = ai_message.id;
        self.store.push(ai_message);

        self.accumulators.insert(ai_id);
        self.scheduler.register(ai_id);
        // If this future is dropped mid-stream (caller navigated away), the
        // guard reclaims the ephemeral state; the abandoned message is simply
        // never flushed again.
        let mut cleanup = ExchangeCleanup {
            client: self,
            id: ai_id,
            armed: true,
        };

        match self.run_exchange(ai_id, &request).await {
            Ok(final_model) => {
                cleanup.armed = false;
                self.scheduler.deregister(ai_id);
                let acc = self.accumulators.remove(ai_id).unwrap_or_default();
                let reasoning = if acc.reasoning.is_empty() {
                    None
                } else {
                    Some(acc.reasoning)
                };
                self.store.finalize(ai_id, acc.content, reasoning, final_model);
            }
            Err(err) => {
                cleanup.armed = false;
                self.scheduler.deregister(ai_id);
                self.accumulators.remove(ai_id);
                tracing::error!(message_id = %ai_id, error = %err, "exchange failed");
                self.store
                    .finalize_error(ai_id, format!("Error: {}", err.user_message()));
            }
        }

        Some(ai_id)
    }

    /// Run the reader → decoder → classifier → accumulator pipeline until
    /// end-of-stream, returning the model the metadata channel reported.
    async fn run_exchange(
        &self,
        ai_id: MessageId,
        request: &ChatRequest,
    ) -> Result<Option<String>, ChatError> {
        let started = Instant::now();
        let response = self.transport.open_stream(request).await?;
        let mut body = Box::pin(response.bytes_stream());

        let mut decoder = LineDecoder::new();
        let mut classifier = EventClassifier::new();
        let mut lines = LineBatch::new();
        let mut events: Vec<StreamEvent> = Vec::with_capacity(4);
        let mut final_model: Option<String> = None;

        loop {
            let next = tokio::time::timeout(self.read_timeout, body.next())
                .await
                .map_err(|_| ChatError::Timeout(self.read_timeout.as_secs()))?;
            let Some(chunk) = next else {
                break;
            };
            let bytes = chunk.map_err(|err| ChatError::StreamAborted(err.to_string()))?;

            lines.clear();
            decoder.feed_into(&bytes, &mut lines);
            for line in &lines {
                classifier.classify_into(line, &mut events);
            }
            for event in events.drain(..) {
                self.apply_event(ai_id, event, &mut final_model, request, started);
            }
        }

        // A stream cut off mid-line may leave one final unterminated data line.
        if let Some(tail) = decoder.finish() {
            classifier.classify_into(&tail, &mut events);
            for event in events.drain(..) {
                self.apply_event(ai_id, event, &mut final_model, request, started);
            }
        }

        tracing::debug!(
            message_id = %ai_id,
            duration_seconds = started.elapsed().as_secs_f64(),
            "stream complete"
        );
        Ok(final_model)
    }

    fn apply_event(
        &self,
        ai_id: MessageId,
        event: StreamEvent,
        final_model: &mut Option<String>,
        request: &ChatRequest,
        started: Instant,
    ) {
        match event {
            StreamEvent::Model(model) => {
                self.store.set_model(ai_id, &model);
                *final_model = Some(model);
            }
            StreamEvent::Delta { content, reasoning } => {
                if self
                    .accumulators
                    .append(ai_id, content.as_deref(), reasoning.as_deref())
                {
                    self.scheduler.delta_arrived(ai_id);
                }
            }
            StreamEvent::Usage(usage) => {
                let model = final_model.as_deref().unwrap_or(&request.model);
                log_stream_usage(model, &usage, started.elapsed());
            }
            StreamEvent::Done => {
                // Termination sentinel; the loop still drains to end-of-stream.
            }
        }
    }
}

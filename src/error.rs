/// Canonical error type used across all modules.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Upstream error: status={status}, message={message}")]
    Upstream { status: u16, message: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Stream aborted: {0}")]
    StreamAborted(String),
    #[error("No stream data received within {0}s")]
    Timeout(u64),
}

impl ChatError {
    /// The message shown to the user in place of the response body.
    ///
    /// Upstream failures surface the body text the server sent (falling back
    /// to the status code when the body was empty); everything else surfaces
    /// the inner description without the variant prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Upstream { status, message } => {
                if message.trim().is_empty() {
                    format!("HTTP error! status: {status}")
                } else {
                    message.clone()
                }
            }
            ChatError::Config(msg)
            | ChatError::Transport(msg)
            | ChatError::Decode(msg)
            | ChatError::StreamAborted(msg) => msg.clone(),
            ChatError::Timeout(secs) => {
                format!("no stream data received within {secs}s")
            }
        }
    }

    /// Build an upstream error from a non-success status and its body text.
    #[must_use]
    pub fn from_upstream(status: http::StatusCode, body: String) -> Self {
        ChatError::Upstream {
            status: status.as_u16(),
            message: body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_user_message_prefers_body() {
        let err = ChatError::from_upstream(
            http::StatusCode::INTERNAL_SERVER_ERROR,
            "overloaded".to_string(),
        );
        assert_eq!(err.user_message(), "overloaded");
    }

    #[test]
    fn test_upstream_user_message_empty_body_falls_back_to_status() {
        let err = ChatError::from_upstream(http::StatusCode::BAD_GATEWAY, String::new());
        assert_eq!(err.user_message(), "HTTP error! status: 502");
    }

    #[test]
    fn test_transport_user_message_strips_prefix() {
        let err = ChatError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), "connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_timeout_display() {
        let err = ChatError::Timeout(30);
        assert_eq!(err.to_string(), "No stream data received within 30s");
    }
}

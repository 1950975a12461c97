use thiserror::Error;

/// Maximum number of upstream error-body bytes preserved in a transport error
const ERROR_BODY_LIMIT: usize = 2048;

/// Errors surfaced by the streaming engine
///
/// Cancellation is deliberately absent: a cancelled stream ends silently
/// rather than yielding an error item. Malformed wire records are recovered
/// locally by the parsers and never reach this type.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request cannot be issued as configured; no I/O was attempted
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The upstream request failed in transit or returned a non-success status
    #[error("transport error{}: {message}", status.map_or_else(String::new, |s| format!(" (status {s})")))]
    Transport {
        /// HTTP status code, when the failure was a non-success response
        status: Option<u16>,
        /// Truncated response body, or the underlying transport cause
        message: String,
    },
}

impl LlmError {
    /// Transport error for a non-success upstream status
    pub fn upstream_status(status: u16, body: &str) -> Self {
        let message = if body.len() > ERROR_BODY_LIMIT {
            let mut end = ERROR_BODY_LIMIT;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}…", &body[..end])
        } else {
            body.to_owned()
        };
        Self::Transport {
            status: Some(status),
            message,
        }
    }

    /// Transport error for a network-level failure
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self::Transport {
            status: None,
            message: cause.to_string(),
        }
    }
}

//! Bounded consumption of completion streams.

use crate::ResponseCleaner;
use futures_util::StreamExt;
use std::time::Duration;
use storyloom_config::StreamSettings;
use storyloom_core::CompletionRequest;
use storyloom_error::{GenerationErrorKind, StoryloomErrorKind};
use storyloom_interface::Streaming;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

const ERROR_PREFIX: &str = "Error:";

/// Limits applied while reading a stream.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyloom_narrative::StreamPolicy;
///
/// let policy = StreamPolicy::unbounded()
///     .with_idle_timeout(Some(Duration::from_secs(5)))
///     .with_max_chars(Some(2_000));
/// assert_eq!(policy.max_chars(), Some(2_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamPolicy {
    idle_timeout: Option<Duration>,
    max_chars: Option<usize>,
}

impl StreamPolicy {
    /// No timeout and no size cap.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Policy from the `[stream]` configuration section.
    pub fn from_settings(settings: &StreamSettings) -> Self {
        Self {
            idle_timeout: settings.idle_timeout(),
            max_chars: settings.response_limit(),
        }
    }

    /// Replace the per-chunk idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Replace the size cap.
    pub fn with_max_chars(mut self, max_chars: Option<usize>) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Per-chunk idle timeout.
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Size cap in characters.
    pub fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }
}

/// Text gathered from one stream and how the stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    text: String,
    failure: Option<GenerationErrorKind>,
}

impl StreamOutcome {
    /// Raw text in receipt order.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Why the stream stopped early, if it did.
    pub fn failure(&self) -> Option<&GenerationErrorKind> {
        self.failure.as_ref()
    }

    /// True when the stream ran to its natural end.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Cleaned text, followed by a visible `Error:` line when the stream
    /// stopped early. Partial text is always kept.
    pub fn render(&self, cleaner: &ResponseCleaner) -> String {
        let cleaned = cleaner.clean(&self.text);
        match &self.failure {
            None => cleaned,
            Some(kind) if cleaned.is_empty() => format!("{} {}", ERROR_PREFIX, kind),
            Some(kind) => format!("{}\n\n{} {}", cleaned, ERROR_PREFIX, kind),
        }
    }
}

fn failure_of(err: storyloom_error::StoryloomError) -> GenerationErrorKind {
    match err.kind() {
        StoryloomErrorKind::Generation(generation) => generation.kind.clone(),
        other => GenerationErrorKind::Request(other.to_string()),
    }
}

/// The message of a chunk that reports a backend failure in-band.
fn upstream_error(content: &str) -> Option<String> {
    content
        .trim_start()
        .strip_prefix(ERROR_PREFIX)
        .map(|rest| rest.trim().to_string())
}

/// Run `request` through `driver`, reading chunks in order until the stream
/// ends, fails, stalls, grows past the cap, or `cancel` fires.
///
/// Never fails: every early stop is reported through
/// [`StreamOutcome::failure`] alongside whatever text arrived. `on_text` is
/// called with the accumulated text after every chunk.
pub async fn collect_stream<D, F>(
    driver: &D,
    request: &CompletionRequest,
    policy: StreamPolicy,
    cancel: &CancellationToken,
    mut on_text: F,
) -> StreamOutcome
where
    D: Streaming + ?Sized,
    F: FnMut(&str),
{
    let mut text = String::new();
    let mut chars = 0usize;

    let mut stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return StreamOutcome { text, failure: Some(GenerationErrorKind::Cancelled) };
        }
        opened = driver.complete_stream(request) => match opened {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "Completion stream failed to open");
                return StreamOutcome { text, failure: Some(failure_of(e)) };
            }
        },
    };

    let failure = loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break Some(GenerationErrorKind::Cancelled),
            next = async {
                match policy.idle_timeout {
                    Some(limit) => tokio::time::timeout(limit, stream.next()).await.ok(),
                    None => Some(stream.next().await),
                }
            } => next,
        };

        match next {
            None => {
                let secs = policy.idle_timeout.map(|d| d.as_secs()).unwrap_or_default();
                warn!(idle_timeout_secs = secs, "Completion stream stalled");
                break Some(GenerationErrorKind::IdleTimeout(secs));
            }
            Some(None) => break None,
            Some(Some(Err(e))) => {
                error!(error = %e, "Completion stream interrupted");
                break Some(match failure_of(e) {
                    GenerationErrorKind::Request(msg) => {
                        GenerationErrorKind::StreamInterrupted(msg)
                    }
                    other => other,
                });
            }
            Some(Some(Ok(chunk))) => {
                if let Some(message) = upstream_error(chunk.content()) {
                    error!(error = %message, "Completion backend reported an error");
                    break Some(GenerationErrorKind::Upstream(message));
                }
                text.push_str(chunk.content());
                chars += chunk.content().chars().count();
                if let Some(max) = policy.max_chars.filter(|max| chars > *max) {
                    text = text.chars().take(max).collect();
                    on_text(&text);
                    warn!(max_chars = max, "Completion exceeded size cap");
                    break Some(GenerationErrorKind::ResponseTooLarge(max));
                }
                on_text(&text);
                if chunk.is_final() {
                    break None;
                }
            }
        }
    };

    debug!(chars, complete = failure.is_none(), "Completion stream finished");
    StreamOutcome { text, failure }
}

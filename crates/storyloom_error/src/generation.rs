//! Upstream text generation errors.

/// Failure conditions reported by a completion backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GenerationErrorKind {
    /// Request could not be sent or was refused
    #[display("Completion request failed: {}", _0)]
    Request(String),
    /// Backend reported a failure as an `Error:` text chunk
    #[display("{}", _0)]
    Upstream(String),
    /// Stream broke off after it started
    #[display("Stream interrupted: {}", _0)]
    StreamInterrupted(String),
    /// No chunk arrived within the idle timeout
    #[display("No response chunk within {} seconds", _0)]
    IdleTimeout(u64),
    /// Response exceeded the configured size cap
    #[display("Response exceeded {} characters", _0)]
    ResponseTooLarge(usize),
    /// Consumer stopped reading the stream
    #[display("Generation cancelled")]
    Cancelled,
}

/// Generation error with location tracking.
///
/// The story engine never lets this escape a narration cycle; it is rendered
/// inline as `Error: ...` text after whatever partial output arrived.
///
/// # Examples
///
/// ```
/// use storyloom_error::{GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::Cancelled);
/// assert!(format!("{}", err).contains("cancelled"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific failure
    pub kind: GenerationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

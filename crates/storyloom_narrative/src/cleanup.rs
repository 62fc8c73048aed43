//! Post-processing for generated text.

use regex::Regex;
use storyloom_error::{ConfigError, StoryloomResult};

/// Empty-delta marker some drivers emit.
pub const NO_CONTENT_MARKER: &str = "[NO CONTENT]";

/// Strips stream artifacts from a finished response.
///
/// Removes every `[NO CONTENT]` marker and markdown code fence, then trims
/// surrounding whitespace. A language tag is only dropped when it belongs
/// to a fence opening its own line.
///
/// # Examples
///
/// ```
/// use storyloom_narrative::ResponseCleaner;
///
/// let cleaner = ResponseCleaner::new()?;
/// let raw = "[NO CONTENT]```json\n{\"mood\": \"tense\"}\n```  ";
/// assert_eq!(cleaner.clean(raw), "{\"mood\": \"tense\"}");
/// # Ok::<(), storyloom_error::StoryloomError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ResponseCleaner {
    opening_fence: Regex,
}

const FENCE: &str = "```";

impl ResponseCleaner {
    /// Compile the artifact patterns.
    pub fn new() -> StoryloomResult<Self> {
        let opening_fence = Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+-]*[ \t]*\r?\n")
            .map_err(|e| ConfigError::new(format!("Invalid response cleanup pattern: {}", e)))?;
        Ok(Self { opening_fence })
    }

    /// Cleaned copy of `text`.
    pub fn clean(&self, text: &str) -> String {
        let text = text.replace(NO_CONTENT_MARKER, "");
        let text = self.opening_fence.replace_all(&text, "");
        text.replace(FENCE, "").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_every_marker() {
        let cleaner = ResponseCleaner::new().unwrap();
        let raw = "The door[NO CONTENT] creaks.[NO CONTENT]";
        assert_eq!(cleaner.clean(raw), "The door creaks.");
    }

    #[test]
    fn text_after_a_closing_fence_survives() {
        let cleaner = ResponseCleaner::new().unwrap();
        assert_eq!(cleaner.clean("The end.```Done"), "The end.Done");
        assert_eq!(cleaner.clean("```\nThe end.\n```Done"), "The end.\nDone");
        assert_eq!(
            cleaner.clean("Notes:\n```text\nwind\n```\nafter"),
            "Notes:\nwind\nafter"
        );
    }

    #[test]
    fn leaves_plain_prose_alone() {
        let cleaner = ResponseCleaner::new().unwrap();
        assert_eq!(cleaner.clean("  A quiet night.\n"), "A quiet night.");
    }
}

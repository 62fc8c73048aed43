//! Configuration sections and loading.

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storyloom_core::PromptConfig;
use storyloom_error::{ConfigError, StoryloomError, StoryloomResult};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../storyloom.toml");

/// System-wide prompt fragments used when a template leaves a field blank.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct PromptDefaults {
    /// Narration instruction
    #[serde(default)]
    pub narrator: Option<String>,
    /// Label placed before the writer's input
    #[serde(default)]
    pub input_tag: Option<String>,
    /// Chapter summary instruction
    #[serde(default)]
    pub summarizer: Option<String>,
    /// Chapter end-state instruction
    #[serde(default)]
    pub summarizer_end_state: Option<String>,
}

impl PromptDefaults {
    /// View these defaults as a prompt configuration.
    pub fn to_prompt_config(&self) -> PromptConfig {
        PromptConfig::new(
            self.narrator.clone(),
            self.input_tag.clone(),
            self.summarizer.clone(),
            self.summarizer_end_state.clone(),
        )
    }
}

/// Dividers used when joining assembled story pieces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContextSettings {
    /// Separator for live context assembly
    #[serde(default = "default_divider")]
    pub divider: String,
    /// Separator for exported documents
    #[serde(default = "default_export_divider")]
    pub export_divider: String,
}

fn default_divider() -> String {
    "\n\n".to_string()
}

fn default_export_divider() -> String {
    "\n\n---\n\n".to_string()
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            divider: default_divider(),
            export_divider: default_export_divider(),
        }
    }
}

/// Bounds applied while consuming a completion stream.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use storyloom_config::StreamSettings;
///
/// let settings = StreamSettings { idle_timeout_secs: 0, max_response_chars: 500 };
/// assert_eq!(settings.idle_timeout(), None);
/// assert_eq!(settings.response_limit(), Some(500));
///
/// let settings = StreamSettings::default();
/// assert_eq!(settings.idle_timeout(), Some(Duration::from_secs(120)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StreamSettings {
    /// Seconds to wait for each chunk; 0 disables the timeout
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Reply size cap in characters; 0 disables the cap
    #[serde(default = "default_max_response_chars")]
    pub max_response_chars: usize,
}

fn default_idle_timeout_secs() -> u64 {
    120
}

fn default_max_response_chars() -> usize {
    100_000
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            max_response_chars: default_max_response_chars(),
        }
    }
}

impl StreamSettings {
    /// Per-chunk idle timeout, if enabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    /// Reply size cap, if enabled.
    pub fn response_limit(&self) -> Option<usize> {
        (self.max_response_chars > 0).then_some(self.max_response_chars)
    }
}

/// Segment summarization settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SummarySettings {
    /// System instruction; `{paragraphs}` is replaced with the target count
    #[serde(default = "default_summary_instruction")]
    pub instruction: String,
}

fn default_summary_instruction() -> String {
    "Your task is to write a short version of the story that captures the key points and \
     essence of the content. The short version should maintain the same POV. The short \
     version should be {paragraphs} paragraphs long."
        .to_string()
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            instruction: default_summary_instruction(),
        }
    }
}

impl SummarySettings {
    /// Instruction text for a given paragraph target.
    pub fn instruction_for(&self, paragraphs: usize) -> String {
        self.instruction.replace("{paragraphs}", &paragraphs.to_string())
    }
}

/// Top-level storyloom configuration.
///
/// # Example
///
/// ```no_run
/// use storyloom_config::StoryloomConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryloomConfig::load()?;
/// println!("divider: {:?}", config.context.divider);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct StoryloomConfig {
    /// Default prompt fragments
    #[serde(default)]
    pub prompt: PromptDefaults,
    /// Assembly dividers
    #[serde(default)]
    pub context: ContextSettings,
    /// Streaming bounds
    #[serde(default)]
    pub stream: StreamSettings,
    /// Segment summarization
    #[serde(default)]
    pub summary: SummarySettings,
}

fn build_error(err: config::ConfigError) -> StoryloomError {
    StoryloomError::from(ConfigError::new(format!(
        "Failed to read configuration: {}",
        err
    )))
}

fn parse_error(err: config::ConfigError) -> StoryloomError {
    StoryloomError::from(ConfigError::new(format!(
        "Failed to parse configuration: {}",
        err
    )))
}

impl StoryloomConfig {
    /// Only the bundled defaults, ignoring user files.
    pub fn bundled() -> StoryloomResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .map_err(build_error)?
            .try_deserialize()
            .map_err(parse_error)
    }

    /// Load configuration from a specific file path.
    ///
    /// Sections missing from the file take their built-in defaults.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StoryloomResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StoryloomError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(parse_error)
    }

    /// Load bundled defaults merged with user overrides.
    #[instrument]
    pub fn load() -> StoryloomResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyloom/storyloom.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyloom").required(false));

        builder
            .build()
            .map_err(build_error)?
            .try_deserialize()
            .map_err(parse_error)
    }

    /// Default prompt fragments as a [`PromptConfig`].
    pub fn default_prompt(&self) -> PromptConfig {
        self.prompt.to_prompt_config()
    }
}

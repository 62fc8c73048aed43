//! Story templates and prompt configuration.

use serde::{Deserialize, Serialize};

/// Prompt fragments used when talking to the model.
///
/// Every field is optional; a missing or blank value falls back to the
/// system-wide default through [`PromptConfig::merged_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    /// Instruction appended after the story context on every narration
    #[serde(default)]
    narrator: Option<String>,
    /// Label introducing the writer's input
    #[serde(default)]
    input_tag: Option<String>,
    /// Instruction for chapter summaries
    #[serde(default)]
    summarizer: Option<String>,
    /// Instruction for chapter end-state extraction
    #[serde(default)]
    summarizer_end_state: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|v| !v.trim().is_empty())
}

impl PromptConfig {
    /// Create a prompt configuration from its four fragments.
    pub fn new(
        narrator: Option<String>,
        input_tag: Option<String>,
        summarizer: Option<String>,
        summarizer_end_state: Option<String>,
    ) -> Self {
        Self {
            narrator,
            input_tag,
            summarizer,
            summarizer_end_state,
        }
    }

    /// Fill every missing or blank field from `defaults`.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyloom_core::PromptConfig;
    ///
    /// let template = PromptConfig::new(Some("  ".into()), Some("ACTION".into()), None, None);
    /// let defaults = PromptConfig::new(Some("Continue the story.".into()), Some("INPUT".into()), None, None);
    ///
    /// let merged = template.merged_with(&defaults);
    /// assert_eq!(merged.narrator().as_deref(), Some("Continue the story."));
    /// assert_eq!(merged.input_tag().as_deref(), Some("ACTION"));
    /// ```
    pub fn merged_with(&self, defaults: &PromptConfig) -> PromptConfig {
        let pick = |own: &Option<String>, fallback: &Option<String>| {
            non_blank(own).or_else(|| non_blank(fallback)).cloned()
        };
        PromptConfig {
            narrator: pick(&self.narrator, &defaults.narrator),
            input_tag: pick(&self.input_tag, &defaults.input_tag),
            summarizer: pick(&self.summarizer, &defaults.summarizer),
            summarizer_end_state: pick(&self.summarizer_end_state, &defaults.summarizer_end_state),
        }
    }
}

/// A story premise plus the prompt bundle used for every book made from it.
///
/// Templates are shared by many books and never modified by the story engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template identifier (absent until first persisted)
    #[serde(default)]
    template_id: Option<String>,
    /// Display name
    name: String,
    /// Prompt fragments
    #[serde(default)]
    prompt: PromptConfig,
    /// Static premise text
    #[serde(default)]
    story_background: String,
}

impl Template {
    /// Create a template.
    pub fn new(
        template_id: Option<String>,
        name: impl Into<String>,
        prompt: PromptConfig,
        story_background: impl Into<String>,
    ) -> Self {
        Self {
            template_id,
            name: name.into(),
            prompt,
            story_background: story_background.into(),
        }
    }

    /// Copy of this template with its prompt merged against system defaults.
    pub fn resolved(&self, defaults: &PromptConfig) -> Template {
        Template {
            prompt: self.prompt.merged_with(defaults),
            ..self.clone()
        }
    }
}

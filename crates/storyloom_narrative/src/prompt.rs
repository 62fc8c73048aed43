//! Prompt composition for every generation the story engine makes.

use storyloom_core::{Chapter, CompletionRequest, PromptConfig, Template};

/// System instruction for segment enhancement.
pub const ENHANCE_INSTRUCTION: &str = "Follow the instruction specified after the PROMPT:";

/// Heading before the text handed to a chapter summary or end-state call.
pub const STORY_TO_SUMMARIZE: &str = "STORY TO SUMMARIZE:";

fn push_section(block: &mut String, section: &str) {
    if section.trim().is_empty() {
        return;
    }
    if !block.is_empty() {
        block.push_str("\n\n");
    }
    block.push_str(section);
}

fn render_chapter(chapter: &Chapter) -> String {
    let mut text = format!("## {}\n{}", chapter.title(), chapter.summary());
    if !chapter.end_state().is_null() {
        let end_state = serde_json::to_string_pretty(chapter.end_state())
            .unwrap_or_else(|_| chapter.end_state().to_string());
        text.push_str("\n\nEND STATE:\n");
        text.push_str(&end_state);
    }
    text
}

/// Block 1 of a narration request: premise, closed chapters and the
/// story so far. Empty parts are left out.
pub fn context_block(background: &str, chapters: &[Chapter], story_so_far: &str) -> String {
    let mut block = String::new();
    push_section(&mut block, background);
    if !chapters.is_empty() {
        let rendered: Vec<String> = chapters.iter().map(render_chapter).collect();
        push_section(
            &mut block,
            &format!("PREVIOUS CHAPTERS:\n\n{}", rendered.join("\n\n")),
        );
    }
    if !story_so_far.trim().is_empty() {
        push_section(&mut block, &format!("STORY SO FAR:\n\n{}", story_so_far));
    }
    block
}

/// Block 2 of a narration request: narrator instruction and the writer's
/// new input under its label.
pub fn instruction_block(prompt: &PromptConfig, input: &str) -> String {
    let mut block = String::new();
    if let Some(narrator) = prompt.narrator() {
        push_section(&mut block, narrator);
    }
    let labelled = match prompt.input_tag().as_deref().map(str::trim) {
        Some(tag) if !tag.is_empty() => format!("{}:\n{}", tag, input),
        _ => input.to_string(),
    };
    if !block.is_empty() {
        block.push_str("\n\n");
    }
    block.push_str(&labelled);
    block
}

/// Full narration request for `template` (already merged with defaults).
///
/// # Examples
///
/// ```
/// use storyloom_core::{PromptConfig, Template};
/// use storyloom_narrative::prompt::narration_request;
///
/// let prompt = PromptConfig::new(Some("Continue.".into()), Some("ACTION".into()), None, None);
/// let template = Template::new(None, "Noir", prompt, "A rain-soaked city.");
/// let request = narration_request(&template, &[], "You wake up.", "look around");
///
/// assert!(request.system().is_none());
/// assert_eq!(request.messages().len(), 2);
/// assert_eq!(
///     request.messages()[0].content(),
///     "A rain-soaked city.\n\nSTORY SO FAR:\n\nYou wake up."
/// );
/// assert_eq!(request.messages()[1].content(), "Continue.\n\nACTION:\nlook around");
/// ```
pub fn narration_request(
    template: &Template,
    chapters: &[Chapter],
    story_so_far: &str,
    input: &str,
) -> CompletionRequest {
    CompletionRequest::from_user_messages([
        context_block(template.story_background(), chapters, story_so_far),
        instruction_block(template.prompt(), input),
    ])
}

/// Request abridging `contents` into `paragraphs` paragraphs.
pub fn summarization_request(instruction: String, contents: &[&str]) -> CompletionRequest {
    CompletionRequest::with_system(instruction, contents.join("\n\n"))
}

/// Request for a chapter summary or end state: the story, then the
/// instruction, as two user messages with no system message.
pub fn chapter_request(story: &str, instruction: Option<&str>) -> CompletionRequest {
    let mut messages = vec![format!("{}\n{}", STORY_TO_SUMMARIZE, story)];
    if let Some(instruction) = instruction.filter(|i| !i.trim().is_empty()) {
        messages.push(instruction.to_string());
    }
    CompletionRequest::from_user_messages(messages)
}

/// Request rewriting one segment according to `instruction`.
pub fn enhancement_request(
    previous_story: Option<&str>,
    content: &str,
    instruction: &str,
) -> CompletionRequest {
    let mut user = String::new();
    if let Some(previous) = previous_story.filter(|p| !p.trim().is_empty()) {
        user.push_str(previous);
        user.push_str("\n\n");
    }
    user.push_str(content);
    user.push_str("\n\nPROMPT:\n\n");
    user.push_str(instruction.trim());
    CompletionRequest::with_system(ENHANCE_INSTRUCTION, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storyloom_core::ChapterId;

    #[test]
    fn chapters_render_title_summary_and_end_state() {
        let chapter = Chapter::new(
            ChapterId::from("c1"),
            "The Woods",
            "They got lost.",
            json!({"location": "woods"}),
        );
        let block = context_block("", &[chapter], "");
        assert!(block.starts_with("PREVIOUS CHAPTERS:\n\n## The Woods\nThey got lost."));
        assert!(block.contains("END STATE:\n{\n  \"location\": \"woods\"\n}"));
        assert!(!block.contains("STORY SO FAR"));
    }

    #[test]
    fn instruction_block_without_prompts_is_the_bare_input() {
        assert_eq!(instruction_block(&PromptConfig::default(), "wait"), "wait");
    }

    #[test]
    fn chapter_request_uses_two_user_messages() {
        let request = chapter_request("It rained.", Some("Summarize."));
        assert!(request.system().is_none());
        assert_eq!(request.messages()[0].content(), "STORY TO SUMMARIZE:\nIt rained.");
        assert_eq!(request.messages()[1].content(), "Summarize.");
    }

    #[test]
    fn enhancement_request_places_prompt_last() {
        let request = enhancement_request(Some("Before."), "Draft.", "  Make it darker. ");
        assert_eq!(request.system().as_deref(), Some(ENHANCE_INSTRUCTION));
        assert_eq!(
            request.messages()[0].content(),
            "Before.\n\nDraft.\n\nPROMPT:\n\nMake it darker."
        );
    }
}

//! Tests for chapter wrap and chapter rendering.

mod test_utils;

use serde_json::json;
use storyloom_error::ValidationErrorKind;
use storyloom_narrative::{Annotation, ChapterRenderer, ChapterWrapper, Narrator};
use test_utils::{exchange_store, sid, test_config, test_template, MockStreamingDriver};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_chapter_wrap_moves_prefix_out_of_story_so_far() -> anyhow::Result<()> {
    let driver = MockStreamingDriver::new_replies(&[
        "They crossed the woods.",
        "```json\n{\"location\": \"river\"}\n```",
    ]);
    let wrapper = ChapterWrapper::new(driver.clone(), test_config());
    let template = test_template();
    let cancel = CancellationToken::new();
    let store = exchange_store(&[("go", "One."), ("on", "Two."), ("more", "Three.")]);

    let draft = wrapper.prepare(&store, &sid("a2"))?;
    assert_eq!(draft.segment_ids().len(), 4);
    let draft = wrapper.generate_summary(draft, &template, &cancel).await;
    let draft = wrapper.generate_end_state(draft, &template, &cancel).await;
    let draft = draft.with_title("The Woods");

    let (next, chapter) = wrapper.commit(&store, &draft)?;
    assert_eq!(chapter.title(), "The Woods");
    assert_eq!(chapter.summary(), "They crossed the woods.");
    assert_eq!(chapter.end_state(), &json!({"location": "river"}));
    for id in ["u1", "a1", "u2", "a2"] {
        let segment = next.segment(&sid(id)).expect("segment kept");
        assert_eq!(segment.chapter_id().as_ref(), Some(chapter.id()));
    }
    assert!(!next.segment(&sid("a3")).expect("segment kept").is_chaptered());

    let story = test_config().assembler().story_so_far(&next, None)?;
    assert_eq!(story, "Three.");
    assert_eq!(ChapterRenderer::default().render(&next, chapter.id())?, "One.\n\nTwo.");

    let requests = driver.requests();
    assert_eq!(requests[0].messages()[0].content(), "STORY TO SUMMARIZE:\nOne.\n\nTwo.");
    assert_eq!(requests[0].messages()[1].content(), "Summarize the chapter.");
    assert_eq!(requests[1].messages()[1].content(), "Describe the end state as JSON.");
    Ok(())
}

#[tokio::test]
async fn test_rewrapping_chaptered_segments_is_rejected() -> anyhow::Result<()> {
    let wrapper = ChapterWrapper::new(MockStreamingDriver::new_chunks(&["x"]), test_config());
    let store = exchange_store(&[("go", "One."), ("on", "Two.")]);
    let draft = wrapper
        .prepare(&store, &sid("a1"))?
        .with_title("First")
        .with_summary("Summary.")
        .with_end_state("{}");
    let (next, _) = wrapper.commit(&store, &draft)?;

    for id in ["u1", "a1"] {
        let err = wrapper.prepare(&next, &sid(id)).unwrap_err();
        assert_eq!(
            err.validation_kind(),
            Some(&ValidationErrorKind::AlreadyChaptered(id.to_string()))
        );
    }
    let err = next
        .annotate(&sid("a1"), Annotation::QueueForSummary(true))
        .unwrap_err();
    assert!(err.is_validation());

    let second = wrapper.prepare(&next, &sid("a2"))?;
    assert_eq!(second.segment_ids(), &vec![sid("u2"), sid("a2")]);
    Ok(())
}

#[tokio::test]
async fn test_empty_title_creates_nothing() -> anyhow::Result<()> {
    let wrapper = ChapterWrapper::new(MockStreamingDriver::new_chunks(&["x"]), test_config());
    let store = exchange_store(&[("go", "One.")]);
    let draft = wrapper
        .prepare(&store, &sid("a1"))?
        .with_title("   ")
        .with_summary("Summary.")
        .with_end_state("{}");

    let err = wrapper.commit(&store, &draft).unwrap_err();
    assert_eq!(
        err.validation_kind(),
        Some(&ValidationErrorKind::BlankField("Chapter title".to_string()))
    );
    assert!(store.chapters().is_empty());
    assert!(store.segments().iter().all(|s| !s.is_chaptered()));
    Ok(())
}

#[tokio::test]
async fn test_malformed_end_state_keeps_typed_text() -> anyhow::Result<()> {
    let wrapper = ChapterWrapper::new(MockStreamingDriver::new_chunks(&["x"]), test_config());
    let store = exchange_store(&[("go", "One.")]);
    let draft = wrapper
        .prepare(&store, &sid("a1"))?
        .with_title("First")
        .with_summary("Summary.")
        .with_end_state("location: woods");

    let err = wrapper.commit(&store, &draft).unwrap_err();
    assert!(matches!(
        err.validation_kind(),
        Some(ValidationErrorKind::MalformedEndState(_))
    ));
    assert_eq!(draft.end_state(), "location: woods");
    assert_eq!(draft.summary(), "Summary.");
    Ok(())
}

#[tokio::test]
async fn test_closed_chapters_prefix_the_next_narration() -> anyhow::Result<()> {
    let config = test_config();
    let wrapper = ChapterWrapper::new(MockStreamingDriver::new_chunks(&["x"]), config.clone());
    let store = exchange_store(&[("go", "One."), ("on", "Two.")]);
    let draft = wrapper
        .prepare(&store, &sid("a1"))?
        .with_title("First")
        .with_summary("They set out.")
        .with_end_state(r#"{"day": 1}"#);
    let (next, _) = wrapper.commit(&store, &draft)?;

    let narrator = Narrator::new(MockStreamingDriver::new_chunks(&["y"]), config);
    let request = narrator.compose(&next, &test_template(), "rest", None)?;
    assert_eq!(
        request.messages()[0].content(),
        "A quiet village.\n\nPREVIOUS CHAPTERS:\n\n## First\nThey set out.\n\nEND STATE:\n{\n  \"day\": 1\n}\n\nSTORY SO FAR:\n\nTwo."
    );
    Ok(())
}

#[tokio::test]
async fn test_chaptered_cutoff_sees_no_story_so_far() -> anyhow::Result<()> {
    let config = test_config();
    let wrapper = ChapterWrapper::new(MockStreamingDriver::new_chunks(&["x"]), config.clone());
    let store = exchange_store(&[("go", "One."), ("on", "Two.")]);
    let draft = wrapper
        .prepare(&store, &sid("a1"))?
        .with_title("First")
        .with_summary("They set out.")
        .with_end_state(r#"{"day": 1}"#);
    let (next, _) = wrapper.commit(&store, &draft)?;

    let narrator = Narrator::new(MockStreamingDriver::new_chunks(&["y"]), config);
    let expected =
        "A quiet village.\n\nPREVIOUS CHAPTERS:\n\n## First\nThey set out.\n\nEND STATE:\n{\n  \"day\": 1\n}";
    for cutoff in ["u1", "a1", "u2", "a2"] {
        let request = narrator.compose(&next, &test_template(), "rest", Some(&sid(cutoff)))?;
        assert_eq!(request.messages()[0].content(), expected);
    }
    Ok(())
}

#[test]
fn test_render_unknown_chapter_is_rejected() {
    let store = exchange_store(&[("go", "One.")]);
    let err = ChapterRenderer::default()
        .render(&store, &storyloom_core::ChapterId::from("missing"))
        .unwrap_err();
    assert!(err.is_validation());
}

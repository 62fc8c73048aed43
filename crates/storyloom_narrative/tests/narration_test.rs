//! Tests for the narration cycle, redo and streaming failures.

mod test_utils;

use std::time::Duration;
use storyloom_core::{SegmentSummary, StorySegment, SummaryId};
use storyloom_error::{GenerationErrorKind, ValidationErrorKind};
use storyloom_narrative::{
    CycleState, Enhancer, NarrationEvent, Narrator, SegmentStore, StreamPolicy,
};
use test_utils::{exchange_store, sid, test_config, test_template, MockStreamingDriver};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn unbounded_narrator(driver: MockStreamingDriver) -> Narrator<MockStreamingDriver> {
    Narrator::new(
        driver,
        test_config().with_policy(StreamPolicy::unbounded()),
    )
}

#[tokio::test]
async fn test_narrate_appends_user_and_streamed_reply() -> anyhow::Result<()> {
    let driver = MockStreamingDriver::new_chunks(&["You head ", "north."]);
    let narrator = Narrator::new(driver.clone(), test_config());

    let outcome = narrator
        .narrate(
            &SegmentStore::new(),
            &test_template(),
            "go north",
            &CancellationToken::new(),
            None,
        )
        .await?;

    assert_eq!(*outcome.state(), CycleState::Finalized);
    assert!(*outcome.dirty());
    let segments = outcome.store().segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].content(), "go north");
    assert_eq!(segments[0].id(), outcome.user_segment_id());
    assert_eq!(segments[1].content(), "You head north.");
    assert_eq!(segments[1].id(), outcome.assistant_segment_id());
    assert!(!*segments[1].incomplete());

    let request = &driver.requests()[0];
    assert!(request.system().is_none());
    assert_eq!(request.messages()[0].content(), "A quiet village.");
    assert_eq!(
        request.messages()[1].content(),
        "Continue the story.\n\nWRITER INPUT:\ngo north"
    );
    Ok(())
}

#[tokio::test]
async fn test_narrate_reports_states_and_text_in_order() -> anyhow::Result<()> {
    let narrator = Narrator::new(
        MockStreamingDriver::new_chunks(&["You head ", "north."]),
        test_config(),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();

    let outcome = narrator
        .narrate(
            &SegmentStore::new(),
            &test_template(),
            "go north",
            &CancellationToken::new(),
            Some(&tx),
        )
        .await?;
    drop(tx);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    let id = outcome.assistant_segment_id().clone();
    assert_eq!(
        events,
        vec![
            NarrationEvent::State(CycleState::AwaitingUserInput),
            NarrationEvent::State(CycleState::ContextAssembled),
            NarrationEvent::State(CycleState::StreamingAssistantReply),
            NarrationEvent::Text {
                segment_id: id.clone(),
                text: "You head ".to_string()
            },
            NarrationEvent::Text {
                segment_id: id,
                text: "You head north.".to_string()
            },
            NarrationEvent::State(CycleState::Finalized),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_narration_carries_the_story_day_forward() -> anyhow::Result<()> {
    let store = SegmentStore::new()
        .append(StorySegment::user("sleep").with_day(3))?
        .append(StorySegment::assistant("Morning comes.").with_day(3))?;
    let narrator = Narrator::new(MockStreamingDriver::new_chunks(&["Birds sing."]), test_config());

    let outcome = narrator
        .narrate(&store, &test_template(), "listen", &CancellationToken::new(), None)
        .await?;
    assert!(outcome.store().segments().iter().all(|s| *s.day() == 3));
    Ok(())
}

#[tokio::test]
async fn test_redo_replays_with_identical_context() -> anyhow::Result<()> {
    let driver = MockStreamingDriver::new_replies(&["The door creaks.", "The door bursts open."]);
    let narrator = Narrator::new(driver.clone(), test_config());
    let template = test_template();
    let cancel = CancellationToken::new();
    let store = exchange_store(&[("go north", "You head north.")]);

    let first = narrator
        .narrate(&store, &template, "open door", &cancel, None)
        .await?;
    let second = narrator
        .redo(first.store(), &template, &cancel, None)
        .await?;

    let requests = driver.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0], requests[1]);
    assert_eq!(first.request(), second.request());

    let segments = second.store().segments();
    assert_eq!(segments.len(), 4);
    assert_eq!(segments[2].content(), "open door");
    assert_eq!(segments[3].content(), "The door bursts open.");
    assert!(second.store().segment(first.assistant_segment_id()).is_none());
    assert!(second.store().segment(first.user_segment_id()).is_none());
    Ok(())
}

#[tokio::test]
async fn test_redo_requires_a_trailing_exchange() -> anyhow::Result<()> {
    let driver = MockStreamingDriver::new_chunks(&["unused"]);
    let narrator = Narrator::new(driver.clone(), test_config());
    let store = SegmentStore::from_parts(
        vec![
            StorySegment::user("go").with_id("u1"),
            StorySegment::assistant("One.").with_id("a1"),
            StorySegment::assistant("Two.").with_id("a2"),
        ],
        vec![],
        vec![],
    );

    let err = narrator
        .redo(&store, &test_template(), &CancellationToken::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.validation_kind(),
        Some(ValidationErrorKind::InvalidRedo(_))
    ));

    let err = narrator
        .redo(&SegmentStore::new(), &test_template(), &CancellationToken::new(), None)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(driver.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_redo_refuses_a_summarized_reply() -> anyhow::Result<()> {
    let narrator = Narrator::new(MockStreamingDriver::new_chunks(&["unused"]), test_config());
    let store = exchange_store(&[("go", "One.")]).apply_summary(
        SegmentSummary::new(SummaryId::from("s1"), "Short."),
        &[sid("a1")],
    )?;

    let err = narrator
        .redo(&store, &test_template(), &CancellationToken::new(), None)
        .await
        .unwrap_err();
    assert_eq!(
        err.validation_kind(),
        Some(&ValidationErrorKind::SegmentLocked("a1".to_string()))
    );
    Ok(())
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_partial_text() -> anyhow::Result<()> {
    let driver = MockStreamingDriver::new_fail_after(
        &["The door"],
        GenerationErrorKind::Request("boom".to_string()),
    );
    let narrator = Narrator::new(driver, test_config());

    let outcome = narrator
        .narrate(&SegmentStore::new(), &test_template(), "open", &CancellationToken::new(), None)
        .await?;

    assert_eq!(*outcome.state(), CycleState::Failed);
    assert_eq!(
        outcome.failure(),
        &Some(GenerationErrorKind::StreamInterrupted("boom".to_string()))
    );
    let reply = outcome.store().last().expect("assistant segment kept");
    assert!(*reply.incomplete());
    assert_eq!(reply.content(), "The door\n\nError: Stream interrupted: boom");
    Ok(())
}

#[tokio::test]
async fn test_error_chunk_fails_the_cycle() -> anyhow::Result<()> {
    let narrator = Narrator::new(
        MockStreamingDriver::new_chunks(&["The door", "Error: upstream 502", "ignored"]),
        test_config(),
    );

    let outcome = narrator
        .narrate(&SegmentStore::new(), &test_template(), "open", &CancellationToken::new(), None)
        .await?;

    assert_eq!(*outcome.state(), CycleState::Failed);
    assert_eq!(
        outcome.failure(),
        &Some(GenerationErrorKind::Upstream("upstream 502".to_string()))
    );
    let reply = outcome.store().last().expect("assistant segment kept");
    assert!(*reply.incomplete());
    assert_eq!(reply.content(), "The door\n\nError: upstream 502");
    Ok(())
}

#[tokio::test]
async fn test_refused_stream_leaves_visible_error() -> anyhow::Result<()> {
    let narrator = Narrator::new(
        MockStreamingDriver::new_open_error(GenerationErrorKind::Request("refused".to_string())),
        test_config(),
    );

    let outcome = narrator
        .narrate(&SegmentStore::new(), &test_template(), "open", &CancellationToken::new(), None)
        .await?;

    assert_eq!(*outcome.state(), CycleState::Failed);
    let reply = outcome.store().last().expect("assistant segment kept");
    assert_eq!(reply.content(), "Error: Completion request failed: refused");
    assert!(*reply.incomplete());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stalled_stream_times_out() -> anyhow::Result<()> {
    let narrator = Narrator::new(
        MockStreamingDriver::new_hang(&["Half a sentence"]),
        test_config().with_policy(
            StreamPolicy::unbounded().with_idle_timeout(Some(Duration::from_secs(5))),
        ),
    );

    let outcome = narrator
        .narrate(&SegmentStore::new(), &test_template(), "wait", &CancellationToken::new(), None)
        .await?;

    assert_eq!(outcome.failure(), &Some(GenerationErrorKind::IdleTimeout(5)));
    assert_eq!(
        outcome.store().last().expect("assistant segment kept").content(),
        "Half a sentence\n\nError: No response chunk within 5 seconds"
    );
    Ok(())
}

#[tokio::test]
async fn test_oversized_reply_is_truncated() -> anyhow::Result<()> {
    let narrator = Narrator::new(
        MockStreamingDriver::new_chunks(&["abcdef", "ghij"]),
        test_config().with_policy(StreamPolicy::unbounded().with_max_chars(Some(8))),
    );

    let outcome = narrator
        .narrate(&SegmentStore::new(), &test_template(), "go", &CancellationToken::new(), None)
        .await?;

    assert_eq!(outcome.failure(), &Some(GenerationErrorKind::ResponseTooLarge(8)));
    assert_eq!(
        outcome.store().last().expect("assistant segment kept").content(),
        "abcdefgh\n\nError: Response exceeded 8 characters"
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_between_chunks() -> anyhow::Result<()> {
    let narrator = unbounded_narrator(MockStreamingDriver::new_hang(&["Partial"]));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let outcome = narrator
        .narrate(&SegmentStore::new(), &test_template(), "go", &cancel, None)
        .await?;

    assert_eq!(*outcome.state(), CycleState::Failed);
    assert_eq!(
        outcome.store().last().expect("assistant segment kept").content(),
        "Partial\n\nError: Generation cancelled"
    );
    Ok(())
}

#[tokio::test]
async fn test_enhancement_rewrites_one_segment() -> anyhow::Result<()> {
    let driver = MockStreamingDriver::new_chunks(&["Two, but darker."]);
    let enhancer = Enhancer::new(driver.clone(), test_config());
    let store = exchange_store(&[("go", "One."), ("on", "Two.")]);

    let draft = enhancer
        .enhance(&store, &sid("a2"), "Make it darker.", true, &CancellationToken::new())
        .await?;
    let next = draft.apply(&store)?;

    assert_eq!(next.segment(&sid("a2")).expect("kept").content(), "Two, but darker.");
    assert_eq!(next.segment(&sid("a1")).expect("kept").content(), "One.");
    assert_eq!(
        driver.requests()[0].messages()[0].content(),
        "One.\n\nTwo.\n\nPROMPT:\n\nMake it darker."
    );
    Ok(())
}

#[tokio::test]
async fn test_blank_enhancement_is_rejected() -> anyhow::Result<()> {
    let enhancer = Enhancer::new(MockStreamingDriver::new_chunks(&["x"]), test_config());
    let store = exchange_store(&[("go", "One.")]);

    let draft = enhancer
        .enhance(&store, &sid("a1"), "Shorter.", false, &CancellationToken::new())
        .await?
        .edited("  ");
    assert!(draft.apply(&store).unwrap_err().is_validation());
    Ok(())
}

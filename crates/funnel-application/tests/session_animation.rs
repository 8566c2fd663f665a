use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use funnel_application::{FunnelSession, SessionFactory};
use funnel_core::FunnelConfig;
use funnel_core::analysis::{AnalysisStage, CounterSpec, PromptSpec};
use funnel_core::flow::{
    DEFAULT_STEP_PARAM, FlowController, FlowEvent, FlowOptions, PageAddress, RecordingRenderer, RenderCall,
};
use funnel_core::selection::Answer;
use funnel_core::step::{StepDefinition, StepRegistry};
use funnel_execution::ProgressAnimator;

fn builtin_factory() -> SessionFactory {
    SessionFactory::new(FunnelConfig::default(), Arc::new(StepRegistry::builtin())).with_seed(17)
}

fn gated_factory() -> SessionFactory {
    let prompt = PromptSpec {
        key: "spicyPhotos".into(),
        question: "Would you like spicy photos?".into(),
        options: vec!["Yes".into(), "No".into()],
    };
    let registry = StepRegistry::new(vec![
        StepDefinition::new("start"),
        StepDefinition::new("check").analysis(AnalysisStage {
            counters: vec![CounterSpec::new(30).with_prompt(prompt), CounterSpec::new(30)],
        }),
        StepDefinition::new("summary").summary(),
        StepDefinition::new("pricing"),
    ])
    .unwrap();

    let mut config = FunnelConfig::default();
    config.exit.redirect_url = Some("https://quiz.local/checkout".into());
    SessionFactory::new(config, Arc::new(registry)).with_seed(3)
}

#[tokio::test(start_paused = true)]
async fn test_analysis_step_auto_advances_after_counters_finish() {
    let renderer = Arc::new(RecordingRenderer::new());
    let session = builtin_factory()
        .create_session(renderer.clone(), Some("https://quiz.local/?quizStep=analysis-1"))
        .unwrap();
    assert_eq!(session.current_index(), 12);
    assert!(session.status().animating);

    let status = session.settled().await;
    assert_eq!(status.entry.index, 13);
    assert!(!status.animating);

    let last_progress = renderer
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            RenderCall::Progress { step: 12, values } => Some(values),
            _ => None,
        })
        .last()
        .unwrap();
    assert_eq!(last_progress, vec![100, 65, 15]);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_and_reentering_analysis_advances_once() {
    let renderer = Arc::new(RecordingRenderer::new());
    let session = builtin_factory()
        .create_session(renderer.clone(), Some("https://quiz.local/?quizStep=analysis-1"))
        .unwrap();

    sleep(Duration::from_millis(500)).await;
    assert_eq!(session.current_index(), 12);

    assert_eq!(session.retreat().unwrap().index, 11);
    assert!(!session.status().animating);
    assert_eq!(session.advance().unwrap().index, 12);

    let status = session.settled().await;
    assert_eq!(status.entry.index, 13);

    // Long after both animations could have finished.
    sleep(Duration::from_secs(30)).await;
    assert_eq!(session.current_index(), 13);
    let entered_13 = renderer.shown_steps().into_iter().filter(|&index| index == 13).count();
    assert_eq!(entered_13, 1);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_analysis_cancels_its_completion() {
    let session = builtin_factory()
        .create_session(Arc::new(RecordingRenderer::new()), Some("https://quiz.local/?quizStep=analysis-2"))
        .unwrap();

    sleep(Duration::from_millis(300)).await;
    session.jump(Some("hair"));

    sleep(Duration::from_secs(30)).await;
    assert_eq!(session.current_index(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_gated_analysis_waits_for_the_answer() {
    let renderer = Arc::new(RecordingRenderer::new());
    let session = gated_factory().create_session(renderer.clone(), None).unwrap();

    assert_eq!(session.advance().unwrap().index, 1);
    let status = session.settled().await;
    let prompt = status.prompt.unwrap();
    assert_eq!(prompt.prompt.key, "spicyPhotos");
    assert_eq!(prompt.counter, 0);

    // The open prompt holds the step.
    sleep(Duration::from_secs(30)).await;
    assert_eq!(session.current_index(), 1);
    assert!(renderer.calls().iter().any(|call| matches!(call, RenderCall::Prompt { step: 1, .. })));

    assert!(session.answer_prompt("Yes").is_some());
    let status = session.settled().await;
    assert_eq!(status.entry.index, 2);
    assert_eq!(session.selection().spicy_photos, Some(Answer::Yes));
    assert_eq!(renderer.last_summary().unwrap().extras, vec!["Spicy photos"]);
}

#[tokio::test(start_paused = true)]
async fn test_answer_after_leaving_the_step_is_ignored() {
    let session = gated_factory().create_session(Arc::new(RecordingRenderer::new()), None).unwrap();

    session.advance();
    assert!(session.settled().await.prompt.is_some());

    session.retreat();
    assert!(session.pending_prompt().is_none());
    assert!(session.answer_prompt("Yes").is_none());

    sleep(Duration::from_secs(30)).await;
    assert_eq!(session.current_index(), 0);
    assert!(session.selection().prompt_answers.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exit_on_the_last_step_publishes_the_redirect() {
    let renderer = Arc::new(RecordingRenderer::new());
    let session = gated_factory().create_session(renderer.clone(), None).unwrap();

    assert!(session.exit().is_none());
    session.jump(Some("pricing"));
    session.dispatch(FlowEvent::Exit);

    let status = session.settled().await;
    assert_eq!(status.redirect.as_deref(), Some("https://quiz.local/checkout"));
    assert!(renderer.calls().contains(&RenderCall::Redirect {
        destination: "https://quiz.local/checkout".into(),
    }));
}

#[tokio::test(start_paused = true)]
async fn test_zero_tick_interval_is_rejected_before_any_animation_starts() {
    let mut config = FunnelConfig::default();
    config.animator.tick_interval_ms = 0;
    let factory = SessionFactory::new(config, Arc::new(StepRegistry::builtin()));

    let err = factory
        .create_session(Arc::new(RecordingRenderer::new()), Some("https://quiz.local/?quizStep=analysis-1"))
        .unwrap_err();
    assert!(err.is_config());
}

#[tokio::test(start_paused = true)]
async fn test_animator_with_zero_tick_still_completes() {
    let mut config = FunnelConfig::default();
    config.animator.tick_interval_ms = 0;
    let address = PageAddress::parse("https://quiz.local/?quizStep=analysis-1", DEFAULT_STEP_PARAM).unwrap();
    let controller = FlowController::new(
        Arc::new(StepRegistry::builtin()),
        Arc::new(RecordingRenderer::new()),
        FlowOptions::new(address),
    );
    let session = FunnelSession::start("zero-tick", controller, ProgressAnimator::new(config.animator).with_seed(5));
    assert_eq!(session.current_index(), 12);

    let status = timeout(Duration::from_secs(600), session.settled()).await.unwrap();
    assert_eq!(status.entry.index, 13);
    assert!(!status.animating);
}

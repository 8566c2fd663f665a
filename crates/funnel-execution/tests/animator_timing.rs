use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};

use funnel_core::analysis::{AnalysisStage, CounterSpec, PromptSpec};
use funnel_core::config::AnimatorConfig;
use funnel_core::flow::AnimationTicket;
use funnel_execution::{AnimatorEvent, ProgressAnimator};

fn ticket(stage: AnalysisStage) -> AnimationTicket {
    AnimationTicket {
        step_index: 12,
        epoch: 4,
        stage,
    }
}

fn prompt(key: &str) -> PromptSpec {
    PromptSpec {
        key: key.to_string(),
        question: format!("Do you want {}?", key),
        options: vec!["Yes".into(), "No".into()],
    }
}

async fn collect_until_closed(rx: &mut mpsc::UnboundedReceiver<AnimatorEvent>) -> Vec<AnimatorEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_parallel_counters_reach_targets_before_completion() {
    let animator = ProgressAnimator::new(AnimatorConfig::default()).with_seed(11);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let started = Instant::now();
    let _handle = animator.start(ticket(AnalysisStage::with_targets(&[100, 65, 15])), tx);

    let events = collect_until_closed(&mut rx).await;
    let (last, progress) = events.split_last().expect("events");

    assert!(matches!(last, AnimatorEvent::Completed { ticket } if ticket.epoch == 4));
    let Some(AnimatorEvent::Progress { values, .. }) = progress.last() else {
        panic!("expected progress before completion");
    };
    assert_eq!(values, &vec![100, 65, 15]);
    for event in progress {
        let AnimatorEvent::Progress { values, .. } = event else {
            panic!("unexpected event {:?}", event);
        };
        assert!(values[0] <= 100 && values[1] <= 65 && values[2] <= 15);
    }

    // 100 at no more than 7 per 160 ms tick, then the settle delay.
    assert!(progress.len() >= 15);
    assert!(started.elapsed() >= Duration::from_millis(15 * 160 + 800));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_animation_never_completes() {
    let animator = ProgressAnimator::new(AnimatorConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut handle = animator.start(ticket(AnalysisStage::with_targets(&[100])), tx);

    let first = rx.recv().await.expect("first tick");
    assert!(matches!(first, AnimatorEvent::Progress { .. }));

    handle.cancel();
    handle.wait().await;
    assert!(handle.is_finished());

    let rest = collect_until_closed(&mut rx).await;
    assert!(rest.iter().all(|e| !matches!(e, AnimatorEvent::Completed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_handle_cancels() {
    let animator = ProgressAnimator::new(AnimatorConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = animator.start(ticket(AnalysisStage::with_targets(&[40])), tx);
    drop(handle);

    let events = collect_until_closed(&mut rx).await;
    assert!(events.iter().all(|e| !matches!(e, AnimatorEvent::Completed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_gated_stage_waits_for_resume() {
    let stage = AnalysisStage {
        counters: vec![CounterSpec::new(20).with_prompt(prompt("spicyPhotos")), CounterSpec::new(20)],
    };
    let animator = ProgressAnimator::new(AnimatorConfig::default()).with_seed(5);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = animator.start(ticket(stage), tx);

    loop {
        match rx.recv().await.expect("animation ended early") {
            AnimatorEvent::PromptRaised { counter, prompt, .. } => {
                assert_eq!(counter, 0);
                assert_eq!(prompt.key, "spicyPhotos");
                break;
            }
            AnimatorEvent::Progress { values, .. } => assert_eq!(values[1], 0),
            AnimatorEvent::Completed { .. } => panic!("completed while gated"),
        }
    }

    // Nothing moves while the prompt is open.
    assert!(timeout(Duration::from_secs(10), rx.recv()).await.is_err());

    assert!(handle.resume());
    let events = collect_until_closed(&mut rx).await;
    assert!(matches!(events.last(), Some(AnimatorEvent::Completed { .. })));
    let Some(AnimatorEvent::Progress { values, .. }) = events.iter().rev().nth(1) else {
        panic!("expected progress before completion");
    };
    assert_eq!(values, &vec![20, 20]);
    drop(handle);
}

#[tokio::test(start_paused = true)]
async fn test_seeded_animations_repeat_exactly() {
    let stage = AnalysisStage::with_targets(&[100, 80, 15]);
    let animator = ProgressAnimator::new(AnimatorConfig::default()).with_seed(99);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _first = animator.start(ticket(stage.clone()), tx);
    let first_run = collect_until_closed(&mut rx).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _second = animator.start(ticket(stage), tx);
    let second_run = collect_until_closed(&mut rx).await;

    assert_eq!(first_run, second_run);
}

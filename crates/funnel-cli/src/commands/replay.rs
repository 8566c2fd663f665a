//! `funnel replay`: feed a recorded event script through a session.
//!
//! Scripts hold one [`FlowEvent`] per line as JSON. Blank lines and lines
//! starting with `#` are skipped.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tokio::time::timeout;

use funnel_core::flow::{FlowEvent, RecordingRenderer};
use funnel_core::selection::SelectionState;
use funnel_core::summary::DisplayModel;

use super::AppContext;

/// Upper bound for one analysis stage to finish or raise a prompt.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayOutcome {
    step: usize,
    slug: String,
    resumed_without_state: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
    selection: SelectionState,
    summary: DisplayModel,
}

pub async fn run(context: &AppContext, script: &Path, trace: bool, fast: bool, seed: Option<u64>) -> Result<()> {
    let content = std::fs::read_to_string(script).with_context(|| format!("failed to read {}", script.display()))?;
    let events = parse_script(&content)?;

    let mut config = context.config.clone();
    if fast {
        config.animator.tick_interval_ms = 1;
        config.animator.settle_delay_ms = 0;
    }

    let renderer = Arc::new(RecordingRenderer::new());
    let session = context
        .session_factory(config, seed)
        .create_session(renderer.clone(), None)?;
    settle(&session).await?;
    flush_trace(&renderer, trace)?;

    for event in events {
        tracing::debug!(target: "funnel::cli", ?event, "Replaying event");
        let dispatched = session.dispatch(event);
        tracing::debug!(target: "funnel::cli", ?dispatched, "Event applied");
        settle(&session).await?;
        flush_trace(&renderer, trace)?;
    }

    let status = session.status();
    let outcome = session.with_controller(|controller| ReplayOutcome {
        step: controller.current_index(),
        slug: status.entry.slug.clone(),
        resumed_without_state: controller.resumed_without_state(),
        redirect: status.redirect.clone(),
        selection: controller.selection().clone(),
        summary: controller.summary(),
    });
    session.close();

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn settle(session: &funnel_application::FunnelSession) -> Result<()> {
    timeout(SETTLE_TIMEOUT, session.settled())
        .await
        .map_err(|_| anyhow!("analysis on step {} did not settle", session.current_index()))?;
    Ok(())
}

fn flush_trace(renderer: &RecordingRenderer, trace: bool) -> Result<()> {
    let calls = renderer.take();
    if trace {
        for call in calls {
            eprintln!("{}", serde_json::to_string(&call)?);
        }
    }
    Ok(())
}

fn parse_script(content: &str) -> Result<Vec<FlowEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| {
            serde_json::from_str(line.trim()).with_context(|| format!("line {}: invalid event", number + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::selection::NumericField;

    #[test]
    fn test_parse_script_skips_comments_and_blank_lines() {
        let events = parse_script(
            r#"
            # pick an ethnicity
            {"type":"select_option","step":0,"value":"Asian"}

            {"type":"slide","field":"kink","value":30}
            {"type":"jump","slug":"summary"}
            {"type":"jump"}
            {"type":"exit"}
            "#,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                FlowEvent::SelectOption {
                    step: 0,
                    value: "Asian".into()
                },
                FlowEvent::Slide {
                    field: NumericField::Kink,
                    value: 30
                },
                FlowEvent::Jump {
                    slug: Some("summary".into())
                },
                FlowEvent::Jump { slug: None },
                FlowEvent::Exit,
            ]
        );
    }

    #[test]
    fn test_parse_script_reports_the_line() {
        let err = parse_script("{\"type\":\"continue\"}\n{\"type\":\"fly\"}\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}

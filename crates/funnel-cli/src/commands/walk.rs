//! `funnel walk`: an interactive terminal front end.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use funnel_application::FunnelSession;
use funnel_core::analysis::PromptSpec;
use funnel_core::flow::{FlowEvent, FlowRenderer, PageAddress};
use funnel_core::selection::NumericField;
use funnel_core::step::StepDefinition;
use funnel_core::summary::DisplayModel;

use super::AppContext;

const COMMANDS: &[&str] = &[
    "select", "slide", "continue", "back", "jump", "answer", "exit", "summary", "state", "help", "quit",
];

// ============================================================================
// Input
// ============================================================================

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq)]
enum WalkCommand {
    Event(FlowEvent),
    Summary,
    State,
    Help,
    Quit,
}

fn parse_command(line: &str, current_step: usize) -> Result<WalkCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "select" | "s" => {
            if rest.is_empty() {
                return Err("usage: select <value>".into());
            }
            WalkCommand::Event(FlowEvent::SelectOption {
                step: current_step,
                value: rest.to_string(),
            })
        }
        "slide" => {
            let (field, value) = rest.split_once(char::is_whitespace).ok_or("usage: slide <field> <0-100>")?;
            let field: NumericField = field
                .parse()
                .map_err(|_| format!("unknown slider '{}' (libido, kink, nudity)", field))?;
            let value: i32 = value
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not a number", value.trim()))?;
            WalkCommand::Event(FlowEvent::Slide { field, value })
        }
        "continue" | "c" | "" => WalkCommand::Event(FlowEvent::Continue),
        "back" | "b" => WalkCommand::Event(FlowEvent::Back),
        "jump" | "j" => WalkCommand::Event(FlowEvent::Jump {
            slug: (!rest.is_empty()).then(|| rest.to_string()),
        }),
        "answer" | "a" => {
            if rest.is_empty() {
                return Err("usage: answer <value>".into());
            }
            WalkCommand::Event(FlowEvent::AnswerPrompt { value: rest.to_string() })
        }
        "exit" => WalkCommand::Event(FlowEvent::Exit),
        "summary" => WalkCommand::Summary,
        "state" => WalkCommand::State,
        "help" | "?" => WalkCommand::Help,
        "quit" | "q" => WalkCommand::Quit,
        other => return Err(format!("unknown command '{}', type 'help'", other)),
    };
    Ok(command)
}

/// Completion and hints for the walk REPL.
#[derive(Clone)]
struct WalkHelper {
    slugs: Vec<String>,
}

impl WalkHelper {
    fn new(slugs: Vec<String>) -> Self {
        Self { slugs }
    }

    fn candidates(&self, line: &str) -> Vec<String> {
        if let Some(prefix) = line.strip_prefix("jump ") {
            return self
                .slugs
                .iter()
                .filter(|slug| slug.starts_with(prefix))
                .map(|slug| format!("jump {}", slug))
                .collect();
        }
        if line.contains(' ') {
            return Vec::new();
        }
        COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| cmd.to_string())
            .collect()
    }
}

impl Helper for WalkHelper {}

impl Completer for WalkHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .candidates(&line[..pos])
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for WalkHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match line.split_whitespace().next() {
            Some(word) if COMMANDS.contains(&word) => Owned(line.bright_cyan().to_string()),
            _ => Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for WalkHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() {
            return None;
        }
        self.candidates(line)
            .into_iter()
            .find(|candidate| candidate.len() > line.len())
            .map(|candidate| candidate[line.len()..].to_string())
    }
}

impl Validator for WalkHelper {}

// ============================================================================
// Output
// ============================================================================

/// Draws the funnel as colored terminal lines.
struct TerminalRenderer;

impl TerminalRenderer {
    fn bar(value: u8) -> String {
        let filled = usize::from(value) / 5;
        format!("{}{} {:>3}%", "#".repeat(filled), ".".repeat(20 - filled.min(20)), value)
    }
}

impl FlowRenderer for TerminalRenderer {
    fn show_step(&self, step: &StepDefinition) {
        println!();
        println!("{}", format!("== {} ==", step.slug).bright_magenta().bold());
        if let Some(binding) = step.binding {
            let hint = if binding.is_multi_select() {
                "select options to toggle them, then continue"
            } else {
                "select one option"
            };
            println!("{}", format!("   {} ({})", hint, binding.field()).bright_black());
        }
    }

    fn set_continue_enabled(&self, _step_index: usize, enabled: bool) {
        if !enabled {
            println!("{}", "   continue is disabled until you select something".yellow());
        }
    }

    fn update_progress_track(&self, active: usize, total: usize) {
        let track: String = (0..total).map(|i| if i <= active { '=' } else { '-' }).collect();
        println!("{}", format!("   [{}] {}/{}", track, active + 1, total).bright_black());
    }

    fn reflect_address(&self, address: &PageAddress) {
        println!("{}", format!("   {}", address).bright_black());
    }

    fn mark_options(&self, _step_index: usize, marked: &[String]) {
        if !marked.is_empty() {
            println!("{}", format!("   selected: {}", marked.join(", ")).green());
        }
    }

    fn set_slider_label(&self, field: NumericField, label: &str) {
        println!("{}", format!("   {} {}", field, label).green());
    }

    fn show_progress(&self, _step_index: usize, values: &[u8]) {
        let bars: Vec<String> = values.iter().map(|v| Self::bar(*v)).collect();
        print!("\r   {}", bars.join("  ").bright_blue());
        let _ = std::io::stdout().flush();
    }

    fn show_prompt(&self, _step_index: usize, prompt: &PromptSpec) {
        println!();
        println!("{}", prompt.question.bright_yellow().bold());
        if !prompt.options.is_empty() {
            println!("{}", format!("   answer {}", prompt.options.join(" | ")).yellow());
        }
    }

    fn render_summary(&self, model: &DisplayModel) {
        print_summary(model);
    }

    fn redirect(&self, destination: &str) {
        println!("{}", format!("-> {}", destination).bright_green().bold());
    }
}

fn print_summary(model: &DisplayModel) {
    let rows = [
        ("Ethnicity", &model.ethnicity),
        ("Age", &model.age),
        ("Looking for", &model.looking_for),
        ("Figure", &model.figure),
        ("Breast", &model.breast),
        ("Butt", &model.butt),
        ("Hair", &model.hair),
        ("Preferences", &model.preferences),
        ("Willing to try", &model.willing),
        ("Scenarios", &model.scenarios),
    ];
    for (label, value) in rows {
        println!("   {:<15} {}", label.bright_black(), value);
    }
    for (label, meter) in [("Libido", &model.libido), ("Kink", &model.kink), ("Nudity", &model.nudity)] {
        println!("   {:<15} {}", label.bright_black(), TerminalRenderer::bar(meter.percent));
    }
    println!("   {:<15} {}", "Extras".bright_black(), model.extras.join(", "));
}

fn print_help() {
    let lines = [
        "select <value>        choose an option on the current step (alias: s)",
        "slide <field> <n>     set libido, kink or nudity to 0-100",
        "continue              next step when allowed (alias: c, or empty line)",
        "back                  previous step (alias: b)",
        "jump [slug]           open a step by its address slug (alias: j)",
        "answer <value>        answer the question of an analysis screen (alias: a)",
        "exit                  leave from the last step",
        "summary | state       show the summary or the raw answers",
        "quit                  stop walking",
    ];
    for line in lines {
        println!("{}", line.bright_black());
    }
}

// ============================================================================
// Loop
// ============================================================================

pub async fn run(context: &AppContext, start: Option<&str>, seed: Option<u64>) -> Result<()> {
    let address = match start {
        Some(slug) => Some(
            context
                .config
                .address
                .page_address()?
                .with_step(slug)
                .to_string(),
        ),
        None => None,
    };

    let renderer: Arc<dyn FlowRenderer> = Arc::new(TerminalRenderer);
    let session = context
        .session_factory(context.config.clone(), seed)
        .create_session(renderer, address.as_deref())?;

    let helper = WalkHelper::new(context.registry.iter().map(|step| step.slug.clone()).collect());
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== Funnel walk ===".bright_magenta().bold());
    println!("{}", "Type 'help' for commands, 'quit' to stop.".bright_black());
    if session.with_controller(|controller| controller.resumed_without_state()) {
        println!("{}", "Started mid-funnel: earlier answers are empty.".yellow());
    }

    wait_for_analysis(&session).await;

    loop {
        let prompt = format!("[{}] > ", session.status().entry.slug);
        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                match parse_command(&line, session.current_index()) {
                    Ok(WalkCommand::Quit) => break,
                    Ok(WalkCommand::Help) => print_help(),
                    Ok(WalkCommand::Summary) => print_summary(&session.summary()),
                    Ok(WalkCommand::State) => println!("{}", serde_json::to_string_pretty(&session.selection())?),
                    Ok(WalkCommand::Event(event)) => {
                        let dispatched = session.dispatch(event);
                        tracing::debug!(target: "funnel::cli", ?dispatched, "Walk event applied");
                        wait_for_analysis(&session).await;
                        if session.status().redirect.is_some() {
                            break;
                        }
                    }
                    Err(message) => println!("{}", message.red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to stop.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    session.close();
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

/// Blocks the prompt while an analysis screen plays.
async fn wait_for_analysis(session: &FunnelSession) {
    if session.status().is_settled() {
        return;
    }
    session.settled().await;
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_uses_current_step() {
        assert_eq!(
            parse_command("select Extra curvy", 3),
            Ok(WalkCommand::Event(FlowEvent::SelectOption {
                step: 3,
                value: "Extra curvy".into()
            }))
        );
        assert!(parse_command("select", 3).is_err());
    }

    #[test]
    fn test_parse_slide() {
        assert_eq!(
            parse_command("slide libido 80", 9),
            Ok(WalkCommand::Event(FlowEvent::Slide {
                field: NumericField::Libido,
                value: 80
            }))
        );
        assert!(parse_command("slide mood 80", 9).is_err());
        assert!(parse_command("slide kink lots", 9).is_err());
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_command("", 0), Ok(WalkCommand::Event(FlowEvent::Continue)));
        assert_eq!(parse_command("back", 0), Ok(WalkCommand::Event(FlowEvent::Back)));
        assert_eq!(
            parse_command("jump hair", 0),
            Ok(WalkCommand::Event(FlowEvent::Jump {
                slug: Some("hair".into())
            }))
        );
        assert_eq!(parse_command("j", 0), Ok(WalkCommand::Event(FlowEvent::Jump { slug: None })));
        assert_eq!(parse_command("q", 0), Ok(WalkCommand::Quit));
        assert!(parse_command("dance", 0).is_err());
    }

    #[test]
    fn test_helper_completes_commands_and_slugs() {
        let helper = WalkHelper::new(vec!["hair".into(), "hobbies".into(), "age".into()]);
        assert_eq!(helper.candidates("su"), vec!["summary"]);
        assert_eq!(helper.candidates("jump h"), vec!["jump hair", "jump hobbies"]);
        assert!(helper.candidates("select x").is_empty());
    }

    #[test]
    fn test_bar_is_clamped_to_twenty_cells() {
        assert_eq!(TerminalRenderer::bar(0), format!("{}   0%", ".".repeat(20)));
        assert_eq!(TerminalRenderer::bar(100), format!("{} 100%", "#".repeat(20)));
    }
}

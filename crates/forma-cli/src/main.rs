//! forma - terminal front-end for the guided blueprint session.
//!
//! Thin surface: the access gate, the REPL loop, and rendering. All session
//! logic lives in forma-application.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use forma_application::{SessionEngine, TurnResult};
use forma_interaction::{OpenAiGateway, WebhookSink};

const ACCESS_CODE_ENV: &str = "FORMA_ACCESS_CODE";
const DEFAULT_EXPORT_PATH: &str = "blueprint.md";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut editor = DefaultEditor::new()?;

    if !passes_access_gate(&mut editor)? {
        eprintln!("Access denied.");
        std::process::exit(1);
    }

    let gateway = Arc::new(OpenAiGateway::try_from_env()?);
    let engine = SessionEngine::new(gateway, WebhookSink::from_env());

    println!("{}", "Idea -> Business Blueprint".bold());
    println!("Turn a vague idea into a clear, execution-ready business.");
    println!("Assumptions and risks are explicitly labelled. Validate them before execution.");
    println!("Commands: /state, /save [path], /reset, /quit");
    println!();

    loop {
        println!("{}", engine.next_user_prompt().await.dimmed());
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input {
            "/quit" | "/exit" => break,
            "/reset" => {
                engine.reset().await;
                println!("Session reset.");
            }
            "/state" => print_state(&engine).await,
            _ if input.starts_with("/save") => {
                let path = export_path(input);
                match engine.export_blueprint(&path).await {
                    Ok(true) => println!("Wrote {}", path.display()),
                    Ok(false) => println!("Blueprint appears after Builder mode."),
                    Err(err) => println!("{} {}", "error:".red().bold(), err),
                }
            }
            _ if input.starts_with('/') => println!("Unknown command: {input}"),
            _ => run_turn(&engine, input).await,
        }
    }

    Ok(())
}

async fn run_turn(engine: &SessionEngine, input: &str) {
    match engine.process_turn(input).await {
        Ok(TurnResult::Replied(output)) => {
            println!("{} {}", "assistant:".green().bold(), output.assistant_message);
            println!();
            if output.blueprint_updated {
                println!(
                    "{}",
                    format!("Blueprint updated. /save writes it to {DEFAULT_EXPORT_PATH}.")
                        .yellow()
                );
            }
        }
        Ok(TurnResult::Superseded) => {}
        // Visible but non-fatal: the turn failed, the session did not.
        Err(err) => println!("{} {}", "error:".red().bold(), err),
    }
}

async fn print_state(engine: &SessionEngine) {
    let state = engine.state().await;
    println!("Mode: {}", state.mode);
    println!("Converged: {}", state.convergence_ready);
    if !state.direction_thesis.is_empty() {
        println!("Thesis: {}", state.direction_thesis);
    }
    if !state.confidence.is_empty() {
        let mut entries: Vec<_> = state.confidence.iter().collect();
        entries.sort();
        let rendered = entries
            .iter()
            .map(|(topic, score)| format!("{topic}={score}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Confidence: {rendered}");
    }
}

/// Optional shared-secret gate protecting API spend. Disabled when the
/// variable is unset or empty.
fn passes_access_gate(editor: &mut DefaultEditor) -> Result<bool> {
    let expected = match env::var(ACCESS_CODE_ENV) {
        Ok(code) if !code.is_empty() => code,
        _ => return Ok(true),
    };

    let supplied = editor.readline("Access code: ")?;
    Ok(supplied.trim() == expected)
}

fn export_path(input: &str) -> PathBuf {
    let arg = input.strip_prefix("/save").unwrap_or(input).trim();
    if arg.is_empty() {
        PathBuf::from(DEFAULT_EXPORT_PATH)
    } else {
        PathBuf::from(arg)
    }
}

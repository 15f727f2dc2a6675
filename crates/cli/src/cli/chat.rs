//! `archplan chat`: interactive REPL command.
//!
//! Each line is one chat turn. The conversation window lives in memory for
//! the session; the project state is written back to the state file after
//! every successful turn.

use std::path::Path;

use ap_domain::conversation::{trim_to_window, ConversationTurn};
use ap_domain::project::ProjectState;
use ap_domain::retrieval::Source;

use crate::bootstrap::Runtime;
use crate::cli::run::{print_follow_ups, print_sources};
use crate::state_file;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// In-memory session driven by the REPL.
struct ChatSession {
    state: ProjectState,
    history: Vec<ConversationTurn>,
    last_sources: Vec<Source>,
}

pub async fn chat(runtime: &Runtime, state_path: &Path) -> anyhow::Result<()> {
    let state = state_file::load(state_path)?.unwrap_or_default();
    let mut session = ChatSession {
        state,
        history: Vec::new(),
        last_sources: Vec::new(),
    };

    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".archplan")
        .join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    eprintln!("archplan interactive chat");
    eprintln!(
        "State: {}  |  Type /help for commands, Ctrl+D to exit",
        state_path.display()
    );
    eprintln!();

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(&line).ok();

                if trimmed.starts_with('/') {
                    if handle_slash_command(trimmed, &mut session) {
                        break;
                    }
                    continue;
                }

                if let Err(e) = send_message(runtime, &mut session, state_path, trimmed).await {
                    eprintln!("\x1B[31merror: {e:#}\x1B[0m");
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Goodbye!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process a slash command. Returns `true` if the REPL should exit.
fn handle_slash_command(input: &str, session: &mut ChatSession) -> bool {
    let cmd = input.split_whitespace().next().unwrap_or(input);

    match cmd {
        "/exit" | "/quit" => return true,

        "/state" => match serde_json::to_string_pretty(&session.state) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("\x1B[31merror: {e}\x1B[0m"),
        },

        "/sources" => {
            if session.last_sources.is_empty() {
                eprintln!("No sources for the last turn.");
            } else {
                print_sources(&session.last_sources);
            }
        }

        "/reset" => {
            session.history.clear();
            session.last_sources.clear();
            eprintln!("Conversation history cleared (state kept).");
        }

        "/clear" => {
            eprint!("\x1B[2J\x1B[1;1H");
        }

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /state           Print the current project state");
            eprintln!("  /sources         List sources cited in the last reply");
            eprintln!("  /reset           Forget the conversation, keep the state");
            eprintln!("  /clear           Clear the screen");
            eprintln!("  /exit, /quit     Exit the chat");
            eprintln!("  /help            Show this help");
        }

        other => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }

    false
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one turn. History and state change only when the turn succeeds.
async fn send_message(
    runtime: &Runtime,
    session: &mut ChatSession,
    state_path: &Path,
    user_message: &str,
) -> anyhow::Result<()> {
    let outcome = runtime
        .engine
        .chat_turn(user_message, &session.state, &session.history)
        .await?;

    state_file::save(state_path, &outcome.state)?;

    println!("{}", outcome.message);
    println!();
    print_follow_ups(&outcome.follow_ups);

    session
        .history
        .push(ConversationTurn::user(user_message));
    session
        .history
        .push(ConversationTurn::assistant(outcome.message, outcome.sources.clone()));
    trim_to_window(&mut session.history, runtime.config.retrieval.history_window);
    session.last_sources = outcome.sources;
    session.state = outcome.state;
    Ok(())
}

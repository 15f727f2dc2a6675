//! `archplan ask`: one chat turn from the command line.

use std::path::Path;

use ap_domain::project::ProjectState;
use ap_domain::retrieval::Source;

use crate::bootstrap::Runtime;
use crate::state_file;

/// Send one message, print the reply and write the updated state back.
/// Only the state persists between invocations; there is no history.
pub async fn ask(runtime: &Runtime, message: &str, state_path: &Path, json: bool) -> anyhow::Result<()> {
    let state = state_file::load(state_path)?.unwrap_or_default();

    let outcome = runtime.engine.chat_turn(message, &state, &[]).await?;
    state_file::save(state_path, &outcome.state)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("{}", outcome.message);
    print_sources(&outcome.sources);
    print_follow_ups(&outcome.follow_ups);
    print_open_questions(&outcome.state);
    Ok(())
}

pub(crate) fn print_sources(sources: &[Source]) {
    if sources.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("Sources:");
    for (i, source) in sources.iter().enumerate() {
        eprintln!("  [{}] {} {}", i + 1, source.title, source.url);
    }
}

pub(crate) fn print_follow_ups(follow_ups: &[String]) {
    if follow_ups.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("You could also ask:");
    for q in follow_ups {
        eprintln!("  - {q}");
    }
}

fn print_open_questions(state: &ProjectState) {
    if state.open_questions.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("Open questions:");
    for q in &state.open_questions {
        eprintln!("  - {q}");
    }
}

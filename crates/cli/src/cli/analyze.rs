//! `archplan analyze`: first project state from customer documents.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::bootstrap::Runtime;
use crate::state_file;

pub async fn analyze(runtime: &Runtime, files: &[PathBuf], out: Option<&Path>) -> anyhow::Result<()> {
    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        documents.push(text);
    }

    let state = runtime.engine.analyze(&documents).await?;

    match out {
        Some(path) => {
            state_file::save(path, &state)?;
            eprintln!("Project {} written to {}", state.project_id, path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&state)?),
    }
    Ok(())
}

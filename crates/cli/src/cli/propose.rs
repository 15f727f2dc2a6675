//! `archplan propose`: render the long-form proposal document.

use std::path::Path;

use anyhow::Context;

use ap_domain::config::RetrievalStrategy;
use ap_pipeline::ProgressUpdate;

use crate::bootstrap::Runtime;
use crate::state_file;

pub async fn propose(
    runtime: &Runtime,
    state_path: &Path,
    out: Option<&Path>,
    sequential: bool,
) -> anyhow::Result<()> {
    let state = state_file::load_required(state_path)?;
    let strategy = sequential.then_some(RetrievalStrategy::Sequential);

    let report = |u: ProgressUpdate| {
        if u.total > 1 {
            eprintln!("[{}/{}] {}", u.index, u.total, u.stage);
        } else {
            eprintln!("{}", u.stage);
        }
    };

    let document = runtime
        .engine
        .generate_proposal(&state, strategy, Some(&report))
        .await?;

    match out {
        Some(path) => {
            std::fs::write(path, &document)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Proposal written to {}", path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}

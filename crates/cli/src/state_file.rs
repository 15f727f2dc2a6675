//! JSON files holding a `ProjectState` between commands.

use std::path::Path;

use anyhow::Context;

use ap_domain::project::ProjectState;

/// Read a state file. A missing file yields `None`.
pub fn load(path: &Path) -> anyhow::Result<Option<ProjectState>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let state = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(state))
}

/// Read a state file that must exist.
pub fn load_required(path: &Path) -> anyhow::Result<ProjectState> {
    load(path)?.with_context(|| {
        format!(
            "{} not found (create one with `archplan analyze` or `archplan ask`)",
            path.display()
        )
    })
}

/// Write pretty JSON, creating parent directories.
pub fn save(path: &Path, state: &ProjectState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

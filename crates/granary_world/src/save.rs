use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::CityState;

/// On-disk save: the city plus when it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFile {
    pub saved_at: DateTime<Utc>,
    pub state: CityState,
}

pub fn save_state(path: &Path, state: &CityState) -> Result<()> {
    let save = SaveFile {
        saved_at: Utc::now(),
        state: state.clone(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating save directory: {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating save file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, &save)
        .with_context(|| format!("writing save file: {}", path.display()))?;
    info!(city = %state.id, year = state.year, path = %path.display(), "city saved");
    Ok(())
}

/// Reads a save file. The depot layout is validated while parsing.
pub fn load_state(path: &Path) -> Result<CityState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading save file: {}", path.display()))?;
    let save: SaveFile = serde_json::from_str(&json)
        .with_context(|| format!("parsing save file: {}", path.display()))?;
    info!(
        city = %save.state.id,
        year = save.state.year,
        saved_at = %save.saved_at.to_rfc3339(),
        "city loaded"
    );
    Ok(save.state)
}

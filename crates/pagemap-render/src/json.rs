//! JSON export of layout graphs.

use std::fs;
use std::path::Path;

use pagemap_layout::LayoutGraph;
use tracing::info;

use crate::error::RenderError;

/// Serialize a layout graph as pretty-printed JSON.
pub fn to_json(graph: &LayoutGraph) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(graph)?)
}

/// Write a layout graph as JSON to `path`.
pub fn write_json(graph: &LayoutGraph, path: &Path) -> Result<(), RenderError> {
    let json = to_json(graph)?;
    fs::write(path, json).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Wrote layout JSON");
    Ok(())
}

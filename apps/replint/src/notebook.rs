//! Loaders for notebook documents and kernel query results.
//!
//! Only the parts of nbformat 4 the linter needs are read: cell type,
//! source, execution count, and the collapse flags stored in metadata.

use crate::error::{ReplintError, Result};
use crate::group::CollapsedGroups;
use crate::models::notebook::{CellKind, CellSnapshot, KernelQueryResult, NotebookSnapshot};
use crate::models::Category;
use serde_json::Value as Json;
use std::fs;
use std::path::Path;

/// Cell metadata flag marking the cell's group as collapsed.
pub const CELL_COLLAPSED_KEY: &str = "replint-cellgroup-collapsed";
/// Notebook metadata flag for the title group.
pub const TITLE_COLLAPSED_KEY: &str = "replint-cellgroup-title-collapsed";

/// Notebook metadata key of a collapsed type group, e.g.
/// `replint-cellgroup-hidden-state-collapsed`.
pub fn category_collapsed_key(category: Category) -> String {
    format!(
        "replint-cellgroup-{}-collapsed",
        category.label().to_lowercase().replace(' ', "-")
    )
}

#[derive(Debug, Clone)]
pub struct LoadedNotebook {
    pub snapshot: NotebookSnapshot,
    pub collapsed: CollapsedGroups,
}

/// Read and parse a notebook file. The title is the file name.
pub fn load_notebook(path: &Path) -> Result<LoadedNotebook> {
    let data = fs::read_to_string(path).map_err(|e| ReplintError::io(path, e))?;
    let title = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let doc: Json = serde_json::from_str(&data).map_err(|e| ReplintError::json(path, e))?;
    let loaded = parse_notebook(&title, &doc).map_err(|detail| ReplintError::Notebook {
        path: path.to_path_buf(),
        detail,
    })?;
    tracing::debug!(path = %path.display(), cells = loaded.snapshot.cells.len(), "loaded notebook");
    Ok(loaded)
}

/// Build a snapshot from an already decoded document.
pub fn parse_notebook(title: &str, doc: &Json) -> std::result::Result<LoadedNotebook, String> {
    let root = doc.as_object().ok_or("top level is not an object")?;
    let raw_cells = root
        .get("cells")
        .and_then(Json::as_array)
        .ok_or("missing 'cells' array")?;

    let mut cells = Vec::with_capacity(raw_cells.len());
    let mut collapsed = CollapsedGroups::default();
    for (i, cell) in raw_cells.iter().enumerate() {
        cells.push(parse_cell(cell).map_err(|e| format!("cell {}: {}", i, e))?);
        if flag(cell.get("metadata"), CELL_COLLAPSED_KEY) {
            collapsed.cells.insert(i);
        }
    }

    let meta = root.get("metadata");
    collapsed.title = flag(meta, TITLE_COLLAPSED_KEY);
    for category in Category::ALL {
        if flag(meta, &category_collapsed_key(category)) {
            collapsed.categories.insert(category);
        }
    }

    Ok(LoadedNotebook {
        snapshot: NotebookSnapshot::new(title, cells),
        collapsed,
    })
}

fn parse_cell(cell: &Json) -> std::result::Result<CellSnapshot, String> {
    let kind = match cell.get("cell_type").and_then(Json::as_str) {
        Some("code") => CellKind::Code,
        Some("markdown") => CellKind::Markdown,
        Some("raw") => CellKind::Raw,
        Some(other) => return Err(format!("unknown cell_type '{}'", other)),
        None => return Err("missing cell_type".into()),
    };
    let text = match cell.get("source") {
        None | Some(Json::Null) => String::new(),
        Some(Json::String(s)) => s.clone(),
        Some(Json::Array(parts)) => {
            let mut text = String::new();
            for p in parts {
                text.push_str(p.as_str().ok_or("source lines must be strings")?);
            }
            text
        }
        Some(_) => return Err("source must be a string or a list of strings".into()),
    };
    let execution_count = match (kind, cell.get("execution_count")) {
        (CellKind::Code, Some(Json::Number(n))) => Some(
            n.as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or("execution_count out of range")?,
        ),
        (CellKind::Code, None | Some(Json::Null)) => None,
        (CellKind::Code, Some(_)) => return Err("execution_count must be a number or null".into()),
        _ => None,
    };
    Ok(CellSnapshot {
        kind,
        text,
        execution_count,
    })
}

fn flag(meta: Option<&Json>, key: &str) -> bool {
    meta.and_then(|m| m.get(key)).and_then(Json::as_bool).unwrap_or(false)
}

/// Read a kernel query result written by the kernel-side analyzer.
pub fn load_kernel_result(path: &Path) -> Result<KernelQueryResult> {
    let data = fs::read_to_string(path).map_err(|e| ReplintError::io(path, e))?;
    let result: KernelQueryResult = serde_json::from_str(&data).map_err(|e| ReplintError::json(path, e))?;
    tracing::debug!(
        path = %path.display(),
        executed = result.executed_code.len(),
        "loaded kernel result"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn doc() -> Json {
        json!({
            "nbformat": 4,
            "nbformat_minor": 5,
            "metadata": {
                "replint-cellgroup-invalid-title-collapsed": true,
                "replint-cellgroup-hidden-state-collapsed": false
            },
            "cells": [
                {"cell_type": "markdown", "metadata": {}, "source": ["# Title\n", "intro"]},
                {"cell_type": "code", "metadata": {"replint-cellgroup-collapsed": true},
                 "execution_count": 3, "outputs": [], "source": "x = 1"},
                {"cell_type": "code", "metadata": {}, "execution_count": null, "outputs": [], "source": []},
                {"cell_type": "raw", "metadata": {}, "source": "raw"}
            ]
        })
    }

    #[test]
    fn test_parses_cells_and_sources() {
        let nb = parse_notebook("a.ipynb", &doc()).unwrap();
        let cells = &nb.snapshot.cells;
        assert_eq!(nb.snapshot.title, "a.ipynb");
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0], CellSnapshot::markdown("# Title\nintro"));
        assert_eq!(cells[1], CellSnapshot::code("x = 1", Some(3)));
        assert_eq!(cells[2], CellSnapshot::code("", None));
        assert_eq!(cells[3].kind, CellKind::Raw);
    }

    #[test]
    fn test_reads_collapse_metadata() {
        let nb = parse_notebook("a.ipynb", &doc()).unwrap();
        assert!(nb.collapsed.cells.contains(&1));
        assert_eq!(nb.collapsed.cells.len(), 1);
        assert!(nb.collapsed.categories.contains(&Category::InvalidTitle));
        assert!(!nb.collapsed.categories.contains(&Category::HiddenState));
        assert!(!nb.collapsed.title);
        assert_eq!(
            category_collapsed_key(Category::AbsolutePath),
            "replint-cellgroup-absolute-path-collapsed"
        );
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(parse_notebook("x", &json!([])).is_err());
        assert!(parse_notebook("x", &json!({"metadata": {}})).is_err());
        let bad_kind = json!({"cells": [{"cell_type": "widget", "source": ""}]});
        assert!(parse_notebook("x", &bad_kind).unwrap_err().contains("widget"));
        let bad_source = json!({"cells": [{"cell_type": "code", "source": 4}]});
        assert!(parse_notebook("x", &bad_source).is_err());
    }

    #[test]
    fn test_load_from_disk_uses_file_name_as_title() {
        let td = tempdir().unwrap();
        let path = td.path().join("Untitled.ipynb");
        fs::write(&path, serde_json::to_string(&doc()).unwrap()).unwrap();
        let nb = load_notebook(&path).unwrap();
        assert_eq!(nb.snapshot.title, "Untitled.ipynb");

        let broken = td.path().join("broken.ipynb");
        fs::write(&broken, "{not json").unwrap();
        assert!(matches!(load_notebook(&broken), Err(ReplintError::Json { .. })));
        let shapeless = td.path().join("shapeless.ipynb");
        fs::write(&shapeless, "{}").unwrap();
        assert!(matches!(load_notebook(&shapeless), Err(ReplintError::Notebook { .. })));
        assert!(matches!(
            load_notebook(&td.path().join("missing.ipynb")),
            Err(ReplintError::Io { .. })
        ));
    }

    #[test]
    fn test_loads_kernel_result_file() {
        let td = tempdir().unwrap();
        let path = td.path().join("kernel.json");
        fs::write(&path, r#"{"executed_code": {"1": "x=1"}, "has_imports": [1]}"#).unwrap();
        let kr = load_kernel_result(&path).unwrap();
        assert_eq!(kr.executed_code[&1], "x=1");
        assert!(kr.has_imports.contains(&1));
    }
}

//! Notebook and kernel snapshots consumed by the lint pass.
//!
//! Both are plain values rebuilt by the caller before every pass. The kernel
//! result mirrors the payload produced by the kernel-side analyzer; every
//! field is optional on the wire and defaults to empty.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as Json;
use std::collections::{BTreeMap, BTreeSet};

/// Kernel-assigned execution counter of a code cell.
pub type ExecutionCount = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Cell type as declared by the notebook document.
pub enum CellKind {
    Code,
    Markdown,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One cell of a notebook. `execution_count` is only meaningful for code cells.
pub struct CellSnapshot {
    pub kind: CellKind,
    pub text: String,
    pub execution_count: Option<ExecutionCount>,
}

impl CellSnapshot {
    pub fn code(text: impl Into<String>, execution_count: Option<ExecutionCount>) -> Self {
        Self {
            kind: CellKind::Code,
            text: text.into(),
            execution_count,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Markdown,
            text: text.into(),
            execution_count: None,
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Raw,
            text: text.into(),
            execution_count: None,
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == CellKind::Code
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Execution count of a code cell; always `None` for other kinds.
    pub fn count(&self) -> Option<ExecutionCount> {
        if self.is_code() {
            self.execution_count
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Title plus ordered cells. A cell's position is its diagnostic anchor.
pub struct NotebookSnapshot {
    pub title: String,
    pub cells: Vec<CellSnapshot>,
}

impl NotebookSnapshot {
    pub fn new(title: impl Into<String>, cells: Vec<CellSnapshot>) -> Self {
        Self {
            title: title.into(),
            cells,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Execution-history snapshot supplied by the kernel collaborator.
///
/// Keys are execution counts. Import and name extraction already happened
/// on the kernel side; the linter only reads these maps.
pub struct KernelQueryResult {
    pub executed_code: BTreeMap<ExecutionCount, String>,
    pub cell_dependencies: BTreeMap<ExecutionCount, BTreeMap<String, ExecutionCount>>,
    pub missing_dependencies: BTreeMap<ExecutionCount, Vec<String>>,
    pub absolute_paths: BTreeMap<ExecutionCount, Vec<String>>,
    pub has_imports: BTreeSet<ExecutionCount>,
    #[serde(deserialize_with = "deserialize_requirements")]
    pub missing_requirements: BTreeMap<ExecutionCount, BTreeSet<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModuleSet {
    List(Vec<String>),
    // kernel payload: module -> { status, msg }
    Map(BTreeMap<String, Json>),
}

fn deserialize_requirements<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<ExecutionCount, BTreeSet<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<ExecutionCount, ModuleSet> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(count, set)| {
            let modules = match set {
                ModuleSet::List(v) => v.into_iter().collect(),
                ModuleSet::Map(m) => m.into_keys().collect(),
            };
            (count, modules)
        })
        .collect())
}

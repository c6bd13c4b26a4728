//! Shared data models for lint output, rule identifiers, and snapshots.

pub mod notebook;
pub mod options;

use crate::error::ReplintError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Fixed diagnostic taxonomy. Declaration order is the canonical order used
/// when grouping by type.
pub enum Category {
    InvalidTitle,
    HiddenState,
    ConfuseNotebook,
    Import,
    AbsolutePath,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::InvalidTitle,
        Category::HiddenState,
        Category::ConfuseNotebook,
        Category::Import,
        Category::AbsolutePath,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::InvalidTitle => "invalidtitle",
            Category::HiddenState => "hiddenstate",
            Category::ConfuseNotebook => "confusenotebook",
            Category::Import => "import",
            Category::AbsolutePath => "absolutepath",
        }
    }

    /// Human label used for group headers.
    pub fn label(&self) -> &'static str {
        match self {
            Category::InvalidTitle => "Invalid Title",
            Category::HiddenState => "Hidden State",
            Category::ConfuseNotebook => "Confuse Notebook",
            Category::Import => "Import",
            Category::AbsolutePath => "Absolute Path",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ReplintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .ok_or_else(|| ReplintError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
/// Identifier of one detection rule.
pub enum ReportId {
    C1,
    C2,
    C3,
    C4,
    C5,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    I1,
    I2,
    P1,
    T1,
    T2,
    T3,
    T4,
    T5,
    T6,
    T7,
}

impl ReportId {
    pub const ALL: [ReportId; 21] = [
        ReportId::C1,
        ReportId::C2,
        ReportId::C3,
        ReportId::C4,
        ReportId::C5,
        ReportId::H1,
        ReportId::H2,
        ReportId::H3,
        ReportId::H4,
        ReportId::H5,
        ReportId::H6,
        ReportId::I1,
        ReportId::I2,
        ReportId::P1,
        ReportId::T1,
        ReportId::T2,
        ReportId::T3,
        ReportId::T4,
        ReportId::T5,
        ReportId::T6,
        ReportId::T7,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportId::C1 => "c1",
            ReportId::C2 => "c2",
            ReportId::C3 => "c3",
            ReportId::C4 => "c4",
            ReportId::C5 => "c5",
            ReportId::H1 => "h1",
            ReportId::H2 => "h2",
            ReportId::H3 => "h3",
            ReportId::H4 => "h4",
            ReportId::H5 => "h5",
            ReportId::H6 => "h6",
            ReportId::I1 => "i1",
            ReportId::I2 => "i2",
            ReportId::P1 => "p1",
            ReportId::T1 => "t1",
            ReportId::T2 => "t2",
            ReportId::T3 => "t3",
            ReportId::T4 => "t4",
            ReportId::T5 => "t5",
            ReportId::T6 => "t6",
            ReportId::T7 => "t7",
        }
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportId {
    type Err = ReplintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        ReportId::ALL
            .into_iter()
            .find(|id| id.as_str() == key)
            .ok_or_else(|| ReplintError::UnknownRule(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
/// Remediation capability a rule points at. Hosts decide what it does.
pub enum ActionKind {
    GoToCell,
    RenameNotebook,
    AddModule,
    RestoreCell,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::GoToCell => "Go to cell",
            ActionKind::RenameNotebook => "Rename notebook",
            ActionKind::AddModule => "Add module",
            ActionKind::RestoreCell => "Restore cell",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ActionKind::GoToCell => "Move notebook scroll to cell",
            ActionKind::RenameNotebook => "Open notebook rename dialog",
            ActionKind::AddModule => "Add module to requirements file",
            ActionKind::RestoreCell => "Create deleted cell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
/// An action descriptor bound to the arguments of one diagnostic.
pub enum BoundAction {
    GoToCell {
        index: usize,
    },
    RenameNotebook,
    AddModule {
        index: usize,
        module: String,
    },
    RestoreCell {
        index: usize,
        #[serde(rename = "executionCount")]
        execution_count: u32,
        code: Option<String>,
    },
}

impl BoundAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            BoundAction::GoToCell { .. } => ActionKind::GoToCell,
            BoundAction::RenameNotebook => ActionKind::RenameNotebook,
            BoundAction::AddModule { .. } => ActionKind::AddModule,
            BoundAction::RestoreCell { .. } => ActionKind::RestoreCell,
        }
    }

    /// Hand the bound arguments to a host implementation.
    pub fn dispatch<H: ActionHandler + ?Sized>(&self, handler: &mut H) {
        match self {
            BoundAction::GoToCell { index } => handler.go_to_cell(*index),
            BoundAction::RenameNotebook => handler.rename_notebook(),
            BoundAction::AddModule { index, module } => handler.add_module(*index, module),
            BoundAction::RestoreCell {
                index,
                execution_count,
                code,
            } => handler.restore_cell(*index, *execution_count, code.as_deref()),
        }
    }
}

/// Host-side operations a diagnostic action can be dispatched to.
pub trait ActionHandler {
    fn go_to_cell(&mut self, index: usize);
    fn rename_notebook(&mut self);
    fn add_module(&mut self, index: usize, module: &str);
    fn restore_cell(&mut self, index: usize, execution_count: u32, code: Option<&str>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Diagnostic anchor: the notebook title or a cell position.
pub enum CellRef {
    Title,
    Cell(usize),
}

impl Serialize for CellRef {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            CellRef::Title => s.serialize_str("title"),
            CellRef::Cell(i) => s.serialize_u64(*i as u64),
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRef::Title => f.write_str("title"),
            CellRef::Cell(i) => write!(f, "{}", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A single finding produced by the lint pass.
pub struct Diagnostic {
    pub text: String,
    pub rule_id: ReportId,
    pub category: Category,
    pub cell_id: CellRef,
    pub suggestion: String,
    pub reason: String,
    pub action: BoundAction,
    pub requires_restart: bool,
    /// Instance identity used for individual suppression.
    pub hash: String,
    /// False when the enclosing group is collapsed.
    pub visible: bool,
    pub has_parent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "by", content = "key", rename_all = "lowercase")]
pub enum GroupKey {
    Cell(CellRef),
    Type(Category),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Synthetic header placed before the members of a group.
pub struct GroupHeader {
    pub title: String,
    pub group_key: GroupKey,
    pub collapsed: bool,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// Entry of a result bucket.
pub enum Entry {
    #[serde(rename = "lint")]
    Diagnostic(Diagnostic),
    Group(GroupHeader),
}

impl Entry {
    pub fn as_diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Entry::Diagnostic(d) => Some(d),
            Entry::Group(_) => None,
        }
    }
}

/// Count real diagnostics in a bucket, ignoring group headers.
pub fn count_diagnostics(entries: &[Entry]) -> usize {
    entries.iter().filter_map(Entry::as_diagnostic).count()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Classified diagnostics of one pass. Buckets are mutually exclusive.
pub struct LintingResult {
    pub visible: Vec<Entry>,
    pub filtered_by_category: Vec<Entry>,
    pub filtered_by_rule: Vec<Entry>,
    pub filtered_by_restart: Vec<Entry>,
    pub filtered_individually: Vec<Entry>,
    pub content_hash: String,
}

impl LintingResult {
    pub fn filtered_count(&self) -> usize {
        count_diagnostics(&self.filtered_by_category)
            + count_diagnostics(&self.filtered_by_rule)
            + count_diagnostics(&self.filtered_by_restart)
            + count_diagnostics(&self.filtered_individually)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Lint outcome for one notebook file.
pub struct NotebookReport {
    pub path: String,
    pub title: String,
    #[serde(flatten)]
    pub result: LintingResult,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
/// Aggregated lint summary used by printers.
pub struct Summary {
    pub notebooks: usize,
    pub visible: usize,
    pub filtered_by_category: usize,
    pub filtered_by_rule: usize,
    pub filtered_by_restart: usize,
    pub filtered_individually: usize,
}

impl Summary {
    pub fn from_reports(reports: &[NotebookReport]) -> Self {
        reports.iter().fold(
            Summary {
                notebooks: reports.len(),
                ..Summary::default()
            },
            |mut acc, r| {
                acc.visible += count_diagnostics(&r.result.visible);
                acc.filtered_by_category += count_diagnostics(&r.result.filtered_by_category);
                acc.filtered_by_rule += count_diagnostics(&r.result.filtered_by_rule);
                acc.filtered_by_restart += count_diagnostics(&r.result.filtered_by_restart);
                acc.filtered_individually += count_diagnostics(&r.result.filtered_individually);
                acc
            },
        )
    }
}

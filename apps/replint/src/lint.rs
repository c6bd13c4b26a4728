//! Lint pass over a notebook snapshot and an optional kernel snapshot.
//!
//! `Linter::lint` is pure: it walks the cells once forward, once more in
//! execution-count order, and returns raw diagnostics with the notebook's
//! content hash. `run_pipeline` chains the filter and group stages, and
//! `run_lint` fans the whole thing out over notebook files.

use crate::catalog::Catalog;
use crate::error::{ReplintError, Result};
use crate::filter::filter;
use crate::group::{apply_grouping, CollapseLookup};
use crate::hashing::ContentHasher;
use crate::models::notebook::{CellKind, CellSnapshot, ExecutionCount, KernelQueryResult, NotebookSnapshot};
use crate::models::options::LintOptions;
use crate::models::{BoundAction, CellRef, Diagnostic, LintingResult, NotebookReport, ReportId};
use crate::notebook::{load_kernel_result, load_notebook};
use glob::glob;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const NOTEBOOK_EXTENSION: &str = ".ipynb";
const MAX_TITLE_LEN: usize = 100;
const MIN_TITLE_LEN: usize = 10;

fn title_charset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9_\-. ]*$").expect("static regex"))
}

/// Raw output of one pass, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLint {
    pub diagnostics: Vec<Diagnostic>,
    pub content_hash: String,
}

/// Rule evaluator bound to a catalog.
pub struct Linter<'a> {
    catalog: &'a Catalog,
}

impl<'a> Linter<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Evaluate every rule of the catalog against `notebook`.
    ///
    /// Kernel-dependent rules (h1, h2, h5, h6) only run when `has_kernel` is
    /// set; a missing `kernel` is read as an empty snapshot.
    pub fn lint(
        &self,
        notebook: &NotebookSnapshot,
        kernel: Option<&KernelQueryResult>,
        has_kernel: bool,
    ) -> RawLint {
        let empty = KernelQueryResult::default();
        let kernel = kernel.unwrap_or(&empty);
        let mut out = Vec::new();

        self.check_title(&notebook.title, &mut out);
        let content_hash = self.check_cells(&notebook.title, &notebook.cells, kernel, has_kernel, &mut out);

        tracing::debug!(
            title = %notebook.title,
            cells = notebook.cells.len(),
            has_kernel,
            diagnostics = out.len(),
            "lint pass finished"
        );
        RawLint {
            diagnostics: out,
            content_hash,
        }
    }

    fn push(
        &self,
        out: &mut Vec<Diagnostic>,
        id: ReportId,
        cell: CellRef,
        args: &[(&str, String)],
        action: BoundAction,
        disambiguator: &str,
    ) {
        if let Some(d) = self.catalog.report(id, cell, args, action, disambiguator) {
            tracing::trace!(rule = %id, cell = %cell, "rule fired");
            out.push(d);
        }
    }

    fn check_title(&self, title: &str, out: &mut Vec<Diagnostic>) {
        let title = title.to_lowercase();
        let mut hit = |id: ReportId| {
            self.push(out, id, CellRef::Title, &[], BoundAction::RenameNotebook, "");
        };
        if title.strip_suffix(NOTEBOOK_EXTENSION).unwrap_or(&title).is_empty() {
            hit(ReportId::T1);
        }
        if title.starts_with("untitled") {
            hit(ReportId::T2);
        }
        if title.contains("-copy") {
            hit(ReportId::T3);
        }
        if title.contains(' ') {
            hit(ReportId::T4);
        }
        if !title_charset().is_match(&title) {
            hit(ReportId::T5);
        }
        let len = title.chars().count();
        if len > MAX_TITLE_LEN {
            hit(ReportId::T6);
        }
        if len < MIN_TITLE_LEN {
            hit(ReportId::T7);
        }
    }

    fn check_cells(
        &self,
        title: &str,
        cells: &[CellSnapshot],
        kernel: &KernelQueryResult,
        has_kernel: bool,
        out: &mut Vec<Diagnostic>,
    ) -> String {
        let non_executed_tail = non_executed_tail(cells);
        let empty_tail = empty_tail(cells);

        let mut hasher = ContentHasher::new(title);
        // execution count -> cell index; a repeated count keeps the later cell
        let mut counts: BTreeMap<ExecutionCount, usize> = BTreeMap::new();
        let mut first_code: Option<usize> = None;
        let mut running_max: Option<ExecutionCount> = None;
        let mut blank_runs = 0usize;
        let mut in_blank_run = false;

        for (i, cell) in cells.iter().enumerate() {
            hasher.push_cell(cell);
            let at = CellRef::Cell(i);
            let goto = BoundAction::GoToCell { index: i };
            let idx = ("cell", i.to_string());

            if cell.is_code() {
                first_code.get_or_insert(i);
                match cell.execution_count {
                    Some(n) => {
                        let count = ("count", n.to_string());
                        if has_kernel {
                            match kernel.executed_code.get(&n) {
                                None => self.push(out, ReportId::H1, at, &[idx.clone()], goto.clone(), &count.1),
                                Some(src) if src.trim() != cell.text.trim() => {
                                    self.push(out, ReportId::H2, at, &[idx.clone()], goto.clone(), &count.1)
                                }
                                Some(_) => {}
                            }
                        }
                        if running_max.is_some_and(|max| n < max) {
                            self.push(out, ReportId::C2, at, &[idx.clone(), count.clone()], goto.clone(), &count.1);
                        }
                        if counts.contains_key(&n) {
                            self.push(out, ReportId::H3, at, &[idx.clone(), count.clone()], goto.clone(), &count.1);
                        }
                        counts.insert(n, i);
                        running_max = Some(running_max.map_or(n, |max| max.max(n)));
                    }
                    None => {
                        if i < non_executed_tail && !cell.is_blank() {
                            self.push(out, ReportId::C1, at, &[idx.clone()], goto.clone(), "");
                        }
                    }
                }
            }

            if cell.is_blank() && i < empty_tail {
                if !in_blank_run {
                    blank_runs += 1;
                    in_blank_run = true;
                }
                self.push(out, ReportId::C3, at, &[idx], goto, &blank_runs.to_string());
            } else {
                in_blank_run = false;
            }
        }

        self.check_execution_order(&counts, first_code, kernel, has_kernel, out);

        if let Some(first) = cells.first() {
            if first.kind != CellKind::Markdown {
                self.push(
                    out,
                    ReportId::C4,
                    CellRef::Cell(0),
                    &[("cell", "0".into())],
                    BoundAction::GoToCell { index: 0 },
                    "",
                );
            }
        }
        if empty_tail > 1 {
            let last = empty_tail - 1;
            if cells[last].kind != CellKind::Markdown {
                self.push(
                    out,
                    ReportId::C5,
                    CellRef::Cell(last),
                    &[("cell", last.to_string())],
                    BoundAction::GoToCell { index: last },
                    "",
                );
            }
        }

        hasher.finish()
    }

    /// Rules that follow session order rather than document order.
    fn check_execution_order(
        &self,
        counts: &BTreeMap<ExecutionCount, usize>,
        first_code: Option<usize>,
        kernel: &KernelQueryResult,
        has_kernel: bool,
        out: &mut Vec<Diagnostic>,
    ) {
        let mut previous: Option<ExecutionCount> = None;
        for (&count, &index) in counts {
            let at = CellRef::Cell(index);
            let goto = BoundAction::GoToCell { index };
            let idx = ("cell", index.to_string());

            if kernel.has_imports.contains(&count) && first_code != Some(index) {
                self.push(out, ReportId::I1, at, &[idx.clone()], goto.clone(), "");
            }
            if let Some(paths) = kernel.absolute_paths.get(&count) {
                let joined = paths
                    .iter()
                    .map(|p| format!("'{}'", p))
                    .collect::<Vec<_>>()
                    .join(", ");
                self.push(out, ReportId::P1, at, &[idx.clone(), ("paths", joined.clone())], goto.clone(), &joined);
            }
            if let Some(modules) = kernel.missing_requirements.get(&count) {
                for module in modules {
                    let action = BoundAction::AddModule {
                        index,
                        module: module.clone(),
                    };
                    self.push(out, ReportId::I2, at, &[idx.clone(), ("module", module.clone())], action, module);
                }
            }

            let skipped = match previous {
                None => count != 1,
                Some(p) => p.checked_add(1) != Some(count),
            };
            if skipped {
                self.push(out, ReportId::H4, at, &[idx.clone()], goto.clone(), &count.to_string());
            }
            previous = Some(count);

            if !has_kernel {
                continue;
            }
            if let Some(deps) = kernel.cell_dependencies.get(&count) {
                for (variable, &defined_in) in deps {
                    if counts.contains_key(&defined_in) {
                        continue;
                    }
                    let action = BoundAction::RestoreCell {
                        index,
                        execution_count: defined_in,
                        code: kernel.executed_code.get(&defined_in).cloned(),
                    };
                    let args = [
                        idx.clone(),
                        ("variable", variable.clone()),
                        ("dependency", defined_in.to_string()),
                    ];
                    self.push(out, ReportId::H5, at, &args, action, variable);
                }
            }
            if let Some(missing) = kernel.missing_dependencies.get(&count) {
                if !missing.is_empty() {
                    let names = missing.join(", ");
                    self.push(out, ReportId::H6, at, &[idx.clone(), ("names", names.clone())], goto.clone(), &names);
                }
            }
        }
    }
}

/// Start of the largest suffix whose code cells were never executed.
pub fn non_executed_tail(cells: &[CellSnapshot]) -> usize {
    let mut tail = cells.len();
    for (i, cell) in cells.iter().enumerate().rev() {
        if cell.is_code() {
            if cell.execution_count.is_some() {
                break;
            }
            tail = i;
        }
    }
    tail
}

/// Start of the largest suffix of blank cells.
pub fn empty_tail(cells: &[CellSnapshot]) -> usize {
    cells
        .iter()
        .rposition(|c| !c.is_blank())
        .map_or(0, |i| i + 1)
}

/// Lint, filter, and group one notebook.
pub fn run_pipeline<O, C>(
    catalog: &Catalog,
    notebook: &NotebookSnapshot,
    kernel: Option<&KernelQueryResult>,
    has_kernel: bool,
    options: &O,
    collapse: &C,
) -> LintingResult
where
    O: LintOptions + ?Sized,
    C: CollapseLookup + ?Sized,
{
    let raw = Linter::new(catalog).lint(notebook, kernel, has_kernel);
    let mut result = filter(raw.diagnostics, options);
    result.content_hash = raw.content_hash;
    result.visible = apply_grouping(std::mem::take(&mut result.visible), options.mode(), collapse);
    result
}

/// Expand file paths and glob patterns relative to `root` into notebook files.
pub fn collect_notebooks(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut targets: Vec<PathBuf> = Vec::new();
    for pat in patterns {
        let abs = root.join(pat);
        if abs.is_file() {
            targets.push(abs);
            continue;
        }
        let pattern = abs.to_string_lossy().to_string();
        let entries =
            glob(&pattern).map_err(|e| ReplintError::Config(format!("bad glob pattern '{}': {}", pat, e)))?;
        targets.extend(
            entries
                .flatten()
                .filter(|p| p.is_file() && p.to_string_lossy().ends_with(NOTEBOOK_EXTENSION))
                // skip editor checkpoints
                .filter(|p| !p.components().any(|c| c.as_os_str() == ".ipynb_checkpoints")),
        );
    }
    targets.sort();
    targets.dedup();
    Ok(targets)
}

/// Lint every notebook matched by `patterns`.
///
/// A kernel snapshot only makes sense for a single notebook; passing one
/// with several targets is rejected. Reports are ordered by path.
pub fn run_lint<O>(
    catalog: &Catalog,
    root: &Path,
    patterns: &[String],
    kernel_path: Option<&Path>,
    options: &O,
) -> (Vec<NotebookReport>, Vec<ReplintError>)
where
    O: LintOptions + Sync + ?Sized,
{
    let targets = match collect_notebooks(root, patterns) {
        Ok(t) => t,
        Err(e) => return (Vec::new(), vec![e]),
    };
    let kernel = match kernel_path {
        Some(_) if targets.len() > 1 => {
            return (
                Vec::new(),
                vec![ReplintError::Config(format!(
                    "--kernel applies to one notebook, but {} matched",
                    targets.len()
                ))],
            );
        }
        Some(p) => match load_kernel_result(p) {
            Ok(k) => Some(k),
            Err(e) => return (Vec::new(), vec![e]),
        },
        None => None,
    };

    let outcomes: Vec<Result<NotebookReport>> = targets
        .par_iter()
        .map(|path| {
            let loaded = load_notebook(path)?;
            let result = run_pipeline(
                catalog,
                &loaded.snapshot,
                kernel.as_ref(),
                kernel.is_some(),
                options,
                &loaded.collapsed,
            );
            let display = pathdiff::diff_paths(path, root).unwrap_or_else(|| path.clone());
            Ok(NotebookReport {
                path: display.to_string_lossy().to_string(),
                title: loaded.snapshot.title,
                result,
            })
        })
        .collect();

    let mut reports = Vec::new();
    let mut errors = Vec::new();
    for o in outcomes {
        match o {
            Ok(r) => reports.push(r),
            Err(e) => errors.push(e),
        }
    }
    reports.sort_by(|a, b| a.path.cmp(&b.path));
    (reports, errors)
}

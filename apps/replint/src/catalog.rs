//! Report catalog: the closed table of rule definitions.
//!
//! Each rule carries its category, a label template with `{name}`
//! placeholders, a suggestion, a reason, the action kind it binds, and
//! whether acting on it needs a kernel restart. The engine receives a
//! `Catalog` value instead of reaching for a global, so tests can run with a
//! reduced table; a rule absent from the table never fires.

use crate::hashing::instance_hash;
use crate::models::{ActionKind, BoundAction, Category, CellRef, Diagnostic, ReportId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One catalog entry.
pub struct Rule {
    pub id: ReportId,
    pub category: Category,
    pub label: &'static str,
    pub suggestion: &'static str,
    pub reason: &'static str,
    pub action: ActionKind,
    pub requires_restart: bool,
}

impl Rule {
    /// Render the label template with named arguments.
    pub fn render(&self, args: &[(&str, String)]) -> String {
        render_template(self.label, args)
    }
}

const RERUN: &str = "Please consider re-running the notebook to guarantee the reproducibility.";
const REEXECUTE: &str = "Please consider re-executing it to guarantee the reproducibility.";
const RENAME: &str = "Please consider renaming it to a meaningful name.";
const PORTABLE: &str = "Please consider replacing them to support all OS.";

const BUILTIN_RULES: &[Rule] = &[
    Rule {
        id: ReportId::C1,
        category: Category::ConfuseNotebook,
        label: "Cell {cell} is a non-executed cell among executed ones",
        suggestion: "Please consider cleaning it to guarantee the reproducibility.",
        reason: "A cell that was never run between executed cells leaves readers unsure whether its code matters for the results.",
        action: ActionKind::GoToCell,
        requires_restart: false,
    },
    Rule {
        id: ReportId::C2,
        category: Category::ConfuseNotebook,
        label: "Cell {cell} has the execution count {count} in the wrong order",
        suggestion: RERUN,
        reason: "Cells executed out of document order may depend on state that a top-down re-execution does not reproduce.",
        action: ActionKind::GoToCell,
        requires_restart: true,
    },
    Rule {
        id: ReportId::C3,
        category: Category::ConfuseNotebook,
        label: "Cell {cell} is empty in the middle of the notebook",
        suggestion: "Please consider removing it to improve the readability.",
        reason: "Empty cells between content break the narrative of the notebook.",
        action: ActionKind::GoToCell,
        requires_restart: false,
    },
    Rule {
        id: ReportId::C4,
        category: Category::ConfuseNotebook,
        label: "The first cell of the notebook is not a markdown cell",
        suggestion: "Please consider adding a markdown cell to describe the notebook.",
        reason: "An introductory markdown cell tells readers what the notebook does before any code runs.",
        action: ActionKind::GoToCell,
        requires_restart: false,
    },
    Rule {
        id: ReportId::C5,
        category: Category::ConfuseNotebook,
        label: "The last cell of the notebook is not a markdown cell",
        suggestion: "Please consider adding a markdown cell to conclude the notebook.",
        reason: "A concluding markdown cell summarizes the results the notebook produced.",
        action: ActionKind::GoToCell,
        requires_restart: false,
    },
    Rule {
        id: ReportId::H1,
        category: Category::HiddenState,
        label: "Cell {cell} has execution results, but it wasn't executed on this session",
        suggestion: REEXECUTE,
        reason: "Outputs from a previous session may not match what the current kernel state would produce.",
        action: ActionKind::GoToCell,
        requires_restart: false,
    },
    Rule {
        id: ReportId::H2,
        category: Category::HiddenState,
        label: "Cell {cell} has changed since its execution, but it wasn't executed after the changes",
        suggestion: REEXECUTE,
        reason: "The visible source no longer matches the code that produced the outputs and the kernel state.",
        action: ActionKind::GoToCell,
        requires_restart: false,
    },
    Rule {
        id: ReportId::H3,
        category: Category::HiddenState,
        label: "Cell {cell} repeats the execution count {count}",
        suggestion: RERUN,
        reason: "Repeated execution counts mean outputs come from different kernel sessions.",
        action: ActionKind::GoToCell,
        requires_restart: true,
    },
    Rule {
        id: ReportId::H4,
        category: Category::HiddenState,
        label: "Cell {cell} skips the execution count",
        suggestion: RERUN,
        reason: "A gap in execution counts means some executed code is no longer part of the notebook.",
        action: ActionKind::GoToCell,
        requires_restart: true,
    },
    Rule {
        id: ReportId::H5,
        category: Category::HiddenState,
        label: "Cell {cell} uses name '{variable}' that was defined on In[{dependency}], but it does not exist anymore",
        suggestion: "Please consider restoring the cell and re-running the notebook to guarantee the reproducibility.",
        reason: "The cell relies on a definition whose source was removed, so a fresh run fails.",
        action: ActionKind::RestoreCell,
        requires_restart: true,
    },
    Rule {
        id: ReportId::H6,
        category: Category::HiddenState,
        label: "Cell {cell} has the following undefined names: {names}",
        suggestion: "Please consider defining them to guarantee the reproducibility.",
        reason: "Names that are never defined in the notebook only resolve through leftover kernel state.",
        action: ActionKind::GoToCell,
        requires_restart: false,
    },
    Rule {
        id: ReportId::I1,
        category: Category::Import,
        label: "Cell {cell} has imports but it is not the first cell",
        suggestion: "Please consider moving the import to the first cell of the notebook.",
        reason: "Imports spread across the notebook hide its dependencies from readers.",
        action: ActionKind::GoToCell,
        requires_restart: false,
    },
    Rule {
        id: ReportId::I2,
        category: Category::Import,
        label: "Module {module} was imported by Cell {cell}, but it is not in the requirements file",
        suggestion: "Please consider adding them to guarantee the reproducibility.",
        reason: "Undeclared dependencies make the environment impossible to rebuild.",
        action: ActionKind::AddModule,
        requires_restart: false,
    },
    Rule {
        id: ReportId::P1,
        category: Category::AbsolutePath,
        label: "Cell {cell} has the following absolute paths: {paths}",
        suggestion: "Please consider using relative paths to guarantee the reproducibility.",
        reason: "Absolute paths point at one machine's filesystem and break elsewhere.",
        action: ActionKind::GoToCell,
        requires_restart: false,
    },
    Rule {
        id: ReportId::T1,
        category: Category::InvalidTitle,
        label: "Title is empty",
        suggestion: RENAME,
        reason: "A notebook without a name cannot be told apart from others.",
        action: ActionKind::RenameNotebook,
        requires_restart: false,
    },
    Rule {
        id: ReportId::T2,
        category: Category::InvalidTitle,
        label: "Title starts with \"Untitled\"",
        suggestion: RENAME,
        reason: "Default names say nothing about the notebook's purpose.",
        action: ActionKind::RenameNotebook,
        requires_restart: false,
    },
    Rule {
        id: ReportId::T3,
        category: Category::InvalidTitle,
        label: "Title has \"-Copy\"",
        suggestion: RENAME,
        reason: "Copies with default names make it unclear which notebook is authoritative.",
        action: ActionKind::RenameNotebook,
        requires_restart: false,
    },
    Rule {
        id: ReportId::T4,
        category: Category::InvalidTitle,
        label: "Title has blank spaces",
        suggestion: PORTABLE,
        reason: "Spaces in file names need quoting in shells and scripts.",
        action: ActionKind::RenameNotebook,
        requires_restart: false,
    },
    Rule {
        id: ReportId::T5,
        category: Category::InvalidTitle,
        label: "Title has special characters",
        suggestion: PORTABLE,
        reason: "Special characters are not valid in file names on every operating system.",
        action: ActionKind::RenameNotebook,
        requires_restart: false,
    },
    Rule {
        id: ReportId::T6,
        category: Category::InvalidTitle,
        label: "Title is too big",
        suggestion: "Please consider renaming it a smaller name and using a markdown cell for the full name.",
        reason: "Long file names hit path length limits.",
        action: ActionKind::RenameNotebook,
        requires_restart: false,
    },
    Rule {
        id: ReportId::T7,
        category: Category::InvalidTitle,
        label: "Title is too small",
        suggestion: "Please consider renaming it a meaningful name.",
        reason: "Very short names rarely describe what the notebook does.",
        action: ActionKind::RenameNotebook,
        requires_restart: false,
    },
];

#[derive(Debug, Clone)]
/// Immutable rule table handed to the linter.
pub struct Catalog {
    rules: Vec<Rule>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The full built-in table, in declaration order.
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES.to_vec(),
        }
    }

    /// A table restricted to the given rules. Later duplicates are dropped.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut out: Vec<Rule> = Vec::new();
        for r in rules {
            if !out.iter().any(|o| o.id == r.id) {
                out.push(r);
            }
        }
        Self { rules: out }
    }

    /// A built-in table restricted to `ids`.
    pub fn only(ids: &[ReportId]) -> Self {
        Self::from_rules(BUILTIN_RULES.iter().copied().filter(|r| ids.contains(&r.id)))
    }

    pub fn lookup(&self, id: ReportId) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rule ids in declaration order. The iterator is cheap to clone and restart.
    pub fn all_ids(&self) -> impl Iterator<Item = ReportId> + Clone + '_ {
        self.rules.iter().map(|r| r.id)
    }

    /// Build a diagnostic for `id`, or `None` when the rule is not in this table.
    pub fn report(
        &self,
        id: ReportId,
        cell: CellRef,
        args: &[(&str, String)],
        action: BoundAction,
        disambiguator: &str,
    ) -> Option<Diagnostic> {
        let rule = self.lookup(id)?;
        debug_assert_eq!(rule.action, action.kind(), "action bound to the wrong rule");
        Some(Diagnostic {
            text: rule.render(args),
            rule_id: rule.id,
            category: rule.category,
            cell_id: cell,
            suggestion: rule.suggestion.to_string(),
            reason: rule.reason.to_string(),
            action,
            requires_restart: rule.requires_restart,
            hash: instance_hash(rule.id, cell, disambiguator),
            visible: true,
            has_parent: false,
        })
    }
}

/// Replace `{name}` placeholders. Unknown placeholders are kept verbatim.
pub fn render_template(template: &str, args: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match args.iter().find(|(k, _)| *k == name) {
                    Some((_, v)) => out.push_str(v),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

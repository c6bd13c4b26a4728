//! Output rendering for the lint, rules, and options commands.
//!
//! Supports `human` (default) and `json` outputs. The JSON form carries every
//! bucket of every notebook and a top-level summary; the human form shows the
//! lints selected by [`DisplayFlags`] and warns about the rest.

use crate::catalog::Catalog;
use crate::error::ReplintError;
use crate::group::{apply_grouping, NoCollapse};
use crate::models::options::{OptionsSnapshot, ViewMode};
use crate::models::{ActionHandler, Category, Diagnostic, Entry, LintingResult, NotebookReport, ReportId, Summary};
use crate::utils::{plural, use_colors, warn_prefix};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Which buckets the human printer shows.
pub struct DisplayFlags {
    pub show_filtered_type: bool,
    pub show_filtered_rule: bool,
    pub show_filtered_restart: bool,
    pub show_filtered_individual: bool,
    pub hide_visible: bool,
    pub hide_warning: bool,
    pub hide_explanation: bool,
}

impl DisplayFlags {
    /// Long flags that reproduce the current bucket selection.
    fn active_flags(&self) -> Vec<&'static str> {
        [
            (self.show_filtered_type, "--show-filtered-type"),
            (self.show_filtered_rule, "--show-filtered-rule"),
            (self.show_filtered_restart, "--show-filtered-restart"),
            (self.show_filtered_individual, "--show-filtered-individual"),
            (self.hide_visible, "--hide-visible"),
        ]
        .into_iter()
        .filter_map(|(on, flag)| on.then_some(flag))
        .collect()
    }
}

/// Lints picked for display, plus how many were left out.
#[derive(Debug, Default)]
pub struct Selection<'a> {
    pub shown: Vec<&'a Diagnostic>,
    pub hidden: usize,
}

/// Split a result into shown and hidden lints. Group headers are skipped.
pub fn select_lints<'a>(result: &'a LintingResult, flags: &DisplayFlags) -> Selection<'a> {
    let mut sel = Selection::default();
    let buckets = [
        (&result.visible, !flags.hide_visible),
        (&result.filtered_by_rule, flags.show_filtered_rule),
        (&result.filtered_individually, flags.show_filtered_individual),
        (&result.filtered_by_restart, flags.show_filtered_restart),
        (&result.filtered_by_category, flags.show_filtered_type),
    ];
    for (bucket, show) in buckets {
        let diags = bucket.iter().filter_map(Entry::as_diagnostic);
        if show {
            sel.shown.extend(diags);
        } else {
            sel.hidden += diags.count();
        }
    }
    sel
}

/// Total of shown lints across reports; drives the exit code.
pub fn shown_count(reports: &[NotebookReport], flags: &DisplayFlags) -> usize {
    reports
        .iter()
        .map(|r| select_lints(&r.result, flags).shown.len())
        .sum()
}

/// Renders a bound action as a one-line hint for terminal users.
pub struct HintRenderer<'a> {
    requirements: &'a str,
    pub hint: String,
}

impl<'a> HintRenderer<'a> {
    pub fn new(requirements: &'a str) -> Self {
        Self {
            requirements,
            hint: String::new(),
        }
    }

    pub fn render(requirements: &str, d: &Diagnostic) -> String {
        let mut r = HintRenderer::new(requirements);
        d.action.dispatch(&mut r);
        r.hint
    }
}

impl ActionHandler for HintRenderer<'_> {
    fn go_to_cell(&mut self, index: usize) {
        self.hint = format!("go to cell {}", index);
    }

    fn rename_notebook(&mut self) {
        self.hint = "rename the notebook".to_string();
    }

    fn add_module(&mut self, _index: usize, module: &str) {
        self.hint = format!("add '{}' to {}", module, self.requirements);
    }

    fn restore_cell(&mut self, index: usize, execution_count: u32, code: Option<&str>) {
        self.hint = match code {
            Some(code) => format!(
                "restore In[{}] above cell {}:\n{}",
                execution_count,
                index,
                code.lines()
                    .map(|l| format!("          | {}", l))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
            None => format!("restore In[{}] above cell {}", execution_count, index),
        };
    }
}

fn print_json(val: &JsonVal) {
    match serde_json::to_string_pretty(val) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} {}", crate::utils::error_prefix(), e),
    }
}

fn paint(color: bool, s: &str, f: fn(&str) -> String) -> String {
    if color {
        f(s)
    } else {
        s.to_string()
    }
}

/// Print lint results in the requested format.
pub fn print_lint(
    reports: &[NotebookReport],
    errors: &[ReplintError],
    output: &str,
    mode: ViewMode,
    flags: &DisplayFlags,
    requirements: &str,
) {
    if output == "json" {
        print_json(&compose_lint_json(reports, errors));
        return;
    }
    let color = use_colors(output);
    for e in errors {
        eprintln!("{} {}", crate::utils::error_prefix(), e);
    }

    let mut total_shown = 0;
    let mut total_hidden = 0;
    for report in reports {
        let sel = select_lints(&report.result, flags);
        total_shown += sel.shown.len();
        total_hidden += sel.hidden;
        if sel.shown.is_empty() {
            println!(
                "{} {}",
                paint(color, "✔", |s| s.green().to_string()),
                report.path
            );
            continue;
        }
        println!(
            "{} {} {}",
            paint(color, "▲", |s| s.yellow().to_string()),
            paint(color, &report.path, |s| s.bold().to_string()),
            format!("({})", plural(sel.shown.len(), "lint"))
        );
        let entries: Vec<Entry> = sel
            .shown
            .iter()
            .map(|d| Entry::Diagnostic((*d).clone()))
            .collect();
        let indent = if mode == ViewMode::List { "  " } else { "    " };
        for entry in apply_grouping(entries, mode, &NoCollapse) {
            match entry {
                Entry::Group(g) => {
                    println!("  {}", paint(color, &g.title, |s| s.cyan().bold().to_string()));
                }
                Entry::Diagnostic(d) => {
                    print_diagnostic(&d, indent, color, flags.hide_explanation, requirements)
                }
            }
        }
    }

    let summary = Summary::from_reports(reports);
    let line = format!(
        "— Summary — notebooks={} shown={} visible={} filtered={} errors={}",
        summary.notebooks,
        total_shown,
        summary.visible,
        summary.filtered_by_category
            + summary.filtered_by_rule
            + summary.filtered_by_restart
            + summary.filtered_individually,
        errors.len()
    );
    println!("{}", paint(color, &line, |s| s.bold().to_string()));

    if total_hidden > 0 && !flags.hide_warning {
        eprintln!("{} found {} hidden by filters", warn_prefix(), plural(total_hidden, "lint"));
        eprintln!(
            "  run `replint lint --show-filtered-type --show-filtered-rule --show-filtered-restart --show-filtered-individual` to show them"
        );
        let mut current = flags.active_flags();
        current.push("--hide-warning");
        eprintln!("  or `replint lint {}` to hide this warning", current.join(" "));
    }
}

fn print_diagnostic(d: &Diagnostic, indent: &str, color: bool, hide_explanation: bool, requirements: &str) {
    let id = paint(color, d.rule_id.as_str(), |s| s.yellow().bold().to_string());
    let restart = if d.requires_restart { " [restart]" } else { "" };
    println!("{}{} - {}{}", indent, id, d.text, restart);
    if hide_explanation {
        return;
    }
    let dim = |s: &str| paint(color, s, |s| s.bright_black().to_string());
    println!("{}  {} {}", indent, dim("reason:"), d.reason);
    println!("{}  {} {}", indent, dim("suggestion:"), d.suggestion);
    println!(
        "{}  {} {}",
        indent,
        dim("action:"),
        HintRenderer::render(requirements, d)
    );
    println!("{}  {} {}", indent, dim("hash:"), d.hash);
}

/// Compose lint JSON object (pure) for testing/snapshot purposes.
pub fn compose_lint_json(reports: &[NotebookReport], errors: &[ReplintError]) -> JsonVal {
    let errors: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    json!({
        "notebooks": reports,
        "errors": errors,
        "summary": Summary::from_reports(reports),
    })
}

/// Print the rule catalog.
pub fn print_rules(catalog: &Catalog, output: &str) {
    if output == "json" {
        print_json(&compose_rules_json(catalog));
        return;
    }
    let color = use_colors(output);
    for category in Category::ALL {
        let rules: Vec<_> = catalog.rules().iter().filter(|r| r.category == category).collect();
        if rules.is_empty() {
            continue;
        }
        println!(
            "{} ({})",
            paint(color, category.label(), |s| s.cyan().bold().to_string()),
            category.as_str()
        );
        for r in rules {
            let restart = if r.requires_restart { " [restart]" } else { "" };
            println!(
                "  {} - {}{}",
                paint(color, r.id.as_str(), |s| s.yellow().bold().to_string()),
                r.label,
                restart
            );
        }
    }
}

/// Compose rules JSON array (pure).
pub fn compose_rules_json(catalog: &Catalog) -> JsonVal {
    let rules: Vec<JsonVal> = catalog
        .rules()
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "category": r.category,
                "label": r.label,
                "suggestion": r.suggestion,
                "reason": r.reason,
                "action": r.action,
                "requiresRestart": r.requires_restart,
            })
        })
        .collect();
    JsonVal::Array(rules)
}

/// Print the effective options and where they are stored.
pub fn print_options(options: &OptionsSnapshot, source: &str, output: &str) {
    if output == "json" {
        print_json(&compose_options_json(options, source));
        return;
    }
    let color = use_colors(output);
    let on_off = |b: bool| if b { "on" } else { "off" };
    println!("{} {}", paint(color, "options:", |s| s.bold().to_string()), source);
    println!("  mode: {}", options.mode);
    println!("  view on cells: {}", on_off(options.view_on_cells));
    println!("  restart lints: {}", on_off(options.require_restart_visible));
    println!("  requirements: {}", options.requirements_file_path);
    let disabled_types: Vec<&str> = Category::ALL
        .iter()
        .filter(|c| !options.category_enabled.get(c).copied().unwrap_or(true))
        .map(|c| c.as_str())
        .collect();
    let disabled_rules: Vec<&str> = ReportId::ALL
        .iter()
        .filter(|id| !options.rule_enabled.get(id).copied().unwrap_or(true))
        .map(|id| id.as_str())
        .collect();
    println!("  disabled types: {}", list_or_none(&disabled_types));
    println!("  disabled reports: {}", list_or_none(&disabled_rules));
    println!(
        "  individually filtered: {}",
        options.individually_filtered_hashes.len()
    );
}

fn list_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Compose options JSON object (pure).
pub fn compose_options_json(options: &OptionsSnapshot, source: &str) -> JsonVal {
    json!({"source": source, "options": options})
}

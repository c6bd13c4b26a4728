//! Filter stage: sort raw diagnostics into result buckets.
//!
//! Checks run in a fixed priority order and a diagnostic lands in the first
//! bucket that matches: disabled category, disabled rule, restart-only,
//! individually suppressed, otherwise visible.

use crate::models::options::LintOptions;
use crate::models::{Diagnostic, Entry, LintingResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Visible,
    ByCategory,
    ByRule,
    ByRestart,
    Individually,
}

/// Decide the bucket of one diagnostic.
pub fn classify<O: LintOptions + ?Sized>(d: &Diagnostic, options: &O) -> Bucket {
    if !options.category_enabled(d.category) {
        Bucket::ByCategory
    } else if !options.rule_enabled(d.rule_id) {
        Bucket::ByRule
    } else if d.requires_restart && !options.restart_visible() {
        Bucket::ByRestart
    } else if options.individually_filtered(&d.hash) {
        Bucket::Individually
    } else {
        Bucket::Visible
    }
}

/// Partition `raw` into a `LintingResult`. The content hash is left empty
/// for the caller to fill.
pub fn filter<O: LintOptions + ?Sized>(raw: Vec<Diagnostic>, options: &O) -> LintingResult {
    let mut res = LintingResult::default();
    for d in raw {
        let bucket = match classify(&d, options) {
            Bucket::Visible => &mut res.visible,
            Bucket::ByCategory => &mut res.filtered_by_category,
            Bucket::ByRule => &mut res.filtered_by_rule,
            Bucket::ByRestart => &mut res.filtered_by_restart,
            Bucket::Individually => &mut res.filtered_individually,
        };
        bucket.push(Entry::Diagnostic(d));
    }
    tracing::debug!(
        visible = res.visible.len(),
        filtered = res.filtered_count(),
        "filter stage finished"
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::lint::Linter;
    use crate::models::notebook::{CellSnapshot, NotebookSnapshot};
    use crate::models::options::OptionsSnapshot;
    use crate::models::{count_diagnostics, Category, ReportId};

    fn raw() -> Vec<Diagnostic> {
        let nb = NotebookSnapshot::new(
            "Untitled 1.ipynb",
            vec![
                CellSnapshot::code("a", Some(1)),
                CellSnapshot::code("b", Some(3)),
                CellSnapshot::code("c", Some(2)),
                CellSnapshot::code("", None),
                CellSnapshot::code("d", Some(5)),
            ],
        );
        let cat = Catalog::builtin();
        Linter::new(&cat).lint(&nb, None, false).diagnostics
    }

    fn rules(entries: &[Entry]) -> Vec<ReportId> {
        entries.iter().filter_map(Entry::as_diagnostic).map(|d| d.rule_id).collect()
    }

    fn total(res: &LintingResult) -> usize {
        count_diagnostics(&res.visible) + res.filtered_count()
    }

    #[test]
    fn test_defaults_keep_everything_visible() {
        let input = raw();
        let n = input.len();
        let res = filter(input, &OptionsSnapshot::default());
        assert_eq!(count_diagnostics(&res.visible), n);
        assert_eq!(res.filtered_count(), 0);
    }

    #[test]
    fn test_disabled_category_moves_only_its_rules() {
        let mut opts = OptionsSnapshot::default();
        opts.category_enabled.insert(Category::InvalidTitle, false);
        let baseline = filter(raw(), &OptionsSnapshot::default());
        let res = filter(raw(), &opts);
        assert!(rules(&res.filtered_by_category)
            .iter()
            .all(|id| id.as_str().starts_with('t')));
        assert_eq!(rules(&res.filtered_by_category), vec![ReportId::T2, ReportId::T4]);
        let non_title: Vec<ReportId> = rules(&baseline.visible)
            .into_iter()
            .filter(|id| !id.as_str().starts_with('t'))
            .collect();
        assert_eq!(rules(&res.visible), non_title);
    }

    #[test]
    fn test_priority_order_picks_first_matching_bucket() {
        let mut opts = OptionsSnapshot::default();
        // c2 is both in a disabled category and a disabled rule: category wins
        opts.category_enabled.insert(Category::ConfuseNotebook, false);
        opts.rule_enabled.insert(ReportId::C2, false);
        // h4 requires a restart and is also disabled as a rule: rule wins
        opts.rule_enabled.insert(ReportId::H4, false);
        opts.require_restart_visible = false;
        let res = filter(raw(), &opts);
        assert!(rules(&res.filtered_by_category).contains(&ReportId::C2));
        assert!(rules(&res.filtered_by_rule).contains(&ReportId::H4));
        assert!(!rules(&res.filtered_by_restart).contains(&ReportId::H4));
    }

    #[test]
    fn test_restart_and_individual_filters() {
        let input = raw();
        let t4_hash = input.iter().find(|d| d.rule_id == ReportId::T4).unwrap().hash.clone();
        let mut opts = OptionsSnapshot::default();
        opts.require_restart_visible = false;
        opts.individually_filtered_hashes.insert(t4_hash);
        let res = filter(input, &opts);
        assert_eq!(rules(&res.filtered_individually), vec![ReportId::T4]);
        assert!(rules(&res.filtered_by_restart)
            .iter()
            .all(|id| matches!(id, ReportId::C2 | ReportId::H3 | ReportId::H4 | ReportId::H5)));
        assert!(!rules(&res.filtered_by_restart).is_empty());
    }

    #[test]
    fn test_buckets_are_exhaustive_and_exclusive() {
        let input = raw();
        let n = input.len();
        let mut opts = OptionsSnapshot::default();
        opts.category_enabled.insert(Category::InvalidTitle, false);
        opts.rule_enabled.insert(ReportId::C3, false);
        opts.require_restart_visible = false;
        let res = filter(input, &opts);
        assert_eq!(total(&res), n);
        let mut hashes: Vec<&str> = [
            &res.visible,
            &res.filtered_by_category,
            &res.filtered_by_rule,
            &res.filtered_by_restart,
            &res.filtered_individually,
        ]
        .into_iter()
        .flat_map(|b| b.iter().filter_map(Entry::as_diagnostic).map(|d| d.hash.as_str()))
        .collect();
        hashes.sort();
        hashes.dedup();
        assert_eq!(hashes.len(), n);
    }
}

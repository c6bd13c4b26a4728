//! Options policy consulted by the filter and group stages.
//!
//! The lint pass only reads options through [`LintOptions`]. Loading,
//! toggling, and saving them is the job of `config::OptionsStore`.

use crate::error::ReplintError;
use crate::models::{Category, ReportId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
/// How visible diagnostics are arranged.
pub enum ViewMode {
    List,
    Cell,
    #[default]
    Type,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Cell => "cell",
            ViewMode::Type => "type",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = ReplintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" | "no" => Ok(ViewMode::List),
            "cell" => Ok(ViewMode::Cell),
            "type" => Ok(ViewMode::Type),
            _ => Err(ReplintError::UnknownMode(s.to_string())),
        }
    }
}

/// Read-only policy view used by the filter and group stages.
pub trait LintOptions {
    fn mode(&self) -> ViewMode;
    fn category_enabled(&self, category: Category) -> bool;
    fn rule_enabled(&self, id: ReportId) -> bool;
    /// Whether lints that need a kernel restart stay visible.
    fn restart_visible(&self) -> bool;
    fn individually_filtered(&self, hash: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Materialized options. Absent map entries mean enabled.
pub struct OptionsSnapshot {
    pub mode: ViewMode,
    pub view_on_cells: bool,
    pub require_restart_visible: bool,
    pub requirements_file_path: String,
    pub category_enabled: BTreeMap<Category, bool>,
    pub rule_enabled: BTreeMap<ReportId, bool>,
    pub individually_filtered_hashes: BTreeSet<String>,
}

pub const DEFAULT_REQUIREMENTS: &str = "requirements.txt";

impl Default for OptionsSnapshot {
    fn default() -> Self {
        Self {
            mode: ViewMode::Type,
            view_on_cells: true,
            require_restart_visible: true,
            requirements_file_path: DEFAULT_REQUIREMENTS.to_string(),
            category_enabled: Category::ALL.iter().map(|c| (*c, true)).collect(),
            rule_enabled: ReportId::ALL.iter().map(|id| (*id, true)).collect(),
            individually_filtered_hashes: BTreeSet::new(),
        }
    }
}

impl LintOptions for OptionsSnapshot {
    fn mode(&self) -> ViewMode {
        self.mode
    }

    fn category_enabled(&self, category: Category) -> bool {
        self.category_enabled.get(&category).copied().unwrap_or(true)
    }

    fn rule_enabled(&self, id: ReportId) -> bool {
        self.rule_enabled.get(&id).copied().unwrap_or(true)
    }

    fn restart_visible(&self) -> bool {
        self.require_restart_visible
    }

    fn individually_filtered(&self, hash: &str) -> bool {
        self.individually_filtered_hashes.contains(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let o = OptionsSnapshot::default();
        assert_eq!(o.mode(), ViewMode::Type);
        assert!(o.restart_visible());
        assert!(Category::ALL.iter().all(|c| o.category_enabled(*c)));
        assert!(ReportId::ALL.iter().all(|id| o.rule_enabled(*id)));
        assert!(!o.individually_filtered("abc"));
    }

    #[test]
    fn test_missing_entries_count_as_enabled() {
        let mut o = OptionsSnapshot::default();
        o.rule_enabled.clear();
        o.category_enabled.insert(Category::Import, false);
        assert!(o.rule_enabled(ReportId::T1));
        assert!(!o.category_enabled(Category::Import));
    }

    #[test]
    fn test_mode_parses_cli_spellings() {
        assert_eq!("Cell".parse::<ViewMode>().unwrap(), ViewMode::Cell);
        assert_eq!("no".parse::<ViewMode>().unwrap(), ViewMode::List);
        assert!("tree".parse::<ViewMode>().is_err());
    }
}

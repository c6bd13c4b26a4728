//! Configuration discovery, effective settings resolution, and options
//! persistence.
//!
//! Replint reads `replint.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `patterns`: `["**/*.ipynb"]`
//! - `[options]`: mode `type`, view and restart lints on, requirements file
//!   `requirements.txt`, every category and report enabled, no individual
//!   filters
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{ReplintError, Result};
use crate::models::options::{OptionsSnapshot, ViewMode, DEFAULT_REQUIREMENTS};
use crate::models::{Category, ReportId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_TOML: &str = "replint.toml";
const CONFIG_YAML: [&str; 2] = ["replint.yaml", "replint.yml"];
pub const DEFAULT_PATTERN: &str = "**/*.ipynb";

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// Persisted lint options under `[options]`.
pub struct OptionsCfg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Show lints on cells in hosts that render inline markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<bool>,
    /// Keep lints that need a kernel restart visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub types: BTreeMap<String, bool>, // category -> enabled
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reports: BTreeMap<String, bool>, // report id -> enabled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filtered: Vec<String>, // instance hashes
}

#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// Root configuration loaded from `replint.toml|yaml`.
pub struct ReplintConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionsCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub output: String,
    pub patterns: Vec<String>,
    pub options: OptionsSnapshot,
}

impl Effective {
    /// Resolve a user-supplied file against the repository root, the same way
    /// lint patterns are. Absolute paths are kept as given.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        self.repo_root.join(path)
    }
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `replint.toml|yaml|yml` or a `.git` directory is found.
/// `start` is canonicalized first, since a relative `.` has no parent to
/// climb to.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    let mut cur = start.as_path();
    loop {
        if config_path(cur).is_some() || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start,
        }
    }
}

/// Existing config file under `root`, TOML first.
pub fn config_path(root: &Path) -> Option<PathBuf> {
    std::iter::once(CONFIG_TOML)
        .chain(CONFIG_YAML)
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Load `ReplintConfig` from `replint.toml` or `replint.yaml|yml` if present.
pub fn load_config(root: &Path) -> Result<Option<ReplintConfig>> {
    let Some(path) = config_path(root) else {
        return Ok(None);
    };
    let s = fs::read_to_string(&path).map_err(|e| ReplintError::io(&path, e))?;
    let cfg: ReplintConfig = if is_yaml(&path) {
        serde_yaml::from_str(&s)?
    } else {
        toml::from_str(&s)?
    };
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(Some(cfg))
}

/// Materialize persisted options, rejecting unknown keys and values.
pub fn options_from_cfg(cfg: Option<&OptionsCfg>) -> Result<OptionsSnapshot> {
    let mut snap = OptionsSnapshot::default();
    let Some(cfg) = cfg else {
        return Ok(snap);
    };
    if let Some(mode) = &cfg.mode {
        snap.mode = mode.parse()?;
    }
    if let Some(view) = cfg.view {
        snap.view_on_cells = view;
    }
    if let Some(restart) = cfg.restart {
        snap.require_restart_visible = restart;
    }
    if let Some(req) = &cfg.requirements {
        snap.requirements_file_path = req.clone();
    }
    for (key, enabled) in &cfg.types {
        snap.category_enabled.insert(key.parse::<Category>()?, *enabled);
    }
    for (key, enabled) in &cfg.reports {
        snap.rule_enabled.insert(key.parse::<ReportId>()?, *enabled);
    }
    snap.individually_filtered_hashes
        .extend(cfg.filtered.iter().cloned());
    Ok(snap)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_output: Option<&str>,
    cli_patterns: &[String],
    cli_mode: Option<&str>,
) -> Result<Effective> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let patterns = if !cli_patterns.is_empty() {
        cli_patterns.to_vec()
    } else {
        cfg.patterns
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_PATTERN.to_string()])
    };

    let mut options = options_from_cfg(cfg.options.as_ref())?;
    if let Some(mode) = cli_mode {
        options.mode = mode.parse()?;
    }

    Ok(Effective {
        repo_root,
        config_found,
        output,
        patterns,
        options,
    })
}

/// Read-modify-write handle on the `[options]` table of the config file.
///
/// Writes go back to the file that was loaded; without one a new
/// `replint.toml` is created at the root.
#[derive(Debug, Clone)]
pub struct OptionsStore {
    path: PathBuf,
    config: ReplintConfig,
}

impl OptionsStore {
    pub fn open(root: &Path) -> Result<Self> {
        let path = config_path(root).unwrap_or_else(|| root.join(CONFIG_TOML));
        let config = load_config(root)?.unwrap_or_default();
        Ok(Self { path, config })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn options_mut(&mut self) -> &mut OptionsCfg {
        self.config.options.get_or_insert_with(OptionsCfg::default)
    }

    pub fn load_options(&self) -> Result<OptionsSnapshot> {
        options_from_cfg(self.config.options.as_ref())
    }

    pub fn toggle_category(&mut self, category: Category, enabled: bool) {
        self.options_mut()
            .types
            .insert(category.as_str().to_string(), enabled);
    }

    pub fn toggle_rule(&mut self, id: ReportId, enabled: bool) {
        self.options_mut()
            .reports
            .insert(id.as_str().to_string(), enabled);
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.options_mut().mode = Some(mode.as_str().to_string());
    }

    pub fn set_view(&mut self, on_cells: bool) {
        self.options_mut().view = Some(on_cells);
    }

    pub fn set_restart(&mut self, visible: bool) {
        self.options_mut().restart = Some(visible);
    }

    pub fn set_requirements(&mut self, path: &str) {
        let path = path.trim();
        self.options_mut().requirements = if path.is_empty() || path == DEFAULT_REQUIREMENTS {
            None
        } else {
            Some(path.to_string())
        };
    }

    /// Suppress one diagnostic instance. Returns false if already filtered.
    pub fn add_individual_filter(&mut self, hash: &str) -> bool {
        let filtered = &mut self.options_mut().filtered;
        if filtered.iter().any(|h| h == hash) {
            return false;
        }
        filtered.push(hash.to_string());
        true
    }

    /// Drop every individual suppression. Returns how many were removed.
    pub fn reset_individual_filters(&mut self) -> usize {
        std::mem::take(&mut self.options_mut().filtered).len()
    }

    pub fn save(&self) -> Result<()> {
        let text = if is_yaml(&self.path) {
            serde_yaml::to_string(&self.config)?
        } else {
            toml::to_string_pretty(&self.config)?
        };
        fs::write(&self.path, text).map_err(|e| ReplintError::io(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "saved options");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::options::LintOptions;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("replint.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
patterns = ["notebooks/*.ipynb"]
[options]
mode = "cell"
restart = false
[options.types]
absolutepath = false
[options.reports]
t7 = false
    "#
        )
        .unwrap();

        let nested = root.join("notebooks/deep");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(detect_repo_root(&nested), root.canonicalize().unwrap());

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(root.to_str(), None, &[], None).unwrap();
        assert!(eff.config_found);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.patterns, vec!["notebooks/*.ipynb"]);
        assert_eq!(eff.options.mode(), ViewMode::Cell);
        assert!(!eff.options.restart_visible());
        assert!(!eff.options.category_enabled(Category::AbsolutePath));
        assert!(!eff.options.rule_enabled(ReportId::T7));
        assert!(eff.options.rule_enabled(ReportId::T6));
    }

    #[test]
    fn test_detect_climbs_from_relative_start() {
        let dir = tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("replint.toml"), "output = \"json\"\n").unwrap();
        let nested = root.join("notebooks");
        fs::create_dir(&nested).unwrap();

        // a relative path from the process cwd, like the CLI's default "."
        let cwd = std::env::current_dir().unwrap().canonicalize().unwrap();
        let relative = pathdiff::diff_paths(&nested, &cwd).unwrap();
        assert!(relative.is_relative());
        assert_eq!(detect_repo_root(&relative), root);

        let eff = resolve_effective(relative.to_str(), None, &[], None).unwrap();
        assert!(eff.config_found);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.repo_root, root);

        // options written from the subdirectory land next to the root config
        let store = OptionsStore::open(&detect_repo_root(&relative)).unwrap();
        assert_eq!(store.path(), root.join("replint.toml"));
        assert!(!nested.join("replint.toml").exists());
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("replint.yaml"),
            "output: human\noptions:\n  requirements: env/requirements.txt\n",
        )
        .unwrap();

        let eff = resolve_effective(root.to_str(), None, &[], None).unwrap();
        assert_eq!(eff.output, "human");
        assert_eq!(eff.patterns, vec![DEFAULT_PATTERN]);
        assert_eq!(eff.options.requirements_file_path, "env/requirements.txt");
        assert_eq!(eff.options.mode(), ViewMode::Type);
    }

    #[test]
    fn test_precedence_cli_over_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("replint.toml"),
            "output = \"json\"\npatterns = [\"a/*.ipynb\"]\n[options]\nmode = \"cell\"\n",
        )
        .unwrap();
        let pats = vec!["b.ipynb".to_string()];
        let eff = resolve_effective(root.to_str(), Some("human"), &pats, Some("list")).unwrap();
        assert_eq!(eff.output, "human");
        assert_eq!(eff.patterns, pats);
        assert_eq!(eff.options.mode(), ViewMode::List);

        // kernel files resolve against the root, like the patterns
        let canon = root.canonicalize().unwrap();
        assert_eq!(eff.resolve_path("run/kernel.json"), canon.join("run/kernel.json"));
        let abs = canon.join("elsewhere.json");
        assert_eq!(eff.resolve_path(abs.to_str().unwrap()), abs);
    }

    #[test]
    fn test_no_config_uses_defaults() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(dir.path().to_str(), None, &[], None).unwrap();
        assert!(!eff.config_found);
        assert_eq!(eff.options, OptionsSnapshot::default());
    }

    #[test]
    fn test_unknown_keys_are_errors() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("replint.toml"),
            "[options.reports]\nz9 = false\n",
        )
        .unwrap();
        let err = resolve_effective(dir.path().to_str(), None, &[], None).unwrap_err();
        assert!(matches!(err, ReplintError::UnknownRule(_)));

        let bad = tempdir().unwrap();
        fs::write(bad.path().join("replint.toml"), "output = [").unwrap();
        assert!(matches!(load_config(bad.path()), Err(ReplintError::TomlDe(_))));
    }

    #[test]
    fn test_options_store_round_trip() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut store = OptionsStore::open(root).unwrap();
        assert_eq!(store.path(), root.join("replint.toml"));
        store.toggle_category(Category::Import, false);
        store.toggle_rule(ReportId::H4, false);
        store.set_mode(ViewMode::Cell);
        store.set_view(false);
        store.set_restart(false);
        store.set_requirements("reqs.txt");
        assert!(store.add_individual_filter("abc123"));
        assert!(!store.add_individual_filter("abc123"));
        store.save().unwrap();

        let reopened = OptionsStore::open(root).unwrap();
        let opts = reopened.load_options().unwrap();
        assert!(!opts.category_enabled(Category::Import));
        assert!(!opts.rule_enabled(ReportId::H4));
        assert_eq!(opts.mode(), ViewMode::Cell);
        assert!(!opts.view_on_cells);
        assert!(!opts.restart_visible());
        assert_eq!(opts.requirements_file_path, "reqs.txt");
        assert!(opts.individually_filtered("abc123"));

        let mut store = reopened;
        assert_eq!(store.reset_individual_filters(), 1);
        store.save().unwrap();
        let opts = OptionsStore::open(root).unwrap().load_options().unwrap();
        assert!(opts.individually_filtered_hashes.is_empty());
    }

    #[test]
    fn test_options_store_keeps_yaml_and_other_keys() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("replint.yml"), "output: json\n").unwrap();
        let mut store = OptionsStore::open(root).unwrap();
        store.set_mode(ViewMode::List);
        store.save().unwrap();
        assert!(!root.join("replint.toml").exists());
        let cfg = load_config(root).unwrap().unwrap();
        assert_eq!(cfg.output.as_deref(), Some("json"));
        assert_eq!(cfg.options.and_then(|o| o.mode).as_deref(), Some("list"));
    }
}

//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "replint",
    version,
    about = "Reproducibility linter for Jupyter notebooks",
    long_about = "Replint checks notebooks for problems that break reproducible re-execution: out-of-order runs, stale or changed cells, misplaced imports, vanished definitions, absolute paths, and poor titles.\n\nConfiguration precedence: CLI > replint.toml > defaults.",
    after_help = "Examples:\n  replint lint\n  replint lint analysis.ipynb --kernel kernel.json --mode cell\n  replint options rule t7 off\n  replint options filter 3f2a9c0d1e4b5a67",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current replint version.")]
    Version,
    /// Lint notebooks
    #[command(
        about = "Run lint checks",
        long_about = "Lint notebooks matched by PATHS (files or glob patterns relative to the repository root). Without PATHS the configured patterns are used. Exits 1 when lints are shown.",
        after_help = "Examples:\n  replint lint notebooks/*.ipynb\n  replint lint run.ipynb --kernel kernel.json\n  replint lint --show-filtered-type --show-filtered-rule --output json"
    )]
    Lint {
        #[arg(help = "Notebook files or glob patterns (default: config patterns or **/*.ipynb)")]
        paths: Vec<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Kernel query result JSON, relative to the repository root; enables kernel rules (single notebook only)")]
        kernel: Option<String>,
        #[arg(long, help = "Grouping: list|cell|type (default: config or type)")]
        mode: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(short = 't', long, action = clap::ArgAction::SetTrue, help = "Show lints of disabled categories")]
        show_filtered_type: bool,
        #[arg(short = 'i', long, action = clap::ArgAction::SetTrue, help = "Show lints of disabled reports")]
        show_filtered_rule: bool,
        #[arg(short = 'r', long, action = clap::ArgAction::SetTrue, help = "Show hidden lints that require a restart")]
        show_filtered_restart: bool,
        #[arg(short = 'm', long, action = clap::ArgAction::SetTrue, help = "Show individually filtered lints")]
        show_filtered_individual: bool,
        #[arg(short = 'd', long, action = clap::ArgAction::SetTrue, help = "Do not show visible lints")]
        hide_visible: bool,
        #[arg(short = 'w', long, action = clap::ArgAction::SetTrue, help = "Hide the warning about hidden lints")]
        hide_warning: bool,
        #[arg(short = 'e', long, action = clap::ArgAction::SetTrue, help = "Hide reason, suggestion, and action lines")]
        hide_explanation: bool,
    },
    /// List the rule catalog
    #[command(
        about = "List rules",
        long_about = "Print every report id with its category, label, and whether it requires a kernel restart."
    )]
    Rules {
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Inspect or change persisted options
    Options {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[command(subcommand)]
        cmd: OptionsCmd,
    },
}

#[derive(Subcommand)]
/// Subcommands for `replint options`. Changes are written to the `[options]`
/// table of the config file.
pub enum OptionsCmd {
    #[command(about = "Show effective options")]
    Show {
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    #[command(about = "Enable or disable a category", after_help = "Example:\n  replint options category absolutepath off")]
    Category {
        #[arg(help = "invalidtitle|hiddenstate|confusenotebook|import|absolutepath")]
        name: String,
        #[arg(help = "on|off")]
        state: Switch,
    },
    #[command(about = "Enable or disable a report", after_help = "Example:\n  replint options rule t7 off")]
    Rule {
        #[arg(help = "Report id, e.g. c2 or h5")]
        id: String,
        #[arg(help = "on|off")]
        state: Switch,
    },
    #[command(about = "Set the grouping mode")]
    Mode {
        #[arg(help = "list|cell|type")]
        mode: String,
    },
    #[command(about = "Show or hide lints on cells in hosts that support it")]
    View {
        #[arg(help = "on|off")]
        state: Switch,
    },
    #[command(about = "Show or hide lints that require a kernel restart")]
    Restart {
        #[arg(help = "on|off")]
        state: Switch,
    },
    #[command(about = "Set the requirements file used by add-module hints")]
    Requirements {
        path: String,
    },
    #[command(about = "Suppress one lint by its hash (see `hash:` in lint output)")]
    Filter {
        hash: String,
    },
    #[command(about = "Drop every individual suppression")]
    ResetFilters,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        self == Switch::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_lint_flags() {
        let cli = Cli::try_parse_from(["replint", "lint", "a.ipynb", "-tr", "--mode", "cell"]).unwrap();
        match cli.cmd {
            Commands::Lint {
                paths,
                show_filtered_type,
                show_filtered_restart,
                show_filtered_rule,
                mode,
                ..
            } => {
                assert_eq!(paths, vec!["a.ipynb"]);
                assert!(show_filtered_type && show_filtered_restart && !show_filtered_rule);
                assert_eq!(mode.as_deref(), Some("cell"));
            }
            _ => panic!("expected lint"),
        }
    }

    #[test]
    fn test_parses_options_subcommands() {
        let cli = Cli::try_parse_from(["replint", "options", "rule", "t7", "off"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Commands::Options {
                cmd: OptionsCmd::Rule { state: Switch::Off, .. },
                ..
            }
        ));
        assert!(Cli::try_parse_from(["replint", "options", "reset-filters"]).is_ok());
        assert!(Cli::try_parse_from(["replint", "options", "view", "maybe"]).is_err());
    }
}

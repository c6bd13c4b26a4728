//! Replint CLI binary entry point.
//! Delegates to library modules for lint/rules/options and prints results.

use clap::Parser;
use replint::catalog::Catalog;
use replint::cli::{Cli, Commands, OptionsCmd};
use replint::config::{self, OptionsStore};
use replint::error::{ReplintError, Result};
use replint::lint;
use replint::output::{self, DisplayFlags};
use replint::utils::{error_prefix, info_prefix, note_prefix};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "REPLINT_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(e: ReplintError) -> ! {
    eprintln!("{} {}", error_prefix(), e);
    std::process::exit(2);
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Lint {
            paths,
            repo_root,
            kernel,
            mode,
            output,
            show_filtered_type,
            show_filtered_rule,
            show_filtered_restart,
            show_filtered_individual,
            hide_visible,
            hide_warning,
            hide_explanation,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                output.as_deref(),
                &paths,
                mode.as_deref(),
            )
            .unwrap_or_else(|e| fail(e));
            let quiet = eff.output == "json";
            if !eff.config_found && !quiet {
                eprintln!("{} No replint.toml found; using defaults.", note_prefix());
            }
            let flags = DisplayFlags {
                show_filtered_type,
                show_filtered_rule,
                show_filtered_restart,
                show_filtered_individual,
                hide_visible,
                hide_warning,
                hide_explanation,
            };
            let kernel_path = kernel.as_deref().map(|k| eff.resolve_path(k));
            let catalog = Catalog::builtin();
            let (reports, errors) = lint::run_lint(
                &catalog,
                &eff.repo_root,
                &eff.patterns,
                kernel_path.as_deref(),
                &eff.options,
            );
            if reports.is_empty() && errors.is_empty() && !quiet {
                eprintln!(
                    "{} No notebooks matched: [{}]",
                    info_prefix(),
                    eff.patterns.join(", ")
                );
            }
            output::print_lint(
                &reports,
                &errors,
                &eff.output,
                eff.options.mode,
                &flags,
                &eff.options.requirements_file_path,
            );
            if !errors.is_empty() {
                std::process::exit(2);
            }
            if output::shown_count(&reports, &flags) > 0 {
                std::process::exit(1);
            }
        }
        Commands::Rules { output } => {
            output::print_rules(&Catalog::builtin(), output.as_deref().unwrap_or("human"));
        }
        Commands::Options { repo_root, cmd } => {
            let root = config::detect_repo_root(Path::new(repo_root.as_deref().unwrap_or(".")));
            if let Err(e) = run_options(&root, cmd) {
                fail(e);
            }
        }
    }
}

fn run_options(root: &Path, cmd: OptionsCmd) -> Result<()> {
    let mut store = OptionsStore::open(root)?;
    match cmd {
        OptionsCmd::Show { output } => {
            let opts = store.load_options()?;
            let source = if store.path().exists() {
                store.path().display().to_string()
            } else {
                "defaults".to_string()
            };
            output::print_options(&opts, &source, output.as_deref().unwrap_or("human"));
            return Ok(());
        }
        OptionsCmd::Category { name, state } => store.toggle_category(name.parse()?, state.enabled()),
        OptionsCmd::Rule { id, state } => store.toggle_rule(id.parse()?, state.enabled()),
        OptionsCmd::Mode { mode } => store.set_mode(mode.parse()?),
        OptionsCmd::View { state } => store.set_view(state.enabled()),
        OptionsCmd::Restart { state } => store.set_restart(state.enabled()),
        OptionsCmd::Requirements { path } => store.set_requirements(&path),
        OptionsCmd::Filter { hash } => {
            if !store.add_individual_filter(hash.trim()) {
                eprintln!("{} {} is already filtered", note_prefix(), hash.trim());
                return Ok(());
            }
        }
        OptionsCmd::ResetFilters => {
            let removed = store.reset_individual_filters();
            eprintln!("{} removed {} individual filter(s)", info_prefix(), removed);
        }
    }
    // refuse to persist a table that would not load back
    store.load_options()?;
    store.save()?;
    eprintln!("{} saved {}", info_prefix(), store.path().display());
    Ok(())
}

//! Replint core library.
//!
//! This crate lints Jupyter notebooks for reproducibility problems. The core
//! (`catalog`, `hashing`, `lint`, `filter`, `group`, `models`) is pure: it
//! takes typed snapshots and never touches the filesystem. The remaining
//! modules load notebooks and kernel results, persist options, and render
//! output for the `replint` binary.
//!
//! High-level modules:
//! - `catalog`: The rule table with label templates and bound action kinds.
//! - `hashing`: Content fingerprint and per-diagnostic instance hashes.
//! - `lint`: The rule pass, the lint/filter/group pipeline, and file fan-out.
//! - `filter`: Bucketing of raw diagnostics by options.
//! - `group`: By-cell and by-type grouping with collapse lookup.
//! - `models`: Diagnostics, snapshots, options policy, and result types.
//! - `notebook`: nbformat 4 and kernel result loaders.
//! - `config`: Discovery, effective configuration, and options persistence.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `output`: Human/JSON printers.
//! - `error`: Crate error type.
//! - `utils`: Supporting helpers.
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod group;
pub mod hashing;
pub mod lint;
pub mod models;
pub mod notebook;
pub mod output;
pub mod utils;

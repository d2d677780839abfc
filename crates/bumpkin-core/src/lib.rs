//! Core library for bumpkin.
//!
//! Dependency-aware version bumping for JavaScript monorepos: given the
//! packages released in this run and their new versions, rewrite every
//! released manifest and refuse to proceed if any package left out of the
//! release would end up depending on a version its range excludes.
//!
//! # Modules
//!
//! - [`workspace`] - Workspace discovery from `package.json` globs
//! - [`manifest`] - Order-preserving `package.json` model
//! - [`graph`] - Internal dependency graph
//! - [`release`] - Release sets from plan files or `name@version` pairs
//! - [`range`] - npm range classification and satisfaction
//! - [`rewrite`] - Manifest rewriting for released packages
//! - [`check`] - Consistency checks for packages outside the release
//! - [`bump`] - Plan and execute a bump
//! - [`persist`] - Writing manifests back to disk
//! - [`git`] - Staging and committing the result
//! - [`config`] - Configuration loading and management
//! - [`error`] - Configuration error types
//!
//! # Quick Start
//!
//! ```no_run
//! use bumpkin_core::{bump, graph::DependencyGraph, release, workspace};
//! use camino::Utf8Path;
//!
//! let root = Utf8Path::new(".");
//! let packages = workspace::discover(root).expect("workspace");
//! let graph = DependencyGraph::build(&packages);
//! let releases = release::from_specs(&["@acme/core@2.0.0"]).expect("releases");
//!
//! let plan = bump::plan(&releases, &packages, &graph).expect("consistent release");
//! for update in &plan.updates {
//!     println!("{} -> {}", update.package, update.new_version);
//! }
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod check;

pub mod config;

pub mod error;

pub mod git;

pub mod graph;

pub mod manifest;

pub mod persist;

pub mod range;

pub mod release;

pub mod rewrite;

pub mod workspace;

pub use bump::{BumpError, BumpOptions, BumpOutcome, BumpPlan, BumpResult, BumpWarning};
pub use config::{Config, ConfigLoader, LogLevel};
pub use error::{ConfigError, ConfigResult};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;

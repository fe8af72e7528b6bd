//! # xmake
//!
//! A minimal build orchestrator for native code. Build rules live in
//! `xmake.yml` files spread across a repository; each file declares the
//! targets of its own directory and may depend on targets anywhere else in
//! the tree through `//`-rooted references.
//!
//! ## Quick Example
//!
//! ```
//! use xmake::path::{Prefix, TargetId};
//!
//! let app = Prefix::parse("//apps/bin_packing").unwrap();
//!
//! // Bare names resolve inside the referencing directory...
//! let local = TargetId::canonicalize("agents", &app).unwrap();
//! assert_eq!(local.to_string(), "//apps/bin_packing:agents");
//!
//! // ...and qualified references are kept as written.
//! let shared = TargetId::canonicalize("//xeno:sys", &app).unwrap();
//! assert_eq!(shared.to_string(), "//xeno:sys");
//! ```
//!
//! ## Core Concepts
//!
//! - **Paths (`path`)**: prefixes (`//dir`), target identifiers (`//dir:name`)
//!   and the [`path::Workspace`] that maps them onto the filesystem.
//! - **Rule files (`config`, `loader`)**: the `xmake.yml` schema, its defaults,
//!   and per-directory loading with dependency canonicalization.
//! - **Graph (`graph`)**: lazy, fixpoint discovery of every directory the
//!   build depends on.
//! - **Scheduling (`scheduler`)**: readiness-scan execution with an explicit
//!   progress check.
//! - **Toolchain (`toolchain`)**: compile, archive and link command lines.
//!
//! ## Execution Flow
//!
//! 1.  **Resolve**: find the repository root and the current prefix.
//! 2.  **Discover**: load the current directory's rules, then every directory
//!     they reference, until nothing new is referenced.
//! 3.  **Schedule**: execute ready targets pass by pass until all are done.
//! 4.  **Execute**: compile sources and archive or link each target.

pub mod config;
pub mod defaults;
pub mod error;
pub mod exit_codes;
pub mod graph;
pub mod loader;
pub mod output;
pub mod path;
pub mod scheduler;
pub mod toolchain;

#[cfg(test)]
mod path_proptest;

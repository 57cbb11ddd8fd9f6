//! # sync-replaces
//!
//! This library propagates `replace` directives declared in a Go module's
//! direct dependencies into the module's own `go.mod`. A replace that pins or
//! forks a module only takes effect in the main module, so a dependency that
//! needs one cannot enforce it on its consumers; this tool copies those
//! replaces up, records where each came from, and removes them again once the
//! dependency stops declaring them.
//!
//! ## Quick Example
//!
//! ```
//! use sync_replaces::replace::{deduplicate, Replace};
//!
//! let pin = |version: &str, source: &str| Replace {
//!     old: "github.com/foo/bar".to_string(),
//!     old_version: None,
//!     new: "github.com/fork/bar".to_string(),
//!     new_version: Some(version.to_string()),
//!     source: Some(source.to_string()),
//! };
//!
//! // Two dependencies pin the same module; the lowest version wins
//! let merged = deduplicate(vec![pin("v1.2.0", "example.com/a"), pin("v1.0.0", "example.com/b")]);
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].new_version.as_deref(), Some("v1.0.0"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Path classification (`path`)**: Decides whether a replace target is a
//!   local directory, which is never propagated.
//! - **go.mod parsing (`modfile`)**: Reads replace directives with their line
//!   numbers and trailing comments.
//! - **Replaces (`replace`)**: The replace record, the readers built on the
//!   parser, the lowest-version reconciliation, staleness detection and the
//!   `// from:` annotation.
//! - **Versions (`version`)**: Go module version ordering.
//! - **Toolchain (`go`, `toolchain`)**: The `go` commands the sync relies on,
//!   behind the `GoToolchain` trait.
//! - **Sync (`sync`)**: The end-to-end workflow.

pub mod error;
pub mod go;
pub mod modfile;
pub mod path;
pub mod replace;
pub mod sync;
pub mod toolchain;
pub mod version;

#[cfg(test)]
mod path_proptest;

//! # Error Handling
//!
//! This module defines the centralized error type for `sync-replaces`. It uses
//! the `thiserror` library to describe every failure the sync workflow can
//! run into, with enough context to tell which stage went wrong.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Low-level variants describe a concrete
//!   failure (a `go` command exiting non-zero, a malformed `go.mod`), while the
//!   stage variants (`DependencyList`, `ApplyReplace`, `RemoveReplace`, `Tidy`)
//!   wrap the underlying failure as their `source` so the caller can decide
//!   whether the stage is fatal.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Stage variants keep the underlying error out of their own message and
//! expose it through `std::error::Error::source`, so rendering the chain with
//! `anyhow`'s `{:#}` shows each cause exactly once.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for sync-replaces operations
#[derive(Error, Debug)]
pub enum Error {
    /// The working directory could not be determined.
    #[error("could not resolve working directory")]
    WorkingDir {
        #[source]
        source: std::io::Error,
    },

    /// A `go.mod` file could not be read from disk.
    #[error("could not read {}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `go.mod` file is syntactically invalid.
    #[error("{}:{line}: {message}", path.display())]
    ManifestParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The `go` binary could not be started.
    #[error("failed to run `go {command}`")]
    GoSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A `go` command ran but reported failure.
    #[error("`go {command}` failed: {stderr}")]
    GoCommand { command: String, stderr: String },

    /// The output of `go list -m -json` could not be decoded.
    #[error("malformed module list output")]
    ModuleStream {
        #[source]
        source: serde_json::Error,
    },

    /// Enumerating the module's dependencies failed.
    #[error("listing deps")]
    DependencyList {
        #[source]
        source: Box<Error>,
    },

    /// Adding or updating a replace directive failed.
    #[error("applying replace {old}")]
    ApplyReplace {
        old: String,
        #[source]
        source: Box<Error>,
    },

    /// Dropping a stale replace directive failed.
    #[error("removing stale replace {old}")]
    RemoveReplace {
        old: String,
        #[source]
        source: Box<Error>,
    },

    /// The post-sync `go mod tidy` pass failed.
    #[error("go mod tidy")]
    Tidy {
        #[source]
        source: Box<Error>,
    },

    /// The provenance comment could not be attached to an applied replace.
    #[error("no replace directive for {old} to annotate in {}", path.display())]
    Annotate { old: String, path: PathBuf },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

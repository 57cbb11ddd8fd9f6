//! # Go Toolchain Access
//!
//! The sync workflow needs three things from the Go toolchain: the module
//! list, `go mod edit`, and `go mod tidy`. They sit behind the
//! `GoToolchain` trait so the orchestration can run against a fake in tests
//! without a Go installation or a module cache.
//!
//! `GoCommand` is the real implementation and shells out to the `go` binary
//! through the helpers in `crate::go`.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::go::{self, ModuleInfo};
use crate::replace::Replace;

/// Trait for Go toolchain operations - allows faking in tests
pub trait GoToolchain {
    /// Lists every module in the build graph of the module in `dir`, the main
    /// module included.
    fn list_modules(&self, dir: &Path) -> Result<Vec<ModuleInfo>>;

    /// Adds `replace` to the go.mod in `dir`, or updates the existing replace
    /// for the same old module and version.
    fn edit_replace(&self, dir: &Path, replace: &Replace) -> Result<()>;

    /// Drops the replace for `old` (at `old_version`, if given) from the go.mod
    /// in `dir`.
    fn drop_replace(&self, dir: &Path, old: &str, old_version: Option<&str>) -> Result<()>;

    /// Runs `go mod tidy` in `dir`.
    fn tidy(&self, dir: &Path) -> Result<()>;
}

/// The default implementation of `GoToolchain`, which runs the `go` binary.
#[derive(Debug, Clone)]
pub struct GoCommand {
    program: PathBuf,
}

impl GoCommand {
    /// Creates a `GoCommand` that runs `program` instead of `go` from `PATH`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The binary this toolchain invokes.
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn mod_command(&self, dir: &Path, args: &[&str]) -> Result<()> {
        let mut full = vec!["mod".to_string()];
        full.extend(args.iter().map(|a| a.to_string()));
        go::run_go(&self.program, dir, &full).map(|_| ())
    }
}

impl Default for GoCommand {
    fn default() -> Self {
        Self::new("go")
    }
}

impl GoToolchain for GoCommand {
    fn list_modules(&self, dir: &Path) -> Result<Vec<ModuleInfo>> {
        go::list_modules(&self.program, dir)
    }

    fn edit_replace(&self, dir: &Path, replace: &Replace) -> Result<()> {
        self.mod_command(dir, &["edit", &go::replace_arg(replace)])
    }

    fn drop_replace(&self, dir: &Path, old: &str, old_version: Option<&str>) -> Result<()> {
        self.mod_command(dir, &["edit", &go::dropreplace_arg(old, old_version)])
    }

    fn tidy(&self, dir: &Path) -> Result<()> {
        self.mod_command(dir, &["tidy"])
    }
}

//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fake Go toolchain and a fixture that lays out a main
//! module with its dependencies in a temporary directory.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new()
//!     .with_go_mod("module example.com/test\n")
//!     .with_dependency("example.com/dep", "module example.com/dep\n");
//! let outcome = fixture.sync(&SyncOptions::default()).unwrap();
//! ```

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use sync_replaces::error::{Error, Result};
use sync_replaces::go::ModuleInfo;
use sync_replaces::modfile;
use sync_replaces::replace::Replace;
use sync_replaces::sync::{self, SyncOptions, SyncOutcome};
use sync_replaces::toolchain::GoToolchain;

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;
    pub use sync_replaces::sync::{SyncOptions, SyncOutcome};

    pub use super::{FakeToolchain, TestFixture};
}

/// A `GoToolchain` that edits go.mod the way `go mod edit` would, without Go.
///
/// Every call is recorded, and each operation can be made to fail.
#[derive(Default)]
pub struct FakeToolchain {
    pub modules: Vec<ModuleInfo>,
    pub fail_list: bool,
    /// Fail `edit_replace` for this old module path
    pub fail_edit: Option<String>,
    /// Write this replacement version instead of the requested one, the way
    /// `go mod edit` canonicalizes a shorthand such as `v1.0`
    pub canonical_version: Option<String>,
    pub fail_drop: bool,
    pub fail_tidy: bool,
    pub calls: RefCell<Vec<String>>,
}

#[allow(dead_code)]
impl FakeToolchain {
    pub fn new(modules: Vec<ModuleInfo>) -> Self {
        Self {
            modules,
            ..Self::default()
        }
    }

    /// Recorded calls, e.g. `edit github.com/a => github.com/b v1.0.0`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn failure(command: &str) -> Error {
        Error::GoCommand {
            command: command.to_string(),
            stderr: "simulated failure".to_string(),
        }
    }
}

impl GoToolchain for FakeToolchain {
    fn list_modules(&self, _dir: &Path) -> Result<Vec<ModuleInfo>> {
        self.record("list".to_string());
        if self.fail_list {
            return Err(Self::failure("list -m -json all"));
        }
        Ok(self.modules.clone())
    }

    fn edit_replace(&self, dir: &Path, replace: &Replace) -> Result<()> {
        self.record(format!("edit {}", replace));
        if self.fail_edit.as_deref() == Some(replace.old.as_str()) {
            return Err(Self::failure("mod edit"));
        }

        let mut written = replace.clone();
        if let Some(version) = &self.canonical_version {
            written.new_version = Some(version.clone());
        }
        let replace = &written;

        let path = modfile::manifest_path(dir);
        let content = fs::read_to_string(&path)?;
        let file = modfile::parse(&path, &content)?;
        let existing = file.replaces.iter().find(|d| {
            d.old_path == replace.old && d.old_version == replace.old_version
        });

        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        match existing {
            Some(directive) => {
                let line = &mut lines[directive.line - 1];
                *line = if line.trim_start().starts_with("replace") {
                    format!("replace {}", replace)
                } else {
                    format!("\t{}", replace)
                };
            }
            None => {
                lines.push(String::new());
                lines.push(format!("replace {}", replace));
            }
        }
        fs::write(&path, lines.join("\n") + "\n")?;
        Ok(())
    }

    fn drop_replace(&self, dir: &Path, old: &str, old_version: Option<&str>) -> Result<()> {
        self.record(format!("drop {}", old));
        if self.fail_drop {
            return Err(Self::failure("mod edit"));
        }

        let path = modfile::manifest_path(dir);
        let content = fs::read_to_string(&path)?;
        let file = modfile::parse(&path, &content)?;
        let doomed: Vec<usize> = file
            .replaces
            .iter()
            .filter(|d| d.old_path == old && d.old_version.as_deref() == old_version)
            .map(|d| d.line)
            .collect();

        let kept: Vec<&str> = content
            .lines()
            .enumerate()
            .filter(|(index, _)| !doomed.contains(&(index + 1)))
            .map(|(_, line)| line)
            .collect();
        fs::write(&path, kept.join("\n") + "\n")?;
        Ok(())
    }

    fn tidy(&self, _dir: &Path) -> Result<()> {
        self.record("tidy".to_string());
        if self.fail_tidy {
            return Err(Self::failure("mod tidy"));
        }
        Ok(())
    }
}

/// A main module with dependencies, laid out in a temporary directory.
///
/// The main module lives in `main/`, each dependency in `deps/<n>/`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    modules: Vec<ModuleInfo>,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new fixture whose main module is `example.com/test`.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("main")
            .create_dir_all()
            .expect("Failed to create main module directory");
        let main = ModuleInfo {
            path: "example.com/test".to_string(),
            dir: temp_dir.path().join("main").display().to_string(),
            main: true,
            ..ModuleInfo::default()
        };
        Self {
            temp_dir,
            modules: vec![main],
        }
    }

    /// Write the main module's go.mod.
    pub fn with_go_mod(self, content: &str) -> Self {
        self.temp_dir
            .child("main/go.mod")
            .write_str(content)
            .expect("Failed to write go.mod");
        self
    }

    /// Add a direct dependency whose go.mod has the given content.
    pub fn with_dependency(self, path: &str, go_mod: &str) -> Self {
        self.with_module(path, Some(go_mod), false)
    }

    /// Add a direct dependency that has a directory but no go.mod.
    pub fn with_dependency_without_go_mod(self, path: &str) -> Self {
        self.with_module(path, None, false)
    }

    /// Add an indirect dependency whose go.mod has the given content.
    pub fn with_indirect_dependency(self, path: &str, go_mod: &str) -> Self {
        self.with_module(path, Some(go_mod), true)
    }

    /// Add a direct dependency that is not downloaded (no directory).
    pub fn with_missing_dependency(mut self, path: &str) -> Self {
        self.modules.push(ModuleInfo {
            path: path.to_string(),
            version: "v1.0.0".to_string(),
            ..ModuleInfo::default()
        });
        self
    }

    fn with_module(mut self, path: &str, go_mod: Option<&str>, indirect: bool) -> Self {
        let dir = self.temp_dir.child(format!("deps/{}", self.modules.len()));
        dir.create_dir_all().expect("Failed to create dependency dir");
        if let Some(content) = go_mod {
            dir.child("go.mod")
                .write_str(content)
                .expect("Failed to write dependency go.mod");
        }
        self.modules.push(ModuleInfo {
            path: path.to_string(),
            version: "v1.0.0".to_string(),
            dir: dir.path().display().to_string(),
            main: false,
            indirect,
        });
        self
    }

    /// Directory of the main module.
    pub fn main_dir(&self) -> PathBuf {
        self.temp_dir.path().join("main")
    }

    /// Current content of the main module's go.mod.
    pub fn go_mod(&self) -> String {
        fs::read_to_string(self.main_dir().join("go.mod")).expect("Failed to read go.mod")
    }

    /// A fake toolchain that reports this fixture's modules.
    pub fn toolchain(&self) -> FakeToolchain {
        FakeToolchain::new(self.modules.clone())
    }

    /// Options pointing at the main module.
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            dir: Some(self.main_dir()),
            ..SyncOptions::default()
        }
    }

    /// Run a sync with `toolchain`, returning the outcome and captured output.
    pub fn sync_with(
        &self,
        options: &SyncOptions,
        toolchain: &FakeToolchain,
    ) -> (Result<SyncOutcome>, String) {
        let mut out = Vec::new();
        let result = sync::run(options, toolchain, &mut out);
        (result, String::from_utf8(out).expect("output is UTF-8"))
    }

    /// Run a sync with a fresh fake toolchain.
    pub fn sync(&self, options: &SyncOptions) -> (Result<SyncOutcome>, String) {
        let toolchain = self.toolchain();
        self.sync_with(options, &toolchain)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

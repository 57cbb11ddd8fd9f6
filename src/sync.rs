//! # Replace Synchronization
//!
//! This module drives the end-to-end sync of replace directives from a
//! module's direct dependencies into its own go.mod. `run` executes these
//! steps in order:
//!
//! 1.  **Working directory**: Use the configured directory or the current one.
//! 2.  **Dependencies**: List modules with `go list -m -json all` and keep the
//!     direct requirements. Failure here aborts the run.
//! 3.  **Collection**: Read the non-local replaces from each dependency's
//!     go.mod and tag them with the dependency's path. A dependency whose go.mod
//!     cannot be read is skipped.
//! 4.  **Reconciliation**: Keep the lowest version per replaced module.
//! 5.  **Staleness**: Find replaces previously written by this tool (marked
//!     `// from:`) that no dependency asks for any more. Failure here only
//!     means nothing is treated as stale.
//! 6.  **Short-circuit**: Stop if there is nothing to apply or remove.
//! 7.  **Dry run**: Print the plan and stop.
//! 8.  **Apply**: `go mod edit -replace` each replace, then annotate it with
//!     its source.
//! 9.  **Remove**: `go mod edit -dropreplace` each stale replace.
//! 10. **Tidy**: `go mod tidy`, unless skipped.
//!
//! Edits are not transactional: a failure part-way leaves the go.mod as the
//! completed steps wrote it, and a later run converges it.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::go::ModuleInfo;
use crate::modfile::manifest_path;
use crate::replace::{self, Replace};
use crate::toolchain::GoToolchain;

/// Options controlling a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Module directory to sync; the current directory when `None`.
    pub dir: Option<PathBuf>,
    /// Print the planned changes without editing go.mod.
    pub dry_run: bool,
    /// Print per-dependency progress and recoverable failures.
    pub verbose: bool,
    /// Do not run `go mod tidy` after editing.
    pub skip_tidy: bool,
}

/// What a sync run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No replaces to apply and none to remove.
    UpToDate,
    /// Dry run: the replaces that would be applied and removed.
    Planned {
        apply: Vec<Replace>,
        remove: Vec<Replace>,
    },
    /// The replaces that were applied and removed.
    Synced {
        applied: Vec<Replace>,
        removed: Vec<Replace>,
    },
}

/// Writes progress lines to the output sink, gating secondary ones on
/// verbosity.
struct Reporter<'a> {
    out: &'a mut dyn Write,
    verbose: bool,
}

impl Reporter<'_> {
    fn line(&mut self, message: impl fmt::Display) -> Result<()> {
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    fn detail(&mut self, message: impl fmt::Display) -> Result<()> {
        if self.verbose {
            self.line(message)?;
        }
        Ok(())
    }
}

/// Sync replace directives from the direct dependencies of the module in
/// `options.dir` into its go.mod.
///
/// Output for the user is written to `out`. Fatal failures are returned as
/// errors naming the stage that failed; recoverable ones are reported on `out`
/// when `options.verbose` is set.
pub fn run(
    options: &SyncOptions,
    toolchain: &dyn GoToolchain,
    out: &mut dyn Write,
) -> Result<SyncOutcome> {
    let mut report = Reporter {
        out,
        verbose: options.verbose,
    };

    let dir = resolve_dir(options.dir.as_deref())?;

    let deps = list_direct_deps(toolchain, &dir).map_err(|e| Error::DependencyList {
        source: Box::new(e),
    })?;
    report.detail(format_args!("Found {} direct dependencies", deps.len()))?;

    let collected = collect_replaces(&deps, &mut report)?;
    let replaces = replace::deduplicate(collected);

    let stale = match replace::find_stale(&dir, &replaces) {
        Ok(stale) => stale,
        Err(e) => {
            log::warn!("could not check for stale replaces: {}", e);
            report.detail(format_args!(
                "warning: could not check for stale replaces: {}",
                e
            ))?;
            Vec::new()
        }
    };

    if replaces.is_empty() && stale.is_empty() {
        report.line("No replace directives to sync: nothing to do")?;
        return Ok(SyncOutcome::UpToDate);
    }

    if options.dry_run {
        print_plan(&mut report, &replaces, &stale)?;
        return Ok(SyncOutcome::Planned {
            apply: replaces,
            remove: stale,
        });
    }

    let go_mod = manifest_path(&dir);
    for r in &replaces {
        toolchain
            .edit_replace(&dir, r)
            .map_err(|e| Error::ApplyReplace {
                old: r.old.clone(),
                source: Box::new(e),
            })?;
        if let Err(e) = replace::annotate_source(&go_mod, r) {
            log::warn!("could not add source comment for {}: {}", r.old, e);
            report.detail(format_args!("warning: could not add source comment: {}", e))?;
        }
        report.line(format_args!(
            "Applied: {} // from: {}",
            r,
            r.source_or_empty()
        ))?;
    }

    for r in &stale {
        toolchain
            .drop_replace(&dir, &r.old, r.old_version.as_deref())
            .map_err(|e| Error::RemoveReplace {
                old: r.old.clone(),
                source: Box::new(e),
            })?;
        report.line(format_args!(
            "Removed stale: {} (was from: {})",
            r.old,
            r.source_or_empty()
        ))?;
    }

    if !options.skip_tidy {
        report.detail("Running go mod tidy...")?;
        toolchain.tidy(&dir).map_err(|e| Error::Tidy {
            source: Box::new(e),
        })?;
    }

    Ok(SyncOutcome::Synced {
        applied: replaces,
        removed: stale,
    })
}

fn resolve_dir(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.to_path_buf()),
        _ => std::env::current_dir().map_err(|source| Error::WorkingDir { source }),
    }
}

fn list_direct_deps(toolchain: &dyn GoToolchain, dir: &Path) -> Result<Vec<ModuleInfo>> {
    Ok(toolchain
        .list_modules(dir)?
        .into_iter()
        .filter(ModuleInfo::is_direct)
        .collect())
}

fn collect_replaces(deps: &[ModuleInfo], report: &mut Reporter<'_>) -> Result<Vec<Replace>> {
    let mut all = Vec::new();

    for dep in deps {
        report.detail(format_args!("Processing {}@{}", dep.path, dep.version))?;

        if dep.dir.is_empty() {
            report.detail("  skipping: no local dir")?;
            continue;
        }

        let go_mod = manifest_path(Path::new(&dep.dir));
        let replaces = match replace::read_non_local_replaces(&go_mod) {
            Ok(replaces) => replaces,
            Err(e) => {
                log::debug!("skipping {}: {}", dep.path, e);
                report.detail(format_args!("  skipping: {}", e))?;
                continue;
            }
        };

        report.detail(format_args!(
            "  found {} replace directive(s)",
            replaces.len()
        ))?;
        all.extend(replaces.into_iter().map(|mut r| {
            r.source = Some(dep.path.clone());
            r
        }));
    }

    Ok(all)
}

fn print_plan(report: &mut Reporter<'_>, apply: &[Replace], remove: &[Replace]) -> Result<()> {
    if !apply.is_empty() {
        report.line(format_args!(
            "Would apply {} replace directive(s):",
            apply.len()
        ))?;
        for r in apply {
            report.line(format_args!("  {} // from: {}", r, r.source_or_empty()))?;
        }
    }
    if !remove.is_empty() {
        report.line(format_args!(
            "Would remove {} stale replace directive(s):",
            remove.len()
        ))?;
        for r in remove {
            report.line(format_args!(
                "  {} (was from: {})",
                r.old,
                r.source_or_empty()
            ))?;
        }
    }
    Ok(())
}

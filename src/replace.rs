//! # Replace Directives
//!
//! This module holds the `Replace` record and the policy that reconciles
//! replace directives collected from several dependencies:
//!
//! - **Reading**: `read_non_local_replaces` collects the replaces a dependency
//!   declares that can be propagated (those pointing at another module, not a
//!   local directory). `read_annotated_replaces` recovers the replaces this tool
//!   previously wrote into a module's own go.mod, recognised by their
//!   `// from: <module>` comment.
//!
//! - **Reconciling**: `deduplicate` keeps one replace per
//!   `(old path, old version)` key, choosing the lowest replacement version so
//!   no dependency is pushed onto a newer module than it asked for.
//!
//! - **Staleness**: `find_stale` reports annotated replaces whose module no
//!   dependency replaces any more.
//!
//! - **Annotation**: `annotate_source` attaches the `// from:` comment to a
//!   replace after `go mod edit` has written it.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::modfile::{self, ReplaceDirective};
use crate::version::compare_versions;

/// Marker that introduces the provenance of a replace in its trailing comment.
pub const SOURCE_MARKER: &str = "from:";

static SOURCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"from:\s*(\S+)").expect("source marker pattern is valid"));

/// The annotation as `annotate_source` writes it: `from: <source>` opening the
/// comment or a later `//` segment, and running to the end of the line.
static WRITTEN_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(.*?)\s*//\s*)?from:\s*(\S+)\s*$").expect("annotation pattern is valid")
});

/// A replace directive, optionally attributed to the dependency it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    /// Module path being replaced.
    pub old: String,
    /// Only replace this version of `old`, if set.
    pub old_version: Option<String>,
    /// Replacement module path or local directory.
    pub new: String,
    /// Replacement version; `None` when `new` is a local directory.
    pub new_version: Option<String>,
    /// Module that declared this replace.
    pub source: Option<String>,
}

impl Replace {
    /// Reconciliation key: the old path and the old version (empty if unset).
    pub fn key(&self) -> (&str, &str) {
        (&self.old, self.old_version.as_deref().unwrap_or(""))
    }

    /// Source module, or an empty string if the replace is unattributed.
    pub fn source_or_empty(&self) -> &str {
        self.source.as_deref().unwrap_or("")
    }

    fn matches_directive(&self, directive: &ReplaceDirective) -> bool {
        self.old == directive.old_path
            && self.old_version == directive.old_version
            && self.new == directive.new_path
            && self.new_version == directive.new_version
    }
}

impl From<&ReplaceDirective> for Replace {
    fn from(directive: &ReplaceDirective) -> Self {
        Self {
            old: directive.old_path.clone(),
            old_version: directive.old_version.clone(),
            new: directive.new_path.clone(),
            new_version: directive.new_version.clone(),
            source: None,
        }
    }
}

impl fmt::Display for Replace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.old)?;
        if let Some(old_version) = &self.old_version {
            write!(f, " {}", old_version)?;
        }
        write!(f, " => {}", self.new)?;
        if let Some(new_version) = &self.new_version {
            write!(f, " {}", new_version)?;
        }
        Ok(())
    }
}

/// Extract the source module from a trailing comment.
///
/// The source is the first whitespace-delimited word after the first
/// `from:` marker in the comment.
pub fn source_from_comment(comment: &str) -> Option<&str> {
    SOURCE_PATTERN
        .captures(comment)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Split a trailing comment into the text preceding a written annotation and
/// the annotated source. `None` when the comment does not end in one.
fn split_written_annotation(comment: &str) -> Option<(&str, &str)> {
    let captures = WRITTEN_ANNOTATION.captures(comment)?;
    let before = captures.get(1).map_or("", |m| m.as_str());
    Some((before, captures.get(2)?.as_str()))
}

/// Read the replaces in the go.mod at `path` that point at another module.
///
/// Replaces targeting a local directory are private to the module that
/// declares them and are left out. The result keeps declaration order and has
/// no source set.
pub fn read_non_local_replaces(path: &Path) -> Result<Vec<Replace>> {
    let file = modfile::parse_file(path)?;
    Ok(file
        .replaces
        .iter()
        .filter(|directive| !crate::path::is_local_path(&directive.new_path))
        .map(Replace::from)
        .collect())
}

/// Read the replaces in the go.mod at `path` that carry a `// from:` comment.
///
/// Each returned replace has its source set from the comment. Locality is not
/// considered.
pub fn read_annotated_replaces(path: &Path) -> Result<Vec<Replace>> {
    let file = modfile::parse_file(path)?;
    Ok(file
        .replaces
        .iter()
        .filter_map(|directive| {
            let source = directive.comment.as_deref().and_then(source_from_comment)?;
            let mut replace = Replace::from(directive);
            replace.source = Some(source.to_string());
            Some(replace)
        })
        .collect())
}

/// Keep one replace per `(old, old_version)`, preferring the lowest version.
///
/// On equal versions the replace seen first wins. The result is sorted by key.
pub fn deduplicate(replaces: Vec<Replace>) -> Vec<Replace> {
    let mut by_key: BTreeMap<(String, String), Replace> = BTreeMap::new();

    for replace in replaces {
        let key = (
            replace.old.clone(),
            replace.old_version.clone().unwrap_or_default(),
        );
        match by_key.get_mut(&key) {
            None => {
                by_key.insert(key, replace);
            }
            Some(existing) => {
                let ordering = compare_versions(
                    replace.new_version.as_deref().unwrap_or_default(),
                    existing.new_version.as_deref().unwrap_or_default(),
                );
                if ordering.is_lt() {
                    log::debug!(
                        "replace for {}: {} (from {}) wins over {} (from {})",
                        replace.old,
                        replace,
                        replace.source_or_empty(),
                        existing,
                        existing.source_or_empty()
                    );
                    *existing = replace;
                } else {
                    log::debug!(
                        "replace for {}: keeping {} (from {}), dropping {} (from {})",
                        replace.old,
                        existing,
                        existing.source_or_empty(),
                        replace,
                        replace.source_or_empty()
                    );
                }
            }
        }
    }

    by_key.into_values().collect()
}

/// Find annotated replaces in `dir`'s go.mod that no current replace covers.
///
/// A replace is stale when its old module path does not appear in `current`
/// at all, meaning the dependency that asked for it no longer does.
pub fn find_stale(dir: &Path, current: &[Replace]) -> Result<Vec<Replace>> {
    let existing = read_annotated_replaces(&modfile::manifest_path(dir))?;
    let current_paths: HashSet<&str> = current.iter().map(|r| r.old.as_str()).collect();

    Ok(existing
        .into_iter()
        .filter(|replace| !current_paths.contains(replace.old.as_str()))
        .collect())
}

/// Append `// from: <source>` to the line of `replace` in the go.mod at `path`.
///
/// A previous annotation at the end of the comment is replaced. Any other
/// comment text is kept, even when it mentions `from:`, and the annotation is
/// added after it. The file is left untouched when the line already ends in
/// an annotation for the same source, or when `replace` has no source.
pub fn annotate_source(path: &Path, replace: &Replace) -> Result<()> {
    let Some(source) = replace.source.as_deref() else {
        return Ok(());
    };

    let content = fs::read_to_string(path).map_err(|e| Error::ManifestRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file = modfile::parse(path, &content)?;

    let directive = file
        .replaces
        .iter()
        .find(|directive| replace.matches_directive(directive))
        .ok_or_else(|| Error::Annotate {
            old: replace.old.clone(),
            path: path.to_path_buf(),
        })?;

    let written = directive
        .comment
        .as_deref()
        .and_then(split_written_annotation);
    if written.map(|(_, existing)| existing) == Some(source) {
        return Ok(());
    }

    let mut lines: Vec<&str> = content.split_inclusive('\n').collect();
    let index = directive.line - 1;
    let raw = lines[index];
    let body = raw.trim_end_matches(['\n', '\r']);
    let eol = &raw[body.len()..];

    let (code, _) = modfile::split_comment(body);
    let annotated = match (directive.comment.as_deref(), written) {
        (_, Some((before, _))) if !before.is_empty() => format!(
            "{} // {} // {} {}",
            code.trim_end(),
            before,
            SOURCE_MARKER,
            source
        ),
        (Some(_), None) => format!("{} // {} {}", body.trim_end(), SOURCE_MARKER, source),
        _ => format!("{} // {} {}", code.trim_end(), SOURCE_MARKER, source),
    };
    let rewritten = format!("{}{}", annotated, eol);
    lines[index] = &rewritten;

    fs::write(path, lines.concat())?;
    log::debug!("annotated {} in {}", replace.old, path.display());
    Ok(())
}

use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::replace::Replace;

/// One module record from `go list -m -json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleInfo {
    pub path: String,
    #[serde(default)]
    pub version: String,
    /// Directory holding the module's files, empty if not downloaded
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub main: bool,
    #[serde(default)]
    pub indirect: bool,
}

impl ModuleInfo {
    /// True for modules the main module requires directly.
    pub fn is_direct(&self) -> bool {
        !self.main && !self.indirect
    }
}

/// Run `go <args>` in `dir` and return its stdout.
///
/// A non-zero exit is reported as `Error::GoCommand` carrying stderr.
pub fn run_go(program: &Path, dir: &Path, args: &[String]) -> Result<Vec<u8>> {
    let command = args.join(" ");
    log::debug!("running go {} in {}", command, dir.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| Error::GoSpawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        return Err(Error::GoCommand {
            command,
            stderr: if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr.to_string()
            },
        });
    }

    Ok(output.stdout)
}

/// List every module in the build graph of the module in `dir`.
pub fn list_modules(program: &Path, dir: &Path) -> Result<Vec<ModuleInfo>> {
    let args = ["list", "-m", "-json", "all"].map(String::from);
    let stdout = run_go(program, dir, &args)?;
    parse_module_stream(&stdout)
}

/// Decode the concatenated JSON objects printed by `go list -m -json`.
pub fn parse_module_stream(bytes: &[u8]) -> Result<Vec<ModuleInfo>> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<ModuleInfo>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|source| Error::ModuleStream { source })
}

/// The `-replace=` argument for `go mod edit` that writes `replace`.
pub fn replace_arg(replace: &Replace) -> String {
    format!(
        "-replace={}={}",
        module_at(&replace.old, replace.old_version.as_deref()),
        module_at(&replace.new, replace.new_version.as_deref())
    )
}

/// The `-dropreplace=` argument for `go mod edit` that removes a replace.
pub fn dropreplace_arg(old: &str, old_version: Option<&str>) -> String {
    format!("-dropreplace={}", module_at(old, old_version))
}

fn module_at(path: &str, version: Option<&str>) -> String {
    match version {
        Some(version) => format!("{}@{}", path, version),
        None => path.to_string(),
    }
}

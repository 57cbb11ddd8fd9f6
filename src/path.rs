//! Path classification for replace targets

use std::path::Path;

/// Returns true if a replace target is a filesystem path rather than a module path.
///
/// Local paths are `.` and `..`, anything starting with `./` or `../`, and
/// absolute paths: a leading `/`, anything the host treats as absolute (such
/// as `\\server\share` on Windows), or a Windows drive-letter prefix such as
/// `C:`. Drive letters are recognised on every host so a `go.mod` written on
/// Windows classifies the same way everywhere. A leading `\` alone is only
/// local where the host says so.
///
/// This is purely syntactic and never touches the filesystem.
pub fn is_local_path(target: &str) -> bool {
    if target.is_empty() {
        return false;
    }

    if target == "." || target == ".." {
        return true;
    }

    if target.starts_with("./") || target.starts_with("../") {
        return true;
    }

    if target.starts_with('/') || Path::new(target).is_absolute() {
        return true;
    }

    // Drive letter, e.g. C:\work or c:/work
    let bytes = target.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

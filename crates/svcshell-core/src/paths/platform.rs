//! Platform-specific detection of the runtime environment.
//!
//! Private helpers decide whether we run from the local repository (a
//! development checkout) or from a packaged binary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Forces packaged (`1`) or checkout (`0`) behavior.
const PACKAGED_ENV: &str = "SVCSHELL_PACKAGED";

/// Overrides the resource directory.
const RESOURCE_DIR_ENV: &str = "SVCSHELL_RESOURCE_DIR";

/// Directory name for bundled resources next to a packaged executable.
const RESOURCES_DIR: &str = "resources";

/// Detect if we are running from the local repository.
///
/// Returns `Some(path)` in a dev environment or for a release build whose
/// executable lives inside the source repo. Returns `None` otherwise.
#[allow(clippy::unnecessary_wraps)] // Option is needed for release builds
fn detect_local_repo() -> Option<PathBuf> {
    let repo_root = PathBuf::from(env!("SVCSHELL_REPO_ROOT"));

    #[cfg(debug_assertions)]
    {
        // In debug mode, always assume we want to use the repo we are building from
        Some(repo_root)
    }

    #[cfg(not(debug_assertions))]
    {
        let exe = env::current_exe().ok()?.canonicalize().ok()?;
        let repo = repo_root.canonicalize().ok()?;
        is_inside_repo(&exe, &repo).then_some(repo_root)
    }
}

/// True when `exe` sits under `repo`. Both paths must already be canonical.
#[cfg_attr(debug_assertions, allow(dead_code))]
pub(super) fn is_inside_repo(exe: &Path, repo: &Path) -> bool {
    repo.parent().is_some() && exe != repo && exe.starts_with(repo)
}

/// Interpret a boolean-ish environment value.
pub(super) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Check if we are running from a packaged distribution.
///
/// `SVCSHELL_PACKAGED` wins when set; otherwise a binary running outside the
/// source repository is considered packaged.
pub fn is_packaged() -> bool {
    if let Some(forced) = env::var(PACKAGED_ENV).ok().as_deref().and_then(parse_flag) {
        return forced;
    }
    detect_local_repo().is_none()
}

/// Root of the development checkout, if we run from one.
pub fn repo_root() -> Option<PathBuf> {
    if is_packaged() {
        None
    } else {
        detect_local_repo()
    }
}

/// Directory holding bundled resources (web UI, service scripts).
///
/// Resolution order:
/// 1. `SVCSHELL_RESOURCE_DIR` environment variable
/// 2. Local repository (if running from source)
/// 3. `resources/` next to the executable, or the executable's directory
pub fn resource_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var(RESOURCE_DIR_ENV) {
        let path = PathBuf::from(path);
        if !path.is_dir() {
            return Err(PathError::ResourceDirNotFound(path));
        }
        return Ok(path);
    }

    if let Some(repo) = repo_root() {
        return Ok(repo);
    }

    let exe = env::current_exe().map_err(|e| PathError::ExecutableError(e.to_string()))?;
    let exe_dir = exe
        .parent()
        .map(std::path::Path::to_path_buf)
        .ok_or_else(|| PathError::ExecutableError(format!("{} has no parent", exe.display())))?;

    let bundled = exe_dir.join(RESOURCES_DIR);
    if fs::metadata(&bundled).is_ok_and(|m| m.is_dir()) {
        Ok(bundled)
    } else {
        Ok(exe_dir)
    }
}

/// Make a user-provided path absolute relative to the current directory.
pub fn absolutize(raw: &str) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }

    let path = PathBuf::from(trimmed);
    if path.is_absolute() {
        Ok(path)
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .map_err(|e| PathError::CurrentDirError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_exe_inside_repo() {
        let repo = Path::new("/src/svcshell");
        assert!(is_inside_repo(
            Path::new("/src/svcshell/target/release/svcshell"),
            repo
        ));
    }

    #[test]
    fn test_installed_exe_is_outside_repo() {
        let repo = Path::new("/src/svcshell");
        assert!(!is_inside_repo(Path::new("/opt/svcshell/svcshell"), repo));
        // Prefix of the name is not containment.
        assert!(!is_inside_repo(
            Path::new("/src/svcshell-old/target/release/svcshell"),
            repo
        ));
        // A root "repository" would contain everything.
        assert!(!is_inside_repo(Path::new("/opt/svcshell/svcshell"), Path::new("/")));
    }

    #[test]
    fn test_absolutize_rejects_empty() {
        assert!(matches!(absolutize("  "), Err(PathError::EmptyPath)));
    }

    #[test]
    fn test_absolutize_keeps_absolute() {
        let abs = std::env::temp_dir().join("server.js");
        let raw = abs.to_string_lossy().to_string();
        assert_eq!(absolutize(&raw).unwrap(), abs);
    }

    #[test]
    fn test_absolutize_joins_relative() {
        let resolved = absolutize("server.js").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("server.js"));
    }

    #[test]
    #[cfg(debug_assertions)]
    fn test_debug_builds_detect_checkout() {
        // Test binaries are debug builds compiled from the checkout.
        assert!(detect_local_repo().is_some());
    }
}

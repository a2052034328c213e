//! Filesystem path utilities.
//!
//! - `normalize_path` - canonicalize with an absolute fallback
//! - `to_posix` - `/`-separated relative path strings for mapping keys
//! - `walk_files` - sorted, deterministic recursive file listing

use std::path::{Component, Path, PathBuf};

use jwalk::WalkDir;

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Render a relative path with `/` separators regardless of platform.
///
/// Only normal components are kept; `.` and root prefixes are dropped.
pub fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of `path` relative to `base`, as a POSIX string.
pub fn posix_relative(path: &Path, base: &Path) -> Option<String> {
    path.strip_prefix(base).ok().map(to_posix)
}

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules"];

/// Recursively list files under `root` in sorted order.
///
/// Hidden entries, `node_modules` and any directory in `excluded` are skipped.
/// A missing root yields an empty list.
pub fn walk_files(root: &Path, excluded: &[PathBuf], keep: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let excluded = excluded.to_vec();
    WalkDir::new(root)
        .sort(true)
        .skip_hidden(true)
        .process_read_dir(move |_depth, _path, _state, children| {
            children.retain(|child| {
                let Ok(entry) = child else {
                    return true;
                };
                if !entry.file_type().is_dir() {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                !SKIPPED_DIRS.contains(&name.as_ref()) && !excluded.contains(&entry.path())
            });
        })
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| keep(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        assert!(normalize_path(path).is_absolute());
    }

    #[test]
    fn test_to_posix() {
        assert_eq!(to_posix(Path::new("assets/images/a.png")), "assets/images/a.png");
        assert_eq!(to_posix(Path::new("./a.png")), "a.png");
        assert_eq!(to_posix(Path::new("")), "");
    }

    #[test]
    fn test_posix_relative() {
        let base = Path::new("/out/client");
        let path = Path::new("/out/client/assets/a-1234abcd.png");
        assert_eq!(
            posix_relative(path, base).as_deref(),
            Some("assets/a-1234abcd.png")
        );
        assert_eq!(posix_relative(Path::new("/elsewhere/a.png"), base), None);
    }

    #[test]
    fn test_walk_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::create_dir_all(root.join("dist")).unwrap();
        fs::write(root.join("b/index.html"), "").unwrap();
        fs::write(root.join("a/index.html"), "").unwrap();
        fs::write(root.join("a/notes.txt"), "").unwrap();
        fs::write(root.join("node_modules/pkg/index.html"), "").unwrap();
        fs::write(root.join(".cache/index.html"), "").unwrap();
        fs::write(root.join("dist/index.html"), "").unwrap();

        let files = walk_files(root, &[root.join("dist")], |p| {
            p.extension().is_some_and(|e| e == "html")
        });
        let rel: Vec<_> = files
            .iter()
            .map(|p| posix_relative(p, root).unwrap())
            .collect();
        assert_eq!(rel, vec!["a/index.html", "b/index.html"]);
    }

    #[test]
    fn test_walk_files_missing_root() {
        let dir = TempDir::new().unwrap();
        assert!(walk_files(&dir.path().join("nope"), &[], |_| true).is_empty());
    }
}

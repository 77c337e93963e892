//! Locating engine executables on disk.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// An executable found under the engine directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCandidate {
    pub path: PathBuf,
    pub name: String,
    pub modified: Option<SystemTime>,
}

/// Walk `dir` recursively and list every executable file, sorted by path.
///
/// A missing or unreadable directory yields an empty list.
pub fn discover_engines(dir: &Path) -> Vec<EngineCandidate> {
    let mut found = Vec::new();
    walk(dir, &mut found);
    found.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!("Found {} engine(s) under {}", found.len(), dir.display());
    found
}

fn walk(dir: &Path, found: &mut Vec<EngineCandidate>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot read engine directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if meta.is_dir() {
            walk(&path, found);
        } else if meta.is_file() && is_executable(&path, &meta) {
            found.push(EngineCandidate {
                name: entry.file_name().to_string_lossy().into_owned(),
                modified: meta.modified().ok(),
                path,
            });
        }
    }
}

#[cfg(unix)]
fn is_executable(_path: &Path, meta: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(path: &Path, _meta: &std::fs::Metadata) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}

/// Pick the engine to use: the first whose name starts with `stockfish`,
/// otherwise the most recently modified one.
pub fn default_engine(dir: &Path) -> Option<PathBuf> {
    let engines = discover_engines(dir);

    if let Some(stockfish) = engines
        .iter()
        .find(|e| e.name.to_ascii_lowercase().starts_with("stockfish"))
    {
        return Some(stockfish.path.clone());
    }

    engines
        .into_iter()
        .max_by_key(|e| e.modified)
        .map(|e| e.path)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    fn touch(path: &Path, mode: u32) {
        std::fs::write(path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_discovers_only_executables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        touch(&dir.path().join("komodo"), 0o755);
        touch(&dir.path().join("nested/lc0"), 0o755);
        touch(&dir.path().join("README.txt"), 0o644);

        let names: Vec<String> = discover_engines(dir.path())
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["komodo", "lc0"]);
    }

    #[test]
    fn test_prefers_stockfish() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("stockfish-17"), 0o755);
        touch(&dir.path().join("zzz-engine"), 0o755);
        assert_eq!(default_engine(dir.path()), Some(dir.path().join("stockfish-17")));
    }

    #[test]
    fn test_falls_back_to_newest() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old-engine");
        let new = dir.path().join("new-engine");
        touch(&old, 0o755);
        touch(&new, 0o755);
        let past = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(past)
            .unwrap();
        assert_eq!(default_engine(dir.path()), Some(new));
    }

    #[test]
    fn test_missing_directory() {
        assert!(discover_engines(Path::new("/no/such/dir")).is_empty());
        assert_eq!(default_engine(Path::new("/no/such/dir")), None);
    }
}

//! Configuration for the pgnview CLI.
//!
//! Every value has a compile-time default and can be overridden at runtime
//! via a dedicated environment variable. Command-line flags, where they
//! exist, take precedence over both.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Fallback data directory when no per-user directory can be determined.
const DEV_DATA_DIR: &str = "./data";

/// File name of the game library inside the data directory.
const DB_FILE_NAME: &str = "master.db";

/// Default directory scanned for engine executables.
const DEFAULT_ENGINE_DIR: &str = "res/engines";

/// Default search depth for analysis.
const DEFAULT_ENGINE_DEPTH: u32 = 20;

/// Default directory searched for the most recent `.pgn` file.
const DEFAULT_INPUT_DIR: &str = "in";

/// Get the data directory.
///
/// Priority:
/// 1. `PGNVIEW_DATA_DIR` env variable if set
/// 2. the platform data directory for `pgnview`
/// 3. `./data` as fallback
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PGNVIEW_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "pgnview") {
        return dirs.data_dir().to_path_buf();
    }

    PathBuf::from(DEV_DATA_DIR)
}

/// Get the game library path.
///
/// Priority:
/// 1. `PGNVIEW_DB_PATH` env variable if set
/// 2. `master.db` inside [`get_data_dir`]
pub fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("PGNVIEW_DB_PATH") {
        return PathBuf::from(path);
    }

    get_data_dir().join(DB_FILE_NAME)
}

/// Get an explicitly configured engine binary (`PGNVIEW_ENGINE_PATH`).
pub fn get_engine_path() -> Option<PathBuf> {
    std::env::var("PGNVIEW_ENGINE_PATH").ok().map(PathBuf::from)
}

/// Get the directory scanned for engines.
///
/// Priority:
/// 1. `PGNVIEW_ENGINE_DIR` env variable if set
/// 2. `res/engines` as fallback
pub fn get_engine_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PGNVIEW_ENGINE_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_ENGINE_DIR)
}

/// Get the default analysis depth.
///
/// Priority:
/// 1. `PGNVIEW_ENGINE_DEPTH` env variable if set (falls back to default if
///    the value cannot be parsed as a `u32`)
/// 2. `20` as fallback
pub fn get_engine_depth() -> u32 {
    if let Ok(depth) = std::env::var("PGNVIEW_ENGINE_DEPTH") {
        return depth.parse().unwrap_or(DEFAULT_ENGINE_DEPTH);
    }

    DEFAULT_ENGINE_DEPTH
}

/// Get the directory searched when no PGN file is named.
///
/// Priority:
/// 1. `PGNVIEW_INPUT_DIR` env variable if set
/// 2. `in` as fallback
pub fn get_input_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PGNVIEW_INPUT_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(DEFAULT_INPUT_DIR)
}

/// Get the log file path (`PGNVIEW_LOG_PATH`). Logs go to stderr only
/// when unset.
pub fn get_log_path() -> Option<PathBuf> {
    std::env::var("PGNVIEW_LOG_PATH").ok().map(PathBuf::from)
}

/// The most recently modified `.pgn` file directly inside `dir`.
pub fn most_recent_pgn(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .flatten()
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pgn"))
        })
        .filter_map(|entry| {
            let meta = entry.metadata().ok()?;
            meta.is_file()
                .then(|| (meta.modified().unwrap_or(SystemTime::UNIX_EPOCH), entry.path()))
        })
        .max()
        .map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_get_db_path() {
        let path = get_db_path();
        match std::env::var("PGNVIEW_DB_PATH") {
            Ok(val) => assert_eq!(path, PathBuf::from(val)),
            Err(_) => assert!(path.ends_with(DB_FILE_NAME)),
        }
    }

    #[test]
    fn test_get_engine_dir() {
        let dir = get_engine_dir();
        match std::env::var("PGNVIEW_ENGINE_DIR") {
            Ok(val) => assert_eq!(dir, PathBuf::from(val)),
            Err(_) => assert_eq!(dir, PathBuf::from(DEFAULT_ENGINE_DIR)),
        }
    }

    #[test]
    fn test_get_engine_depth_default() {
        if std::env::var("PGNVIEW_ENGINE_DEPTH").is_err() {
            assert_eq!(get_engine_depth(), DEFAULT_ENGINE_DEPTH);
        }
    }

    #[test]
    fn test_get_input_dir() {
        let dir = get_input_dir();
        match std::env::var("PGNVIEW_INPUT_DIR") {
            Ok(val) => assert_eq!(dir, PathBuf::from(val)),
            Err(_) => assert_eq!(dir, PathBuf::from(DEFAULT_INPUT_DIR)),
        }
    }

    #[test]
    fn test_most_recent_pgn() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(most_recent_pgn(dir.path()), None);

        let old = dir.path().join("old.pgn");
        let new = dir.path().join("new.PGN");
        std::fs::write(&old, "1. e4 *").unwrap();
        std::fs::write(&new, "1. d4 *").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let past = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(past)
            .unwrap();

        assert_eq!(most_recent_pgn(dir.path()), Some(new));
        assert_eq!(most_recent_pgn(Path::new("/no/such/dir")), None);
    }
}

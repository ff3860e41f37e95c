// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

use std::path::{Path, PathBuf};

const DATA_DIR_ENV: &str = "DATA_DIR";

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

fn env_data_dir() -> Option<String> {
    std::env::var(DATA_DIR_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the active data directory using precedence:
/// 1) explicit value (config)
/// 2) `DATA_DIR`
/// 3) cwd-relative `./data`
pub fn resolve_data_dir(explicit_data_dir: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit_data_dir
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .or_else(env_data_dir)
    {
        return absolute(PathBuf::from(dir));
    }
    absolute(PathBuf::from("data"))
}

/// Resolve a path that may be absolute or relative to the data directory.
/// A leading `data/` component is not duplicated.
pub fn resolve_data_path(raw_path: &str, explicit_data_dir: Option<&str>) -> PathBuf {
    let as_path = PathBuf::from(raw_path);
    if as_path.is_absolute() {
        return as_path;
    }
    let relative = as_path
        .strip_prefix("data")
        .map(Path::to_path_buf)
        .unwrap_or(as_path);
    resolve_data_dir(explicit_data_dir).join(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_kept() {
        let p = resolve_data_path("/srv/uploads", Some("/var/lib/bit"));
        assert_eq!(p, PathBuf::from("/srv/uploads"));
    }

    #[test]
    fn data_prefix_is_not_duplicated() {
        let p = resolve_data_path("data/uploads", Some("/var/lib/bit"));
        assert_eq!(p, PathBuf::from("/var/lib/bit/uploads"));
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project-path resolution: the algorithm that turns one client invocation
//! into the worker-pool bucket key.

use std::path::{Path, PathBuf};

use crate::client_info::ClientInfo;

/// Name of the marker file an upward search looks for.
const PROJECT_MARKER: &str = "Project.toml";

/// Resolve the project path for a client, per the conductor's pool-keying
/// algorithm:
///
/// 1. The last `--project=V` switch wins, else `JULIA_PROJECT` from the
///    client's environment, else `default_user_project`.
/// 2. `V == "@."` or `V == ""` triggers an upward search from `cwd` for a
///    `Project.toml`, stopping at the filesystem root and falling back to
///    `default_user_project` if none is found.
/// 3. Any other value is resolved relative to `cwd` (with `~` expanded to
///    `home_dir`), and a trailing `/` is stripped.
pub fn resolve_project(
    info: &ClientInfo,
    home_dir: Option<&Path>,
    default_user_project: &Path,
) -> PathBuf {
    let value = info
        .switches
        .last_value("project")
        .map(|s| s.to_string())
        .or_else(|| info.env_var("JULIA_PROJECT").map(|s| s.to_string()));

    match value.as_deref() {
        None => default_user_project.to_path_buf(),
        Some("@.") | Some("") => {
            search_upward(Path::new(&info.cwd)).unwrap_or_else(|| default_user_project.to_path_buf())
        }
        Some(v) => resolve_relative(v, &info.cwd, home_dir),
    }
}

fn search_upward(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        if d.join(PROJECT_MARKER).exists() {
            return Some(d.to_path_buf());
        }
        dir = d.parent();
    }
    None
}

fn resolve_relative(value: &str, cwd: &str, home_dir: Option<&Path>) -> PathBuf {
    let expanded = expand_tilde(value, home_dir);
    let path = if expanded.is_absolute() { expanded } else { Path::new(cwd).join(expanded) };
    strip_trailing_slash(path)
}

fn expand_tilde(value: &str, home_dir: Option<&Path>) -> PathBuf {
    match (value.strip_prefix('~'), home_dir) {
        (Some(rest), Some(home)) => {
            let rest = rest.strip_prefix('/').unwrap_or(rest);
            home.join(rest)
        }
        _ => PathBuf::from(value),
    }
}

fn strip_trailing_slash(path: PathBuf) -> PathBuf {
    let s = path.to_string_lossy();
    if s.len() > 1 && s.ends_with('/') {
        PathBuf::from(s.trim_end_matches('/'))
    } else {
        path
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;

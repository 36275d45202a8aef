// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::client_info::ClientInfo;
use tempfile::tempdir;

fn client(args: &[&str], env: &[(&str, &str)], cwd: &str) -> ClientInfo {
    ClientInfo::new(false, 1, cwd.to_string(), args.iter().map(|s| s.to_string()).collect())
        .with_env(env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
}

#[test]
fn explicit_project_switch_wins_over_env() {
    let info = client(&["--project=/explicit"], &[("JULIA_PROJECT", "/from-env")], "/cwd");
    let default = PathBuf::from("/default");
    assert_eq!(resolve_project(&info, None, &default), PathBuf::from("/explicit"));
}

#[test]
fn env_var_used_when_no_switch() {
    let info = client(&[], &[("JULIA_PROJECT", "/from-env")], "/cwd");
    let default = PathBuf::from("/default");
    assert_eq!(resolve_project(&info, None, &default), PathBuf::from("/from-env"));
}

#[test]
fn falls_back_to_default_when_nothing_set() {
    let info = client(&[], &[], "/cwd");
    let default = PathBuf::from("/default");
    assert_eq!(resolve_project(&info, None, &default), default);
}

#[test]
fn relative_value_resolved_against_cwd() {
    let info = client(&["--project=sub/dir"], &[], "/home/user/work");
    let default = PathBuf::from("/default");
    assert_eq!(
        resolve_project(&info, None, &default),
        PathBuf::from("/home/user/work/sub/dir")
    );
}

#[test]
fn tilde_expands_against_home_dir() {
    let info = client(&["--project=~/proj"], &[], "/cwd");
    let home = PathBuf::from("/home/user");
    let default = PathBuf::from("/default");
    assert_eq!(
        resolve_project(&info, Some(&home), &default),
        PathBuf::from("/home/user/proj")
    );
}

#[test]
fn trailing_slash_is_stripped() {
    let info = client(&["--project=/abs/path/"], &[], "/cwd");
    let default = PathBuf::from("/default");
    assert_eq!(resolve_project(&info, None, &default), PathBuf::from("/abs/path"));
}

#[test]
fn at_dot_searches_upward_for_project_toml() {
    let dir = tempdir().expect("tempdir");
    std::fs::write(dir.path().join("Project.toml"), "").expect("write marker");
    let nested = dir.path().join("a").join("b");
    std::fs::create_dir_all(&nested).expect("mkdir");

    let info = client(&["--project=@."], &[], nested.to_str().expect("utf8"));
    let default = PathBuf::from("/default");
    assert_eq!(resolve_project(&info, None, &default), dir.path());
}

#[test]
fn empty_value_falls_back_to_default_when_no_marker_found() {
    let dir = tempdir().expect("tempdir");
    let info = client(&["--project="], &[], dir.path().to_str().expect("utf8"));
    let default = PathBuf::from("/default");
    assert_eq!(resolve_project(&info, None, &default), default);
}

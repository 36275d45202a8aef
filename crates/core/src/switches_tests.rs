// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn args(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[parameterized(
    short_eval = {&["-e", "1+1"], Switch::Eval("1+1".to_string())},
    long_eval = {&["--eval", "1+1"], Switch::Eval("1+1".to_string())},
    short_print = {&["-E", "x"], Switch::Print("x".to_string())},
    short_load = {&["-L", "foo.jl"], Switch::Load("foo.jl".to_string())},
    project_separate = {&["--project", "/tmp/p"], Switch::Project("/tmp/p".to_string())},
    project_equals = {&["--project=/tmp/p"], Switch::Project("/tmp/p".to_string())},
)]
fn recognises_value_switches(raw: &[&str], expected: Switch) {
    let switches = Switches::parse(&args(raw));
    assert_eq!(switches.iter().next(), Some(&expected));
}

#[test]
fn double_dash_terminates_switches_and_starts_program_args() {
    let switches = Switches::parse(&args(&["-e", "1", "--", "prog.jl", "a", "b"]));
    assert_eq!(switches.len(), 1);
    assert_eq!(switches.program_file.as_deref(), Some("prog.jl"));
    assert_eq!(switches.program_args, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn unrecognised_token_becomes_program_file() {
    let switches = Switches::parse(&args(&["-i", "script.jl", "x"]));
    assert_eq!(switches.len(), 1);
    assert_eq!(switches.program_file.as_deref(), Some("script.jl"));
    assert_eq!(switches.program_args, vec!["x".to_string()]);
}

#[test]
fn last_occurrence_of_project_wins() {
    let switches = Switches::parse(&args(&["--project=/a", "--project=/b"]));
    assert_eq!(switches.last_value("project"), Some("/b"));
}

#[test]
fn banner_defaults_to_auto_when_bare() {
    let switches = Switches::parse(&args(&["--banner"]));
    assert_eq!(switches.last_value("banner"), Some("auto"));
}

#[test]
fn quiet_and_interactive_are_flags_without_values() {
    let switches = Switches::parse(&args(&["-q", "-i"]));
    assert!(switches.contains("quiet"));
    assert!(switches.contains("interactive"));
}

#[test]
fn empty_args_is_empty() {
    let switches = Switches::parse(&[]);
    assert!(switches.is_empty());
}

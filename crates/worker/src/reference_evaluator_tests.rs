// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::namespace::Namespace;

fn eval(expr: &str, ns: &mut Namespace) -> Result<EvalOutcome, EvalError> {
    ReferenceEvaluator.eval(expr, ns)
}

#[test]
fn evaluates_arithmetic() {
    let mut ns = Namespace::top_level();
    assert_eq!(eval("1+1", &mut ns).expect("eval"), EvalOutcome::Value("2".to_string()));
    assert_eq!(eval("2*3+4", &mut ns).expect("eval"), EvalOutcome::Value("10".to_string()));
    assert_eq!(eval("(2+3)*4", &mut ns).expect("eval"), EvalOutcome::Value("20".to_string()));
}

#[test]
fn exit_raises_system_exit() {
    let mut ns = Namespace::top_level();
    let err = eval("exit(42)", &mut ns).expect_err("should raise");
    assert!(matches!(err, EvalError::SystemExit(42)));
}

#[test]
fn set_project_updates_namespace() {
    let mut ns = Namespace::top_level();
    eval(r#"set_project("/tmp/proj")"#, &mut ns).expect("eval");
    assert_eq!(ns.project, Some(std::path::PathBuf::from("/tmp/proj")));
}

#[test]
fn nothing_is_unit() {
    let mut ns = Namespace::top_level();
    assert_eq!(eval("nothing", &mut ns).expect("eval"), EvalOutcome::Unit);
}

#[test]
fn print_writes_to_stdout_and_returns_unit() {
    let mut ns = Namespace::for_session("/tmp".to_string(), vec![]);
    let buf: Vec<u8> = Vec::new();
    let sink = std::sync::Arc::new(std::sync::Mutex::new(buf));
    let sink_clone = sink.clone();
    struct Writer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);
    impl std::io::Write for Writer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    ns.attach_stdio(Box::new(Writer(sink_clone)), Box::new(std::io::empty()));

    let outcome = eval("print(1+1)", &mut ns).expect("eval");
    assert_eq!(outcome, EvalOutcome::Unit);
    assert_eq!(&*sink.lock().unwrap(), b"2");
}

#[test]
fn write_read_echoes_stdin_to_stdout() {
    let mut ns = Namespace::for_session("/tmp".to_string(), vec![]);
    let buf: Vec<u8> = Vec::new();
    let sink = std::sync::Arc::new(std::sync::Mutex::new(buf));
    struct Writer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);
    impl std::io::Write for Writer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
    ns.attach_stdio(Box::new(Writer(sink.clone())), Box::new(std::io::Cursor::new(b"ABC".to_vec())));

    eval("write(stdout, read(stdin, 3))", &mut ns).expect("eval");
    assert_eq!(&*sink.lock().unwrap(), b"ABC");
}

#[test]
fn undefined_function_is_a_runtime_error() {
    let mut ns = Namespace::top_level();
    let err = eval("frobnicate(1)", &mut ns).expect_err("should error");
    assert!(matches!(err, EvalError::Runtime(_)));
}

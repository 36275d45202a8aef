// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ReferenceEvaluator`: a minimal arithmetic/`print`/`exit`/stdin-echo
//! evaluator. This is not a language implementation — it exists purely
//! so the worker shim, the conductor's reserve-binding `eval`, and the
//! end-to-end scenarios have something concrete to drive against the
//! `Evaluator` seam. A production embedding replaces this crate's use of
//! `ReferenceEvaluator` with the host language's real interpreter.

use std::path::PathBuf;

use crate::error::EvalError;
use crate::evaluator::{EvalOutcome, Evaluator};
use crate::namespace::Namespace;

pub struct ReferenceEvaluator;

impl Evaluator for ReferenceEvaluator {
    fn eval(&self, expr: &str, ns: &mut Namespace) -> Result<EvalOutcome, EvalError> {
        let tokens = lex(expr)?;
        let mut parser = Parser { tokens, pos: 0 };
        let ast = parser.parse_expr()?;
        parser.expect_eof()?;
        match eval_expr(&ast, ns)? {
            Value::Unit => Ok(EvalOutcome::Unit),
            Value::Int(n) => Ok(EvalOutcome::Value(n.to_string())),
            Value::Str(s) => Ok(EvalOutcome::Value(s)),
            Value::Bytes(b) => Ok(EvalOutcome::Value(String::from_utf8_lossy(&b).into_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Unit,
    Int(i64),
    Str(String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Int(i64),
    Str(String),
    Ident(String),
    Call(String, Vec<Expr>),
    BinOp(Box<Expr>, char, Box<Expr>),
}

fn eval_expr(expr: &Expr, ns: &mut Namespace) -> Result<Value, EvalError> {
    match expr {
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Ident(name) => match name.as_str() {
            "nothing" => Ok(Value::Unit),
            "stdin" | "stdout" => Ok(Value::Str(name.clone())),
            other => Err(EvalError::Runtime(format!("undefined variable: {other}"))),
        },
        Expr::BinOp(lhs, op, rhs) => {
            let l = as_int(eval_expr(lhs, ns)?)?;
            let r = as_int(eval_expr(rhs, ns)?)?;
            let result = match op {
                '+' => l + r,
                '-' => l - r,
                '*' => l * r,
                '/' => l.checked_div(r).ok_or_else(|| EvalError::Runtime("division by zero".to_string()))?,
                _ => unreachable!("lexer only emits +-*/"),
            };
            Ok(Value::Int(result))
        }
        Expr::Call(name, args) => eval_call(name, args, ns),
    }
}

fn eval_call(name: &str, args: &[Expr], ns: &mut Namespace) -> Result<Value, EvalError> {
    match name {
        "print" => {
            let arg =
                args.first().ok_or_else(|| EvalError::Runtime("print() needs one argument".to_string()))?;
            let value = eval_expr(arg, ns)?;
            let text = match &value {
                Value::Unit => String::new(),
                Value::Int(n) => n.to_string(),
                Value::Str(s) => s.clone(),
                Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            };
            ns.write_stdout(text.as_bytes())
                .map_err(|e| EvalError::Runtime(format!("stdout write failed: {e}")))?;
            Ok(Value::Unit)
        }
        "exit" => {
            let code = match args.first() {
                Some(arg) => as_int(eval_expr(arg, ns)?)?,
                None => 0,
            };
            Err(EvalError::SystemExit(code as i32))
        }
        "set_project" => {
            let arg = args
                .first()
                .ok_or_else(|| EvalError::Runtime("set_project() needs one argument".to_string()))?;
            let path = as_str(eval_expr(arg, ns)?)?;
            ns.project = Some(PathBuf::from(path));
            Ok(Value::Unit)
        }
        "read" => {
            let stream = args.first().ok_or_else(|| EvalError::Runtime("read() needs a stream".to_string()))?;
            let n = args
                .get(1)
                .ok_or_else(|| EvalError::Runtime("read() needs a byte count".to_string()))
                .and_then(|e| as_int(eval_expr(e, ns)?))?;
            if as_str(eval_expr(stream, ns)?)? != "stdin" {
                return Err(EvalError::Runtime("read() only supports stdin".to_string()));
            }
            let bytes =
                ns.read_stdin(n as usize).map_err(|e| EvalError::Runtime(format!("stdin read failed: {e}")))?;
            Ok(Value::Bytes(bytes))
        }
        "write" => {
            let stream = args.first().ok_or_else(|| EvalError::Runtime("write() needs a stream".to_string()))?;
            let payload =
                args.get(1).ok_or_else(|| EvalError::Runtime("write() needs a payload".to_string()))?;
            if as_str(eval_expr(stream, ns)?)? != "stdout" {
                return Err(EvalError::Runtime("write() only supports stdout".to_string()));
            }
            let bytes = match eval_expr(payload, ns)? {
                Value::Bytes(b) => b,
                Value::Str(s) => s.into_bytes(),
                Value::Int(n) => n.to_string().into_bytes(),
                Value::Unit => Vec::new(),
            };
            ns.write_stdout(&bytes).map_err(|e| EvalError::Runtime(format!("stdout write failed: {e}")))?;
            Ok(Value::Unit)
        }
        other => Err(EvalError::Runtime(format!("undefined function: {other}"))),
    }
}

fn as_int(v: Value) -> Result<i64, EvalError> {
    match v {
        Value::Int(n) => Ok(n),
        other => Err(EvalError::Runtime(format!("expected an integer, found {other:?}"))),
    }
}

fn as_str(v: Value) -> Result<String, EvalError> {
    match v {
        Value::Str(s) => Ok(s),
        other => Err(EvalError::Runtime(format!("expected a string, found {other:?}"))),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Str(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

fn lex(src: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '"' => {
                i += 1;
                let mut s = String::new();
                while i < chars.len() && chars[i] != '"' {
                    s.push(chars[i]);
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(EvalError::Runtime("unterminated string literal".to_string()));
                }
                i += 1;
                tokens.push(Token::Str(s));
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text.parse().map_err(|_| EvalError::Runtime(format!("bad integer: {text}")))?;
                tokens.push(Token::Int(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            other => return Err(EvalError::Runtime(format!("unexpected character: {other}"))),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        t
    }

    fn expect_eof(&self) -> Result<(), EvalError> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(EvalError::Runtime("trailing input after expression".to_string()))
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    let rhs = self.parse_term()?;
                    lhs = Expr::BinOp(Box::new(lhs), '+', Box::new(rhs));
                }
                Some(Token::Minus) => {
                    self.next();
                    let rhs = self.parse_term()?;
                    lhs = Expr::BinOp(Box::new(lhs), '-', Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    let rhs = self.parse_primary()?;
                    lhs = Expr::BinOp(Box::new(lhs), '*', Box::new(rhs));
                }
                Some(Token::Slash) => {
                    self.next();
                    let rhs = self.parse_primary()?;
                    lhs = Expr::BinOp(Box::new(lhs), '/', Box::new(rhs));
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.next() {
            Some(Token::Int(n)) => Ok(Expr::Int(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::Minus) => {
                let inner = self.parse_primary()?;
                Ok(Expr::BinOp(Box::new(Expr::Int(0)), '-', Box::new(inner)))
            }
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(EvalError::Runtime("expected closing paren".to_string())),
                }
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.next();
                    let mut args = Vec::new();
                    if !matches!(self.peek(), Some(Token::RParen)) {
                        loop {
                            args.push(self.parse_expr()?);
                            match self.peek() {
                                Some(Token::Comma) => {
                                    self.next();
                                }
                                _ => break,
                            }
                        }
                    }
                    match self.next() {
                        Some(Token::RParen) => Ok(Expr::Call(name, args)),
                        _ => Err(EvalError::Runtime("expected closing paren in call".to_string())),
                    }
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            other => Err(EvalError::Runtime(format!("unexpected token: {other:?}"))),
        }
    }
}

#[cfg(test)]
#[path = "reference_evaluator_tests.rs"]
mod tests;

//! Predicates over ledger JSON used by `search`.
//!
//! Syntax: `<json-pointer> [<op> <literal>]`, e.g. `/close_time >= 500000000`
//! or `/transactions/0`. Without an operator the pointed-to value must exist
//! and be truthy.

use crate::utils::{LedgerToolError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref COMPARISON: Regex =
        Regex::new(r"^\s*(/\S*?)\s*(==|!=|<=|>=|<|>)\s*(.+?)\s*$").expect("comparison regex");
    static ref POINTER: Regex = Regex::new(r"^\s*(/\S*)\s*$").expect("pointer regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    fn parse(s: &str) -> Option<Op> {
        Some(match s {
            "==" => Op::Eq,
            "!=" => Op::Ne,
            "<" => Op::Lt,
            "<=" => Op::Le,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            _ => return None,
        })
    }

    fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        }
    }

    fn accepts(&self, ord: Ordering) -> bool {
        match self {
            Op::Eq => ord == Ordering::Equal,
            Op::Ne => ord != Ordering::Equal,
            Op::Lt => ord == Ordering::Less,
            Op::Le => ord != Ordering::Greater,
            Op::Gt => ord == Ordering::Greater,
            Op::Ge => ord != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pointer: String,
    test: Option<(Op, Value)>,
}

impl Condition {
    pub fn matches(&self, ledger: &Value) -> bool {
        let actual = ledger.pointer(&self.pointer);
        match (&self.test, actual) {
            (None, Some(v)) => truthy(v),
            (None, None) => false,
            (Some((Op::Ne, _)), None) => true,
            (Some(_), None) => false,
            (Some((op, expected)), Some(v)) => match compare(v, expected) {
                Some(ord) => op.accepts(ord),
                None => *op == Op::Ne,
            },
        }
    }
}

impl FromStr for Condition {
    type Err = LedgerToolError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(caps) = COMPARISON.captures(s) {
            let op = Op::parse(&caps[2]).ok_or_else(|| LedgerToolError::Condition(s.to_string()))?;
            let literal = &caps[3];
            let expected = serde_json::from_str(literal)
                .unwrap_or_else(|_| Value::String(literal.to_string()));
            return Ok(Condition {
                pointer: caps[1].to_string(),
                test: Some((op, expected)),
            });
        }
        if let Some(caps) = POINTER.captures(s) {
            return Ok(Condition {
                pointer: caps[1].to_string(),
                test: None,
            });
        }
        Err(LedgerToolError::Condition(s.to_string()))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.test {
            Some((op, v)) => write!(f, "{} {} {}", self.pointer, op.as_str(), v),
            None => f.write_str(&self.pointer),
        }
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

// Ledger JSON carries most amounts and indexes as strings. Integers compare
// exactly.
fn as_number(v: &Value) -> Option<Number> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .map(|u| Number::Int(i128::from(u)))
            .or_else(|| n.as_i64().map(|i| Number::Int(i128::from(i))))
            .or_else(|| n.as_f64().map(Number::Float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i128>()
                .map(Number::Int)
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(Number::Float))
        }
        _ => None,
    }
}

fn compare(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (as_number(actual), as_number(expected)) {
        (Some(Number::Int(a)), Some(Number::Int(b))) => return Some(a.cmp(&b)),
        (Some(a), Some(b)) => return a.as_f64().partial_cmp(&b.as_f64()),
        _ => {}
    }
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (a, b) if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

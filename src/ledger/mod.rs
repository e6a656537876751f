//! Ledger identifiers and the pure algorithms that work on ledger numbers.
//!
//! - `LedgerName` / `LedgerId`: symbolic or numeric ledger references
//! - `NamedLedgers`: the resolution of every symbolic name for one run
//! - `range`: compact range specifications ("10-19,42,closed")
//! - `search`: linear and binary search over ledger numbers
//! - `condition`: predicates evaluated against ledger JSON

pub mod range;
pub mod search;
pub mod condition;

use crate::utils::{LedgerToolError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub use condition::Condition;
pub use range::{Aliases, RangeSet};
pub use search::{binary_search, linear_search, Pick};

/// Symbolic ledger names understood on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LedgerName {
    Closed,
    Current,
    Validated,
    First,
    Last,
}

impl LedgerName {
    pub const ALL: [LedgerName; 5] = [
        LedgerName::Closed,
        LedgerName::Current,
        LedgerName::Validated,
        LedgerName::First,
        LedgerName::Last,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerName::Closed => "closed",
            LedgerName::Current => "current",
            LedgerName::Validated => "validated",
            LedgerName::First => "first",
            LedgerName::Last => "last",
        }
    }

    /// Names the data source itself knows how to resolve.
    pub fn is_server_side(&self) -> bool {
        matches!(self, LedgerName::Closed | LedgerName::Current | LedgerName::Validated)
    }
}

impl fmt::Display for LedgerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerName {
    type Err = LedgerToolError;

    fn from_str(s: &str) -> Result<Self> {
        LedgerName::ALL
            .iter()
            .copied()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| LedgerToolError::UnknownName(s.to_string()))
    }
}

/// A ledger reference as passed to a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerId {
    Number(u64),
    Name(LedgerName),
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerId::Number(n) => write!(f, "{}", n),
            LedgerId::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<u64> for LedgerId {
    fn from(n: u64) -> Self {
        LedgerId::Number(n)
    }
}

impl From<LedgerName> for LedgerId {
    fn from(name: LedgerName) -> Self {
        LedgerId::Name(name)
    }
}

impl FromStr for LedgerId {
    type Err = LedgerToolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.parse::<u64>() {
            Ok(n) => Ok(LedgerId::Number(n)),
            Err(_) => s.parse().map(LedgerId::Name),
        }
    }
}

/// Resolution of each symbolic name, computed once when the server starts.
/// `None` means the name has no fixed number (e.g. no current ledger).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NamedLedgers {
    pub closed: Option<u64>,
    pub current: Option<u64>,
    pub validated: Option<u64>,
    pub first: Option<u64>,
    pub last: Option<u64>,
}

impl NamedLedgers {
    pub fn get(&self, name: LedgerName) -> Option<u64> {
        match name {
            LedgerName::Closed => self.closed,
            LedgerName::Current => self.current,
            LedgerName::Validated => self.validated,
            LedgerName::First => self.first,
            LedgerName::Last => self.last,
        }
    }

    pub fn set(&mut self, name: LedgerName, value: Option<u64>) {
        let slot = match name {
            LedgerName::Closed => &mut self.closed,
            LedgerName::Current => &mut self.current,
            LedgerName::Validated => &mut self.validated,
            LedgerName::First => &mut self.first,
            LedgerName::Last => &mut self.last,
        };
        *slot = value;
    }

    /// Alias table for range parsing: every name is known, even when unresolved.
    pub fn aliases(&self) -> Aliases {
        LedgerName::ALL
            .iter()
            .map(|n| (n.as_str().to_string(), self.get(*n)))
            .collect()
    }
}

//! SearchLedgers: find ledgers in the working set whose JSON satisfies a
//! `Condition`.
//!
//! Searches run over positions in the sorted working set, so sparse sets
//! like "10-20,500-510" bisect as one sequence. A ledger that cannot be
//! obtained evaluates false.

use crate::ledger::{binary_search, linear_search, Condition, Pick, RangeSet};
use crate::server::{Fidelity, LedgerServer};
use crate::utils::{LedgerToolError, Result};
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Position {
    /// First match; the condition must flip at most once over the set.
    First,
    /// Last match; same assumption as `first`.
    Last,
    /// Every match, checking each ledger.
    #[default]
    All,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub position: Position,
    /// Neighbours to include on each side of every match.
    pub window: u64,
    pub fidelity: Fidelity,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            position: Position::All,
            window: 0,
            fidelity: Fidelity::Summary,
        }
    }
}

pub fn search_ledgers(
    server: &LedgerServer,
    condition: &Condition,
    options: &SearchOptions,
) -> Result<RangeSet> {
    let ledgers = server.ledgers();
    let (first, last) = match (ledgers.first(), ledgers.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(RangeSet::new()),
    };
    let count = ledgers.len();

    let matches_at = |index: u64| -> Result<bool> {
        let number = match ledgers.nth(index) {
            Some(number) => number,
            None => return Ok(false),
        };
        let hit = server
            .get_ledger(number, options.fidelity)?
            .map_or(false, |ledger| condition.matches(&ledger));
        debug!(ledger = number, hit, "evaluated condition");
        Ok(hit)
    };

    let hits: Vec<u64> = match options.position {
        Position::First | Position::Last => {
            let pick = if options.position == Position::First {
                Pick::First
            } else {
                Pick::Last
            };
            let index = binary_search(0, count - 1, matches_at, pick).map_err(|e| match e {
                LedgerToolError::NoMatch { .. } => LedgerToolError::NoMatch { begin: first, end: last },
                other => other,
            })?;
            vec![index]
        }
        Position::All => {
            let mut fatal: Option<LedgerToolError> = None;
            let hits: Vec<u64> = linear_search(0..count, |index| {
                if fatal.is_some() {
                    return false;
                }
                match matches_at(index) {
                    Ok(hit) => hit,
                    Err(e) if e.is_recoverable() => {
                        error!(error = %e, "skipping ledger");
                        false
                    }
                    Err(e) => {
                        fatal = Some(e);
                        false
                    }
                }
            })
            .collect();
            if let Some(e) = fatal {
                return Err(e);
            }
            if hits.is_empty() {
                return Err(LedgerToolError::NoMatch { begin: first, end: last });
            }
            hits
        }
    };

    let mut found = RangeSet::new();
    for index in hits {
        let lo = index.saturating_sub(options.window);
        let hi = index.saturating_add(options.window).min(count - 1);
        for i in lo..=hi {
            if let Some(number) = ledgers.nth(i) {
                found.insert(number);
            }
        }
    }
    Ok(found)
}

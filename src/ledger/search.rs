//! Searching ledger numbers against a predicate.
//!
//! `linear_search` makes no assumption about the predicate. `binary_search`
//! assumes the predicate changes value at most once over the interval, in
//! either direction, and finds the first or last point where it holds.

use crate::utils::{LedgerToolError, Result};

/// Which end of the matching region to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    First,
    Last,
}

/// Lazily yields each item, in input order, for which `cond` holds.
pub fn linear_search<I, F>(items: I, mut cond: F) -> impl Iterator<Item = u64>
where
    I: IntoIterator<Item = u64>,
    F: FnMut(u64) -> bool,
{
    items.into_iter().filter(move |&i| cond(i))
}

/// Find the first or last `i` in `[begin, end]` where `cond(i)` is true.
///
/// Each endpoint is evaluated once, then one interior point per halving, so
/// `cond` runs at most `2 + ceil(log2(end - begin))` times. Fails with
/// `NoMatch` when neither endpoint satisfies `cond`.
pub fn binary_search<F>(begin: u64, end: u64, mut cond: F, pick: Pick) -> Result<u64>
where
    F: FnMut(u64) -> Result<bool>,
{
    if begin > end {
        return Err(LedgerToolError::NoMatch { begin, end });
    }
    let at_begin = cond(begin)?;
    let at_end = if begin == end { at_begin } else { cond(end)? };

    match (at_begin, at_end) {
        (true, true) => {
            return Ok(match pick {
                Pick::First => begin,
                Pick::Last => end,
            })
        }
        (false, false) => return Err(LedgerToolError::NoMatch { begin, end }),
        (true, false) if pick == Pick::First => return Ok(begin),
        (false, true) if pick == Pick::Last => return Ok(end),
        _ => {}
    }

    // cond(lo) == at_begin and cond(hi) != at_begin hold throughout.
    let (mut lo, mut hi) = (begin, end);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if cond(mid)? == at_begin {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(if at_begin { lo } else { hi })
}

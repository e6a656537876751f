//! Compact ledger range specifications.
//!
//! A specification is a comma separated list of tokens, each a number (`42`),
//! an inclusive range (`10-19`), a name (`closed`) or a range with named
//! endpoints (`first-last`). Sets are stored as disjoint runs so that a
//! server reporting millions of complete ledgers stays cheap to hold.

use crate::utils::{LedgerToolError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name -> ledger number. A `None` value is a known name with no number;
/// it contributes nothing to a parsed set.
pub type Aliases = BTreeMap<String, Option<u64>>;

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"^\d+$").expect("number regex");
    static ref NUMBER_RANGE: Regex = Regex::new(r"^(\d+)-(\d+)$").expect("range regex");
}

/// Set of ledger numbers kept as maximal runs `start -> end` (inclusive).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    runs: BTreeMap<u64, u64>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a specification, resolving names through `names`.
    pub fn parse(spec: &str, names: &Aliases) -> Result<Self> {
        let mut set = RangeSet::new();
        if spec.trim().is_empty() {
            return Ok(set);
        }
        for token in spec.split(',') {
            set.add_token(token.trim(), names)?;
        }
        Ok(set)
    }

    /// Union of several specifications.
    pub fn join<S: AsRef<str>>(specs: &[S], names: &Aliases) -> Result<Self> {
        let mut set = RangeSet::new();
        for spec in specs {
            set.extend_from(&RangeSet::parse(spec.as_ref(), names)?);
        }
        Ok(set)
    }

    fn add_token(&mut self, token: &str, names: &Aliases) -> Result<()> {
        if token.is_empty() {
            return Err(LedgerToolError::MalformedRange(token.to_string()));
        }
        if NUMBER.is_match(token) {
            let n = parse_number(token, token)?;
            self.insert(n);
            return Ok(());
        }
        if let Some(caps) = NUMBER_RANGE.captures(token) {
            let lo = parse_number(&caps[1], token)?;
            let hi = parse_number(&caps[2], token)?;
            return self.add_bounds(lo, hi, token);
        }
        if let Some(value) = names.get(token) {
            if let Some(n) = value {
                self.insert(*n);
            }
            return Ok(());
        }
        if let Some((lo, hi)) = token.split_once('-') {
            let lo = resolve_endpoint(lo, token, names)?;
            let hi = resolve_endpoint(hi, token, names)?;
            return self.add_bounds(lo, hi, token);
        }
        Err(LedgerToolError::UnknownName(token.to_string()))
    }

    fn add_bounds(&mut self, lo: u64, hi: u64, token: &str) -> Result<()> {
        if lo > hi {
            return Err(LedgerToolError::MalformedRange(token.to_string()));
        }
        self.insert_range(lo, hi);
        Ok(())
    }

    pub fn insert(&mut self, n: u64) {
        self.insert_range(n, n);
    }

    /// Insert `lo..=hi`, merging with any overlapping or adjacent run.
    pub fn insert_range(&mut self, lo: u64, hi: u64) {
        debug_assert!(lo <= hi);
        let mut start = lo;
        let mut end = hi;
        if let Some((&s, &e)) = self.runs.range(..=start).next_back() {
            if e.saturating_add(1) >= start {
                start = s;
                end = end.max(e);
            }
        }
        let absorbed: Vec<u64> = self
            .runs
            .range(start..)
            .take_while(|&(&s, _)| s <= end.saturating_add(1))
            .map(|(&s, _)| s)
            .collect();
        for s in absorbed {
            if let Some(e) = self.runs.remove(&s) {
                end = end.max(e);
            }
        }
        self.runs.insert(start, end);
    }

    pub fn extend_from(&mut self, other: &RangeSet) {
        for (&s, &e) in &other.runs {
            self.insert_range(s, e);
        }
    }

    pub fn contains(&self, n: u64) -> bool {
        self.runs
            .range(..=n)
            .next_back()
            .map_or(false, |(_, &e)| n <= e)
    }

    pub fn first(&self) -> Option<u64> {
        self.runs.keys().next().copied()
    }

    pub fn last(&self) -> Option<u64> {
        self.runs.values().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn len(&self) -> u64 {
        self.runs
            .iter()
            .fold(0u64, |acc, (&s, &e)| acc.saturating_add(e - s).saturating_add(1))
    }

    /// The `index`-th smallest member.
    pub fn nth(&self, index: u64) -> Option<u64> {
        let mut remaining = index;
        for (&s, &e) in &self.runs {
            let size = (e - s).saturating_add(1);
            if remaining < size {
                return Some(s + remaining);
            }
            remaining -= size;
        }
        None
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.runs.iter().flat_map(|(&s, &e)| s..=e)
    }

    /// Number of maximal runs.
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

fn parse_number(digits: &str, token: &str) -> Result<u64> {
    digits
        .parse()
        .map_err(|_| LedgerToolError::MalformedRange(token.to_string()))
}

fn resolve_endpoint(part: &str, token: &str, names: &Aliases) -> Result<u64> {
    if NUMBER.is_match(part) {
        return parse_number(part, token);
    }
    match names.get(part) {
        Some(Some(n)) => Ok(*n),
        Some(None) => Err(LedgerToolError::MalformedRange(token.to_string())),
        None if part.is_empty() || part.contains('-') => {
            Err(LedgerToolError::MalformedRange(token.to_string()))
        }
        None => Err(LedgerToolError::UnknownName(part.to_string())),
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (&s, &e)) in self.runs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if s == e {
                write!(f, "{}", s)?;
            } else {
                write!(f, "{}-{}", s, e)?;
            }
        }
        Ok(())
    }
}

impl FromStr for RangeSet {
    type Err = LedgerToolError;

    fn from_str(s: &str) -> Result<Self> {
        RangeSet::parse(s, &Aliases::new())
    }
}

impl FromIterator<u64> for RangeSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut set = RangeSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<u64> for RangeSet {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for n in iter {
            self.insert(n);
        }
    }
}

/// Render numbers in ascending order, consecutive runs collapsed to `a-b`.
pub fn format<I: IntoIterator<Item = u64>>(numbers: I) -> String {
    numbers.into_iter().collect::<RangeSet>().to_string()
}

/// True if every token is a number, a numeric range or one of `extra_names`.
/// Used to tell ledger arguments apart from command words.
pub fn is_range_like(spec: &str, extra_names: &[&str]) -> bool {
    !spec.is_empty()
        && spec.split(',').all(|token| {
            let token = token.trim();
            if NUMBER.is_match(token) || extra_names.contains(&token) {
                return true;
            }
            if let Some(caps) = NUMBER_RANGE.captures(token) {
                return matches!(
                    (caps[1].parse::<u64>(), caps[2].parse::<u64>()),
                    (Ok(lo), Ok(hi)) if lo <= hi
                );
            }
            match token.split_once('-') {
                Some((lo, hi)) => [lo, hi]
                    .iter()
                    .all(|p| NUMBER.is_match(p) || extra_names.contains(p)),
                None => false,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pairs: &[(&str, Option<u64>)]) -> Aliases {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn members(set: &RangeSet) -> Vec<u64> {
        set.iter().collect()
    }

    #[test]
    fn format_groups_consecutive_runs() {
        assert_eq!(format(vec![12, 10, 11, 19]), "10-12,19");
        assert_eq!(format(vec![5]), "5");
        assert_eq!(format(vec![3, 4]), "3-4");
        assert_eq!(format(Vec::new()), "");
        assert_eq!(format(vec![1, 1, 3, 5, 6, 7]), "1,3,5-7");
    }

    #[test]
    fn parse_numbers_and_ranges() {
        let set: RangeSet = "10,19,42-45".parse().unwrap();
        assert_eq!(members(&set), vec![10, 19, 42, 43, 44, 45]);
        assert_eq!(set.len(), 6);
        assert_eq!(set.run_count(), 3);
    }

    #[test]
    fn parse_resolves_names() {
        let aliases = names(&[("first", Some(1)), ("last", Some(3)), ("current", Some(5))]);
        let set = RangeSet::parse("first,last,current", &aliases).unwrap();
        assert_eq!(members(&set), vec![1, 3, 5]);
    }

    #[test]
    fn name_without_value_contributes_nothing() {
        let aliases = names(&[("current", None), ("closed", Some(8))]);
        let set = RangeSet::parse("current,closed,2", &aliases).unwrap();
        assert_eq!(members(&set), vec![2, 8]);
    }

    #[test]
    fn named_endpoints_form_ranges() {
        let aliases = names(&[("first", Some(4)), ("last", Some(7)), ("current", None)]);
        let set = RangeSet::parse("first-last", &aliases).unwrap();
        assert_eq!(members(&set), vec![4, 5, 6, 7]);
        let set = RangeSet::parse("2-first", &aliases).unwrap();
        assert_eq!(members(&set), vec![2, 3, 4]);
        assert!(matches!(
            RangeSet::parse("first-current", &aliases),
            Err(LedgerToolError::MalformedRange(t)) if t == "first-current"
        ));
    }

    #[test]
    fn rejects_reversed_and_malformed_ranges() {
        assert!(matches!(
            "19-10".parse::<RangeSet>(),
            Err(LedgerToolError::MalformedRange(t)) if t == "19-10"
        ));
        assert!(matches!(
            "1-2-3".parse::<RangeSet>(),
            Err(LedgerToolError::MalformedRange(_))
        ));
        assert!(matches!(
            "3,,4".parse::<RangeSet>(),
            Err(LedgerToolError::MalformedRange(t)) if t.is_empty()
        ));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!(
            "10,latest".parse::<RangeSet>(),
            Err(LedgerToolError::UnknownName(t)) if t == "latest"
        ));
    }

    #[test]
    fn empty_spec_is_empty_set() {
        assert!("".parse::<RangeSet>().unwrap().is_empty());
    }

    #[test]
    fn duplicates_and_overlaps_collapse() {
        let set: RangeSet = "5-10,8-12,13,1,1".parse().unwrap();
        assert_eq!(set.to_string(), "1,5-13");
        assert_eq!(set.len(), 10);
    }

    #[test]
    fn insert_range_bridges_runs() {
        let mut set: RangeSet = "1-3,7-9".parse().unwrap();
        set.insert_range(4, 6);
        assert_eq!(set.to_string(), "1-9");
        assert_eq!(set.run_count(), 1);
    }

    #[test]
    fn membership_and_positions() {
        let set: RangeSet = "10-12,20,30-31".parse().unwrap();
        assert!(set.contains(11));
        assert!(!set.contains(13));
        assert!(set.contains(31));
        assert_eq!(set.first(), Some(10));
        assert_eq!(set.last(), Some(31));
        assert_eq!(set.nth(0), Some(10));
        assert_eq!(set.nth(3), Some(20));
        assert_eq!(set.nth(5), Some(31));
        assert_eq!(set.nth(6), None);
    }

    #[test]
    fn join_unions_specs() {
        let aliases = names(&[("closed", Some(100))]);
        let set = RangeSet::join(&["1-2", "closed", "2-3"], &aliases).unwrap();
        assert_eq!(set.to_string(), "1-3,100");
    }

    #[test]
    fn huge_ranges_stay_compact() {
        let set: RangeSet = "32570-80000000".parse().unwrap();
        assert_eq!(set.run_count(), 1);
        assert_eq!(set.len(), 80000000 - 32570 + 1);
        assert!(set.contains(50_000_000));
    }

    #[test]
    fn range_like_detection() {
        assert!(is_range_like("10-19,42", &[]));
        assert!(is_range_like("closed,5", &["closed"]));
        assert!(is_range_like("first-last", &["first", "last"]));
        assert!(!is_range_like("print", &["closed"]));
        assert!(!is_range_like("19-10", &[]));
        assert!(!is_range_like("", &[]));
        assert!(!is_range_like("10,", &[]));
    }
}

//! Randomised checks of the range and search algorithms against simple
//! models.

use crate::ledger::range::{format, Aliases};
use crate::ledger::{binary_search, linear_search, Pick, RangeSet};
use rand::Rng;
use std::collections::BTreeSet;

#[test]
fn fuzz_range_format_round_trip() {
    let mut rng = rand::thread_rng();

    for _ in 0..500 {
        let model: BTreeSet<u64> = (0..rng.gen_range(0..40))
            .map(|_| rng.gen_range(0..200))
            .collect();
        let text = format(model.iter().copied());
        let parsed = RangeSet::parse(&text, &Aliases::new()).unwrap();
        assert_eq!(parsed.iter().collect::<BTreeSet<_>>(), model, "{}", text);
        assert_eq!(parsed.to_string(), text);
    }
}

#[test]
fn fuzz_range_inserts_match_model() {
    let mut rng = rand::thread_rng();

    for _ in 0..300 {
        let mut set = RangeSet::new();
        let mut model = BTreeSet::new();
        for _ in 0..rng.gen_range(1..20) {
            let lo = rng.gen_range(0..300u64);
            let hi = lo + rng.gen_range(0..15);
            set.insert_range(lo, hi);
            model.extend(lo..=hi);
        }
        assert_eq!(set.len(), model.len() as u64);
        assert_eq!(set.first(), model.iter().next().copied());
        assert_eq!(set.last(), model.iter().next_back().copied());
        for (i, n) in model.iter().enumerate() {
            assert_eq!(set.nth(i as u64), Some(*n));
        }
        for n in 0..320 {
            assert_eq!(set.contains(n), model.contains(&n));
        }
    }
}

#[test]
fn fuzz_binary_search_agrees_with_linear() {
    let mut rng = rand::thread_rng();

    for _ in 0..1000 {
        let begin = rng.gen_range(0..1000u64);
        let end = begin + rng.gen_range(0..500);
        let threshold = rng.gen_range(begin.saturating_sub(5)..=end + 5);
        let rising = rng.gen_bool(0.5);
        let cond = |i: u64| if rising { i >= threshold } else { i < threshold };

        for pick in [Pick::First, Pick::Last] {
            let mut hits = linear_search(begin..=end, cond);
            let expected = match pick {
                Pick::First => hits.next(),
                Pick::Last => hits.last(),
            };
            let found = binary_search(begin, end, |i| Ok(cond(i)), pick).ok();
            assert_eq!(found, expected, "[{}, {}] threshold {} rising {}", begin, end, threshold, rising);
        }
    }
}

use kmer_trie::*;
use proptest::prelude::*;

// Both globs export a `Strategy`; pin the name to the predicate strategy
// enum and keep proptest's trait in scope anonymously for method calls.
use kmer_trie::Strategy;
use proptest::strategy::Strategy as _;

/// Brute-force baseline: apply every predicate to every key with the
/// comparator directly.
fn naive_search<'a>(
    keys: &'a [KMer],
    predicates: &[Predicate],
    mode: CompareMode,
) -> Vec<&'a KMer> {
    keys.iter()
        .filter(|k| {
            predicates.iter().all(|p| {
                p.strategy
                    .admits(compare(k.as_bytes(), p.bound.as_bytes(), mode))
            })
        })
        .collect()
}

fn build(keys: &[KMer], mode: CompareMode, capacity: usize) -> TrieIndex {
    let mut idx = TrieIndex::new(mode, capacity);
    for k in keys {
        idx.insert(k.clone());
    }
    idx
}

fn sorted_strings(keys: Vec<&KMer>) -> Vec<String> {
    let mut v: Vec<String> = keys.into_iter().map(|k| k.to_string()).collect();
    v.sort();
    v
}

fn acgt_kmer(len: std::ops::RangeInclusive<usize>) -> impl proptest::strategy::Strategy<Value = KMer> {
    prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), len)
        .prop_map(|bytes| KMer::from_bytes(&bytes).unwrap())
}

fn iupac_kmer() -> impl proptest::strategy::Strategy<Value = KMer> {
    prop::collection::vec(prop::sample::select(b"ACGTN".to_vec()), 4..=8)
        .prop_map(|bytes| KMer::from_bytes(&bytes).unwrap())
}

fn any_strategy() -> impl proptest::strategy::Strategy<Value = Strategy> {
    prop::sample::select(vec![
        Strategy::Eq,
        Strategy::Lt,
        Strategy::Le,
        Strategy::Gt,
        Strategy::Ge,
    ])
}

proptest! {
    // Range correctness: trie evaluation equals a linear scan, both
    // comparator modes, mixed key lengths, 1-2 conjunctive predicates.
    #[test]
    fn prop_range_matches_brute_force(
        keys in prop::collection::vec(acgt_kmer(4..=8), 1..120),
        bounds in prop::collection::vec(acgt_kmer(4..=8), 1..=2),
        strategies in prop::collection::vec(any_strategy(), 2),
        capacity in 1usize..=8,
        length_first in any::<bool>(),
    ) {
        let mode = if length_first {
            CompareMode::LengthFirst
        } else {
            CompareMode::ContentFirst
        };
        let predicates: Vec<Predicate> = bounds
            .into_iter()
            .zip(strategies)
            .map(|(b, s)| Predicate::new(s, b))
            .collect();

        let idx = build(&keys, mode, capacity);
        idx.check_invariants().unwrap();

        prop_assert_eq!(
            sorted_strings(idx.search(&predicates)),
            sorted_strings(naive_search(&keys, &predicates, mode))
        );
    }

    // EQ finds exactly the stored copies of a probe, and nothing for a
    // probe differing from every member.
    #[test]
    fn prop_eq_no_false_results(
        keys in prop::collection::vec(acgt_kmer(4..=6), 1..100),
        probe in acgt_kmer(4..=6),
        capacity in 1usize..=4,
    ) {
        let idx = build(&keys, CompareMode::LengthFirst, capacity);
        let expected = keys.iter().filter(|k| **k == probe).count();
        let hits = idx.search(&[Predicate::new(Strategy::Eq, probe.clone())]);
        prop_assert_eq!(hits.len(), expected);
        prop_assert!(hits.iter().all(|k| **k == probe));

        // Every stored member is reachable by its own EQ query.
        for k in keys.iter().take(10) {
            let hits = idx.search(&[Predicate::new(Strategy::Eq, k.clone())]);
            prop_assert!(hits.iter().any(|h| *h == k));
        }
    }

    // Split termination and the branch invariant, including ambiguous
    // symbols: the invariant walker verifies shared prefixes, label order,
    // and that only unsplittable leaf buckets exceed capacity.
    #[test]
    fn prop_structure_invariants(
        keys in prop::collection::vec(iupac_kmer(), 1..150),
        capacity in 1usize..=6,
    ) {
        let idx = build(&keys, CompareMode::LengthFirst, capacity);
        prop_assert_eq!(idx.len(), keys.len());
        idx.check_invariants().unwrap();
    }

    // Keys with ambiguous symbols stay reachable through leaf scans.
    #[test]
    fn prop_ambiguous_keys_reachable(
        keys in prop::collection::vec(iupac_kmer(), 1..60),
        capacity in 1usize..=3,
    ) {
        let idx = build(&keys, CompareMode::LengthFirst, capacity);
        for k in &keys {
            let hits = idx.search(&[Predicate::new(Strategy::Eq, k.clone())]);
            prop_assert!(hits.iter().any(|h| *h == k));
        }
    }
}

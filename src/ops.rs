//! Trie decision engine: the four callbacks that drive insertion-time
//! partitioning and query-time pruning, plus the index configuration report.
//!
//! Every function here is a pure computation over caller-supplied node and
//! key data: no I/O, no retained state, no mutation of inputs. The host owns
//! node storage and applies the reported decisions (a `pick_split` outcome
//! must be applied as one atomic structural update).
//!
//! Symbol-vs-label comparisons use raw byte order. That agrees with the
//! canonical ordinal A < C < G < T and extends soundly to ambiguous IUPAC
//! bytes appearing in a query bound, because the content-first comparator is
//! itself a byte-wise comparison.

use std::cmp::Ordering;

use crate::nucleotide::{ALPHABET, MAX_FANOUT, is_canonical};
use crate::sequence::{CompareMode, KMer, compare};

/// Ordering strategy attached to a query bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Strategy {
    /// Whether a stored key with ordering `ord` relative to the bound
    /// satisfies this strategy. Shared by leaf checks and tests.
    #[inline]
    pub fn admits(self, ord: Ordering) -> bool {
        match self {
            Strategy::Eq => ord == Ordering::Equal,
            Strategy::Lt => ord == Ordering::Less,
            Strategy::Le => ord != Ordering::Greater,
            Strategy::Gt => ord == Ordering::Greater,
            Strategy::Ge => ord != Ordering::Less,
        }
    }
}

/// One query condition: a strategy and its bound key. Multiple predicates
/// are conjunctive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub strategy: Strategy,
    pub bound: KMer,
}

impl Predicate {
    pub fn new(strategy: Strategy, bound: KMer) -> Self {
        Predicate { strategy, bound }
    }
}

/// Static capabilities reported to the host index framework.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Branch fan-out bound (canonical alphabet size).
    pub alphabet_size: usize,
    /// Whether indexed keys may differ in length.
    pub variable_length: bool,
    /// Leaves store the full key, so the index can return indexed values.
    pub can_return_indexed_value: bool,
}

/// Report the trie's static configuration for the given comparator mode.
pub fn configure(mode: CompareMode) -> IndexConfig {
    IndexConfig {
        alphabet_size: MAX_FANOUT,
        variable_length: mode == CompareMode::ContentFirst,
        can_return_indexed_value: true,
    }
}

/// Insertion decision for one key at one node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChooseResult {
    /// Insertion terminates in this node's bucket: the key is exhausted at
    /// `level`, or its symbol at `level` cannot label a branch.
    Leaf,
    /// Descend into the existing child at this index.
    Descend(usize),
    /// No child carries the key's symbol; the host must add one with this
    /// label and re-drive the insertion.
    AddChild(u8),
}

/// Decide where an insertion key goes at a node with the given child labels.
pub fn choose(level: usize, labels: &[u8], key: &KMer) -> ChooseResult {
    let Some(symbol) = key.symbol_at(level) else {
        return ChooseResult::Leaf;
    };
    // Ambiguous symbols never label a branch; such keys stay resident and
    // are found by the leaf scan.
    if !is_canonical(symbol) {
        return ChooseResult::Leaf;
    }
    match labels.iter().position(|&l| l == symbol) {
        Some(i) => ChooseResult::Descend(i),
        None => ChooseResult::AddChild(symbol),
    }
}

/// Outcome of splitting an overfull bucket at `level`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitResult {
    /// One group per distinct canonical symbol observed, labeled with it,
    /// in A < C < G < T order. Members are indices into the input slice.
    pub groups: Vec<(u8, Vec<usize>)>,
    /// Keys that cannot branch at `level`: exhausted keys and keys with a
    /// non-canonical symbol there. They stay in a leaf bucket.
    pub exhausted: Vec<usize>,
}

/// Partition a bucket of co-located keys by their symbol at `level`.
///
/// Grouping is an exact-match partition, so the result is deterministic and
/// needs no tie-breaking. A single-group outcome (all keys share the next
/// symbol) is legal: the caller re-splits the lone child one level deeper
/// until keys actually distribute, bounded by the maximum key length.
pub fn pick_split(level: usize, keys: &[&KMer]) -> SplitResult {
    let mut members: [Vec<usize>; MAX_FANOUT] = Default::default();
    let mut exhausted = Vec::new();

    for (i, key) in keys.iter().enumerate() {
        match key.symbol_at(level).and_then(crate::nucleotide::code) {
            Some(c) => members[c as usize].push(i),
            None => exhausted.push(i),
        }
    }

    let groups = ALPHABET
        .iter()
        .zip(members)
        .filter(|(_, m)| !m.is_empty())
        .map(|(&label, m)| (label, m))
        .collect();

    SplitResult { groups, exhausted }
}

/// Per-predicate verdict for one child branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Verdict {
    /// No key under the child can satisfy the predicate.
    Exclude,
    /// Every key under the child satisfies the predicate; it must not be
    /// re-evaluated against deeper symbols of the bound (doing so would
    /// compare unrelated positions and wrongly prune).
    Conclusive,
    /// The child's label equals the bound's symbol: order is still
    /// undecided and the predicate carries one level deeper.
    Inconclusive,
}

fn classify(strategy: Strategy, label: u8, bound_symbol: Option<u8>) -> Verdict {
    let Some(symbol) = bound_symbol else {
        // Bound exhausted: every key under a child extends the bound's
        // prefix and is therefore greater in content order.
        return match strategy {
            Strategy::Eq | Strategy::Lt | Strategy::Le => Verdict::Exclude,
            Strategy::Gt | Strategy::Ge => Verdict::Conclusive,
        };
    };
    match strategy {
        Strategy::Eq => {
            if label == symbol {
                Verdict::Inconclusive
            } else {
                Verdict::Exclude
            }
        }
        Strategy::Lt | Strategy::Le => match label.cmp(&symbol) {
            Ordering::Less => Verdict::Conclusive,
            Ordering::Equal => Verdict::Inconclusive,
            Ordering::Greater => Verdict::Exclude,
        },
        Strategy::Gt | Strategy::Ge => match label.cmp(&symbol) {
            Ordering::Greater => Verdict::Conclusive,
            Ordering::Equal => Verdict::Inconclusive,
            Ordering::Less => Verdict::Exclude,
        },
    }
}

/// One admitted child branch and the predicate state to carry below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descent {
    /// Index into the child label slice.
    pub child: usize,
    /// Levels to add before the next decision call (always 1: one symbol
    /// per edge).
    pub level_add: usize,
    /// Indices of the supplied predicates still inconclusive for this
    /// child. Conclusive predicates are dropped here and re-checked only by
    /// the authoritative leaf comparison.
    pub carry: Vec<usize>,
}

/// Select which child branches of a node a query must visit.
///
/// A child is admitted only if every predicate individually admits it
/// (conjunction). The pruning rules assume content order at the first
/// differing symbol; the host is responsible for withholding ordering
/// predicates that cannot prune soundly (length-first mode over
/// mixed-length keys).
pub fn inner_consistent(level: usize, labels: &[u8], predicates: &[Predicate]) -> Vec<Descent> {
    let mut out = Vec::with_capacity(labels.len());

    'child: for (child, &label) in labels.iter().enumerate() {
        let mut carry = Vec::new();
        for (p, pred) in predicates.iter().enumerate() {
            match classify(pred.strategy, label, pred.bound.symbol_at(level)) {
                Verdict::Exclude => continue 'child,
                Verdict::Conclusive => {}
                Verdict::Inconclusive => carry.push(p),
            }
        }
        out.push(Descent {
            child,
            level_add: 1,
            carry,
        });
    }

    out
}

/// Authoritative check of one stored key against the full predicate set.
///
/// Always performs the complete comparison with the mode-matching
/// comparator, regardless of what inner pruning concluded: buckets may hold
/// entries sharing a prefix deeper than the trie's current depth. The
/// returned recheck flag is always false; these comparisons are exact.
pub fn leaf_consistent(stored: &KMer, predicates: &[Predicate], mode: CompareMode) -> (bool, bool) {
    let matched = predicates.iter().all(|p| {
        let ord = compare(stored.as_bytes(), p.bound.as_bytes(), mode);
        p.strategy.admits(ord)
    });
    (matched, false)
}

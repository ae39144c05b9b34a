//! Trie-partitioned index for DNA k-mers.
//!
//! Stored k-mers are organized in a multi-way tree keyed one symbol per
//! level, so equality and ordered-range lookups prune whole subtrees instead
//! of scanning. The crate splits into a pure decision engine ([`ops`]: the
//! choose / pick-split / inner-consistent / leaf-consistent callbacks) and an
//! in-memory host ([`TrieIndex`]) that owns node storage and applies the
//! decisions.
//!
//! Two comparator variants are supported and matter: content-first ordering
//! for variable-length sequences, length-first for fixed-length k-mer
//! tokens. They coincide exactly when all indexed keys share one `k`.
//!
//! See README for the on-disk `.ktx` snapshot format.

pub mod builder;
pub mod nucleotide;
pub mod ops;
pub mod sequence;
mod snapshot;
mod trie;

pub use builder::{BuildConfig, build_trie_index_async, build_trie_index_sync};
pub use ops::{
    ChooseResult, Descent, IndexConfig, Predicate, SplitResult, Strategy, choose, configure,
    inner_consistent, leaf_consistent, pick_split,
};
pub use sequence::{CompareMode, DnaSeq, KMer, MAX_K, ParseError, compare};
pub use snapshot::{IndexError, KTX_MAGIC, KTX_VERSION, TrieSnapshotWriter, open_snapshot};
pub use trie::{EntryId, NodeId, TrieIndex};

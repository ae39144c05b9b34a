//! Sequence scalar types: `KMer` (fixed-length token) and `DnaSeq`
//! (variable-length sequence), plus the two comparator variants.
//!
//! Both types normalize to uppercase ASCII on parse and reject bytes outside
//! the IUPAC set, so everything downstream can assume legal symbols.
//!
//! Ordering conventions (deliberately different per type):
//! - `DnaSeq` is **content-first**: byte-for-byte up to the shorter length,
//!   ties broken by shorter-is-less. This is plain `[u8]` lexicographic order.
//! - `KMer` is **length-first**: compare `k`, then content. The two coincide
//!   whenever all keys share one `k`, which is the usual case for a k-mer
//!   collection, but they are not interchangeable for mixed lengths.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::nucleotide::{complement, is_valid};

/// Maximum supported k-mer length.
pub const MAX_K: usize = 32;

/// Errors from textual sequence input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Empty input where at least one symbol is required.
    #[error("k-mer cannot be empty")]
    Empty,
    /// A byte outside the IUPAC nucleotide set.
    #[error("invalid nucleotide character: {0:?}")]
    InvalidNucleotide(char),
    /// k-mer longer than [`MAX_K`].
    #[error("k-mer length {0} exceeds maximum {MAX_K}")]
    TooLong(usize),
    /// Window size outside `1..=sequence length`.
    #[error("k must be between 1 and sequence length")]
    WindowOutOfRange,
}

/// Which comparator variant to apply to a pair of keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareMode {
    /// Byte-for-byte up to the shorter length; shorter-is-less on ties.
    ContentFirst,
    /// Length decides first; content only breaks equal-length ties.
    LengthFirst,
}

/// Total order over two raw keys under the given mode.
#[inline]
pub fn compare(a: &[u8], b: &[u8], mode: CompareMode) -> Ordering {
    match mode {
        // Slice ordering on &[u8] is exactly memcmp-then-length.
        CompareMode::ContentFirst => a.cmp(b),
        CompareMode::LengthFirst => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
    }
}

fn normalize(s: &str) -> Result<Box<[u8]>, ParseError> {
    let mut data = Vec::with_capacity(s.len());
    for &b in s.as_bytes() {
        if !is_valid(b) {
            return Err(ParseError::InvalidNucleotide(b as char));
        }
        data.push(b.to_ascii_uppercase());
    }
    Ok(data.into_boxed_slice())
}

/// Fixed-length k-mer token. Immutable after construction; always uppercase.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KMer {
    data: Box<[u8]>,
}

impl KMer {
    /// Parse from raw bytes (validating, case-folding).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.is_empty() {
            return Err(ParseError::Empty);
        }
        if bytes.len() > MAX_K {
            return Err(ParseError::TooLong(bytes.len()));
        }
        let mut data = Vec::with_capacity(bytes.len());
        for &b in bytes {
            if !is_valid(b) {
                return Err(ParseError::InvalidNucleotide(b as char));
            }
            data.push(b.to_ascii_uppercase());
        }
        Ok(KMer {
            data: data.into_boxed_slice(),
        })
    }

    /// k, the token length.
    #[inline]
    pub fn k(&self) -> usize {
        self.data.len()
    }

    /// Raw uppercase symbol bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Symbol at trie depth `level`, or `None` once the key is exhausted.
    #[inline]
    pub fn symbol_at(&self, level: usize) -> Option<u8> {
        self.data.get(level).copied()
    }
}

impl FromStr for KMer {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KMer::from_bytes(s.as_bytes())
    }
}

impl fmt::Display for KMer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Data is validated ASCII.
        f.write_str(std::str::from_utf8(&self.data).expect("ascii"))
    }
}

impl PartialOrd for KMer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KMer {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.data, &other.data, CompareMode::LengthFirst)
    }
}

/// Variable-length DNA sequence. Content-first ordering; may be empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DnaSeq {
    data: Box<[u8]>,
}

impl DnaSeq {
    /// Sequence length in symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw uppercase symbol bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Per-symbol complement.
    pub fn complement(&self) -> DnaSeq {
        DnaSeq {
            data: self.data.iter().map(|&b| complement(b)).collect(),
        }
    }

    /// Reversed sequence.
    pub fn reverse(&self) -> DnaSeq {
        DnaSeq {
            data: self.data.iter().rev().copied().collect(),
        }
    }

    /// Reverse complement.
    pub fn reverse_complement(&self) -> DnaSeq {
        DnaSeq {
            data: self.data.iter().rev().map(|&b| complement(b)).collect(),
        }
    }

    /// All k-mers of the sequence in left-to-right window order.
    ///
    /// Errors if `k` is zero, over [`MAX_K`], or longer than the sequence.
    pub fn kmers(&self, k: usize) -> Result<Vec<KMer>, ParseError> {
        if k == 0 || k > self.data.len() {
            return Err(ParseError::WindowOutOfRange);
        }
        if k > MAX_K {
            return Err(ParseError::TooLong(k));
        }
        // Windows are already validated/uppercased; build tokens directly.
        Ok(self
            .data
            .windows(k)
            .map(|w| KMer {
                data: w.to_vec().into_boxed_slice(),
            })
            .collect())
    }
}

impl FromStr for DnaSeq {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DnaSeq { data: normalize(s)? })
    }
}

impl fmt::Display for DnaSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(std::str::from_utf8(&self.data).expect("ascii"))
    }
}

impl PartialOrd for DnaSeq {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DnaSeq {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(&self.data, &other.data, CompareMode::ContentFirst)
    }
}

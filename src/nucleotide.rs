//! Nucleotide alphabet tables: IUPAC validity, ambiguity, complement, 2-bit codes.
//!
//! All tables are 256-entry statics built at compile time and indexed by raw
//! byte, so the hot paths are branch-free lookups. Case-insensitive on input;
//! canonical storage form is uppercase ASCII.

/// Canonical branch alphabet in ascending byte order (A < C < G < T).
pub const ALPHABET: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Maximum fan-out of a trie node: one child per canonical letter.
pub const MAX_FANOUT: usize = ALPHABET.len();

const IUPAC: &[u8] = b"ACGTRYSWKMBDHVN-";
const AMBIGUOUS: &[u8] = b"RYSWKMBDHVN";

/// 256-entry LUT: true for legal IUPAC nucleotide codes (and the gap `-`).
pub static VALID_LUT: [bool; 256] = {
    let mut t = [false; 256];
    let mut i = 0;
    while i < IUPAC.len() {
        let c = IUPAC[i];
        t[c as usize] = true;
        t[c.to_ascii_lowercase() as usize] = true;
        i += 1;
    }
    t
};

/// 256-entry LUT: true for ambiguous IUPAC codes (anything but A/C/G/T/-).
pub static AMBIG_LUT: [bool; 256] = {
    let mut t = [false; 256];
    let mut i = 0;
    while i < AMBIGUOUS.len() {
        let c = AMBIGUOUS[i];
        t[c as usize] = true;
        t[c.to_ascii_lowercase() as usize] = true;
        i += 1;
    }
    t
};

/// 256-entry LUT: Watson-Crick complement, IUPAC-aware. Identity for bytes
/// with no defined complement.
pub static COMPLEMENT_LUT: [u8; 256] = {
    const PAIRS: &[(u8, u8)] = &[
        (b'A', b'T'),
        (b'T', b'A'),
        (b'C', b'G'),
        (b'G', b'C'),
        (b'R', b'Y'),
        (b'Y', b'R'),
        (b'S', b'S'),
        (b'W', b'W'),
        (b'K', b'M'),
        (b'M', b'K'),
        (b'B', b'V'),
        (b'V', b'B'),
        (b'D', b'H'),
        (b'H', b'D'),
        (b'N', b'N'),
        (b'-', b'-'),
    ];
    let mut t = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        t[i] = i as u8;
        i += 1;
    }
    let mut p = 0;
    while p < PAIRS.len() {
        let (from, to) = PAIRS[p];
        t[from as usize] = to;
        t[from.to_ascii_lowercase() as usize] = to.to_ascii_lowercase();
        p += 1;
    }
    t
};

/// 256-entry LUT: ASCII → 2-bit code (A=0, C=1, G=2, T=3), 0xFF otherwise.
pub static CODE_LUT: [u8; 256] = {
    const X: u8 = 0xFF;
    let mut t = [X; 256];
    t[b'A' as usize] = 0;
    t[b'a' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'c' as usize] = 1;
    t[b'G' as usize] = 2;
    t[b'g' as usize] = 2;
    t[b'T' as usize] = 3;
    t[b't' as usize] = 3;
    t
};

/// Legal IUPAC symbol (upstream validation entry point for the trie core).
#[inline]
pub fn is_valid(b: u8) -> bool {
    VALID_LUT[b as usize]
}

/// Ambiguity code (matches more than one canonical letter).
#[inline]
pub fn is_ambiguous(b: u8) -> bool {
    AMBIG_LUT[b as usize]
}

/// One of the four canonical branch letters (case-insensitive).
#[inline]
pub fn is_canonical(b: u8) -> bool {
    CODE_LUT[b as usize] <= 3
}

/// Complement of a nucleotide; identity if none is defined.
#[inline]
pub fn complement(b: u8) -> u8 {
    COMPLEMENT_LUT[b as usize]
}

/// 2-bit code for a canonical letter. `None` for ambiguous or illegal bytes.
#[inline]
pub fn code(b: u8) -> Option<u8> {
    let v = CODE_LUT[b as usize];
    if v <= 3 { Some(v) } else { None }
}

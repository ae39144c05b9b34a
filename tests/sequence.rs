use std::cmp::Ordering;

use kmer_trie::sequence::{CompareMode, DnaSeq, KMer, ParseError, compare};
use kmer_trie::nucleotide;

#[test]
fn test_parse_and_display() {
    let k: KMer = "acgt".parse().unwrap();
    assert_eq!(k.k(), 4);
    assert_eq!(k.to_string(), "ACGT");
    assert_eq!(k.as_bytes(), b"ACGT");

    let d: DnaSeq = "acgtN-".parse().unwrap();
    assert_eq!(d.to_string(), "ACGTN-");
}

#[test]
fn test_parse_errors() {
    assert_eq!("".parse::<KMer>(), Err(ParseError::Empty));
    assert_eq!(
        "ACXG".parse::<KMer>(),
        Err(ParseError::InvalidNucleotide('X'))
    );
    let long = "A".repeat(33);
    assert_eq!(long.parse::<KMer>(), Err(ParseError::TooLong(33)));
    // DnaSeq has no length cap and may be empty.
    assert!(long.parse::<DnaSeq>().is_ok());
    assert!("".parse::<DnaSeq>().is_ok());
}

#[test]
fn test_alphabet_tables() {
    for &b in b"ACGT" {
        assert!(nucleotide::is_valid(b));
        assert!(nucleotide::is_canonical(b));
        assert!(!nucleotide::is_ambiguous(b));
    }
    for &b in b"RYSWKMBDHVN" {
        assert!(nucleotide::is_valid(b));
        assert!(nucleotide::is_ambiguous(b));
        assert!(!nucleotide::is_canonical(b));
    }
    assert!(nucleotide::is_valid(b'-'));
    assert!(!nucleotide::is_valid(b'X'));
    assert!(nucleotide::is_valid(b'a'));

    assert_eq!(nucleotide::complement(b'A'), b'T');
    assert_eq!(nucleotide::complement(b'g'), b'c');
    assert_eq!(nucleotide::complement(b'R'), b'Y');
    assert_eq!(nucleotide::code(b'A'), Some(0));
    assert_eq!(nucleotide::code(b't'), Some(3));
    assert_eq!(nucleotide::code(b'N'), None);
}

#[test]
fn test_complement_reverse() {
    let d: DnaSeq = "AACGT".parse().unwrap();
    assert_eq!(d.complement().to_string(), "TTGCA");
    assert_eq!(d.reverse().to_string(), "TGCAA");
    assert_eq!(d.reverse_complement().to_string(), "ACGTT");
}

#[test]
fn test_kmer_windows() {
    let d: DnaSeq = "ACGTA".parse().unwrap();
    let ks = d.kmers(3).unwrap();
    let texts: Vec<String> = ks.iter().map(|k| k.to_string()).collect();
    assert_eq!(texts, vec!["ACG", "CGT", "GTA"]);

    assert_eq!(d.kmers(0), Err(ParseError::WindowOutOfRange));
    assert_eq!(d.kmers(6), Err(ParseError::WindowOutOfRange));
}

#[test]
fn test_content_first_order() {
    // Byte-for-byte up to the shorter length, shorter-is-less on ties.
    assert_eq!(
        compare(b"AAA", b"AAAC", CompareMode::ContentFirst),
        Ordering::Less
    );
    assert_eq!(
        compare(b"AC", b"AAAA", CompareMode::ContentFirst),
        Ordering::Greater
    );
    assert_eq!(
        compare(b"ACGT", b"ACGT", CompareMode::ContentFirst),
        Ordering::Equal
    );
}

#[test]
fn test_length_first_order() {
    // Length dominates; content only breaks equal-length ties.
    assert_eq!(
        compare(b"TTTT", b"AAAAA", CompareMode::LengthFirst),
        Ordering::Less
    );
    assert_eq!(
        compare(b"AC", b"AAAA", CompareMode::LengthFirst),
        Ordering::Less
    );
    assert_eq!(
        compare(b"ACGA", b"ACGT", CompareMode::LengthFirst),
        Ordering::Less
    );
}

#[test]
fn test_modes_coincide_for_uniform_length() {
    let keys = [b"AAAA", b"ACGT", b"TTTT", b"CCGA"];
    for a in keys {
        for b in keys {
            assert_eq!(
                compare(a, b, CompareMode::ContentFirst),
                compare(a, b, CompareMode::LengthFirst)
            );
        }
    }
}

#[test]
fn test_type_orders_match_modes() {
    let a: KMer = "TTTT".parse().unwrap();
    let b: KMer = "AAAAA".parse().unwrap();
    assert!(a < b); // length-first

    let c: DnaSeq = "TTTT".parse().unwrap();
    let d: DnaSeq = "AAAAA".parse().unwrap();
    assert!(c > d); // content-first
}

//! Bulk index construction: synchronous (rayon) and asynchronous (tokio)
//! pipelines over sequence-per-line text input.
//!
//! Lines are parsed and windowed into k-mers in parallel; insertion into the
//! trie is serial (the index is single-owner). Empty lines and `>` FASTA
//! headers are skipped.

use rayon::prelude::*;
use std::path::Path;

use crate::sequence::{CompareMode, DnaSeq};
use crate::trie::TrieIndex;

/// Build-time configuration.
#[derive(Clone)]
pub struct BuildConfig {
    capacity: usize,
    mode: CompareMode,
    skip_invalid: bool,
    threads: Option<usize>,
    async_buf_size: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            mode: CompareMode::LengthFirst,
            skip_invalid: false,
            threads: None,
            async_buf_size: 16 * 1024,
        }
    }
}

impl BuildConfig {
    /// Leaf bucket capacity before a split (default 64).
    pub fn with_capacity(mut self, c: usize) -> Self {
        self.capacity = c.max(1);
        self
    }
    /// Comparator variant for the built index (default length-first).
    pub fn mode(mut self, mode: CompareMode) -> Self {
        self.mode = mode;
        self
    }
    /// Skip unparsable lines and lines shorter than k instead of failing.
    pub fn skip_invalid(mut self, yes: bool) -> Self {
        self.skip_invalid = yes;
        self
    }
    /// Fix the number of threads used by rayon (sync build).
    pub fn threads(mut self, n: usize) -> Self {
        self.threads = Some(n);
        self
    }
    /// Async batch size (lines per batch).
    pub fn async_buf_size(mut self, n: usize) -> Self {
        self.async_buf_size = n.max(1);
        self
    }
}

/// Helper: map any error to `std::io::Error` with kind=InvalidData.
fn io_invalid<E: std::fmt::Display>(e: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{e}"))
}

fn relevant(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('>') {
        return None;
    }
    Some(line)
}

fn extract_batch(
    lines: &[String],
    k: usize,
    cfg: &BuildConfig,
) -> Result<Vec<crate::KMer>, std::io::Error> {
    let per_line: Vec<Result<Vec<crate::KMer>, std::io::Error>> = lines
        .par_iter()
        .filter_map(|l| relevant(l))
        .map(|line| {
            let seq: DnaSeq = line.parse().map_err(io_invalid)?;
            if seq.len() < k {
                return if cfg.skip_invalid {
                    Ok(Vec::new())
                } else {
                    Err(io_invalid(format!("sequence shorter than k={k}")))
                };
            }
            seq.kmers(k).map_err(io_invalid)
        })
        .collect();

    let mut out = Vec::new();
    for r in per_line {
        match r {
            Ok(mut ks) => out.append(&mut ks),
            Err(_) if cfg.skip_invalid => {}
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Build a trie index synchronously using rayon for parse/extract.
pub fn build_trie_index_sync(
    path: &Path,
    k: usize,
    cfg: BuildConfig,
) -> Result<TrieIndex, std::io::Error> {
    assert!(k > 0 && k <= crate::MAX_K, "k must be 1..=32");

    if let Some(n) = cfg.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok();
    }

    let text = std::fs::read_to_string(path)?;
    let lines: Vec<String> = text.lines().map(str::to_owned).collect();
    let kmers = extract_batch(&lines, k, &cfg)?;

    let mut idx = TrieIndex::new(cfg.mode, cfg.capacity);
    for km in kmers {
        idx.insert(km);
    }
    Ok(idx)
}

/// Build a trie index from async file input, batching lines and off-loading
/// parse/extract to the blocking pool.
#[cfg(feature = "async")]
pub async fn build_trie_index_async(
    path: &Path,
    k: usize,
    cfg: BuildConfig,
) -> Result<TrieIndex, std::io::Error> {
    use tokio::io::AsyncBufReadExt;

    assert!(k > 0 && k <= crate::MAX_K, "k must be 1..=32");

    let file = tokio::fs::File::open(path).await?;
    let mut lines = tokio::io::BufReader::new(file).lines();
    let mut idx = TrieIndex::new(cfg.mode, cfg.capacity);

    loop {
        let mut batch: Vec<String> = Vec::with_capacity(cfg.async_buf_size);
        while batch.len() < cfg.async_buf_size {
            match lines.next_line().await? {
                Some(line) => batch.push(line),
                None => break,
            }
        }
        if batch.is_empty() {
            break;
        }
        let cfg2 = cfg.clone();
        let kmers = tokio::task::spawn_blocking(move || extract_batch(&batch, k, &cfg2))
            .await
            .expect("spawn_blocking failed")?;
        for km in kmers {
            idx.insert(km);
        }
    }
    Ok(idx)
}

#[cfg(not(feature = "async"))]
pub async fn build_trie_index_async(
    _path: &Path,
    _k: usize,
    _cfg: BuildConfig,
) -> Result<TrieIndex, std::io::Error> {
    panic!("build_trie_index_async requires feature \"async\"");
}

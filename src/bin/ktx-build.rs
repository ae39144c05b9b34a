use clap::Parser;
use kmer_trie::{BuildConfig, CompareMode, TrieSnapshotWriter, build_trie_index_sync};
use std::path::PathBuf;

/// Build a `.ktx` trie index from sequence-per-line text.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input text path (one sequence per line; `>` headers skipped)
    #[arg(short, long)]
    input: PathBuf,

    /// Output `.ktx` path
    #[arg(short, long)]
    output: PathBuf,

    /// K-mer length (<= 32)
    #[arg(short = 'k', long)]
    k: usize,

    /// Leaf bucket capacity before a split
    #[arg(short = 'c', long, default_value_t = 64)]
    capacity: usize,

    /// Comparator: length|content
    #[arg(long, default_value = "length")]
    mode: String,

    /// Skip unparsable or too-short lines instead of failing
    #[arg(long, default_value_t = false)]
    skip_invalid: bool,

    /// Threads for the parse/extract stage
    #[arg(long)]
    threads: Option<usize>,
}

fn parse_mode(s: &str) -> CompareMode {
    match s {
        "content" | "dna" => CompareMode::ContentFirst,
        _ => CompareMode::LengthFirst,
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mode = parse_mode(&args.mode);

    let cfg = BuildConfig::default()
        .with_capacity(args.capacity)
        .mode(mode)
        .skip_invalid(args.skip_invalid);
    let cfg = match args.threads {
        Some(n) => cfg.threads(n),
        None => cfg,
    };

    let idx = build_trie_index_sync(&args.input, args.k, cfg)?;
    TrieSnapshotWriter::new(&idx).write_to(&args.output)?;
    eprintln!(
        "Built ktx: k={}, entries={}, nodes={}, capacity={}, mode={:?}",
        args.k,
        idx.len(),
        idx.node_count(),
        idx.capacity(),
        mode
    );

    Ok(())
}

//! In-memory trie index host: arena node storage plus the insert/search
//! drivers that apply the decisions reported by [`crate::ops`].
//!
//! Nodes live in a flat arena and are addressed by stable `u32` ids; the
//! root is id 0. The index is single-owner: callers needing concurrency must
//! serialize structural updates per subtree themselves (the decision engine
//! is pure and carries no state of its own).

use crate::nucleotide::is_canonical;
use crate::ops::{
    ChooseResult, Predicate, Strategy, choose, inner_consistent, leaf_consistent, pick_split,
};
use crate::sequence::{CompareMode, KMer};

pub type NodeId = u32;
pub type EntryId = u32;

/// One branch point. `labels[i]` is the edge symbol leading to
/// `children[i]`; `bucket` holds entries resident at this depth (all
/// entries for a childless node, otherwise only keys unbranchable at
/// `level`).
#[derive(Clone, Debug, Default)]
pub(crate) struct Node {
    pub(crate) level: usize,
    pub(crate) labels: Vec<u8>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) bucket: Vec<EntryId>,
}

/// Trie-partitioned k-mer index.
#[derive(Debug)]
pub struct TrieIndex {
    mode: CompareMode,
    capacity: usize,
    nodes: Vec<Node>,
    entries: Vec<KMer>,
    /// (min, max) key length seen; gates length-first range pruning.
    k_range: Option<(usize, usize)>,
}

impl TrieIndex {
    /// Create an empty index. `capacity` is the leaf bucket threshold: a
    /// childless node whose bucket exceeds it gets split.
    pub fn new(mode: CompareMode, capacity: usize) -> Self {
        assert!(capacity >= 1, "bucket capacity must be at least 1");
        TrieIndex {
            mode,
            capacity,
            nodes: vec![Node::default()],
            entries: Vec::new(),
            k_range: None,
        }
    }

    #[inline]
    pub fn mode(&self) -> CompareMode {
        self.mode
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of indexed entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of arena nodes (including the root).
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edge labels out of the root, ascending.
    pub fn root_child_labels(&self) -> Vec<u8> {
        self.nodes[0].labels.clone()
    }

    /// Insert one key. Duplicates are kept (the index is a multiset).
    pub fn insert(&mut self, key: KMer) {
        let mut node = 0usize;
        loop {
            let n = &self.nodes[node];
            if n.children.is_empty() {
                // Pure leaf bucket: insertion terminates here.
                break;
            }
            match choose(n.level, &n.labels, &key) {
                ChooseResult::Leaf => break,
                ChooseResult::Descend(i) => node = n.children[i] as usize,
                ChooseResult::AddChild(label) => {
                    let child = self.add_child(node, label);
                    node = child as usize;
                }
            }
        }

        let k = key.k();
        self.k_range = Some(match self.k_range {
            None => (k, k),
            Some((lo, hi)) => (lo.min(k), hi.max(k)),
        });

        let entry = self.entries.len() as EntryId;
        self.entries.push(key);
        self.nodes[node].bucket.push(entry);
        self.split_overfull(node);
    }

    fn add_child(&mut self, parent: usize, label: u8) -> NodeId {
        let level = self.nodes[parent].level + 1;
        let child = self.push_node(level);
        let pos = self.nodes[parent].labels.partition_point(|&l| l < label);
        self.nodes[parent].labels.insert(pos, label);
        self.nodes[parent].children.insert(pos, child);
        child
    }

    fn push_node(&mut self, level: usize) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            level,
            ..Node::default()
        });
        id
    }

    /// Split childless nodes whose bucket exceeds capacity, recursing into
    /// degenerate single-group children until keys distribute or nothing is
    /// branchable (same-prefix residents may legitimately stay overfull).
    fn split_overfull(&mut self, node: usize) {
        let mut pending = vec![node];
        while let Some(n) = pending.pop() {
            if !self.nodes[n].children.is_empty() {
                continue;
            }
            if self.nodes[n].bucket.len() <= self.capacity {
                continue;
            }
            let level = self.nodes[n].level;
            let bucket = std::mem::take(&mut self.nodes[n].bucket);

            let split = {
                let keys: Vec<&KMer> =
                    bucket.iter().map(|&e| &self.entries[e as usize]).collect();
                pick_split(level, &keys)
            };

            if split.groups.is_empty() {
                // Nothing branchable at this level; the bucket stays as is.
                self.nodes[n].bucket = bucket;
                continue;
            }

            // Apply the whole outcome before anything else can observe the
            // node: children first, then the residual bucket.
            for (label, members) in split.groups {
                let child = self.push_node(level + 1);
                self.nodes[child as usize].bucket =
                    members.into_iter().map(|i| bucket[i]).collect();
                self.nodes[n].labels.push(label);
                self.nodes[n].children.push(child);
                pending.push(child as usize);
            }
            self.nodes[n].bucket = split.exhausted.into_iter().map(|i| bucket[i]).collect();
        }
    }

    /// Evaluate a conjunctive predicate set, returning every matching entry.
    ///
    /// Descends via [`inner_consistent`] with per-branch carry sets and
    /// leaf-checks every visited bucket with the full predicate set.
    pub fn search(&self, predicates: &[Predicate]) -> Vec<&KMer> {
        let mut out = Vec::new();

        // Ordering predicates may only prune branches when symbol order
        // decides key order; under length-first comparison that requires a
        // single indexed length equal to the bound's.
        let prunable: Vec<Predicate> = predicates
            .iter()
            .filter(|p| self.prunes_soundly(p))
            .cloned()
            .collect();

        let mut stack: Vec<(usize, Vec<Predicate>)> = vec![(0, prunable)];
        while let Some((n, active)) = stack.pop() {
            let node = &self.nodes[n];
            for &e in &node.bucket {
                let stored = &self.entries[e as usize];
                let (matched, _recheck) = leaf_consistent(stored, predicates, self.mode);
                if matched {
                    out.push(stored);
                }
            }
            if node.children.is_empty() {
                continue;
            }
            if active.is_empty() {
                for &c in &node.children {
                    stack.push((c as usize, Vec::new()));
                }
            } else {
                for d in inner_consistent(node.level, &node.labels, &active) {
                    let carry: Vec<Predicate> =
                        d.carry.iter().map(|&i| active[i].clone()).collect();
                    stack.push((node.children[d.child] as usize, carry));
                }
            }
        }
        out
    }

    fn prunes_soundly(&self, p: &Predicate) -> bool {
        match p.strategy {
            // Equality implies identical symbols at every level in both
            // comparator variants.
            Strategy::Eq => true,
            _ => match self.mode {
                CompareMode::ContentFirst => true,
                CompareMode::LengthFirst => match self.k_range {
                    Some((lo, hi)) => lo == hi && lo == p.bound.k(),
                    None => true,
                },
            },
        }
    }

    /// Structural self-check used by the test suites. Verifies the branch
    /// invariant (shared prefix of length `level` under every node), label
    /// uniqueness and ordering, child depths, and leaf bucket capacity.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.check_node(0, &mut Vec::new())
    }

    fn check_node(&self, n: usize, prefix: &mut Vec<u8>) -> Result<(), String> {
        let node = &self.nodes[n];
        if node.level != prefix.len() {
            return Err(format!(
                "node {n}: level {} != path depth {}",
                node.level,
                prefix.len()
            ));
        }
        if node.labels.len() != node.children.len() {
            return Err(format!("node {n}: labels/children length mismatch"));
        }
        if !node.labels.windows(2).all(|w| w[0] < w[1]) {
            return Err(format!("node {n}: labels not strictly ascending"));
        }
        if node.labels.iter().any(|&l| !is_canonical(l)) {
            return Err(format!("node {n}: non-canonical edge label"));
        }

        for &e in &node.bucket {
            let key = self.entries[e as usize].as_bytes();
            let shared = key.len().min(node.level);
            if key[..shared] != prefix[..shared] {
                return Err(format!("node {n}: resident entry {e} breaks prefix"));
            }
            if node.children.is_empty() {
                continue;
            }
            // Residents of an inner node must be unbranchable at level.
            if let Some(&sym) = key.get(node.level) {
                if is_canonical(sym) {
                    return Err(format!("node {n}: branchable resident entry {e}"));
                }
            }
        }

        if node.children.is_empty() {
            let splittable = node
                .bucket
                .iter()
                .any(|&e| match self.entries[e as usize].as_bytes().get(node.level) {
                    Some(&s) => is_canonical(s),
                    None => false,
                });
            if node.bucket.len() > self.capacity && splittable {
                return Err(format!("node {n}: overfull splittable leaf bucket"));
            }
        }

        for (i, &c) in node.children.iter().enumerate() {
            prefix.push(node.labels[i]);
            self.check_node(c as usize, prefix)?;
            prefix.pop();
        }
        Ok(())
    }

    // -------- Internal accessors for the snapshot writer/reader --------

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn entries(&self) -> &[KMer] {
        &self.entries
    }

    pub(crate) fn k_range(&self) -> Option<(usize, usize)> {
        self.k_range
    }

    pub(crate) fn from_parts(
        mode: CompareMode,
        capacity: usize,
        nodes: Vec<Node>,
        entries: Vec<KMer>,
        k_range: Option<(usize, usize)>,
    ) -> Self {
        TrieIndex {
            mode,
            capacity,
            nodes,
            entries,
            k_range,
        }
    }
}

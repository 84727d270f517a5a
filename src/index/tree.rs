use crate::index::compose;
use crate::index::mapper::{Fragment, PathMap};
use crate::index::matcher::match_directory;
use crate::index::node::{Node, NodeArena};
use crate::index::pool::FragmentPool;
use crate::index::types::*;
use std::ops::ControlFlow;
use tracing::{debug, trace};

/// Nodes of one kind, bucketed by fragment hash.
///
/// Buckets are append-only; scans walk them newest first.
#[derive(Debug)]
struct BucketTable {
    buckets: Vec<Vec<NodeId>>,
    len: usize,
}

impl BucketTable {
    fn new() -> Self {
        Self {
            buckets: (0..PATH_HASH_SIZE).map(|_| Vec::new()).collect(),
            len: 0,
        }
    }

    #[inline]
    fn bucket(&self, hash: PathHash) -> &[NodeId] {
        &self.buckets[hash as usize]
    }

    fn push(&mut self, hash: PathHash, id: NodeId) {
        self.buckets[hash as usize].push(id);
        self.len += 1;
    }

    fn select(&self, filter: HashFilter) -> &[Vec<NodeId>] {
        match filter {
            HashFilter::Any => &self.buckets,
            HashFilter::Bucket(hash) => std::slice::from_ref(&self.buckets[hash as usize]),
        }
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }
}

/// Hierarchical index of delimited paths.
///
/// Paths are stored as a tree of shared fragments: inserting
/// `"textures/doors/metal1"` and `"textures/doors/metal2"` creates the
/// branches `textures` and `doors` once and two leaves under them.
/// Fragment text is interned, so every node at any depth with the same
/// name shares one copy of it.
///
/// Each node may carry a payload of type `P`. The index only stores and
/// returns payloads.
///
/// Hashing and matching ignore ASCII case; stored text keeps the case it
/// was first inserted with.
#[derive(Debug)]
pub struct PathIndex<P = ()> {
    config: IndexConfig,
    pool: FragmentPool,
    arena: NodeArena<P>,
    branches: BucketTable,
    leaves: BucketTable,
    size: usize,
}

impl<P> Default for PathIndex<P> {
    fn default() -> Self {
        Self::with_config(IndexConfig::default())
    }
}

impl<P> PathIndex<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            config,
            pool: FragmentPool::new(),
            arena: NodeArena::default(),
            branches: BucketTable::new(),
            leaves: BucketTable::new(),
            size: 0,
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Insert `path`, attaching `payload` to its leaf.
    ///
    /// Missing intermediate levels are created as branches. Inserting a
    /// path that is already present returns the existing leaf and replaces
    /// its payload, unless the index allows duplicate leaves, in which case
    /// a new leaf is created every time. Returns `None` for a path with no
    /// fragments (empty, or only delimiters).
    pub fn insert(&mut self, path: &str, delimiter: char, payload: P) -> Option<NodeId> {
        let map = PathMap::new(path, delimiter);
        let count = map.len();

        let mut parent = None;
        for (depth, fragment) in map.iter().rev().enumerate() {
            let kind = if depth + 1 == count {
                NodeKind::Leaf
            } else {
                NodeKind::Branch
            };
            parent = Some(self.node_for(parent, kind, fragment));
        }

        let leaf = parent?;
        self.arena[leaf].set_payload(payload);
        Some(leaf)
    }

    /// Find or create the node for `fragment` under `parent`
    fn node_for(&mut self, parent: Option<NodeId>, kind: NodeKind, fragment: &Fragment<'_>) -> NodeId {
        let hash = fragment.hash();
        let text = fragment.text();

        if kind == NodeKind::Branch || !self.config.allow_duplicate_leaves {
            if let Some(existing) = self.find_child(parent, kind, hash, text) {
                return existing;
            }
        }

        let fragment_id = self.pool.intern(text, hash);
        let hash = self.pool.hash(fragment_id);
        let id = self.arena.alloc(Node::new(kind, parent, fragment_id, hash));
        match kind {
            NodeKind::Branch => self.branches.push(hash, id),
            NodeKind::Leaf => {
                self.leaves.push(hash, id);
                self.size += 1;
            }
        }
        trace!(%kind, fragment = text, hash, slot = id.slot, "created node");
        id
    }

    fn find_child(
        &self,
        parent: Option<NodeId>,
        kind: NodeKind,
        hash: PathHash,
        text: &str,
    ) -> Option<NodeId> {
        let fragment_id = self.pool.id_of(text)?;
        self.table(kind)
            .bucket(hash)
            .iter()
            .rev()
            .copied()
            .find(|&id| {
                let node = &self.arena[id];
                node.parent() == parent && node.fragment_id() == fragment_id
            })
    }

    /// Find the first node matching `path`.
    ///
    /// `path` may use `*` and `?` in its last fragment, and a lone `*` for
    /// any other level. See [`match_directory`] for the exact rules.
    pub fn find(&self, flags: MatchFlags, path: &str, delimiter: char) -> Option<NodeId> {
        let map = PathMap::new(path, delimiter);
        self.search(flags, &map, match_directory)
    }

    /// Return the first candidate accepted by `predicate`.
    ///
    /// Candidates come from the bucket of the search path's deepest
    /// fragment, or from every bucket when that fragment contains glob
    /// metacharacters. Leaves are tried before branches, newest first
    /// within each bucket.
    pub fn search<F>(&self, flags: MatchFlags, search: &PathMap<'_>, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(&Self, NodeId, MatchFlags, &PathMap<'_>) -> bool,
    {
        let filter = candidate_filter(search)?;
        let scan = MatchFlags(flags.0 & !MatchFlags::MATCH_PARENT);
        self.iterate(scan, None, filter, |id, _| {
            if predicate(self, id, flags, search) {
                ControlFlow::Break(id)
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Every node matching `path`, in [`search`](Self::search) order
    pub fn find_all(&self, flags: MatchFlags, path: &str, delimiter: char) -> Vec<NodeId> {
        let map = PathMap::new(path, delimiter);
        let mut found = Vec::new();
        let Some(filter) = candidate_filter(&map) else {
            return found;
        };

        let scan = MatchFlags(flags.0 & !MatchFlags::MATCH_PARENT);
        self.iterate::<(), _>(scan, None, filter, |id, _| {
            if match_directory(self, id, flags, &map) {
                found.push(id);
            }
            ControlFlow::Continue(())
        });
        found
    }

    /// Visit nodes, leaves first, until `visitor` breaks.
    ///
    /// With [`MatchFlags::MATCH_PARENT`] only nodes whose immediate parent
    /// is `parent` are visited (`None` selects top-level nodes). Returns
    /// the value the visitor broke with, or `None` once every candidate has
    /// been seen.
    ///
    /// Panics if `hash` names a bucket outside `0..PATH_HASH_SIZE`.
    pub fn iterate<R, F>(
        &self,
        flags: MatchFlags,
        parent: Option<NodeId>,
        hash: HashFilter,
        mut visitor: F,
    ) -> Option<R>
    where
        F: FnMut(NodeId, &Node<P>) -> ControlFlow<R>,
    {
        check_hash_filter(hash);

        for kind in [NodeKind::Leaf, NodeKind::Branch] {
            if flags.excludes(kind) {
                continue;
            }
            for bucket in self.table(kind).select(hash) {
                for &id in bucket.iter().rev() {
                    let node = &self.arena[id];
                    if flags.match_parent() && node.parent() != parent {
                        continue;
                    }
                    if let ControlFlow::Break(value) = visitor(id, node) {
                        return Some(value);
                    }
                }
            }
        }

        None
    }

    /// Like [`iterate`](Self::iterate), with mutable access to each node's payload
    pub fn iterate_mut<R, F>(
        &mut self,
        flags: MatchFlags,
        parent: Option<NodeId>,
        hash: HashFilter,
        mut visitor: F,
    ) -> Option<R>
    where
        F: FnMut(NodeId, &mut Node<P>) -> ControlFlow<R>,
    {
        check_hash_filter(hash);

        for kind in [NodeKind::Leaf, NodeKind::Branch] {
            if flags.excludes(kind) {
                continue;
            }
            let table = match kind {
                NodeKind::Branch => &self.branches,
                NodeKind::Leaf => &self.leaves,
            };
            for bucket in table.select(hash) {
                for &id in bucket.iter().rev() {
                    let node = &mut self.arena[id];
                    if flags.match_parent() && node.parent() != parent {
                        continue;
                    }
                    if let ControlFlow::Break(value) = visitor(id, node) {
                        return Some(value);
                    }
                }
            }
        }

        None
    }

    /// Immediate children of `parent` (`None` for top-level nodes)
    pub fn children(&self, parent: Option<NodeId>, flags: MatchFlags) -> Vec<NodeId> {
        let mut children = Vec::new();
        let flags = flags | MatchFlags::MATCH_PARENT;
        self.iterate::<(), _>(flags, parent, HashFilter::Any, |id, _| {
            children.push(id);
            ControlFlow::Continue(())
        });
        children
    }

    /// Compose the path of every node passing `flags`
    pub fn collect_paths(&self, flags: MatchFlags, delimiter: char) -> Vec<String> {
        let mut paths = Vec::with_capacity(self.node_count());
        self.iterate::<(), _>(flags, None, HashFilter::Any, |id, _| {
            if let Some(path) = self.compose_path(id, delimiter) {
                paths.push(path);
            }
            ControlFlow::Continue(())
        });
        paths
    }

    /// Rebuild the delimited path of `node`; `None` if the handle is stale
    pub fn compose_path(&self, node: NodeId, delimiter: char) -> Option<String> {
        compose::compose_path(self, node, delimiter)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node<P>> {
        self.arena.get(id)
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<P>> {
        self.arena.get_mut(id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent()
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(Node::kind)
    }

    pub fn hash(&self, id: NodeId) -> Option<PathHash> {
        self.node(id).map(Node::hash)
    }

    /// Fragment text of `id`, as first inserted
    pub fn fragment(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|node| self.pool.text(node.fragment_id()))
    }

    pub fn payload(&self, id: NodeId) -> Option<&P> {
        self.node(id)?.payload()
    }

    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut P> {
        self.node_mut(id)?.payload_mut()
    }

    /// Attach `payload` to `id`, returning the previous one.
    ///
    /// A stale handle gives `payload` back as the error.
    pub fn set_payload(&mut self, id: NodeId, payload: P) -> Result<Option<P>, P> {
        match self.node_mut(id) {
            Some(node) => Ok(node.set_payload(payload)),
            None => Err(payload),
        }
    }

    pub fn take_payload(&mut self, id: NodeId) -> Option<P> {
        self.node_mut(id)?.take_payload()
    }

    /// Number of paths inserted, one per leaf created
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len
    }

    /// Number of distinct fragment names
    pub fn fragment_count(&self) -> usize {
        self.pool.len()
    }

    /// Node count of every bucket of `kind`, in hash order
    pub fn bucket_sizes(&self, kind: NodeKind) -> impl Iterator<Item = usize> + '_ {
        self.table(kind).buckets.iter().map(Vec::len)
    }

    /// Destroy every node and interned fragment, keeping the configuration.
    ///
    /// Payloads still attached are dropped; use
    /// [`clear_with`](Self::clear_with) to take them back first.
    pub fn clear(&mut self) {
        self.clear_with(drop);
    }

    /// Like [`clear`](Self::clear), handing each attached payload to `f`
    pub fn clear_with(&mut self, mut f: impl FnMut(P)) {
        let released = self.arena.len();
        self.arena.release_all(|mut node| {
            if let Some(payload) = node.take_payload() {
                f(payload);
            }
        });
        self.branches.clear();
        self.leaves.clear();
        self.pool.clear();
        self.size = 0;
        debug!(released, slots = self.arena.capacity(), epoch = self.arena.epoch(), "path index cleared");
    }

    pub(crate) fn pool(&self) -> &FragmentPool {
        &self.pool
    }

    fn table(&self, kind: NodeKind) -> &BucketTable {
        match kind {
            NodeKind::Branch => &self.branches,
            NodeKind::Leaf => &self.leaves,
        }
    }
}

/// Buckets worth scanning for `search`; `None` for an empty search path
fn candidate_filter(search: &PathMap<'_>) -> Option<HashFilter> {
    let first = search.fragment(0)?;
    if first.has_wildcards() {
        Some(HashFilter::Any)
    } else {
        Some(HashFilter::Bucket(first.hash()))
    }
}

fn check_hash_filter(hash: HashFilter) {
    if let HashFilter::Bucket(hash) = hash {
        assert!(
            (hash as usize) < PATH_HASH_SIZE,
            "hash {hash} outside bucket table of size {PATH_HASH_SIZE}"
        );
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Number of hash buckets in each node table.
pub const PATH_HASH_SIZE: usize = 512;

/// Hash of a single path fragment, always `< PATH_HASH_SIZE`
pub type PathHash = u16;

/// Identifier of an interned fragment in the [`FragmentPool`](super::pool::FragmentPool)
pub type FragmentId = u32;

/// Kind of an index node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum NodeKind {
    /// Intermediate directory level
    Branch = 0,
    /// Terminal segment of an inserted path
    Leaf = 1,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Branch => "branch",
            NodeKind::Leaf => "leaf",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to a node owned by a [`PathIndex`](super::PathIndex).
///
/// Handles are plain indices into the index's node arena. They carry the
/// epoch of the index that issued them, so a handle kept across
/// [`PathIndex::clear`](super::PathIndex::clear) no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) slot: u32,
    pub(crate) epoch: u32,
}

impl NodeId {
    /// Arena slot of this node
    pub fn slot(&self) -> u32 {
        self.slot
    }
}

/// Flags controlling search, find and iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchFlags(pub u16);

impl MatchFlags {
    pub const NONE: u16 = 0;
    /// Do not consider leaf nodes
    pub const NO_LEAF: u16 = 1 << 0;
    /// Do not consider branch nodes
    pub const NO_BRANCH: u16 = 1 << 1;
    /// Only visit nodes whose immediate parent is the given one
    pub const MATCH_PARENT: u16 = 1 << 2;
    /// The search path must cover the node's whole ancestor chain
    pub const MATCH_FULL: u16 = 1 << 3;

    pub fn new() -> Self {
        Self(Self::NONE)
    }

    pub fn no_leaf(&self) -> bool {
        self.0 & Self::NO_LEAF != 0
    }

    pub fn no_branch(&self) -> bool {
        self.0 & Self::NO_BRANCH != 0
    }

    pub fn match_parent(&self) -> bool {
        self.0 & Self::MATCH_PARENT != 0
    }

    pub fn match_full(&self) -> bool {
        self.0 & Self::MATCH_FULL != 0
    }

    /// Whether nodes of `kind` are excluded by these flags
    #[inline]
    pub fn excludes(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::Leaf => self.no_leaf(),
            NodeKind::Branch => self.no_branch(),
        }
    }
}

impl From<u16> for MatchFlags {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl BitOr for MatchFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<u16> for MatchFlags {
    type Output = Self;

    fn bitor(self, rhs: u16) -> Self {
        Self(self.0 | rhs)
    }
}

impl BitOrAssign<u16> for MatchFlags {
    fn bitor_assign(&mut self, rhs: u16) {
        self.0 |= rhs;
    }
}

/// Bucket selection for [`PathIndex::iterate`](super::PathIndex::iterate)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFilter {
    /// Scan every bucket
    Any,
    /// Scan only the bucket for this hash. Must be `< PATH_HASH_SIZE`.
    Bucket(PathHash),
}

impl From<PathHash> for HashFilter {
    fn from(hash: PathHash) -> Self {
        HashFilter::Bucket(hash)
    }
}

/// Construction-time configuration of a path index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Every leaf insertion creates a new node, even when an equal leaf
    /// already exists under the same parent
    #[serde(default)]
    pub allow_duplicate_leaves: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_combine() {
        let flags = MatchFlags::new() | MatchFlags::NO_LEAF | MatchFlags::MATCH_FULL;
        assert!(flags.no_leaf());
        assert!(flags.match_full());
        assert!(!flags.no_branch());
        assert!(!flags.match_parent());
    }

    #[test]
    fn test_flags_excludes() {
        let flags = MatchFlags(MatchFlags::NO_BRANCH);
        assert!(flags.excludes(NodeKind::Branch));
        assert!(!flags.excludes(NodeKind::Leaf));
    }

    #[test]
    fn test_node_kind_display() {
        assert_eq!(NodeKind::Branch.to_string(), "branch");
        assert_eq!(NodeKind::Leaf.to_string(), "leaf");
    }

    #[test]
    fn test_node_kind_serializes_as_display_name() {
        assert_eq!(serde_json::to_string(&NodeKind::Leaf).unwrap(), r#""leaf""#);
        assert_eq!(serde_json::to_string(&NodeKind::Branch).unwrap(), r#""branch""#);
        let kind: NodeKind = serde_json::from_str(r#""branch""#).unwrap();
        assert_eq!(kind, NodeKind::Branch);
    }

    #[test]
    fn test_index_config_partial_json() {
        let config: IndexConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.allow_duplicate_leaves);
    }
}

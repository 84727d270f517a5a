//! Index nodes and the per-index node arena.

use crate::index::types::{FragmentId, NodeId, NodeKind, PathHash};
use std::ops::{Index, IndexMut};
use tracing::trace;

/// Slots added to the arena each time it runs out of room
pub const NODE_BLOCK_SIZE: usize = 256;

/// A node in a [`PathIndex`](super::PathIndex).
///
/// The parent is a non-owning handle into the same arena. The payload is
/// stored and handed back but never looked at.
#[derive(Debug, Clone)]
pub struct Node<P> {
    kind: NodeKind,
    parent: Option<NodeId>,
    fragment: FragmentId,
    hash: PathHash,
    payload: Option<P>,
}

impl<P> Node<P> {
    pub(crate) fn new(
        kind: NodeKind,
        parent: Option<NodeId>,
        fragment: FragmentId,
        hash: PathHash,
    ) -> Self {
        Self {
            kind,
            parent,
            fragment,
            hash,
            payload: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Leaf
    }

    #[inline]
    pub fn is_branch(&self) -> bool {
        self.kind == NodeKind::Branch
    }

    /// Enclosing node, `None` at the top level
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Interned id of this node's fragment text
    #[inline]
    pub fn fragment_id(&self) -> FragmentId {
        self.fragment
    }

    /// Hash of this node's fragment; also its bucket number
    #[inline]
    pub fn hash(&self) -> PathHash {
        self.hash
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn payload_mut(&mut self) -> Option<&mut P> {
        self.payload.as_mut()
    }

    /// Replace the payload, returning the previous one
    pub fn set_payload(&mut self, payload: P) -> Option<P> {
        self.payload.replace(payload)
    }

    pub fn take_payload(&mut self) -> Option<P> {
        self.payload.take()
    }
}

/// Slot storage for nodes.
///
/// Storage grows a block at a time and is never returned to the system
/// allocator while the index lives; [`release_all`](Self::release_all)
/// moves every slot onto the free list for reuse. Each release bumps the
/// epoch, which invalidates every handle issued before it.
#[derive(Debug)]
pub(crate) struct NodeArena<P> {
    slots: Vec<Option<Node<P>>>,
    free: Vec<u32>,
    epoch: u32,
    live: usize,
}

impl<P> Default for NodeArena<P> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            epoch: 0,
            live: 0,
        }
    }
}

impl<P> NodeArena<P> {
    pub fn alloc(&mut self, node: Node<P>) -> NodeId {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                if self.slots.len() == self.slots.capacity() {
                    self.slots.reserve_exact(NODE_BLOCK_SIZE);
                    trace!(capacity = self.slots.capacity(), "node arena grew by one block");
                }
                let slot = u32::try_from(self.slots.len())
                    .unwrap_or_else(|_| panic!("node arena exhausted at {} nodes", self.slots.len()));
                self.slots.push(None);
                slot
            }
        };

        self.slots[slot as usize] = Some(node);
        self.live += 1;
        NodeId {
            slot,
            epoch: self.epoch,
        }
    }

    /// Resolve a handle, rejecting stale ones
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node<P>> {
        if id.epoch != self.epoch {
            return None;
        }
        self.slots.get(id.slot as usize)?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<P>> {
        if id.epoch != self.epoch {
            return None;
        }
        self.slots.get_mut(id.slot as usize)?.as_mut()
    }

    /// Destroy every node, passing each one to `f`, and recycle the slots
    pub fn release_all(&mut self, mut f: impl FnMut(Node<P>)) {
        for slot in self.slots.iter_mut() {
            if let Some(node) = slot.take() {
                f(node);
            }
        }
        self.free.clear();
        self.free.extend((0..self.slots.len() as u32).rev());
        self.epoch = self.epoch.wrapping_add(1);
        self.live = 0;
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    /// Slots allocated so far, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

impl<P> Index<NodeId> for NodeArena<P> {
    type Output = Node<P>;

    fn index(&self, id: NodeId) -> &Node<P> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale node handle {id:?}"),
        }
    }
}

impl<P> IndexMut<NodeId> for NodeArena<P> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<P> {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("stale node handle {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(fragment: FragmentId) -> Node<u32> {
        Node::new(NodeKind::Leaf, None, fragment, 0)
    }

    #[test]
    fn test_alloc_and_get() {
        let mut arena = NodeArena::default();
        let a = arena.alloc(leaf(1));
        let b = arena.alloc(leaf(2));
        assert_ne!(a, b);
        assert_eq!(arena[a].fragment_id(), 1);
        assert_eq!(arena[b].fragment_id(), 2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_grows_in_blocks() {
        let mut arena = NodeArena::default();
        arena.alloc(leaf(0));
        assert!(arena.slots.capacity() >= NODE_BLOCK_SIZE);
        for i in 0..NODE_BLOCK_SIZE as u32 {
            arena.alloc(leaf(i));
        }
        assert!(arena.slots.capacity() >= 2 * NODE_BLOCK_SIZE);
    }

    #[test]
    fn test_release_all_recycles_slots_and_invalidates_handles() {
        let mut arena = NodeArena::default();
        let a = arena.alloc(leaf(1));
        arena.alloc(leaf(2));

        let mut released = 0;
        arena.release_all(|_| released += 1);
        assert_eq!(released, 2);
        assert_eq!(arena.len(), 0);
        assert!(arena.get(a).is_none());

        let c = arena.alloc(leaf(3));
        assert_eq!(c.slot(), 0);
        assert_ne!(c, a);
        assert_eq!(arena.capacity(), 2);
    }

    #[test]
    fn test_payload_accessors() {
        let mut node = leaf(0);
        assert!(node.payload().is_none());
        assert_eq!(node.set_payload(5), None);
        assert_eq!(node.set_payload(6), Some(5));
        *node.payload_mut().unwrap() += 1;
        assert_eq!(node.take_payload(), Some(7));
        assert!(node.payload().is_none());
    }

    #[test]
    #[should_panic(expected = "stale node handle")]
    fn test_index_with_stale_handle_panics() {
        let mut arena = NodeArena::default();
        let a = arena.alloc(leaf(1));
        arena.release_all(|_| {});
        let _ = &arena[a];
    }
}

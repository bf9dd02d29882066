use crate::attribute::AttributeKind;
use crate::handle::{AdapterHandle, NodeHandle};
use crate::kind::NodeKind;
use crate::tree::DirtyFlags;
use std::collections::VecDeque;

/// Change notifications for the rendering engine.
///
/// Every successful mutation queues one or more patches; the engine drains them with
/// [`NodeTree::patches`](crate::NodeTree::patches) and brings its own state up to date.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    /// A node was created.
    Create(NodeHandle, NodeKind),
    /// A node was disposed. The handle no longer resolves.
    Dispose(NodeHandle),
    /// The node's list of structural children changed.
    Children(NodeHandle),
    /// An attribute was set or reset.
    Attribute(NodeHandle, AttributeKind),
    /// `(adopter, adopted)`
    Adopt(NodeHandle, NodeHandle),
    /// `(adopter, adopted)`
    Unadopt(NodeHandle, NodeHandle),
    /// Flags were added to a node.
    Dirty(NodeHandle, DirtyFlags),
    /// An adapter now supplies the node's children.
    AdapterAttach(NodeHandle, AdapterHandle),
    /// The node's adapter was detached.
    AdapterDetach(NodeHandle, AdapterHandle),
    /// The adapter's item count or contents changed; its items should be realized again.
    AdapterChanged(AdapterHandle),
}

/// Draining iterator over queued patches.
///
/// Calling `next` will always remove a patch from the queue.
pub struct Patches<'a>(&'a mut VecDeque<Patch>);

impl<'a> Patches<'a> {
    pub(crate) fn new(queue: &'a mut VecDeque<Patch>) -> Patches<'a> {
        Patches(queue)
    }
}

impl<'a> Iterator for Patches<'a> {
    type Item = Patch;
    fn next(&mut self) -> Option<Patch> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<'a> ExactSizeIterator for Patches<'a> {}

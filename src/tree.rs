use crate::adapter::NodeAdapter;
use crate::attribute::{AttributeKind, AttributeValue};
use crate::config::Config;
use crate::error::{Error, Result, STALE_NODE};
use crate::events::{EventReceiver, NodeEvents};
use crate::handle::{AdapterHandle, NodeHandle};
use crate::kind::NodeKind;
use crate::layout::LayoutState;
use crate::patch::{Patch, Patches};
use crate::task::TaskQueue;
use bitflags::bitflags;
use slotmap::SlotMap;
use core::any::Any;
use core::fmt;
use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use uuid::Uuid;

bitflags! {
    /// Pending engine passes for a node.
    ///
    /// Flags are added by mutations and by [`NodeTree::mark_dirty`], and cleared by the
    /// corresponding engine pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        const NEEDS_MEASURE = 1;
        const NEEDS_LAYOUT = 1 << 1;
        const NEEDS_RENDER = 1 << 2;
    }
}

/// A node record.
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) unique_id: Uuid,
    pub(crate) attributes: HashMap<AttributeKind, AttributeValue>,
    /// Structural children, in order.
    pub(crate) children: Vec<NodeHandle>,
    pub(crate) parent: Option<NodeHandle>,
    /// The node that adopted this one. Mutually exclusive with `parent`.
    pub(crate) adopter: Option<NodeHandle>,
    /// Nodes this node adopted.
    pub(crate) adopted: Vec<NodeHandle>,
    pub(crate) user_data: Option<Box<dyn Any>>,
    pub(crate) dirty: DirtyFlags,
    pub(crate) events: NodeEvents,
    pub(crate) layout: LayoutState,
    /// The adapter supplying this node's children.
    pub(crate) adapter: Option<AdapterHandle>,
    /// The adapter that realized this node as an item.
    pub(crate) item_of: Option<AdapterHandle>,
}

impl Node {
    fn new(kind: NodeKind) -> Node {
        Node {
            kind,
            unique_id: Uuid::new_v4(),
            attributes: HashMap::new(),
            children: Vec::new(),
            parent: None,
            adopter: None,
            adopted: Vec::new(),
            user_data: None,
            // a fresh node has never been through any pass
            dirty: DirtyFlags::all(),
            events: NodeEvents::default(),
            layout: LayoutState::default(),
            adapter: None,
            item_of: None,
        }
    }

    /// Returns true if the node is a tree child or adopted.
    pub(crate) fn is_owned(&self) -> bool {
        self.parent.is_some() || self.adopter.is_some()
    }
}

/// Where to insert a child.
#[derive(Debug, Clone, Copy)]
enum Position {
    End,
    Index(usize),
    Before(NodeHandle),
    After(NodeHandle),
}

/// A retained tree of nodes.
///
/// The tree owns every node record; callers hold [`NodeHandle`]s. All operations, and every
/// callback the tree makes into caller code, happen on the thread that owns the tree.
pub struct NodeTree {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    pub(crate) adapters: SlotMap<AdapterHandle, NodeAdapter>,
    pub(crate) global_receiver: Option<EventReceiver>,
    pub(crate) dispatch_depth: usize,
    pub(crate) config: Config,
    pub(crate) tasks: TaskQueue,
    patches: VecDeque<Patch>,
}

impl NodeTree {
    pub fn new() -> NodeTree {
        NodeTree::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> NodeTree {
        NodeTree {
            nodes: SlotMap::with_key(),
            adapters: SlotMap::with_key(),
            global_receiver: None,
            dispatch_depth: 0,
            config,
            tasks: TaskQueue::new(),
            patches: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn node(&self, node: NodeHandle) -> Result<&Node> {
        self.nodes.get(node).ok_or(STALE_NODE)
    }

    pub(crate) fn node_mut(&mut self, node: NodeHandle) -> Result<&mut Node> {
        self.nodes.get_mut(node).ok_or(STALE_NODE)
    }

    pub(crate) fn record(&mut self, patch: Patch) {
        if self.config.record_patches {
            self.patches.push_back(patch);
        }
    }

    /// Returns an iterator over queued patches.
    ///
    /// Does not drain the queue immediately.
    /// Calling `next` will always remove a patch from the queue.
    pub fn patches(&mut self) -> Patches<'_> {
        Patches::new(&mut self.patches)
    }

    /// Runs a caller callback. A panicking callback is logged, `cleanup` restores whatever
    /// bookkeeping the caller set up, and the panic continues unwinding.
    pub(crate) fn run_callback<R>(
        &mut self,
        what: &'static str,
        node: NodeHandle,
        callback: impl FnOnce(&mut NodeTree) -> R,
        cleanup: impl FnOnce(&mut NodeTree),
    ) -> R {
        match panic::catch_unwind(AssertUnwindSafe(|| callback(self))) {
            Ok(result) => result,
            Err(payload) => {
                cleanup(self);
                tracing::error!(?node, callback = what, "callback panicked");
                panic::resume_unwind(payload)
            }
        }
    }

    // -- registry --

    /// Creates a node of the given kind.
    pub fn create(&mut self, kind: NodeKind) -> Result<NodeHandle> {
        if self.config.unavailable_kinds.contains(&kind) {
            return Err(Error::Unavailable("node kind not supported by the engine"));
        }
        let handle = self.nodes.insert(Node::new(kind));
        tracing::debug!(node = ?handle, ?kind, "created node");
        self.record(Patch::Create(handle, kind));
        Ok(handle)
    }

    /// Disposes a node.
    ///
    /// Children are detached, not disposed: they stay alive as roots of their own subtrees.
    /// Adoption relations in both directions are cleared, and an attached adapter is detached.
    pub fn dispose(&mut self, node: NodeHandle) -> Result<()> {
        if self.node(node)?.adapter.is_some() {
            // releasing adapter items calls back into caller code
            self.detach_adapter(node)?;
            if !self.nodes.contains_key(node) {
                return Ok(());
            }
        }

        let record = self.nodes.remove(node).ok_or(STALE_NODE)?;

        if let Some(adapter) = record.item_of {
            self.forget_adapter_item(adapter, node);
        }
        if let Some(parent) = record.parent {
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.children.retain(|c| *c != node);
            }
            self.invalidate(parent, DirtyFlags::all());
            self.record(Patch::Children(parent));
        }
        if let Some(adopter) = record.adopter {
            if let Some(adopter_node) = self.nodes.get_mut(adopter) {
                adopter_node.adopted.retain(|c| *c != node);
            }
        }
        for adopted in record.adopted {
            if let Some(adopted_node) = self.nodes.get_mut(adopted) {
                adopted_node.adopter = None;
            }
        }
        for child in record.children {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = None;
            }
        }

        tracing::debug!(?node, kind = ?record.kind, "disposed node");
        self.record(Patch::Dispose(node));
        Ok(())
    }

    /// Returns true if the handle refers to a live node.
    pub fn contains(&self, node: NodeHandle) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub fn kind(&self, node: NodeHandle) -> Option<NodeKind> {
        self.nodes.get(node).map(|n| n.kind)
    }

    /// A UUID that identifies the node for as long as it lives.
    pub fn unique_id(&self, node: NodeHandle) -> Option<Uuid> {
        self.nodes.get(node).map(|n| n.unique_id)
    }

    /// Stores caller data on the node, replacing (and returning) any previous data.
    pub fn set_user_data<T: Any>(
        &mut self,
        node: NodeHandle,
        data: T,
    ) -> Result<Option<Box<dyn Any>>> {
        Ok(self.node_mut(node)?.user_data.replace(Box::new(data)))
    }

    pub fn user_data<T: Any>(&self, node: NodeHandle) -> Option<&T> {
        self.nodes.get(node)?.user_data.as_ref()?.downcast_ref()
    }

    pub fn user_data_mut<T: Any>(&mut self, node: NodeHandle) -> Option<&mut T> {
        self.nodes.get_mut(node)?.user_data.as_mut()?.downcast_mut()
    }

    pub fn take_user_data(&mut self, node: NodeHandle) -> Option<Box<dyn Any>> {
        self.nodes.get_mut(node)?.user_data.take()
    }

    pub fn dirty_flags(&self, node: NodeHandle) -> Option<DirtyFlags> {
        self.nodes.get(node).map(|n| n.dirty)
    }

    /// Adds dirty flags to a node. A pending measure also requires the ancestors to measure
    /// and lay out again.
    pub(crate) fn invalidate(&mut self, node: NodeHandle, flags: DirtyFlags) {
        if flags.is_empty() {
            return;
        }
        let mut parent = match self.nodes.get_mut(node) {
            Some(n) => {
                if !n.dirty.contains(flags) {
                    n.dirty |= flags;
                    self.record(Patch::Dirty(node, flags));
                }
                self.nodes.get(node).and_then(|n| n.parent)
            }
            None => return,
        };
        if !flags.contains(DirtyFlags::NEEDS_MEASURE) {
            return;
        }
        let ancestor_flags = DirtyFlags::NEEDS_MEASURE | DirtyFlags::NEEDS_LAYOUT;
        while let Some(ancestor) = parent {
            let node = match self.nodes.get_mut(ancestor) {
                Some(node) => node,
                None => break,
            };
            if node.dirty.contains(ancestor_flags) {
                // everything above is already dirty
                break;
            }
            node.dirty |= ancestor_flags;
            parent = node.parent;
            self.record(Patch::Dirty(ancestor, ancestor_flags));
        }
    }

    // -- mutation --

    /// Appends `child` to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.insert_child(parent, child, Position::End)
    }

    /// Inserts `child` before `sibling`, which must be a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeHandle,
        child: NodeHandle,
        sibling: NodeHandle,
    ) -> Result<()> {
        self.insert_child(parent, child, Position::Before(sibling))
    }

    /// Inserts `child` after `sibling`, which must be a child of `parent`.
    pub fn insert_after(
        &mut self,
        parent: NodeHandle,
        child: NodeHandle,
        sibling: NodeHandle,
    ) -> Result<()> {
        self.insert_child(parent, child, Position::After(sibling))
    }

    /// Inserts `child` at `index`; an index past the end appends.
    pub fn insert_at(&mut self, parent: NodeHandle, child: NodeHandle, index: usize) -> Result<()> {
        self.insert_child(parent, child, Position::Index(index))
    }

    fn insert_child(
        &mut self,
        parent: NodeHandle,
        child: NodeHandle,
        position: Position,
    ) -> Result<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;
        if parent == child {
            return Err(Error::InvalidParameter("a node cannot be its own child"));
        }
        if !parent_node.kind.accepts_children() {
            return Err(Error::UnsupportedForNodeKind(parent_node.kind));
        }
        if parent_node.adapter.is_some() {
            return Err(Error::InvalidParameter("children of this node come from its adapter"));
        }
        if child_node.parent.is_some() {
            return Err(Error::AlreadyOwned);
        }
        if child_node.adopter.is_some() {
            return Err(Error::AlreadyAdopted);
        }
        if self.is_ancestor(child, parent) {
            return Err(Error::InvalidParameter("inserting the node would create a cycle"));
        }

        let siblings = &parent_node.children;
        let index = match position {
            Position::End => siblings.len(),
            Position::Index(i) => i.min(siblings.len()),
            Position::Before(sibling) => siblings
                .iter()
                .position(|c| *c == sibling)
                .ok_or(Error::NotOnTree)?,
            Position::After(sibling) => {
                siblings
                    .iter()
                    .position(|c| *c == sibling)
                    .ok_or(Error::NotOnTree)?
                    + 1
            }
        };

        self.node_mut(parent)?.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.invalidate(parent, DirtyFlags::all());
        tracing::trace!(?parent, ?child, index, "inserted child");
        self.record(Patch::Children(parent));
        Ok(())
    }

    /// Returns true if `ancestor` is `node` or one of its ancestors.
    pub(crate) fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Removes `child` from `parent`. The child stays alive.
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.parent != Some(parent) {
            return Err(Error::NotOnTree);
        }
        if child_node.item_of.is_some() {
            return Err(Error::InvalidParameter("adapter items are released by their adapter"));
        }
        self.node_mut(parent)?.children.retain(|c| *c != child);
        self.node_mut(child)?.parent = None;
        self.invalidate(parent, DirtyFlags::all());
        tracing::trace!(?parent, ?child, "removed child");
        self.record(Patch::Children(parent));
        Ok(())
    }

    /// Adopts `child`. The relationship is recorded and reported as [`Patch::Adopt`]; `child`
    /// does not become part of the tree.
    pub fn adopt(&mut self, node: NodeHandle, child: NodeHandle) -> Result<()> {
        self.node(node)?;
        let child_node = self.node(child)?;
        if node == child {
            return Err(Error::InvalidParameter("a node cannot adopt itself"));
        }
        if child_node.parent.is_some() {
            return Err(Error::AlreadyOwned);
        }
        if child_node.adopter.is_some() {
            return Err(Error::AlreadyAdopted);
        }
        self.node_mut(child)?.adopter = Some(node);
        self.node_mut(node)?.adopted.push(child);
        tracing::trace!(?node, ?child, "adopted node");
        self.record(Patch::Adopt(node, child));
        Ok(())
    }

    /// Ends an adoption started with [`NodeTree::adopt`].
    pub fn remove_adopted(&mut self, node: NodeHandle, child: NodeHandle) -> Result<()> {
        self.node(node)?;
        if self.node(child)?.adopter != Some(node) {
            return Err(Error::NotOnTree);
        }
        self.node_mut(child)?.adopter = None;
        self.node_mut(node)?.adopted.retain(|c| *c != child);
        self.record(Patch::Unadopt(node, child));
        Ok(())
    }

    // -- traversal --

    pub fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(node)?.parent
    }

    pub fn adopter(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(node)?.adopter
    }

    /// Nodes adopted by `node`, in adoption order.
    pub fn adopted(&self, node: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(node).map_or(&[], |n| &n.adopted)
    }

    pub fn children(&self, node: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(node).map_or(&[], |n| &n.children)
    }

    pub fn child_count(&self, node: NodeHandle) -> usize {
        self.children(node).len()
    }

    pub fn child_at(&self, node: NodeHandle, index: usize) -> Option<NodeHandle> {
        self.children(node).get(index).copied()
    }

    pub fn first_child(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.children(node).first().copied()
    }

    pub fn last_child(&self, node: NodeHandle) -> Option<NodeHandle> {
        self.children(node).last().copied()
    }

    pub fn next_sibling(&self, node: NodeHandle) -> Option<NodeHandle> {
        let siblings = self.children(self.parent(node)?);
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }

    pub fn previous_sibling(&self, node: NodeHandle) -> Option<NodeHandle> {
        let siblings = self.children(self.parent(node)?);
        let index = siblings.iter().position(|c| *c == node)?;
        index.checked_sub(1).and_then(|i| siblings.get(i).copied())
    }
}

impl Default for NodeTree {
    fn default() -> NodeTree {
        NodeTree::new()
    }
}

impl fmt::Debug for NodeTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeTree")
            .field("nodes", &self.nodes.len())
            .field("adapters", &self.adapters.len())
            .field("global_receiver", &self.global_receiver.is_some())
            .field("dispatch_depth", &self.dispatch_depth)
            .field("pending_patches", &self.patches.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(kinds: &[NodeKind]) -> (NodeTree, Vec<NodeHandle>) {
        let mut tree = NodeTree::new();
        let nodes = kinds.iter().map(|k| tree.create(*k).unwrap()).collect();
        (tree, nodes)
    }

    #[test]
    fn insertion_positions() {
        let (mut tree, n) = tree_with(&[
            NodeKind::Column,
            NodeKind::Text,
            NodeKind::Text,
            NodeKind::Text,
            NodeKind::Text,
        ]);
        let (root, a, b, c, d) = (n[0], n[1], n[2], n[3], n[4]);
        tree.add_child(root, b).unwrap();
        tree.insert_before(root, a, b).unwrap();
        tree.insert_after(root, d, b).unwrap();
        tree.insert_at(root, c, 2).unwrap();
        assert_eq!(tree.children(root), &[a, b, c, d]);

        assert_eq!(tree.first_child(root), Some(a));
        assert_eq!(tree.last_child(root), Some(d));
        assert_eq!(tree.next_sibling(b), Some(c));
        assert_eq!(tree.previous_sibling(b), Some(a));
        assert_eq!(tree.previous_sibling(a), None);
        assert_eq!(tree.next_sibling(d), None);
        assert_eq!(tree.child_at(root, 3), Some(d));
        assert_eq!(tree.child_count(root), 4);
        assert_eq!(tree.parent(c), Some(root));
    }

    #[test]
    fn insert_at_past_end_appends() {
        let (mut tree, n) = tree_with(&[NodeKind::Row, NodeKind::Text, NodeKind::Text]);
        tree.add_child(n[0], n[1]).unwrap();
        tree.insert_at(n[0], n[2], 99).unwrap();
        assert_eq!(tree.children(n[0]), &[n[1], n[2]]);
    }

    #[test]
    fn insert_relative_to_foreign_sibling_fails() {
        let (mut tree, n) = tree_with(&[NodeKind::Row, NodeKind::Text, NodeKind::Text]);
        assert_eq!(tree.insert_before(n[0], n[1], n[2]), Err(Error::NotOnTree));
        assert_eq!(tree.parent(n[1]), None, "failed insert must not attach the child");
    }

    #[test]
    fn cycles_are_rejected() {
        let (mut tree, n) = tree_with(&[NodeKind::Stack, NodeKind::Stack, NodeKind::Stack]);
        tree.add_child(n[0], n[1]).unwrap();
        tree.add_child(n[1], n[2]).unwrap();
        assert!(matches!(tree.add_child(n[0], n[0]), Err(Error::InvalidParameter(_))));
        tree.remove_child(n[0], n[1]).unwrap();
        assert!(matches!(tree.add_child(n[2], n[1]), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn leaf_kinds_reject_children() {
        let (mut tree, n) = tree_with(&[NodeKind::Image, NodeKind::Text]);
        assert_eq!(
            tree.add_child(n[0], n[1]),
            Err(Error::UnsupportedForNodeKind(NodeKind::Image))
        );
    }

    #[test]
    fn ownership_is_exclusive() {
        let (mut tree, n) = tree_with(&[NodeKind::Stack, NodeKind::Stack, NodeKind::Text]);
        let (a, b, leaf) = (n[0], n[1], n[2]);
        tree.adopt(a, leaf).unwrap();
        assert_eq!(tree.add_child(b, leaf), Err(Error::AlreadyAdopted));
        assert_eq!(tree.adopt(b, leaf), Err(Error::AlreadyAdopted));
        assert_eq!(tree.children(b), &[] as &[NodeHandle]);
        assert_eq!(tree.adopter(leaf), Some(a));

        assert_eq!(tree.remove_adopted(b, leaf), Err(Error::NotOnTree));
        tree.remove_adopted(a, leaf).unwrap();
        tree.add_child(b, leaf).unwrap();
        assert_eq!(tree.adopt(a, leaf), Err(Error::AlreadyOwned));
        assert_eq!(tree.adopted(a), &[] as &[NodeHandle]);
    }

    #[test]
    fn dispose_detaches_children_and_clears_adoption() {
        let (mut tree, n) = tree_with(&[
            NodeKind::Column,
            NodeKind::Row,
            NodeKind::Text,
            NodeKind::Text,
            NodeKind::Stack,
        ]);
        let (root, row, text, adopted, adopter) = (n[0], n[1], n[2], n[3], n[4]);
        tree.add_child(root, row).unwrap();
        tree.add_child(row, text).unwrap();
        tree.adopt(row, adopted).unwrap();
        tree.adopt(adopter, row).unwrap_err();

        tree.dispose(row).unwrap();
        assert!(!tree.contains(row));
        assert!(tree.contains(text), "children outlive their parent");
        assert_eq!(tree.parent(text), None);
        assert_eq!(tree.adopter(adopted), None);
        assert_eq!(tree.children(root), &[] as &[NodeHandle]);
        assert_eq!(tree.dispose(row), Err(STALE_NODE));

        // the detached child can be reused
        tree.add_child(root, text).unwrap();
        tree.adopt(adopter, adopted).unwrap();
    }

    #[test]
    fn tree_mutation_dirties_parent_and_ancestors() {
        let (mut tree, n) = tree_with(&[NodeKind::Column, NodeKind::Row, NodeKind::Text]);
        tree.add_child(n[0], n[1]).unwrap();
        for node in &n {
            tree.node_mut(*node).unwrap().dirty = DirtyFlags::empty();
        }
        tree.add_child(n[1], n[2]).unwrap();
        assert_eq!(tree.dirty_flags(n[1]), Some(DirtyFlags::all()));
        assert_eq!(
            tree.dirty_flags(n[0]),
            Some(DirtyFlags::NEEDS_MEASURE | DirtyFlags::NEEDS_LAYOUT)
        );
    }

    #[test]
    fn adoption_is_reported_through_patches() {
        let (mut tree, n) = tree_with(&[NodeKind::Stack, NodeKind::Text]);
        tree.patches().count();
        tree.adopt(n[0], n[1]).unwrap();
        tree.remove_adopted(n[0], n[1]).unwrap();
        let patches: Vec<_> = tree.patches().collect();
        assert_eq!(patches, vec![Patch::Adopt(n[0], n[1]), Patch::Unadopt(n[0], n[1])]);
        assert_eq!(tree.parent(n[1]), None);
    }

    #[test]
    fn user_data_slot() {
        let (mut tree, n) = tree_with(&[NodeKind::Custom]);
        assert!(tree.set_user_data(n[0], 7u32).unwrap().is_none());
        *tree.user_data_mut::<u32>(n[0]).unwrap() += 1;
        assert_eq!(tree.user_data::<u32>(n[0]), Some(&8));
        assert_eq!(tree.user_data::<String>(n[0]), None);
        assert!(tree.take_user_data(n[0]).is_some());
        assert_eq!(tree.user_data::<u32>(n[0]), None);
    }

    #[test]
    fn unavailable_kinds_are_refused() {
        let mut tree = NodeTree::with_config(Config::default().with_unavailable_kind(NodeKind::XComponent));
        assert!(matches!(tree.create(NodeKind::XComponent), Err(Error::Unavailable(_))));
        assert!(tree.create(NodeKind::Text).is_ok());
    }

    #[test]
    fn patches_drain_in_order() {
        let (mut tree, n) = tree_with(&[NodeKind::Column, NodeKind::Text]);
        tree.add_child(n[0], n[1]).unwrap();
        let patches: Vec<_> = tree.patches().collect();
        assert_eq!(patches[0], Patch::Create(n[0], NodeKind::Column));
        assert_eq!(patches[1], Patch::Create(n[1], NodeKind::Text));
        assert!(patches.contains(&Patch::Children(n[0])));
        assert_eq!(tree.patches().count(), 0, "patches are consumed");
    }
}

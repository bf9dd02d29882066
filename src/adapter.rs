//! Node adapters.
//!
//! An adapter supplies the children of a scrollable container lazily. The caller tells the
//! adapter how many items exist and how that set changes (`insert_range`, `remove_range`, ...);
//! the engine decides which indices are needed and calls
//! [`NodeTree::realize_adapter_items`], which asks the adapter's receiver for item ids and
//! nodes.
//!
//! Edits are queued in call order. Each one is interpreted against the indices as they were
//! right before it, and they are applied one by one, never merged, when the engine next
//! realizes items. A cached item keeps its node across edits that only shift it; an item that
//! was reloaded is kept only if the receiver reports the same id for it again.

use crate::attribute::{AttributeKind, AttributeValue, ObjectRef};
use crate::error::{Error, Result, STALE_ADAPTER};
use crate::handle::{AdapterHandle, NodeHandle};
use crate::kind::NodeKind;
use crate::patch::Patch;
use crate::tree::{DirtyFlags, NodeTree};
use core::fmt;
use core::ops::Range;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

/// A caller callback that receives adapter events.
#[derive(Clone)]
pub struct AdapterReceiver(Rc<dyn Fn(&mut NodeTree, &mut AdapterEvent)>);

impl AdapterReceiver {
    pub fn new<F: 'static + Fn(&mut NodeTree, &mut AdapterEvent)>(receiver: F) -> Self {
        AdapterReceiver(Rc::new(receiver))
    }
}

impl fmt::Debug for AdapterReceiver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AdapterReceiver({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterEventType {
    /// The adapter is about to be attached to the host node.
    WillAttachToNode,
    /// The adapter is about to be detached from the host node.
    WillDetachFromNode,
    /// Report the id of the item at the index with [`AdapterEvent::set_node_id`]. Without a
    /// reply, the index itself is the id.
    GetNodeId,
    /// Supply the node for the item at the index with [`AdapterEvent::set_item`].
    AddNodeToAdapter,
    /// The adapter released [`AdapterEvent::removed_node`]. The node is detached from the host
    /// and owned by the caller again.
    RemoveNodeFromAdapter,
}

/// An adapter event. Only valid for the duration of the receiver call.
#[derive(Debug)]
pub struct AdapterEvent {
    ty: AdapterEventType,
    adapter: AdapterHandle,
    host: NodeHandle,
    index: usize,
    removed: Option<NodeHandle>,
    user_data: Option<ObjectRef>,
    item: Option<NodeHandle>,
    id: Option<u64>,
}

impl AdapterEvent {
    fn new(ty: AdapterEventType, adapter: AdapterHandle, host: NodeHandle) -> AdapterEvent {
        AdapterEvent {
            ty,
            adapter,
            host,
            index: 0,
            removed: None,
            user_data: None,
            item: None,
            id: None,
        }
    }

    pub fn event_type(&self) -> AdapterEventType {
        self.ty
    }

    pub fn adapter(&self) -> AdapterHandle {
        self.adapter
    }

    pub fn host_node(&self) -> NodeHandle {
        self.host
    }

    /// The item index, for `GetNodeId` and `AddNodeToAdapter`.
    pub fn item_index(&self) -> usize {
        self.index
    }

    /// The released node, for `RemoveNodeFromAdapter`.
    pub fn removed_node(&self) -> Option<NodeHandle> {
        self.removed
    }

    /// The data passed when the receiver was registered.
    pub fn user_data(&self) -> Option<&ObjectRef> {
        self.user_data.as_ref()
    }

    /// Supplies the item node. Only valid for `AddNodeToAdapter`.
    pub fn set_item(&mut self, node: NodeHandle) -> Result<()> {
        if self.ty != AdapterEventType::AddNodeToAdapter {
            return Err(Error::InvalidParameter("set_item is only valid when adding a node"));
        }
        self.item = Some(node);
        Ok(())
    }

    /// Reports the item id. Only valid for `GetNodeId`.
    pub fn set_node_id(&mut self, id: u64) -> Result<()> {
        if self.ty != AdapterEventType::GetNodeId {
            return Err(Error::InvalidParameter("set_node_id is only valid when asked for an id"));
        }
        self.id = Some(id);
        Ok(())
    }
}

/// A queued item edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterEdit {
    ReloadAll,
    Reload { start: usize, count: usize },
    Insert { start: usize, count: usize },
    Remove { start: usize, count: usize },
    Move { from: usize, to: usize },
}

#[derive(Debug, Clone, Copy)]
struct Item {
    id: u64,
    node: NodeHandle,
    /// Reloaded since it was created; the id must be checked again.
    stale: bool,
}

#[derive(Default)]
pub(crate) struct NodeAdapter {
    total_count: usize,
    pending: VecDeque<AdapterEdit>,
    host: Option<NodeHandle>,
    receiver: Option<(AdapterReceiver, Option<ObjectRef>)>,
    /// Realized items by index.
    items: BTreeMap<usize, Item>,
}

/// Moves every item at or after `from` up by `by`.
fn shift_up(items: &mut BTreeMap<usize, Item>, from: usize, by: usize) {
    let tail = items.split_off(&from);
    items.extend(tail.into_iter().map(|(index, item)| (index + by, item)));
}

/// Moves every item at or after `from` down by `by`. The `by` slots below `from` must be empty.
fn shift_down(items: &mut BTreeMap<usize, Item>, from: usize, by: usize) {
    let tail = items.split_off(&from);
    items.extend(tail.into_iter().map(|(index, item)| (index - by, item)));
}

/// Applies one edit to the item cache, collecting released nodes.
fn apply_edit(items: &mut BTreeMap<usize, Item>, edit: AdapterEdit, released: &mut Vec<NodeHandle>) {
    match edit {
        AdapterEdit::ReloadAll => {
            for item in items.values_mut() {
                item.stale = true;
            }
        }
        AdapterEdit::Reload { start, count } => {
            for (_, item) in items.range_mut(start..start + count) {
                item.stale = true;
            }
        }
        AdapterEdit::Insert { start, count } => shift_up(items, start, count),
        AdapterEdit::Remove { start, count } => {
            let mut removed = items.split_off(&start);
            let mut tail = removed.split_off(&(start + count));
            released.extend(removed.into_values().map(|item| item.node));
            shift_down(&mut tail, start + count, count);
            items.append(&mut tail);
        }
        AdapterEdit::Move { from, to } => {
            let moved = items.remove(&from);
            shift_down(items, from + 1, 1);
            shift_up(items, to, 1);
            if let Some(item) = moved {
                items.insert(to, item);
            }
        }
    }
}

/// The attribute that binds an adapter to a node of this kind.
fn adapter_attribute(kind: NodeKind) -> Option<AttributeKind> {
    match kind {
        NodeKind::List => Some(AttributeKind::LIST_NODE_ADAPTER),
        NodeKind::Grid => Some(AttributeKind::GRID_NODE_ADAPTER),
        NodeKind::WaterFlow => Some(AttributeKind::WATER_FLOW_NODE_ADAPTER),
        NodeKind::Swiper => Some(AttributeKind::SWIPER_NODE_ADAPTER),
        _ => None,
    }
}

impl NodeTree {
    fn adapter(&self, adapter: AdapterHandle) -> Result<&NodeAdapter> {
        self.adapters.get(adapter).ok_or(STALE_ADAPTER)
    }

    fn adapter_mut(&mut self, adapter: AdapterHandle) -> Result<&mut NodeAdapter> {
        self.adapters.get_mut(adapter).ok_or(STALE_ADAPTER)
    }

    /// Returns true if `adapter` is alive and attached to `host`.
    fn still_bound(&self, host: NodeHandle, adapter: AdapterHandle) -> bool {
        self.adapters.contains_key(adapter)
            && self.nodes.get(host).and_then(|n| n.adapter) == Some(adapter)
    }

    fn fire_adapter_event(&mut self, mut event: AdapterEvent) -> AdapterEvent {
        let receiver = self
            .adapters
            .get(event.adapter)
            .and_then(|a| a.receiver.clone());
        if let Some((receiver, user_data)) = receiver {
            event.user_data = user_data;
            let host = event.host;
            self.run_callback(
                "adapter receiver",
                host,
                |tree| (receiver.0)(tree, &mut event),
                |_| (),
            );
        }
        event
    }

    pub fn create_adapter(&mut self) -> AdapterHandle {
        let handle = self.adapters.insert(NodeAdapter::default());
        tracing::debug!(adapter = ?handle, "created adapter");
        handle
    }

    /// Disposes an adapter, detaching it from its host first.
    pub fn dispose_adapter(&mut self, adapter: AdapterHandle) -> Result<()> {
        if let Some(host) = self.adapter(adapter)?.host {
            self.detach_adapter(host)?;
        }
        if self.adapters.remove(adapter).is_some() {
            tracing::debug!(?adapter, "disposed adapter");
        }
        Ok(())
    }

    /// Sets the receiver, replacing any previous one.
    pub fn register_adapter_receiver(
        &mut self,
        adapter: AdapterHandle,
        user_data: Option<ObjectRef>,
        receiver: AdapterReceiver,
    ) -> Result<()> {
        self.adapter_mut(adapter)?.receiver = Some((receiver, user_data));
        Ok(())
    }

    pub fn unregister_adapter_receiver(&mut self, adapter: AdapterHandle) -> Result<()> {
        self.adapter_mut(adapter)?.receiver = None;
        Ok(())
    }

    /// Sets the number of items. Realized items past the new count are released when items
    /// are next realized.
    pub fn set_total_count(&mut self, adapter: AdapterHandle, count: usize) -> Result<()> {
        self.adapter_mut(adapter)?.total_count = count;
        self.record(Patch::AdapterChanged(adapter));
        Ok(())
    }

    pub fn total_count(&self, adapter: AdapterHandle) -> Option<usize> {
        self.adapters.get(adapter).map(|a| a.total_count)
    }

    /// Marks every item for reloading.
    pub fn reload_all(&mut self, adapter: AdapterHandle) -> Result<()> {
        self.queue_edit(adapter, AdapterEdit::ReloadAll)
    }

    /// Marks `count` items starting at `start` for reloading.
    pub fn reload_range(&mut self, adapter: AdapterHandle, start: usize, count: usize) -> Result<()> {
        self.queue_edit(adapter, AdapterEdit::Reload { start, count })
    }

    /// Inserts `count` items before `start`. `start` may equal the count to append.
    pub fn insert_range(&mut self, adapter: AdapterHandle, start: usize, count: usize) -> Result<()> {
        self.queue_edit(adapter, AdapterEdit::Insert { start, count })
    }

    /// Removes `count` items starting at `start`.
    pub fn remove_range(&mut self, adapter: AdapterHandle, start: usize, count: usize) -> Result<()> {
        self.queue_edit(adapter, AdapterEdit::Remove { start, count })
    }

    /// Moves the item at `from` so that it ends up at `to`.
    pub fn move_range(&mut self, adapter: AdapterHandle, from: usize, to: usize) -> Result<()> {
        self.queue_edit(adapter, AdapterEdit::Move { from, to })
    }

    fn queue_edit(&mut self, adapter: AdapterHandle, edit: AdapterEdit) -> Result<()> {
        let a = self.adapter_mut(adapter)?;
        let total = a.total_count;
        let end = |start: usize, count: usize| {
            start
                .checked_add(count)
                .ok_or(Error::InvalidParameter("item range overflows"))
        };
        match edit {
            AdapterEdit::ReloadAll => (),
            AdapterEdit::Reload { start, count } | AdapterEdit::Remove { start, count } => {
                if end(start, count)? > total {
                    return Err(Error::InvalidParameter("item range out of bounds"));
                }
                if count == 0 {
                    return Ok(());
                }
            }
            AdapterEdit::Insert { start, count } => {
                if start > total {
                    return Err(Error::InvalidParameter("insertion index out of bounds"));
                }
                end(total, count)?;
                if count == 0 {
                    return Ok(());
                }
            }
            AdapterEdit::Move { from, to } => {
                if from >= total || to >= total {
                    return Err(Error::InvalidParameter("item index out of bounds"));
                }
                if from == to {
                    return Ok(());
                }
            }
        }

        match edit {
            AdapterEdit::Insert { count, .. } => a.total_count += count,
            AdapterEdit::Remove { count, .. } => a.total_count -= count,
            _ => (),
        }
        a.pending.push_back(edit);
        tracing::trace!(?adapter, ?edit, total = a.total_count, "queued adapter edit");
        self.record(Patch::AdapterChanged(adapter));
        Ok(())
    }

    /// Edits queued since items were last realized, oldest first.
    pub fn pending_edits(&self, adapter: AdapterHandle) -> Vec<AdapterEdit> {
        self.adapters
            .get(adapter)
            .map_or_else(Vec::new, |a| a.pending.iter().copied().collect())
    }

    /// Attaches an adapter to a container with no children.
    pub fn attach_adapter(&mut self, host: NodeHandle, adapter: AdapterHandle) -> Result<()> {
        let host_node = self.node(host)?;
        let kind = host_node.kind;
        let attribute = match adapter_attribute(kind) {
            Some(attribute) => attribute,
            None => return Err(Error::UnsupportedForNodeKind(kind)),
        };
        match host_node.adapter {
            Some(existing) if existing == adapter => return Ok(()),
            Some(_) => return Err(Error::InvalidParameter("node already has an adapter")),
            None => (),
        }
        if !host_node.children.is_empty() {
            return Err(Error::InvalidParameter("node already has children"));
        }
        if self.adapter(adapter)?.host.is_some() {
            return Err(Error::AlreadyOwned);
        }

        self.fire_adapter_event(AdapterEvent::new(
            AdapterEventType::WillAttachToNode,
            adapter,
            host,
        ));
        let host_node = self.node(host)?;
        if host_node.adapter.is_some()
            || !host_node.children.is_empty()
            || self.adapter(adapter)?.host.is_some()
        {
            return Err(Error::InvalidParameter("tree changed while attaching the adapter"));
        }

        self.adapter_mut(adapter)?.host = Some(host);
        let host_node = self.node_mut(host)?;
        host_node.adapter = Some(adapter);
        host_node
            .attributes
            .insert(attribute, AttributeValue::object(ObjectRef::new(adapter)));
        self.invalidate(host, DirtyFlags::all());
        tracing::debug!(?host, ?adapter, "attached adapter");
        self.record(Patch::AdapterAttach(host, adapter));
        Ok(())
    }

    /// Binds an adapter through the node-adapter attribute: replaces any adapter already
    /// attached to the node.
    pub(crate) fn bind_adapter(&mut self, host: NodeHandle, adapter: AdapterHandle) -> Result<()> {
        let current = self.node(host)?.adapter;
        if current == Some(adapter) {
            return Ok(());
        }
        if self.adapter(adapter)?.host.is_some() {
            return Err(Error::AlreadyOwned);
        }
        if current.is_some() {
            self.detach_adapter(host)?;
        }
        self.attach_adapter(host, adapter)
    }

    /// Detaches the node's adapter, releasing every realized item.
    pub fn detach_adapter(&mut self, host: NodeHandle) -> Result<()> {
        let adapter = self.node(host)?.adapter.ok_or(Error::NotOnTree)?;
        self.fire_adapter_event(AdapterEvent::new(
            AdapterEventType::WillDetachFromNode,
            adapter,
            host,
        ));
        if !self.still_bound(host, adapter) {
            // the receiver already took care of it
            return Ok(());
        }

        let a = self.adapter_mut(adapter)?;
        a.host = None;
        a.pending.clear();
        let released: Vec<NodeHandle> = std::mem::take(&mut a.items)
            .into_values()
            .map(|item| item.node)
            .collect();
        let host_node = self.node_mut(host)?;
        host_node.adapter = None;
        if let Some(attribute) = adapter_attribute(host_node.kind) {
            host_node.attributes.remove(&attribute);
        }
        tracing::debug!(?host, ?adapter, released = released.len(), "detached adapter");
        self.record(Patch::AdapterDetach(host, adapter));
        self.release_items(adapter, host, released);
        self.invalidate(host, DirtyFlags::all());
        Ok(())
    }

    pub fn adapter_of(&self, host: NodeHandle) -> Option<AdapterHandle> {
        self.nodes.get(host)?.adapter
    }

    pub fn adapter_host(&self, adapter: AdapterHandle) -> Option<NodeHandle> {
        self.adapters.get(adapter)?.host
    }

    /// Realized item nodes, in index order.
    pub fn adapter_items(&self, adapter: AdapterHandle) -> Vec<NodeHandle> {
        self.adapters
            .get(adapter)
            .map_or_else(Vec::new, |a| a.items.values().map(|item| item.node).collect())
    }

    /// The realized node at `index`, if any.
    pub fn adapter_item(&self, adapter: AdapterHandle, index: usize) -> Option<NodeHandle> {
        self.adapters.get(adapter)?.items.get(&index).map(|item| item.node)
    }

    /// Forgets an item node that is being disposed.
    pub(crate) fn forget_adapter_item(&mut self, adapter: AdapterHandle, node: NodeHandle) {
        if let Some(a) = self.adapters.get_mut(adapter) {
            a.items.retain(|_, item| item.node != node);
        }
    }

    /// Detaches released items from the host and tells the receiver about each one.
    fn release_items(&mut self, adapter: AdapterHandle, host: NodeHandle, nodes: Vec<NodeHandle>) {
        if nodes.is_empty() {
            return;
        }
        for node in &nodes {
            if let Some(n) = self.nodes.get_mut(*node) {
                n.parent = None;
                n.item_of = None;
            }
        }
        if let Some(host_node) = self.nodes.get_mut(host) {
            host_node.children.retain(|c| !nodes.contains(c));
            self.invalidate(host, DirtyFlags::all());
            self.record(Patch::Children(host));
        }
        for node in nodes {
            let mut event =
                AdapterEvent::new(AdapterEventType::RemoveNodeFromAdapter, adapter, host);
            event.removed = Some(node);
            self.fire_adapter_event(event);
        }
    }

    /// Applies queued edits to the item cache.
    ///
    /// Called by [`NodeTree::realize_adapter_items`]; the engine may also call it directly.
    pub fn flush_adapter_edits(&mut self, adapter: AdapterHandle) -> Result<()> {
        let a = self.adapter_mut(adapter)?;
        let mut released = Vec::new();
        while let Some(edit) = a.pending.pop_front() {
            apply_edit(&mut a.items, edit, &mut released);
        }
        let total = a.total_count;
        released.extend(a.items.split_off(&total).into_values().map(|item| item.node));

        let host = a.host;
        match host {
            Some(host) => self.release_items(adapter, host, released),
            None => debug_assert!(released.is_empty(), "unattached adapter with items"),
        }
        Ok(())
    }

    /// Realizes the items in `window` for an adapter-bound container. Called by the engine.
    ///
    /// Flushes queued edits, releases items outside the window, asks the receiver for the id
    /// of every item that is new or was reloaded, keeps items whose id is unchanged, requests
    /// nodes for the rest, and finally puts the host's children in index order. The window is
    /// clipped to the item count.
    ///
    /// Returns the host's children.
    pub fn realize_adapter_items(
        &mut self,
        host: NodeHandle,
        window: Range<usize>,
    ) -> Result<Vec<NodeHandle>> {
        let adapter = self
            .node(host)?
            .adapter
            .ok_or(Error::InvalidParameter("node has no adapter"))?;
        if window.start > window.end {
            return Err(Error::InvalidParameter("malformed item window"));
        }
        self.flush_adapter_edits(adapter)?;

        let total = self.adapter(adapter)?.total_count;
        let window = window.start.min(total)..window.end.min(total);

        let a = self.adapter_mut(adapter)?;
        let outside: Vec<usize> = a
            .items
            .keys()
            .copied()
            .filter(|index| !window.contains(index))
            .collect();
        let released: Vec<NodeHandle> = outside
            .into_iter()
            .filter_map(|index| a.items.remove(&index))
            .map(|item| item.node)
            .collect();
        self.release_items(adapter, host, released);

        for index in window {
            if !self.still_bound(host, adapter) {
                break;
            }
            match self.adapter(adapter)?.items.get(&index) {
                Some(item) if !item.stale => continue,
                _ => (),
            }

            let id = self.query_item_id(adapter, host, index);
            if !self.still_bound(host, adapter) {
                break;
            }
            let replaced = {
                let items = &mut self.adapter_mut(adapter)?.items;
                match items.get_mut(&index) {
                    Some(item) if item.id == id => {
                        item.stale = false;
                        continue;
                    }
                    Some(_) => items.remove(&index).map(|item| item.node),
                    None => None,
                }
            };
            if let Some(node) = replaced {
                tracing::trace!(?adapter, index, "item id changed, recreating");
                self.release_items(adapter, host, vec![node]);
                if !self.still_bound(host, adapter) {
                    break;
                }
            }
            self.add_item(adapter, host, index, id);
        }

        if self.still_bound(host, adapter) {
            self.rebuild_host_children(host, adapter);
        }
        Ok(self.children(host).to_vec())
    }

    fn query_item_id(&mut self, adapter: AdapterHandle, host: NodeHandle, index: usize) -> u64 {
        let mut event = AdapterEvent::new(AdapterEventType::GetNodeId, adapter, host);
        event.index = index;
        self.fire_adapter_event(event).id.unwrap_or(index as u64)
    }

    fn add_item(&mut self, adapter: AdapterHandle, host: NodeHandle, index: usize, id: u64) {
        let mut event = AdapterEvent::new(AdapterEventType::AddNodeToAdapter, adapter, host);
        event.index = index;
        let node = match self.fire_adapter_event(event).item {
            Some(node) => node,
            None => {
                tracing::warn!(?adapter, index, "adapter receiver supplied no item");
                return;
            }
        };
        if !self.still_bound(host, adapter) {
            return;
        }
        let usable = match self.nodes.get(node) {
            Some(n) => !n.is_owned() && n.item_of.is_none() && !self.is_ancestor(node, host),
            None => false,
        };
        if !usable {
            tracing::warn!(?adapter, index, ?node, "adapter item is stale or already owned");
            return;
        }

        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = Some(host);
            n.item_of = Some(adapter);
        }
        let previous = self.adapters.get_mut(adapter).and_then(|a| {
            a.items.insert(
                index,
                Item {
                    id,
                    node,
                    stale: false,
                },
            )
        });
        if let Some(previous) = previous {
            self.release_items(adapter, host, vec![previous.node]);
        }
    }

    fn rebuild_host_children(&mut self, host: NodeHandle, adapter: AdapterHandle) {
        let order: Vec<NodeHandle> = match self.adapters.get(adapter) {
            Some(a) => a
                .items
                .values()
                .map(|item| item.node)
                .filter(|node| self.nodes.contains_key(*node))
                .collect(),
            None => return,
        };
        let changed = match self.nodes.get_mut(host) {
            Some(host_node) if host_node.children != order => {
                host_node.children = order;
                true
            }
            _ => false,
        };
        if changed {
            self.invalidate(host, DirtyFlags::all());
            self.record(Patch::Children(host));
        }
    }
}

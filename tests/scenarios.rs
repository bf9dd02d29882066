use cgmath::Point2;
use roost::events::StringRecord;
use roost::{
    AdapterEventType, AdapterHandle, AdapterReceiver, AttributeKind, AttributeValue, DirtyFlags,
    DisplayList, Error, EventPayload, EventReceiver, EventType, LayoutConstraint, NodeHandle,
    NodeKind, NodeTree, ObjectRef, Patch, TaggedNumber,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Runs every pass on each node so that none of them is dirty.
fn run_passes(tree: &mut NodeTree, nodes: &[NodeHandle]) {
    for node in nodes {
        tree.measure_node(*node, LayoutConstraint::unbounded()).unwrap();
        tree.layout_node(*node, Point2::new(0., 0.)).unwrap();
        tree.draw_node(*node, &mut DisplayList::new()).unwrap();
    }
}

#[test]
fn add_adopt_remove_adopt() {
    let mut tree = NodeTree::new();
    let a = tree.create(NodeKind::Stack).unwrap();
    let b = tree.create(NodeKind::Text).unwrap();

    tree.add_child(a, b).unwrap();
    assert_eq!(tree.adopt(a, b), Err(Error::AlreadyOwned));
    tree.remove_child(a, b).unwrap();
    tree.adopt(a, b).unwrap();

    assert_eq!(tree.adopter(b), Some(a));
    assert_eq!(tree.parent(b), None);
    assert_eq!(tree.child_count(a), 0);
}

#[test]
fn padding_expands_to_four_edges() {
    let mut tree = NodeTree::new();
    let node = tree.create(NodeKind::Column).unwrap();
    tree.set_attribute(node, AttributeKind::PADDING, &AttributeValue::floats(&[4.0]))
        .unwrap();
    let stored = tree.get_attribute(node, AttributeKind::PADDING).unwrap();
    assert_eq!(stored.len(), 4);
    for i in 0..4 {
        assert_eq!(stored.f32_at(i), Some(4.0));
    }
}

#[test]
fn dirty_flags_follow_attribute_classification() {
    let mut tree = NodeTree::new();
    let node = tree.create(NodeKind::Stack).unwrap();
    run_passes(&mut tree, &[node]);
    assert_eq!(tree.dirty_flags(node), Some(DirtyFlags::empty()));

    tree.set_attribute(
        node,
        AttributeKind::BACKGROUND_COLOR,
        &AttributeValue::uints(&[0xff33_6699]),
    )
    .unwrap();
    assert_eq!(tree.dirty_flags(node), Some(DirtyFlags::NEEDS_RENDER));

    tree.set_attribute(node, AttributeKind::HEIGHT, &AttributeValue::floats(&[32.]))
        .unwrap();
    assert_eq!(
        tree.dirty_flags(node),
        Some(DirtyFlags::NEEDS_MEASURE | DirtyFlags::NEEDS_LAYOUT | DirtyFlags::NEEDS_RENDER)
    );
}

#[test]
fn size_changes_invalidate_ancestors() {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeKind::Column).unwrap();
    let row = tree.create(NodeKind::Row).unwrap();
    let leaf = tree.create(NodeKind::Text).unwrap();
    tree.add_child(root, row).unwrap();
    tree.add_child(row, leaf).unwrap();
    run_passes(&mut tree, &[root, row, leaf]);

    tree.set_attribute(leaf, AttributeKind::WIDTH, &AttributeValue::floats(&[10.]))
        .unwrap();
    let expected = DirtyFlags::NEEDS_MEASURE | DirtyFlags::NEEDS_LAYOUT;
    assert!(tree.dirty_flags(row).unwrap().contains(expected));
    assert!(tree.dirty_flags(root).unwrap().contains(expected));
}

#[test]
fn receivers_run_in_order_then_global() {
    let mut tree = NodeTree::new();
    let node = tree.create(NodeKind::Button).unwrap();
    tree.register_node_event(node, EventType::Click, 1, None).unwrap();

    let log = Rc::new(RefCell::new(Vec::new()));
    let named = |name: &'static str| {
        let log = Rc::clone(&log);
        EventReceiver::new(move |_, _| log.borrow_mut().push(name))
    };
    tree.add_node_event_receiver(node, named("R1")).unwrap();
    tree.add_node_event_receiver(node, named("R2")).unwrap();
    tree.register_global_receiver(named("G"));

    let outcome = tree
        .dispatch_event(node, EventType::Click, EventPayload::Numeric(vec![]))
        .unwrap();
    assert_eq!(*log.borrow(), vec!["R1", "R2", "G"]);
    assert_eq!(outcome.delivered, 3);
}

#[test]
fn global_receiver_slot_is_last_write_wins() {
    let mut tree = NodeTree::new();
    let node = tree.create(NodeKind::Button).unwrap();
    tree.register_node_event(node, EventType::Click, 0, None).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    for name in ["first", "second"] {
        let log = Rc::clone(&log);
        tree.register_global_receiver(EventReceiver::new(move |_, _| log.borrow_mut().push(name)));
    }
    tree.dispatch_event(node, EventType::Click, EventPayload::Numeric(vec![]))
        .unwrap();
    assert_eq!(*log.borrow(), vec!["second"]);
}

#[test]
fn last_return_value_wins() {
    let mut tree = NodeTree::new();
    let input = tree.create(NodeKind::TextInput).unwrap();
    tree.register_node_event(input, EventType::TextInputWillInsert, 0, None)
        .unwrap();
    tree.add_node_event_receiver(
        input,
        EventReceiver::new(|_, event| {
            event.set_return_value(&[TaggedNumber::I32(1)]).unwrap();
        }),
    )
    .unwrap();
    tree.add_node_event_receiver(
        input,
        EventReceiver::new(|_, event| {
            assert_eq!(event.return_value(), Some(&[TaggedNumber::I32(1)][..]));
            if event.string() == Some("forbidden") {
                event.set_return_value(&[TaggedNumber::I32(0)]).unwrap();
            }
        }),
    )
    .unwrap();

    let payload = EventPayload::Text(StringRecord::new("forbidden"));
    let outcome = tree
        .dispatch_event(input, EventType::TextInputWillInsert, payload)
        .unwrap();
    assert_eq!(outcome.return_value, Some(vec![TaggedNumber::I32(0)]));

    let payload = EventPayload::Text(StringRecord::new("fine"));
    let outcome = tree
        .dispatch_event(input, EventType::TextInputWillInsert, payload)
        .unwrap();
    assert_eq!(outcome.return_value, Some(vec![TaggedNumber::I32(1)]));
}

#[test]
fn disposal_during_dispatch_skips_remaining_receivers() {
    let mut tree = NodeTree::new();
    let node = tree.create(NodeKind::Button).unwrap();
    tree.register_node_event(node, EventType::Click, 0, None).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));

    let log1 = Rc::clone(&log);
    tree.add_node_event_receiver(
        node,
        EventReceiver::new(move |tree, event| {
            log1.borrow_mut().push("disposer");
            tree.dispose(event.node()).unwrap();
        }),
    )
    .unwrap();
    let log2 = Rc::clone(&log);
    tree.add_node_event_receiver(
        node,
        EventReceiver::new(move |_, _| log2.borrow_mut().push("skipped")),
    )
    .unwrap();
    let log3 = Rc::clone(&log);
    tree.register_global_receiver(EventReceiver::new(move |_, _| {
        log3.borrow_mut().push("global")
    }));

    let outcome = tree
        .dispatch_event(node, EventType::Click, EventPayload::Numeric(vec![]))
        .unwrap();
    assert_eq!(*log.borrow(), vec!["disposer"]);
    assert_eq!(outcome.delivered, 1);
    assert!(!tree.contains(node));
}

#[test]
fn receivers_may_mutate_the_tree() {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeKind::Column).unwrap();
    tree.register_node_event(root, EventType::Appear, 0, None).unwrap();
    tree.add_node_event_receiver(
        root,
        EventReceiver::new(|tree, event| {
            let child = tree.create(NodeKind::Text).unwrap();
            tree.add_child(event.node(), child).unwrap();
        }),
    )
    .unwrap();
    tree.dispatch_event(root, EventType::Appear, EventPayload::Numeric(vec![]))
        .unwrap();
    assert_eq!(tree.child_count(root), 1);
}

/// Records adapter traffic and hands out `ListItem` nodes.
struct ItemSource {
    added: RefCell<Vec<usize>>,
    removed: RefCell<Vec<NodeHandle>>,
    ids: RefCell<Option<Vec<u64>>>,
    queries: Cell<usize>,
}

fn item_source() -> Rc<ItemSource> {
    Rc::new(ItemSource {
        added: RefCell::new(Vec::new()),
        removed: RefCell::new(Vec::new()),
        ids: RefCell::new(None),
        queries: Cell::new(0),
    })
}

fn adapter_receiver(source: &Rc<ItemSource>) -> AdapterReceiver {
    let source = Rc::clone(source);
    AdapterReceiver::new(move |tree, event| match event.event_type() {
        AdapterEventType::GetNodeId => {
            source.queries.set(source.queries.get() + 1);
            if let Some(ids) = &*source.ids.borrow() {
                event.set_node_id(ids[event.item_index()]).unwrap();
            }
        }
        AdapterEventType::AddNodeToAdapter => {
            source.added.borrow_mut().push(event.item_index());
            let node = tree.create(NodeKind::ListItem).unwrap();
            event.set_item(node).unwrap();
        }
        AdapterEventType::RemoveNodeFromAdapter => {
            let node = event.removed_node().unwrap();
            source.removed.borrow_mut().push(node);
            tree.dispose(node).unwrap();
        }
        _ => (),
    })
}

fn list_with_items(count: usize) -> (NodeTree, NodeHandle, AdapterHandle, Rc<ItemSource>) {
    let mut tree = NodeTree::new();
    let list = tree.create(NodeKind::List).unwrap();
    let adapter = tree.create_adapter();
    let source = item_source();
    tree.register_adapter_receiver(adapter, None, adapter_receiver(&source))
        .unwrap();
    tree.attach_adapter(list, adapter).unwrap();
    tree.set_total_count(adapter, count).unwrap();
    (tree, list, adapter, source)
}

#[test]
fn realizing_again_without_edits_changes_nothing() {
    let (mut tree, list, _, source) = list_with_items(6);
    let first = tree.realize_adapter_items(list, 0..6).unwrap();
    let queries = source.queries.get();
    assert_eq!(queries, 6);

    let second = tree.realize_adapter_items(list, 0..6).unwrap();
    assert_eq!(first, second);
    assert_eq!(source.queries.get(), queries, "cached items are not asked for ids again");
    assert_eq!(source.added.borrow().len(), 6);
    assert!(source.removed.borrow().is_empty());
}

#[test]
fn remove_then_insert_replaces_only_that_index() {
    let (mut tree, list, adapter, source) = list_with_items(6);
    let before = tree.realize_adapter_items(list, 0..6).unwrap();

    tree.remove_range(adapter, 2, 1).unwrap();
    tree.insert_range(adapter, 2, 1).unwrap();
    assert_eq!(tree.total_count(adapter), Some(6));
    let after = tree.realize_adapter_items(list, 0..6).unwrap();

    assert_ne!(after[2], before[2]);
    assert_eq!(&after[..2], &before[..2]);
    assert_eq!(&after[3..], &before[3..]);
    assert_eq!(*source.removed.borrow(), vec![before[2]]);
    assert_eq!(source.added.borrow().last(), Some(&2));
    assert!(!tree.contains(before[2]));
}

#[test]
fn remove_range_shifts_later_items_down() {
    let mut tree = NodeTree::new();
    let list = tree.create(NodeKind::List).unwrap();
    let adapter = tree.create_adapter();
    let source = item_source();
    tree.register_adapter_receiver(adapter, None, adapter_receiver(&source))
        .unwrap();
    tree.attach_adapter(list, adapter).unwrap();
    tree.set_total_count(adapter, 10).unwrap();

    let before = tree.realize_adapter_items(list, 0..10).unwrap();
    assert_eq!(before.len(), 10);
    assert_eq!(tree.children(list), &before[..]);

    tree.remove_range(adapter, 3, 2).unwrap();
    let after = tree.realize_adapter_items(list, 0..10).unwrap();
    assert_eq!(tree.total_count(adapter), Some(8));
    assert_eq!(after.len(), 8);
    assert_eq!(after[3], before[5], "index 3 now holds the former index 5");
    assert_eq!(tree.adapter_item(adapter, 3), Some(before[5]));
    assert_eq!(source.removed.borrow().len(), 2);
    assert!(!tree.contains(before[3]));
    assert_eq!(source.added.borrow().len(), 10, "surviving items are not re-created");
}

#[test]
fn adapter_items_keep_identity_across_edits() {
    let mut tree = NodeTree::new();
    let list = tree.create(NodeKind::List).unwrap();
    let adapter = tree.create_adapter();
    let source = item_source();
    tree.register_adapter_receiver(adapter, None, adapter_receiver(&source))
        .unwrap();
    tree.attach_adapter(list, adapter).unwrap();
    tree.set_total_count(adapter, 4).unwrap();
    let before = tree.realize_adapter_items(list, 0..4).unwrap();

    tree.insert_range(adapter, 0, 1).unwrap();
    tree.move_range(adapter, 4, 1).unwrap();
    let after = tree.realize_adapter_items(list, 0..5).unwrap();
    // [new, b0, b1, b2, b3] then move 4 -> 1: [new, b3, b0, b1, b2]
    assert_eq!(&after[1..], &[before[3], before[0], before[1], before[2]]);
    assert_eq!(*source.added.borrow(), vec![0, 1, 2, 3, 0]);
}

#[test]
fn reload_reuses_items_with_matching_ids() {
    let mut tree = NodeTree::new();
    let list = tree.create(NodeKind::List).unwrap();
    let adapter = tree.create_adapter();
    let source = item_source();
    *source.ids.borrow_mut() = Some(vec![10, 11, 12]);
    tree.register_adapter_receiver(adapter, None, adapter_receiver(&source))
        .unwrap();
    tree.attach_adapter(list, adapter).unwrap();
    tree.set_total_count(adapter, 3).unwrap();
    let before = tree.realize_adapter_items(list, 0..3).unwrap();

    *source.ids.borrow_mut() = Some(vec![10, 99, 12]);
    tree.reload_all(adapter).unwrap();
    let after = tree.realize_adapter_items(list, 0..3).unwrap();
    assert_eq!(after[0], before[0]);
    assert_ne!(after[1], before[1]);
    assert_eq!(after[2], before[2]);
    assert_eq!(*source.removed.borrow(), vec![before[1]]);
}

#[test]
fn window_limits_realized_items() {
    let mut tree = NodeTree::new();
    let grid = tree.create(NodeKind::Grid).unwrap();
    let adapter = tree.create_adapter();
    let source = item_source();
    tree.register_adapter_receiver(adapter, None, adapter_receiver(&source))
        .unwrap();
    tree.attach_adapter(grid, adapter).unwrap();
    tree.set_total_count(adapter, 100).unwrap();

    tree.realize_adapter_items(grid, 0..5).unwrap();
    let shown = tree.realize_adapter_items(grid, 3..8).unwrap();
    assert_eq!(shown.len(), 5);
    assert_eq!(source.removed.borrow().len(), 3);
    assert_eq!(*source.added.borrow(), vec![0, 1, 2, 3, 4, 5, 6, 7]);

    let clipped = tree.realize_adapter_items(grid, 98..120).unwrap();
    assert_eq!(clipped.len(), 2);
}

#[test]
fn adapter_attribute_binds_and_detach_releases_items() {
    let mut tree = NodeTree::new();
    let flow = tree.create(NodeKind::WaterFlow).unwrap();
    let adapter = tree.create_adapter();
    let events = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&events);
    tree.register_adapter_receiver(
        adapter,
        Some(ObjectRef::new("flow")),
        AdapterReceiver::new(move |tree, event| {
            assert_eq!(
                event.user_data().and_then(|d| d.downcast_ref::<&str>()).copied(),
                Some("flow")
            );
            seen.borrow_mut().push(event.event_type());
            match event.event_type() {
                AdapterEventType::AddNodeToAdapter => {
                    let node = tree.create(NodeKind::FlowItem).unwrap();
                    event.set_item(node).unwrap();
                }
                AdapterEventType::RemoveNodeFromAdapter => {
                    tree.dispose(event.removed_node().unwrap()).unwrap();
                }
                _ => (),
            }
        }),
    )
    .unwrap();

    let value = AttributeValue::object(ObjectRef::new(adapter));
    tree.set_attribute(flow, AttributeKind::WATER_FLOW_NODE_ADAPTER, &value)
        .unwrap();
    assert_eq!(tree.adapter_of(flow), Some(adapter));
    tree.set_total_count(adapter, 2).unwrap();
    let items = tree.realize_adapter_items(flow, 0..2).unwrap();
    assert_eq!(tree.adapter_items(adapter), items);

    tree.reset_attribute(flow, AttributeKind::WATER_FLOW_NODE_ADAPTER)
        .unwrap();
    assert_eq!(tree.adapter_of(flow), None);
    assert_eq!(tree.child_count(flow), 0);
    assert!(tree.adapter_items(adapter).is_empty());
    assert!(items.iter().all(|item| !tree.contains(*item)));

    let events = events.borrow();
    assert_eq!(events.first(), Some(&AdapterEventType::WillAttachToNode));
    assert!(events.contains(&AdapterEventType::WillDetachFromNode));
    let removals = events
        .iter()
        .filter(|e| **e == AdapterEventType::RemoveNodeFromAdapter)
        .count();
    assert_eq!(removals, 2);
}

#[test]
fn patches_describe_mutations() {
    let mut tree = NodeTree::new();
    let root = tree.create(NodeKind::Stack).unwrap();
    let child = tree.create(NodeKind::Image).unwrap();
    tree.add_child(root, child).unwrap();
    tree.set_attribute(child, AttributeKind::IMAGE_SRC, &AttributeValue::text("a.png"))
        .unwrap();
    tree.dispose(child).unwrap();

    let patches: Vec<Patch> = tree.patches().collect();
    let position = |p: &Patch| patches.iter().position(|q| q == p).unwrap();
    assert!(position(&Patch::Create(child, NodeKind::Image)) < position(&Patch::Children(root)));
    assert!(
        position(&Patch::Attribute(child, AttributeKind::IMAGE_SRC))
            < position(&Patch::Dispose(child))
    );
}

#[test]
fn stale_handles_are_rejected() {
    let mut tree = NodeTree::new();
    let node = tree.create(NodeKind::Text).unwrap();
    tree.dispose(node).unwrap();
    let reused = tree.create(NodeKind::Text).unwrap();
    assert_ne!(node, reused);
    assert!(matches!(
        tree.set_attribute(node, AttributeKind::WIDTH, &AttributeValue::floats(&[1.])),
        Err(Error::InvalidParameter(_))
    ));
    assert_eq!(tree.kind(node), None);
    assert_eq!(tree.child_count(node), 0);
}

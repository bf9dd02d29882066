//! Event registration, receivers and dispatch.

use super::{EventPayload, EventType, InputEvent, StringRecord, TouchTestInfo};
use crate::attribute::{ObjectRef, TaggedNumber};
use crate::error::{Error, Result};
use crate::handle::NodeHandle;
use crate::tree::NodeTree;
use core::fmt;
use std::collections::HashMap;
use std::rc::Rc;

/// A caller callback that receives node events.
///
/// Receivers are compared by identity: clone the receiver to keep a copy that can later be
/// passed to [`NodeTree::remove_node_event_receiver`].
#[derive(Clone)]
pub struct EventReceiver(Rc<dyn Fn(&mut NodeTree, &mut NodeEvent<'_>)>);

impl EventReceiver {
    pub fn new<F: 'static + Fn(&mut NodeTree, &mut NodeEvent<'_>)>(receiver: F) -> Self {
        EventReceiver(Rc::new(receiver))
    }

    fn ptr_eq(&self, other: &EventReceiver) -> bool {
        Rc::as_ptr(&self.0) as *const () == Rc::as_ptr(&other.0) as *const ()
    }
}

impl fmt::Debug for EventReceiver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventReceiver({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

#[derive(Debug, Clone)]
struct Registration {
    target_id: i32,
    user_data: Option<ObjectRef>,
}

/// Per-node event state.
#[derive(Debug, Default)]
pub(crate) struct NodeEvents {
    registrations: HashMap<EventType, Registration>,
    receivers: Vec<EventReceiver>,
}

/// An event being delivered to a receiver.
///
/// Only valid for the duration of the receiver call.
pub struct NodeEvent<'a> {
    ty: EventType,
    node: NodeHandle,
    registration: &'a Registration,
    payload: &'a EventPayload,
    return_value: &'a mut Option<Vec<TaggedNumber>>,
}

impl<'a> NodeEvent<'a> {
    pub fn event_type(&self) -> EventType {
        self.ty
    }

    /// The node the event was dispatched on.
    pub fn node(&self) -> NodeHandle {
        self.node
    }

    /// The caller-chosen id passed at registration.
    pub fn target_id(&self) -> i32 {
        self.registration.target_id
    }

    /// The caller data passed at registration.
    pub fn user_data(&self) -> Option<&ObjectRef> {
        self.registration.user_data.as_ref()
    }

    pub fn payload(&self) -> &EventPayload {
        self.payload
    }

    /// The numeric payload, for numeric events.
    pub fn numbers(&self) -> Option<&[TaggedNumber]> {
        match self.payload {
            EventPayload::Numeric(numbers) => Some(numbers),
            _ => None,
        }
    }

    /// One element of the numeric payload.
    pub fn number(&self, index: usize) -> Option<TaggedNumber> {
        self.numbers()?.get(index).copied()
    }

    /// The string record, for text events.
    pub fn string_record(&self) -> Option<&StringRecord> {
        match self.payload {
            EventPayload::Text(record) => Some(record),
            _ => None,
        }
    }

    /// Shorthand for the main text of the string record.
    pub fn string(&self) -> Option<&str> {
        self.string_record().map(|record| record.text.as_str())
    }

    pub fn input_event(&self) -> Option<&InputEvent> {
        match self.payload {
            EventPayload::Input(event) => Some(event),
            _ => None,
        }
    }

    pub fn touch_test_info(&self) -> Option<&TouchTestInfo> {
        match self.payload {
            EventPayload::TouchTest(info) => Some(info),
            _ => None,
        }
    }

    /// Writes a value back to the engine. A later write, by this or a later receiver,
    /// replaces it.
    pub fn set_return_value(&mut self, values: &[TaggedNumber]) -> Result<()> {
        if !self.ty.supports_return() {
            return Err(Error::NoReturnChannel(self.ty));
        }
        *self.return_value = Some(values.to_vec());
        Ok(())
    }

    /// The value written so far in this dispatch, if any.
    pub fn return_value(&self) -> Option<&[TaggedNumber]> {
        self.return_value.as_deref()
    }
}

impl<'a> fmt::Debug for NodeEvent<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeEvent")
            .field("type", &self.ty)
            .field("node", &self.node)
            .field("target_id", &self.registration.target_id)
            .field("payload", self.payload)
            .finish()
    }
}

/// Outcome of a dispatch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dispatch {
    /// Number of receiver calls made.
    pub delivered: usize,
    /// The last value written to the return channel. `None` means the engine default applies.
    pub return_value: Option<Vec<TaggedNumber>>,
}

impl NodeTree {
    /// Registers `node` for events of type `ty`. Registering again replaces the target id and
    /// user data.
    pub fn register_node_event(
        &mut self,
        node: NodeHandle,
        ty: EventType,
        target_id: i32,
        user_data: Option<ObjectRef>,
    ) -> Result<()> {
        let n = self.node_mut(node)?;
        if !ty.applies_to(n.kind) {
            return Err(Error::UnsupportedForNodeKind(n.kind));
        }
        n.events.registrations.insert(
            ty,
            Registration {
                target_id,
                user_data,
            },
        );
        tracing::trace!(?node, event = ?ty, target_id, "registered node event");
        Ok(())
    }

    /// Unregisters `node` from events of type `ty`. Unregistering an unregistered type does
    /// nothing.
    pub fn unregister_node_event(&mut self, node: NodeHandle, ty: EventType) -> Result<()> {
        self.node_mut(node)?.events.registrations.remove(&ty);
        Ok(())
    }

    pub fn is_registered(&self, node: NodeHandle, ty: EventType) -> bool {
        self.nodes
            .get(node)
            .map_or(false, |n| n.events.registrations.contains_key(&ty))
    }

    /// Sets the global receiver, which is called after the node's own receivers for every
    /// delivered event. There is one slot; setting replaces the previous receiver.
    pub fn register_global_receiver(&mut self, receiver: EventReceiver) {
        self.global_receiver = Some(receiver);
    }

    pub fn unregister_global_receiver(&mut self) {
        self.global_receiver = None;
    }

    /// Appends a receiver to the node's receiver list. Adding a receiver that is already in
    /// the list does nothing.
    pub fn add_node_event_receiver(
        &mut self,
        node: NodeHandle,
        receiver: EventReceiver,
    ) -> Result<()> {
        let receivers = &mut self.node_mut(node)?.events.receivers;
        if receivers.iter().any(|r| r.ptr_eq(&receiver)) {
            tracing::debug!(?node, "receiver already added");
            return Ok(());
        }
        receivers.push(receiver);
        Ok(())
    }

    /// Removes a receiver from the node's receiver list.
    pub fn remove_node_event_receiver(
        &mut self,
        node: NodeHandle,
        receiver: &EventReceiver,
    ) -> Result<()> {
        let receivers = &mut self.node_mut(node)?.events.receivers;
        let index = receivers
            .iter()
            .position(|r| r.ptr_eq(receiver))
            .ok_or(Error::InvalidParameter("receiver is not registered on this node"))?;
        receivers.remove(index);
        Ok(())
    }

    /// Dispatches an event on a node.
    ///
    /// Called by the engine. If the node is not registered for `ty`, nothing is delivered.
    /// Otherwise the node's receivers are called in the order they were added, then the global
    /// receiver. Receivers run with full access to the tree; the receiver list is read once at
    /// the start, and if the node is disposed the remaining receivers are skipped.
    ///
    /// # Panics
    /// Panics if the payload shape does not match the event type, and propagates panics from
    /// receivers.
    pub fn dispatch_event(
        &mut self,
        node: NodeHandle,
        ty: EventType,
        payload: EventPayload,
    ) -> Result<Dispatch> {
        assert_eq!(
            payload.shape(),
            ty.payload_shape(),
            "{:?} events must carry a {:?} payload",
            ty,
            ty.payload_shape()
        );

        let n = self.node(node)?;
        let registration = match n.events.registrations.get(&ty) {
            Some(registration) => registration.clone(),
            None => return Ok(Dispatch::default()),
        };
        if self.dispatch_depth >= self.config.max_dispatch_depth {
            tracing::warn!(?node, event = ?ty, depth = self.dispatch_depth, "dispatch nested too deeply");
            return Err(Error::InvalidParameter("event dispatch nested too deeply"));
        }

        let mut receivers = n.events.receivers.clone();
        receivers.extend(self.global_receiver.clone());

        let mut outcome = Dispatch::default();
        self.dispatch_depth += 1;
        for receiver in receivers {
            if !self.nodes.contains_key(node) {
                tracing::trace!(?node, event = ?ty, "node disposed during dispatch");
                break;
            }
            let mut event = NodeEvent {
                ty,
                node,
                registration: &registration,
                payload: &payload,
                return_value: &mut outcome.return_value,
            };
            self.run_callback(
                "event receiver",
                node,
                |tree| (receiver.0)(tree, &mut event),
                |tree| tree.dispatch_depth -= 1,
            );
            outcome.delivered += 1;
        }
        self.dispatch_depth -= 1;

        tracing::trace!(?node, event = ?ty, delivered = outcome.delivered, "dispatched event");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::NodeKind;
    use std::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> EventReceiver {
        let log = Rc::clone(log);
        EventReceiver::new(move |_, _| log.borrow_mut().push(name))
    }

    fn click() -> EventPayload {
        EventPayload::Numeric(vec![TaggedNumber::F32(1.), TaggedNumber::F32(2.)])
    }

    #[test]
    fn unregistered_nodes_receive_nothing() {
        let mut tree = NodeTree::new();
        let node = tree.create(NodeKind::Button).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        tree.add_node_event_receiver(node, recorder(&log, "r")).unwrap();
        let outcome = tree.dispatch_event(node, EventType::Click, click()).unwrap();
        assert_eq!(outcome.delivered, 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn duplicate_receivers_are_ignored() {
        let mut tree = NodeTree::new();
        let node = tree.create(NodeKind::Button).unwrap();
        tree.register_node_event(node, EventType::Click, 0, None).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let r = recorder(&log, "r");
        tree.add_node_event_receiver(node, r.clone()).unwrap();
        tree.add_node_event_receiver(node, r.clone()).unwrap();
        tree.dispatch_event(node, EventType::Click, click()).unwrap();
        assert_eq!(*log.borrow(), vec!["r"]);

        tree.remove_node_event_receiver(node, &r).unwrap();
        assert!(tree.remove_node_event_receiver(node, &r).is_err());
    }

    #[test]
    fn event_accessors() {
        let mut tree = NodeTree::new();
        let node = tree.create(NodeKind::Button).unwrap();
        tree.register_node_event(node, EventType::Click, 42, Some(ObjectRef::new("data")))
            .unwrap();
        let seen = Rc::new(RefCell::new(None));
        let seen2 = Rc::clone(&seen);
        tree.register_global_receiver(EventReceiver::new(move |_, event| {
            *seen2.borrow_mut() = Some((
                event.target_id(),
                event.user_data().and_then(|d| d.downcast_ref::<&str>()).copied(),
                event.number(1),
                event.string().map(str::to_owned),
                event.set_return_value(&[TaggedNumber::I32(1)]),
            ));
        }));
        tree.dispatch_event(node, EventType::Click, click()).unwrap();
        assert_eq!(
            seen.borrow().clone(),
            Some((
                42,
                Some("data"),
                Some(TaggedNumber::F32(2.)),
                None::<String>,
                Err(Error::NoReturnChannel(EventType::Click))
            ))
        );
    }

    #[test]
    fn registration_checks_kind() {
        let mut tree = NodeTree::new();
        let stack = tree.create(NodeKind::Stack).unwrap();
        assert_eq!(
            tree.register_node_event(stack, EventType::SliderChange, 0, None),
            Err(Error::UnsupportedForNodeKind(NodeKind::Stack))
        );
        assert!(!tree.is_registered(stack, EventType::SliderChange));
    }

    #[test]
    #[should_panic(expected = "payload")]
    fn wrong_payload_shape_is_a_defect() {
        let mut tree = NodeTree::new();
        let node = tree.create(NodeKind::Stack).unwrap();
        let payload = EventPayload::Text(StringRecord::new("x"));
        let _ = tree.dispatch_event(node, EventType::Click, payload);
    }

    #[test]
    fn nested_dispatch_is_bounded() {
        let mut tree = NodeTree::with_config(crate::Config::default().with_max_dispatch_depth(3));
        let node = tree.create(NodeKind::Stack).unwrap();
        tree.register_node_event(node, EventType::Click, 0, None).unwrap();
        let errors = Rc::new(RefCell::new(Vec::new()));
        let errors2 = Rc::clone(&errors);
        tree.add_node_event_receiver(
            node,
            EventReceiver::new(move |tree, event| {
                let node = event.node();
                if let Err(e) = tree.dispatch_event(node, EventType::Click, click()) {
                    errors2.borrow_mut().push(e);
                }
            }),
        )
        .unwrap();
        tree.dispatch_event(node, EventType::Click, click()).unwrap();
        assert_eq!(errors.borrow().len(), 1);
        assert_eq!(tree.dispatch_depth, 0);
    }

    #[test]
    fn receiver_panics_propagate_and_restore_depth() {
        let mut tree = NodeTree::new();
        let node = tree.create(NodeKind::Stack).unwrap();
        tree.register_node_event(node, EventType::Click, 0, None).unwrap();
        tree.add_node_event_receiver(node, EventReceiver::new(|_, _| panic!("receiver failed")))
            .unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = tree.dispatch_event(node, EventType::Click, click());
        }));
        assert!(result.is_err());
        assert_eq!(tree.dispatch_depth, 0);
    }
}

//! Native UI node tree bridge.
//!
//! # Conceptual overview
//! Roost is the layer between application code and a retained-mode rendering engine. The
//! application builds a tree of typed nodes, configures them through attributes, listens to
//! events, and optionally takes over measuring and drawing for custom nodes. The engine observes
//! the tree through a queue of patches and drives the layout passes.
//!
//! ## Nodes
//! A node is created with a fixed [`NodeKind`] and referred to by a [`NodeHandle`]. Handles are
//! generation-checked: once a node is disposed, its handle stops resolving, and any operation
//! taking it fails with `InvalidParameter` instead of touching whatever reuses the slot.
//!
//! A node is either a structural child of one parent, adopted by one other node, or neither.
//! Adoption only records the relationship: the adopted node is not part of the tree, and the
//! engine learns about it from [`Patch::Adopt`]. Disposing a node detaches its children rather
//! than destroying them and ends its adoptions.
//!
//! ## Attributes
//! Every attribute travels in the same envelope, an [`AttributeValue`]: an array of tagged
//! numbers, an optional string, and an optional object. The meaning of each position is given by
//! the attribute kind's [`Contract`] in the [`Catalog`]. Setting an attribute validates the value
//! against the contract, stores it in canonical form (a single padding value becomes four), and
//! marks the node dirty for exactly the passes the attribute affects.
//!
//! ## Events
//! The engine dispatches events on nodes that registered for them. Receivers run synchronously,
//! per-node receivers first in the order they were added and then the global receiver, and may
//! freely mutate the tree. Some event types carry a return channel; the last value written wins.
//!
//! ## Layout
//! Custom nodes carry a [`CustomLayout`] delegate. The engine measures, positions and draws
//! them, and the delegate reports its size and draws onto a [`Canvas`] from inside the
//! callbacks. See the [`layout`] module for the state machine.
//!
//! ## Adapters
//! Scrollable containers can take their children from a node adapter instead of the mutator.
//! The application describes item count changes; the engine realizes the items it needs and
//! the adapter's receiver supplies nodes for them.
//!
//! ## Threads
//! A [`NodeTree`] lives on one thread and is not `Send`. Other threads post work to it with a
//! [`TaskPoster`].

pub mod adapter;
pub mod attribute;
pub mod color;
mod config;
mod error;
pub mod events;
mod handle;
mod kind;
pub mod layout;
mod patch;
pub mod rect;
mod task;
mod tree;

pub use adapter::{AdapterEdit, AdapterEvent, AdapterEventType, AdapterReceiver};
pub use attribute::{AttributeKind, AttributeValue, Catalog, Contract, ObjectRef, TaggedNumber};
pub use config::Config;
pub use error::{Error, Result};
pub use events::{Dispatch, EventPayload, EventReceiver, EventType, NodeEvent};
pub use handle::{AdapterHandle, NodeHandle};
pub use kind::NodeKind;
pub use layout::{Canvas, CustomLayout, DisplayList, DrawContext, LayoutConstraint, LayoutPhase};
pub use patch::{Patch, Patches};
pub use task::{Task, TaskPoster};
pub use tree::{DirtyFlags, NodeTree};

//! Result codes.

use crate::attribute::AttributeKind;
use crate::events::EventType;
use crate::kind::NodeKind;
use thiserror::Error;

/// Errors returned synchronously by the call that detected them.
///
/// A call that fails leaves the tree exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed or out-of-range input, including stale handles.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// The attribute, event, or operation does not apply to this kind of node.
    #[error("not supported for {0:?} nodes")]
    UnsupportedForNodeKind(NodeKind),

    /// The node already has a tree parent.
    #[error("node already has a parent")]
    AlreadyOwned,

    /// The node is already adopted by another node.
    #[error("node is already adopted")]
    AlreadyAdopted,

    /// The operation requires a relationship that does not exist.
    #[error("node is not attached where expected")]
    NotOnTree,

    /// The event type cannot carry a return value.
    #[error("{0:?} events have no return channel")]
    NoReturnChannel(EventType),

    /// The capability is not compiled into the engine.
    #[error("unavailable: {0}")]
    Unavailable(&'static str),

    /// `get` on an attribute that was never set (or was reset).
    #[error("attribute {0:?} is not set")]
    AttributeNotSet(AttributeKind),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) const STALE_NODE: Error = Error::InvalidParameter("stale node handle");
pub(crate) const STALE_ADAPTER: Error = Error::InvalidParameter("stale adapter handle");

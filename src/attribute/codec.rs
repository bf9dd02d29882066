//! Attribute set/get/reset on nodes.

use super::{AttributeKind, AttributeValue, Contract};
use crate::error::{Error, Result};
use crate::handle::{AdapterHandle, NodeHandle};
use crate::patch::Patch;
use crate::tree::NodeTree;

impl NodeTree {
    /// Looks up the contract for `kind` and checks that it applies to the node.
    fn contract_for(&self, node: NodeHandle, kind: AttributeKind) -> Result<Contract> {
        let node_kind = self.node(node)?.kind;
        let contract = *self
            .config
            .catalog
            .contract(kind)
            .ok_or(Error::Unavailable("attribute kind is not in the catalog"))?;
        if !contract.scope.admits(node_kind) {
            return Err(Error::UnsupportedForNodeKind(node_kind));
        }
        Ok(contract)
    }

    /// Sets an attribute.
    ///
    /// The value is validated against the attribute's contract and stored in canonical form.
    /// On success the node is marked dirty according to the attribute's classification. On
    /// failure nothing changes.
    pub fn set_attribute(
        &mut self,
        node: NodeHandle,
        kind: AttributeKind,
        value: &AttributeValue,
    ) -> Result<()> {
        let contract = self.contract_for(node, kind)?;
        let canonical = contract.canonicalize(value)?;

        if kind.is_node_adapter() {
            let adapter = canonical
                .object
                .as_ref()
                .and_then(|object| object.downcast_ref::<AdapterHandle>())
                .copied()
                .ok_or(Error::InvalidParameter("object is not a node adapter"))?;
            return self.bind_adapter(node, adapter);
        }

        self.node_mut(node)?.attributes.insert(kind, canonical);
        self.invalidate(node, contract.dirty);
        tracing::trace!(?node, ?kind, "set attribute");
        self.record(Patch::Attribute(node, kind));
        Ok(())
    }

    /// Returns the stored canonical value of an attribute.
    pub fn get_attribute(&self, node: NodeHandle, kind: AttributeKind) -> Result<&AttributeValue> {
        self.contract_for(node, kind)?;
        self.node(node)?
            .attributes
            .get(&kind)
            .ok_or(Error::AttributeNotSet(kind))
    }

    /// Resets an attribute to the engine default.
    ///
    /// Resetting an attribute that is not set succeeds and changes nothing.
    pub fn reset_attribute(&mut self, node: NodeHandle, kind: AttributeKind) -> Result<()> {
        let contract = self.contract_for(node, kind)?;

        if kind.is_node_adapter() {
            if self.node(node)?.adapter.is_some() {
                self.detach_adapter(node)?;
            }
            return Ok(());
        }

        if self.node_mut(node)?.attributes.remove(&kind).is_some() {
            self.invalidate(node, contract.dirty);
            tracing::trace!(?node, ?kind, "reset attribute");
            self.record(Patch::Attribute(node, kind));
        }
        Ok(())
    }

    /// Returns true if the attribute has a stored value.
    pub fn has_attribute(&self, node: NodeHandle, kind: AttributeKind) -> bool {
        self.nodes
            .get(node)
            .map_or(false, |n| n.attributes.contains_key(&kind))
    }
}

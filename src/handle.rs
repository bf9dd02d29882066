//! Handles into the tree's node and adapter maps.

use slotmap::new_key_type;

new_key_type! {
    /// An opaque reference to a node in a [`NodeTree`](crate::NodeTree).
    ///
    /// Handles are cheap to copy. Once the node is disposed, the handle no longer resolves and
    /// every operation taking it fails with `InvalidParameter`.
    pub struct NodeHandle;

    /// An opaque reference to a node adapter.
    pub struct AdapterHandle;
}

#[test]
fn test_disposed_handles_do_not_alias() {
    let mut tree = crate::NodeTree::new();
    let first = tree.create(crate::NodeKind::Text).unwrap();
    tree.dispose(first).unwrap();
    let second = tree.create(crate::NodeKind::Image).unwrap();
    assert_ne!(first, second);
    assert_eq!(tree.kind(first), None);
    assert_eq!(tree.kind(second), Some(crate::NodeKind::Image));
    assert_eq!(tree.len(), 1);
}

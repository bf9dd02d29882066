//! Tree configuration.

use crate::attribute::Catalog;
use crate::kind::NodeKind;

/// Configuration for a [`NodeTree`](crate::NodeTree).
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum nesting of event dispatches started from inside receivers.
    pub max_dispatch_depth: usize,

    /// Node kinds the engine was built without. Creating one fails with `Unavailable`.
    pub unavailable_kinds: Vec<NodeKind>,

    /// If false, no patches are queued.
    pub record_patches: bool,

    /// Attribute contracts used by the codec.
    pub catalog: Catalog,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_dispatch_depth: 64,
            unavailable_kinds: Vec::new(),
            record_patches: true,
            catalog: Catalog::builtin(),
        }
    }
}

impl Config {
    pub fn with_max_dispatch_depth(mut self, depth: usize) -> Config {
        self.max_dispatch_depth = depth;
        self
    }

    pub fn with_unavailable_kind(mut self, kind: NodeKind) -> Config {
        if !self.unavailable_kinds.contains(&kind) {
            self.unavailable_kinds.push(kind);
        }
        self
    }

    pub fn with_record_patches(mut self, record: bool) -> Config {
        self.record_patches = record;
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Config {
        self.catalog = catalog;
        self
    }
}

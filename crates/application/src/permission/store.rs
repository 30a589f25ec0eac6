//! Snapshot of the permission tree for the current session.

use std::sync::Arc;

use gatehouse_domain::PermissionTree;
use parking_lot::RwLock;

#[derive(Debug)]
struct Loaded {
    epoch: u64,
    tree: Arc<PermissionTree>,
}

/// Holds the last fetched permission tree, tagged with the session epoch it
/// was loaded for. A snapshot from an earlier epoch reads as not loaded.
#[derive(Debug, Default)]
pub struct PermissionStore {
    state: RwLock<Option<Loaded>>,
}

impl PermissionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a tree was loaded during session `epoch`.
    #[must_use]
    pub fn is_loaded_for(&self, epoch: u64) -> bool {
        self.state
            .read()
            .as_ref()
            .is_some_and(|loaded| loaded.epoch == epoch)
    }

    /// Replaces the snapshot wholesale.
    pub fn replace(&self, epoch: u64, tree: PermissionTree) {
        tracing::debug!(epoch, nodes = tree.node_count(), "Permission tree replaced");
        *self.state.write() = Some(Loaded {
            epoch,
            tree: Arc::new(tree),
        });
    }

    /// Tree loaded during session `epoch`, if any.
    #[must_use]
    pub fn tree_for(&self, epoch: u64) -> Option<Arc<PermissionTree>> {
        self.state
            .read()
            .as_ref()
            .filter(|loaded| loaded.epoch == epoch)
            .map(|loaded| Arc::clone(&loaded.tree))
    }

    /// Drops the snapshot.
    pub fn clear(&self) {
        self.state.write().take();
    }
}

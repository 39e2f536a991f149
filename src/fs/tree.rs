use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::EnumerationError;
use crate::fs::entry::PathEntry;
use crate::fs::lister::{DirectoryLister, ListingSnapshot};

/// Stable handle to a tree node.
///
/// The generation is bumped whenever a slot is freed, so a handle to a
/// removed node never resolves to whatever later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}v{})", self.index, self.generation)
    }
}

/// A node in the directory tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub entry: PathEntry,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// `false` means "not enumerated yet", not "no children".
    pub children_loaded: bool,
    /// An enumeration for this node is in flight.
    pub pending: bool,
}

impl TreeNode {
    fn new(entry: PathEntry, parent: Option<NodeId>) -> Self {
        Self {
            entry,
            parent,
            children: Vec::new(),
            children_loaded: false,
            pending: false,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<TreeNode>,
}

/// What [`DirectoryTree::expand`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandRequest {
    /// Children are already loaded; nothing to do.
    AlreadyLoaded,
    /// Another expansion of this node is in flight; its result will be used.
    InFlight,
    /// The node is now pending; enumerate this path and hand the result to
    /// [`DirectoryTree::complete_expansion`].
    Started(PathBuf),
    /// The handle refers to a removed node.
    Stale,
}

/// Forest of directory nodes stored in an arena.
///
/// A synthetic, never-rendered root holds the filesystem roots as children.
/// Children are materialized lazily, one expansion at a time. Only the
/// interactive thread mutates the tree.
#[derive(Debug)]
pub struct DirectoryTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
}

impl DirectoryTree {
    /// Create a tree whose synthetic root has the given filesystem roots as
    /// children. Nothing is enumerated.
    pub fn new(roots: Vec<PathEntry>) -> Self {
        let synthetic = PathEntry {
            path: PathBuf::new(),
            is_directory: true,
            is_regular_file: false,
            size_bytes: 0,
            last_modified: None,
            can_read: true,
            can_write: false,
            can_execute: true,
        };
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        tree.root = tree.alloc(TreeNode::new(synthetic, None));
        for entry in roots {
            tree.insert_child(tree.root, entry);
        }
        if let Some(node) = tree.get_mut(tree.root) {
            node.children_loaded = true;
        }
        tree
    }

    /// Create a tree and eagerly load each root one level deep.
    ///
    /// Roots end up with `children_loaded = true`; their children do not.
    pub fn seed(roots: Vec<PathEntry>, lister: &DirectoryLister) -> Self {
        let mut tree = Self::new(roots);
        for root in tree.roots().to_vec() {
            if let ExpandRequest::Started(path) = tree.expand(root) {
                let result = lister.list(&path);
                tree.complete_expansion(root, result);
            }
        }
        tree
    }

    /// The synthetic root. It is not a filesystem path.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The filesystem roots.
    pub fn roots(&self) -> &[NodeId] {
        self.children(self.root)
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Number of live nodes, excluding the synthetic root.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count() - 1
    }

    /// Begin expanding `id`.
    ///
    /// Loaded nodes are a no-op and a second request while one is in flight
    /// is coalesced into the first, so no duplicate children are ever added.
    pub fn expand(&mut self, id: NodeId) -> ExpandRequest {
        let Some(node) = self.get_mut(id) else {
            return ExpandRequest::Stale;
        };
        if node.children_loaded {
            ExpandRequest::AlreadyLoaded
        } else if node.pending {
            ExpandRequest::InFlight
        } else {
            node.pending = true;
            ExpandRequest::Started(node.entry.path.clone())
        }
    }

    /// Apply a finished enumeration to a pending node.
    ///
    /// On success one child per subdirectory is appended in listing order. A
    /// failed enumeration leaves the node loaded with no children; it is not
    /// retried. Results for removed or non-pending nodes are dropped.
    pub fn complete_expansion(
        &mut self,
        id: NodeId,
        result: Result<ListingSnapshot, EnumerationError>,
    ) {
        match self.get(id) {
            Some(node) if node.pending => {}
            _ => {
                tracing::debug!("dropping expansion result for {}", id);
                return;
            }
        }

        let subdirectories = match result {
            Ok(snapshot) => snapshot.subdirectory_entries,
            Err(e) => {
                tracing::warn!("{}", e);
                Vec::new()
            }
        };
        for entry in subdirectories {
            self.insert_child(id, entry);
        }
        if let Some(node) = self.get_mut(id) {
            node.pending = false;
            node.children_loaded = true;
        }
    }

    /// Append subdirectories from `snapshot` that `id` does not have yet.
    ///
    /// Only touches loaded nodes. Never removes or reorders existing children.
    /// Returns the number of nodes added.
    pub fn reconcile(&mut self, id: NodeId, snapshot: &ListingSnapshot) -> usize {
        match self.get(id) {
            Some(node) if node.children_loaded => {}
            _ => return 0,
        }

        let missing: Vec<PathEntry> = snapshot
            .subdirectory_entries
            .iter()
            .filter(|entry| {
                !self
                    .children(id)
                    .iter()
                    .any(|&c| self.get(c).map(|n| n.entry.path == entry.path).unwrap_or(false))
            })
            .cloned()
            .collect();

        let added = missing.len();
        for entry in missing {
            self.insert_child(id, entry);
        }
        added
    }

    /// Find a materialized node by path.
    ///
    /// Scans nodes reachable from the root in display order. Nodes under a
    /// parent that was never expanded are not found.
    pub fn find_node(&self, path: &Path) -> Option<NodeId> {
        self.visible_rows()
            .into_iter()
            .map(|(id, _)| id)
            .find(|&id| self.get(id).map(|n| n.entry.path == path).unwrap_or(false))
    }

    /// Append a new, unexpanded leaf under `parent`.
    pub fn insert_child(&mut self, parent: NodeId, entry: PathEntry) -> NodeId {
        let id = self.alloc(TreeNode::new(entry, Some(parent)));
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Detach `id` from its parent and free its subtree.
    ///
    /// Handles to any node in the subtree become stale.
    pub fn remove_node(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != id);
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            stack.extend_from_slice(self.children(next));
            self.release(next);
        }
    }

    /// All nodes below the synthetic root in pre-order, with depth
    /// (filesystem roots have depth 0).
    pub fn visible_rows(&self) -> Vec<(NodeId, usize)> {
        let mut rows = Vec::new();
        let mut stack: Vec<(NodeId, usize)> =
            self.roots().iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            rows.push((id, depth));
            for &child in self.children(id).iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        rows
    }

    fn alloc(&mut self, node: TreeNode) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index: self.slots.len() - 1,
                generation: 0,
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index) {
            if slot.generation == id.generation && slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }
}

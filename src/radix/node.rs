use std::sync::Arc;

use smallvec::SmallVec;

use crate::route::Route;

/// The child reached via a `{name}` edge. Spec §4.B: at most one parameter
/// child per node, keyed implicitly (its key is always `{name}`), so there is
/// no index array to search — presence is binary.
pub struct ParamChild<H> {
    pub name: Arc<str>,
    /// The byte a capture scans forward to: `.` for a hostname-label
    /// parameter, `/` for a path-segment parameter (spec §4.D.3).
    pub delimiter: u8,
    pub node: Arc<RadixNode<H>>,
}

// Manual impls: `H` (the opaque handler type) need not be `Clone`/`Debug`
// for a node that merely holds it behind an `Arc` to be `Clone`/`Debug`,
// but `#[derive(..)]` would add that bound anyway.
impl<H> Clone for ParamChild<H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            delimiter: self.delimiter,
            node: self.node.clone(),
        }
    }
}

impl<H> std::fmt::Debug for ParamChild<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamChild").field("name", &self.name).finish_non_exhaustive()
    }
}

/// The child reached via a `*{name}` edge.
///
/// `inode` is always present: for a terminal catch-all (`*{name}` at the end
/// of a pattern) it is a bare leaf holding only `route`; for an infix
/// catch-all (`*{name}/more`) it is the precomputed sub-tree to resume
/// matching in once the capture ends, so the walk never slices or
/// concatenates strings at lookup time.
pub struct WildcardChild<H> {
    pub name: Arc<str>,
    pub infix: bool,
    pub inode: Arc<RadixNode<H>>,
}

impl<H> Clone for WildcardChild<H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            infix: self.infix,
            inode: self.inode.clone(),
        }
    }
}

impl<H> std::fmt::Debug for WildcardChild<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WildcardChild")
            .field("name", &self.name)
            .field("infix", &self.infix)
            .finish_non_exhaustive()
    }
}

/// An immutable node in a per-method radix tree (component B), generic over
/// the opaque handler type `H` carried on its leaf [`Route`].
///
/// Nodes are shared via `Arc` across snapshots; a write transaction never
/// mutates a node in place, it clones the nodes on the path it touches and
/// rewires parents to the clones, leaving every node reachable from an older
/// root's `Arc` byte-for-byte untouched.
pub struct RadixNode<H> {
    /// The compressed static edge label leading to this node (may be empty
    /// at the root, or after a split).
    pub prefix: Box<str>,
    indices: SmallVec<[u8; 8]>,
    children: SmallVec<[Arc<RadixNode<H>>; 8]>,
    pub param_child: Option<ParamChild<H>>,
    pub wildcard_child: Option<WildcardChild<H>>,
    pub route: Option<Arc<Route<H>>>,
}

impl<H> Clone for RadixNode<H> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            indices: self.indices.clone(),
            children: self.children.clone(),
            param_child: self.param_child.clone(),
            wildcard_child: self.wildcard_child.clone(),
            route: self.route.clone(),
        }
    }
}

impl<H> std::fmt::Debug for RadixNode<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadixNode")
            .field("prefix", &self.prefix)
            .field("indices", &self.indices)
            .field("children_len", &self.children.len())
            .field("param_child", &self.param_child)
            .field("wildcard_child", &self.wildcard_child)
            .field("has_route", &self.route.is_some())
            .finish()
    }
}

impl<H> Default for RadixNode<H> {
    fn default() -> Self {
        Self {
            prefix: Box::default(),
            indices: SmallVec::new(),
            children: SmallVec::new(),
            param_child: None,
            wildcard_child: None,
            route: None,
        }
    }
}

/// Above this child count a node switches from linear scan to binary search
/// over `indices`, which stays sorted at all times.
const LINEAR_SCAN_THRESHOLD: usize = 8;

impl<H> RadixNode<H> {
    pub fn new(prefix: impl Into<Box<str>>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    pub fn children(&self) -> &[Arc<RadixNode<H>>] {
        &self.children
    }

    pub fn child_at(&self, byte: u8) -> Option<&Arc<RadixNode<H>>> {
        let pos = if self.indices.len() <= LINEAR_SCAN_THRESHOLD {
            self.indices.iter().position(|&b| b == byte)
        } else {
            self.indices.binary_search(&byte).ok()
        };
        pos.map(|i| &self.children[i])
    }

    pub fn is_leaf_empty(&self) -> bool {
        self.route.is_none()
            && self.children.is_empty()
            && self.param_child.is_none()
            && self.wildcard_child.is_none()
    }

    /// Replaces (or inserts) the static child keyed by `byte`, keeping
    /// `indices` sorted. Used only by the staging builder (`build.rs`), which
    /// always operates on a freshly cloned node.
    pub(crate) fn put_child(&mut self, byte: u8, child: Arc<RadixNode<H>>) {
        match self.indices.iter().position(|&b| b == byte) {
            Some(pos) => self.children[pos] = child,
            None => {
                let pos = self.indices.partition_point(|&b| b < byte);
                self.indices.insert(pos, byte);
                self.children.insert(pos, child);
            }
        }
    }

    pub(crate) fn remove_child(&mut self, byte: u8) -> Option<Arc<RadixNode<H>>> {
        let pos = self.indices.iter().position(|&b| b == byte)?;
        self.indices.remove(pos);
        Some(self.children.remove(pos))
    }

    /// Depth-first walk collecting every route reachable from this node,
    /// for admin/introspection enumeration (spec §4.E read-only transactions).
    /// Not on any lookup hot path — allocates freely.
    pub fn collect_routes(&self, out: &mut Vec<Arc<Route<H>>>) {
        if let Some(route) = &self.route {
            out.push(route.clone());
        }
        for child in self.children() {
            child.collect_routes(out);
        }
        if let Some(param) = &self.param_child {
            param.node.collect_routes(out);
        }
        if let Some(wildcard) = &self.wildcard_child {
            wildcard.inode.collect_routes(out);
        }
    }
}

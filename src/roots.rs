use std::sync::Arc;

use crate::enums::HttpMethod;
use crate::radix::RadixNode;
use crate::route::Route;

/// One method's routing state (component C): an optional tree for
/// host-qualified patterns and a tree for path-only patterns. Spec §4.D.2:
/// a host-qualified lookup is attempted first when `host_root` is present,
/// falling back to `path_root` on failure.
pub struct MethodTree<H> {
    pub method: HttpMethod,
    pub host_root: Option<Arc<RadixNode<H>>>,
    pub path_root: Arc<RadixNode<H>>,
}

impl<H> Clone for MethodTree<H> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            host_root: self.host_root.clone(),
            path_root: self.path_root.clone(),
        }
    }
}

impl<H> MethodTree<H> {
    fn empty(method: HttpMethod) -> Self {
        Self {
            method,
            host_root: None,
            path_root: Arc::new(RadixNode::default()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.host_root.is_none() && self.path_root.is_leaf_empty()
    }
}

/// The whole routing table, published atomically (spec §3 "Root set"). The
/// first four slots are reserved for GET/POST/PUT/DELETE per
/// [`HttpMethod::fixed_slot`]; every other method is appended the first time
/// a route registers it.
pub struct RootSet<H> {
    fixed: [MethodTree<H>; 4],
    extra: Vec<MethodTree<H>>,
}

impl<H> Clone for RootSet<H> {
    fn clone(&self) -> Self {
        Self {
            fixed: self.fixed.clone(),
            extra: self.extra.clone(),
        }
    }
}

impl<H> Default for RootSet<H> {
    fn default() -> Self {
        Self {
            fixed: [
                MethodTree::empty(HttpMethod::Get),
                MethodTree::empty(HttpMethod::Post),
                MethodTree::empty(HttpMethod::Put),
                MethodTree::empty(HttpMethod::Delete),
            ],
            extra: Vec::new(),
        }
    }
}

impl<H> RootSet<H> {
    pub fn get(&self, method: &HttpMethod) -> Option<&MethodTree<H>> {
        if let Some(slot) = method.fixed_slot() {
            return Some(&self.fixed[slot]);
        }
        self.extra.iter().find(|tree| &tree.method == method)
    }

    pub fn get_mut_or_insert(&mut self, method: &HttpMethod) -> &mut MethodTree<H> {
        if let Some(slot) = method.fixed_slot() {
            return &mut self.fixed[slot];
        }
        if let Some(pos) = self.extra.iter().position(|tree| &tree.method == method) {
            return &mut self.extra[pos];
        }
        self.extra.push(MethodTree::empty(method.clone()));
        self.extra.last_mut().expect("just pushed")
    }

    /// Every registered method tree, fixed slots first, for 405/OPTIONS
    /// enumeration (spec §4.F.6-7).
    pub fn trees(&self) -> impl Iterator<Item = &MethodTree<H>> {
        self.fixed.iter().chain(self.extra.iter())
    }

    /// Every distinct route reachable from any method tree, deduplicated by
    /// `Arc` identity since a multi-method route is shared across trees
    /// (spec §10 read-only-transaction enumeration).
    pub fn collect_routes(&self) -> Vec<Arc<Route<H>>> {
        let mut out = Vec::new();
        for tree in self.trees() {
            if let Some(host_root) = &tree.host_root {
                host_root.collect_routes(&mut out);
            }
            tree.path_root.collect_routes(&mut out);
        }
        let mut seen = std::collections::HashSet::with_capacity(out.len());
        out.retain(|route| seen.insert(Arc::as_ptr(route) as usize));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_set_when_fixed_method_then_uses_preallocated_slot() {
        let mut set: RootSet<()> = RootSet::default();
        set.get_mut_or_insert(&HttpMethod::Get);
        assert!(set.get(&HttpMethod::Get).is_some());
        assert_eq!(set.extra.len(), 0);
    }

    #[test]
    fn root_set_when_extension_method_then_appended() {
        let mut set: RootSet<()> = RootSet::default();
        set.get_mut_or_insert(&HttpMethod::from("PURGE"));
        assert_eq!(set.extra.len(), 1);
    }
}

use std::sync::Arc;

use crate::context::{BindingSource, LookupContext, ParamBinding};
use crate::radix::{RadixNode, WildcardChild};
use crate::roots::MethodTree;
use crate::route::Route;

/// Result of a single lookup (component D). `tsr` is true when `route` was
/// reached only by adding or removing a trailing slash from the request path.
pub struct LookupOutcome<H> {
    pub route: Option<Arc<Route<H>>>,
    pub tsr: bool,
}

impl<H> LookupOutcome<H> {
    fn none() -> Self {
        Self {
            route: None,
            tsr: false,
        }
    }
}

/// A byte cursor over the logical concatenation of `host` then `path`,
/// without ever allocating that concatenation: a node's static prefix is
/// matched by draining first from the host remainder then the path
/// remainder, so a literal edge that straddles the two (e.g. the merged
/// `"example.com/avengers"` produced when no parameter separates host from
/// path) still matches byte-for-byte. Parameter captures always name an
/// explicit side, so a hostname scan for `.` can never run on into the path
/// (which may contain literal dots of its own) or vice versa.
#[derive(Clone, Copy)]
struct Cursor<'a> {
    host_full: &'a str,
    path_full: &'a str,
    host: &'a str,
    path: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(host: &'a str, path: &'a str) -> Self {
        Self {
            host_full: host,
            path_full: path,
            host,
            path,
        }
    }

    fn is_empty(&self) -> bool {
        self.host.is_empty() && self.path.is_empty()
    }

    fn peek(&self) -> Option<u8> {
        self.host
            .as_bytes()
            .first()
            .or_else(|| self.path.as_bytes().first())
            .copied()
    }

    fn consume_literal(&mut self, text: &str) -> bool {
        let mut remaining = text.as_bytes();
        let mut host = self.host;
        let mut path = self.path;

        while !remaining.is_empty() {
            if !host.is_empty() {
                let n = remaining.len().min(host.len());
                if host.as_bytes()[..n] != remaining[..n] {
                    return false;
                }
                host = &host[n..];
                remaining = &remaining[n..];
            } else if !path.is_empty() {
                let n = remaining.len().min(path.len());
                if path.as_bytes()[..n] != remaining[..n] {
                    return false;
                }
                path = &path[n..];
                remaining = &remaining[n..];
            } else {
                return false;
            }
        }

        self.host = host;
        self.path = path;
        true
    }

    /// Captures bytes from `source` up to (not including) the next `delim`
    /// byte, or to the end of that side if `delim` does not occur. `None` if
    /// the designated side is already exhausted or the capture would be
    /// empty — a parameter binds at least one byte.
    fn capture_until(&mut self, source: BindingSource, delim: u8) -> Option<(u32, u32)> {
        match source {
            BindingSource::Host => {
                if self.host.is_empty() {
                    return None;
                }
                let rel_end = memchr::memchr(delim, self.host.as_bytes()).unwrap_or(self.host.len());
                if rel_end == 0 {
                    return None;
                }
                let start = self.host_full.len() - self.host.len();
                let end = start + rel_end;
                self.host = &self.host[rel_end..];
                Some((start as u32, end as u32))
            }
            BindingSource::Path => {
                if self.path.is_empty() {
                    return None;
                }
                let rel_end = memchr::memchr(delim, self.path.as_bytes()).unwrap_or(self.path.len());
                if rel_end == 0 {
                    return None;
                }
                let start = self.path_full.len() - self.path.len();
                let end = start + rel_end;
                self.path = &self.path[rel_end..];
                Some((start as u32, end as u32))
            }
        }
    }

    fn path_start_offset(&self) -> usize {
        self.path_full.len() - self.path.len()
    }

    fn remaining_is_single_slash(&self) -> bool {
        self.host.is_empty() && self.path == "/"
    }
}

fn is_pure_route_leaf<H>(node: &RadixNode<H>) -> bool {
    node.route.is_some()
        && node.indices().is_empty()
        && node.param_child.is_none()
        && node.wildcard_child.is_none()
}

/// Mutable state threaded through the recursive descent: the live binding
/// buffer (truncated on backtrack) and the first trailing-slash candidate
/// found, which a later direct match overrides (spec §4.D.5-6).
struct Walker<'a, H> {
    lazy: bool,
    bindings: &'a mut Vec<ParamBinding>,
    tsr_bindings: &'a mut Vec<ParamBinding>,
    tsr_route: Option<Arc<Route<H>>>,
}

impl<'a, H> Walker<'a, H> {
    fn record(&mut self, name: Arc<str>, source: BindingSource, start: u32, end: u32) {
        if !self.lazy {
            self.bindings.push(ParamBinding { name, source, start, end });
        }
    }

    fn note_tsr(&mut self, route: &Arc<Route<H>>) {
        if self.tsr_route.is_none() {
            self.tsr_route = Some(route.clone());
            self.tsr_bindings.clone_from(self.bindings);
        }
    }

    fn walk(&mut self, node: &RadixNode<H>, cursor: Cursor<'_>) -> Option<Arc<Route<H>>> {
        if cursor.is_empty() {
            if let Some(route) = &node.route {
                return Some(route.clone());
            }
            // Deficit TSR: the request omitted a trailing slash the route requires.
            if let Some(child) = node.child_at(b'/') {
                if &*child.prefix == "/" && is_pure_route_leaf(child) {
                    let route = child.route.clone().expect("checked by is_pure_route_leaf");
                    self.note_tsr(&route);
                }
            }
            return None;
        }

        if let Some(byte) = cursor.peek() {
            if let Some(child) = node.child_at(byte) {
                let mut child_cursor = cursor;
                if child_cursor.consume_literal(&child.prefix) {
                    let checkpoint = self.bindings.len();
                    if let Some(route) = self.walk(child, child_cursor) {
                        return Some(route);
                    }
                    self.bindings.truncate(checkpoint);
                } else if let Some(trimmed) = child.prefix.strip_suffix('/') {
                    // Deficit TSR: `child`'s edge is the route's whole
                    // compressed prefix (spec §8 scenario 4, an isolated
                    // route that never got split at '/') and the request is
                    // missing exactly the trailing slash it ends in.
                    let mut deficit_cursor = cursor;
                    if deficit_cursor.consume_literal(trimmed) && deficit_cursor.is_empty() {
                        if let Some(route) = &child.route {
                            self.note_tsr(route);
                        }
                    }
                }
            }
        }

        // Surplus TSR: one trailing slash beyond a leaf this node already is.
        if cursor.remaining_is_single_slash() {
            if let Some(route) = node.route.clone() {
                self.note_tsr(&route);
            }
        }

        if let Some(param) = &node.param_child {
            let source = if param.delimiter == b'.' {
                BindingSource::Host
            } else {
                BindingSource::Path
            };
            let mut next_cursor = cursor;
            if let Some((start, end)) = next_cursor.capture_until(source, param.delimiter) {
                let checkpoint = self.bindings.len();
                self.record(param.name.clone(), source, start, end);
                if let Some(route) = self.walk(&param.node, next_cursor) {
                    return Some(route);
                }
                self.bindings.truncate(checkpoint);
            }
        }

        if let Some(wildcard) = &node.wildcard_child {
            if let Some(route) = self.walk_wildcard(wildcard, cursor) {
                return Some(route);
            }
        }

        None
    }

    /// Spec §4.D "Infix catch-all iteration": candidate end positions are
    /// the `/` occurrences in the remaining path plus its end; tried longest
    /// first since a catch-all is greedy by convention, backtracking to
    /// shorter candidates when the suffix doesn't resolve against `inode`.
    fn walk_wildcard(&mut self, wildcard: &WildcardChild<H>, cursor: Cursor<'_>) -> Option<Arc<Route<H>>> {
        if cursor.path.is_empty() {
            return None;
        }
        let base = cursor.path_start_offset();
        let mut candidates: Vec<usize> = memchr::memchr_iter(b'/', cursor.path.as_bytes())
            .filter(|&rel| rel > 0)
            .collect();
        candidates.push(cursor.path.len());

        for &rel in candidates.iter().rev() {
            let checkpoint = self.bindings.len();
            self.record(wildcard.name.clone(), BindingSource::Path, base as u32, (base + rel) as u32);
            let inner = Cursor {
                host_full: cursor.host_full,
                path_full: cursor.path_full,
                host: "",
                path: &cursor.path[rel..],
            };
            if let Some(route) = self.walk(&wildcard.inode, inner) {
                return Some(route);
            }
            self.bindings.truncate(checkpoint);
        }
        None
    }
}

fn walk_tree<H>(root: &RadixNode<H>, host: &str, path: &str, ctx: &mut LookupContext, lazy: bool) -> LookupOutcome<H> {
    let mut walker = Walker {
        lazy,
        bindings: &mut ctx.bindings,
        tsr_bindings: &mut ctx.tsr_bindings,
        tsr_route: None,
    };
    if let Some(route) = walker.walk(root, Cursor::new(host, path)) {
        ctx.tsr_bindings.clear();
        return LookupOutcome { route: Some(route), tsr: false };
    }
    match walker.tsr_route {
        Some(route) => {
            std::mem::swap(&mut ctx.bindings, &mut ctx.tsr_bindings);
            ctx.tsr_bindings.clear();
            LookupOutcome { route: Some(route), tsr: true }
        }
        None => {
            ctx.bindings.clear();
            ctx.tsr_bindings.clear();
            LookupOutcome::none()
        }
    }
}

/// Runs the lookup engine (spec §4.D) against one method's trees: a
/// host-qualified lookup first when the method has any host-qualified
/// routes, falling back to the path-only tree when that yields nothing.
pub fn lookup<H>(tree: &MethodTree<H>, host: &str, path: &str, ctx: &mut LookupContext, lazy: bool) -> LookupOutcome<H> {
    if tree.is_empty() {
        return LookupOutcome::none();
    }

    if let Some(host_root) = &tree.host_root {
        let outcome = walk_tree(host_root, host, path, ctx, lazy);
        if outcome.route.is_some() {
            return outcome;
        }
    }

    walk_tree(&tree.path_root, "", path, ctx, lazy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::HttpMethod;
    use crate::pattern::{parse_pattern, ParserLimits};
    use crate::radix;
    use std::collections::HashMap;

    fn route(pattern: &str, parsed: &crate::pattern::ParsedPattern) -> Arc<Route<u32>> {
        Arc::new(Route {
            pattern: pattern.into(),
            methods: vec![HttpMethod::Get],
            handler: Arc::new(0),
            middleware: Vec::new(),
            annotations: HashMap::new(),
            trailing_slash: Default::default(),
            client_ip_resolver: None,
            param_names: parsed.param_names.clone(),
            host_path_split: parsed.host_path_split,
        })
    }

    fn insert_pattern(root: &Arc<RadixNode<u32>>, pattern: &str) -> Arc<RadixNode<u32>> {
        let parsed = parse_pattern(pattern, &ParserLimits::default()).unwrap();
        let r = route(pattern, &parsed);
        radix::insert(root, &parsed.tokens, r, &HttpMethod::Get, pattern).unwrap()
    }

    fn tree_with(patterns: &[&str]) -> MethodTree<u32> {
        let mut path_root = Arc::new(RadixNode::default());
        let mut host_root: Option<Arc<RadixNode<u32>>> = None;
        for pattern in patterns {
            let parsed = parse_pattern(pattern, &ParserLimits::default()).unwrap();
            if parsed.has_host() {
                let base = host_root.unwrap_or_else(|| Arc::new(RadixNode::default()));
                let r = route(pattern, &parsed);
                host_root = Some(radix::insert(&base, &parsed.tokens, r, &HttpMethod::Get, pattern).unwrap());
            } else {
                path_root = insert_pattern(&path_root, pattern);
            }
        }
        MethodTree { method: HttpMethod::Get, host_root, path_root }
    }

    #[test]
    fn lookup_when_static_path_then_matches() {
        let tree = tree_with(&["/avengers/ironman"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/avengers/ironman", &mut ctx, false);
        assert!(outcome.route.is_some());
        assert!(!outcome.tsr);
    }

    #[test]
    fn lookup_when_param_then_binds_value() {
        let tree = tree_with(&["/avengers/{name}"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/avengers/ironman", &mut ctx, false);
        let route = outcome.route.unwrap();
        assert_eq!(ctx.bindings.len(), 1);
        assert_eq!(ctx.bindings[0].resolve("", "/avengers/ironman"), "ironman");
        assert_eq!(&*route.pattern, "/avengers/{name}");
    }

    #[test]
    fn lookup_when_static_and_param_overlap_then_prefers_static() {
        let tree = tree_with(&["/avengers/ironman", "/avengers/{name}"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/avengers/ironman", &mut ctx, false);
        assert_eq!(&*outcome.route.unwrap().pattern, "/avengers/ironman");
        assert!(ctx.bindings.is_empty());
    }

    #[test]
    fn lookup_when_terminal_wildcard_then_captures_rest() {
        let tree = tree_with(&["/fs/*{filepath}"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/fs/a/b/c.txt", &mut ctx, false);
        assert!(outcome.route.is_some());
        assert_eq!(ctx.bindings[0].resolve("", "/fs/a/b/c.txt"), "a/b/c.txt");
    }

    #[test]
    fn lookup_when_infix_wildcard_then_resolves_suffix() {
        let tree = tree_with(&["/assets/*{path}/thumbnail"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/assets/a/b/c/thumbnail", &mut ctx, false);
        assert!(outcome.route.is_some());
        assert_eq!(ctx.bindings[0].resolve("", "/assets/a/b/c/thumbnail"), "a/b/c");
    }

    #[test]
    fn lookup_when_missing_trailing_slash_then_reports_tsr() {
        let tree = tree_with(&["/avengers/"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/avengers", &mut ctx, false);
        assert!(outcome.route.is_some());
        assert!(outcome.tsr);
    }

    #[test]
    fn lookup_when_missing_trailing_slash_on_isolated_multi_segment_route_then_reports_tsr() {
        // A single registered route compresses its whole pattern onto one
        // edge — no sibling route ever splits it at the final '/' — so the
        // deficit has to be detected mid-edge, not at a node boundary.
        let tree = tree_with(&["/foo/bar/"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/foo/bar", &mut ctx, false);
        assert!(outcome.route.is_some());
        assert!(outcome.tsr);
    }

    #[test]
    fn lookup_when_surplus_trailing_slash_then_reports_tsr() {
        let tree = tree_with(&["/avengers"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/avengers/", &mut ctx, false);
        assert!(outcome.route.is_some());
        assert!(outcome.tsr);
    }

    #[test]
    fn lookup_when_host_qualified_then_falls_back_to_path_only() {
        let tree = tree_with(&["example.com/avengers", "/shield"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "other.com", "/shield", &mut ctx, false);
        assert!(outcome.route.is_some());
        assert_eq!(&*outcome.route.unwrap().pattern, "/shield");
    }

    #[test]
    fn lookup_when_host_param_then_binds_label() {
        let tree = tree_with(&["{tenant}.example.com/dashboard"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "acme.example.com", "/dashboard", &mut ctx, false);
        assert!(outcome.route.is_some());
        assert_eq!(ctx.bindings[0].resolve("acme.example.com", "/dashboard"), "acme");
    }

    #[test]
    fn lookup_when_lazy_then_no_bindings_recorded() {
        let tree = tree_with(&["/avengers/{name}"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/avengers/ironman", &mut ctx, true);
        assert!(outcome.route.is_some());
        assert!(ctx.bindings.is_empty());
    }

    #[test]
    fn lookup_when_no_match_then_none() {
        let tree = tree_with(&["/avengers/ironman"]);
        let mut ctx = LookupContext::new();
        let outcome = lookup(&tree, "", "/avengers/thor", &mut ctx, false);
        assert!(outcome.route.is_none());
        assert!(ctx.bindings.is_empty());
    }
}

use std::sync::Arc;

use crate::enums::HttpMethod;
use crate::pattern::Token;
use crate::route::Route;

use super::error::{RadixError, RadixResult};
use super::node::{ParamChild, RadixNode, WildcardChild};

/// A flattened, prefix-compression-friendly view of a token stream: adjacent
/// `Token::Static` runs are concatenated, since nothing distinguishes a host
/// label boundary or a path segment boundary from any other literal byte
/// once the pattern has been validated.
enum Edge {
    Literal(Box<str>),
    Param { name: Arc<str>, host_side: bool },
    Wildcard { name: Arc<str>, infix: bool },
}

fn delimiter_for(host_side: bool) -> u8 {
    if host_side { b'.' } else { b'/' }
}

fn flatten(tokens: &[Token]) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(tokens.len());
    let mut pending = String::new();
    for token in tokens {
        match token {
            Token::Static { text, .. } => pending.push_str(text),
            Token::Param { name, host_side } => {
                if !pending.is_empty() {
                    edges.push(Edge::Literal(std::mem::take(&mut pending).into_boxed_str()));
                }
                edges.push(Edge::Param {
                    name: name.clone(),
                    host_side: *host_side,
                });
            }
            Token::Wildcard { name, infix } => {
                if !pending.is_empty() {
                    edges.push(Edge::Literal(std::mem::take(&mut pending).into_boxed_str()));
                }
                edges.push(Edge::Wildcard {
                    name: name.clone(),
                    infix: *infix,
                });
            }
        }
    }
    if !pending.is_empty() {
        edges.push(Edge::Literal(pending.into_boxed_str()));
    }
    edges
}

/// Inserts `route` into the tree rooted at `root`, returning a new root.
/// `root` and every node it shares with earlier snapshots are left untouched;
/// only nodes on the path to the new leaf are cloned.
#[tracing::instrument(level = "trace", skip_all, fields(method = %method, pattern = %pattern))]
pub fn insert<H>(
    root: &Arc<RadixNode<H>>,
    tokens: &[Token],
    route: Arc<Route<H>>,
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    let edges = flatten(tokens);
    insert_edges(root, &edges, route, method, pattern)
}

fn insert_edges<H>(
    node: &Arc<RadixNode<H>>,
    edges: &[Edge],
    route: Arc<Route<H>>,
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    match edges.first() {
        None => {
            if node.route.is_some() {
                return Err(RadixError::RouteExists {
                    method: method.clone(),
                    pattern: pattern.to_string(),
                });
            }
            let mut next = (**node).clone();
            next.route = Some(route);
            Ok(Arc::new(next))
        }
        Some(Edge::Literal(text)) => insert_literal(node, text, &edges[1..], route, method, pattern),
        Some(Edge::Param { name, host_side }) => {
            insert_param(node, name, *host_side, &edges[1..], route, method, pattern)
        }
        Some(Edge::Wildcard { name, infix }) => {
            insert_wildcard(node, name, *infix, &edges[1..], route, method, pattern)
        }
    }
}

fn insert_literal<H>(
    node: &Arc<RadixNode<H>>,
    text: &str,
    rest: &[Edge],
    route: Arc<Route<H>>,
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    if text.is_empty() {
        return insert_edges(node, rest, route, method, pattern);
    }
    let byte = text.as_bytes()[0];
    match node.child_at(byte) {
        None => {
            let mut next = (**node).clone();
            let leaf = build_chain(text, rest, route, method, pattern)?;
            next.put_child(byte, leaf);
            Ok(Arc::new(next))
        }
        Some(child) => {
            let common = common_prefix_len(text.as_bytes(), child.prefix.as_bytes());
            if common == child.prefix.len() {
                let remaining_text = &text[common..];
                let mut remaining_edges = Vec::with_capacity(rest.len() + 1);
                if !remaining_text.is_empty() {
                    remaining_edges.push(Edge::Literal(remaining_text.into()));
                }
                remaining_edges.extend(rest.iter().map(clone_edge));
                let new_child = insert_edges(child, &remaining_edges, route, method, pattern)?;
                let mut next = (**node).clone();
                next.put_child(byte, new_child);
                Ok(Arc::new(next))
            } else {
                // Split: introduce an intermediate node holding the shared
                // prefix, demoting the existing child under the remainder of
                // its old prefix.
                let mut demoted = (**child).clone();
                demoted.prefix = child.prefix[common..].into();
                let mut intermediate = RadixNode::<H>::new(&text[..common]);
                intermediate.put_child(demoted.prefix.as_bytes()[0], Arc::new(demoted));

                let remaining_text = &text[common..];
                let mut remaining_edges = Vec::with_capacity(rest.len() + 1);
                if !remaining_text.is_empty() {
                    remaining_edges.push(Edge::Literal(remaining_text.into()));
                }
                remaining_edges.extend(rest.iter().map(clone_edge));

                let new_intermediate = insert_edges(
                    &Arc::new(intermediate),
                    &remaining_edges,
                    route,
                    method,
                    pattern,
                )?;
                let mut next = (**node).clone();
                next.put_child(byte, new_intermediate);
                Ok(Arc::new(next))
            }
        }
    }
}

fn insert_param<H>(
    node: &Arc<RadixNode<H>>,
    name: &str,
    host_side: bool,
    rest: &[Edge],
    route: Arc<Route<H>>,
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    let mut next = (**node).clone();
    match &node.param_child {
        Some(existing) if &*existing.name != name => {
            return Err(RadixError::RouteConflict {
                method: method.clone(),
                pattern: pattern.to_string(),
                existing: existing.name.to_string(),
            });
        }
        Some(existing) => {
            let new_node = insert_edges(&existing.node, rest, route, method, pattern)?;
            next.param_child = Some(ParamChild::<H> {
                name: existing.name.clone(),
                delimiter: existing.delimiter,
                node: new_node,
            });
        }
        None => {
            let fresh = build_chain("", rest, route, method, pattern)?;
            next.param_child = Some(ParamChild::<H> {
                name: name.into(),
                delimiter: delimiter_for(host_side),
                node: fresh,
            });
        }
    }
    Ok(Arc::new(next))
}

fn insert_wildcard<H>(
    node: &Arc<RadixNode<H>>,
    name: &str,
    infix: bool,
    rest: &[Edge],
    route: Arc<Route<H>>,
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    let mut next = (**node).clone();
    match &node.wildcard_child {
        Some(existing) if &*existing.name != name => {
            return Err(RadixError::RouteConflict {
                method: method.clone(),
                pattern: pattern.to_string(),
                existing: existing.name.to_string(),
            });
        }
        Some(existing) => {
            let new_inode = insert_edges(&existing.inode, rest, route, method, pattern)?;
            next.wildcard_child = Some(WildcardChild::<H> {
                name: existing.name.clone(),
                infix,
                inode: new_inode,
            });
        }
        None => {
            let inode = build_chain("", rest, route, method, pattern)?;
            next.wildcard_child = Some(WildcardChild::<H> {
                name: name.into(),
                infix,
                inode,
            });
        }
    }
    Ok(Arc::new(next))
}

/// Builds a fresh chain of nodes for edges known not to exist in the tree
/// yet (no clone-on-write needed, since nothing is shared).
fn build_chain<H>(
    prefix: &str,
    edges: &[Edge],
    route: Arc<Route<H>>,
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    let mut node = RadixNode::<H>::new(prefix);
    match edges.first() {
        None => node.route = Some(route),
        Some(Edge::Literal(text)) => {
            let byte = text.as_bytes()[0];
            let child = build_chain(text, &edges[1..], route, method, pattern)?;
            node.put_child(byte, child);
        }
        Some(Edge::Param { name, host_side }) => {
            let child = build_chain("", &edges[1..], route, method, pattern)?;
            node.param_child = Some(ParamChild::<H> {
                name: name.clone(),
                delimiter: delimiter_for(*host_side),
                node: child,
            });
        }
        Some(Edge::Wildcard { name, infix }) => {
            let inode = build_chain("", &edges[1..], route, method, pattern)?;
            node.wildcard_child = Some(WildcardChild::<H> {
                name: name.clone(),
                infix: *infix,
                inode,
            });
        }
    }
    Ok(Arc::new(node))
}

fn clone_edge(edge: &Edge) -> Edge {
    match edge {
        Edge::Literal(text) => Edge::Literal(text.clone()),
        Edge::Param { name, host_side } => Edge::Param {
            name: name.clone(),
            host_side: *host_side,
        },
        Edge::Wildcard { name, infix } => Edge::Wildcard {
            name: name.clone(),
            infix: *infix,
        },
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Removes the route at the position described by `tokens`, returning a new
/// root with that leaf cleared. Nodes left with no route, no children and no
/// param/wildcard child are pruned as the recursion unwinds, so deleting a
/// route and re-inserting it restores the pre-insert tree shape exactly.
#[tracing::instrument(level = "trace", skip_all, fields(method = %method, pattern = %pattern))]
pub fn remove<H>(
    root: &Arc<RadixNode<H>>,
    tokens: &[Token],
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    let edges = flatten(tokens);
    match remove_edges(root, &edges, method, pattern)? {
        Some(new_root) => Ok(new_root),
        None => Ok(Arc::new(RadixNode::<H>::default())),
    }
}

fn remove_edges<H>(
    node: &Arc<RadixNode<H>>,
    edges: &[Edge],
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Option<Arc<RadixNode<H>>>> {
    match edges.first() {
        None => {
            if node.route.is_none() {
                return Err(RadixError::RouteNotFound {
                    method: method.clone(),
                    pattern: pattern.to_string(),
                });
            }
            let mut next = (**node).clone();
            next.route = None;
            Ok(prune(next))
        }
        Some(Edge::Literal(text)) => remove_literal(node, text, &edges[1..], method, pattern),
        Some(Edge::Param { .. }) => {
            let existing = node.param_child.as_ref().ok_or_else(|| RadixError::RouteNotFound {
                method: method.clone(),
                pattern: pattern.to_string(),
            })?;
            let mut next = (**node).clone();
            match remove_edges(&existing.node, &edges[1..], method, pattern)? {
                Some(new_node) => {
                    next.param_child = Some(ParamChild::<H> {
                        name: existing.name.clone(),
                        delimiter: existing.delimiter,
                        node: new_node,
                    });
                }
                None => next.param_child = None,
            }
            Ok(prune(next))
        }
        Some(Edge::Wildcard { .. }) => {
            let existing = node
                .wildcard_child
                .as_ref()
                .ok_or_else(|| RadixError::RouteNotFound {
                    method: method.clone(),
                    pattern: pattern.to_string(),
                })?;
            let infix = existing.infix;
            let mut next = (**node).clone();
            match remove_edges(&existing.inode, &edges[1..], method, pattern)? {
                Some(new_inode) => {
                    next.wildcard_child = Some(WildcardChild::<H> {
                        name: existing.name.clone(),
                        infix,
                        inode: new_inode,
                    });
                }
                None => next.wildcard_child = None,
            }
            Ok(prune(next))
        }
    }
}

fn remove_literal<H>(
    node: &Arc<RadixNode<H>>,
    text: &str,
    rest: &[Edge],
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Option<Arc<RadixNode<H>>>> {
    if text.is_empty() {
        return remove_edges(node, rest, method, pattern);
    }
    let byte = text.as_bytes()[0];
    let child = node.child_at(byte).ok_or_else(|| RadixError::RouteNotFound {
        method: method.clone(),
        pattern: pattern.to_string(),
    })?;
    if !text.starts_with(&*child.prefix) {
        return Err(RadixError::RouteNotFound {
            method: method.clone(),
            pattern: pattern.to_string(),
        });
    }
    let remaining_text = &text[child.prefix.len()..];
    let mut remaining_edges = Vec::with_capacity(rest.len() + 1);
    if !remaining_text.is_empty() {
        remaining_edges.push(Edge::Literal(remaining_text.into()));
    }
    remaining_edges.extend(rest.iter().map(clone_edge));

    let mut next = (**node).clone();
    match remove_edges(child, &remaining_edges, method, pattern)? {
        Some(new_child) => {
            next.put_child(byte, new_child);
        }
        None => {
            next.remove_child(byte);
        }
    }
    Ok(prune(next))
}

/// Replaces the handler of the route registered at the position described by
/// `tokens`, leaving every other field of its `Route` — pattern, methods,
/// param names, trailing-slash policy — untouched, so a lookup through the
/// updated tree still binds the same parameters (spec §8 round-trip).
/// Returns a new root with only the nodes on the path to that leaf cloned.
#[tracing::instrument(level = "trace", skip_all, fields(method = %method, pattern = %pattern))]
pub fn update<H>(
    root: &Arc<RadixNode<H>>,
    tokens: &[Token],
    handler: Arc<H>,
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    let edges = flatten(tokens);
    update_edges(root, &edges, handler, method, pattern)
}

fn update_edges<H>(
    node: &Arc<RadixNode<H>>,
    edges: &[Edge],
    handler: Arc<H>,
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    match edges.first() {
        None => {
            let existing = node.route.as_ref().ok_or_else(|| RadixError::RouteNotFound {
                method: method.clone(),
                pattern: pattern.to_string(),
            })?;
            let mut updated_route = (**existing).clone();
            updated_route.handler = handler;
            let mut next = (**node).clone();
            next.route = Some(Arc::new(updated_route));
            Ok(Arc::new(next))
        }
        Some(Edge::Literal(text)) => update_literal(node, text, &edges[1..], handler, method, pattern),
        Some(Edge::Param { .. }) => {
            let existing = node.param_child.as_ref().ok_or_else(|| RadixError::RouteNotFound {
                method: method.clone(),
                pattern: pattern.to_string(),
            })?;
            let new_node = update_edges(&existing.node, &edges[1..], handler, method, pattern)?;
            let mut next = (**node).clone();
            next.param_child = Some(ParamChild::<H> {
                name: existing.name.clone(),
                delimiter: existing.delimiter,
                node: new_node,
            });
            Ok(Arc::new(next))
        }
        Some(Edge::Wildcard { .. }) => {
            let existing = node
                .wildcard_child
                .as_ref()
                .ok_or_else(|| RadixError::RouteNotFound {
                    method: method.clone(),
                    pattern: pattern.to_string(),
                })?;
            let infix = existing.infix;
            let new_inode = update_edges(&existing.inode, &edges[1..], handler, method, pattern)?;
            let mut next = (**node).clone();
            next.wildcard_child = Some(WildcardChild::<H> {
                name: existing.name.clone(),
                infix,
                inode: new_inode,
            });
            Ok(Arc::new(next))
        }
    }
}

fn update_literal<H>(
    node: &Arc<RadixNode<H>>,
    text: &str,
    rest: &[Edge],
    handler: Arc<H>,
    method: &HttpMethod,
    pattern: &str,
) -> RadixResult<Arc<RadixNode<H>>> {
    if text.is_empty() {
        return update_edges(node, rest, handler, method, pattern);
    }
    let byte = text.as_bytes()[0];
    let child = node.child_at(byte).ok_or_else(|| RadixError::RouteNotFound {
        method: method.clone(),
        pattern: pattern.to_string(),
    })?;
    if !text.starts_with(&*child.prefix) {
        return Err(RadixError::RouteNotFound {
            method: method.clone(),
            pattern: pattern.to_string(),
        });
    }
    let remaining_text = &text[child.prefix.len()..];
    let mut remaining_edges = Vec::with_capacity(rest.len() + 1);
    if !remaining_text.is_empty() {
        remaining_edges.push(Edge::Literal(remaining_text.into()));
    }
    remaining_edges.extend(rest.iter().map(clone_edge));

    let new_child = update_edges(child, &remaining_edges, handler, method, pattern)?;
    let mut next = (**node).clone();
    next.put_child(byte, new_child);
    Ok(Arc::new(next))
}

/// Returns `None` when `node` has become empty (no route, no children, no
/// param/wildcard child), signalling the caller to drop its edge entirely.
fn prune<H>(node: RadixNode<H>) -> Option<Arc<RadixNode<H>>> {
    if node.is_leaf_empty() {
        None
    } else {
        Some(Arc::new(node))
    }
}

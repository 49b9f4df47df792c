use std::sync::Arc;

use parking_lot::MutexGuard;
use thiserror::Error;

use crate::config::RouteOptions;
use crate::context::LookupContext;
use crate::enums::HttpMethod;
use crate::lookup::{self, LookupOutcome};
use crate::pattern::{self, ParserLimits, PatternError};
use crate::radix::{self, RadixError};
use crate::roots::RootSet;
use crate::route::{ClientIpResolver, MiddlewareFn, MiddlewareScope, Route};
use crate::router::Router;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Active,
    Committed,
    Aborted,
}

/// Failures a [`Transaction`] can surface, per spec §4.E/§7.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("transaction has already committed or aborted")]
    SettledTransaction,
    #[error("cannot write through a read-only transaction")]
    ReadOnlyTransaction,
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Radix(#[from] RadixError),
}

/// Everything needed to register one route, handed to [`Transaction::insert`].
pub struct RouteSpec<H> {
    pub pattern: Box<str>,
    pub methods: Vec<HttpMethod>,
    pub handler: Arc<H>,
    pub middleware: Vec<(MiddlewareScope, MiddlewareFn<H>)>,
    pub client_ip_resolver: Option<Arc<dyn ClientIpResolver>>,
    pub options: RouteOptions,
}

/// A single isolated read-write or read-only view of the router (component
/// E). Borrows the [`Router`] for the writer lock's lifetime, so the lock is
/// released by ordinary `Drop` the moment the transaction goes out of scope
/// — an abandoned write transaction aborts itself for free.
pub struct Transaction<'r, H> {
    router: &'r Router<H>,
    kind: TransactionKind,
    state: TxState,
    snapshot: Arc<RootSet<H>>,
    staged: RootSet<H>,
    _write_guard: Option<MutexGuard<'r, ()>>,
}

impl<'r, H> Transaction<'r, H> {
    pub(crate) fn new(
        router: &'r Router<H>,
        kind: TransactionKind,
        snapshot: Arc<RootSet<H>>,
        write_guard: Option<MutexGuard<'r, ()>>,
    ) -> Self {
        let staged = (*snapshot).clone();
        Self {
            router,
            kind,
            state: TxState::Active,
            snapshot,
            staged,
            _write_guard: write_guard,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Queries this transaction's own isolated view (spec §4.E): a read-only
    /// transaction matches against the snapshot it was opened with, a write
    /// transaction against its staged (not yet published) edits. Either way
    /// the result never observes changes made by another transaction after
    /// this one began.
    pub fn lookup(
        &self,
        method: &HttpMethod,
        host: &str,
        path: &str,
        ctx: &mut LookupContext,
        lazy: bool,
    ) -> Result<LookupOutcome<H>, TransactionError> {
        self.require_active()?;
        let root: &RootSet<H> = match self.kind {
            TransactionKind::Read => &self.snapshot,
            TransactionKind::Write => &self.staged,
        };
        Ok(match root.get(method) {
            Some(tree) => lookup::lookup(tree, host, path, ctx, lazy),
            None => LookupOutcome { route: None, tsr: false },
        })
    }

    /// Every route visible to this transaction — the snapshot it opened
    /// against for a read-only transaction, or the staged (uncommitted)
    /// state for a write transaction (spec §10).
    pub fn routes(&self) -> Result<Vec<Arc<Route<H>>>, TransactionError> {
        self.require_active()?;
        Ok(match self.kind {
            TransactionKind::Read => self.snapshot.collect_routes(),
            TransactionKind::Write => self.staged.collect_routes(),
        })
    }

    fn require_active(&self) -> Result<(), TransactionError> {
        match self.state {
            TxState::Active => Ok(()),
            TxState::Committed | TxState::Aborted => Err(TransactionError::SettledTransaction),
        }
    }

    fn require_write(&self) -> Result<(), TransactionError> {
        if self.kind != TransactionKind::Write {
            return Err(TransactionError::ReadOnlyTransaction);
        }
        Ok(())
    }

    /// Inserts a route for every method in `spec.methods`, sharing one
    /// `Arc<Route<H>>` across all of them (spec §3: a multi-method route
    /// costs one allocation regardless of method count).
    #[tracing::instrument(level = "debug", skip(self, spec), fields(pattern = %spec.pattern))]
    pub fn insert(&mut self, spec: RouteSpec<H>) -> Result<(), TransactionError> {
        self.require_active()?;
        self.require_write()?;

        let limits = ParserLimits {
            max_params_per_route: self.router.options().max_params_per_route,
            max_param_key_bytes: self.router.options().max_param_key_bytes,
        };
        let parsed = pattern::parse_pattern(&spec.pattern, &limits)?;

        let trailing_slash = spec
            .options
            .trailing_slash
            .unwrap_or(self.router.options().trailing_slash);
        let route = Arc::new(Route {
            pattern: spec.pattern.clone(),
            methods: spec.methods.clone(),
            handler: spec.handler,
            middleware: spec.middleware,
            annotations: spec.options.annotations.iter().cloned().collect(),
            trailing_slash,
            client_ip_resolver: spec.client_ip_resolver,
            param_names: parsed.param_names.clone(),
            host_path_split: parsed.host_path_split,
        });

        for method in &spec.methods {
            let tree = self.staged.get_mut_or_insert(method);
            if parsed.has_host() {
                let base = tree.host_root.take().unwrap_or_default();
                let new_root = radix::insert(&base, &parsed.tokens, route.clone(), method, &spec.pattern)?;
                tree.host_root = Some(new_root);
            } else {
                let new_root = radix::insert(&tree.path_root, &parsed.tokens, route.clone(), method, &spec.pattern)?;
                tree.path_root = new_root;
            }
        }
        Ok(())
    }

    /// Replaces the handler of the route registered at `pattern` for
    /// `method`, leaving its parameter bindings, trailing-slash policy and
    /// every other field untouched (spec §4.E, §8 round-trip).
    #[tracing::instrument(level = "debug", skip(self, handler), fields(method = %method))]
    pub fn update(&mut self, pattern: &str, method: &HttpMethod, handler: Arc<H>) -> Result<(), TransactionError> {
        self.require_active()?;
        self.require_write()?;

        let parsed = pattern::parse_pattern(pattern, &ParserLimits::default())?;
        let tree = self.staged.get_mut_or_insert(method);
        if parsed.has_host() {
            let base = tree.host_root.take().ok_or_else(|| RadixError::RouteNotFound {
                method: method.clone(),
                pattern: pattern.to_string(),
            })?;
            let new_root = radix::update(&base, &parsed.tokens, handler, method, pattern)?;
            tree.host_root = Some(new_root);
        } else {
            let new_root = radix::update(&tree.path_root, &parsed.tokens, handler, method, pattern)?;
            tree.path_root = new_root;
        }
        Ok(())
    }

    /// Removes the route registered at `pattern` for `method`.
    #[tracing::instrument(level = "debug", skip(self), fields(method = %method))]
    pub fn remove(&mut self, pattern: &str, method: &HttpMethod) -> Result<(), TransactionError> {
        self.require_active()?;
        self.require_write()?;

        let parsed = pattern::parse_pattern(pattern, &ParserLimits::default())?;
        let tree = self.staged.get_mut_or_insert(method);
        if parsed.has_host() {
            let base = tree.host_root.take().ok_or_else(|| RadixError::RouteNotFound {
                method: method.clone(),
                pattern: pattern.to_string(),
            })?;
            let new_root = radix::remove(&base, &parsed.tokens, method, pattern)?;
            tree.host_root = Some(new_root);
        } else {
            let new_root = radix::remove(&tree.path_root, &parsed.tokens, method, pattern)?;
            tree.path_root = new_root;
        }
        Ok(())
    }

    /// Publishes the staged root set via a single atomic store (spec §4.E
    /// "Publish"). Readers that loaded the old pointer keep traversing the
    /// old tree; later loads see the new one.
    pub fn commit(&mut self) -> Result<(), TransactionError> {
        self.require_active()?;
        self.require_write()?;
        self.router.root.store(Arc::new(std::mem::take(&mut self.staged)));
        self.state = TxState::Committed;
        Ok(())
    }

    /// Discards staged changes and releases the writer lock (for write
    /// transactions) on return.
    pub fn abort(&mut self) -> Result<(), TransactionError> {
        self.require_active()?;
        self.state = TxState::Aborted;
        Ok(())
    }
}

impl<'r, H> Drop for Transaction<'r, H> {
    fn drop(&mut self) {
        if self.state == TxState::Active {
            self.state = TxState::Aborted;
        }
    }
}

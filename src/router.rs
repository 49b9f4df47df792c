use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::config::RouterOptions;
use crate::context::{ContextPool, LookupContext};
use crate::enums::HttpMethod;
use crate::lookup::{self, LookupOutcome};
use crate::roots::RootSet;
use crate::transaction::{Transaction, TransactionKind};

/// The top-level router: an atomically published root set (spec §3) plus
/// the writer-serialization lock and context pool every transaction and
/// lookup shares (spec §5).
pub struct Router<H> {
    pub(crate) root: ArcSwap<RootSet<H>>,
    pub(crate) writer_lock: Mutex<()>,
    pool: ContextPool,
    options: RouterOptions,
}

impl<H> Router<H> {
    pub fn new(options: RouterOptions) -> Self {
        Self {
            root: ArcSwap::new(Arc::new(RootSet::default())),
            writer_lock: Mutex::new(()),
            pool: ContextPool::new(options.context_pool_cap),
            options,
        }
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    /// Begins a write transaction, blocking until any other writer
    /// finishes. Never blocks a concurrent reader — `ArcSwap::load` takes
    /// no lock.
    pub fn begin_write(&self) -> Transaction<'_, H> {
        let guard = self.writer_lock.lock();
        let snapshot = self.root.load_full();
        Transaction::new(self, TransactionKind::Write, snapshot, Some(guard))
    }

    /// Begins a read-only transaction over the currently published root set.
    pub fn begin_read(&self) -> Transaction<'_, H> {
        let snapshot = self.root.load_full();
        Transaction::new(self, TransactionKind::Read, snapshot, None)
    }

    /// Runs the lookup engine against the live root set (spec §4.F.1-3),
    /// checking out a context from the pool for the caller to read bindings
    /// from and eventually return via [`Router::release_context`].
    #[tracing::instrument(level = "trace", skip(self, host, path), fields(method = %method))]
    pub fn lookup(&self, method: &HttpMethod, host: &str, path: &str, lazy: bool) -> (LookupOutcome<H>, Box<LookupContext>) {
        let root = self.root.load();
        let mut ctx = self.pool.checkout();
        let outcome = match root.get(method) {
            Some(tree) => lookup::lookup(tree, host, path, &mut ctx, lazy),
            None => LookupOutcome { route: None, tsr: false },
        };
        (outcome, ctx)
    }

    /// Lists every method other than `exclude` whose tree matches `path`,
    /// for 405-vs-404 and auto-OPTIONS dispatch (spec §4.F.6-7).
    pub fn methods_matching(&self, path: &str, exclude: Option<&HttpMethod>) -> Vec<HttpMethod> {
        let root = self.root.load();
        let mut ctx = LookupContext::new();
        root.trees()
            .filter(|tree| exclude != Some(&tree.method))
            .filter(|tree| {
                let outcome = lookup::lookup(tree, "", path, &mut ctx, true);
                ctx.clear();
                outcome.route.is_some()
            })
            .map(|tree| tree.method.clone())
            .collect()
    }

    /// Every method with at least one registered route, for `OPTIONS *`
    /// (spec §4.F.7).
    pub fn registered_methods(&self) -> Vec<HttpMethod> {
        self.root
            .load()
            .trees()
            .filter(|tree| !tree.is_empty())
            .map(|tree| tree.method.clone())
            .collect()
    }

    pub fn release_context(&self, ctx: Box<LookupContext>) {
        self.pool.checkin(ctx);
    }

    /// Checks out a pooled context without running a lookup, for dispatch
    /// paths (e.g. auto-OPTIONS) that bypass the lookup engine entirely but
    /// still need a context handle to hand back to the caller symmetrically.
    pub fn checkout_context(&self) -> Box<LookupContext> {
        self.pool.checkout()
    }
}

use std::sync::Arc;

use parking_lot::Mutex;

/// Which input string a [`ParamBinding`]'s byte range indexes into. Keeping
/// this as an offset pair rather than a borrowed `&str` is what lets
/// [`LookupContext`] outlive any single request and sit in a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    Host,
    Path,
}

#[derive(Debug, Clone)]
pub struct ParamBinding {
    pub name: Arc<str>,
    pub source: BindingSource,
    pub start: u32,
    pub end: u32,
}

impl ParamBinding {
    pub fn resolve<'a>(&self, host: &'a str, path: &'a str) -> &'a str {
        let src = match self.source {
            BindingSource::Host => host,
            BindingSource::Path => path,
        };
        &src[self.start as usize..self.end as usize]
    }
}

/// A reusable per-lookup scratch buffer (spec §4.D / §5 "context pool").
/// Holds no borrowed data, so the same allocation can serve any number of
/// requests back to back.
#[derive(Debug, Default)]
pub struct LookupContext {
    pub(crate) bindings: Vec<ParamBinding>,
    pub(crate) tsr_bindings: Vec<ParamBinding>,
}

impl LookupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
        self.tsr_bindings.clear();
    }

    /// Parameter bindings captured by the most recent lookup through this
    /// context, in the order their placeholders appear in the pattern.
    pub fn bindings(&self) -> &[ParamBinding] {
        &self.bindings
    }

    /// Byte size of the two buffers' backing storage, used to decide whether
    /// a context has grown past its pool cap and should be dropped instead
    /// of returned (spec §4.F.8, §9).
    pub(crate) fn capacity_footprint(&self) -> usize {
        self.bindings.capacity() + self.tsr_bindings.capacity()
    }
}

/// A bounded stack of reusable [`LookupContext`]s shared by every dispatch on
/// a `Router`. `parking_lot::Mutex` rather than a lock-free structure, same
/// tradeoff the teacher makes elsewhere: contention here is brief (a push or
/// pop), so a lock is simpler than a lock-free queue for no measurable cost.
#[derive(Debug)]
pub struct ContextPool {
    contexts: Mutex<Vec<Box<LookupContext>>>,
    cap: usize,
}

impl ContextPool {
    pub fn new(cap: usize) -> Self {
        Self {
            contexts: Mutex::new(Vec::new()),
            cap,
        }
    }

    pub fn checkout(&self) -> Box<LookupContext> {
        self.contexts
            .lock()
            .pop()
            .unwrap_or_else(|| Box::new(LookupContext::new()))
    }

    pub fn checkin(&self, mut ctx: Box<LookupContext>) {
        if self.cap == 0 || ctx.capacity_footprint() >= self.cap {
            return;
        }
        ctx.clear();
        self.contexts.lock().push(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_when_checkin_then_checkout_reuses_allocation() {
        let pool = ContextPool::new(64);
        let mut ctx = pool.checkout();
        ctx.bindings.push(ParamBinding {
            name: Arc::from("id"),
            source: BindingSource::Path,
            start: 0,
            end: 1,
        });
        pool.checkin(ctx);
        let ctx = pool.checkout();
        assert!(ctx.bindings.is_empty());
    }

    #[test]
    fn pool_when_oversized_then_context_dropped() {
        let pool = ContextPool::new(0);
        let ctx = pool.checkout();
        pool.checkin(ctx);
        assert_eq!(pool.contexts.lock().len(), 0);
    }
}

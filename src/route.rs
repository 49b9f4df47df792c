use std::net::IpAddr;
use std::sync::Arc;

use bitflags::bitflags;
use hashbrown::HashMap;

use crate::enums::HttpMethod;

/// How a trailing-slash-redirect (TSR) candidate match is handled, per route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum TrailingSlashPolicy {
    /// Emit a 301/308 redirect to the canonical form.
    Redirect,
    /// Dispatch to the handler as if it had matched directly.
    Relaxed,
    /// Treat a TSR-only match as no match at all.
    #[default]
    Strict,
}

/// How a structurally malformed request path is handled at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum MalformedPathPolicy {
    #[default]
    Strict,
    Relaxed,
    Redirect,
}

bitflags! {
    /// Which dispatch phases a piece of middleware runs in. Carried
    /// opaquely — the core composes the chain, it never executes it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MiddlewareScope: u8 {
        const PRE_MATCH = 0b0001;
        const POST_MATCH = 0b0010;
        const ON_ERROR = 0b0100;
    }
}

/// Opaque middleware hook. The core never invokes this; it only carries it
/// on the `Route` for the caller's dispatch layer to compose.
pub type MiddlewareFn<H> = Arc<dyn Fn(&H) + Send + Sync>;

/// Strategy for deriving a client IP from a request. Implementations live
/// entirely outside the core; this trait is only the seam.
pub trait ClientIpResolver: Send + Sync {
    fn resolve(&self, forwarded_for: Option<&str>, peer_addr: Option<IpAddr>) -> Option<IpAddr>;
}

/// An immutable, once-built route record (spec §3). Shared via `Arc` across
/// every method-tree leaf it is registered under, so a multi-method route
/// costs one allocation regardless of how many trees reference it.
pub struct Route<H> {
    pub pattern: Box<str>,
    pub methods: Vec<HttpMethod>,
    pub handler: Arc<H>,
    pub middleware: Vec<(MiddlewareScope, MiddlewareFn<H>)>,
    pub annotations: HashMap<Box<str>, Box<str>>,
    pub trailing_slash: TrailingSlashPolicy,
    pub client_ip_resolver: Option<Arc<dyn ClientIpResolver>>,
    pub param_names: Vec<Arc<str>>,
    /// Byte offset in `pattern` separating hostname from path; `0` when the
    /// pattern has no host.
    pub host_path_split: usize,
}

// `H` sits behind `Arc` everywhere it appears, so `Route<H>` is `Clone`
// regardless of whether `H` itself is — a derive would wrongly require it.
impl<H> Clone for Route<H> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            methods: self.methods.clone(),
            handler: self.handler.clone(),
            middleware: self.middleware.clone(),
            annotations: self.annotations.clone(),
            trailing_slash: self.trailing_slash,
            client_ip_resolver: self.client_ip_resolver.clone(),
            param_names: self.param_names.clone(),
            host_path_split: self.host_path_split,
        }
    }
}

impl<H> std::fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("trailing_slash", &self.trailing_slash)
            .field("param_names", &self.param_names)
            .field("host_path_split", &self.host_path_split)
            .finish_non_exhaustive()
    }
}

impl<H> Route<H> {
    pub fn has_host(&self) -> bool {
        self.host_path_split > 0
    }
}

//! A concurrent, copy-on-write HTTP request router core.
//!
//! The router is generic over an opaque handler type `H`: this crate only
//! matches a `(method, host, path)` triple to a registered [`Route`] and
//! its bound parameters — invoking the handler, composing middleware, and
//! resolving a client IP are all left to the caller (spec §1 non-goals).

pub mod config;
pub mod context;
pub mod dispatch;
pub mod enums;
pub mod errors;
pub mod lookup;
pub mod pattern;
pub mod radix;
pub mod redirect;
pub mod roots;
pub mod route;
pub mod router;
pub mod transaction;

pub use config::{RouteOptions, RouterOptions, RouterOptionsError};
pub use context::{BindingSource, ContextPool, LookupContext, ParamBinding};
pub use dispatch::{dispatch, DispatchRequest, MatchOutcome};
pub use enums::HttpMethod;
pub use errors::{RouterError, RouterResult};
pub use lookup::LookupOutcome;
pub use pattern::{ParsedPattern, ParserLimits, PatternError};
pub use radix::RadixError;
pub use roots::{MethodTree, RootSet};
pub use route::{ClientIpResolver, MalformedPathPolicy, MiddlewareFn, MiddlewareScope, Route, TrailingSlashPolicy};
pub use router::Router;
pub use transaction::{RouteSpec, Transaction, TransactionError, TransactionKind};

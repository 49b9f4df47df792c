//! Component F: request dispatch on top of the lookup engine — direct
//! match, TSR-policy branching, 404/405 with `Allow`, and auto-OPTIONS.

use std::sync::Arc;

use crate::context::LookupContext;
use crate::enums::HttpMethod;
use crate::redirect;
use crate::route::{Route, TrailingSlashPolicy};
use crate::router::Router;

/// The caller-facing result of one dispatch (spec §4.F).
pub enum MatchOutcome<H> {
    Matched {
        route: Arc<Route<H>>,
    },
    Redirect {
        location: String,
        status: u16,
        body: Option<String>,
    },
    MethodNotAllowed {
        allow: Vec<HttpMethod>,
    },
    NotFound,
    /// Auto-generated response to an `OPTIONS` request (spec §4.F.7).
    Options {
        allow: Vec<HttpMethod>,
    },
}

/// Request-specific inputs dispatch needs beyond what the lookup engine
/// takes directly.
pub struct DispatchRequest<'a> {
    pub method: &'a HttpMethod,
    pub host: &'a str,
    pub path: &'a str,
    /// The unescaped-but-validated path the lookup engine matches against.
    pub raw_path: &'a str,
    pub query: Option<&'a str>,
    pub content_type_already_set: bool,
}

/// Runs dispatch for one request, returning the outcome and the pooled
/// context the caller must return via [`Router::release_context`].
#[tracing::instrument(level = "trace", skip(router, request), fields(method = %request.method))]
pub fn dispatch<H>(router: &Router<H>, request: &DispatchRequest<'_>) -> (MatchOutcome<H>, Box<LookupContext>) {
    if *request.method == HttpMethod::Options && router.options().handle_options {
        let allow = if request.path == "*" {
            router.registered_methods()
        } else {
            router.methods_matching(request.path, None)
        };
        return (MatchOutcome::Options { allow }, router.checkout_context());
    }

    let (outcome, ctx) = router.lookup(request.method, request.host, request.path, false);
    match outcome.route {
        Some(route) if !outcome.tsr => (MatchOutcome::Matched { route }, ctx),
        Some(route) => match route.trailing_slash {
            TrailingSlashPolicy::Relaxed => (MatchOutcome::Matched { route }, ctx),
            TrailingSlashPolicy::Strict => (not_found_or_405(router, request), ctx),
            TrailingSlashPolicy::Redirect => {
                let location = redirect::redirect_target(request.raw_path, request.query);
                let status = redirect::redirect_status(request.method);
                let body = redirect::redirect_body(request.method, request.content_type_already_set, &location);
                (MatchOutcome::Redirect { location, status, body }, ctx)
            }
        },
        None => (not_found_or_405(router, request), ctx),
    }
}

fn not_found_or_405<H>(router: &Router<H>, request: &DispatchRequest<'_>) -> MatchOutcome<H> {
    if router.options().handle_method_not_allowed {
        let allow = router.methods_matching(request.path, Some(request.method));
        if !allow.is_empty() {
            return MatchOutcome::MethodNotAllowed { allow };
        }
    }
    MatchOutcome::NotFound
}

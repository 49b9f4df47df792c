use thiserror::Error;

use crate::enums::HttpMethod;

/// Reasons the radix tree (component B) rejects a staged mutation.
#[derive(Debug, Error, Clone)]
pub enum RadixError {
    #[error("route already exists for {method} '{pattern}'")]
    RouteExists { method: HttpMethod, pattern: String },
    #[error(
        "pattern '{pattern}' conflicts with existing pattern '{existing}' for {method} at the same tree position"
    )]
    RouteConflict {
        method: HttpMethod,
        pattern: String,
        existing: String,
    },
    #[error("no route registered for {method} '{pattern}'")]
    RouteNotFound { method: HttpMethod, pattern: String },
}

pub type RadixResult<T> = Result<T, RadixError>;

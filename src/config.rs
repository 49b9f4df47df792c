use thiserror::Error;

use crate::route::{MalformedPathPolicy, TrailingSlashPolicy};

const DEFAULT_MAX_PARAMS_PER_ROUTE: u16 = 16;
const DEFAULT_MAX_PARAM_KEY_BYTES: u16 = 64;

/// Construction-time options for a [`crate::Router`], validated once and
/// immutable for the router's lifetime. Mirrors the teacher's
/// `RouterConfig`/`RouteOptions::validate()` pattern.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub max_params_per_route: u16,
    pub max_param_key_bytes: u16,
    pub handle_method_not_allowed: bool,
    pub handle_options: bool,
    pub trailing_slash: TrailingSlashPolicy,
    pub handle_malformed_path: MalformedPathPolicy,
    /// Cap on a pooled lookup context's buffers before it is discarded
    /// instead of returned to the pool (spec §4.F.8 / §9).
    pub context_pool_cap: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_params_per_route: DEFAULT_MAX_PARAMS_PER_ROUTE,
            max_param_key_bytes: DEFAULT_MAX_PARAM_KEY_BYTES,
            handle_method_not_allowed: true,
            handle_options: true,
            trailing_slash: TrailingSlashPolicy::default(),
            handle_malformed_path: MalformedPathPolicy::default(),
            context_pool_cap: 64,
        }
    }
}

impl RouterOptions {
    pub fn builder() -> RouterOptionsBuilder {
        RouterOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), RouterOptionsError> {
        if self.max_params_per_route == 0 {
            return Err(RouterOptionsError::MaxParamsPerRouteZero);
        }
        if self.max_param_key_bytes == 0 {
            return Err(RouterOptionsError::MaxParamKeyBytesZero);
        }
        if self.context_pool_cap == 0 {
            return Err(RouterOptionsError::ContextPoolCapZero);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct RouterOptionsBuilder {
    options: RouterOptions,
}

impl RouterOptionsBuilder {
    pub fn max_params_per_route(mut self, value: u16) -> Self {
        self.options.max_params_per_route = value;
        self
    }

    pub fn max_param_key_bytes(mut self, value: u16) -> Self {
        self.options.max_param_key_bytes = value;
        self
    }

    pub fn handle_method_not_allowed(mut self, value: bool) -> Self {
        self.options.handle_method_not_allowed = value;
        self
    }

    pub fn handle_options(mut self, value: bool) -> Self {
        self.options.handle_options = value;
        self
    }

    pub fn trailing_slash(mut self, value: TrailingSlashPolicy) -> Self {
        self.options.trailing_slash = value;
        self
    }

    pub fn handle_malformed_path(mut self, value: MalformedPathPolicy) -> Self {
        self.options.handle_malformed_path = value;
        self
    }

    pub fn context_pool_cap(mut self, value: usize) -> Self {
        self.options.context_pool_cap = value;
        self
    }

    pub fn build(self) -> Result<RouterOptions, RouterOptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

/// Per-route overrides layered onto a [`RouterOptions`] at registration time.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    pub trailing_slash: Option<TrailingSlashPolicy>,
    pub annotations: Vec<(Box<str>, Box<str>)>,
}

impl RouteOptions {
    pub fn builder() -> RouteOptionsBuilder {
        RouteOptionsBuilder::default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct RouteOptionsBuilder {
    options: RouteOptions,
}

impl RouteOptionsBuilder {
    pub fn trailing_slash(mut self, value: TrailingSlashPolicy) -> Self {
        self.options.trailing_slash = Some(value);
        self
    }

    pub fn annotation(mut self, key: impl Into<Box<str>>, value: impl Into<Box<str>>) -> Self {
        self.options.annotations.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> RouteOptions {
        self.options
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterOptionsError {
    #[error("max_params_per_route must be greater than zero")]
    MaxParamsPerRouteZero,
    #[error("max_param_key_bytes must be greater than zero")]
    MaxParamKeyBytesZero,
    #[error("context_pool_cap must be greater than zero")]
    ContextPoolCapZero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_when_defaults_then_valid() {
        assert!(RouterOptions::default().validate().is_ok());
    }

    #[test]
    fn options_when_zero_params_then_rejected() {
        let err = RouterOptions::builder()
            .max_params_per_route(0)
            .build()
            .unwrap_err();
        assert_eq!(err, RouterOptionsError::MaxParamsPerRouteZero);
    }
}

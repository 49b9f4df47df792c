use std::sync::Arc;

use bunner_router_rs::config::RouteOptions;
use bunner_router_rs::transaction::RouteSpec;
use bunner_router_rs::{
    dispatch, DispatchRequest, HttpMethod, MatchOutcome, Router, RouterOptions, RouterOptionsError,
    TrailingSlashPolicy,
};

fn spec(pattern: &str) -> RouteSpec<u32> {
    RouteSpec {
        pattern: pattern.into(),
        methods: vec![HttpMethod::Get],
        handler: Arc::new(0),
        middleware: Vec::new(),
        client_ip_resolver: None,
        options: RouteOptions::default(),
    }
}

fn request<'a>(method: &'a HttpMethod, path: &'a str) -> DispatchRequest<'a> {
    DispatchRequest {
        method,
        host: "",
        path,
        raw_path: path,
        query: None,
        content_type_already_set: false,
    }
}

#[test]
fn router_options_when_defaults_then_valid() {
    assert!(RouterOptions::default().validate().is_ok());
}

#[test]
fn router_options_when_zero_max_params_per_route_then_rejected() {
    let err = RouterOptions::builder().max_params_per_route(0).build().unwrap_err();
    assert_eq!(err, RouterOptionsError::MaxParamsPerRouteZero);
}

#[test]
fn router_options_when_zero_max_param_key_bytes_then_rejected() {
    let err = RouterOptions::builder().max_param_key_bytes(0).build().unwrap_err();
    assert_eq!(err, RouterOptionsError::MaxParamKeyBytesZero);
}

#[test]
fn router_options_when_zero_context_pool_cap_then_rejected() {
    let err = RouterOptions::builder().context_pool_cap(0).build().unwrap_err();
    assert_eq!(err, RouterOptionsError::ContextPoolCapZero);
}

#[test]
fn router_when_strict_trailing_slash_then_tsr_candidate_reports_not_found() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    let mut tx = router.begin_write();
    tx.insert(spec("/avengers/")).unwrap();
    tx.commit().unwrap();

    let method = HttpMethod::Get;
    let (outcome, ctx) = dispatch(&router, &request(&method, "/avengers"));
    assert!(matches!(outcome, MatchOutcome::NotFound));
    router.release_context(ctx);
}

#[test]
fn router_when_relaxed_trailing_slash_then_tsr_candidate_dispatches_as_matched() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    let mut tx = router.begin_write();
    tx.insert(RouteSpec {
        options: RouteOptions::builder().trailing_slash(TrailingSlashPolicy::Relaxed).build(),
        ..spec("/avengers/")
    })
    .unwrap();
    tx.commit().unwrap();

    let method = HttpMethod::Get;
    let (outcome, ctx) = dispatch(&router, &request(&method, "/avengers"));
    assert!(matches!(outcome, MatchOutcome::Matched { .. }));
    router.release_context(ctx);
}

#[test]
fn router_when_redirect_trailing_slash_then_tsr_candidate_issues_redirect() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    let mut tx = router.begin_write();
    tx.insert(RouteSpec {
        options: RouteOptions::builder().trailing_slash(TrailingSlashPolicy::Redirect).build(),
        ..spec("/avengers/")
    })
    .unwrap();
    tx.commit().unwrap();

    let method = HttpMethod::Get;
    let (outcome, ctx) = dispatch(&router, &request(&method, "/avengers"));
    match outcome {
        MatchOutcome::Redirect { location, status, .. } => {
            assert_eq!(location, "/avengers/");
            assert_eq!(status, 301);
        }
        _ => panic!("expected a redirect outcome"),
    }
    router.release_context(ctx);
}

#[test]
fn router_when_method_not_allowed_handling_enabled_then_405_with_allow_list() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    let mut tx = router.begin_write();
    tx.insert(spec("/avengers")).unwrap();
    tx.commit().unwrap();

    let method = HttpMethod::Post;
    let (outcome, ctx) = dispatch(&router, &request(&method, "/avengers"));
    match outcome {
        MatchOutcome::MethodNotAllowed { allow } => assert_eq!(allow, vec![HttpMethod::Get]),
        _ => panic!("expected MethodNotAllowed"),
    }
    router.release_context(ctx);
}

#[test]
fn router_when_method_not_allowed_handling_disabled_then_plain_not_found() {
    let router: Router<u32> = Router::new(RouterOptions::builder().handle_method_not_allowed(false).build().unwrap());
    let mut tx = router.begin_write();
    tx.insert(spec("/avengers")).unwrap();
    tx.commit().unwrap();

    let method = HttpMethod::Post;
    let (outcome, ctx) = dispatch(&router, &request(&method, "/avengers"));
    assert!(matches!(outcome, MatchOutcome::NotFound));
    router.release_context(ctx);
}

#[test]
fn router_when_auto_options_enabled_then_options_request_lists_allowed_methods() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    let mut tx = router.begin_write();
    tx.insert(RouteSpec {
        methods: vec![HttpMethod::Get, HttpMethod::Post],
        ..spec("/avengers")
    })
    .unwrap();
    tx.commit().unwrap();

    let method = HttpMethod::Options;
    let (outcome, ctx) = dispatch(&router, &request(&method, "/avengers"));
    match outcome {
        MatchOutcome::Options { mut allow } => {
            allow.sort_by_key(|m| m.as_str().to_string());
            assert_eq!(allow, vec![HttpMethod::Get, HttpMethod::Post]);
        }
        _ => panic!("expected auto-OPTIONS outcome"),
    }
    router.release_context(ctx);
}

#[test]
fn router_when_auto_options_disabled_then_options_falls_through_to_lookup() {
    let router: Router<u32> = Router::new(RouterOptions::builder().handle_options(false).build().unwrap());
    let mut tx = router.begin_write();
    tx.insert(spec("/avengers")).unwrap();
    tx.commit().unwrap();

    let method = HttpMethod::Options;
    let (outcome, ctx) = dispatch(&router, &request(&method, "/avengers"));
    assert!(matches!(outcome, MatchOutcome::MethodNotAllowed { .. }));
    router.release_context(ctx);
}

use std::sync::Arc;

use bunner_router_rs::config::RouteOptions;
use bunner_router_rs::transaction::RouteSpec;
use bunner_router_rs::{HttpMethod, Router, RouterOptions, TransactionError};

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

fn register(router: &Router<u32>, pattern: &str) {
    let mut tx = router.begin_write();
    tx.insert(spec(pattern)).expect("insert should succeed");
    tx.commit().expect("commit should succeed");
}

#[test]
fn router_when_terminal_catch_all_then_captures_rest_of_path() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    register(&router, "/fs/*{filepath}");

    let (outcome, ctx) = router.lookup(&HttpMethod::Get, "", "/fs/a/b/c.txt", false);
    assert!(outcome.route.is_some());
    assert_eq!(ctx.bindings()[0].resolve("", "/fs/a/b/c.txt"), "a/b/c.txt");
    router.release_context(ctx);
}

#[test]
fn router_when_infix_catch_all_then_resumes_matching_after_capture() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    register(&router, "/assets/*{path}/thumbnail");

    let (outcome, ctx) = router.lookup(&HttpMethod::Get, "", "/assets/a/b/c/thumbnail", false);
    assert!(outcome.route.is_some());
    assert_eq!(ctx.bindings()[0].resolve("", "/assets/a/b/c/thumbnail"), "a/b/c");
    router.release_context(ctx);
}

#[test]
fn router_when_static_sibling_of_catch_all_prefix_then_static_still_wins() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    register(&router, "/fs/readme.txt");
    register(&router, "/fs/*{filepath}");

    let (outcome, ctx) = router.lookup(&HttpMethod::Get, "", "/fs/readme.txt", false);
    assert_eq!(&*outcome.route.unwrap().pattern, "/fs/readme.txt");
    assert!(ctx.bindings().is_empty());
    router.release_context(ctx);

    let (outcome, ctx) = router.lookup(&HttpMethod::Get, "", "/fs/other.txt", false);
    assert_eq!(&*outcome.route.unwrap().pattern, "/fs/*{filepath}");
    router.release_context(ctx);
}

#[test]
fn router_when_two_differently_named_catch_alls_at_same_position_then_rejected() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    register(&router, "/fs/*{filepath}");

    let mut tx = router.begin_write();
    let err = tx.insert(spec("/fs/*{otherpath}")).unwrap_err();
    assert!(matches!(err, TransactionError::Radix(_)));
}

#[test]
fn router_when_catch_all_capture_spans_multiple_segments_then_binds_full_span() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    register(&router, "/repo/*{path}");

    let (outcome, ctx) = router.lookup(&HttpMethod::Get, "", "/repo/a/b/c/d/e", false);
    assert!(outcome.route.is_some());
    assert_eq!(ctx.bindings()[0].resolve("", "/repo/a/b/c/d/e"), "a/b/c/d/e");
    router.release_context(ctx);
}

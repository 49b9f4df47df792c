use std::sync::Arc;

use bunner_router_rs::config::RouteOptions;
use bunner_router_rs::transaction::RouteSpec;
use bunner_router_rs::{HttpMethod, Router, RouterOptions};

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

#[test]
fn router_when_bulk_routes_registered_in_one_transaction_then_all_match_after_commit() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    let mut tx = router.begin_write();
    tx.insert(spec("/bulk/one")).expect("first insert should succeed");
    tx.insert(spec("/bulk/two")).expect("second insert should succeed");
    tx.insert(spec("/bulk/three")).expect("third insert should succeed");
    tx.commit().expect("commit should succeed");

    for path in ["/bulk/one", "/bulk/two", "/bulk/three"] {
        let (outcome, ctx) = router.lookup(&HttpMethod::Get, "", path, false);
        assert!(outcome.route.is_some(), "{path} should match");
        router.release_context(ctx);
    }
}

#[test]
fn router_when_bulk_transaction_aborted_then_none_of_its_routes_are_visible() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    let mut tx = router.begin_write();
    tx.insert(spec("/bulk/one")).unwrap();
    tx.insert(spec("/bulk/two")).unwrap();
    tx.abort().expect("abort should succeed");

    for path in ["/bulk/one", "/bulk/two"] {
        let (outcome, ctx) = router.lookup(&HttpMethod::Get, "", path, false);
        assert!(outcome.route.is_none(), "{path} should not be visible after abort");
        router.release_context(ctx);
    }
}

#[test]
fn router_when_bulk_insert_hits_invalid_pattern_then_earlier_inserts_in_same_transaction_stay_staged_but_unpublished() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    let mut tx = router.begin_write();
    tx.insert(spec("/bulk/good")).expect("valid pattern should insert");
    let err = tx.insert(spec("")).unwrap_err();
    assert!(matches!(err, bunner_router_rs::TransactionError::Pattern(_)));

    // The transaction is still active — the caller can choose to abort
    // rather than commit a partially-built batch.
    tx.abort().expect("abort should succeed");

    let (outcome, ctx) = router.lookup(&HttpMethod::Get, "", "/bulk/good", false);
    assert!(outcome.route.is_none());
    router.release_context(ctx);
}

#[test]
fn router_when_bulk_routes_span_multiple_methods_then_each_method_tree_is_independent() {
    let router: Router<u32> = Router::new(RouterOptions::default());
    let mut tx = router.begin_write();
    tx.insert(RouteSpec {
        methods: vec![HttpMethod::Get],
        ..spec("/bulk/get-only")
    })
    .unwrap();
    tx.insert(RouteSpec {
        methods: vec![HttpMethod::Post],
        ..spec("/bulk/post-only")
    })
    .unwrap();
    tx.commit().unwrap();

    let (get_on_get_path, ctx1) = router.lookup(&HttpMethod::Get, "", "/bulk/get-only", false);
    let (post_on_get_path, ctx2) = router.lookup(&HttpMethod::Post, "", "/bulk/get-only", false);
    assert!(get_on_get_path.route.is_some());
    assert!(post_on_get_path.route.is_none());
    router.release_context(ctx1);
    router.release_context(ctx2);
}

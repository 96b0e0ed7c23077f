//! Controller tree tests — routing, fallback semantics, error handling, and
//! parameter scoping.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use arbor_core::{Controller, ErrorHandler, Fallback, Router, SetParams, TreeError};
    use arbor_http::{ControllerResult, Failure, HttpError, ParamSet, Request, Response, Status};

    fn ok_leaf(_request: &mut Request) -> ControllerResult {
        Ok(Response::new("ok"))
    }

    fn not_found_leaf(_request: &mut Request) -> ControllerResult {
        Err(HttpError::not_found("leaf says no").into())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Router
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn router_consumes_prefix_and_threads_captures() {
        fn inner_leaf(request: &mut Request) -> ControllerResult {
            assert_eq!(request.router_kws()["name"], "world");
            assert_eq!(request.path(), "");
            Ok(Response::new("hello"))
        }

        let inner = Router::new().route(r"^(?P<name>\w+)/$", inner_leaf).unwrap();
        let outer = Router::new().route(r"^/hello/", inner).unwrap();

        let mut request = Request::new("GET", "/hello/world/");
        let response = outer.handle(&mut request).unwrap();
        assert_eq!(response.content, "hello");

        // Scoped updates are gone once dispatch returns.
        assert_eq!(request.path(), "/hello/world/");
        assert!(request.router_kws().is_empty());
    }

    #[test]
    fn router_first_match_wins() {
        fn first(_request: &mut Request) -> ControllerResult {
            Ok(Response::new("first"))
        }
        fn second(_request: &mut Request) -> ControllerResult {
            Ok(Response::new("second"))
        }

        // The second pattern is more specific but declared later.
        let router = Router::new()
            .route(r"^/page/", first)
            .unwrap()
            .route(r"^/page/exact/$", second)
            .unwrap();

        let mut request = Request::new("GET", "/page/exact/");
        let response = router.handle(&mut request).unwrap();
        assert_eq!(response.content, "first");
    }

    #[test]
    fn router_no_match_is_not_found() {
        let router = Router::new().route(r"^/known/", ok_leaf).unwrap();
        let mut request = Request::new("GET", "/unknown/");
        let err = router.handle(&mut request).unwrap_err();
        assert_eq!(err.status(), Some(Status::NotFound));
    }

    #[test]
    fn router_accumulates_args_across_levels() {
        fn leaf(request: &mut Request) -> ControllerResult {
            assert_eq!(request.router_args().to_vec(), vec!["shop", "42"]);
            assert_eq!(request.router_kws()["section"], "shop");
            assert_eq!(request.router_kws()["id"], "42");
            Ok(Response::new("ok"))
        }

        let inner = Router::new().route(r"^(?P<id>\d+)/$", leaf).unwrap();
        let outer = Router::new().route(r"^/(?P<section>\w+)/", inner).unwrap();

        let mut request = Request::new("GET", "/shop/42/");
        outer.handle(&mut request).unwrap();
    }

    #[test]
    fn router_named_capture_overwrites_outer_key() {
        fn leaf(request: &mut Request) -> ControllerResult {
            assert_eq!(request.router_kws()["part"], "inner");
            Ok(Response::new("ok"))
        }

        let inner = Router::new().route(r"^(?P<part>\w+)/$", leaf).unwrap();
        let outer = Router::new().route(r"^/(?P<part>\w+)/", inner).unwrap();

        let mut request = Request::new("GET", "/outer/inner/");
        outer.handle(&mut request).unwrap();
    }

    #[test]
    fn router_rejects_invalid_pattern() {
        let result = Router::new().route(r"^/broken(/", ok_leaf);
        assert!(matches!(result, Err(TreeError::InvalidPattern { .. })));
    }

    #[test]
    fn router_unanchored_pattern_only_matches_at_start() {
        let router = Router::new().route(r"items/", ok_leaf).unwrap();
        // The pattern has no `^` of its own, yet must not match mid-path.
        let mut request = Request::new("GET", "/items/");
        let err = router.handle(&mut request).unwrap_err();
        assert_eq!(err.status(), Some(Status::NotFound));

        let mut request = Request::new("GET", "items/");
        assert!(router.handle(&mut request).is_ok());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fallback
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn fallback_returns_first_success() {
        let tried = Arc::new(AtomicUsize::new(0));
        let tried_after = Arc::clone(&tried);
        let counting = move |_request: &mut Request| -> ControllerResult {
            tried_after.fetch_add(1, Ordering::SeqCst);
            Ok(Response::new("late"))
        };

        let fallback = Fallback::new()
            .push(not_found_leaf)
            .push(ok_leaf)
            .push(counting);

        let mut request = Request::new("GET", "/");
        let response = fallback.handle(&mut request).unwrap();
        assert_eq!(response.content, "ok");
        // The later alternative was never tried.
        assert_eq!(tried.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fallback_outside_absorb_set_propagates_immediately() {
        let tried = Arc::new(AtomicUsize::new(0));
        let tried_inner = Arc::clone(&tried);
        let counting = move |_request: &mut Request| -> ControllerResult {
            tried_inner.fetch_add(1, Ordering::SeqCst);
            Ok(Response::new("unreached"))
        };

        fn server_error_leaf(_request: &mut Request) -> ControllerResult {
            Err(HttpError::server_error("broken").into())
        }

        let fallback = Fallback::new()
            .push(server_error_leaf)
            .push(counting)
            .absorb([Status::NotFound]);

        let mut request = Request::new("GET", "/");
        let err = fallback.handle(&mut request).unwrap_err();
        assert_eq!(err.status(), Some(Status::InternalServerError));
        assert_eq!(tried.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fallback_exhaustion_reraises_last_error() {
        fn fail_a(_request: &mut Request) -> ControllerResult {
            Err(HttpError::not_found("first").into())
        }
        fn fail_b(_request: &mut Request) -> ControllerResult {
            Err(HttpError::not_found("second").into())
        }
        fn fail_c(_request: &mut Request) -> ControllerResult {
            Err(HttpError::not_found("third").into())
        }

        let fallback = Fallback::new().push(fail_a).push(fail_b).push(fail_c);
        let mut request = Request::new("GET", "/");
        match fallback.handle(&mut request).unwrap_err() {
            Failure::Http(err) => assert_eq!(err.message, "third"),
            other => panic!("expected structured error, got {other:?}"),
        }
    }

    #[test]
    fn fallback_with_no_children_is_server_error() {
        let fallback = Fallback::new();
        let mut request = Request::new("GET", "/");
        let err = fallback.handle(&mut request).unwrap_err();
        assert_eq!(err.status(), Some(Status::InternalServerError));
    }

    #[test]
    fn fallback_never_absorbs_unclassified_failures() {
        fn internal_leaf(_request: &mut Request) -> ControllerResult {
            Err(Failure::internal(anyhow::anyhow!("wires crossed")))
        }

        // Absorb-all configuration still lets unclassified failures through.
        let fallback = Fallback::new().push(internal_leaf).push(ok_leaf);
        let mut request = Request::new("GET", "/");
        let err = fallback.handle(&mut request).unwrap_err();
        assert!(matches!(err, Failure::Internal(_)));
    }

    // ─────────────────────────────────────────────────────────────────────
    // ErrorHandler
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn error_handler_passes_success_through() {
        let handler = ErrorHandler::new(ok_leaf);
        let mut request = Request::new("GET", "/");
        let response = handler.handle(&mut request).unwrap();
        assert_eq!(response.content, "ok");
        assert_eq!(response.status, Status::Ok);
    }

    #[test]
    fn error_handler_renders_structured_errors() {
        let handler = ErrorHandler::new(not_found_leaf);
        let mut request = Request::new("GET", "/");
        let response = handler.handle(&mut request).unwrap();
        assert_eq!(response.status, Status::NotFound);
        assert!(response.content.contains("404 NOT FOUND"));
    }

    #[test]
    fn error_handler_wraps_unclassified_failures() {
        fn internal_leaf(_request: &mut Request) -> ControllerResult {
            Err(Failure::internal(anyhow::anyhow!("wires crossed")))
        }

        let handler = ErrorHandler::new(internal_leaf);
        let mut request = Request::new("GET", "/");
        let response = handler.handle(&mut request).unwrap();
        assert_eq!(response.status, Status::InternalServerError);
        assert!(response.content.contains("500 INTERNAL SERVER ERROR"));
    }

    #[test]
    fn structured_only_mode_reraises_unclassified() {
        fn internal_leaf(_request: &mut Request) -> ControllerResult {
            Err(Failure::internal(anyhow::anyhow!("wires crossed")))
        }

        let handler = ErrorHandler::new(internal_leaf).structured_only();
        let mut request = Request::new("GET", "/");
        let err = handler.handle(&mut request).unwrap_err();
        assert!(matches!(err, Failure::Internal(_)));

        // Structured errors are still terminated.
        let handler = ErrorHandler::new(not_found_leaf).structured_only();
        let response = handler.handle(&mut request).unwrap();
        assert_eq!(response.status, Status::NotFound);
    }

    // ─────────────────────────────────────────────────────────────────────
    // SetParams
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn set_params_visible_only_below() {
        fn leaf(request: &mut Request) -> ControllerResult {
            assert_eq!(request.get::<&str>("settings.shock"), Some(&"Boo"));
            Ok(Response::new("ok"))
        }

        let wrapped = SetParams::new(leaf, ParamSet::new().set("settings.shock", "Boo"));
        let mut request = Request::new("GET", "/");
        wrapped.handle(&mut request).unwrap();
        assert!(!request.context().contains("settings.shock"));
        assert!(!request.context().contains("settings"));
    }

    #[test]
    fn set_params_releases_scope_on_failure() {
        fn failing_leaf(request: &mut Request) -> ControllerResult {
            assert!(request.context().contains("settings.mode"));
            Err(HttpError::server_error("down").into())
        }

        let wrapped = SetParams::new(failing_leaf, ParamSet::new().set("settings.mode", "test"));
        let mut request = Request::new("GET", "/");
        assert!(wrapped.handle(&mut request).is_err());
        assert!(!request.context().contains("settings"));
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tree introspection
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn children_reflect_construction_order() {
        let router = Router::new()
            .route(r"^/a/", ok_leaf)
            .unwrap()
            .route(r"^/b/", not_found_leaf)
            .unwrap();
        assert_eq!(router.children().len(), 2);
        assert_eq!(router.name(), "Router");

        let fallback = Fallback::new().push(ok_leaf).push(ok_leaf).push(ok_leaf);
        assert_eq!(fallback.children().len(), 3);

        let handler = ErrorHandler::new(ok_leaf);
        assert_eq!(handler.children().len(), 1);
        assert_eq!(handler.children()[0].name(), "leaf");
    }
}

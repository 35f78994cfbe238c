// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 链接器集成测试
//!
//! 以真实的 `Request` 与路由表驱动 `RouteLinker`，覆盖默认路由、查询字符串、
//! 自定义调度器以及释放语义。

use std::sync::Arc;

use mockall::{
    mock,
    predicate::{always, eq},
};
use percent_encoding::percent_decode_str;
use routelinker::*;
use serde_json::json;
use url::Url;

// --- 测试用控制器 ---

struct FooController;
impl Resource for FooController {}

impl FooController {
    const GET_WITH_PLOEH_AND_FNAAH: &'static [&'static str] = &["ploeh", "fnaah"];

    fn get_default() -> Expression<Self> {
        MethodCall::<Self>::new("GetDefault", &[]).into()
    }

    fn get_by_id(id: i32) -> Expression<Self> {
        MethodCall::<Self>::new("GetById", &["id"]).arg(id).into()
    }

    fn get_with_ploeh_and_fnaah(ploeh: i32, fnaah: &str) -> Expression<Self> {
        MethodCall::<Self>::new("GetWithPloehAndFnaah", Self::GET_WITH_PLOEH_AND_FNAAH)
            .arg(ploeh)
            .arg(fnaah)
            .into()
    }

    fn get_with_ploeh_and_fnaah_method() -> MethodInfo {
        MethodInfo::of::<Self>("GetWithPloehAndFnaah", Self::GET_WITH_PLOEH_AND_FNAAH)
    }
}

struct BarController;
impl Resource for BarController {}

impl BarController {
    fn get_default() -> Expression<Self> {
        MethodCall::<Self>::new("GetDefault", &[]).into()
    }
}

struct Version;
impl Resource for Version {}

mock! {
    pub Dispatcher {}
    impl RouteDispatcher for Dispatcher {
        fn dispatch(&self, method: &MethodInfo, route_values: &RouteValues) -> Rouple;
    }
}

// --- 辅助函数 ---

fn request() -> Request {
    let raw = "GET /api/home HTTP/1.1\r\nHost: localhost:8080\r\nUser-Agent: routelinker-test\r\n\r\n";
    Request::try_from(raw.as_bytes(), 1).unwrap()
}

fn request_with_default_route() -> Request {
    let mut request = request();
    request.add_default_route().unwrap();
    request
}

fn base_uri(request: &Request) -> Url {
    request.authority().unwrap()
}

fn expected(request: &Request, relative: &str) -> Url {
    base_uri(request).join(relative).unwrap()
}

fn assert_is_resource_linker<T: ResourceLinker>(_: &T) {}

#[test]
fn test_sut_is_resource_linker() {
    let sut = RouteLinker::new(request());
    assert_is_resource_linker(&sut);
}

#[test]
fn test_get_null_fails() {
    let sut = RouteLinker::new(request_with_default_route());
    match sut.get_uri::<Version>(None) {
        Err(Exception::NullArgument(name)) => assert_eq!(name, "expression"),
        other => panic!("Expected NullArgument error, got {:?}", other),
    }
}

#[test]
fn test_get_uri_from_invalid_expression_fails() {
    let sut = RouteLinker::new(request_with_default_route());
    for expression in [
        Expression::<Version>::New("Object"),
        Expression::<Version>::Member("Major"),
        Expression::<Version>::Constant(json!(1)),
    ] {
        match sut.get_uri(expression) {
            Err(Exception::InvalidExpression(_)) => {}
            other => panic!("Expected InvalidExpression error, got {:?}", other),
        }
    }
}

#[test]
fn test_get_foo_route_for_default_get_method() {
    let request = request_with_default_route();
    let want = expected(&request, "api/foo");
    let sut = RouteLinker::new(request);

    let actual = sut.get_uri(FooController::get_default()).unwrap();

    assert_eq!(actual, want);
}

#[test]
fn test_get_bar_route_for_default_get_method() {
    let request = request_with_default_route();
    let want = expected(&request, "api/bar");
    let sut = RouteLinker::new(request);

    let actual = sut.get_uri(BarController::get_default()).unwrap();

    assert_eq!(actual, want);
}

#[test]
fn test_get_uri_for_get_method_with_parameters() {
    let request = request_with_default_route();
    let want = expected(&request, "api/foo/42");
    let sut = RouteLinker::new(request);

    let actual = sut.get_uri(FooController::get_by_id(42)).unwrap();

    assert_eq!(actual, want);
    assert_eq!(actual.as_str(), "http://localhost:8080/api/foo/42");
}

#[test]
fn test_get_uri_for_get_method_with_named_parameters() {
    let request = request_with_default_route();
    let want = expected(&request, "api/foo?ploeh=3&fnaah=x");
    let sut = RouteLinker::new(request);

    let actual = sut
        .get_uri(FooController::get_with_ploeh_and_fnaah(3, "x"))
        .unwrap();

    assert_eq!(actual, want);
    let pairs: Vec<(String, String)> = actual.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("ploeh".to_string(), "3".to_string()),
            ("fnaah".to_string(), "x".to_string())
        ]
    );
}

#[test]
fn test_get_uri_with_custom_route_and_dispatcher() {
    let route_name = "foo-by-ploeh";
    let mut request = request_with_default_route();
    request
        .routes_mut()
        .add_route(route_name, "foo/{ploeh}/{fnaah}", Vec::<(String, RouteDefault)>::new())
        .unwrap();
    let want = expected(&request, "foo/7/bar");

    let mut dispatcher = MockDispatcher::new();
    dispatcher
        .expect_dispatch()
        .with(eq(FooController::get_with_ploeh_and_fnaah_method()), always())
        .times(1)
        .returning(move |_, route_values| Rouple::new(route_name, route_values.clone()));
    let sut = RouteLinker::with_dispatcher(request, dispatcher);

    let actual = sut
        .get_uri(FooController::get_with_ploeh_and_fnaah(7, "bar"))
        .unwrap();

    assert_eq!(actual, want);
}

#[test]
fn test_get_uri_with_route_name_dispatcher() {
    let mut request = request_with_default_route();
    request
        .routes_mut()
        .add_route("foo-by-ploeh", "foo/{ploeh}/{fnaah}", Vec::<(String, RouteDefault)>::new())
        .unwrap();
    let want_named = expected(&request, "foo/1/two");
    let want_default = expected(&request, "api/foo/5");

    let dispatcher = RouteNameDispatcher::new()
        .map(FooController::get_with_ploeh_and_fnaah_method(), "foo-by-ploeh");
    let sut = RouteLinker::with_dispatcher(request, dispatcher);

    assert_eq!(
        sut.get_uri(FooController::get_with_ploeh_and_fnaah(1, "two"))
            .unwrap(),
        want_named
    );
    assert_eq!(sut.get_uri(FooController::get_by_id(5)).unwrap(), want_default);
}

#[test]
fn test_unknown_route_from_dispatcher() {
    let dispatcher = DefaultRouteDispatcher::with_route_name("missing");
    let sut = RouteLinker::with_dispatcher(request_with_default_route(), dispatcher);

    match sut.get_uri(FooController::get_default()) {
        Err(Exception::UnknownRoute(name)) => assert_eq!(name, "missing"),
        other => panic!("Expected UnknownRoute error, got {:?}", other),
    }
}

#[test]
fn test_no_routes_means_no_match() {
    let sut = RouteLinker::new(request());
    assert_eq!(
        sut.get_uri(FooController::get_default()),
        Err(Exception::NoMatchingRoute)
    );
}

#[test]
fn test_arity_mismatch_fails() {
    let sut = RouteLinker::new(request_with_default_route());
    let expression: Expression<FooController> =
        MethodCall::<FooController>::new("GetById", &["id"]).into();

    match sut.get_uri(expression) {
        Err(Exception::InvalidExpression(_)) => {}
        other => panic!("Expected InvalidExpression error, got {:?}", other),
    }
}

#[test]
fn test_dispose_disposes_request() {
    let raw = "POST /api/foo HTTP/1.1\r\nHost: localhost\r\n\r\npayload";
    let mut sut = RouteLinker::new(Request::try_from(raw.as_bytes(), 2).unwrap());
    assert_eq!(sut.request().content(), Some("payload"));

    sut.dispose();
    sut.dispose();

    assert!(sut.request().is_disposed());
    assert!(sut.request().content().is_none());
}

#[test]
fn test_given_modest_constructor_request_is_correct() {
    let request = request_with_default_route();
    let expected_path = request.path().to_string();
    let sut = RouteLinker::new(request);

    assert_eq!(sut.request().path(), expected_path);
    assert_eq!(sut.route_dispatcher(), &DefaultRouteDispatcher::new());
}

#[test]
fn test_given_greedy_constructor_dispatcher_is_correct() {
    let dispatcher = DefaultRouteDispatcher::with_route_name("API Default");
    let sut = RouteLinker::with_dispatcher(request_with_default_route(), dispatcher.clone());

    assert_eq!(sut.route_dispatcher(), &dispatcher);
    assert_eq!(sut.request().host(), Some("localhost:8080"));
}

#[test]
fn test_get_foo_route_from_indexed_uri() {
    let mut request = Request::from_uri("http://localhost:8080/api/foo/current-id", 3).unwrap();
    request
        .routes_mut()
        .add_route(
            "API Default",
            "api/{controller}/{id}",
            [
                ("controller", RouteDefault::from("Home")),
                ("id", RouteDefault::Optional),
            ],
        )
        .unwrap();
    let want = expected(&request, "api/foo");
    let sut = RouteLinker::new(request);

    let actual = sut.get_uri(FooController::get_default()).unwrap();

    assert_eq!(actual, want);
}

#[test]
fn test_routes_from_config_are_shared() {
    let config = Config::from_toml_str(
        r#"
        scheme = "https"

        [[routes]]
        name = "API Default"
        template = "api/{controller}/{id}"
        optional = ["id"]
        "#,
    )
    .unwrap();
    let routes = Arc::new(config.route_collection().unwrap());

    let first = request().with_scheme(config.scheme()).with_routes(Arc::clone(&routes));
    let second = request().with_scheme(config.scheme()).with_routes(Arc::clone(&routes));

    let a = RouteLinker::new(first).get_uri(FooController::get_by_id(1)).unwrap();
    let b = RouteLinker::new(second).get_uri(BarController::get_default()).unwrap();

    assert_eq!(a.as_str(), "https://localhost:8080/api/foo/1");
    assert_eq!(b.as_str(), "https://localhost:8080/api/bar");
}

#[test]
fn test_closure_dispatcher_overrides_convention() {
    let mut request = request_with_default_route();
    request
        .routes_mut()
        .add_route("v2", "v2/{controller}", Vec::<(String, RouteDefault)>::new())
        .unwrap();
    let want = expected(&request, "v2/foo");
    let sut = RouteLinker::with_dispatcher(request, |_: &MethodInfo, values: &RouteValues| {
        Rouple::new("v2", values.clone())
    });

    assert_eq!(sut.get_uri(FooController::get_default()).unwrap(), want);
}

// --- 路由值只能落在路径段中 ---

struct PageController;
impl Resource for PageController {}

impl PageController {
    fn get(a: &str, b: &str) -> Expression<Self> {
        MethodCall::<Self>::new("Get", &["a", "b"])
            .arg(a)
            .arg(b)
            .into()
    }
}

fn segment_linker(template: &str) -> RouteLinker {
    let mut request = request();
    request
        .routes_mut()
        .add_route("r", template, Vec::<(String, RouteDefault)>::new())
        .unwrap();
    RouteLinker::with_dispatcher(request, DefaultRouteDispatcher::with_route_name("r"))
}

fn decoded_segments(uri: &Url) -> Vec<String> {
    uri.path_segments()
        .unwrap()
        .map(|s| percent_decode_str(s).decode_utf8().unwrap().into_owned())
        .collect()
}

fn assert_same_authority(uri: &Url) {
    assert_eq!(uri.scheme(), "http");
    assert_eq!(uri.host_str(), Some("localhost"));
    assert_eq!(uri.port(), Some(8080));
}

#[test]
fn test_colon_in_first_segment_stays_in_path() {
    let sut = segment_linker("{a}/{b}");

    let uri = sut.get_uri(PageController::get("javascript:alert(1)", "x")).unwrap();

    assert_same_authority(&uri);
    assert_eq!(decoded_segments(&uri), vec!["javascript:alert(1)", "x"]);
    assert_eq!(uri.as_str(), "http://localhost:8080/javascript:alert(1)/x");
}

#[test]
fn test_segment_values_round_trip() {
    let sut = segment_linker("foo/{a}/{b}");

    for (a, b) in [
        ("...", ".x"),
        ("//evil.com", "a/b"),
        ("http://evil.com", "?q=1#f"),
        ("%2e%2E", "ü ß"),
        ("\\evil", "a@b"),
    ] {
        let uri = sut.get_uri(PageController::get(a, b)).unwrap();
        assert_same_authority(&uri);
        assert_eq!(decoded_segments(&uri), vec!["foo", a, b], "{}", uri);
        assert!(uri.query().is_none());
        assert!(uri.fragment().is_none());
    }
}

#[test]
fn test_dot_segment_values_are_not_linked() {
    let sut = segment_linker("foo/{a}/{b}");

    for (a, b) in [("..", "x"), ("x", "."), (".", "x"), ("x", "..")] {
        assert_eq!(
            sut.get_uri(PageController::get(a, b)),
            Err(Exception::NoMatchingRoute),
            "{}/{}",
            a,
            b
        );
    }
}

#[test]
fn test_empty_values_cannot_replace_authority() {
    let sut = segment_linker("{a}/{b}/evil.com");

    assert_eq!(
        sut.get_uri(PageController::get("", "")),
        Err(Exception::NoMatchingRoute)
    );
}

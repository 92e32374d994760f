use std::collections::HashMap;
use std::io::ErrorKind;

use axum::body::Body as AxumBody;
use axum::extract::{Json as ExtractJson, State as ExtractState};
use axum::http::{
    header as HttpHeader, HeaderMap as HttpHeaderMap, HeaderValue as HttpHeaderValue,
    StatusCode as HttpStatusCode,
};
use axum::response::IntoResponse;
use axum::routing;
use http_body_util::BodyExt;
use hyper::Request;
use serde::{Deserialize, Serialize};
use tower::{Service, ServiceBuilder};

use restaurant_common::error::AppErrorCode;
use restaurant_common::logging::{app_log_event, AppLogLevel};

use crate::{ut_service_basepath, ut_setup_share_state, MockConfidential, EXAMPLE_REL_PATH};
use order_admission::api::web::ApiRouteTableType;
use order_admission::network::{app_web_service, middleware, net_listener};
use order_admission::AppSharedState;

#[derive(Deserialize, Serialize)]
struct UTendpointData {
    slices: u8,
}

async fn ut_endpoint_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractJson(mut req_body): ExtractJson<UTendpointData>,
) -> impl IntoResponse {
    let logctx = appstate.log_context().clone();
    app_log_event!(logctx, AppLogLevel::INFO, "ut_endpoint_handler reached");
    req_body.slices += 1;
    let resp_ctype_val = HttpHeaderValue::from_str("application/json").unwrap();
    let mut hdr_map = HttpHeaderMap::new();
    hdr_map.insert(HttpHeader::CONTENT_TYPE, resp_ctype_val);
    let serial_resp_body = serde_json::to_string(&req_body).unwrap();
    (HttpStatusCode::OK, hdr_map, serial_resp_body)
}

fn ut_service_req_setup(method: &str, uri: &str) -> Request<AxumBody> {
    let d = UTendpointData { slices: 7 };
    let d = serde_json::to_string(&d).unwrap();
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("content-length", d.len().to_string())
        .body(AxumBody::from(d))
        .unwrap()
}

#[tokio::test]
async fn app_web_service_ok() {
    let shr_state = ut_setup_share_state("config_ok_inmem.json", Box::new(MockConfidential {}));
    let cfg = shr_state.config().clone();
    let rtable: ApiRouteTableType =
        HashMap::from([("create_new_order", routing::post(ut_endpoint_handler))]);
    let (mut service, num_routes) = app_web_service(&cfg.api_server.listen, rtable, shr_state);
    assert_eq!(num_routes, 1);
    let req = ut_service_req_setup("POST", "/1.0.0/orders");
    let result = service.call(req).await;
    assert!(result.is_ok());
    let mut r = result.unwrap();
    assert_eq!(r.status(), HttpStatusCode::OK);
    let rawfrm = r.body_mut().frame().await.unwrap();
    let rawdata = rawfrm.unwrap().into_data().unwrap().to_vec();
    let data = serde_json::from_slice::<UTendpointData>(rawdata.as_slice()).unwrap();
    assert_eq!(data.slices, 8);
    // handler label absent in the route table
    let req = ut_service_req_setup("POST", "/1.0.0/timeslots");
    let r = service.call(req).await.unwrap();
    assert_eq!(r.status(), HttpStatusCode::NOT_FOUND);
} // end of fn app_web_service_ok

#[tokio::test]
#[ignore]
async fn net_server_listener_ok_1() {
    // some platforms allow callers to bind the same port several times, run
    // this case in local environment only
    let result = net_listener("localhost".to_string(), 8086).await;
    assert!(result.is_ok());
    let result = net_listener("localhost".to_string(), 8086).await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.code, AppErrorCode::IOerror(ErrorKind::AddrInUse));
    }
}

#[tokio::test]
async fn net_server_listener_ok_2() {
    let result = net_listener("localhost".to_string(), 65534).await;
    assert!(result.is_ok());
    let result = net_listener("nonexist.org.12345".to_string(), 0).await;
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.code, AppErrorCode::IOerror(ErrorKind::AddrNotAvailable));
    }
}

#[test]
fn middleware_cors_ok() {
    let cfg_path = ut_service_basepath() + EXAMPLE_REL_PATH + "cors_ok.json";
    let result = middleware::cors(cfg_path);
    assert!(result.is_ok());
}

#[test]
fn middleware_cors_error_cfg() {
    let cfg_path = ut_service_basepath() + EXAMPLE_REL_PATH + "cors_invalid_header.json";
    let result = middleware::cors(cfg_path);
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.code, AppErrorCode::InvalidInput);
    }
    let cfg_path = ut_service_basepath() + EXAMPLE_REL_PATH + "cors_nonexist.json";
    let result = middleware::cors(cfg_path);
    assert!(matches!(
        result.err().map(|e| e.code),
        Some(AppErrorCode::IOerror(ErrorKind::NotFound))
    ));
}

#[tokio::test]
async fn middleware_req_body_limit() {
    let shr_state = ut_setup_share_state("config_ok_inmem.json", Box::new(MockConfidential {}));
    let cfg = shr_state.config().clone();
    let rtable: ApiRouteTableType =
        HashMap::from([("create_new_order", routing::post(ut_endpoint_handler))]);
    let (service, num_routes) = app_web_service(&cfg.api_server.listen, rtable, shr_state);
    assert_eq!(num_routes, 1);
    let req = ut_service_req_setup("POST", "/1.0.0/orders");
    let reqlm = middleware::req_body_limit(2);
    let middlewares = ServiceBuilder::new().layer(reqlm);
    let mut service = service.layer(middlewares);
    let result = service.call(req).await;
    assert!(result.is_ok());
    let r = result.unwrap();
    assert_eq!(r.status(), HttpStatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn middleware_concurrency_limit() {
    let shr_state = ut_setup_share_state("config_ok_inmem.json", Box::new(MockConfidential {}));
    let cfg = shr_state.config().clone();
    let rtable: ApiRouteTableType =
        HashMap::from([("create_new_order", routing::post(ut_endpoint_handler))]);
    let (service, _num_routes) = app_web_service(&cfg.api_server.listen, rtable, shr_state);
    let middlewares = ServiceBuilder::new()
        .layer(middleware::concurrency_limit(1))
        .layer(middleware::req_body_limit(1024));
    let service = service.layer(middlewares);
    // permits are returned once each response is produced
    for _ in 0..3 {
        let req = ut_service_req_setup("POST", "/1.0.0/orders");
        let mut s = service.clone();
        let r = s.call(req).await.unwrap();
        assert_eq!(r.status(), HttpStatusCode::OK);
    }
}

use std::collections::HashMap;

use axum::http::{
    header as HttpHeader, HeaderMap as HttpHeaderMap, HeaderValue as HttpHeaderValue,
    StatusCode as HttpStatusCode,
};
use axum::routing::{get, post, MethodRouter};
use serde::Serialize;

use crate::constant::api::web as WebConst;
use crate::constant::HTTP_CONTENT_TYPE_JSON;
use crate::{AppSharedState, WebApiHdlrLabel};

pub mod dto;
mod health;
mod order;
mod time_slot;

pub type ApiRouteType = MethodRouter<AppSharedState>;
pub type ApiRouteTableType = HashMap<WebApiHdlrLabel, ApiRouteType>;

pub fn route_table() -> ApiRouteTableType {
    let mut out: ApiRouteTableType = HashMap::new();
    out.insert(WebConst::CREATE_NEW_ORDER, post(order::create_handler));
    out.insert(WebConst::RETRIEVE_ORDER_HISTORY, get(order::history_handler));
    out.insert(
        WebConst::LIST_SLOT_AVAILABILITY,
        get(time_slot::availability_handler),
    );
    out.insert(WebConst::HEALTH_CHECK, get(health::check_handler));
    out
}

type ApiRespTuple = (HttpStatusCode, HttpHeaderMap, String);

// every endpoint in this service responds with JSON body
fn json_response<T: Serialize>(status: HttpStatusCode, body: &T) -> ApiRespTuple {
    let mut hdr_map = HttpHeaderMap::new();
    hdr_map.insert(
        HttpHeader::CONTENT_TYPE,
        HttpHeaderValue::from_static(HTTP_CONTENT_TYPE_JSON),
    );
    match serde_json::to_string(body) {
        Ok(s) => (status, hdr_map, s),
        Err(_e) => (
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            hdr_map,
            r#"{"ok":false,"error":"serialization-failure"}"#.to_string(),
        ),
    }
}

fn error_response(status: HttpStatusCode, msg: String) -> ApiRespTuple {
    let body = dto::RespErrorDto {
        ok: false,
        error: msg,
    };
    json_response(status, &body)
}

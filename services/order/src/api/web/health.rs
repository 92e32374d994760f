use axum::debug_handler;
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;

use super::dto::RespAckDto;
use super::json_response;
use crate::AppSharedState;

#[debug_handler(state=AppSharedState)]
pub(super) async fn check_handler() -> impl IntoResponse {
    json_response(HttpStatusCode::OK, &RespAckDto { ok: true })
}

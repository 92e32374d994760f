use axum::debug_handler;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json as ExtractJson, Query as ExtractQuery, State as ExtractState};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;

use restaurant_common::logging::{app_log_event, AppLogLevel};

use super::dto::{OrderCreateReqData, OrderHistoryQueryDto};
use super::{error_response, json_response};
use crate::error::AppError;
use crate::repository::app_repo_order;
use crate::usecase::{
    AdmitOrderUsKsErr, AdmitOrderUseCase, OrderHistoryUsKsErr, OrderHistoryUseCase,
};
use crate::AppSharedState;

const INTERNAL_ERROR_MSG: &str = "internal-error";

fn log_server_errors(appstate: &AppSharedState, errors: Vec<AppError>) {
    let log_ctx = appstate.log_context().clone();
    let msg = errors
        .into_iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    app_log_event!(log_ctx, AppLogLevel::ERROR, "{msg}");
}

// always to specify state type explicitly to the debug macro
#[debug_handler(state=AppSharedState)]
pub(super) async fn create_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    wrapped_req_body: Result<ExtractJson<OrderCreateReqData>, JsonRejection>,
) -> impl IntoResponse {
    let log_ctx = appstate.log_context().clone();
    let req_body = match wrapped_req_body {
        Ok(ExtractJson(v)) => v,
        Err(e) => {
            app_log_event!(log_ctx, AppLogLevel::INFO, "unreadable-order-body: {e}");
            let msg = "Invalid request body".to_string();
            return error_response(HttpStatusCode::BAD_REQUEST, msg);
        }
    };
    let repo_order = match app_repo_order(appstate.datastore()).await {
        Ok(r) => r,
        Err(e) => {
            app_log_event!(log_ctx, AppLogLevel::ERROR, "repo-init-order: {e}");
            let msg = INTERNAL_ERROR_MSG.to_string();
            return error_response(HttpStatusCode::INTERNAL_SERVER_ERROR, msg);
        }
    };
    let uc = AdmitOrderUseCase {
        glb_state: appstate.clone(),
        repo_order,
    };
    match uc.execute(req_body).await {
        Ok(value) => json_response(HttpStatusCode::CREATED, &value),
        Err(AdmitOrderUsKsErr::ReqContent(msg)) => {
            error_response(HttpStatusCode::BAD_REQUEST, msg)
        }
        Err(AdmitOrderUsKsErr::SlotConflict(msg)) => {
            error_response(HttpStatusCode::CONFLICT, msg)
        }
        Err(AdmitOrderUsKsErr::Server(errors)) => {
            log_server_errors(&appstate, errors);
            let msg = INTERNAL_ERROR_MSG.to_string();
            error_response(HttpStatusCode::INTERNAL_SERVER_ERROR, msg)
        }
    }
} // end of fn create_handler

#[debug_handler(state=AppSharedState)]
pub(super) async fn history_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractQuery(query): ExtractQuery<OrderHistoryQueryDto>,
) -> impl IntoResponse {
    let repo_order = match app_repo_order(appstate.datastore()).await {
        Ok(r) => r,
        Err(e) => {
            log_server_errors(&appstate, vec![e]);
            let msg = INTERNAL_ERROR_MSG.to_string();
            return error_response(HttpStatusCode::INTERNAL_SERVER_ERROR, msg);
        }
    };
    let uc = OrderHistoryUseCase {
        glb_state: appstate.clone(),
        repo_order,
    };
    match uc.execute(query.user_id).await {
        Ok(value) => json_response(HttpStatusCode::OK, &value),
        Err(OrderHistoryUsKsErr::ReqContent(msg)) => {
            error_response(HttpStatusCode::BAD_REQUEST, msg)
        }
        Err(OrderHistoryUsKsErr::Server(errors)) => {
            log_server_errors(&appstate, errors);
            let msg = INTERNAL_ERROR_MSG.to_string();
            error_response(HttpStatusCode::INTERNAL_SERVER_ERROR, msg)
        }
    }
} // end of fn history_handler

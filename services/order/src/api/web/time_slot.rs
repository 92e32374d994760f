use axum::debug_handler;
use axum::extract::{Query as ExtractQuery, State as ExtractState};
use axum::http::StatusCode as HttpStatusCode;
use axum::response::IntoResponse;

use restaurant_common::logging::{app_log_event, AppLogLevel};

use super::dto::SlotAvailabilityQueryDto;
use super::json_response;
use crate::repository::{app_repo_order, app_repo_time_slot};
use crate::usecase::SlotAvailabilityUseCase;
use crate::AppSharedState;

#[debug_handler(state=AppSharedState)]
pub(super) async fn availability_handler(
    ExtractState(appstate): ExtractState<AppSharedState>,
    ExtractQuery(query): ExtractQuery<SlotAvailabilityQueryDto>,
) -> impl IntoResponse {
    let log_ctx = appstate.log_context().clone();
    let ds = appstate.datastore();
    // repositories which cannot be built are treated as unreachable
    let repo_slot = app_repo_time_slot(ds.clone())
        .await
        .map_err(|e| {
            app_log_event!(log_ctx, AppLogLevel::ERROR, "repo-init-time-slot: {e}");
        })
        .ok();
    let repo_order = app_repo_order(ds)
        .await
        .map_err(|e| {
            app_log_event!(log_ctx, AppLogLevel::ERROR, "repo-init-order: {e}");
        })
        .ok();
    let uc = SlotAvailabilityUseCase {
        glb_state: appstate,
        repo_slot,
        repo_order,
    };
    let resp = uc.execute(query.mode).await;
    json_response(HttpStatusCode::OK, &resp)
}

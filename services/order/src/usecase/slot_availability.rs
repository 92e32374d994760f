use std::boxed::Box;

use chrono::Duration;
use restaurant_common::logging::{app_log_event, AppLogLevel};

use crate::api::web::dto::SlotAvailabilityRespDto;
use crate::constant::admission::MIN_LEAD_MINUTES;
use crate::model::{SlotAvailabilityModel, SlotCatalogModel};
use crate::repository::{AbsOrderRepo, AbsTimeSlotRepo};
use crate::AppSharedState;

/// Availability never fails, any unreachable repository degrades to the
/// default slot ladder or to an empty set of booked slots.
pub struct SlotAvailabilityUseCase {
    pub glb_state: AppSharedState,
    pub repo_slot: Option<Box<dyn AbsTimeSlotRepo>>,
    pub repo_order: Option<Box<dyn AbsOrderRepo>>,
}

impl SlotAvailabilityUseCase {
    pub async fn execute(self, mode_hint: Option<String>) -> SlotAvailabilityRespDto {
        let logctx_p = self.glb_state.log_context().clone();
        let now = self.glb_state.clock().now();

        let enabled = match self.repo_slot.as_ref() {
            Some(repo) => repo.fetch_enabled().await.unwrap_or_else(|e| {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "slot-catalog-fallback: {e}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        let catalog = SlotCatalogModel::from_enabled(enabled);

        let booked = match self.repo_order.as_ref() {
            Some(repo) => repo
                .fetch_booked_slots(now.date_naive())
                .await
                .unwrap_or_else(|e| {
                    app_log_event!(logctx_p, AppLogLevel::WARNING, "booked-slot-unknown: {e}");
                    Vec::new()
                }),
            None => Vec::new(),
        };
        let lead = Duration::minutes(MIN_LEAD_MINUTES);
        let result = SlotAvailabilityModel::evaluate(&catalog, booked, now, lead);

        let warning = if result.available.is_empty() {
            Some("No time slots available for today".to_string())
        } else {
            None
        };
        SlotAvailabilityRespDto {
            ok: true,
            date: result.day.format("%Y-%m-%d").to_string(),
            mode: mode_hint.map(|m| m.trim().to_string()).unwrap_or_default(),
            available_slots: result.available.iter().map(ToString::to_string).collect(),
            booked_slots: result.booked.iter().map(ToString::to_string).collect(),
            warning,
        }
    } // end of fn execute
}

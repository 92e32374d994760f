use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::str::FromStr;

use async_trait::async_trait;

use order_admission::error::{AppError, AppErrorCode};
use order_admission::model::TimeSlotModel;
use order_admission::repository::{app_repo_order, app_repo_time_slot, AbsTimeSlotRepo};
use order_admission::usecase::{AdmitOrderUseCase, SlotAvailabilityUseCase};
use order_admission::AppSharedState;

use super::{UtFaultFlags, UtFaultyOrderRepo};
use crate::model::ut_pickup_req;
use crate::ut_default_share_state;

struct UtUnreachableSlotRepo;

#[async_trait]
impl AbsTimeSlotRepo for UtUnreachableSlotRepo {
    async fn fetch_enabled(&self) -> DefaultResult<Vec<TimeSlotModel>, AppError> {
        Err(AppError {
            code: AppErrorCode::RemoteDbServerFailure,
            detail: Some("unit-test".to_string()),
        })
    }
    async fn save(&self, _slots: Vec<(TimeSlotModel, bool)>) -> DefaultResult<(), AppError> {
        Ok(())
    }
}

async fn ut_default_usecase(shr_state: &AppSharedState) -> SlotAvailabilityUseCase {
    let repo_slot = app_repo_time_slot(shr_state.datastore()).await.unwrap();
    let repo_order = app_repo_order(shr_state.datastore()).await.unwrap();
    SlotAvailabilityUseCase {
        glb_state: shr_state.clone(),
        repo_slot: Some(repo_slot),
        repo_order: Some(repo_order),
    }
}

#[tokio::test]
async fn default_ladder_all_open() {
    let (shr_state, _sent) = ut_default_share_state("2026-10-16T18:30:00+02:00");
    let uc = ut_default_usecase(&shr_state).await;
    let resp = uc.execute(Some(" delivery ".to_string())).await;
    assert!(resp.ok);
    assert_eq!(resp.date.as_str(), "2026-10-16");
    assert_eq!(resp.mode.as_str(), "delivery");
    assert_eq!(resp.available_slots.len(), 10);
    assert_eq!(resp.available_slots[0].as_str(), "19:00");
    assert!(resp.booked_slots.is_empty());
    assert!(resp.warning.is_none());
}

#[tokio::test]
async fn lead_time_changes_with_clock() {
    let (shr_state, _sent) = ut_default_share_state("2026-10-16T18:30:00+02:00");
    let resp_early = ut_default_usecase(&shr_state).await.execute(None).await;
    let (shr_state, _sent) = ut_default_share_state("2026-10-16T19:30:00+02:00");
    let resp_late = ut_default_usecase(&shr_state).await.execute(None).await;
    assert_ne!(resp_early.available_slots, resp_late.available_slots);
    assert_eq!(resp_early.available_slots.len(), 10);
    assert_eq!(
        resp_late.available_slots,
        ["20:00", "20:20", "20:40", "21:00", "21:20", "21:40", "22:00"]
    );
    assert!(resp_late.mode.is_empty());
}

#[tokio::test]
async fn booked_slots_excluded() {
    let (shr_state, _sent) = ut_default_share_state("2026-10-16T17:00:00+02:00");
    for slot in ["19:20", "21:40"] {
        let uc = AdmitOrderUseCase {
            glb_state: shr_state.clone(),
            repo_order: UtFaultyOrderRepo::build(&shr_state, UtFaultFlags::default()).await,
        };
        assert!(uc.execute(ut_pickup_req(slot)).await.is_ok());
    }
    let resp = ut_default_usecase(&shr_state).await.execute(None).await;
    assert_eq!(resp.booked_slots, ["19:20", "21:40"]);
    assert_eq!(resp.available_slots.len(), 8);
    assert!(!resp.available_slots.contains(&"19:20".to_string()));
    assert!(!resp.available_slots.contains(&"21:40".to_string()));
}

#[tokio::test]
async fn configured_catalog() {
    let (shr_state, _sent) = ut_default_share_state("2026-10-16T17:00:00+02:00");
    let repo_slot = app_repo_time_slot(shr_state.datastore()).await.unwrap();
    let slots = [("18:00", true), ("18:45", true), ("19:30", false), ("23:15", true)]
        .into_iter()
        .map(|(s, enabled)| (TimeSlotModel::from_str(s).unwrap(), enabled))
        .collect::<Vec<_>>();
    repo_slot.save(slots).await.unwrap();
    let resp = ut_default_usecase(&shr_state).await.execute(None).await;
    assert_eq!(resp.available_slots, ["18:00", "18:45", "23:15"]);
}

#[tokio::test]
async fn empty_with_warning() {
    let (shr_state, _sent) = ut_default_share_state("2026-10-16T21:50:00+02:00");
    let resp = ut_default_usecase(&shr_state).await.execute(None).await;
    assert!(resp.ok);
    assert!(resp.available_slots.is_empty());
    assert_eq!(
        resp.warning.as_deref(),
        Some("No time slots available for today")
    );
}

#[tokio::test]
async fn degrade_on_repository_failure() {
    let (shr_state, _sent) = ut_default_share_state("2026-10-16T17:00:00+02:00");
    let uc = AdmitOrderUseCase {
        glb_state: shr_state.clone(),
        repo_order: UtFaultyOrderRepo::build(&shr_state, UtFaultFlags::default()).await,
    };
    assert!(uc.execute(ut_pickup_req("20:00")).await.is_ok());

    let flags = UtFaultFlags {
        booked: true,
        ..Default::default()
    };
    let uc = SlotAvailabilityUseCase {
        glb_state: shr_state.clone(),
        repo_slot: Some(Box::new(UtUnreachableSlotRepo)),
        repo_order: Some(UtFaultyOrderRepo::build(&shr_state, flags).await),
    };
    let resp = uc.execute(None).await;
    // default ladder, booked slots unknown
    assert!(resp.ok);
    assert_eq!(resp.available_slots.len(), 10);
    assert!(resp.booked_slots.is_empty());

    let uc = SlotAvailabilityUseCase {
        glb_state: shr_state.clone(),
        repo_slot: None,
        repo_order: None,
    };
    let resp = uc.execute(None).await;
    assert_eq!(resp.available_slots.len(), 10);
}

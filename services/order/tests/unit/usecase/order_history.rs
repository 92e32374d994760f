use rust_decimal::Decimal;

use order_admission::repository::app_repo_order;
use order_admission::usecase::{
    AdmitOrderUseCase, OrderHistoryUsKsErr, OrderHistoryUseCase,
};
use order_admission::AppSharedState;

use super::{UtFaultFlags, UtFaultyOrderRepo};
use crate::model::{ut_delivery_req, ut_pickup_req};
use crate::{ut_default_share_state, UtFixedClock};

async fn ut_history(
    shr_state: &AppSharedState,
    account_id: Option<&str>,
) -> Result<order_admission::api::web::dto::OrderHistoryRespDto, OrderHistoryUsKsErr> {
    let repo_order = app_repo_order(shr_state.datastore()).await.unwrap();
    let uc = OrderHistoryUseCase {
        glb_state: shr_state.clone(),
        repo_order,
    };
    uc.execute(account_id.map(ToString::to_string)).await
}

#[tokio::test]
async fn missing_account() {
    let (shr_state, _sent) = ut_default_share_state("2026-10-16T17:00:00+02:00");
    for arg in [None, Some(""), Some("   ")] {
        let error = ut_history(&shr_state, arg).await.unwrap_err();
        if let OrderHistoryUsKsErr::ReqContent(msg) = error {
            assert_eq!(msg.as_str(), "user_id is required");
        } else {
            panic!("unexpected error variant");
        }
    }
}

#[tokio::test]
async fn newest_first_with_items() {
    let (shr_state, _sent) = ut_default_share_state("2026-10-15T17:00:00+02:00");
    let uc = AdmitOrderUseCase {
        glb_state: shr_state.clone(),
        repo_order: UtFaultyOrderRepo::build(&shr_state, UtFaultFlags::default()).await,
    };
    let first = uc.execute(ut_delivery_req()).await.unwrap();

    let next_day = shr_state
        .clone()
        .with_clock(Box::new(UtFixedClock::from_rfc3339("2026-10-16T18:10:00+02:00")));
    let mut req = ut_pickup_req("20:40");
    req.user_id = ut_delivery_req().user_id;
    let uc = AdmitOrderUseCase {
        glb_state: next_day.clone(),
        repo_order: UtFaultyOrderRepo::build(&next_day, UtFaultFlags::default()).await,
    };
    let second = uc.execute(req).await.unwrap();

    let resp = ut_history(&shr_state, Some(" acc-1 ")).await.unwrap();
    assert!(resp.ok);
    assert_eq!(resp.orders.len(), 2);
    let (latest, earliest) = (&resp.orders[0], &resp.orders[1]);

    assert_eq!(latest.id, second.order_id);
    assert_eq!(latest.mode.as_str(), "pickup");
    assert_eq!(latest.order_date.as_str(), "2026-10-16");
    assert_eq!(latest.pickup_time.as_deref(), Some("20:40"));
    assert_eq!(latest.pickup_name.as_deref(), Some("Luigi"));
    assert!(latest.delivery_time.is_none());
    assert!(latest.address.is_none());
    assert_eq!(latest.discount, Decimal::ZERO);
    assert_eq!(latest.items.len(), 1);

    assert_eq!(earliest.id, first.order_id);
    assert_eq!(earliest.mode.as_str(), "delivery");
    assert_eq!(earliest.order_date.as_str(), "2026-10-15");
    assert_eq!(earliest.delivery_time.as_deref(), Some("20:00"));
    assert_eq!(earliest.postal_code.as_deref(), Some("00174"));
    assert!(earliest.pickup_time.is_none());
    assert_eq!(earliest.discount, Decimal::new(215, 2));
    assert_eq!(earliest.total_paid, Decimal::new(1935, 2));
    let names = earliest
        .items
        .iter()
        .map(|i| i.product_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, ["Margherita", "Beer"]);
    assert_eq!(earliest.items[0].extras[0].name.as_str(), "basil");
}

#[tokio::test]
async fn unknown_account_empty() {
    let (shr_state, _sent) = ut_default_share_state("2026-10-16T17:00:00+02:00");
    let resp = ut_history(&shr_state, Some("nobody")).await.unwrap();
    assert!(resp.ok);
    assert!(resp.orders.is_empty());
}

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate};
use rust_decimal::Decimal;

use order_admission::error::AppErrorCode;
use order_admission::model::{
    FulfillmentModel, OrderChargeModel, OrderItemModel, OrderModel, OrderRequestModel,
    TimeSlotModel,
};
use order_admission::repository::{AbsOrderRepo, OrderInMemRepo};

use super::ut_in_mem_dstore;
use crate::model::{ut_delivery_req, ut_pickup_req};

fn ut_order(
    req: order_admission::api::web::dto::OrderCreateReqData,
    now: &str,
) -> (OrderModel, Vec<OrderItemModel>) {
    let req = OrderRequestModel::try_from(req).unwrap();
    let charge = OrderChargeModel::evaluate(req.fulfillment.mode(), req.raw_subtotal, false).unwrap();
    let now = DateTime::parse_from_rfc3339(now).unwrap();
    OrderModel::new(req, charge, now, 1)
}

fn ut_slot(raw: &str) -> TimeSlotModel {
    TimeSlotModel::from_str(raw).unwrap()
}

#[tokio::test]
async fn create_fetch_ok() {
    let repo = OrderInMemRepo::new(ut_in_mem_dstore(50)).await.unwrap();
    let (order, items) = ut_order(ut_delivery_req(), "2026-10-16T17:00:00+02:00");
    repo.create(&order).await.unwrap();
    let num = repo.save_items(order.id.as_str(), &items).await.unwrap();
    assert_eq!(num, 2);

    let fetched = repo.fetch_by_account("acc-1").await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0], order);
    let fetched_items = repo.fetch_items(order.id.as_str()).await.unwrap();
    assert_eq!(fetched_items, items);
    assert_eq!(repo.num_orders_by_account("acc-1").await.unwrap(), 1);
    assert_eq!(repo.num_orders_by_account("acc-2").await.unwrap(), 0);
}

#[tokio::test]
async fn booked_slots_union_of_modes() {
    let repo = OrderInMemRepo::new(ut_in_mem_dstore(50)).await.unwrap();
    let (order1, _) = ut_order(ut_delivery_req(), "2026-10-16T17:00:00+02:00");
    let (order2, _) = ut_order(ut_pickup_req("21:20"), "2026-10-16T17:05:00+02:00");
    // the same slot on another day does not count
    let (order3, _) = ut_order(ut_pickup_req("19:40"), "2026-10-15T17:05:00+02:00");
    for o in [&order1, &order2, &order3] {
        repo.create(o).await.unwrap();
    }
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let mut booked = repo.fetch_booked_slots(day).await.unwrap();
    booked.sort();
    assert_eq!(booked, vec![ut_slot("20:00"), ut_slot("21:20")]);
    let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    assert!(repo.fetch_booked_slots(day).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_slot_claimed_across_modes() {
    let repo = OrderInMemRepo::new(ut_in_mem_dstore(50)).await.unwrap();
    let (order1, _) = ut_order(ut_delivery_req(), "2026-10-16T17:00:00+02:00");
    repo.create(&order1).await.unwrap();
    // pickup at the slot already claimed by delivery
    let (order2, _) = ut_order(ut_pickup_req("20:00"), "2026-10-16T17:01:00+02:00");
    let error = repo.create(&order2).await.unwrap_err();
    assert_eq!(error.code, AppErrorCode::DuplicateEntry);
    // next day is free
    let (order3, _) = ut_order(ut_pickup_req("20:00"), "2026-10-17T12:00:00+02:00");
    assert!(repo.create(&order3).await.is_ok());
}

#[tokio::test]
async fn create_concurrent_same_slot() {
    let repo = OrderInMemRepo::new(ut_in_mem_dstore(50)).await.unwrap();
    let (order1, _) = ut_order(ut_pickup_req("20:20"), "2026-10-16T17:00:00+02:00");
    let (order2, _) = ut_order(ut_pickup_req("20:20"), "2026-10-16T17:00:00+02:00");
    let (r1, r2) = tokio::join!(repo.create(&order1), repo.create(&order2));
    assert!(r1.is_ok() ^ r2.is_ok());
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    assert_eq!(repo.fetch_booked_slots(day).await.unwrap().len(), 1);
}

#[tokio::test]
async fn fetch_by_account_newest_first() {
    let repo = OrderInMemRepo::new(ut_in_mem_dstore(50)).await.unwrap();
    let start = DateTime::parse_from_rfc3339("2026-10-10T17:00:00+02:00").unwrap();
    let mut expect_ids = Vec::new();
    for n in 0..3i64 {
        let t = (start + Duration::days(n)).to_rfc3339();
        let (order, _) = ut_order(ut_delivery_req(), t.as_str());
        repo.create(&order).await.unwrap();
        expect_ids.insert(0, order.id);
    }
    let fetched = repo.fetch_by_account("acc-1").await.unwrap();
    let actual_ids = fetched.into_iter().map(|o| o.id).collect::<Vec<_>>();
    assert_eq!(actual_ids, expect_ids);
}

#[tokio::test]
async fn fetch_items_in_submitted_order() {
    let repo = OrderInMemRepo::new(ut_in_mem_dstore(50)).await.unwrap();
    let (order, mut items) = ut_order(ut_pickup_req("22:00"), "2026-10-16T17:00:00+02:00");
    let template = items[0].clone();
    items = (0..12u32)
        .map(|n| OrderItemModel {
            product_name: format!("item-{n}"),
            quantity: n + 1,
            total_price: Decimal::new(150 * (n as i64 + 1), 2),
            ..template.clone()
        })
        .collect();
    repo.create(&order).await.unwrap();
    repo.save_items(order.id.as_str(), &items).await.unwrap();
    let fetched = repo.fetch_items(order.id.as_str()).await.unwrap();
    assert_eq!(fetched, items);
    if let FulfillmentModel::Pickup { pickup_name, .. } = &order.fulfillment {
        assert_eq!(pickup_name.as_str(), "Luigi");
    }
}

#[tokio::test]
async fn save_items_exceed_limit() {
    let repo = OrderInMemRepo::new(ut_in_mem_dstore(3)).await.unwrap();
    let (order, items) = ut_order(ut_delivery_req(), "2026-10-16T17:00:00+02:00");
    repo.create(&order).await.unwrap();
    let items = [items.clone(), items.clone()].concat();
    let error = repo.save_items(order.id.as_str(), &items).await.unwrap_err();
    assert_eq!(error.code, AppErrorCode::ExceedingMaxLimit);
}

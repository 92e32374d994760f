use chrono::DateTime;
use rust_decimal::Decimal;
use serde_json::json;

use order_admission::model::{
    FulfillmentMode, FulfillmentModel, OrderChargeModel, OrderModel, OrderRequestModel,
    OrderValidationError, TimeSlotModel,
};

use super::{ut_delivery_req, ut_pickup_req};

fn ut_verify_error(req: order_admission::api::web::dto::OrderCreateReqData, expect: OrderValidationError) {
    let actual = OrderRequestModel::try_from(req).unwrap_err();
    assert_eq!(actual, expect);
}

#[test]
fn convert_delivery_ok() {
    let req = OrderRequestModel::try_from(ut_delivery_req()).unwrap();
    assert_eq!(req.customer.account_id.as_deref(), Some("acc-1"));
    assert_eq!(req.customer.phone.as_str(), "3331234567");
    assert_eq!(req.rider_notes.as_deref(), Some("ring twice"));
    assert_eq!(req.raw_subtotal, Decimal::new(2000, 2));
    if let FulfillmentModel::Delivery { address, slot } = &req.fulfillment {
        assert_eq!(address.postal_code.as_str(), "00174");
        assert_eq!(address.floor.as_deref(), Some("2"));
        assert!(address.staircase.is_none());
        assert_eq!(*slot, TimeSlotModel::new(20, 0).unwrap());
    } else {
        panic!("unexpected fulfillment mode");
    }
    assert_eq!(req.items.len(), 2);
    let item = &req.items[0];
    assert_eq!(item.product_id.as_str(), "11");
    assert_eq!(item.quantity, 2);
    assert_eq!(item.unit_price, Decimal::new(850, 2));
    assert_eq!(item.extras[0].name.as_str(), "basil");
    assert_eq!(item.extras[0].price, Decimal::new(5, 1));
    // quantity defaults to one
    let item = &req.items[1];
    assert_eq!(item.product_id.as_str(), "b-7");
    assert_eq!(item.quantity, 1);
    assert!(item.size.is_none());
}

#[test]
fn convert_pickup_ok() {
    let req = OrderRequestModel::try_from(ut_pickup_req("9:40")).unwrap();
    assert_eq!(req.fulfillment.mode(), FulfillmentMode::Pickup);
    assert_eq!(req.fulfillment.slot(), TimeSlotModel::new(9, 40).unwrap());
    assert_eq!(req.customer.phone.as_str(), "06-55512");
    assert!(req.customer.account_id.is_none());
    assert!(req.payment_method.is_none());
}

#[test]
fn validate_empty_items() {
    let mut req = ut_delivery_req();
    req.items = Some(Vec::new());
    // even with other invalid fields, the first rule wins
    req.mode = Some("teleport".to_string());
    ut_verify_error(req, OrderValidationError::EmptyItems);
    let mut req = ut_delivery_req();
    req.items = None;
    ut_verify_error(req, OrderValidationError::EmptyItems);
}

#[test]
fn validate_too_many_items() {
    let mut req = ut_delivery_req();
    let item = req.items.as_ref().unwrap()[0].clone();
    req.items = Some(vec![item; 129]);
    ut_verify_error(req, OrderValidationError::TooManyItems(129));
}

#[test]
fn validate_mode() {
    for mode in [Some("teleport"), Some(""), Some("Delivery"), None] {
        let mut req = ut_delivery_req();
        req.mode = mode.map(String::from);
        req.phone = None;
        ut_verify_error(req, OrderValidationError::InvalidMode);
    }
}

#[test]
fn validate_phone() {
    for phone in ["1234", "  12 ", ""] {
        let mut req = ut_pickup_req("20:00");
        req.phone = serde_json::from_value(serde_json::json!(phone)).ok();
        req.pickup_name = None;
        ut_verify_error(req, OrderValidationError::InvalidPhone);
    }
    let mut req = ut_pickup_req("20:00");
    req.phone = serde_json::from_value(serde_json::json!(12345)).ok();
    assert!(OrderRequestModel::try_from(req).is_ok());
}

#[test]
fn validate_delivery_fields() {
    let mut req = ut_delivery_req();
    req.buzzer = Some("   ".to_string());
    req.payment_method = None;
    ut_verify_error(req, OrderValidationError::MissingDeliveryFields);
    let mut req = ut_delivery_req();
    req.delivery_time = None;
    req.pickup_time = Some("20:00".to_string());
    ut_verify_error(req, OrderValidationError::MissingDeliveryFields);
    let mut req = ut_delivery_req();
    req.address = None;
    ut_verify_error(req, OrderValidationError::MissingDeliveryFields);
}

#[test]
fn validate_payment_before_postal_code() {
    let mut req = ut_delivery_req();
    req.payment_method = Some(" ".to_string());
    req.postal_code = serde_json::from_value(serde_json::json!("00100")).ok();
    ut_verify_error(req, OrderValidationError::MissingPaymentMethod);
}

#[test]
fn validate_postal_code() {
    for code in ["00100", "0017", "001745", "abcde", "00 74"] {
        let mut req = ut_delivery_req();
        req.postal_code = serde_json::from_value(serde_json::json!(code)).ok();
        ut_verify_error(req, OrderValidationError::PostalCodeNotServed);
    }
    for code in ["00174", "00175", "00173", "00172", "00178", "00169"] {
        let mut req = ut_delivery_req();
        req.postal_code = serde_json::from_value(serde_json::json!(code)).ok();
        assert!(OrderRequestModel::try_from(req).is_ok());
    }
    let msg = OrderValidationError::PostalCodeNotServed.to_string();
    assert!(msg.contains("riders cannot reach"));
    assert!(msg.contains("pick up"));
}

#[test]
fn validate_pickup_fields() {
    let mut req = ut_pickup_req("20:00");
    req.pickup_name = Some(String::new());
    ut_verify_error(req, OrderValidationError::MissingPickupFields);
    let mut req = ut_pickup_req("20:00");
    req.pickup_time = None;
    req.delivery_time = Some("20:00".to_string());
    ut_verify_error(req, OrderValidationError::MissingPickupFields);
}

#[test]
fn validate_time_slot_format() {
    ut_verify_error(
        ut_pickup_req("25:00"),
        OrderValidationError::InvalidTimeSlot("25:00".to_string()),
    );
    let mut req = ut_delivery_req();
    req.delivery_time = Some("tonight".to_string());
    ut_verify_error(req, OrderValidationError::InvalidTimeSlot("tonight".to_string()));
}

#[test]
fn validate_item_quantity() {
    let mut req = ut_delivery_req();
    if let Some(items) = req.items.as_mut() {
        items[1].quantity = Some(0);
    }
    ut_verify_error(req, OrderValidationError::InvalidItemQuantity(1));
}

#[test]
fn validate_subtotal_range() {
    for raw in [
        json!("79228162514264337593543950335"),
        json!("-100000000000"),
        json!(1.0e20),
    ] {
        let mut req = ut_delivery_req();
        req.subtotal = Some(raw);
        ut_verify_error(req, OrderValidationError::InvalidSubtotal);
    }
    let mut req = ut_pickup_req("20:00");
    req.subtotal = Some(json!("99999000.00"));
    let req = OrderRequestModel::try_from(req).unwrap();
    assert_eq!(req.raw_subtotal, Decimal::new(9_999_900_000, 2));
    // ordered rules are reported first
    let mut req = ut_pickup_req("20:00");
    req.subtotal = Some(json!("79228162514264337593543950335"));
    req.phone = None;
    ut_verify_error(req, OrderValidationError::InvalidPhone);
}

#[test]
fn new_order_from_request() {
    let req = OrderRequestModel::try_from(ut_delivery_req()).unwrap();
    let charge =
        OrderChargeModel::evaluate(FulfillmentMode::Delivery, req.raw_subtotal, false).unwrap();
    let now = DateTime::parse_from_rfc3339("2026-10-16T23:50:00+02:00").unwrap();
    let (order, items) = OrderModel::new(req, charge, now, 1);
    assert_eq!(order.id.len(), 32);
    assert!(order.id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(order.order_date.to_string().as_str(), "2026-10-16");
    assert_eq!(order.slot(), TimeSlotModel::new(20, 0).unwrap());
    assert_eq!(order.charge.total, Decimal::new(2150, 2));
    assert_eq!(items.len(), 2);
    let another = OrderModel::generate_id(1);
    assert_ne!(order.id, another);
}

use chrono::DateTime;

use order_admission::api::web::dto::OrderCreateReqData;
use order_admission::model::{
    OrderChargeModel, OrderModel, OrderRequestModel, OrderSummaryModel,
};

use super::{ut_delivery_req, ut_pickup_req};

fn ut_render(req: OrderCreateReqData, first_order: bool) -> (OrderModel, OrderSummaryModel) {
    let req = OrderRequestModel::try_from(req).unwrap();
    let mode = req.fulfillment.mode();
    let charge = OrderChargeModel::evaluate(mode, req.raw_subtotal, first_order).unwrap();
    let now = DateTime::parse_from_rfc3339("2026-10-16T18:00:00+02:00").unwrap();
    let (order, items) = OrderModel::new(req, charge, now, 1);
    let summary = OrderSummaryModel::render(
        "mario@rossi.it".to_string(),
        &order,
        &items,
        "Pizzeria Spartaco",
        "Viale Spartaco 73, 00174 Roma",
    );
    (order, summary)
}

#[test]
fn render_delivery_summary() {
    let (order, summary) = ut_render(ut_delivery_req(), true);
    let expect_subject = format!("Order summary #{} - Pizzeria Spartaco", order.id);
    assert_eq!(summary.subject, expect_subject);
    assert_eq!(summary.recipient.as_str(), "mario@rossi.it");
    let body = summary.html_body.as_str();
    assert!(body.starts_with("<h2>Pizzeria Spartaco</h2>"));
    assert!(body.ends_with("<p><b>Paid: € 19.35</b></p>"));
    assert!(body.contains("Via Tuscolana 100, 00174"));
    assert!(body.contains("Delivery time: 20:00"));
    assert!(body.contains("Payment: cash"));
    assert!(body.contains("<td>Margherita</td><td>large</td><td>2</td><td>basil</td>"));
    assert!(body.contains("€ 8.50"));
    assert!(body.contains("Delivery: € 1.50"));
    assert!(body.contains("Discount: € 2.15"));
    assert!(body.contains("Paid: € 19.35"));
}

#[test]
fn render_pickup_summary_escaped() {
    let mut req = ut_pickup_req("21:20");
    req.pickup_name = Some("<b>Luigi</b> & co".to_string());
    let (_order, summary) = ut_render(req, false);
    let body = summary.html_body.as_str();
    assert!(body.contains("Pickup name: &lt;b&gt;Luigi&lt;/b&gt; &amp; co"));
    assert!(body.contains("Restaurant: Viale Spartaco 73, 00174 Roma"));
    assert!(body.contains("Pickup time: 21:20"));
    assert!(body.contains("Delivery: € 0.00"));
    assert!(!body.contains("Buzzer"));
}

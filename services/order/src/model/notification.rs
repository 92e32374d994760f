use rust_decimal::Decimal;

use super::{FulfillmentModel, OrderItemModel, OrderModel};

/// message sent to the customer once an order is admitted
#[derive(Debug, Clone)]
pub struct OrderSummaryModel {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

fn money(v: &Decimal) -> String {
    format!("€ {:.2}", v)
}

// user input is embedded into the summary, minimal escaping is enough for
// mail clients
fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl OrderSummaryModel {
    pub fn render(
        recipient: String,
        order: &OrderModel,
        items: &[OrderItemModel],
        store_name: &str,
        store_address: &str,
    ) -> Self {
        let subject = format!("Order summary #{} - {}", order.id, store_name);
        let mut body = format!(
            "<h2>{}</h2><p>Order <b>#{}</b></p><p>Phone: {}</p><p>Mode: {}</p>",
            escape(store_name),
            order.id,
            escape(order.customer.phone.as_str()),
            order.fulfillment.mode().label()
        );
        match &order.fulfillment {
            FulfillmentModel::Delivery { address, slot } => {
                body += &format!(
                    "<p>Address: {}, {}</p><p>Buzzer: {}</p><p>Delivery time: {}</p>",
                    escape(address.address.as_str()),
                    escape(address.postal_code.as_str()),
                    escape(address.buzzer.as_str()),
                    slot
                );
                if let Some(p) = order.payment_method.as_ref() {
                    body += &format!("<p>Payment: {}</p>", escape(p.as_str()));
                }
            }
            FulfillmentModel::Pickup { pickup_name, slot } => {
                body += &format!(
                    "<p>Pickup name: {}</p><p>Restaurant: {}</p><p>Pickup time: {}</p>",
                    escape(pickup_name.as_str()),
                    escape(store_address),
                    slot
                );
            }
        }
        body += "<table><tr><th>Item</th><th>Size</th><th>Qty</th><th>Extras</th>\
                 <th>Unit</th><th>Total</th></tr>";
        for item in items {
            let extras = item
                .extras
                .iter()
                .map(|e| escape(e.name.as_str()))
                .collect::<Vec<_>>()
                .join(", ");
            body += &format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(item.product_name.as_str()),
                escape(item.size.as_deref().unwrap_or("-")),
                item.quantity,
                extras,
                money(&item.unit_price),
                money(&item.total_price)
            );
        }
        body += "</table>";
        let charge = &order.charge;
        body += &format!(
            "<p>Subtotal: {}</p><p>Delivery: {}</p><p>Discount: {}</p>\
             <p>Total: {}</p><p><b>Paid: {}</b></p>",
            money(&charge.subtotal),
            money(&charge.delivery_fee),
            money(&charge.discount),
            money(&charge.total),
            money(&charge.total_paid)
        );
        Self {
            recipient,
            subject,
            html_body: body,
        }
    } // end of fn render
}

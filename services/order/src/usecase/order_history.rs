use std::boxed::Box;
use std::result::Result as DefaultResult;

use restaurant_common::logging::{app_log_event, AppLogLevel};

use crate::api::web::dto::{
    ItemExtraRespDto, OrderHistoryEntryDto, OrderHistoryRespDto, OrderItemRespDto,
};
use crate::error::AppError;
use crate::model::{FulfillmentModel, ItemExtraModel, OrderItemModel, OrderModel};
use crate::repository::AbsOrderRepo;
use crate::AppSharedState;

#[derive(Debug)]
pub enum OrderHistoryUsKsErr {
    ReqContent(String),
    Server(Vec<AppError>),
}

pub struct OrderHistoryUseCase {
    pub glb_state: AppSharedState,
    pub repo_order: Box<dyn AbsOrderRepo>,
}

impl From<ItemExtraModel> for ItemExtraRespDto {
    fn from(value: ItemExtraModel) -> Self {
        Self {
            name: value.name,
            price: value.price,
        }
    }
}

impl From<OrderItemModel> for OrderItemRespDto {
    fn from(value: OrderItemModel) -> Self {
        Self {
            product_id: value.product_id,
            product_name: value.product_name,
            size: value.size,
            quantity: value.quantity,
            extras: value.extras.into_iter().map(ItemExtraRespDto::from).collect(),
            unit_price: value.unit_price,
            total_price: value.total_price,
        }
    }
}

impl From<(OrderModel, Vec<OrderItemModel>)> for OrderHistoryEntryDto {
    fn from(value: (OrderModel, Vec<OrderItemModel>)) -> Self {
        let (order, items) = value;
        let mode = order.fulfillment.mode().label().to_string();
        let (mut address, mut postal_code, mut staircase, mut floor, mut buzzer) =
            (None, None, None, None, None);
        let (mut delivery_time, mut pickup_name, mut pickup_time) = (None, None, None);
        match order.fulfillment {
            FulfillmentModel::Delivery { address: a, slot } => {
                address = Some(a.address);
                postal_code = Some(a.postal_code);
                staircase = a.staircase;
                floor = a.floor;
                buzzer = Some(a.buzzer);
                delivery_time = Some(slot.to_string());
            }
            FulfillmentModel::Pickup { pickup_name: n, slot } => {
                pickup_name = Some(n);
                pickup_time = Some(slot.to_string());
            }
        }
        let c = order.customer;
        Self {
            id: order.id,
            created_at: order.created_at.to_rfc3339(),
            order_date: order.order_date.format("%Y-%m-%d").to_string(),
            mode,
            user_first_name: c.first_name,
            user_last_name: c.last_name,
            user_email: c.email,
            phone: c.phone,
            address,
            postal_code,
            staircase,
            floor,
            buzzer,
            delivery_time,
            pickup_name,
            pickup_time,
            payment_method: order.payment_method,
            rider_notes: order.rider_notes,
            subtotal: order.charge.subtotal,
            delivery_fee: order.charge.delivery_fee,
            total: order.charge.total,
            discount: order.charge.discount,
            total_paid: order.charge.total_paid,
            items: items.into_iter().map(OrderItemRespDto::from).collect(),
        }
    } // end of fn from
}

impl OrderHistoryUseCase {
    pub async fn execute(
        self,
        account_id: Option<String>,
    ) -> DefaultResult<OrderHistoryRespDto, OrderHistoryUsKsErr> {
        let account_id = account_id
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(OrderHistoryUsKsErr::ReqContent("user_id is required".to_string()))?;
        let logctx_p = self.glb_state.log_context().clone();
        let saved = self
            .repo_order
            .fetch_by_account(account_id.as_str())
            .await
            .map_err(|e| {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-fail-fetch-orders: {e}");
                OrderHistoryUsKsErr::Server(vec![e])
            })?;
        let mut orders = Vec::with_capacity(saved.len());
        for order in saved {
            let items = self
                .repo_order
                .fetch_items(order.id.as_str())
                .await
                .map_err(|e| {
                    app_log_event!(
                        logctx_p,
                        AppLogLevel::ERROR,
                        "repo-fail-fetch-items, oid:{}, {e}",
                        order.id
                    );
                    OrderHistoryUsKsErr::Server(vec![e])
                })?;
            orders.push(OrderHistoryEntryDto::from((order, items)));
        }
        Ok(OrderHistoryRespDto { ok: true, orders })
    } // end of fn execute
}

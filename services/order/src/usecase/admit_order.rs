use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::time::Duration;

use restaurant_common::logging::{app_log_event, AppLogLevel};
use restaurant_common::util::email_shape_valid;

use crate::api::web::dto::{OrderCreateReqData, OrderCreateRespOkDto};
use crate::constant::app_meta;
use crate::constant::hard_limit::MAX_SECONDS_NOTIFY;
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    FulfillmentMode, OrderChargeModel, OrderItemModel, OrderModel, OrderRequestModel,
    OrderSummaryModel,
};
use crate::repository::AbsOrderRepo;
use crate::AppSharedState;

#[derive(Debug)]
pub enum AdmitOrderUsKsErr {
    ReqContent(String),
    SlotConflict(String),
    Server(Vec<AppError>),
}

pub struct AdmitOrderUseCase {
    pub glb_state: AppSharedState,
    pub repo_order: Box<dyn AbsOrderRepo>,
}

fn slot_conflict_msg(mode: FulfillmentMode) -> String {
    match mode {
        FulfillmentMode::Delivery => "Delivery time not available, please choose another slot",
        FulfillmentMode::Pickup => "Pickup time not available, please choose another slot",
    }
    .to_string()
}

impl AdmitOrderUseCase {
    pub async fn execute(
        self,
        req: OrderCreateReqData,
    ) -> DefaultResult<OrderCreateRespOkDto, AdmitOrderUsKsErr> {
        let logctx_p = self.glb_state.log_context().clone();
        let req = OrderRequestModel::try_from(req)
            .map_err(|e| AdmitOrderUsKsErr::ReqContent(e.to_string()))?;
        let now = self.glb_state.clock().now();
        let mode = req.fulfillment.mode();
        let slot = req.fulfillment.slot();

        // advisory check only, the storage still rejects a slot claimed
        // concurrently by another request
        match self.repo_order.fetch_booked_slots(now.date_naive()).await {
            Ok(booked) => {
                if booked.contains(&slot) {
                    return Err(AdmitOrderUsKsErr::SlotConflict(slot_conflict_msg(mode)));
                }
            }
            Err(e) => {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "booked-slot-precheck: {e}");
            }
        }

        let first_order = self.is_first_order(&req).await;
        let charge = OrderChargeModel::evaluate(mode, req.raw_subtotal, first_order)
            .map_err(|e| AdmitOrderUsKsErr::ReqContent(e.to_string()))?;
        let (order, items) = OrderModel::new(req, charge, now, app_meta::MACHINE_CODE);

        if let Err(e) = self.repo_order.create(&order).await {
            return if e.code == AppErrorCode::DuplicateEntry {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::INFO,
                    "slot-claimed, day:{}, slot:{}",
                    order.order_date,
                    slot
                );
                Err(AdmitOrderUsKsErr::SlotConflict(slot_conflict_msg(mode)))
            } else {
                app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-fail-create: {e}");
                Err(AdmitOrderUsKsErr::Server(vec![e]))
            };
        }
        // the order row stays even if the items cannot be saved
        if let Err(e) = self.repo_order.save_items(order.id.as_str(), &items).await {
            app_log_event!(
                logctx_p,
                AppLogLevel::ERROR,
                "repo-fail-save-items, oid:{}, {e}",
                order.id
            );
            return Err(AdmitOrderUsKsErr::Server(vec![e]));
        }
        app_log_event!(
            logctx_p,
            AppLogLevel::INFO,
            "order-admitted, oid:{}, mode:{}, slot:{}",
            order.id,
            mode.label(),
            slot
        );

        let email_error = self.notify(&order, &items).await.err();
        Ok(OrderCreateRespOkDto {
            ok: true,
            order_id: order.id,
            discount: order.charge.discount,
            total_paid: order.charge.total_paid,
            email_sent: email_error.is_none(),
            email_error,
        })
    } // end of fn execute

    // discount applies only to identified customers without prior orders,
    // lookup failure is treated as not eligible
    async fn is_first_order(&self, req: &OrderRequestModel) -> bool {
        let account_id = match req.customer.account_id.as_ref() {
            Some(a) => a,
            None => return false,
        };
        match self.repo_order.num_orders_by_account(account_id.as_str()).await {
            Ok(num) => num == 0,
            Err(e) => {
                let logctx_p = self.glb_state.log_context().clone();
                app_log_event!(
                    logctx_p,
                    AppLogLevel::WARNING,
                    "prior-orders-lookup, account:{account_id}, {e}"
                );
                false
            }
        }
    }

    async fn notify(
        &self,
        order: &OrderModel,
        items: &[OrderItemModel],
    ) -> DefaultResult<(), String> {
        let recipient = match order.customer.email.as_ref() {
            Some(r) if email_shape_valid(r.as_str()) => r.clone(),
            Some(_) => return Err("invalid-recipient".to_string()),
            None => return Err("missing-recipient".to_string()),
        };
        let storefront = &self.glb_state.config().api_server.storefront;
        let msg = OrderSummaryModel::render(
            recipient,
            order,
            items,
            storefront.name.as_str(),
            storefront.address.as_str(),
        );
        let notifier = self.glb_state.notifier();
        let logctx_p = self.glb_state.log_context().clone();
        let limit = Duration::from_secs(MAX_SECONDS_NOTIFY);
        match tokio::time::timeout(limit, notifier.send(&msg)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::WARNING,
                    "order-summary-not-sent, oid:{}, {e}",
                    order.id
                );
                Err(e.detail.unwrap_or_else(|| format!("{:?}", e.code)))
            }
            Err(_elapsed) => {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::WARNING,
                    "order-summary-timeout, oid:{}, limit:{}s",
                    order.id,
                    MAX_SECONDS_NOTIFY
                );
                Err("notification-timeout".to_string())
            }
        }
    }
} // end of impl AdmitOrderUseCase

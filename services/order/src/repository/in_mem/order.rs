use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;

use crate::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemFetchedSingleRow, AppInMemFetchedSingleTable,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    CustomerModel, DeliveryAddressModel, FulfillmentMode, FulfillmentModel, ItemExtraModel,
    OrderChargeModel, OrderItemModel, OrderModel, TimeSlotModel,
};

use super::super::AbsOrderRepo;

mod _toplvl {
    pub(super) const TABLE_LABEL: &str = "order_toplvl_meta";
    #[rustfmt::skip]
    pub(super) enum InMemColIdx {
        CreateTime, OrderDate, AccountId, FirstName, LastName, Email, Phone,
        Mode, Address, PostalCode, Staircase, Floor, Buzzer, DeliveryTime,
        PickupName, PickupTime, PaymentMethod, RiderNotes, Subtotal,
        DeliveryFee, Total, Discount, TotalPaid, TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
}

mod _line {
    pub(super) const TABLE_LABEL: &str = "order_line_detail";
    #[rustfmt::skip]
    pub(super) enum InMemColIdx {
        ProductId, ProductName, Size, Quantity, Extras,
        UnitPrice, TotalPrice, TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
    pub(super) fn pkey(oid: &str, seq: usize) -> String {
        format!("{}{seq}", key_prefix(oid))
    }
    pub(super) fn key_prefix(oid: &str) -> String {
        format!("{oid}-")
    }
}

// one row per (day, slot) claimed by an order, works like the unique
// constraint of a relational database
mod _slot_claim {
    pub(super) const TABLE_LABEL: &str = "order_slot_claim";
    pub(super) fn pkey(day: &str, slot: &str) -> String {
        format!("{day}/{slot}")
    }
}

struct InMemFilterColumnOp<'a> {
    col_idx: usize,
    expect: &'a str,
}
impl<'a> AbsDStoreFilterKeyOp for InMemFilterColumnOp<'a> {
    fn filter(&self, _k: &String, row: &Vec<String>) -> bool {
        row.get(self.col_idx)
            .map(|v| v.as_str() == self.expect)
            .unwrap_or(false)
    }
}

struct InMemFilterKeyPrefixOp(String);
impl AbsDStoreFilterKeyOp for InMemFilterKeyPrefixOp {
    fn filter(&self, k: &String, _row: &Vec<String>) -> bool {
        k.starts_with(self.0.as_str())
    }
}

fn opt_to_col(v: Option<&String>) -> String {
    v.cloned().unwrap_or_default()
}

fn col_to_opt(v: &str) -> Option<String> {
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

fn corrupted(detail: String) -> AppError {
    AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(detail),
    }
}

struct RowReader<'a>(&'a AppInMemFetchedSingleRow);

impl<'a> RowReader<'a> {
    fn text(&self, idx: usize) -> DefaultResult<&'a str, AppError> {
        self.0
            .get(idx)
            .map(String::as_str)
            .ok_or(corrupted(format!("inmem-missing-col: {idx}")))
    }
    fn decimal(&self, idx: usize) -> DefaultResult<Decimal, AppError> {
        let raw = self.text(idx)?;
        Decimal::from_str(raw).map_err(|e| corrupted(format!("col:{idx}, {e}")))
    }
    fn slot(&self, idx: usize) -> DefaultResult<TimeSlotModel, AppError> {
        TimeSlotModel::from_str(self.text(idx)?)
    }
}

impl From<&OrderModel> for AppInMemFetchedSingleRow {
    fn from(value: &OrderModel) -> Self {
        let num_cols: usize = _toplvl::InMemColIdx::TotNumColumns.into();
        let mut row = (0..num_cols).map(|_| String::new()).collect::<Vec<_>>();
        let c = &value.customer;
        let mut cols = vec![
            (_toplvl::InMemColIdx::CreateTime, value.created_at.to_rfc3339()),
            (_toplvl::InMemColIdx::OrderDate, value.order_date.to_string()),
            (_toplvl::InMemColIdx::AccountId, opt_to_col(c.account_id.as_ref())),
            (_toplvl::InMemColIdx::FirstName, opt_to_col(c.first_name.as_ref())),
            (_toplvl::InMemColIdx::LastName, opt_to_col(c.last_name.as_ref())),
            (_toplvl::InMemColIdx::Email, opt_to_col(c.email.as_ref())),
            (_toplvl::InMemColIdx::Phone, c.phone.clone()),
            (
                _toplvl::InMemColIdx::Mode,
                value.fulfillment.mode().label().to_string(),
            ),
            (
                _toplvl::InMemColIdx::PaymentMethod,
                opt_to_col(value.payment_method.as_ref()),
            ),
            (
                _toplvl::InMemColIdx::RiderNotes,
                opt_to_col(value.rider_notes.as_ref()),
            ),
            (_toplvl::InMemColIdx::Subtotal, value.charge.subtotal.to_string()),
            (
                _toplvl::InMemColIdx::DeliveryFee,
                value.charge.delivery_fee.to_string(),
            ),
            (_toplvl::InMemColIdx::Total, value.charge.total.to_string()),
            (_toplvl::InMemColIdx::Discount, value.charge.discount.to_string()),
            (_toplvl::InMemColIdx::TotalPaid, value.charge.total_paid.to_string()),
        ];
        match &value.fulfillment {
            FulfillmentModel::Delivery { address, slot } => {
                cols.extend([
                    (_toplvl::InMemColIdx::Address, address.address.clone()),
                    (_toplvl::InMemColIdx::PostalCode, address.postal_code.clone()),
                    (
                        _toplvl::InMemColIdx::Staircase,
                        opt_to_col(address.staircase.as_ref()),
                    ),
                    (_toplvl::InMemColIdx::Floor, opt_to_col(address.floor.as_ref())),
                    (_toplvl::InMemColIdx::Buzzer, address.buzzer.clone()),
                    (_toplvl::InMemColIdx::DeliveryTime, slot.to_string()),
                ]);
            }
            FulfillmentModel::Pickup { pickup_name, slot } => {
                cols.extend([
                    (_toplvl::InMemColIdx::PickupName, pickup_name.clone()),
                    (_toplvl::InMemColIdx::PickupTime, slot.to_string()),
                ]);
            }
        }
        cols.into_iter()
            .map(|(idx, val)| {
                let idx: usize = idx.into();
                row[idx] = val;
            })
            .count();
        row
    }
} // end of impl From for order top-level row

impl TryFrom<(String, AppInMemFetchedSingleRow)> for OrderModel {
    type Error = AppError;
    fn try_from(value: (String, AppInMemFetchedSingleRow)) -> DefaultResult<Self, Self::Error> {
        let (id, row) = value;
        let r = RowReader(&row);
        let created_at = DateTime::parse_from_rfc3339(r.text(_toplvl::InMemColIdx::CreateTime.into())?)
            .map_err(|e| corrupted(e.to_string()))?;
        let order_date = NaiveDate::from_str(r.text(_toplvl::InMemColIdx::OrderDate.into())?)
            .map_err(|e| corrupted(e.to_string()))?;
        let customer = CustomerModel {
            account_id: col_to_opt(r.text(_toplvl::InMemColIdx::AccountId.into())?),
            first_name: col_to_opt(r.text(_toplvl::InMemColIdx::FirstName.into())?),
            last_name: col_to_opt(r.text(_toplvl::InMemColIdx::LastName.into())?),
            email: col_to_opt(r.text(_toplvl::InMemColIdx::Email.into())?),
            phone: r.text(_toplvl::InMemColIdx::Phone.into())?.to_string(),
        };
        let mode = FulfillmentMode::from_str(r.text(_toplvl::InMemColIdx::Mode.into())?)
            .map_err(|e| corrupted(e.to_string()))?;
        let fulfillment = match mode {
            FulfillmentMode::Delivery => FulfillmentModel::Delivery {
                address: DeliveryAddressModel {
                    address: r.text(_toplvl::InMemColIdx::Address.into())?.to_string(),
                    postal_code: r.text(_toplvl::InMemColIdx::PostalCode.into())?.to_string(),
                    staircase: col_to_opt(r.text(_toplvl::InMemColIdx::Staircase.into())?),
                    floor: col_to_opt(r.text(_toplvl::InMemColIdx::Floor.into())?),
                    buzzer: r.text(_toplvl::InMemColIdx::Buzzer.into())?.to_string(),
                },
                slot: r.slot(_toplvl::InMemColIdx::DeliveryTime.into())?,
            },
            FulfillmentMode::Pickup => FulfillmentModel::Pickup {
                pickup_name: r.text(_toplvl::InMemColIdx::PickupName.into())?.to_string(),
                slot: r.slot(_toplvl::InMemColIdx::PickupTime.into())?,
            },
        };
        let charge = OrderChargeModel {
            subtotal: r.decimal(_toplvl::InMemColIdx::Subtotal.into())?,
            delivery_fee: r.decimal(_toplvl::InMemColIdx::DeliveryFee.into())?,
            total: r.decimal(_toplvl::InMemColIdx::Total.into())?,
            discount: r.decimal(_toplvl::InMemColIdx::Discount.into())?,
            total_paid: r.decimal(_toplvl::InMemColIdx::TotalPaid.into())?,
        };
        Ok(Self {
            id,
            created_at,
            order_date,
            customer,
            fulfillment,
            payment_method: col_to_opt(r.text(_toplvl::InMemColIdx::PaymentMethod.into())?),
            rider_notes: col_to_opt(r.text(_toplvl::InMemColIdx::RiderNotes.into())?),
            charge,
        })
    } // end of fn try_from
} // end of impl OrderModel

impl TryFrom<&OrderItemModel> for AppInMemFetchedSingleRow {
    type Error = AppError;
    fn try_from(value: &OrderItemModel) -> DefaultResult<Self, Self::Error> {
        let extras = value
            .extras
            .iter()
            .map(|e| (e.name.as_str(), e.price.to_string()))
            .collect::<Vec<_>>();
        let extras = serde_json::to_string(&extras).map_err(|e| corrupted(e.to_string()))?;
        let num_cols: usize = _line::InMemColIdx::TotNumColumns.into();
        let mut row = (0..num_cols).map(|_| String::new()).collect::<Vec<_>>();
        [
            (_line::InMemColIdx::ProductId, value.product_id.clone()),
            (_line::InMemColIdx::ProductName, value.product_name.clone()),
            (_line::InMemColIdx::Size, opt_to_col(value.size.as_ref())),
            (_line::InMemColIdx::Quantity, value.quantity.to_string()),
            (_line::InMemColIdx::Extras, extras),
            (_line::InMemColIdx::UnitPrice, value.unit_price.to_string()),
            (_line::InMemColIdx::TotalPrice, value.total_price.to_string()),
        ]
        .into_iter()
        .map(|(idx, val)| {
            let idx: usize = idx.into();
            row[idx] = val;
        })
        .count();
        Ok(row)
    }
}

impl TryFrom<AppInMemFetchedSingleRow> for OrderItemModel {
    type Error = AppError;
    fn try_from(row: AppInMemFetchedSingleRow) -> DefaultResult<Self, Self::Error> {
        let r = RowReader(&row);
        let extras = serde_json::from_str::<Vec<(String, String)>>(
            r.text(_line::InMemColIdx::Extras.into())?,
        )
        .map_err(|e| corrupted(e.to_string()))?
        .into_iter()
        .map(|(name, price)| {
            Decimal::from_str(price.as_str())
                .map(|price| ItemExtraModel { name, price })
                .map_err(|e| corrupted(e.to_string()))
        })
        .collect::<DefaultResult<Vec<_>, AppError>>()?;
        let quantity = r
            .text(_line::InMemColIdx::Quantity.into())?
            .parse::<u32>()
            .map_err(|e| corrupted(e.to_string()))?;
        Ok(Self {
            product_id: r.text(_line::InMemColIdx::ProductId.into())?.to_string(),
            product_name: r.text(_line::InMemColIdx::ProductName.into())?.to_string(),
            size: col_to_opt(r.text(_line::InMemColIdx::Size.into())?),
            quantity,
            extras,
            unit_price: r.decimal(_line::InMemColIdx::UnitPrice.into())?,
            total_price: r.decimal(_line::InMemColIdx::TotalPrice.into())?,
        })
    }
}

pub struct OrderInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl OrderInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(_toplvl::TABLE_LABEL).await?;
        m.create_table(_line::TABLE_LABEL).await?;
        m.create_table(_slot_claim::TABLE_LABEL).await?;
        Ok(Self { datastore: m })
    }

    async fn fetch_toplvl_by(
        &self,
        col: _toplvl::InMemColIdx,
        expect: &str,
    ) -> DefaultResult<AppInMemFetchedSingleTable, AppError> {
        let op = InMemFilterColumnOp {
            col_idx: col.into(),
            expect,
        };
        let tbl_label = _toplvl::TABLE_LABEL.to_string();
        let keys = self.datastore.filter_keys(tbl_label.clone(), &op).await?;
        let info = HashMap::from([(tbl_label, keys)]);
        let mut data = self.datastore.fetch(info).await?;
        Ok(data.remove(_toplvl::TABLE_LABEL).unwrap_or_default())
    }
} // end of impl OrderInMemRepo

#[async_trait]
impl AbsOrderRepo for OrderInMemRepo {
    async fn fetch_booked_slots(&self, day: NaiveDate) -> DefaultResult<Vec<TimeSlotModel>, AppError> {
        let day = day.to_string();
        let rows = self
            .fetch_toplvl_by(_toplvl::InMemColIdx::OrderDate, day.as_str())
            .await?;
        let col_idxs: [usize; 2] = [
            _toplvl::InMemColIdx::DeliveryTime.into(),
            _toplvl::InMemColIdx::PickupTime.into(),
        ];
        let mut out = Vec::new();
        for row in rows.values() {
            for idx in col_idxs {
                let raw = RowReader(row).text(idx)?;
                if !raw.is_empty() {
                    out.push(TimeSlotModel::from_str(raw)?);
                }
            }
        }
        Ok(out)
    }

    async fn num_orders_by_account(&self, account_id: &str) -> DefaultResult<usize, AppError> {
        let op = InMemFilterColumnOp {
            col_idx: _toplvl::InMemColIdx::AccountId.into(),
            expect: account_id,
        };
        let keys = self
            .datastore
            .filter_keys(_toplvl::TABLE_LABEL.to_string(), &op)
            .await?;
        Ok(keys.len())
    }

    async fn create(&self, order: &OrderModel) -> DefaultResult<(), AppError> {
        let claim_key = _slot_claim::pkey(
            order.order_date.to_string().as_str(),
            order.slot().to_string().as_str(),
        );
        let info = HashMap::from([(_slot_claim::TABLE_LABEL.to_string(), vec![claim_key.clone()])]);
        // the lock is held until the new order is saved, no other task can
        // claim the same slot in between
        let (fetched, lock) = self.datastore.fetch_acquire(info).await?;
        let claimed = fetched
            .get(_slot_claim::TABLE_LABEL)
            .map(|t| t.contains_key(claim_key.as_str()))
            .unwrap_or(false);
        if claimed {
            return Err(AppError {
                code: AppErrorCode::DuplicateEntry,
                detail: Some(format!("slot-claimed: {claim_key}")),
            });
        }
        let toplvl_row = AppInMemFetchedSingleRow::from(order);
        let data = HashMap::from([
            (
                _slot_claim::TABLE_LABEL.to_string(),
                HashMap::from([(claim_key, vec![order.id.clone()])]),
            ),
            (
                _toplvl::TABLE_LABEL.to_string(),
                HashMap::from([(order.id.clone(), toplvl_row)]),
            ),
        ]);
        let _num = self.datastore.save_release(data, lock)?;
        Ok(())
    } // end of fn create

    async fn save_items(&self, oid: &str, items: &[OrderItemModel]) -> DefaultResult<usize, AppError> {
        let rows = items
            .iter()
            .enumerate()
            .map(|(seq, item)| {
                AppInMemFetchedSingleRow::try_from(item).map(|row| (_line::pkey(oid, seq), row))
            })
            .collect::<DefaultResult<AppInMemFetchedSingleTable, AppError>>()?;
        let data = HashMap::from([(_line::TABLE_LABEL.to_string(), rows)]);
        self.datastore.save(data).await
    }

    async fn fetch_by_account(&self, account_id: &str) -> DefaultResult<Vec<OrderModel>, AppError> {
        let rows = self
            .fetch_toplvl_by(_toplvl::InMemColIdx::AccountId, account_id)
            .await?;
        let mut orders = rows
            .into_iter()
            .map(OrderModel::try_from)
            .collect::<DefaultResult<Vec<_>, AppError>>()?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn fetch_items(&self, oid: &str) -> DefaultResult<Vec<OrderItemModel>, AppError> {
        let op = InMemFilterKeyPrefixOp(_line::key_prefix(oid));
        let tbl_label = _line::TABLE_LABEL.to_string();
        let keys = self.datastore.filter_keys(tbl_label.clone(), &op).await?;
        let info = HashMap::from([(tbl_label, keys)]);
        let mut data = self.datastore.fetch(info).await?;
        let mut rows = data
            .remove(_line::TABLE_LABEL)
            .unwrap_or_default()
            .into_iter()
            .map(|(k, row)| {
                let seq = k
                    .rsplit('-')
                    .next()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(0);
                (seq, row)
            })
            .collect::<Vec<_>>();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter()
            .map(|(_seq, row)| OrderItemModel::try_from(row))
            .collect()
    }
} // end of impl OrderInMemRepo

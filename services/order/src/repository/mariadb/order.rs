use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;
use std::vec::Vec;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use futures_util::stream::StreamExt;
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::{Arguments, Executor, Row, Statement};

use restaurant_common::adapter::repository::OidBytes;

use crate::constant::hard_limit;
use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    CustomerModel, DeliveryAddressModel, FulfillmentMode, FulfillmentModel, ItemExtraModel,
    OrderChargeModel, OrderItemModel, OrderModel, TimeSlotModel,
};
use crate::repository::AbsOrderRepo;

use super::{first_db_pool, run_query_once};

const TOPLVL_COLUMNS: &str = "`o_id`,`created_time`,`order_date`,`usr_id`,`first_name`,\
    `last_name`,`email`,`phone`,`mode`,`address`,`postal_code`,`staircase`,`floor`,`buzzer`,\
    `delivery_time`,`pickup_name`,`pickup_time`,`payment_method`,`rider_notes`,`subtotal`,\
    `delivery_fee`,`total`,`discount`,`total_paid`";

const LINE_COLUMNS: &str = "`product_id`,`product_name`,`size`,`quantity`,`extras`,\
    `unit_price`,`total_price`";

struct InsertTopMetaArg<'a>(&'a OrderModel);
struct InsertLinesArg<'a, 'b>(&'a OidBytes, &'b [OrderItemModel]);

struct TopLvlMetaRow(MySqlRow);
struct OLineRow(MySqlRow);

fn arg_error(e: impl ToString) -> AppError {
    AppError {
        code: AppErrorCode::InvalidInput,
        detail: Some(e.to_string()),
    }
}

fn corrupted(e: impl ToString) -> AppError {
    AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(e.to_string()),
    }
}

impl<'a> TryFrom<InsertTopMetaArg<'a>> for (String, MySqlArguments) {
    type Error = AppError;
    fn try_from(value: InsertTopMetaArg<'a>) -> DefaultResult<Self, Self::Error> {
        let o = value.0;
        let oid_b = OidBytes::try_from(o.id.as_str())?;
        let (address, delivery_time, pickup_name, pickup_time) = match &o.fulfillment {
            FulfillmentModel::Delivery { address, slot } => {
                (Some(address), Some(slot.to_string()), None, None)
            }
            FulfillmentModel::Pickup { pickup_name, slot } => {
                (None, None, Some(pickup_name.clone()), Some(slot.to_string()))
            }
        };
        let mut args = MySqlArguments::default();
        args.add(oid_b.as_column()).map_err(arg_error)?;
        args.add(o.created_at.naive_utc()).map_err(arg_error)?;
        args.add(o.order_date).map_err(arg_error)?;
        args.add(o.customer.account_id.clone()).map_err(arg_error)?;
        args.add(o.customer.first_name.clone()).map_err(arg_error)?;
        args.add(o.customer.last_name.clone()).map_err(arg_error)?;
        args.add(o.customer.email.clone()).map_err(arg_error)?;
        args.add(o.customer.phone.clone()).map_err(arg_error)?;
        args.add(o.fulfillment.mode().label()).map_err(arg_error)?;
        args.add(address.map(|a| a.address.clone())).map_err(arg_error)?;
        args.add(address.map(|a| a.postal_code.clone())).map_err(arg_error)?;
        args.add(address.and_then(|a| a.staircase.clone())).map_err(arg_error)?;
        args.add(address.and_then(|a| a.floor.clone())).map_err(arg_error)?;
        args.add(address.map(|a| a.buzzer.clone())).map_err(arg_error)?;
        args.add(delivery_time).map_err(arg_error)?;
        args.add(pickup_name).map_err(arg_error)?;
        args.add(pickup_time).map_err(arg_error)?;
        args.add(o.payment_method.clone()).map_err(arg_error)?;
        args.add(o.rider_notes.clone()).map_err(arg_error)?;
        args.add(o.charge.subtotal).map_err(arg_error)?;
        args.add(o.charge.delivery_fee).map_err(arg_error)?;
        args.add(o.charge.total).map_err(arg_error)?;
        args.add(o.charge.discount).map_err(arg_error)?;
        args.add(o.charge.total_paid).map_err(arg_error)?;
        let patt = format!(
            "INSERT INTO `order_toplvl_meta`({TOPLVL_COLUMNS}) VALUES \
             (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)"
        );
        Ok((patt, args))
    }
} // end of impl InsertTopMetaArg

impl<'a, 'b> TryFrom<InsertLinesArg<'a, 'b>> for (String, MySqlArguments) {
    type Error = AppError;
    fn try_from(value: InsertLinesArg<'a, 'b>) -> DefaultResult<Self, Self::Error> {
        let (oid_b, items) = (value.0, value.1);
        let mut args = MySqlArguments::default();
        for (seq, item) in items.iter().enumerate() {
            let extras = item
                .extras
                .iter()
                .map(|e| (e.name.as_str(), e.price.to_string()))
                .collect::<Vec<_>>();
            let extras = serde_json::to_string(&extras).map_err(arg_error)?;
            args.add(oid_b.as_column()).map_err(arg_error)?;
            args.add(seq as u16).map_err(arg_error)?;
            args.add(item.product_id.as_str()).map_err(arg_error)?;
            args.add(item.product_name.as_str()).map_err(arg_error)?;
            args.add(item.size.as_deref()).map_err(arg_error)?;
            args.add(item.quantity).map_err(arg_error)?;
            args.add(extras).map_err(arg_error)?;
            args.add(item.unit_price).map_err(arg_error)?;
            args.add(item.total_price).map_err(arg_error)?;
        }
        let col_seq = "(?,?,?,?,?,?,?,?,?)";
        let values = (0..items.len()).map(|_| col_seq).collect::<Vec<_>>().join(",");
        let patt = format!(
            "INSERT INTO `order_line_detail`(`o_id`,`seq`,{LINE_COLUMNS}) VALUES {values}"
        );
        Ok((patt, args))
    }
} // end of impl InsertLinesArg

impl TryFrom<TopLvlMetaRow> for OrderModel {
    type Error = AppError;
    fn try_from(value: TopLvlMetaRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        let id = OidBytes::to_app_oid(row.try_get::<Vec<u8>, usize>(0)?)?;
        let created_at = row
            .try_get::<NaiveDateTime, usize>(1)?
            .and_utc()
            .fixed_offset();
        let order_date = row.try_get::<NaiveDate, usize>(2)?;
        let customer = CustomerModel {
            account_id: row.try_get::<Option<String>, usize>(3)?,
            first_name: row.try_get::<Option<String>, usize>(4)?,
            last_name: row.try_get::<Option<String>, usize>(5)?,
            email: row.try_get::<Option<String>, usize>(6)?,
            phone: row.try_get::<String, usize>(7)?,
        };
        let mode = FulfillmentMode::from_str(row.try_get::<&str, usize>(8)?).map_err(corrupted)?;
        let slot_at = |idx: usize| -> DefaultResult<TimeSlotModel, AppError> {
            let raw = row.try_get::<Option<String>, usize>(idx)?;
            let raw = raw.ok_or(corrupted(format!("slot-missing, col:{idx}")))?;
            TimeSlotModel::from_str(raw.as_str())
        };
        let fulfillment = match mode {
            FulfillmentMode::Delivery => {
                let address = DeliveryAddressModel {
                    address: row.try_get::<Option<String>, usize>(9)?.unwrap_or_default(),
                    postal_code: row.try_get::<Option<String>, usize>(10)?.unwrap_or_default(),
                    staircase: row.try_get::<Option<String>, usize>(11)?,
                    floor: row.try_get::<Option<String>, usize>(12)?,
                    buzzer: row.try_get::<Option<String>, usize>(13)?.unwrap_or_default(),
                };
                FulfillmentModel::Delivery {
                    address,
                    slot: slot_at(14)?,
                }
            }
            FulfillmentMode::Pickup => FulfillmentModel::Pickup {
                pickup_name: row.try_get::<Option<String>, usize>(15)?.unwrap_or_default(),
                slot: slot_at(16)?,
            },
        };
        let charge = OrderChargeModel {
            subtotal: row.try_get::<Decimal, usize>(19)?,
            delivery_fee: row.try_get::<Decimal, usize>(20)?,
            total: row.try_get::<Decimal, usize>(21)?,
            discount: row.try_get::<Decimal, usize>(22)?,
            total_paid: row.try_get::<Decimal, usize>(23)?,
        };
        Ok(Self {
            id,
            created_at,
            order_date,
            customer,
            fulfillment,
            payment_method: row.try_get::<Option<String>, usize>(17)?,
            rider_notes: row.try_get::<Option<String>, usize>(18)?,
            charge,
        })
    } // end of fn try_from
} // end of impl TopLvlMetaRow

impl TryFrom<OLineRow> for OrderItemModel {
    type Error = AppError;
    fn try_from(value: OLineRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        let extras_raw = row.try_get::<String, usize>(4)?;
        let extras = serde_json::from_str::<Vec<(String, String)>>(extras_raw.as_str())
            .map_err(corrupted)?
            .into_iter()
            .map(|(name, price)| {
                Decimal::from_str(price.as_str())
                    .map(|price| ItemExtraModel { name, price })
                    .map_err(corrupted)
            })
            .collect::<DefaultResult<Vec<_>, AppError>>()?;
        Ok(Self {
            product_id: row.try_get::<String, usize>(0)?,
            product_name: row.try_get::<String, usize>(1)?,
            size: row.try_get::<Option<String>, usize>(2)?,
            quantity: row.try_get::<u32, usize>(3)?,
            extras,
            unit_price: row.try_get::<Decimal, usize>(5)?,
            total_price: row.try_get::<Decimal, usize>(6)?,
        })
    }
} // end of impl OLineRow

pub(crate) struct OrderMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

impl OrderMariaDbRepo {
    pub(crate) fn try_build(dbs: &[Arc<AppMariaDbStore>]) -> DefaultResult<Self, AppError> {
        let _db = first_db_pool(dbs)?;
        Ok(Self { _db })
    }
}

#[async_trait]
impl AbsOrderRepo for OrderMariaDbRepo {
    async fn fetch_booked_slots(&self, day: NaiveDate) -> DefaultResult<Vec<TimeSlotModel>, AppError> {
        let sql_patt = "SELECT `delivery_time`,`pickup_time` FROM `order_toplvl_meta` \
                        WHERE `order_date`=?";
        let mut conn = self._db.acquire().await?;
        let stmt = conn.prepare(sql_patt).await?;
        let query = stmt.query().bind(day);
        let exec = &mut *conn;
        let mut rs_stream = exec.fetch(query);
        let mut booked = Vec::new();
        while let Some(result) = rs_stream.next().await {
            let row = result?;
            for idx in [0usize, 1] {
                if let Some(raw) = row.try_get::<Option<String>, usize>(idx)? {
                    booked.push(TimeSlotModel::from_str(raw.as_str())?);
                }
            }
        }
        Ok(booked)
    }

    async fn num_orders_by_account(&self, account_id: &str) -> DefaultResult<usize, AppError> {
        let sql_patt = "SELECT COUNT(*) FROM `order_toplvl_meta` WHERE `usr_id`=?";
        let mut conn = self._db.acquire().await?;
        let stmt = conn.prepare(sql_patt).await?;
        let query = stmt.query().bind(account_id);
        let exec = &mut *conn;
        let row = exec.fetch_one(query).await?;
        let num = row.try_get::<i64, usize>(0)?;
        Ok(num.max(0) as usize)
    }

    async fn create(&self, order: &OrderModel) -> DefaultResult<(), AppError> {
        // duplicate claim of (order_date, slot) is rejected by the unique key
        // on the generated column `slot_claimed`, the error is converted to
        // `AppErrorCode::DuplicateEntry`
        let (sql_patt, args): (String, MySqlArguments) = InsertTopMetaArg(order).try_into()?;
        let mut conn = self._db.acquire().await?;
        let _rs = run_query_once(&mut conn, sql_patt, args, Some(1)).await?;
        Ok(())
    }

    async fn save_items(&self, oid: &str, items: &[OrderItemModel]) -> DefaultResult<usize, AppError> {
        if items.is_empty() {
            return Ok(0);
        } else if items.len() > hard_limit::MAX_ITEMS_PER_ORDER {
            let detail = format!(
                "actual: {}, limit:{}",
                items.len(),
                hard_limit::MAX_ITEMS_PER_ORDER
            );
            return Err(AppError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: Some(detail),
            });
        }
        let oid_b = OidBytes::try_from(oid)?;
        let (sql_patt, args): (String, MySqlArguments) =
            InsertLinesArg(&oid_b, items).try_into()?;
        let mut conn = self._db.acquire().await?;
        let rs = run_query_once(&mut conn, sql_patt, args, Some(items.len())).await?;
        Ok(rs.rows_affected() as usize)
    }

    async fn fetch_by_account(&self, account_id: &str) -> DefaultResult<Vec<OrderModel>, AppError> {
        let sql_patt = format!(
            "SELECT {TOPLVL_COLUMNS} FROM `order_toplvl_meta` WHERE `usr_id`=? \
             ORDER BY `created_time` DESC"
        );
        let mut conn = self._db.acquire().await?;
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let query = stmt.query().bind(account_id);
        let exec = &mut *conn;
        let mut rs_stream = exec.fetch(query);
        let mut orders = Vec::new();
        while let Some(result) = rs_stream.next().await {
            let row = result?;
            orders.push(OrderModel::try_from(TopLvlMetaRow(row))?);
        }
        Ok(orders)
    }

    async fn fetch_items(&self, oid: &str) -> DefaultResult<Vec<OrderItemModel>, AppError> {
        let oid_b = OidBytes::try_from(oid)?;
        let sql_patt = format!(
            "SELECT {LINE_COLUMNS} FROM `order_line_detail` WHERE `o_id`=? ORDER BY `seq` ASC"
        );
        let mut conn = self._db.acquire().await?;
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let query = stmt.query().bind(oid_b.as_column());
        let exec = &mut *conn;
        let mut rs_stream = exec.fetch(query);
        let mut lines = Vec::new();
        while let Some(result) = rs_stream.next().await {
            let row = result?;
            lines.push(OrderItemModel::try_from(OLineRow(row))?);
        }
        Ok(lines)
    }
} // end of impl OrderMariaDbRepo

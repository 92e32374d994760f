use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;
use std::vec::Vec;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{AppError, AppErrorCode};
use crate::model::{OrderItemModel, OrderModel, TimeSlotModel};
use crate::AppDataStoreContext;

mod in_mem;
// make in-memory repo visible only for testing purpose
pub use in_mem::order::OrderInMemRepo;
pub use in_mem::time_slot::TimeSlotInMemRepo;

#[cfg(feature = "mariadb")]
mod mariadb;

#[cfg(feature = "mariadb")]
use mariadb::order::OrderMariaDbRepo;

#[cfg(feature = "mariadb")]
use mariadb::time_slot::TimeSlotMariaDbRepo;

// the repository instance may be used across an await,
// the future created by app callers has to be able to pass to different threads
// , it is the reason to add `Send` and `Sync` as super-traits
#[async_trait]
pub trait AbsTimeSlotRepo: Sync + Send {
    /// enabled slots only, in no particular order
    async fn fetch_enabled(&self) -> DefaultResult<Vec<TimeSlotModel>, AppError>;

    /// insert or update the slots with given enabled flags
    async fn save(&self, slots: Vec<(TimeSlotModel, bool)>) -> DefaultResult<(), AppError>;
}

#[async_trait]
pub trait AbsOrderRepo: Sync + Send {
    /// slots claimed by orders of the given day, either delivery or pickup
    async fn fetch_booked_slots(&self, day: NaiveDate) -> DefaultResult<Vec<TimeSlotModel>, AppError>;

    async fn num_orders_by_account(&self, account_id: &str) -> DefaultResult<usize, AppError>;

    /// Insert the order, the storage MUST reject the order with error code
    /// `AppErrorCode::DuplicateEntry` if another order on the same day
    /// already claimed the same slot, regardless of fulfillment mode.
    async fn create(&self, order: &OrderModel) -> DefaultResult<(), AppError>;

    async fn save_items(&self, oid: &str, items: &[OrderItemModel]) -> DefaultResult<usize, AppError>;

    /// orders owned by the account, newest first
    async fn fetch_by_account(&self, account_id: &str) -> DefaultResult<Vec<OrderModel>, AppError>;

    async fn fetch_items(&self, oid: &str) -> DefaultResult<Vec<OrderItemModel>, AppError>;
}

pub async fn app_repo_time_slot(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsTimeSlotRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = TimeSlotMariaDbRepo::try_build(dbs)?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::FeatureDisabled,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = TimeSlotInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
} // end of fn app_repo_time_slot

pub async fn app_repo_order(
    ds: Arc<AppDataStoreContext>,
) -> DefaultResult<Box<dyn AbsOrderRepo>, AppError> {
    #[cfg(feature = "mariadb")]
    if let Some(dbs) = ds.sql_dbs.as_ref() {
        let obj = OrderMariaDbRepo::try_build(dbs)?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::FeatureDisabled,
            detail: Some("mariadb".to_string()),
        })
    }
    #[cfg(not(feature = "mariadb"))]
    if let Some(m) = ds.in_mem.as_ref() {
        let obj = OrderInMemRepo::new(m.clone()).await?;
        Ok(Box::new(obj))
    } else {
        Err(AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("unknown-type".to_string()),
        })
    }
} // end of fn app_repo_order

use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::StreamExt;
use sqlx::mysql::MySqlArguments;
use sqlx::{Arguments, Executor, Row, Statement};

use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::TimeSlotModel;
use crate::repository::AbsTimeSlotRepo;

use super::{first_db_pool, run_query_once};

pub(crate) struct TimeSlotMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

impl TimeSlotMariaDbRepo {
    pub(crate) fn try_build(dbs: &[Arc<AppMariaDbStore>]) -> DefaultResult<Self, AppError> {
        let _db = first_db_pool(dbs)?;
        Ok(Self { _db })
    }
}

#[async_trait]
impl AbsTimeSlotRepo for TimeSlotMariaDbRepo {
    async fn fetch_enabled(&self) -> DefaultResult<Vec<TimeSlotModel>, AppError> {
        let sql_patt = "SELECT `slot` FROM `time_slot` WHERE `enabled`=TRUE";
        let mut conn = self._db.acquire().await?;
        let stmt = conn.prepare(sql_patt).await?;
        let query = stmt.query();
        let exec = &mut *conn;
        let mut rs_stream = exec.fetch(query);
        let mut slots = Vec::new();
        while let Some(result) = rs_stream.next().await {
            let row = result?;
            let raw = row.try_get::<String, usize>(0)?;
            slots.push(TimeSlotModel::from_str(raw.as_str())?);
        }
        Ok(slots)
    }

    async fn save(&self, slots: Vec<(TimeSlotModel, bool)>) -> DefaultResult<(), AppError> {
        if slots.is_empty() {
            return Ok(());
        }
        let mut args = MySqlArguments::default();
        for (slot, enabled) in slots.iter() {
            args.add(slot.to_string()).map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })?;
            args.add(*enabled).map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })?;
        }
        let values = slots.iter().map(|_| "(?,?)").collect::<Vec<_>>().join(",");
        let sql_patt = format!(
            "INSERT INTO `time_slot`(`slot`,`enabled`) VALUES {values} \
             ON DUPLICATE KEY UPDATE `enabled`=VALUES(`enabled`)"
        );
        let mut conn = self._db.acquire().await?;
        let _rs = run_query_once(&mut conn, sql_patt, args, None).await?;
        Ok(())
    }
}

use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::datastore::{AbsDStoreFilterKeyOp, AbstInMemoryDStore};
use crate::error::AppError;
use crate::model::TimeSlotModel;

use super::super::AbsTimeSlotRepo;

const TABLE_LABEL: &str = "time_slot";
const COL_IDX_ENABLED: usize = 0;

struct InnerFilterEnabledOp;

impl AbsDStoreFilterKeyOp for InnerFilterEnabledOp {
    fn filter(&self, _k: &String, row: &Vec<String>) -> bool {
        row.get(COL_IDX_ENABLED)
            .map(|v| v.as_str() == "1")
            .unwrap_or(false)
    }
}

pub struct TimeSlotInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl TimeSlotInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        m.create_table(TABLE_LABEL).await?;
        Ok(Self { datastore: m })
    }
}

#[async_trait]
impl AbsTimeSlotRepo for TimeSlotInMemRepo {
    async fn fetch_enabled(&self) -> DefaultResult<Vec<TimeSlotModel>, AppError> {
        let op = InnerFilterEnabledOp;
        let keys = self
            .datastore
            .filter_keys(TABLE_LABEL.to_string(), &op)
            .await?;
        keys.iter()
            .map(|k| TimeSlotModel::from_str(k.as_str()))
            .collect()
    }

    async fn save(&self, slots: Vec<(TimeSlotModel, bool)>) -> DefaultResult<(), AppError> {
        let rows = slots
            .into_iter()
            .map(|(slot, enabled)| {
                let flag = if enabled { "1" } else { "0" };
                (slot.to_string(), vec![flag.to_string()])
            })
            .collect();
        let data = HashMap::from([(TABLE_LABEL.to_string(), rows)]);
        let _num = self.datastore.save(data).await?;
        Ok(())
    }
}

use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use restaurant_common::config::AppInMemoryDbCfg;

use crate::error::{AppError, AppErrorCode};

// simple implementation of in-memory data storage

// application callers are responsible to maintain the structure
// of each row in each table. Each element of a row is stringified
// regardless of its original types (integer, decimal, date-time)
pub type AppInMemFetchedSingleRow = Vec<String>;
pub type AppInMemFetchedSingleTable = HashMap<String, AppInMemFetchedSingleRow>;
type AllTable = HashMap<String, AppInMemFetchedSingleTable>;
pub type AppInMemUpdateData = AllTable;
pub type AppInMemFetchKeys = HashMap<String, Vec<String>>; // list of IDs per table
pub type AppInMemFetchedData = AllTable;

/// exclusive access to all tables, held between `fetch_acquire()` and
/// `save_release()` so callers can check-then-write atomically
pub struct AppInMemDstoreLock {
    guard: OwnedMutexGuard<AllTable>,
}

pub trait AbsDStoreFilterKeyOp: Send + Sync {
    fn filter(&self, k: &String, v: &Vec<String>) -> bool;
}

#[async_trait]
pub trait AbstInMemoryDStore: Send + Sync {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError>;
    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError>;
    async fn fetch(&self, info: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError>;
    async fn fetch_acquire(
        &self,
        info: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError>;
    fn save_release(
        &self,
        data: AppInMemUpdateData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError>;
    async fn filter_keys(
        &self,
        tbl_label: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError>;
}

pub struct AppInMemoryDStore {
    max_items_per_table: u32,
    table_map: Arc<Mutex<AllTable>>,
}

impl AppInMemoryDStore {
    pub fn new(cfg: &AppInMemoryDbCfg) -> Self {
        let t_map = Arc::new(Mutex::new(HashMap::new()));
        Self {
            table_map: t_map,
            max_items_per_table: cfg.max_items,
        }
    }

    fn _check_table_existence<'a>(
        _map: &AllTable,
        mut keys: impl Iterator<Item = &'a String>,
    ) -> DefaultResult<(), AppError> {
        if let Some(d) = keys.find(|label| !_map.contains_key(label.as_str())) {
            Err(AppError {
                detail: Some(d.to_string()),
                code: AppErrorCode::DataTableNotExist,
            })
        } else {
            Ok(())
        }
    }

    // number of rows after the update must not exceed the limit
    fn _check_capacity(&self, _map: &AllTable, data: &AppInMemUpdateData) -> DefaultResult<(), AppError> {
        let limit = self.max_items_per_table as usize;
        let invalid = data.iter().find(|(label, d_grp)| {
            let num_existing = _map.get(label.as_str()).map(|t| t.len()).unwrap_or(0);
            let num_new = match _map.get(label.as_str()) {
                Some(t) => d_grp.keys().filter(|k| !t.contains_key(k.as_str())).count(),
                None => d_grp.len(),
            };
            limit < (num_existing + num_new)
        });
        if let Some((label, _)) = invalid {
            let msg = format!("table:{}, limit:{}", label, limit);
            Err(AppError {
                detail: Some(msg),
                code: AppErrorCode::ExceedingMaxLimit,
            })
        } else {
            Ok(())
        }
    }

    fn _save(&self, _map: &mut AllTable, data: AppInMemUpdateData) -> DefaultResult<usize, AppError> {
        Self::_check_table_existence(_map, data.keys())?;
        self._check_capacity(_map, &data)?;
        let mut tot_cnt = 0usize;
        for (label, d_grp) in data {
            if let Some(table) = _map.get_mut(label.as_str()) {
                tot_cnt += d_grp.len();
                table.extend(d_grp);
            }
        }
        Ok(tot_cnt)
    }

    fn _fetch(_map: &AllTable, info: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError> {
        Self::_check_table_existence(_map, info.keys())?;
        let rs_a = info
            .into_iter()
            .map(|(label, ids)| {
                let rs_t = match _map.get(label.as_str()) {
                    Some(table) => ids
                        .into_iter()
                        .filter_map(|id| table.get(id.as_str()).map(|row| (id, row.clone())))
                        .collect::<AppInMemFetchedSingleTable>(),
                    None => HashMap::new(),
                };
                (label, rs_t)
            })
            .collect();
        Ok(rs_a)
    }
} // end of impl AppInMemoryDStore

#[async_trait]
impl AbstInMemoryDStore for AppInMemoryDStore {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError> {
        let mut _map = self.table_map.lock().await;
        if !_map.contains_key(label) {
            _map.insert(label.to_string(), HashMap::new());
        }
        Ok(())
    }

    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError> {
        let mut _map = self.table_map.lock().await;
        self._save(&mut _map, data)
    }

    async fn fetch(&self, info: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError> {
        let _map = self.table_map.lock().await;
        Self::_fetch(&_map, info)
    }

    async fn fetch_acquire(
        &self,
        info: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError> {
        let guard = self.table_map.clone().lock_owned().await;
        let fetched = Self::_fetch(&guard, info)?;
        Ok((fetched, AppInMemDstoreLock { guard }))
    }

    fn save_release(
        &self,
        data: AppInMemUpdateData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError> {
        let mut guard = lock.guard;
        self._save(&mut guard, data)
    } // the lock is released once the guard goes out of scope

    async fn filter_keys(
        &self,
        tbl_label: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError> {
        let _map = self.table_map.lock().await;
        let table = _map.get(tbl_label.as_str()).ok_or(AppError {
            detail: Some(tbl_label.clone()),
            code: AppErrorCode::DataTableNotExist,
        })?;
        let keys = table
            .iter()
            .filter(|(k, v)| op.filter(k, v))
            .map(|(k, _v)| k.clone())
            .collect();
        Ok(keys)
    }
} // end of impl AbstInMemoryDStore

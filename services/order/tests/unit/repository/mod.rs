mod order;
mod time_slot;

use std::boxed::Box;
use std::sync::Arc;

use restaurant_common::config::AppInMemoryDbCfg;

use order_admission::datastore::{AbstInMemoryDStore, AppInMemoryDStore};

pub(crate) fn ut_in_mem_dstore(max_items: u32) -> Arc<Box<dyn AbstInMemoryDStore>> {
    let cfg = AppInMemoryDbCfg {
        alias: "utest".to_string(),
        max_items,
    };
    let obj: Box<dyn AbstInMemoryDStore> = Box::new(AppInMemoryDStore::new(&cfg));
    Arc::new(obj)
}

use std::boxed::Box;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use uuid::{Builder, NoContext, Timestamp, Uuid};

use restaurant_common::confidentiality::AbstractConfidentiality;
use restaurant_common::config::AppConfig;
use restaurant_common::logging::AppLogContext;

pub mod api;
pub mod clock;
pub mod constant;
pub mod error;
pub mod model;
pub mod network;
pub mod repository;
pub mod usecase;

mod adapter;
pub use adapter::datastore;
pub use adapter::thirdparty::{
    app_notification_context, AbstractNotificationSink, AppMailRelaySink, AppNotifyDummySink,
};

use clock::{AbstractClock, AppSystemClock};
use error::AppError;

type WebApiHdlrLabel = &'static str;

pub struct AppDataStoreContext {
    pub in_mem: Option<Arc<Box<dyn datastore::AbstInMemoryDStore>>>,
    pub sql_dbs: Option<Vec<Arc<datastore::AppMariaDbStore>>>,
}

// global state shared by all threads
pub struct AppSharedState {
    _cfg: Arc<AppConfig>,
    _log: Arc<AppLogContext>,
    dstore: Arc<AppDataStoreContext>,
    _clock: Arc<Box<dyn AbstractClock>>,
    _notifier: Arc<Box<dyn AbstractNotificationSink>>,
}

impl AppSharedState {
    pub fn new(
        cfg: AppConfig,
        log: AppLogContext,
        confidential: Box<dyn AbstractConfidentiality>,
    ) -> DefaultResult<Self, AppError> {
        let confidential = Arc::new(confidential);
        let log = Arc::new(log);
        let (in_mem, sql_dbs) = datastore::build_context(
            log.clone(),
            &cfg.api_server.data_store,
            confidential.clone(),
        );
        let in_mem = in_mem.map(Arc::new);
        let sql_dbs = sql_dbs.map(|m| m.into_iter().map(Arc::new).collect());
        let ds_ctx = Arc::new(AppDataStoreContext { in_mem, sql_dbs });
        let notifier =
            app_notification_context(&cfg.api_server.notification, confidential, log.clone())?;
        let clock = AppSystemClock::new(cfg.api_server.storefront.utc_offset_minutes);
        Ok(Self {
            _cfg: Arc::new(cfg),
            _log: log,
            dstore: ds_ctx,
            _clock: Arc::new(Box::new(clock)),
            _notifier: Arc::new(notifier),
        })
    } // end of fn new

    /// replace the wall clock, mostly for tests which need deterministic
    /// "current time"
    pub fn with_clock(mut self, clock: Box<dyn AbstractClock>) -> Self {
        self._clock = Arc::new(clock);
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn AbstractNotificationSink>) -> Self {
        self._notifier = Arc::new(notifier);
        self
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        &self._cfg
    }

    pub fn log_context(&self) -> &Arc<AppLogContext> {
        &self._log
    }

    pub fn datastore(&self) -> Arc<AppDataStoreContext> {
        self.dstore.clone()
    }

    pub fn clock(&self) -> Arc<Box<dyn AbstractClock>> {
        self._clock.clone()
    }

    pub fn notifier(&self) -> Arc<Box<dyn AbstractNotificationSink>> {
        self._notifier.clone()
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _cfg: self._cfg.clone(),
            _log: self._log.clone(),
            dstore: self.dstore.clone(),
            _clock: self._clock.clone(),
            _notifier: self._notifier.clone(),
        }
    }
}

fn generate_custom_uid(machine_code: u8) -> Uuid {
    // few bits of the ID are assigned to machine / node ID, so multiple
    // instances of this service can generate order IDs without collision,
    // rest of that should be timestamp with random byte sequence
    let ts_ctx = NoContext;
    let (secs, nano) = Timestamp::now(ts_ctx).to_unix();
    let millis = (secs * 1000).saturating_add((nano as u64) / 1_000_000);
    let mut node_id = rand::random::<[u8; 10]>();
    node_id[0] = machine_code;
    let builder = Builder::from_unix_timestamp_millis(millis, &node_id);
    builder.into_uuid()
}

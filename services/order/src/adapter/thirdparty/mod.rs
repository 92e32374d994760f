mod base_client;
mod dummy;
mod mail_relay;

use std::boxed::Box;
use std::marker::{Send, Sync};
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use restaurant_common::confidentiality::AbstractConfidentiality;
use restaurant_common::config::AppNotificationCfg;
use restaurant_common::logging::AppLogContext;

use crate::error::AppError;
use crate::model::OrderSummaryModel;

pub use dummy::AppNotifyDummySink;
pub use mail_relay::AppMailRelaySink;

#[async_trait]
pub trait AbstractNotificationSink: Send + Sync {
    // failure here never rolls back an admitted order, callers only report it
    async fn send(&self, msg: &OrderSummaryModel) -> Result<(), AppError>;
}

pub fn app_notification_context(
    cfg: &AppNotificationCfg,
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractNotificationSink>, AppError> {
    match cfg {
        AppNotificationCfg::dummy => Ok(Box::new(AppNotifyDummySink)),
        AppNotificationCfg::MailRelay(c) => {
            let obj = AppMailRelaySink::try_build(c, cfdntl, logctx)?;
            Ok(Box::new(obj))
        }
    }
}

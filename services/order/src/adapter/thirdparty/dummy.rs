use std::result::Result;

use async_trait::async_trait;

use super::AbstractNotificationSink;
use crate::error::{AppError, AppErrorCode};
use crate::model::OrderSummaryModel;

pub struct AppNotifyDummySink;

#[async_trait]
impl AbstractNotificationSink for AppNotifyDummySink {
    async fn send(&self, _msg: &OrderSummaryModel) -> Result<(), AppError> {
        Err(AppError {
            code: AppErrorCode::FeatureDisabled,
            detail: Some("mailer-not-configured".to_string()),
        })
    }
}

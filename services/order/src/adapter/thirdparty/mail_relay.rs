use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use hyper::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::Method;
use serde::Serialize;
use tokio_native_tls::{native_tls, TlsConnector};

use restaurant_common::confidentiality::AbstractConfidentiality;
use restaurant_common::config::AppMailRelayCfg;
use restaurant_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::base_client::BaseClient;
use super::AbstractNotificationSink;
use crate::constant::HTTP_CONTENT_TYPE_JSON;
use crate::error::{AppError, AppErrorCode};
use crate::model::OrderSummaryModel;

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// forwards order summaries to HTTPS mail relay, authenticated by bearer
/// token loaded from confidential storage
pub struct AppMailRelaySink {
    _host: String,
    _port: u16,
    _resource_path: String,
    _sender: String,
    _token: String,
    _logctx: Arc<AppLogContext>,
    _secure_connector: TlsConnector,
}

impl AppMailRelaySink {
    pub(super) fn try_build(
        cfg: &AppMailRelayCfg,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        _logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppError> {
        let serial = cfdntl.try_get_payload(cfg.confidentiality_path.as_str())?;
        let _token = serde_json::from_str::<String>(serial.as_str()).map_err(|_e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: Some("relay-token-parse-failure".to_string()),
        })?;
        let _secure_connector = {
            let mut builder = native_tls::TlsConnector::builder();
            builder.min_protocol_version(Some(native_tls::Protocol::Tlsv12));
            let sc = builder.build().map_err(|e| AppError {
                code: AppErrorCode::CryptoFailure,
                detail: Some(e.to_string()),
            })?;
            sc.into()
        };
        Ok(Self {
            _host: cfg.host.clone(),
            _port: cfg.port,
            _resource_path: cfg.resource_path.clone(),
            _sender: cfg.sender.clone(),
            _token,
            _logctx,
            _secure_connector,
        })
    } // end of fn try-build
} // end of impl AppMailRelaySink

#[async_trait]
impl AbstractNotificationSink for AppMailRelaySink {
    async fn send(&self, msg: &OrderSummaryModel) -> Result<(), AppError> {
        let logctx_p = &self._logctx;
        let body = {
            let m = RelayMessage {
                from: self._sender.as_str(),
                to: msg.recipient.as_str(),
                subject: msg.subject.as_str(),
                html: msg.html_body.as_str(),
            };
            serde_json::to_vec(&m).map_err(|e| AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(e.to_string()),
            })?
        };
        let auth_tok = {
            let s = format!("Bearer {}", &self._token);
            HeaderValue::from_str(s.as_str()).map_err(|e| AppError {
                code: AppErrorCode::InvalidInput,
                detail: Some(e.to_string()),
            })?
        };
        let headers = vec![
            (AUTHORIZATION, auth_tok),
            (CONTENT_TYPE, HeaderValue::from_static(HTTP_CONTENT_TYPE_JSON)),
        ];
        let mut _client = BaseClient::try_build(
            self._host.clone(),
            self._port,
            &self._secure_connector,
            self._logctx.clone(),
        )
        .await?;
        let (rawbody, status) = _client
            .execute(self._resource_path.as_str(), Method::POST, headers, Some(body))
            .await?;
        if status.is_success() {
            Ok(())
        } else {
            let detail = format!(
                "mail-relay, status:{}, body:{}",
                status.as_u16(),
                String::from_utf8_lossy(&rawbody)
            );
            app_log_event!(logctx_p, AppLogLevel::WARNING, "{}", &detail);
            Err(AppError {
                code: AppErrorCode::RemoteServiceFailure,
                detail: Some(detail),
            })
        }
    } // end of fn send
} // end of impl AppMailRelaySink

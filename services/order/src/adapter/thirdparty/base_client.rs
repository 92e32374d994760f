use std::convert::Infallible;
use std::result::Result;
use std::sync::Arc;

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes as HyperBytes;
use hyper::client::conn::http1::{handshake, SendRequest};
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, HOST};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio_native_tls::TlsConnector;

use restaurant_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::error::{AppError, AppErrorCode};

/// single HTTP/1.1 connection over TLS to a remote service, each instance
/// is used for one short exchange then dropped
pub(super) struct BaseClient {
    req_sender: SendRequest<BoxBody<HyperBytes, Infallible>>,
    host: String,
    port: u16,
    logctx: Arc<AppLogContext>,
}

impl BaseClient {
    pub(super) async fn try_build(
        host: String,
        port: u16,
        secure_connector: &TlsConnector,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppError> {
        let tcp_stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|e| AppError {
                code: AppErrorCode::IOerror(e.kind()),
                detail: Some(format!("{}:{}, {}", host.as_str(), port, e)),
            })?;
        let tls_stream = secure_connector
            .connect(host.as_str(), tcp_stream)
            .await
            .map_err(|e| AppError {
                code: AppErrorCode::CryptoFailure,
                detail: Some(e.to_string()),
            })?;
        let (req_sender, connection) =
            handshake(TokioIo::new(tls_stream))
                .await
                .map_err(|e| AppError {
                    code: AppErrorCode::HttpHandshakeFailure,
                    detail: Some(e.to_string()),
                })?;
        let logctx_p = logctx.clone();
        let _handle = tokio::task::spawn(async move {
            if let Err(e) = connection.await {
                app_log_event!(logctx_p, AppLogLevel::WARNING, "http-conn-closed: {:?}", e);
            }
        });
        Ok(Self {
            req_sender,
            host,
            port,
            logctx,
        })
    } // end of fn try-build

    pub(super) async fn execute(
        &mut self,
        resource_path: &str,
        method: Method,
        headers: Vec<(HeaderName, HeaderValue)>,
        rawbody: Option<Vec<u8>>,
    ) -> Result<(Vec<u8>, StatusCode), AppError> {
        let (body, body_len) = if let Some(v) = rawbody {
            let sz = v.len();
            (BoxBody::new(Full::new(HyperBytes::from(v))), sz)
        } else {
            (BoxBody::new(Empty::new()), 0usize)
        };
        let mut req = Request::builder()
            .uri(resource_path)
            .method(method)
            .body(body)
            .map_err(|e| AppError {
                code: AppErrorCode::HttpHandshakeFailure,
                detail: Some(e.to_string()),
            })?;
        let host_val = HeaderValue::from_str(self.host.as_str()).map_err(|e| AppError {
            code: AppErrorCode::InvalidInput,
            detail: Some(e.to_string()),
        })?;
        let hdrs = req.headers_mut();
        hdrs.extend(headers);
        let _discard = hdrs.insert(HOST, host_val);
        let _discard = hdrs.insert(CONTENT_LENGTH, HeaderValue::from(body_len));

        let logctx_p = self.logctx.clone();
        let resp = self.req_sender.send_request(req).await.map_err(|e| {
            let detail = e.to_string();
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "host: {}, port:{}, detail:{}",
                &self.host,
                self.port,
                &detail
            );
            AppError {
                code: AppErrorCode::RemoteServiceFailure,
                detail: Some(detail),
            }
        })?;
        let status = resp.status();
        let collected = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(e.to_string()),
            })?
            .to_bytes();
        app_log_event!(
            logctx_p,
            AppLogLevel::DEBUG,
            "host: {}, port:{}, resp-status:{}",
            &self.host,
            self.port,
            status.as_u16()
        );
        Ok((collected.to_vec(), status))
    } // end of fn execute
} // end of impl BaseClient

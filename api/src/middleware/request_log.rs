use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Request;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use sandbox_core::records::RequestRecord;
use serde_json::{Value, json};
use tower::{Layer, Service, ServiceExt};

use crate::error::AppError;
use crate::extract::{MAX_TOOL_BODY_BYTES, ParsedBody, parse_tool_body};
use crate::store::SessionLog;

const TOOL_PATH_PREFIX: &str = "/tools/";

/// Tower Layer that records every `POST /tools/*` request.
///
/// Buffers and parses the body once, hands the parsed value to the handler
/// through request extensions, and after the handler has answered appends a
/// `RequestRecord` with the final status code. A body that cannot be buffered
/// within `MAX_TOOL_BODY_BYTES` is answered with 413 and logged as a failure
/// without reaching the handler.
#[derive(Clone)]
pub struct RequestLogLayer {
    session: Arc<SessionLog>,
}

impl RequestLogLayer {
    pub fn new(session: Arc<SessionLog>) -> Self {
        Self { session }
    }
}

impl<S> Layer<S> for RequestLogLayer {
    type Service = RequestLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogService {
            inner,
            session: self.session.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequestLogService<S> {
    inner: S,
    session: Arc<SessionLog>,
}

impl<S> Service<Request> for RequestLogService<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let not_ready = self.inner.clone();
        let ready = std::mem::replace(&mut self.inner, not_ready);
        let session = self.session.clone();

        Box::pin(async move {
            let Some(tool) = tool_name(req.method(), req.uri().path()) else {
                return Ok(ready.oneshot(req).await.into_response());
            };

            let (mut parts, body) = req.into_parts();
            let bytes = match axum::body::to_bytes(body, MAX_TOOL_BODY_BYTES).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(tool = %tool, error = %e, "Failed to read tool request body");
                    let response = AppError::PayloadTooLarge {
                        limit: MAX_TOOL_BODY_BYTES,
                    }
                    .into_response();
                    session
                        .record_request(RequestRecord::new(
                            &tool,
                            Some(unread_body_marker(MAX_TOOL_BODY_BYTES)),
                            response.status().as_u16(),
                        ))
                        .await;
                    return Ok(response);
                }
            };
            let request_body = parse_tool_body(&bytes);

            tracing::debug!(
                tool = %tool,
                body = %request_body.as_ref().map(|b| b.to_string()).unwrap_or_default(),
                "Tool request"
            );

            parts.extensions.insert(ParsedBody(request_body.clone()));
            let req = Request::from_parts(parts, Body::from(bytes));
            let response = ready.oneshot(req).await.into_response();

            let status = response.status();
            if status.as_u16() >= 400 {
                tracing::warn!(
                    tool = %tool,
                    status = status.as_u16(),
                    body = %request_body.as_ref().map(|b| b.to_string()).unwrap_or_default(),
                    "Tool request failed"
                );
            }

            session
                .record_request(RequestRecord::new(&tool, request_body, status.as_u16()))
                .await;

            Ok(response)
        })
    }
}

/// Stand-in for a body that was never buffered.
fn unread_body_marker(limit: usize) -> Value {
    json!({ "_raw": format!("<body exceeded {limit} bytes>") })
}

/// Tool name for a loggable request, i.e. `POST /tools/{name}`.
fn tool_name(method: &Method, path: &str) -> Option<String> {
    if *method != Method::POST {
        return None;
    }
    path.strip_prefix(TOOL_PATH_PREFIX).map(str::to_string)
}

//! Tower middleware wrapping the filter chain around a next stage.
//!
//! # Data Flow
//! ```text
//! host chain
//!     → FieldFilterService::call
//!     → buffer body (form-urlencoded POST/PUT/PATCH, multipart/form-data)
//!     → FilterChain::evaluate
//!     → Forward: next stage gets the request unmodified
//!     → Reject: 400 + rejection message, next stage never called
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::response::Response;
use futures::future::BoxFuture;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use http_body_util::LengthLimitError;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::config::{Config, FilterSettings, DEFAULT_MAX_BODY_BYTES};
use crate::domain::request::FormBody;
use crate::domain::{Decision, FieldFilter, Filter, FilterChain, FilterError, FormParams};

/// Layer installing a [`FieldFilterService`] in front of the next stage.
#[derive(Clone)]
pub struct FieldFilterLayer {
    chain: Arc<FilterChain>,
    max_body_bytes: usize,
}

impl FieldFilterLayer {
    pub fn new(chain: Arc<FilterChain>) -> Self {
        Self {
            chain,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Layer for a single filter instance.
    pub fn from_settings(settings: &FilterSettings) -> Result<Self, FilterError> {
        let filter: Box<dyn Filter> = Box::new(FieldFilter::new(settings)?);
        let chain = FilterChain::from_filters(vec![filter]);
        Ok(Self::new(Arc::new(chain)))
    }

    /// Layer for every filter of a configuration, in order.
    pub fn from_config(config: &Config) -> Result<Self, FilterError> {
        let chain = FilterChain::new(config)?;
        Ok(Self::new(Arc::new(chain)).max_body_bytes(config.max_body_bytes))
    }

    /// Cap on buffered form bodies.
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}

impl<S> Layer<S> for FieldFilterLayer {
    type Service = FieldFilterService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FieldFilterService {
            inner,
            chain: self.chain.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Request handler that forwards to `inner` or answers with a rejection.
#[derive(Clone)]
pub struct FieldFilterService<S> {
    inner: S,
    chain: Arc<FilterChain>,
    max_body_bytes: usize,
}

impl<S> FieldFilterService<S> {
    /// Build a handler for one filter in front of `next`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidPattern`] if a pattern does not compile;
    /// no handler is produced.
    pub fn new(settings: &FilterSettings, next: S) -> Result<Self, FilterError> {
        Ok(FieldFilterLayer::from_settings(settings)?.layer(next))
    }
}

impl<S> Service<Request> for FieldFilterService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let chain = self.chain.clone();
        let limit = self.max_body_bytes;
        // Keep the instance that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let (parts, body) = req.into_parts();

            let (params, body) = if !FormBody::of(&parts.method, &parts.headers).is_none() {
                if declared_length(&parts.headers).is_some_and(|len| len > limit) {
                    warn!(limit, "Declared form body exceeds limit");
                    return Ok(plain_response(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        "Request body too large",
                    ));
                }

                let bytes = match to_bytes(body, limit).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let inner_err = e.into_inner();
                        if inner_err.is::<LengthLimitError>() {
                            warn!(limit, "Form body exceeds limit");
                            return Ok(plain_response(
                                StatusCode::PAYLOAD_TOO_LARGE,
                                "Request body too large",
                            ));
                        }
                        warn!(error = %inner_err, "Failed to read request body");
                        return Ok(plain_response(
                            StatusCode::BAD_REQUEST,
                            "Failed to read request body",
                        ));
                    }
                };
                let params = FormParams::from_request(
                    &parts.method,
                    &parts.uri,
                    &parts.headers,
                    bytes.clone(),
                )
                .await;
                (params, Body::from(bytes))
            } else {
                let params = FormParams::from_parts(&parts.method, &parts.uri, &parts.headers, &[]);
                (params, body)
            };

            match chain.evaluate(&params) {
                Decision::Forward => {
                    debug!(uri = %parts.uri, "Forwarding request");
                    inner.call(Request::from_parts(parts, body)).await
                }
                Decision::Reject { status, message } => Ok(plain_response(status, message)),
            }
        })
    }
}

fn declared_length(headers: &http::HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn plain_response(status: StatusCode, body: impl Into<Body>) -> Response {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

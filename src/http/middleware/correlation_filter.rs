//! Correlation filter.
//!
//! Resolves the correlation ID for every inbound request and runs the rest of
//! the stack inside a context scope holding it. The scope also covers the
//! synchronous part of the inner service's `call`, so nothing downstream can
//! run before the ID is in place. Leaving the scope, on any path, clears it.

use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};
use tracing::Instrument;

use crate::correlation::{context, CorrelationIdPolicy, KORRELASJONS_ID_HEADER};

/// Tower layer installing the correlation filter.
#[derive(Debug, Clone)]
pub struct CorrelationLayer {
    policy: CorrelationIdPolicy,
    echo_response_header: bool,
}

impl CorrelationLayer {
    pub fn new(policy: CorrelationIdPolicy) -> Self {
        Self {
            policy,
            echo_response_header: false,
        }
    }

    /// Also copy the correlation ID onto the response.
    pub fn echo_response_header(mut self, echo: bool) -> Self {
        self.echo_response_header = echo;
        self
    }
}

impl<S> Layer<S> for CorrelationLayer {
    type Service = CorrelationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationService {
            inner,
            policy: self.policy.clone(),
            echo_response_header: self.echo_response_header,
        }
    }
}

/// Service produced by [`CorrelationLayer`].
#[derive(Debug, Clone)]
pub struct CorrelationService<S> {
    inner: S,
    policy: CorrelationIdPolicy,
    echo_response_header: bool,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CorrelationService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: 'static,
    ResBody: 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let id = self.policy.resolve(req.headers());
        let span = tracing::info_span!("correlation", korrelasjonsid = %id);
        let echo = if self.echo_response_header {
            HeaderValue::from_str(id.as_str()).ok()
        } else {
            None
        };

        let inner = &mut self.inner;
        let fut = span.in_scope(|| {
            tracing::debug!("Correlation id resolved");
            context::sync_scope(id.clone(), || inner.call(req))
        });
        let fut = context::scope(id, fut);

        Box::pin(
            async move {
                let mut response = fut.await?;
                if let Some(value) = echo {
                    response
                        .headers_mut()
                        .insert(KORRELASJONS_ID_HEADER.clone(), value);
                }
                Ok(response)
            }
            .instrument(span),
        )
    }
}

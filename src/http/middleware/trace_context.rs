//! Trace context activation.
//!
//! Starts (or continues, when the caller sent a valid `traceparent`) a trace
//! for every request and runs the rest of the stack with it as the active
//! trace. This is the layer that makes "tracing active for the request" true.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use rand::Rng;
use tower::{Layer, Service};
use tracing::Instrument;

use crate::config::TracingConfig;
use crate::observability::trace::{ExtraFields, TraceContext, TraceParent};

/// Tower layer activating a trace context per request.
#[derive(Debug, Clone)]
pub struct TraceContextLayer {
    sample_ratio: f64,
    extra_fields: ExtraFields,
}

impl TraceContextLayer {
    /// `sample_ratio` is clamped to `0.0..=1.0`; NaN samples everything.
    pub fn new(sample_ratio: f64, extra_fields: ExtraFields) -> Self {
        let sample_ratio = if sample_ratio.is_nan() {
            1.0
        } else {
            sample_ratio.clamp(0.0, 1.0)
        };
        Self {
            sample_ratio,
            extra_fields,
        }
    }

    pub fn from_config(config: &TracingConfig) -> Self {
        Self::new(config.sample_ratio, ExtraFields::new(&config.extra_fields))
    }
}

impl<S> Layer<S> for TraceContextLayer {
    type Service = TraceContextService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceContextService {
            inner,
            sample_ratio: self.sample_ratio,
            extra_fields: self.extra_fields.clone(),
        }
    }
}

/// Service produced by [`TraceContextLayer`].
#[derive(Debug, Clone)]
pub struct TraceContextService<S> {
    inner: S,
    sample_ratio: f64,
    extra_fields: ExtraFields,
}

impl<S> TraceContextService<S> {
    fn start_trace<B>(&self, req: &Request<B>) -> TraceContext {
        match TraceParent::from_headers(req.headers()) {
            Some(parent) => TraceContext::child_of(parent, self.extra_fields.clone()),
            None => {
                let sampled = rand::thread_rng().gen_bool(self.sample_ratio);
                TraceContext::new_root(sampled, self.extra_fields.clone())
            }
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for TraceContextService<S>
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
        let trace = Arc::new(self.start_trace(&req));
        let span = tracing::info_span!(
            "trace",
            trace_id = %trace.trace_id(),
            span_id = %trace.span_id(),
            sampled = trace.is_sampled(),
        );

        let inner = &mut self.inner;
        let fut = Arc::clone(&trace).sync_scope(|| inner.call(req));

        Box::pin(trace.scope(fut).instrument(span))
    }
}

//! Span interceptor.
//!
//! Mirrors the correlation ID into the active trace's extra fields.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::correlation::{context, CorrelationIdPolicy, KORRELASJONS_ID};
use crate::observability::trace;

/// State required by the span interceptor.
#[derive(Debug, Clone, Default)]
pub struct SpanInterceptorState {
    pub policy: CorrelationIdPolicy,
}

/// Write the request's correlation ID into the active trace's `Korrelasjonsid`
/// extra field.
///
/// Uses the context store's value when the correlation filter ran, otherwise
/// the inbound header, otherwise a generated ID. Passes the request through
/// untouched when no trace is active.
pub async fn span_interceptor(
    State(state): State<SpanInterceptorState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // 1. No active trace: nothing to write to.
    let Some(active) = trace::current() else {
        tracing::trace!("No active trace, span interceptor skipped");
        return next.run(request).await;
    };

    // 2. Prefer the filter's value, so both stores agree.
    let id = context::current()
        .or_else(|| state.policy.adopt(request.headers()))
        .unwrap_or_else(|| state.policy.generate());

    if active.set_extra_field(KORRELASJONS_ID, id.as_str()) {
        tracing::debug!(
            korrelasjonsid = %id,
            trace_id = %active.trace_id(),
            "Correlation id attached to trace"
        );
    } else {
        tracing::warn!(
            field = KORRELASJONS_ID,
            "Trace does not register the correlation field, nothing attached"
        );
    }

    next.run(request).await
}

//! Outbound propagation.
//!
//! Copies the current correlation ID and trace context onto requests made
//! while handling a request, so the next service sees the same ID.

use axum::http::{HeaderMap, HeaderValue};

use crate::correlation::{context, KORRELASJONS_ID, KORRELASJONS_ID_HEADER};
use crate::observability::trace;

/// Headers a downstream call made right now should carry.
///
/// The trace's `traceparent` and extra fields come first; the correlation
/// header is then set from the context store when it holds a value, so the
/// filter's ID wins over a trace field of the same name.
pub fn outbound_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(active) = trace::current() {
        active.inject(&mut headers);
    }

    let id = context::current()
        .map(|id| id.into_inner())
        .or_else(|| trace::extra_field(KORRELASJONS_ID));
    if let Some(id) = id {
        match HeaderValue::from_str(&id) {
            Ok(value) => {
                headers.insert(KORRELASJONS_ID_HEADER.clone(), value);
            }
            Err(_) => tracing::warn!(korrelasjonsid = %id, "Correlation id is not a valid header value"),
        }
    }

    headers
}

/// Attach correlation headers to outbound reqwest calls.
pub trait CorrelationPropagation {
    fn propagate_correlation(self) -> Self;
}

impl CorrelationPropagation for reqwest::RequestBuilder {
    fn propagate_correlation(self) -> Self {
        self.headers(outbound_headers())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::CorrelationId;
    use crate::observability::trace::{ExtraFields, TraceContext, TraceParent, TRACEPARENT};
    use std::sync::Arc;

    #[test]
    fn test_nothing_outside_a_request() {
        assert!(outbound_headers().is_empty());
    }

    #[tokio::test]
    async fn test_context_id_is_forwarded() {
        let headers = context::scope(CorrelationId::from("abc123"), async { outbound_headers() }).await;

        assert_eq!(headers.get("Korrelasjonsid").unwrap(), "abc123");
        assert!(headers.get(&TRACEPARENT).is_none());
    }

    #[tokio::test]
    async fn test_trace_field_is_forwarded_without_filter() {
        let active = Arc::new(TraceContext::new_root(true, ExtraFields::default()));
        active.set_extra_field(KORRELASJONS_ID, "from-span");
        let expected = active.traceparent();

        let headers = active.scope(async { outbound_headers() }).await;

        assert_eq!(headers.get(&KORRELASJONS_ID_HEADER).unwrap(), "from-span");
        let traceparent = headers.get(&TRACEPARENT).unwrap().to_str().unwrap();
        assert_eq!(TraceParent::parse(traceparent), Some(expected));
    }

    #[tokio::test]
    async fn test_context_wins_over_trace_field() {
        let active = Arc::new(TraceContext::new_root(true, ExtraFields::default()));
        active.set_extra_field(KORRELASJONS_ID, "from-span");

        let headers = active
            .scope(context::scope(CorrelationId::from("from-context"), async {
                outbound_headers()
            }))
            .await;

        assert_eq!(headers.get(&KORRELASJONS_ID_HEADER).unwrap(), "from-context");
    }

    #[tokio::test]
    async fn test_reqwest_builder_gets_headers() {
        let request = context::scope(CorrelationId::from("abc123"), async {
            reqwest::Client::new()
                .get("http://localhost/downstream")
                .propagate_correlation()
                .build()
                .unwrap()
        })
        .await;

        assert_eq!(request.headers().get("korrelasjonsid").unwrap(), "abc123");
    }
}

//! Layer wiring driven by configuration.

use axum::{middleware, Router};

use crate::config::AppConfig;
use crate::correlation::CorrelationIdPolicy;
use crate::http::middleware::{
    span_interceptor, CorrelationLayer, SpanInterceptorState, TraceContextLayer,
};

/// Wrap every route already on `router` with the correlation stack.
///
/// Each layer is installed only when its toggle is on. Axum applies the last
/// `.layer` outermost, so they are added innermost first.
pub fn apply<S>(router: Router<S>, config: &AppConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let policy = CorrelationIdPolicy::new().with_max_length(config.header.max_id_length);
    let mut router = router;

    if config.header.span_interceptor.enabled {
        let state = SpanInterceptorState {
            policy: policy.clone(),
        };
        router = router.layer(middleware::from_fn_with_state(state, span_interceptor));
    }

    if config.header.filter.enabled {
        router = router.layer(
            CorrelationLayer::new(policy)
                .echo_response_header(config.header.filter.echo_response_header),
        );
    }

    if config.tracing.enabled {
        router = router.layer(TraceContextLayer::from_config(&config.tracing));
    }

    tracing::info!(
        filter_enabled = config.header.filter.enabled,
        span_interceptor_enabled = config.header.span_interceptor.enabled,
        tracing_enabled = config.tracing.enabled,
        "Correlation layers configured"
    );

    router
}

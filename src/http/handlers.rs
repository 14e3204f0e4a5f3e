//! Built-in handlers.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::correlation::{context, KORRELASJONS_ID};
use crate::observability::trace;

/// What a handler observes in the two correlation stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationSnapshot {
    /// Value in the correlation context store.
    pub context: Option<String>,
    /// Value in the active trace's extra field.
    pub span: Option<String>,
}

impl CorrelationSnapshot {
    /// Read both stores for the request currently executing.
    pub fn capture() -> Self {
        Self {
            context: context::current().map(|id| id.into_inner()),
            span: trace::extra_field(KORRELASJONS_ID),
        }
    }
}

/// `GET /correlation`: report the correlation ID as seen from a handler.
pub async fn correlation_snapshot() -> Json<CorrelationSnapshot> {
    let snapshot = CorrelationSnapshot::capture();
    tracing::info!(
        context = ?snapshot.context,
        span = ?snapshot.span,
        "Correlation snapshot"
    );
    Json(snapshot)
}

/// `GET /health`.
pub async fn health() -> &'static str {
    "OK"
}

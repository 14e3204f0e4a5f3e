//! Distributed trace context and its extra-field store.
//!
//! # Responsibilities
//! - Extract trace context from incoming requests (W3C `traceparent`)
//! - Hold the active span for the request being handled
//! - Carry named extra fields alongside the span for propagation
//! - Inject trace context into outbound request headers
//!
//! # Design Decisions
//! - Extra fields must be registered up front; writes to other names are dropped
//! - Field names are case-insensitive, like the headers they travel in
//! - Extra fields are only set by application code, never copied from inbound headers

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use rand::Rng;

/// W3C trace context header.
pub static TRACEPARENT: HeaderName = HeaderName::from_static("traceparent");

const TRACEPARENT_VERSION: &str = "00";
const FLAG_SAMPLED: u8 = 0x01;

tokio::task_local! {
    static ACTIVE_TRACE: Arc<TraceContext>;
}

/// 128-bit trace identifier, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let value: u128 = rng.gen();
            if value != 0 {
                return Self(value);
            }
        }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 32 || !is_lower_hex(hex) {
            return None;
        }
        u128::from_str_radix(hex, 16).ok().filter(|v| *v != 0).map(Self)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// 64-bit span identifier, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(u64);

impl SpanId {
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let value: u64 = rng.gen();
            if value != 0 {
                return Self(value);
            }
        }
    }

    fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 16 || !is_lower_hex(hex) {
            return None;
        }
        u64::from_str_radix(hex, 16).ok().filter(|v| *v != 0).map(Self)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Parsed `traceparent` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceParent {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub sampled: bool,
}

impl TraceParent {
    /// Parse a version `00` traceparent. Anything malformed yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let version = parts.next()?;
        let trace_id = TraceId::from_hex(parts.next()?)?;
        let span_id = SpanId::from_hex(parts.next()?)?;
        let flags = parts.next()?;
        if version != TRACEPARENT_VERSION || parts.next().is_some() || flags.len() != 2 {
            return None;
        }
        let flags = u8::from_str_radix(flags, 16).ok()?;

        Some(Self {
            trace_id,
            span_id,
            sampled: flags & FLAG_SAMPLED != 0,
        })
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(&TRACEPARENT)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::parse)
    }
}

impl fmt::Display for TraceParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = if self.sampled { FLAG_SAMPLED } else { 0 };
        write!(
            f,
            "{}-{}-{}-{:02x}",
            TRACEPARENT_VERSION, self.trace_id, self.span_id, flags
        )
    }
}

/// Names of the extra fields a trace may carry.
#[derive(Debug, Clone)]
pub struct ExtraFields {
    names: Arc<[String]>,
}

impl ExtraFields {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_ascii_lowercase())
            .collect();
        names.sort();
        names.dedup();
        Self {
            names: names.into(),
        }
    }

    fn key(&self, name: &str) -> Option<String> {
        let key = name.to_ascii_lowercase();
        self.names.contains(&key).then_some(key)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for ExtraFields {
    fn default() -> Self {
        Self::new([crate::correlation::KORRELASJONS_ID])
    }
}

/// The span a request is executing in, plus its extra fields.
#[derive(Debug)]
pub struct TraceContext {
    trace_id: TraceId,
    span_id: SpanId,
    parent_span_id: Option<SpanId>,
    sampled: bool,
    registered: ExtraFields,
    extra: Mutex<BTreeMap<String, String>>,
}

impl TraceContext {
    /// Start a new trace.
    pub fn new_root(sampled: bool, registered: ExtraFields) -> Self {
        Self {
            trace_id: TraceId::random(),
            span_id: SpanId::random(),
            parent_span_id: None,
            sampled,
            registered,
            extra: Mutex::new(BTreeMap::new()),
        }
    }

    /// Continue a trace started by a remote caller.
    pub fn child_of(parent: TraceParent, registered: ExtraFields) -> Self {
        Self {
            trace_id: parent.trace_id,
            span_id: SpanId::random(),
            parent_span_id: Some(parent.span_id),
            sampled: parent.sampled,
            registered,
            extra: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    pub fn parent_span_id(&self) -> Option<SpanId> {
        self.parent_span_id
    }

    pub fn is_sampled(&self) -> bool {
        self.sampled
    }

    /// The `traceparent` a downstream call made from this span should carry.
    pub fn traceparent(&self) -> TraceParent {
        TraceParent {
            trace_id: self.trace_id,
            span_id: self.span_id,
            sampled: self.sampled,
        }
    }

    /// Set a registered extra field. Returns `false` when `name` is not registered.
    pub fn set_extra_field(&self, name: &str, value: impl Into<String>) -> bool {
        let Some(key) = self.registered.key(name) else {
            tracing::debug!(field = name, "Ignoring unregistered trace extra field");
            return false;
        };
        self.extra
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value.into());
        true
    }

    pub fn extra_field(&self, name: &str) -> Option<String> {
        let key = name.to_ascii_lowercase();
        self.extra
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Write `traceparent` and every populated extra field into `headers`.
    pub fn inject(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.traceparent().to_string()) {
            headers.insert(TRACEPARENT.clone(), value);
        }

        let extra = self.extra.lock().unwrap_or_else(PoisonError::into_inner);
        for (name, value) in extra.iter() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(field = %name, "Extra field is not a valid header, not propagated"),
            }
        }
    }

    /// Run `fut` with this context as the active trace.
    pub async fn scope<F>(self: Arc<Self>, fut: F) -> F::Output
    where
        F: Future,
    {
        ACTIVE_TRACE.scope(self, fut).await
    }

    pub fn sync_scope<F, R>(self: Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        ACTIVE_TRACE.sync_scope(self, f)
    }
}

/// The trace context of the request currently executing, if tracing is active.
pub fn current() -> Option<Arc<TraceContext>> {
    ACTIVE_TRACE.try_with(Arc::clone).ok()
}

/// Read an extra field from the active trace.
pub fn extra_field(name: &str) -> Option<String> {
    current().and_then(|trace| trace.extra_field(name))
}

/// Set an extra field on the active trace. No-op returning `false` without one.
pub fn set_extra_field(name: &str, value: impl Into<String>) -> bool {
    match current() {
        Some(trace) => trace.set_extra_field(name, value),
        None => false,
    }
}

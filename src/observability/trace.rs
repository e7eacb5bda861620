//! Distributed trace context.
//!
//! # Responsibilities
//! - Extract trace context from incoming requests
//! - Propagate trace context to upstream requests
//! - Report spans for pipeline operations
//!
//! # Design Decisions
//! - W3C Trace Context (`traceparent`) header format
//! - No global tracer: a `Tracer` handle is built at startup and carried in
//!   each hop's state
//! - Spans are reported as structured `tracing` events when they end
//! - Trace context is correlation only; it never changes a request's outcome

use std::sync::Arc;
use std::time::Instant;

use axum::http::{HeaderMap, HeaderValue};
use thiserror::Error;

/// Header carrying the W3C trace context.
pub const TRACEPARENT: &str = "traceparent";

const TRACE_ID_LEN: usize = 32;
const SPAN_ID_LEN: usize = 16;
const FLAG_SAMPLED: u8 = 0x01;

/// Errors produced when parsing a `traceparent` header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceParseError {
    #[error("traceparent must have 4 dash-separated fields")]
    FieldCount,

    #[error("unsupported traceparent version {0:?}")]
    Version(String),

    #[error("invalid trace id")]
    TraceId,

    #[error("invalid span id")]
    SpanId,

    #[error("invalid trace flags")]
    Flags,
}

/// W3C trace context for one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    /// Trace ID (32 lowercase hex chars).
    pub trace_id: String,
    /// Current span ID (16 lowercase hex chars).
    pub span_id: String,
    /// Span ID of the parent, absent for a root span.
    pub parent_id: Option<String>,
    /// Whether spans of this trace are reported.
    pub sampled: bool,
}

impl TraceContext {
    /// Create a new root trace context.
    pub fn new_root(sampled: bool) -> Self {
        Self {
            trace_id: Self::generate_trace_id(),
            span_id: Self::generate_span_id(),
            parent_id: None,
            sampled,
        }
    }

    /// Create a child span context within the same trace.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: Self::generate_span_id(),
            parent_id: Some(self.span_id.clone()),
            sampled: self.sampled,
        }
    }

    // All-zero ids are invalid in W3C trace context.
    fn generate_trace_id() -> String {
        format!("{:032x}", rand::random::<u128>().max(1))
    }

    fn generate_span_id() -> String {
        format!("{:016x}", rand::random::<u64>().max(1))
    }

    fn flags(&self) -> u8 {
        if self.sampled {
            FLAG_SAMPLED
        } else {
            0
        }
    }

    /// Convert to W3C traceparent header format.
    pub fn to_traceparent(&self) -> String {
        format!("00-{}-{}-{:02x}", self.trace_id, self.span_id, self.flags())
    }

    /// Parse from W3C traceparent header format.
    ///
    /// The parsed span ID is the remote caller's span; local work should run
    /// in a [`child`](Self::child) of the returned context.
    pub fn from_traceparent(header: &str) -> Result<Self, TraceParseError> {
        let parts: Vec<&str> = header.trim().split('-').collect();
        let [version, trace_id, span_id, flags] = parts.as_slice() else {
            return Err(TraceParseError::FieldCount);
        };

        if *version != "00" {
            return Err(TraceParseError::Version((*version).to_string()));
        }
        if !is_valid_id(trace_id, TRACE_ID_LEN) {
            return Err(TraceParseError::TraceId);
        }
        if !is_valid_id(span_id, SPAN_ID_LEN) {
            return Err(TraceParseError::SpanId);
        }
        if flags.len() != 2 {
            return Err(TraceParseError::Flags);
        }
        let flags = u8::from_str_radix(flags, 16).map_err(|_| TraceParseError::Flags)?;

        Ok(Self {
            trace_id: (*trace_id).to_string(),
            span_id: (*span_id).to_string(),
            parent_id: None,
            sampled: flags & FLAG_SAMPLED != 0,
        })
    }
}

fn is_valid_id(id: &str, len: usize) -> bool {
    id.len() == len
        && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        && id.bytes().any(|b| b != b'0')
}

/// Write the context into outbound request headers.
pub fn inject(context: &TraceContext, headers: &mut HeaderMap) {
    if let Ok(value) = HeaderValue::from_str(&context.to_traceparent()) {
        headers.insert(TRACEPARENT, value);
    }
}

/// Request-scoped tracing handle for one service.
#[derive(Debug, Clone)]
pub struct Tracer {
    service: Arc<str>,
    sample: bool,
}

impl Tracer {
    /// Create a tracer reporting spans under `service`.
    ///
    /// `sample` decides whether new root traces are reported; inbound
    /// contexts keep the caller's decision.
    pub fn new(service: impl Into<Arc<str>>, sample: bool) -> Self {
        Self {
            service: service.into(),
            sample,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Read the caller's trace context from inbound headers.
    ///
    /// A missing or malformed header yields `None` so the request starts a
    /// new trace.
    pub fn extract(&self, headers: &HeaderMap) -> Option<TraceContext> {
        let raw = headers.get(TRACEPARENT)?.to_str().ok()?;
        match TraceContext::from_traceparent(raw) {
            Ok(context) => Some(context),
            Err(e) => {
                tracing::debug!(error = %e, service = %self.service, "Ignoring malformed traceparent");
                None
            }
        }
    }

    /// Start a span, as a child of `parent` when given.
    pub fn start_span(&self, operation: &'static str, parent: Option<&TraceContext>) -> SpanScope {
        let context = match parent {
            Some(parent) => parent.child(),
            None => TraceContext::new_root(self.sample),
        };
        SpanScope::new(self.service.clone(), operation, context)
    }
}

/// Final status of a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanStatus {
    Unset,
    Ok,
    Error(String),
}

/// A live span; reported when dropped.
#[derive(Debug)]
pub struct SpanScope {
    service: Arc<str>,
    operation: &'static str,
    context: TraceContext,
    started: Instant,
    status: SpanStatus,
    span: tracing::Span,
}

impl SpanScope {
    fn new(service: Arc<str>, operation: &'static str, context: TraceContext) -> Self {
        let span = tracing::info_span!(
            "span",
            service = %service,
            operation = operation,
            trace_id = %context.trace_id,
            span_id = %context.span_id,
        );
        Self {
            service,
            operation,
            context,
            started: Instant::now(),
            status: SpanStatus::Unset,
            span,
        }
    }

    pub fn context(&self) -> &TraceContext {
        &self.context
    }

    /// Start a nested span in the same trace.
    pub fn child(&self, operation: &'static str) -> SpanScope {
        SpanScope::new(self.service.clone(), operation, self.context.child())
    }

    /// The `tracing` span to instrument work done under this span.
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub fn status(&self) -> &SpanStatus {
        &self.status
    }

    pub fn set_ok(&mut self) {
        self.status = SpanStatus::Ok;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = SpanStatus::Error(message.into());
    }
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        if !self.context.sampled {
            return;
        }
        let _entered = self.span.enter();
        let duration_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let parent_id = self.context.parent_id.as_deref().unwrap_or("");
        let (status, error) = match &self.status {
            SpanStatus::Unset => ("unset", ""),
            SpanStatus::Ok => ("ok", ""),
            SpanStatus::Error(message) => ("error", message.as_str()),
        };
        tracing::info!(
            service = %self.service,
            operation = self.operation,
            parent_id,
            duration_ms,
            status,
            error,
            "Span ended"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[test]
    fn test_parse_traceparent() {
        let ctx = TraceContext::from_traceparent(SAMPLE).unwrap();
        assert_eq!(ctx.trace_id, "4bf92f3577b34da6a3ce929d0e0e4736");
        assert_eq!(ctx.span_id, "00f067aa0ba902b7");
        assert!(ctx.sampled);
        assert_eq!(ctx.to_traceparent(), SAMPLE);
    }

    #[test]
    fn test_parse_unsampled_flags() {
        let ctx = TraceContext::from_traceparent(
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-00",
        )
        .unwrap();
        assert!(!ctx.sampled);
    }

    #[test]
    fn test_rejects_malformed_traceparent() {
        assert_eq!(
            TraceContext::from_traceparent("garbage"),
            Err(TraceParseError::FieldCount)
        );
        assert!(matches!(
            TraceContext::from_traceparent(
                "ff-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"
            ),
            Err(TraceParseError::Version(_))
        ));
        assert_eq!(
            TraceContext::from_traceparent(
                "00-00000000000000000000000000000000-00f067aa0ba902b7-01"
            ),
            Err(TraceParseError::TraceId)
        );
        assert_eq!(
            TraceContext::from_traceparent(
                "00-4BF92F3577B34DA6A3CE929D0E0E4736-00f067aa0ba902b7-01"
            ),
            Err(TraceParseError::TraceId)
        );
        assert_eq!(
            TraceContext::from_traceparent("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa-01"),
            Err(TraceParseError::SpanId)
        );
        assert_eq!(
            TraceContext::from_traceparent(
                "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-zz"
            ),
            Err(TraceParseError::Flags)
        );
    }

    #[test]
    fn test_child_keeps_trace_id() {
        let root = TraceContext::new_root(true);
        let child = root.child();
        assert_eq!(child.trace_id, root.trace_id);
        assert_ne!(child.span_id, root.span_id);
        assert_eq!(child.parent_id.as_deref(), Some(root.span_id.as_str()));
        assert_eq!(root.trace_id.len(), 32);
        assert_eq!(root.span_id.len(), 16);
    }

    #[test]
    fn test_generated_context_round_trips() {
        let root = TraceContext::new_root(false);
        let parsed = TraceContext::from_traceparent(&root.to_traceparent()).unwrap();
        assert_eq!(parsed.trace_id, root.trace_id);
        assert_eq!(parsed.span_id, root.span_id);
        assert!(!parsed.sampled);
    }

    #[test]
    fn test_extract_and_inject() {
        let tracer = Tracer::new("test", true);

        let mut headers = HeaderMap::new();
        assert!(tracer.extract(&headers).is_none());

        headers.insert(TRACEPARENT, HeaderValue::from_static("not-a-trace"));
        assert!(tracer.extract(&headers).is_none());

        headers.insert(TRACEPARENT, HeaderValue::from_static(SAMPLE));
        let remote = tracer.extract(&headers).unwrap();

        let span = tracer.start_span("work", Some(&remote));
        assert_eq!(span.context().trace_id, remote.trace_id);
        assert_eq!(span.context().parent_id.as_deref(), Some("00f067aa0ba902b7"));

        let mut outbound = HeaderMap::new();
        inject(span.context(), &mut outbound);
        let sent = outbound.get(TRACEPARENT).unwrap().to_str().unwrap();
        assert!(sent.starts_with("00-4bf92f3577b34da6a3ce929d0e0e4736-"));
        assert!(sent.ends_with("-01"));
    }

    #[test]
    fn test_root_span_uses_tracer_sampling() {
        let tracer = Tracer::new("test", false);
        let mut span = tracer.start_span("root", None);
        assert!(!span.context().sampled);
        assert!(span.context().parent_id.is_none());
        span.set_error("boom");
        assert_eq!(span.status(), &SpanStatus::Error("boom".into()));
        let nested = span.child("nested");
        assert_eq!(nested.context().trace_id, span.context().trace_id);
    }
}

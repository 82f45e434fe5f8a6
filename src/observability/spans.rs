//! Structured span definitions for tracing.

use std::time::Instant;

use tracing::{Level, Span, field, span};

use crate::types::{AnalysisTier, ProviderRole, TokenUsage};

/// Span around one provider completion.
pub struct ProviderCallSpan {
    span: Span,
    start: Instant,
}

impl ProviderCallSpan {
    pub fn new(provider: &str, role: ProviderRole, tier: AnalysisTier) -> Self {
        let span = span!(
            Level::INFO,
            "provider.complete",
            provider = provider,
            role = %role,
            tier = %tier,
            input_tokens = field::Empty,
            output_tokens = field::Empty,
            error_kind = field::Empty,
            latency_ms = field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
        }
    }

    pub fn record_usage(&self, usage: &TokenUsage) {
        self.span.record("input_tokens", usage.input_tokens);
        self.span.record("output_tokens", usage.output_tokens);
    }

    pub fn record_error(&self, kind: &str) {
        self.span.record("error_kind", kind);
    }

    pub fn finish(self) {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.span.record("latency_ms", latency_ms);
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// Span around one payment-processor request.
pub fn ledger_call_span(ledger: &str, operation: &str) -> Span {
    span!(
        Level::INFO,
        "ledger.call",
        ledger = ledger,
        operation = operation,
        status = field::Empty,
    )
}

/// Span around one tool invocation from the host.
pub fn tool_span(tool_name: &str, request_id: &str) -> Span {
    span!(
        Level::INFO,
        "tool.execute",
        tool_name = tool_name,
        request_id = request_id,
        is_error = field::Empty,
    )
}

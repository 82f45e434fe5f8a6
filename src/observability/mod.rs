//! Structured tracing for provider calls, ledger calls and tool invocations.
//!
//! Document content is never recorded; spans carry tier, provider, kind and
//! intent identifiers only.

mod spans;

pub use spans::{ProviderCallSpan, ledger_call_span, tool_span};

use tracing_subscriber::EnvFilter;

pub const SERVICE_NAME_DEFAULT: &str = "medical-agent";

/// Tracing configuration for the binary.
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub service_name: String,
    /// Filter directive used when `RUST_LOG` is unset.
    pub default_directive: String,
    pub ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: SERVICE_NAME_DEFAULT.to_string(),
            default_directive: "info".to_string(),
            ansi: false,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive.as_str()))
    }
}

/// Install a global fmt subscriber writing to stderr, keeping stdout free for
/// tool traffic. Returns `false` if a subscriber was already installed.
pub fn init_tracing(config: &TracingConfig) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(false)
        .try_init()
        .is_ok()
}

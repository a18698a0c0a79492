//! Reporting sink for injector activations.
//!
//! Every injector reports a start event when it acts on a request. The sink
//! is write-only and fire-and-forget: it has no way to fail the request, and
//! an absent reporter is silent pass-through. Reporters are wired during
//! setup, before traffic begins.

use std::fmt;
use std::sync::Arc;

use axum::extract::Request;

/// Notification sink called at the start of each injector activation.
pub trait Reporter: Send + Sync + fmt::Debug {
    /// Record that an injector acted on the given request.
    fn report(&self, request: &Request, message: &str);
}

/// A reporter shared across injectors and in-flight requests.
pub type SharedReporter = Arc<dyn Reporter>;

/// Reporter that emits activations through `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    /// Create a new tracing reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reporter for TracingReporter {
    fn report(&self, request: &Request, message: &str) {
        tracing::info!(
            method = %request.method(),
            uri = %request.uri(),
            "{message}"
        );
    }
}

/// Report through an optional sink, staying silent when none is set.
pub(crate) fn report_with_message(
    reporter: Option<&SharedReporter>,
    request: &Request,
    message: &str,
) {
    if let Some(reporter) = reporter {
        reporter.report(request, message);
    }
}

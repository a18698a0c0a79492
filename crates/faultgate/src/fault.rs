//! The gate: per-request enable and probability check.
//!
//! A [`Fault`] combines one top-level injector with an enabled flag and an
//! activation probability, validated once at construction. [`FaultLayer`]
//! installs the gate as `tower` middleware; the resulting [`FaultService`]
//! draws one uniform sample per request and routes the request either into
//! the injector tree or straight to the downstream handler.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{extract::Request, response::Response};
use rand::Rng;
use tower::util::BoxCloneService;
use tower::{Layer, Service, ServiceExt};

use crate::error::{Aborted, FaultError};
use crate::injector::{BoxHandler, Injector};

/// Pluggable uniform `[0, 1)` sample source.
pub(crate) type SampleFn = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Configuration for a [`Fault`] gate.
#[derive(Debug, Clone, Default)]
pub struct FaultConfig {
    /// Whether the gate evaluates at all. Disabled gates always delegate to
    /// the downstream handler.
    pub enabled: bool,

    /// The fraction of requests diverted into the injector,
    /// `0.0 <= percent <= 1.0`.
    pub percent_of_requests: f64,

    /// The top-level injector, shared across in-flight requests.
    pub injector: Option<Arc<dyn Injector>>,
}

/// A validated, immutable fault gate.
///
/// Constructed once at startup; used concurrently by many in-flight
/// requests thereafter.
pub struct Fault {
    injector: Arc<dyn Injector>,
    enabled: bool,
    percent_of_requests: f64,
    sample: SampleFn,
}

impl Fault {
    /// Validate the configuration and build a gate.
    ///
    /// Fails with [`FaultError::MissingInjector`] when no injector is
    /// configured, and with [`FaultError::InvalidProbability`] when the
    /// percentage is outside `[0.0, 1.0]`.
    pub fn new(config: FaultConfig) -> Result<Self, FaultError> {
        let injector = config.injector.ok_or(FaultError::MissingInjector)?;

        if !(0.0..=1.0).contains(&config.percent_of_requests) {
            return Err(FaultError::InvalidProbability(config.percent_of_requests));
        }

        Ok(Self {
            injector,
            enabled: config.enabled,
            percent_of_requests: config.percent_of_requests,
            sample: Arc::new(|| rand::rng().random::<f64>()),
        })
    }

    /// Replace the sample source, for deterministic tests. The source must
    /// produce values in `[0, 1)` and be safe for concurrent calls.
    #[must_use]
    pub fn with_sampler(mut self, sample: Arc<dyn Fn() -> f64 + Send + Sync>) -> Self {
        self.sample = sample;
        self
    }

    /// Whether the gate evaluates at all.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// The configured activation probability.
    #[must_use]
    pub const fn percent_of_requests(&self) -> f64 {
        self.percent_of_requests
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("enabled", &self.enabled)
            .field("percent_of_requests", &self.percent_of_requests)
            .field("injector", &self.injector)
            .finish_non_exhaustive()
    }
}

/// Layer that installs a fault gate around a downstream service.
///
/// Absence is an explicit variant: [`FaultLayer::passthrough`] builds a
/// layer with no gate at all, which delegates every request untouched.
#[derive(Debug, Clone)]
pub struct FaultLayer {
    fault: Option<Arc<Fault>>,
}

impl FaultLayer {
    /// Install the given gate.
    #[must_use]
    pub fn new(fault: Fault) -> Self {
        Self {
            fault: Some(Arc::new(fault)),
        }
    }

    /// A layer with no gate: every request delegates straight downstream.
    #[must_use]
    pub const fn passthrough() -> Self {
        Self { fault: None }
    }
}

impl<S> Layer<S> for FaultLayer
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Service = FaultService;

    fn layer(&self, inner: S) -> Self::Service {
        let direct: BoxHandler = BoxCloneService::new(inner.map_err(|err: Infallible| match err {}));

        // The injected path is built once here; per-request work is only the
        // sample and the dispatch.
        let gate = self.fault.as_ref().map(|fault| GateState {
            injected: fault.injector.wrap(direct.clone()),
            enabled: fault.enabled,
            percent_of_requests: fault.percent_of_requests,
            sample: Arc::clone(&fault.sample),
        });

        FaultService { direct, gate }
    }
}

/// Middleware service that evaluates the gate per request.
#[derive(Debug, Clone)]
pub struct FaultService {
    direct: BoxHandler,
    gate: Option<GateState>,
}

#[derive(Clone)]
struct GateState {
    injected: BoxHandler,
    enabled: bool,
    percent_of_requests: f64,
    sample: SampleFn,
}

impl GateState {
    /// Draw one sample and decide. `percent == 0.0` never activates since
    /// the sample is never negative; `percent == 1.0` always activates
    /// since the sample stays below one.
    fn activates(&self) -> bool {
        self.enabled && (self.sample)() < self.percent_of_requests
    }
}

impl fmt::Debug for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateState")
            .field("enabled", &self.enabled)
            .field("percent_of_requests", &self.percent_of_requests)
            .finish_non_exhaustive()
    }
}

impl Service<Request> for FaultService {
    type Response = Response;
    type Error = Aborted;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Aborted>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Aborted>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let handler = match &self.gate {
            Some(gate) if gate.activates() => gate.injected.clone(),
            _ => self.direct.clone(),
        };

        Box::pin(async move { handler.oneshot(request).await })
    }
}

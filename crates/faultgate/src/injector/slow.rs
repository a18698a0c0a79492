//! Added latency.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{extract::Request, response::Response};
use tower::util::BoxCloneService;
use tower::{Service, ServiceExt};

use crate::context::{InjectorKind, tag_request};
use crate::error::Aborted;
use crate::injector::{BoxHandler, Injector};
use crate::reporter::{SharedReporter, report_with_message};

/// Pluggable delay function. The default is `tokio::time::sleep`, a
/// cooperative yield that does not block other in-flight requests.
pub type SleepFn = Arc<dyn Fn(Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Injector that delays the request, then always delegates downstream.
///
/// A zero duration is a no-op sleep. Requests that pass through are tagged
/// with [`InjectorKind::Slow`] so downstream observers know a delay occurred.
pub struct SlowInjector {
    duration: Duration,
    sleep: SleepFn,
    reporter: Option<SharedReporter>,
}

impl SlowInjector {
    /// Create a slow injector that adds the configured latency.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            sleep: Arc::new(|duration| Box::pin(tokio::time::sleep(duration))),
            reporter: None,
        }
    }

    /// Replace the delay function, for deterministic tests.
    #[must_use]
    pub fn with_sleep_fn(mut self, sleep: SleepFn) -> Self {
        self.sleep = sleep;
        self
    }

    /// The configured delay.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Debug for SlowInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlowInjector")
            .field("duration", &self.duration)
            .field("reporter", &self.reporter)
            .finish_non_exhaustive()
    }
}

impl Injector for SlowInjector {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxCloneService::new(SlowService {
            duration: self.duration,
            sleep: Arc::clone(&self.sleep),
            reporter: self.reporter.clone(),
            next,
        })
    }

    fn set_reporter(&mut self, reporter: SharedReporter) {
        self.reporter = Some(reporter);
    }
}

#[derive(Clone)]
struct SlowService {
    duration: Duration,
    sleep: SleepFn,
    reporter: Option<SharedReporter>,
    next: BoxHandler,
}

impl fmt::Debug for SlowService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlowService")
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl Service<Request> for SlowService {
    type Response = Response;
    type Error = Aborted;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Aborted>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Aborted>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let duration = self.duration;
        let sleep = Arc::clone(&self.sleep);
        let reporter = self.reporter.clone();
        let next = self.next.clone();

        Box::pin(async move {
            report_with_message(reporter.as_ref(), &request, "slow injector: starting");
            sleep(duration).await;

            tag_request(&mut request, InjectorKind::Slow);
            next.oneshot(request).await
        })
    }
}

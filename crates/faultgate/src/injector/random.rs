//! Per-request random selection between injectors.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{extract::Request, response::Response};
use rand::Rng;
use tower::util::BoxCloneService;
use tower::{Service, ServiceExt};

use crate::context::{InjectorKind, tag_request};
use crate::error::Aborted;
use crate::injector::{BoxHandler, Injector};
use crate::reporter::{SharedReporter, report_with_message};

/// Pluggable uniform index source: given `n`, return an index in `[0, n)`.
pub(crate) type RandFn = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// Injector that delegates each request to exactly one randomly chosen
/// sub-injector.
///
/// Selection is independent and memoryless across requests; there is no
/// exhaustive-before-repeat guarantee. An empty list degenerates to
/// pass-through. The default index source draws from the thread-local
/// generator per call, so concurrent requests sample safely.
pub struct RandomInjector {
    injectors: Vec<Box<dyn Injector>>,
    rand_f: RandFn,
    reporter: Option<SharedReporter>,
}

impl RandomInjector {
    /// Combine the given injectors into a single random injector.
    #[must_use]
    pub fn new(injectors: Vec<Box<dyn Injector>>) -> Self {
        Self {
            injectors,
            rand_f: Arc::new(|n| rand::rng().random_range(0..n)),
            reporter: None,
        }
    }

    /// Replace the index source, for deterministic tests.
    #[must_use]
    pub fn with_rand_fn(mut self, rand_f: Arc<dyn Fn(usize) -> usize + Send + Sync>) -> Self {
        self.rand_f = rand_f;
        self
    }

    /// The number of sub-injectors to select between.
    #[must_use]
    pub fn len(&self) -> usize {
        self.injectors.len()
    }

    /// Whether the injector has no sub-injectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.injectors.is_empty()
    }
}

impl fmt::Debug for RandomInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomInjector")
            .field("injectors", &self.injectors)
            .field("reporter", &self.reporter)
            .finish_non_exhaustive()
    }
}

impl Injector for RandomInjector {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        if self.injectors.is_empty() {
            return next;
        }

        let wrapped = self
            .injectors
            .iter()
            .map(|injector| injector.wrap(next.clone()))
            .collect();

        BoxCloneService::new(RandomService {
            wrapped,
            rand_f: Arc::clone(&self.rand_f),
            reporter: self.reporter.clone(),
        })
    }

    fn set_reporter(&mut self, reporter: SharedReporter) {
        self.reporter = Some(reporter);
    }
}

#[derive(Clone)]
struct RandomService {
    wrapped: Vec<BoxHandler>,
    rand_f: RandFn,
    reporter: Option<SharedReporter>,
}

impl fmt::Debug for RandomService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomService")
            .field("wrapped", &self.wrapped.len())
            .finish_non_exhaustive()
    }
}

impl Service<Request> for RandomService {
    type Response = Response;
    type Error = Aborted;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Aborted>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Aborted>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let index = (self.rand_f)(self.wrapped.len());
        let selected = self.wrapped[index].clone();
        let reporter = self.reporter.clone();

        Box::pin(async move {
            report_with_message(reporter.as_ref(), &request, "random injector: starting");
            tag_request(&mut request, InjectorKind::Random);

            selected.oneshot(request).await
        })
    }
}

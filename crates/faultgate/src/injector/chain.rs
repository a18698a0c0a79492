//! Sequential composition of injectors.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{extract::Request, response::Response};
use tower::util::BoxCloneService;
use tower::{Service, ServiceExt};

use crate::context::{InjectorKind, tag_request};
use crate::error::Aborted;
use crate::injector::{BoxHandler, Injector};
use crate::reporter::{SharedReporter, report_with_message};

/// Injector that runs its sub-injectors in the order they were supplied.
///
/// An empty chain degenerates to pass-through. A sub-injector that
/// terminates the exchange early (reject, error) prevents the later
/// sub-injectors and the downstream handler from executing.
#[derive(Debug, Default)]
pub struct ChainInjector {
    injectors: Vec<Box<dyn Injector>>,
    reporter: Option<SharedReporter>,
}

impl ChainInjector {
    /// Combine the given injectors into a single sequential injector.
    #[must_use]
    pub fn new(injectors: Vec<Box<dyn Injector>>) -> Self {
        Self {
            injectors,
            reporter: None,
        }
    }

    /// The number of sub-injectors in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.injectors.len()
    }

    /// Whether the chain has no sub-injectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.injectors.is_empty()
    }
}

impl Injector for ChainInjector {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        // Fold in reverse so the wrap applied last sits outermost and the
        // execution order matches the order the injectors were supplied.
        let mut chain = next;
        for injector in self.injectors.iter().rev() {
            chain = injector.wrap(chain);
        }

        BoxCloneService::new(ChainService {
            chain,
            reporter: self.reporter.clone(),
        })
    }

    fn set_reporter(&mut self, reporter: SharedReporter) {
        self.reporter = Some(reporter);
    }
}

#[derive(Debug, Clone)]
struct ChainService {
    chain: BoxHandler,
    reporter: Option<SharedReporter>,
}

impl Service<Request> for ChainService {
    type Response = Response;
    type Error = Aborted;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Aborted>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Aborted>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let reporter = self.reporter.clone();
        let chain = self.chain.clone();

        Box::pin(async move {
            report_with_message(reporter.as_ref(), &request, "chain injector: starting");
            tag_request(&mut request, InjectorKind::Chain);

            chain.oneshot(request).await
        })
    }
}

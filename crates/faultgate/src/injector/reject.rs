//! Connection-level rejection.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{extract::Request, response::Response};
use tower::Service;
use tower::util::BoxCloneService;

use crate::error::Aborted;
use crate::injector::{BoxHandler, Injector};
use crate::reporter::{SharedReporter, report_with_message};

/// Injector that aborts the exchange without writing a response.
///
/// Simulates a connection-level failure rather than an application error:
/// the downstream handler is never invoked and no response bytes are
/// produced. The host observes the [`Aborted`] outcome and closes the
/// connection.
#[derive(Debug, Default)]
pub struct RejectInjector {
    reporter: Option<SharedReporter>,
}

impl RejectInjector {
    /// Create a new reject injector. Construction always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Injector for RejectInjector {
    fn wrap(&self, _next: BoxHandler) -> BoxHandler {
        BoxCloneService::new(RejectService {
            reporter: self.reporter.clone(),
        })
    }

    fn set_reporter(&mut self, reporter: SharedReporter) {
        self.reporter = Some(reporter);
    }
}

#[derive(Debug, Clone)]
struct RejectService {
    reporter: Option<SharedReporter>,
}

impl Service<Request> for RejectService {
    type Response = Response;
    type Error = Aborted;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Aborted>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Aborted>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        report_with_message(self.reporter.as_ref(), &request, "reject injector: starting");

        Box::pin(std::future::ready(Err(Aborted)))
    }
}

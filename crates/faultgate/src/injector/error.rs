//! Canned HTTP error responses.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower::Service;
use tower::util::BoxCloneService;

use crate::error::{Aborted, FaultError};
use crate::injector::{BoxHandler, Injector};
use crate::reporter::{SharedReporter, report_with_message};

/// Injector that responds with a configured status code and its canonical
/// reason phrase, never invoking the downstream handler.
#[derive(Debug)]
pub struct ErrorInjector {
    status: StatusCode,
    reason: &'static str,
    reporter: Option<SharedReporter>,
}

impl ErrorInjector {
    /// Create an error injector for the given status code.
    ///
    /// Fails with [`FaultError::InvalidStatusCode`] when the code does not
    /// map to a status with a canonical reason phrase.
    pub fn new(status_code: u16) -> Result<Self, FaultError> {
        let status = StatusCode::from_u16(status_code)
            .map_err(|_| FaultError::InvalidStatusCode(status_code))?;
        let reason = status
            .canonical_reason()
            .ok_or(FaultError::InvalidStatusCode(status_code))?;

        Ok(Self {
            status,
            reason,
            reporter: None,
        })
    }

    /// The status code this injector responds with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl Injector for ErrorInjector {
    fn wrap(&self, _next: BoxHandler) -> BoxHandler {
        BoxCloneService::new(ErrorService {
            status: self.status,
            reason: self.reason,
            reporter: self.reporter.clone(),
        })
    }

    fn set_reporter(&mut self, reporter: SharedReporter) {
        self.reporter = Some(reporter);
    }
}

#[derive(Debug, Clone)]
struct ErrorService {
    status: StatusCode,
    reason: &'static str,
    reporter: Option<SharedReporter>,
}

impl Service<Request> for ErrorService {
    type Response = Response;
    type Error = Aborted;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Aborted>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Aborted>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        report_with_message(self.reporter.as_ref(), &request, "error injector: starting");

        let response = (self.status, self.reason).into_response();
        Box::pin(std::future::ready(Ok(response)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tower::ServiceExt;

    use super::*;
    use crate::testing::{RecordingReporter, body_string, counting_router, handler_from, request};

    #[test]
    fn valid_status_code_constructs() {
        let injector = ErrorInjector::new(503).expect("503 should be valid");
        assert_eq!(injector.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn unknown_status_code_fails_construction() {
        let err = ErrorInjector::new(999).expect_err("999 has no reason phrase");
        assert_eq!(err, FaultError::InvalidStatusCode(999));
    }

    #[test]
    fn out_of_range_status_code_fails_construction() {
        let err = ErrorInjector::new(42).expect_err("42 is not an http status");
        assert_eq!(err, FaultError::InvalidStatusCode(42));
    }

    #[tokio::test]
    async fn responds_with_canonical_reason_and_skips_downstream() {
        let counter = Arc::new(AtomicUsize::new(0));
        let next = handler_from(counting_router(Arc::clone(&counter)));

        let injector = ErrorInjector::new(503).expect("503 should be valid");
        let handler = injector.wrap(next);

        let response = handler
            .oneshot(request())
            .await
            .expect("error injector writes a response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_string(response).await, "Service Unavailable");
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reports_start() {
        let reporter = RecordingReporter::new();
        let mut injector = ErrorInjector::new(500).expect("500 should be valid");
        injector.set_reporter(Arc::new(reporter.clone()));

        let counter = Arc::new(AtomicUsize::new(0));
        let handler = injector.wrap(handler_from(counting_router(counter)));
        let _ = handler.oneshot(request()).await;

        assert_eq!(reporter.messages(), vec!["error injector: starting"]);
    }
}

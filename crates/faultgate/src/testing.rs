//! Test support: recording sinks, probe injectors, and handler scaffolding.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use axum::{Router, body::Body, extract::Request, response::Response, routing::get};
use tower::util::BoxCloneService;
use tower::{Service, ServiceExt};

use crate::error::Aborted;
use crate::injector::{BoxHandler, Injector};
use crate::reporter::{Reporter, SharedReporter, report_with_message};

/// Reporter that records every message it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("reporter lock").clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, _request: &Request, message: &str) {
        self.messages
            .lock()
            .expect("reporter lock")
            .push(message.to_string());
    }
}

/// Injector that logs a label when it runs, then forwards downstream.
#[derive(Debug)]
pub struct ProbeInjector {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    reporter: Option<SharedReporter>,
}

impl ProbeInjector {
    pub fn new(label: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            label,
            log,
            reporter: None,
        }
    }
}

impl Injector for ProbeInjector {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        BoxCloneService::new(ProbeService {
            label: self.label,
            log: Arc::clone(&self.log),
            reporter: self.reporter.clone(),
            next,
        })
    }

    fn set_reporter(&mut self, reporter: SharedReporter) {
        self.reporter = Some(reporter);
    }
}

#[derive(Debug, Clone)]
struct ProbeService {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
    reporter: Option<SharedReporter>,
    next: BoxHandler,
}

impl Service<Request> for ProbeService {
    type Response = Response;
    type Error = Aborted;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Aborted>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Aborted>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let label = self.label;
        let log = Arc::clone(&self.log);
        let reporter = self.reporter.clone();
        let next = self.next.clone();

        Box::pin(async move {
            report_with_message(reporter.as_ref(), &request, "probe injector: starting");
            log.lock().expect("probe lock").push(label.to_string());
            next.oneshot(request).await
        })
    }
}

/// Shared execution log for probes and downstream handlers.
pub fn execution_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn log_entries(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().expect("log lock").clone()
}

/// Router whose single handler counts invocations and answers "downstream".
pub fn counting_router(counter: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        "/",
        get(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "downstream"
            }
        }),
    )
}

/// Router whose handler appends "downstream" to the shared execution log.
pub fn logging_router(log: Arc<Mutex<Vec<String>>>) -> Router {
    Router::new().route(
        "/",
        get(move || {
            let log = Arc::clone(&log);
            async move {
                log.lock().expect("log lock").push("downstream".to_string());
                "downstream"
            }
        }),
    )
}

/// Adapt a router into the boxed handler form injectors compose over.
pub fn handler_from(router: Router) -> BoxHandler {
    BoxCloneService::new(<Router as ServiceExt<Request>>::map_err::<_, Aborted>(
        router,
        |err: Infallible| match err {},
    ))
}

pub fn request() -> Request {
    Request::builder()
        .uri("/")
        .body(Body::empty())
        .expect("request should build")
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

//! Composable fault-injection middleware for tower/axum request pipelines.
//!
//! faultgate probabilistically injects synthetic failures into a server's
//! request handling for resilience testing: rejected connections, canned
//! HTTP error responses, and added latency. Independent fault behaviors
//! implement one [`Injector`] contract, compose sequentially
//! ([`ChainInjector`]) or by per-request random choice ([`RandomInjector`]),
//! and sit behind a [`Fault`] gate that activates the injected path for a
//! configured fraction of requests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use axum::{Router, routing::get};
//! use faultgate::{
//!     ChainInjector, ErrorInjector, Fault, FaultConfig, FaultLayer, SlowInjector,
//! };
//!
//! // 5% of requests wait half a second and then get a 503.
//! let chain = ChainInjector::new(vec![
//!     Box::new(SlowInjector::new(Duration::from_millis(500))),
//!     Box::new(ErrorInjector::new(503)?),
//! ]);
//!
//! let fault = Fault::new(FaultConfig {
//!     enabled: true,
//!     percent_of_requests: 0.05,
//!     injector: Some(Arc::new(chain)),
//! })?;
//!
//! let router = Router::new().route("/", get(|| async { "ok" }));
//! let service = FaultLayer::new(fault).layer(router);
//! // Serve `service` with a hyper-based host; an `Err(Aborted)` outcome
//! // means "close the connection without writing a response".
//! ```
//!
//! Rejected exchanges resolve to the [`Aborted`] service error rather than a
//! response, so hosts can tell a simulated connection failure apart from any
//! application-level error. All configuration errors surface at
//! construction; at request time the gate and injectors never fail.

pub mod context;
pub mod error;
pub mod fault;
pub mod injector;
pub mod reporter;
pub mod settings;
#[cfg(test)]
pub mod testing;

pub use context::{InjectedFaults, InjectorKind};
pub use error::{Aborted, FaultError};
pub use fault::{Fault, FaultConfig, FaultLayer, FaultService};
pub use injector::{
    BoxHandler, ChainInjector, ErrorInjector, Injector, RandomInjector, RejectInjector, SleepFn,
    SlowInjector,
};
pub use reporter::{Reporter, SharedReporter, TracingReporter};
pub use settings::{FaultSettings, InjectorSettings};

//! Fault injectors and their composition.
//!
//! An [`Injector`] wraps a downstream handler with one unit of fault
//! behavior. Terminal injectors ([`RejectInjector`], [`ErrorInjector`],
//! [`SlowInjector`]) implement a single concrete fault; composite injectors
//! ([`ChainInjector`], [`RandomInjector`]) combine other injectors behind the
//! same contract, so trees of faults nest uniformly.
//!
//! Injectors are wrapped into a [`Fault`](crate::fault::Fault) gate, which
//! decides per request whether the injected path runs at all.

use std::fmt;

use axum::{extract::Request, response::Response};
use tower::util::BoxCloneService;

use crate::error::Aborted;
use crate::reporter::SharedReporter;

mod chain;
mod error;
mod random;
mod reject;
mod slow;

pub use chain::ChainInjector;
pub use error::ErrorInjector;
pub use random::RandomInjector;
pub use reject::RejectInjector;
pub use slow::{SleepFn, SlowInjector};

/// A boxed, cloneable request handler.
///
/// Handlers resolve to a response or to [`Aborted`] when a reject injector
/// terminated the exchange. The downstream handler supplied by the host never
/// aborts on its own; the error variant is introduced by this crate.
pub type BoxHandler = BoxCloneService<Request, Response, Aborted>;

/// A unit of fault-injection behavior that wraps a downstream handler.
///
/// Implementations hold no per-request state: `wrap` is called once during
/// setup and the returned handler is invoked concurrently by many in-flight
/// requests. `set_reporter` is a setup-time-only operation; calling it while
/// requests are in flight is outside the synchronization contract.
pub trait Injector: Send + Sync + fmt::Debug {
    /// Wrap the downstream handler with this injector's behavior.
    fn wrap(&self, next: BoxHandler) -> BoxHandler;

    /// Attach the reporting sink notified when this injector activates.
    fn set_reporter(&mut self, reporter: SharedReporter);
}

//! Error types for fault configuration and injected outcomes.
//!
//! Configuration errors surface synchronously at construction time and must
//! prevent the system from serving traffic. At request time the only
//! non-response outcome is [`Aborted`], which is an intentional simulated
//! fault rather than a bug.

use thiserror::Error;

/// Errors returned when building faults and injectors from configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum FaultError {
    /// A required injector reference was absent at gate construction.
    #[error("injector cannot be absent")]
    MissingInjector,

    /// The activation probability was outside of the allowed bounds.
    #[error("percent of requests must be 0.0 <= percent <= 1.0, got {0}")]
    InvalidProbability(f64),

    /// The configured status code has no canonical reason phrase.
    #[error("{0} is not a valid http status code")]
    InvalidStatusCode(u16),
}

/// Termination outcome for a rejected exchange.
///
/// A reject injector resolves the request with this error instead of a
/// response, simulating a connection-level failure. Hosts built on hyper
/// handle a service error by closing the connection without writing any
/// response bytes, which keeps the abort distinguishable from an
/// application-level error response.
#[derive(Debug, Error, Clone, Copy, Default, PartialEq, Eq)]
#[error("exchange aborted by fault injection; no response written")]
pub struct Aborted;

//! Request tagging for downstream diagnostics.
//!
//! Injectors that pass a request on attach an [`InjectedFaults`] value to the
//! request extensions so downstream handlers and observers can tell which
//! injectors acted on the exchange. Extensions are the request-scoped
//! equivalent of a context value: opaque to routing, visible to handlers.

use std::fmt;

use axum::extract::Request;

/// The kind of injector that acted on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectorKind {
    /// Connection-level rejection.
    Reject,
    /// Canned HTTP error response.
    Error,
    /// Added latency.
    Slow,
    /// Sequential composition.
    Chain,
    /// Random selection.
    Random,
}

impl InjectorKind {
    /// Stable label for logs and assertions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Error => "error",
            Self::Slow => "slow",
            Self::Chain => "chain",
            Self::Random => "random",
        }
    }
}

impl fmt::Display for InjectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered record of the injectors that acted on a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectedFaults {
    kinds: Vec<InjectorKind>,
}

impl InjectedFaults {
    /// The injector kinds in activation order.
    #[must_use]
    pub fn kinds(&self) -> &[InjectorKind] {
        &self.kinds
    }

    /// Whether an injector of the given kind acted on the request.
    #[must_use]
    pub fn contains(&self, kind: InjectorKind) -> bool {
        self.kinds.contains(&kind)
    }

    fn push(&mut self, kind: InjectorKind) {
        self.kinds.push(kind);
    }
}

/// Append an injector kind to the request's fault tag.
pub(crate) fn tag_request(request: &mut Request, kind: InjectorKind) {
    if let Some(tags) = request.extensions_mut().get_mut::<InjectedFaults>() {
        tags.push(kind);
    } else {
        request.extensions_mut().insert(InjectedFaults {
            kinds: vec![kind],
        });
    }
}

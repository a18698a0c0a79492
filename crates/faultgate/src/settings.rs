//! Declarative fault configuration.
//!
//! A serialized description of a fault tree, deserializable from whatever
//! configuration source the host uses. Building a settings tree applies the
//! same validation as direct construction and surfaces the same errors.
//!
//! ```json
//! {
//!     "enabled": true,
//!     "percent_of_requests": 0.25,
//!     "injector": {
//!         "type": "chain",
//!         "injectors": [
//!             { "type": "slow", "duration": { "secs": 0, "nanos": 500000000 } },
//!             { "type": "error", "status_code": 503 }
//!         ]
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FaultError;
use crate::fault::{Fault, FaultConfig};
use crate::injector::{
    ChainInjector, ErrorInjector, Injector, RandomInjector, RejectInjector, SlowInjector,
};
use crate::reporter::SharedReporter;

/// Serialized description of one injector in a fault tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InjectorSettings {
    /// Abort the exchange without a response.
    Reject,
    /// Respond with the given status code and its canonical reason phrase.
    Error {
        status_code: u16,
    },
    /// Delay the request, then continue downstream.
    Slow {
        duration: Duration,
    },
    /// Run the listed injectors in order.
    Chain {
        injectors: Vec<InjectorSettings>,
    },
    /// Run exactly one of the listed injectors, chosen per request.
    Random {
        injectors: Vec<InjectorSettings>,
    },
}

impl InjectorSettings {
    /// Build the described injector tree.
    pub fn build(&self) -> Result<Box<dyn Injector>, FaultError> {
        self.build_inner(None)
    }

    /// Build the described injector tree with one shared reporting sink
    /// attached to every injector in it.
    pub fn build_with_reporter(
        &self,
        reporter: &SharedReporter,
    ) -> Result<Box<dyn Injector>, FaultError> {
        self.build_inner(Some(reporter))
    }

    fn build_inner(
        &self,
        reporter: Option<&SharedReporter>,
    ) -> Result<Box<dyn Injector>, FaultError> {
        let mut injector: Box<dyn Injector> = match self {
            Self::Reject => Box::new(RejectInjector::new()),
            Self::Error { status_code } => Box::new(ErrorInjector::new(*status_code)?),
            Self::Slow { duration } => Box::new(SlowInjector::new(*duration)),
            Self::Chain { injectors } => {
                let built = injectors
                    .iter()
                    .map(|settings| settings.build_inner(reporter))
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(ChainInjector::new(built))
            }
            Self::Random { injectors } => {
                let built = injectors
                    .iter()
                    .map(|settings| settings.build_inner(reporter))
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(RandomInjector::new(built))
            }
        };

        if let Some(reporter) = reporter {
            injector.set_reporter(Arc::clone(reporter));
        }

        Ok(injector)
    }
}

/// Serialized description of a complete fault gate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaultSettings {
    /// Whether the gate evaluates at all.
    #[serde(default)]
    pub enabled: bool,

    /// The fraction of requests diverted into the injector.
    pub percent_of_requests: f64,

    /// The top-level injector.
    pub injector: InjectorSettings,
}

impl FaultSettings {
    /// Build a validated gate from these settings.
    pub fn build(&self) -> Result<Fault, FaultError> {
        let injector = self.injector.build()?;
        self.into_fault(injector)
    }

    /// Build a validated gate with one shared reporting sink attached to
    /// every injector in the tree.
    pub fn build_with_reporter(&self, reporter: &SharedReporter) -> Result<Fault, FaultError> {
        let injector = self.injector.build_with_reporter(reporter)?;
        self.into_fault(injector)
    }

    fn into_fault(&self, injector: Box<dyn Injector>) -> Result<Fault, FaultError> {
        Fault::new(FaultConfig {
            enabled: self.enabled,
            percent_of_requests: self.percent_of_requests,
            injector: Some(Arc::from(injector)),
        })
    }
}

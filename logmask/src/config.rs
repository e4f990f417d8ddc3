//! Composition root: turns host configuration into an operator chain.
//!
//! The host owns the configuration format; this module only understands the
//! fragment that lists operators, e.g.
//!
//! ```json
//! { "operators": [ { "kind": "email" }, { "kind": "credit_card", "wrapped": true } ] }
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use slog::{debug, o, Discard, Logger};

use crate::{
    error::Result,
    event::{LogEvent, Properties},
    kind::OperatorKind,
    masking::{MaskingOperator, MaskingPipeline, WrappedOperator},
};

/// One entry of the operator list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSpec {
    /// Operator identifier, parsed with [`OperatorKind::from_str`](std::str::FromStr).
    pub kind: String,
    /// Route the operator through [`WrappedOperator`].
    #[serde(default)]
    pub wrapped: bool,
}

impl OperatorSpec {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            wrapped: false,
        }
    }

    #[must_use]
    pub fn wrapped(mut self) -> Self {
        self.wrapped = true;
        self
    }

    fn build(&self) -> Result<(OperatorKind, Box<dyn MaskingOperator>)> {
        let kind: OperatorKind = self.kind.parse()?;
        let operator: Box<dyn MaskingOperator> = if self.wrapped {
            Box::new(WrappedOperator::new(kind))
        } else {
            kind.build()
        };
        Ok((kind, operator))
    }
}

impl From<OperatorKind> for OperatorSpec {
    fn from(kind: OperatorKind) -> Self {
        Self::new(kind.as_str())
    }
}

/// Ordered list of operators to apply to log events.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskingOptions {
    #[serde(default)]
    pub operators: Vec<OperatorSpec>,
}

impl MaskingOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operator to the end of the chain.
    #[must_use]
    pub fn with_operator(mut self, spec: impl Into<OperatorSpec>) -> Self {
        self.operators.push(spec.into());
        self
    }

    /// Parses the operator list from a JSON configuration fragment.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What the configuration does with each event.
#[derive(Debug)]
pub enum Enrichment {
    /// Mask string properties of error-bearing events.
    Masking(MaskingPipeline),
    /// Pass properties through unchanged.
    FromContext,
}

/// The built masking stage, ready to be handed to a log sink.
#[derive(Debug)]
pub struct MaskingConfiguration {
    enrichment: Enrichment,
}

impl MaskingConfiguration {
    /// Builds the operator chain described by `options`.
    ///
    /// Fails on the first operator kind that is not recognised.
    pub fn build(options: &MaskingOptions) -> Result<Self> {
        Self::build_with_logger(options, &Logger::root(Discard, o!()))
    }

    /// Like [`MaskingConfiguration::build`], reporting the assembled chain to `logger`.
    pub fn build_with_logger(options: &MaskingOptions, logger: &Logger) -> Result<Self> {
        if options.operators.is_empty() {
            debug!(logger, "no masking operators configured, passing events through");
            return Ok(Self {
                enrichment: Enrichment::FromContext,
            });
        }

        let mut operators = Vec::with_capacity(options.operators.len());
        for (position, spec) in options.operators.iter().enumerate() {
            let (kind, operator) = spec.build()?;
            debug!(logger, "masking operator configured";
                "position" => position, "kind" => %kind, "wrapped" => spec.wrapped);
            operators.push(operator);
        }

        Ok(Self {
            enrichment: Enrichment::Masking(MaskingPipeline::new(operators)),
        })
    }

    pub fn enrichment(&self) -> &Enrichment {
        &self.enrichment
    }

    /// The operator chain, if any operators are configured.
    pub fn pipeline(&self) -> Option<&MaskingPipeline> {
        match &self.enrichment {
            Enrichment::Masking(pipeline) => Some(pipeline),
            Enrichment::FromContext => None,
        }
    }

    /// Entry point for the logging framework, invoked once per event.
    pub fn enrich<'e>(&self, event: &'e LogEvent) -> Cow<'e, Properties> {
        match &self.enrichment {
            Enrichment::Masking(pipeline) => pipeline.apply(event),
            Enrichment::FromContext => Cow::Borrowed(event.properties()),
        }
    }
}

impl TryFrom<&MaskingOptions> for MaskingConfiguration {
    type Error = crate::Error;

    fn try_from(options: &MaskingOptions) -> Result<Self> {
        Self::build(options)
    }
}

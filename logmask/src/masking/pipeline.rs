//! Applies an ordered operator chain to the string properties of an event.

use std::borrow::Cow;

use super::operator::MaskingOperator;
use crate::event::{LogEvent, LogProperty, Properties, PropertyValue};

/// An immutable, ordered chain of masking operators.
///
/// The chain is fixed at construction. Each operator sees the output of the
/// one before it, so order is significant.
#[derive(Debug, Default)]
pub struct MaskingPipeline {
    operators: Vec<Box<dyn MaskingOperator>>,
}

impl MaskingPipeline {
    /// Fixes the chain; operators run in the given order.
    #[must_use]
    pub fn new(operators: Vec<Box<dyn MaskingOperator>>) -> Self {
        Self { operators }
    }

    /// Number of operators in the chain.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// `true` when the chain has no operators.
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Runs `value` through every operator in order.
    ///
    /// Returns the input borrowed when no operator changed it.
    pub fn mask_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        let mut masked = Cow::Borrowed(value);
        for operator in &self.operators {
            let next = match operator.mask(&masked) {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(next) if next != &*masked => Some(next.to_string()),
                Cow::Borrowed(_) => None,
            };
            if let Some(next) = next {
                masked = Cow::Owned(next);
            }
        }

        if masked == value {
            Cow::Borrowed(value)
        } else {
            masked
        }
    }

    /// Masks the string properties of an event that carries an error.
    ///
    /// Events without an attached error, and any event when the chain is
    /// empty, get their properties back borrowed. Otherwise a new set is
    /// returned only if some property actually changed; it has the same names
    /// in the same order, and only string scalars can differ.
    pub fn apply<'e>(&self, event: &'e LogEvent) -> Cow<'e, Properties> {
        let properties = event.properties();
        if self.operators.is_empty() || !event.has_error() {
            return Cow::Borrowed(properties);
        }

        let mut rewritten: Option<Vec<LogProperty>> = None;
        for (index, property) in properties.iter().enumerate() {
            let Some(original) = property.value.as_str() else {
                continue;
            };
            let Cow::Owned(masked) = self.mask_value(original) else {
                continue;
            };

            let entries = rewritten.get_or_insert_with(|| properties.iter().cloned().collect());
            entries[index].value = PropertyValue::from(masked);
        }

        match rewritten {
            Some(entries) => Cow::Owned(Properties::from_unique(entries)),
            None => Cow::Borrowed(properties),
        }
    }
}

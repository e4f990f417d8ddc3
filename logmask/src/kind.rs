//! Capability tokens for "which masking rule is this?"
//!
//! An [`OperatorKind`] names one built-in operator. Configuration refers to
//! operators by kind so call sites never depend on the concrete types.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    masking::{CreditCardMaskingOperator, EmailMaskingOperator, IbanMaskingOperator, MaskingOperator},
};

/// Identifies one of the built-in masking operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Email addresses, see [`EmailMaskingOperator`].
    Email,
    /// Bank account numbers, see [`IbanMaskingOperator`].
    Iban,
    /// Payment card numbers, see [`CreditCardMaskingOperator`].
    CreditCard,
}

impl OperatorKind {
    /// Every built-in kind, in declaration order.
    pub const ALL: [OperatorKind; 3] = [Self::Email, Self::Iban, Self::CreditCard];

    /// The identifier used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Iban => "iban",
            Self::CreditCard => "credit_card",
        }
    }

    /// Constructs a fresh operator of this kind.
    #[must_use]
    pub fn build(self) -> Box<dyn MaskingOperator> {
        match self {
            Self::Email => Box::new(EmailMaskingOperator),
            Self::Iban => Box::new(IbanMaskingOperator),
            Self::CreditCard => Box::new(CreditCardMaskingOperator),
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorKind {
    type Err = Error;

    /// Parses a configuration identifier.
    ///
    /// Matching is case-insensitive and treats `-` like `_`, so `"credit-card"`
    /// and `"CREDIT_CARD"` both resolve to [`OperatorKind::CreditCard`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::UnknownOperator {
                kind: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::OperatorKind;
    use crate::Error;

    #[test]
    fn parses_configuration_identifiers() {
        assert_eq!("email".parse::<OperatorKind>().unwrap(), OperatorKind::Email);
        assert_eq!("IBAN".parse::<OperatorKind>().unwrap(), OperatorKind::Iban);
        assert_eq!(
            "credit-card".parse::<OperatorKind>().unwrap(),
            OperatorKind::CreditCard
        );
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let err = "phone".parse::<OperatorKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownOperator { ref kind } if kind == "phone"));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in OperatorKind::ALL {
            assert_eq!(kind.to_string().parse::<OperatorKind>().unwrap(), kind);
        }
    }
}

//! Detection-and-redaction rules for individual string values.
//!
//! Every operator is a total function: input that does not have the shape an
//! operator looks for is returned unchanged, borrowed.

use std::{borrow::Cow, fmt, panic::RefUnwindSafe};

use super::policy::KeepConfig;
use crate::kind::OperatorKind;

/// One detection-and-redaction rule.
///
/// Implementations hold no per-call state and may be shared across threads
/// for the lifetime of the process. `RefUnwindSafe` lets a pipeline live
/// inside a `slog` drain.
pub trait MaskingOperator: fmt::Debug + Send + Sync + RefUnwindSafe {
    /// Masks `input`, returning it borrowed when no redaction applies.
    #[must_use]
    fn mask<'a>(&self, input: &'a str) -> Cow<'a, str>;
}

/// Masks the local part of an email address.
///
/// The input must contain exactly one `@` with text on both sides. Local parts
/// of up to two characters are masked entirely; longer ones keep their first
/// and last character. The domain is never masked.
///
/// ```rust
/// use logmask::{EmailMaskingOperator, MaskingOperator};
///
/// assert_eq!(EmailMaskingOperator.mask("johndoe@example.com"), "j*****e@example.com");
/// assert_eq!(EmailMaskingOperator.mask("ab@example.com"), "**@example.com");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct EmailMaskingOperator;

impl MaskingOperator for EmailMaskingOperator {
    fn mask<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let Some((local, domain)) = input.split_once('@') else {
            return Cow::Borrowed(input);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Cow::Borrowed(input);
        }

        let policy = if local.chars().count() <= 2 {
            KeepConfig::none()
        } else {
            KeepConfig::both(1, 1)
        };
        Cow::Owned(format!("{}@{domain}", policy.apply_to(local)))
    }
}

/// Masks everything after the country code and check digits of an IBAN.
///
/// Shape-based only: no checksum validation is performed.
#[derive(Clone, Copy, Debug, Default)]
pub struct IbanMaskingOperator;

impl IbanMaskingOperator {
    const VISIBLE_PREFIX: usize = 4;
}

impl MaskingOperator for IbanMaskingOperator {
    fn mask<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if input.chars().count() <= Self::VISIBLE_PREFIX {
            return Cow::Borrowed(input);
        }
        Cow::Owned(KeepConfig::first(Self::VISIBLE_PREFIX).apply_to(input))
    }
}

/// Masks all but the last four digits of a card number, preserving layout.
///
/// Only ASCII digits are rewritten; separators and any other characters stay
/// where they are, so the output has the same length as the input. Inputs
/// with fewer than eight digits are left alone.
///
/// ```rust
/// use logmask::{CreditCardMaskingOperator, MaskingOperator};
///
/// assert_eq!(
///     CreditCardMaskingOperator.mask("4111-1111-1111-1111"),
///     "****-****-****-1111"
/// );
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CreditCardMaskingOperator;

impl CreditCardMaskingOperator {
    const MIN_DIGITS: usize = 8;
    const VISIBLE_SUFFIX: usize = 4;
}

impl MaskingOperator for CreditCardMaskingOperator {
    fn mask<'a>(&self, input: &'a str) -> Cow<'a, str> {
        let mut digits: Vec<char> = input.chars().filter(char::is_ascii_digit).collect();
        if digits.len() < Self::MIN_DIGITS {
            return Cow::Borrowed(input);
        }

        // `digits` holds exactly one entry per digit of `input`, so the
        // substitution below consumes it completely.
        KeepConfig::last(Self::VISIBLE_SUFFIX).apply_in_place(&mut digits);
        let mut replacements = digits.into_iter();
        let masked = input
            .chars()
            .map(|ch| {
                if ch.is_ascii_digit() {
                    replacements.next().unwrap_or(ch)
                } else {
                    ch
                }
            })
            .collect();
        Cow::Owned(masked)
    }
}

/// Forwards to an operator constructed from an [`OperatorKind`].
///
/// Wrapping lets configuration select an operator by name without the call
/// site knowing the concrete type. It never changes what gets masked.
#[derive(Debug)]
pub struct WrappedOperator {
    kind: OperatorKind,
    inner: Box<dyn MaskingOperator>,
}

impl WrappedOperator {
    /// Builds the inner operator for `kind`.
    #[must_use]
    pub fn new(kind: OperatorKind) -> Self {
        Self {
            kind,
            inner: kind.build(),
        }
    }

    /// The kind of the wrapped operator.
    pub fn kind(&self) -> OperatorKind {
        self.kind
    }
}

impl MaskingOperator for WrappedOperator {
    fn mask<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.inner.mask(input)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::{
        CreditCardMaskingOperator, EmailMaskingOperator, IbanMaskingOperator, MaskingOperator,
        WrappedOperator,
    };
    use crate::OperatorKind;

    #[test]
    fn email_masks_interior_of_long_local_part() {
        assert_eq!(
            EmailMaskingOperator.mask("johndoe@example.com"),
            "j*****e@example.com"
        );
        assert_eq!(EmailMaskingOperator.mask("abc@x.io"), "a*c@x.io");
    }

    #[test]
    fn email_masks_short_local_part_entirely() {
        assert_eq!(EmailMaskingOperator.mask("ab@example.com"), "**@example.com");
        assert_eq!(EmailMaskingOperator.mask("jo@x.io"), "**@x.io");
        assert_eq!(EmailMaskingOperator.mask("j@x.io"), "*@x.io");
    }

    #[test]
    fn email_leaves_malformed_input_borrowed() {
        for input in ["", "no-at-sign", "a@b@c", "@example.com", "user@"] {
            let masked = EmailMaskingOperator.mask(input);
            assert!(matches!(masked, Cow::Borrowed(_)), "{input:?} was rewritten");
            assert_eq!(masked, input);
        }
    }

    #[test]
    fn iban_keeps_country_code_and_check_digits() {
        assert_eq!(
            IbanMaskingOperator.mask("GB82WEST12345698765432"),
            "GB82******************"
        );
        assert_eq!(IbanMaskingOperator.mask("GB82 WEST"), "GB82*****");
    }

    #[test]
    fn iban_leaves_short_input_unchanged() {
        assert_eq!(IbanMaskingOperator.mask("GB8"), "GB8");
        assert_eq!(IbanMaskingOperator.mask("GB82"), "GB82");
        assert_eq!(IbanMaskingOperator.mask(""), "");
    }

    #[test]
    fn card_preserves_separators() {
        assert_eq!(
            CreditCardMaskingOperator.mask("4111-1111-1111-1111"),
            "****-****-****-1111"
        );
        assert_eq!(
            CreditCardMaskingOperator.mask("4111 1111 1111 1234"),
            "**** **** **** 1234"
        );
        assert_eq!(
            CreditCardMaskingOperator.mask("4111111111111234"),
            "************1234"
        );
    }

    #[test]
    fn card_ignores_short_digit_runs() {
        assert_eq!(CreditCardMaskingOperator.mask("1234-567"), "1234-567");
        assert_eq!(CreditCardMaskingOperator.mask("order 42"), "order 42");
    }

    #[test]
    fn card_counts_only_digits_towards_the_threshold() {
        // Eight non-separator characters but only six digits.
        assert_eq!(CreditCardMaskingOperator.mask("AB123456"), "AB123456");
        assert_eq!(CreditCardMaskingOperator.mask("ref 12345678"), "ref ****5678");
    }

    #[test]
    fn remasking_is_a_no_op() {
        let operators: [&dyn MaskingOperator; 3] = [
            &EmailMaskingOperator,
            &IbanMaskingOperator,
            &CreditCardMaskingOperator,
        ];
        let inputs = [
            "johndoe@example.com",
            "GB82WEST12345698765432",
            "4111-1111-1111-1111",
        ];
        for (operator, input) in operators.into_iter().zip(inputs) {
            let once = operator.mask(input).into_owned();
            assert_eq!(operator.mask(&once), once);
        }
    }

    #[test]
    fn wrapped_operator_behaves_like_its_inner_kind() {
        for kind in OperatorKind::ALL {
            let wrapped = WrappedOperator::new(kind);
            let direct = kind.build();
            assert_eq!(wrapped.kind(), kind);
            for input in ["jane.doe@example.com", "DE89370400440532013000", "5500 0000 0000 0004"] {
                assert_eq!(wrapped.mask(input), direct.mask(input));
            }
        }
    }
}

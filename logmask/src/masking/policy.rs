//! Character-level masking primitives shared by the operators.
//!
//! Policies are pure string transformations. They do not detect shapes or
//! decide whether a value is sensitive; operators do that and then hand the
//! segment they want redacted to a policy.

/// Symbol written in place of every masked character.
pub const MASK_CHAR: char = '*';

/// Configuration that keeps selected segments visible while masking the remainder.
///
/// The policy operates on Unicode scalar values. If the configuration keeps the
/// entire value visible, the output is unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeepConfig {
    /// Number of leading characters to keep visible.
    visible_prefix: usize,
    /// Number of trailing characters to keep visible.
    visible_suffix: usize,
}

impl KeepConfig {
    /// Keeps nothing: every character is masked.
    #[must_use]
    pub const fn none() -> Self {
        Self::both(0, 0)
    }

    /// Keeps only the first `visible_prefix` scalar values.
    #[must_use]
    pub const fn first(visible_prefix: usize) -> Self {
        Self::both(visible_prefix, 0)
    }

    /// Keeps only the last `visible_suffix` scalar values.
    #[must_use]
    pub const fn last(visible_suffix: usize) -> Self {
        Self::both(0, visible_suffix)
    }

    /// Keeps both leading and trailing characters visible.
    ///
    /// If `visible_prefix + visible_suffix >= total_length`, the entire value
    /// is kept visible (no masking occurs).
    #[must_use]
    pub const fn both(visible_prefix: usize, visible_suffix: usize) -> Self {
        Self {
            visible_prefix,
            visible_suffix,
        }
    }

    /// Applies the policy to a string value.
    ///
    /// Empty strings are returned as-is.
    #[must_use]
    pub fn apply_to(&self, value: &str) -> String {
        let mut chars: Vec<char> = value.chars().collect();
        self.apply_in_place(&mut chars);
        chars.into_iter().collect()
    }

    /// Applies the policy to an already decoded character buffer.
    pub(crate) fn apply_in_place(&self, chars: &mut [char]) {
        let total = chars.len();
        // If keep spans cover or exceed the total length, leave it unchanged
        if self.visible_prefix + self.visible_suffix >= total {
            return;
        }

        chars[self.visible_prefix..(total - self.visible_suffix)].fill(MASK_CHAR);
    }
}

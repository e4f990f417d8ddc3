//! Masking pipeline for structured log events.
//!
//! This crate separates:
//! - **Operators**: how one shape of sensitive text (an email address, an IBAN,
//!   a card number) is detected and redacted.
//! - **Pipeline**: which values of a log event the operators are applied to.
//! - **Configuration**: which operators run, and in which order.
//!
//! Key rules:
//! - Only string scalar properties are masked; numbers, booleans and nested
//!   values pass through unchanged.
//! - Masking only happens for events that carry an attached error.
//! - Operators run in configured order, each seeing the previous output.
//! - Operators never fail: input that does not match their shape is returned
//!   unchanged.
//!
//! What this crate does:
//! - defines the [`MaskingOperator`] trait and the built-in operators
//! - builds a [`MaskingPipeline`] from [`MaskingOptions`]
//! - integrates with `slog` through [`slog::MaskingDrain`]
//!
//! What it does not do:
//! - guess which fields are sensitive
//! - encrypt or persist anything: masking is display-layer obfuscation
//!
//! ```rust
//! use logmask::{LogEvent, MaskingConfiguration, MaskingOptions, OperatorKind, Properties};
//!
//! let options = MaskingOptions::new()
//!     .with_operator(OperatorKind::Email)
//!     .with_operator(OperatorKind::CreditCard);
//! let configuration = MaskingConfiguration::build(&options).unwrap();
//!
//! let properties: Properties = [("to", "johndoe@example.com")].into_iter().collect();
//! let event = LogEvent::new(properties).with_error("smtp rejected recipient");
//!
//! let masked = configuration.enrich(&event);
//! assert_eq!(masked.get("to").and_then(|v| v.as_str()), Some("j*****e@example.com"));
//! ```

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod config;
mod error;
mod event;
mod kind;
mod masking;
pub mod slog;

// Re-exports
pub use config::{Enrichment, MaskingConfiguration, MaskingOptions, OperatorSpec};
pub use error::{Error, Result};
pub use event::{AttachedError, LogEvent, LogProperty, Properties, PropertyValue, ScalarValue};
pub use kind::OperatorKind;
pub use masking::{
    CreditCardMaskingOperator, EmailMaskingOperator, IbanMaskingOperator, KeepConfig,
    MaskingOperator, MaskingPipeline, WrappedOperator, MASK_CHAR,
};

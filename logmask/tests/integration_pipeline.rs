//! End-to-end tests for the pipeline and its configuration.
//!
//! These tests exercise:
//! - building a chain from JSON options,
//! - the error-bearing activation rule,
//! - pass-through of non-string properties, and
//! - sharing one configuration across threads.

use std::{borrow::Cow, sync::Arc, thread};

use logmask::{
    Enrichment, Error, LogEvent, MaskingConfiguration, MaskingOptions, MaskingPipeline,
    OperatorKind, OperatorSpec, Properties, PropertyValue, ScalarValue,
};
use serde_json::json;

fn configuration(json: &str) -> MaskingConfiguration {
    let options = MaskingOptions::from_json_str(json).unwrap();
    MaskingConfiguration::build(&options).unwrap()
}

fn sample_properties() -> Properties {
    [
        ("recipient", PropertyValue::from("johndoe@example.com")),
        ("account", PropertyValue::from("GB82WEST12345698765432")),
        ("card", PropertyValue::from("4111-1111-1111-1111")),
        ("attempt", PropertyValue::from(3_i64)),
        ("retry", PropertyValue::from(true)),
        ("payload", PropertyValue::from(json!({"to": "johndoe@example.com"}))),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_masks_error_bearing_event() {
    let configuration = configuration(r#"{"operators": [{"kind": "email"}, {"kind": "credit_card"}]}"#);
    let event = LogEvent::new(sample_properties()).with_error("send failed");

    let masked = configuration.enrich(&event);
    assert_eq!(
        masked.get("recipient").and_then(PropertyValue::as_str),
        Some("j*****e@example.com")
    );
    assert_eq!(
        masked.get("card").and_then(PropertyValue::as_str),
        Some("****-****-****-1111")
    );
    // Shape-based: the IBAN carries sixteen digits, so the card operator
    // matches it too.
    assert_eq!(
        masked.get("account").and_then(PropertyValue::as_str),
        Some("GB**WEST**********5432")
    );
}

#[test]
fn test_non_string_properties_are_untouched() {
    let configuration = configuration(r#"{"operators": [{"kind": "email"}]}"#);
    let event = LogEvent::new(sample_properties()).with_error("send failed");

    let masked = configuration.enrich(&event);
    assert_eq!(
        masked.get("attempt"),
        Some(&PropertyValue::Scalar(ScalarValue::I64(3)))
    );
    assert_eq!(masked.get("retry"), Some(&PropertyValue::from(true)));
    assert_eq!(
        masked.get("payload"),
        Some(&PropertyValue::from(json!({"to": "johndoe@example.com"})))
    );
    assert_eq!(masked.len(), event.properties().len());
}

#[test]
fn test_event_without_error_passes_through() {
    let configuration = configuration(r#"{"operators": [{"kind": "email"}, {"kind": "iban"}]}"#);
    let event = LogEvent::new(sample_properties());

    let result = configuration.enrich(&event);
    assert!(matches!(result, Cow::Borrowed(_)));
    assert_eq!(*result, sample_properties());
}

#[test]
fn test_empty_options_use_from_context() {
    let configuration = configuration(r#"{"operators": []}"#);
    assert!(matches!(configuration.enrichment(), Enrichment::FromContext));

    let event = LogEvent::new(sample_properties()).with_error("send failed");
    let result = configuration.enrich(&event);
    assert!(matches!(result, Cow::Borrowed(_)));
}

#[test]
fn test_missing_operator_list_is_empty() {
    let configuration = configuration("{}");
    assert!(configuration.pipeline().is_none());
}

#[test]
fn test_empty_pipeline_returns_properties_unchanged() {
    let pipeline = MaskingPipeline::new(Vec::new());
    let event = LogEvent::new(sample_properties()).with_error("send failed");
    let result = pipeline.apply(&event);
    assert!(matches!(result, Cow::Borrowed(_)));
    assert_eq!(*result, sample_properties());
}

#[test]
fn test_wrapped_operator_from_configuration() {
    let plain = configuration(r#"{"operators": [{"kind": "iban"}]}"#);
    let wrapped = configuration(r#"{"operators": [{"kind": "iban", "wrapped": true}]}"#);
    let event = LogEvent::new(sample_properties()).with_error("send failed");

    assert_eq!(plain.enrich(&event), wrapped.enrich(&event));
}

#[test]
fn test_unknown_operator_is_a_configuration_error() {
    let options = MaskingOptions::from_json_str(r#"{"operators": [{"kind": "phone_number"}]}"#)
        .unwrap();
    let err = MaskingConfiguration::build(&options).unwrap_err();
    assert_eq!(err.to_string(), "unknown masking operator `phone_number`");
}

#[test]
fn test_malformed_options_are_rejected() {
    let err = MaskingOptions::from_json_str(r#"{"operators": "email"}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)));
}

#[test]
fn test_chain_order_is_respected() {
    let input = "12345678@bank.example";
    let card_then_email = MaskingOptions::new()
        .with_operator(OperatorKind::CreditCard)
        .with_operator(OperatorKind::Email);
    let email_then_card = MaskingOptions::new()
        .with_operator(OperatorSpec::from(OperatorKind::Email))
        .with_operator(OperatorKind::CreditCard);

    let first = MaskingConfiguration::build(&card_then_email).unwrap();
    let second = MaskingConfiguration::build(&email_then_card).unwrap();

    let mask = |configuration: &MaskingConfiguration| {
        configuration
            .pipeline()
            .map(|pipeline| pipeline.mask_value(input).into_owned())
    };
    assert_eq!(mask(&first).as_deref(), Some("*******8@bank.example"));
    assert_eq!(mask(&second).as_deref(), Some("1******8@bank.example"));
}

#[test]
fn test_configuration_is_shared_across_threads() {
    let configuration = Arc::new(configuration(
        r#"{"operators": [{"kind": "email"}, {"kind": "credit_card"}]}"#,
    ));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let configuration = Arc::clone(&configuration);
            thread::spawn(move || {
                let properties: Properties =
                    [("to", format!("user{i}@example.com"))].into_iter().collect();
                let event = LogEvent::new(properties).with_error("send failed");
                let masked = configuration.enrich(&event);
                let to = masked.get("to").and_then(PropertyValue::as_str);
                (i, to.map(ToString::to_string))
            })
        })
        .collect();

    for handle in handles {
        let (i, to) = handle.join().unwrap();
        assert_eq!(to, Some(format!("u***{i}@example.com")));
    }
}

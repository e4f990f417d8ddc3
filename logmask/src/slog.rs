//! A `slog::Drain` that masks records before they reach the wrapped drain.
//!
//! This module connects [`MaskingConfiguration`] with `slog`. It is
//! responsible for:
//! - Capturing a record's key/values and the logger's owned values into
//!   [`LogEvent`]s.
//! - Recognising the attached error: values emitted with the `#` sigil
//!   (`emit_error`) or under the [`ERROR_KEY`] key.
//! - Forwarding the record untouched when nothing was masked, or a rebuilt
//!   record carrying the masked values otherwise. Masked values that appear
//!   in the rendered message are replaced there as well.
//! - Never failing a log call because of masking: if capturing the values
//!   fails, the record is forwarded as received.
//!
//! It does not decide what is sensitive; that is the configuration's job.
//!
//! ## Example
//! ```ignore
//! use logmask::{slog::MaskingDrainExt, MaskingConfiguration, MaskingOptions, OperatorKind};
//!
//! let options = MaskingOptions::new().with_operator(OperatorKind::Email);
//! let configuration = MaskingConfiguration::build(&options)?;
//! let drain = slog_json::Json::default(std::io::stderr()).masked(configuration).fuse();
//! let logger = slog::Logger::root(std::sync::Mutex::new(drain).fuse(), slog::o!());
//! ```

use std::{
    borrow::Cow,
    cmp::Reverse,
    error::Error as StdError,
    fmt::{self, Arguments},
    sync::Arc,
};

use serde_json::Value as JsonValue;
use slog::{
    BorrowedKV, Drain, Key, Level, OwnedKV, OwnedKVList, Record, RecordLocation, RecordStatic,
    Result as SlogResult, Serializer, Value as SlogValue, KV,
};

use crate::{
    config::MaskingConfiguration,
    event::{LogEvent, Properties, PropertyValue, ScalarValue},
};

/// Key whose value is treated as the record's attached error.
pub const ERROR_KEY: &str = "error";

/// An error captured from a record, kept as its rendered message.
#[derive(Clone, Debug, PartialEq)]
struct RenderedError(String);

impl RenderedError {
    fn capture(error: &(dyn StdError + 'static)) -> Self {
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self(message)
    }
}

impl fmt::Display for RenderedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for RenderedError {}

#[derive(Clone, Debug, PartialEq)]
enum Captured {
    Value(PropertyValue),
    Error(RenderedError),
}

impl Captured {
    fn emit(&self, record: &Record<'_>, key: Key, serializer: &mut dyn Serializer) -> SlogResult {
        match self {
            Captured::Error(error) => serializer.emit_error(key, error),
            Captured::Value(PropertyValue::Structured(json)) => {
                let nested = slog::Serde(json.clone());
                SlogValue::serialize(&nested, record, key, serializer)
            }
            Captured::Value(PropertyValue::Scalar(scalar)) => match scalar {
                ScalarValue::Str(value) => serializer.emit_str(key, value),
                ScalarValue::Bool(value) => serializer.emit_bool(key, *value),
                ScalarValue::I64(value) => serializer.emit_i64(key, *value),
                ScalarValue::U64(value) => serializer.emit_u64(key, *value),
                ScalarValue::F64(value) => serializer.emit_f64(key, *value),
                ScalarValue::Unit => serializer.emit_unit(key),
                ScalarValue::Null => serializer.emit_none(key),
            },
        }
    }
}

/// Key/value pairs recorded in emission order.
#[derive(Clone, Debug, Default)]
struct CapturedKv {
    entries: Vec<(Key, Captured)>,
}

impl CapturedKv {
    fn capture<T: KV + ?Sized>(kv: &T, record: &Record<'_>) -> SlogResult<Self> {
        let mut captured = Self::default();
        kv.serialize(record, &mut captured)?;
        Ok(captured)
    }

    fn push(&mut self, key: Key, value: impl Into<PropertyValue>) -> SlogResult {
        self.entries.push((key, Captured::Value(value.into())));
        Ok(())
    }

    fn error(&self) -> Option<String> {
        self.entries.iter().find_map(|(key, captured)| match captured {
            Captured::Error(error) => Some(error.to_string()),
            Captured::Value(value) if *key == ERROR_KEY => Some(value.to_string()),
            Captured::Value(_) => None,
        })
    }

    fn is_property(key: Key, captured: &Captured) -> bool {
        matches!(captured, Captured::Value(_)) && key != ERROR_KEY
    }

    /// Runs the configuration over the captured properties.
    ///
    /// `slog` allows repeated keys, so properties are split into as many
    /// events as needed to keep names unique within each one. Returns `None`
    /// when nothing changed.
    fn mask(&self, configuration: &MaskingConfiguration, error: Option<&str>) -> Option<Self> {
        let mut layers: Vec<Properties> = Vec::new();
        let mut slots: Vec<Option<usize>> = Vec::with_capacity(self.entries.len());
        for (key, captured) in &self.entries {
            let slot = match captured {
                Captured::Value(value) if Self::is_property(*key, captured) => {
                    let layer = if let Some(free) =
                        layers.iter().position(|layer| layer.get(key).is_none())
                    {
                        free
                    } else {
                        layers.push(Properties::new());
                        layers.len() - 1
                    };
                    layers[layer].insert(*key, value.clone());
                    Some(layer)
                }
                _ => None,
            };
            slots.push(slot);
        }

        let masked: Vec<Option<Properties>> = layers
            .into_iter()
            .map(|layer| {
                let mut event = LogEvent::new(layer);
                if let Some(error) = error {
                    event = event.with_error(error.to_string());
                }
                let enriched = configuration.enrich(&event);
                match enriched {
                    Cow::Owned(properties) => Some(properties),
                    Cow::Borrowed(_) => None,
                }
            })
            .collect();
        if masked.iter().all(Option::is_none) {
            return None;
        }

        let entries = self
            .entries
            .iter()
            .zip(slots)
            .map(|((key, captured), slot)| {
                let replacement = slot
                    .and_then(|layer| masked[layer].as_ref())
                    .and_then(|properties| properties.get(key))
                    .cloned();
                (*key, replacement.map_or_else(|| captured.clone(), Captured::Value))
            })
            .collect();
        Some(Self { entries })
    }

    /// Pairs of original and masked text for every string value that changed.
    fn changes(&self, masked: &Self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .zip(&masked.entries)
            .filter_map(|((_, before), (_, after))| match (before, after) {
                (Captured::Value(before), Captured::Value(after)) if before != after => {
                    Some((before.as_str()?.to_string(), after.as_str()?.to_string()))
                }
                _ => None,
            })
            .collect()
    }
}

/// Renders the record message with every changed value replaced by its
/// masked text. Returns `None` when the message does not contain any of them.
fn mask_message(message: &Arguments<'_>, mut changes: Vec<(String, String)>) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    // Longest first, so a value containing another one is replaced whole.
    changes.sort_by_key(|(before, _)| Reverse(before.chars().count()));
    let rendered = message.to_string();
    let masked = changes
        .iter()
        .fold(rendered.clone(), |text, (before, after)| text.replace(before.as_str(), after));
    (masked != rendered).then_some(masked)
}

impl Serializer for CapturedKv {
    fn emit_arguments(&mut self, key: Key, val: &Arguments<'_>) -> SlogResult {
        self.push(key, val.to_string())
    }

    fn emit_str(&mut self, key: Key, val: &str) -> SlogResult {
        self.push(key, val)
    }

    fn emit_char(&mut self, key: Key, val: char) -> SlogResult {
        self.push(key, val.to_string())
    }

    fn emit_bool(&mut self, key: Key, val: bool) -> SlogResult {
        self.push(key, val)
    }

    fn emit_usize(&mut self, key: Key, val: usize) -> SlogResult {
        self.push(key, val as u64)
    }

    fn emit_isize(&mut self, key: Key, val: isize) -> SlogResult {
        self.push(key, val as i64)
    }

    fn emit_u8(&mut self, key: Key, val: u8) -> SlogResult {
        self.push(key, u64::from(val))
    }

    fn emit_i8(&mut self, key: Key, val: i8) -> SlogResult {
        self.push(key, i64::from(val))
    }

    fn emit_u16(&mut self, key: Key, val: u16) -> SlogResult {
        self.push(key, u64::from(val))
    }

    fn emit_i16(&mut self, key: Key, val: i16) -> SlogResult {
        self.push(key, i64::from(val))
    }

    fn emit_u32(&mut self, key: Key, val: u32) -> SlogResult {
        self.push(key, u64::from(val))
    }

    fn emit_i32(&mut self, key: Key, val: i32) -> SlogResult {
        self.push(key, i64::from(val))
    }

    fn emit_u64(&mut self, key: Key, val: u64) -> SlogResult {
        self.push(key, val)
    }

    fn emit_i64(&mut self, key: Key, val: i64) -> SlogResult {
        self.push(key, val)
    }

    fn emit_f32(&mut self, key: Key, val: f32) -> SlogResult {
        self.push(key, f64::from(val))
    }

    fn emit_f64(&mut self, key: Key, val: f64) -> SlogResult {
        self.push(key, val)
    }

    fn emit_unit(&mut self, key: Key) -> SlogResult {
        self.push(key, ScalarValue::Unit)
    }

    fn emit_none(&mut self, key: Key) -> SlogResult {
        self.push(key, ScalarValue::Null)
    }

    fn emit_error(&mut self, key: Key, error: &(dyn StdError + 'static)) -> SlogResult {
        self.entries
            .push((key, Captured::Error(RenderedError::capture(error))));
        Ok(())
    }

    fn emit_serde(&mut self, key: Key, val: &dyn slog::SerdeValue) -> SlogResult {
        let json = serde_json::to_value(val.as_serde()).unwrap_or_else(|_| {
            JsonValue::String("Failed to serialize nested value".to_string())
        });
        self.push(key, json)
    }
}

impl KV for CapturedKv {
    fn serialize(&self, record: &Record<'_>, serializer: &mut dyn Serializer) -> SlogResult {
        for (key, captured) in &self.entries {
            captured.emit(record, *key, serializer)?;
        }
        Ok(())
    }
}

/// Wraps a drain and masks every record passed to it.
///
/// The configuration is shared behind an `Arc`, so several drains can use the
/// same operator chain.
#[derive(Debug)]
pub struct MaskingDrain<D> {
    drain: D,
    configuration: Arc<MaskingConfiguration>,
}

impl<D> MaskingDrain<D> {
    pub fn new(drain: D, configuration: impl Into<Arc<MaskingConfiguration>>) -> Self {
        Self {
            drain,
            configuration: configuration.into(),
        }
    }

    pub fn configuration(&self) -> &MaskingConfiguration {
        &self.configuration
    }

    pub fn into_inner(self) -> D {
        self.drain
    }
}

impl<D> Drain for MaskingDrain<D>
where
    D: Drain,
{
    type Ok = D::Ok;
    type Err = D::Err;

    fn log(&self, record: &Record<'_>, values: &OwnedKVList) -> Result<Self::Ok, Self::Err> {
        if self.configuration.pipeline().is_none() {
            return self.drain.log(record, values);
        }

        let (Ok(record_kv), Ok(logger_kv)) = (
            CapturedKv::capture(&record.kv(), record),
            CapturedKv::capture(values, record),
        ) else {
            return self.drain.log(record, values);
        };

        let error = record_kv.error().or_else(|| logger_kv.error());
        let masked_record = record_kv.mask(&self.configuration, error.as_deref());
        let masked_logger = logger_kv.mask(&self.configuration, error.as_deref());
        if masked_record.is_none() && masked_logger.is_none() {
            return self.drain.log(record, values);
        }

        let mut changes = Vec::new();
        if let Some(masked) = &masked_record {
            changes.extend(record_kv.changes(masked));
        }
        if let Some(masked) = &masked_logger {
            changes.extend(logger_kv.changes(masked));
        }
        let message = mask_message(record.msg(), changes);

        let rebuilt_values;
        let values = match masked_logger {
            Some(masked) => {
                rebuilt_values = OwnedKVList::from(OwnedKV(masked));
                &rebuilt_values
            }
            None => values,
        };
        if masked_record.is_none() && message.is_none() {
            return self.drain.log(record, values);
        }

        let location = RecordLocation {
            file: record.file(),
            line: record.line(),
            column: record.column(),
            function: record.function(),
            module: record.module(),
        };
        let rstatic = RecordStatic {
            location: &location,
            tag: record.tag(),
            level: record.level(),
        };
        let kv = masked_record
            .as_ref()
            .map_or_else(|| record.kv(), |masked| BorrowedKV(masked));
        match &message {
            Some(message) => {
                self.drain
                    .log(&Record::new(&rstatic, &format_args!("{message}"), kv), values)
            }
            None => self.drain.log(&Record::new(&rstatic, record.msg(), kv), values),
        }
    }

    fn is_enabled(&self, level: Level) -> bool {
        self.drain.is_enabled(level)
    }
}

/// Adds [`masked`](MaskingDrainExt::masked) to every drain, in the style of
/// `Drain::fuse`.
pub trait MaskingDrainExt: Drain + Sized {
    /// Wraps `self` so records are masked by `configuration` first.
    fn masked(self, configuration: impl Into<Arc<MaskingConfiguration>>) -> MaskingDrain<Self> {
        MaskingDrain::new(self, configuration)
    }
}

impl<D> MaskingDrainExt for D where D: Drain {}

//! Decode hooks: value rewrites that run before the decoder satisfies a typed request.

use std::fmt;

use serde_json::{json, Value};

use super::duration::parse_duration;

/// The kind of value the target type asked the decoder for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Self-describing request, the target accepts whatever is there
    Any,
    /// `bool`
    Bool,
    /// Signed integers
    Signed,
    /// Unsigned integers
    Unsigned,
    /// `f32` / `f64`
    Float,
    /// Strings and chars
    Str,
    /// `()` and unit structs
    Unit,
    /// Sequences, tuples and tuple structs
    Seq,
    /// Maps
    Map,
    /// A named struct; `std::time::Duration` arrives as `Struct("Duration")`
    Struct(&'static str),
    /// A named enum
    Enum(&'static str),
}

/// Contract for decode hooks.
///
/// A hook sees every typed request together with the raw value, and returns the
/// value to decode instead. Hooks that do not apply must hand the value back
/// unchanged. Returning `Err` aborts decoding with the message attached to the
/// current path.
pub trait DecodeHook: Send + Sync {
    /// Rewrites `value` for a request of kind `target`.
    fn decode(&self, target: Target, value: Value) -> Result<Value, String>;

    /// Name used in debug output
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Turns duration strings (`"3s"`, `"1h30m"`) and integer nanoseconds into
/// `std::time::Duration`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringToDuration;

impl DecodeHook for StringToDuration {
    fn decode(&self, target: Target, value: Value) -> Result<Value, String> {
        if target != Target::Struct("Duration") {
            return Ok(value);
        }
        let duration = match &value {
            Value::String(text) => parse_duration(text)?,
            Value::Number(number) => match number.as_u64() {
                Some(nanos) => std::time::Duration::from_nanos(nanos),
                None => return Err(format!("cannot use {number} as a duration")),
            },
            _ => return Ok(value),
        };
        Ok(json!({
            "secs": duration.as_secs(),
            "nanos": duration.subsec_nanos(),
        }))
    }

    fn name(&self) -> &'static str {
        "string_to_duration"
    }
}

/// Splits strings on a separator when a sequence is requested.
#[derive(Debug, Clone)]
pub struct StringToSlice {
    separator: String,
}

impl StringToSlice {
    /// Creates a hook splitting on `separator`.
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl DecodeHook for StringToSlice {
    fn decode(&self, target: Target, value: Value) -> Result<Value, String> {
        match (target, value) {
            (Target::Seq, Value::String(text)) if text.is_empty() => Ok(Value::Array(Vec::new())),
            (Target::Seq, Value::String(text)) => Ok(Value::Array(
                text.split(self.separator.as_str())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            )),
            (_, value) => Ok(value),
        }
    }

    fn name(&self) -> &'static str {
        "string_to_slice"
    }
}

/// Adapter that lets a closure act as a [`DecodeHook`].
pub struct FnHook<F> {
    name: &'static str,
    hook: F,
}

/// Wraps `hook` into a [`DecodeHook`] reported as `name`.
pub const fn hook_fn<F>(name: &'static str, hook: F) -> FnHook<F>
where
    F: Fn(Target, Value) -> Result<Value, String> + Send + Sync,
{
    FnHook { name, hook }
}

impl<F> DecodeHook for FnHook<F>
where
    F: Fn(Target, Value) -> Result<Value, String> + Send + Sync,
{
    fn decode(&self, target: Target, value: Value) -> Result<Value, String> {
        (self.hook)(target, value)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl<F> fmt::Debug for FnHook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHook").field("name", &self.name).finish()
    }
}

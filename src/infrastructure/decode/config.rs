use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::deserializer::ValueDeserializer;
use super::error::DecodeError;
use super::hooks::{DecodeHook, StringToDuration, StringToSlice};

/// Separator used by the default string-to-sequence hook
pub const DEFAULT_SLICE_SEPARATOR: &str = ",";

/// Rules governing how a config value is coerced into a target type
#[derive(Clone)]
pub struct DecoderConfig {
    /// Tolerate scalar mismatches: `"5"` for an integer, `1` for a bool, and so on
    pub weakly_typed_input: bool,

    /// Reject source keys that match no field of the target struct
    pub error_unused: bool,

    /// Hooks run in order before every typed request
    pub hooks: Vec<Arc<dyn DecodeHook>>,
}

impl Default for DecoderConfig {
    /// Loose typing, duration strings and comma-separated sequences.
    fn default() -> Self {
        Self {
            weakly_typed_input: true,
            error_unused: false,
            hooks: vec![
                Arc::new(StringToDuration),
                Arc::new(StringToSlice::new(DEFAULT_SLICE_SEPARATOR)),
            ],
        }
    }
}

impl DecoderConfig {
    /// Layers caller overrides on top of this configuration, in order.
    #[must_use]
    pub fn with_options(mut self, options: &[DecodeOption]) -> Self {
        for option in options {
            option.apply(&mut self);
        }
        self
    }

    /// Decodes `value` into a fresh `T`.
    ///
    /// Nothing is handed back on failure, so callers never see a partly filled
    /// target.
    pub fn decode<T: DeserializeOwned>(&self, value: Value) -> Result<T, DecodeError> {
        T::deserialize(ValueDeserializer::new(value, self, String::new()))
    }
}

impl fmt::Debug for DecoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks: Vec<_> = self.hooks.iter().map(|hook| hook.name()).collect();
        f.debug_struct("DecoderConfig")
            .field("weakly_typed_input", &self.weakly_typed_input)
            .field("error_unused", &self.error_unused)
            .field("hooks", &hooks)
            .finish()
    }
}

/// Override applied to the default [`DecoderConfig`] by `unmarshal`
#[derive(Clone)]
pub enum DecodeOption {
    /// Switch loose scalar coercion on or off
    WeaklyTypedInput(bool),
    /// Switch rejection of unknown struct keys on or off
    ErrorUnused(bool),
    /// Append a hook after the ones already configured
    Hook(Arc<dyn DecodeHook>),
    /// Replace the whole hook chain
    ReplaceHooks(Vec<Arc<dyn DecodeHook>>),
}

impl DecodeOption {
    /// Convenience for [`DecodeOption::Hook`].
    pub fn hook(hook: impl DecodeHook + 'static) -> Self {
        Self::Hook(Arc::new(hook))
    }

    fn apply(&self, config: &mut DecoderConfig) {
        match self {
            Self::WeaklyTypedInput(enabled) => config.weakly_typed_input = *enabled,
            Self::ErrorUnused(enabled) => config.error_unused = *enabled,
            Self::Hook(hook) => config.hooks.push(Arc::clone(hook)),
            Self::ReplaceHooks(hooks) => config.hooks.clone_from(hooks),
        }
    }
}

impl fmt::Debug for DecodeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeaklyTypedInput(enabled) => {
                f.debug_tuple("WeaklyTypedInput").field(enabled).finish()
            }
            Self::ErrorUnused(enabled) => f.debug_tuple("ErrorUnused").field(enabled).finish(),
            Self::Hook(hook) => f.debug_tuple("Hook").field(&hook.name()).finish(),
            Self::ReplaceHooks(hooks) => {
                let names: Vec<_> = hooks.iter().map(|hook| hook.name()).collect();
                f.debug_tuple("ReplaceHooks").field(&names).finish()
            }
        }
    }
}

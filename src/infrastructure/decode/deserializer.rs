//! serde `Deserializer` over config values, driven by a [`DecoderConfig`].
//!
//! Every typed request first runs the configured hooks, then the value is
//! coerced when weak typing allows it. Struct fields and enum variants match
//! case-insensitively; exact matches win over case-folded ones.

use serde::de::value::{StrDeserializer, StringDeserializer};
use serde::de::{
    self, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess,
    Visitor,
};
use serde_json::{Map, Value};

use super::config::DecoderConfig;
use super::error::{path_label, DecodeError};
use super::hooks::Target;

type Result<T> = std::result::Result<T, DecodeError>;

pub(crate) struct ValueDeserializer<'c> {
    value: Value,
    config: &'c DecoderConfig,
    path: String,
}

impl<'c> ValueDeserializer<'c> {
    pub(crate) const fn new(value: Value, config: &'c DecoderConfig, path: String) -> Self {
        Self {
            value,
            config,
            path,
        }
    }

    fn hooked(mut self, target: Target) -> Result<Self> {
        let config = self.config;
        for hook in &config.hooks {
            self.value = hook
                .decode(target, self.value)
                .map_err(|message| DecodeError::Hook {
                    path: path_label(&self.path),
                    message,
                })?;
        }
        Ok(self)
    }

    const fn weak(&self) -> bool {
        self.config.weakly_typed_input
    }

    fn as_bool(&self) -> Result<bool> {
        match &self.value {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) if self.weak() => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::String(s) if self.weak() => {
                parse_bool(s).ok_or_else(|| type_error(&self.path, "bool", &self.value))
            }
            other => Err(type_error(&self.path, "bool", other)),
        }
    }

    fn as_i64(&self) -> Result<i64> {
        let coerced = match &self.value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| n.is_f64() && (self.weak() || f.fract() == 0.0))
                    .and_then(float_to_i64)
            }),
            Value::Bool(b) if self.weak() => Some(i64::from(*b)),
            Value::String(s) if self.weak() => parse_or_zero(s),
            _ => None,
        };
        coerced.ok_or_else(|| type_error(&self.path, "int", &self.value))
    }

    fn as_u64(&self) -> Result<u64> {
        let coerced = match &self.value {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| n.is_f64() && (self.weak() || f.fract() == 0.0))
                    .and_then(float_to_u64)
            }),
            Value::Bool(b) if self.weak() => Some(u64::from(*b)),
            Value::String(s) if self.weak() => parse_or_zero(s),
            _ => None,
        };
        coerced.ok_or_else(|| type_error(&self.path, "uint", &self.value))
    }

    fn as_f64(&self) -> Result<f64> {
        let coerced = match &self.value {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) if self.weak() => Some(if *b { 1.0 } else { 0.0 }),
            Value::String(s) if self.weak() => parse_or_zero(s),
            _ => None,
        };
        coerced.ok_or_else(|| type_error(&self.path, "float", &self.value))
    }

    fn into_string(self) -> Result<String> {
        let weak = self.weak();
        match self.value {
            Value::String(s) => Ok(s),
            Value::Bool(b) if weak => Ok(if b { "1" } else { "0" }.to_string()),
            Value::Number(n) if weak => Ok(n.to_string()),
            other => Err(type_error(&self.path, "string", &other)),
        }
    }
}

fn type_error(path: &str, expected: &'static str, found: &Value) -> DecodeError {
    DecodeError::Type {
        path: path_label(path),
        expected,
        found: describe(found),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(items) => format!("sequence of {} items", items.len()),
        Value::Object(map) => format!("map with {} keys", map.len()),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        _ => None,
    }
}

fn parse_or_zero<T: std::str::FromStr + Default>(text: &str) -> Option<T> {
    let text = text.trim();
    if text.is_empty() {
        Some(T::default())
    } else {
        text.parse().ok()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_i64(f: f64) -> Option<i64> {
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f.trunc() as i64)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn float_to_u64(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0 && f < u64::MAX as f64).then(|| f.trunc() as u64)
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn into_map(
    value: Value,
    weak: bool,
    path: &str,
    expected: &'static str,
) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null if weak => Ok(Map::new()),
        Value::Array(items) if weak && items.is_empty() => Ok(Map::new()),
        other => Err(type_error(path, expected, &other)),
    }
}

/// Renames source keys to the struct's declared field names, ignoring case.
fn match_fields(
    map: Map<String, Value>,
    fields: &[&str],
    error_unused: bool,
    path: &str,
) -> Result<Map<String, Value>> {
    let mut matched = Map::new();
    let mut unused = Vec::new();

    for (key, value) in map {
        let field = fields
            .iter()
            .find(|field| **field == key)
            .or_else(|| fields.iter().find(|field| field.eq_ignore_ascii_case(&key)));
        match field {
            Some(field) if **field == key => {
                matched.insert(key, value);
            }
            Some(field) => {
                if !matched.contains_key(*field) {
                    matched.insert((*field).to_string(), value);
                }
            }
            None if error_unused => unused.push(key),
            None => {
                matched.insert(key, value);
            }
        }
    }

    if unused.is_empty() {
        Ok(matched)
    } else {
        Err(DecodeError::UnusedKeys {
            path: path_label(path),
            keys: unused,
        })
    }
}

fn canonical_variant(variants: &[&str], variant: String) -> String {
    if variants.contains(&variant.as_str()) {
        return variant;
    }
    variants
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(&variant))
        .map_or(variant, |candidate| (*candidate).to_string())
}

fn visit_array<'de, V: Visitor<'de>>(
    items: Vec<Value>,
    config: &DecoderConfig,
    path: String,
    visitor: V,
) -> Result<V::Value> {
    let len = items.len();
    let mut access = SeqDecoder {
        iter: items.into_iter(),
        index: 0,
        config,
        path,
    };
    let value = visitor
        .visit_seq(&mut access)
        .map_err(|err| err.with_path(&access.path))?;
    if access.iter.len() == 0 {
        Ok(value)
    } else {
        let err: DecodeError = de::Error::invalid_length(len, &"fewer elements in sequence");
        Err(err.with_path(&access.path))
    }
}

fn visit_object<'de, V: Visitor<'de>>(
    map: Map<String, Value>,
    config: &DecoderConfig,
    path: String,
    visitor: V,
) -> Result<V::Value> {
    let mut access = MapDecoder {
        iter: map.into_iter(),
        pending: None,
        config,
        path,
    };
    visitor
        .visit_map(&mut access)
        .map_err(|err| err.with_path(&access.path))
}

macro_rules! deserialize_number {
    ($($method:ident => $target:ident, $coerce:ident, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                let de = self.hooked(Target::$target)?;
                visitor.$visit(de.$coerce()?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer<'_> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let Self {
            value,
            config,
            path,
        } = self.hooked(Target::Any)?;
        match value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    visitor.visit_u64(u)
                } else if let Some(i) = n.as_i64() {
                    visitor.visit_i64(i)
                } else {
                    visitor.visit_f64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => visit_array(items, config, path, visitor),
            Value::Object(map) => visit_object(map, config, path, visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let de = self.hooked(Target::Bool)?;
        visitor.visit_bool(de.as_bool()?)
    }

    deserialize_number! {
        deserialize_i8 => Signed, as_i64, visit_i64;
        deserialize_i16 => Signed, as_i64, visit_i64;
        deserialize_i32 => Signed, as_i64, visit_i64;
        deserialize_i64 => Signed, as_i64, visit_i64;
        deserialize_u8 => Unsigned, as_u64, visit_u64;
        deserialize_u16 => Unsigned, as_u64, visit_u64;
        deserialize_u32 => Unsigned, as_u64, visit_u64;
        deserialize_u64 => Unsigned, as_u64, visit_u64;
        deserialize_f32 => Float, as_f64, visit_f64;
        deserialize_f64 => Float, as_f64, visit_f64;
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let de = self.hooked(Target::Str)?;
        let path = de.path.clone();
        let text = de.into_string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(type_error(&path, "char", &Value::String(text))),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let de = self.hooked(Target::Str)?;
        visitor.visit_string(de.into_string()?)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_any(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_any(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if self.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let de = self.hooked(Target::Unit)?;
        match de.value {
            Value::Null => visitor.visit_unit(),
            other => Err(type_error(&de.path, "unit", &other)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let de = self.hooked(Target::Seq)?;
        let weak = de.weak();
        let Self {
            value,
            config,
            path,
        } = de;
        let items = match value {
            Value::Array(items) => items,
            Value::Null if weak => Vec::new(),
            Value::Object(map) if weak && map.is_empty() => Vec::new(),
            scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_)) if weak => {
                vec![scalar]
            }
            other => return Err(type_error(&path, "sequence", &other)),
        };
        visit_array(items, config, path, visitor)
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let de = self.hooked(Target::Map)?;
        let weak = de.weak();
        let Self {
            value,
            config,
            path,
        } = de;
        let map = into_map(value, weak, &path, "map")?;
        visit_object(map, config, path, visitor)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let de = self.hooked(Target::Struct(name))?;
        let weak = de.weak();
        let Self {
            value,
            config,
            path,
        } = de;
        let map = into_map(value, weak, &path, "struct")?;
        let map = match_fields(map, fields, config.error_unused, &path)?;
        visit_object(map, config, path, visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let Self {
            value,
            config,
            path,
        } = self.hooked(Target::Enum(name))?;
        let (variant, content) = match value {
            Value::String(variant) => (variant, None),
            Value::Object(map) => {
                let keys = map.len();
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, content)), None) => (variant, Some(content)),
                    _ => {
                        return Err(DecodeError::Type {
                            path: path_label(&path),
                            expected: "enum",
                            found: format!("map with {keys} keys"),
                        })
                    }
                }
            }
            other => return Err(type_error(&path, "enum", &other)),
        };
        visitor.visit_enum(EnumDecoder {
            variant: canonical_variant(variants, variant),
            content,
            config,
            path,
        })
    }

    // Field names bypass hooks; only values are rewritten.
    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::String(s) => visitor.visit_string(s),
            other => Err(type_error(&self.path, "identifier", &other)),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

struct SeqDecoder<'c> {
    iter: std::vec::IntoIter<Value>,
    index: usize,
    config: &'c DecoderConfig,
    path: String,
}

impl<'de> SeqAccess<'de> for SeqDecoder<'_> {
    type Error = DecodeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>> {
        let Some(value) = self.iter.next() else {
            return Ok(None);
        };
        let path = format!("{}[{}]", self.path, self.index);
        self.index += 1;
        seed.deserialize(ValueDeserializer::new(value, self.config, path.clone()))
            .map(Some)
            .map_err(|err| err.with_path(&path))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDecoder<'c> {
    iter: serde_json::map::IntoIter,
    pending: Option<(String, Value)>,
    config: &'c DecoderConfig,
    path: String,
}

impl<'de> MapAccess<'de> for MapDecoder<'_> {
    type Error = DecodeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };
        let path = child_path(&self.path, &key);
        let decoded = seed.deserialize(KeyDeserializer {
            key,
            path: path.clone(),
        })?;
        self.pending = Some((path, value));
        Ok(Some(decoded))
    }

    fn next_value_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<S::Value> {
        let (path, value) = self
            .pending
            .take()
            .ok_or_else(|| de::Error::custom("map value requested before its key"))?;
        seed.deserialize(ValueDeserializer::new(value, self.config, path.clone()))
            .map_err(|err| err.with_path(&path))
    }
}

/// Map keys as written in the source; hooks and weak typing never apply.
struct KeyDeserializer {
    key: String,
    path: String,
}

impl KeyDeserializer {
    fn invalid(self, expected: &'static str) -> DecodeError {
        type_error(&self.path, expected, &Value::String(self.key))
    }
}

macro_rules! deserialize_key_number {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                match self.key.parse::<$ty>() {
                    Ok(number) => visitor.$visit(number),
                    Err(_) => Err(self.invalid(stringify!($ty))),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.key)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.key.parse() {
            Ok(b) => visitor.visit_bool(b),
            Err(_) => Err(self.invalid("bool")),
        }
    }

    deserialize_key_number! {
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_f32 => f32, visit_f32;
        deserialize_f64 => f64, visit_f64;
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let variant: StringDeserializer<DecodeError> =
            canonical_variant(variants, self.key).into_deserializer();
        visitor.visit_enum(variant)
    }

    serde::forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct EnumDecoder<'c> {
    variant: String,
    content: Option<Value>,
    config: &'c DecoderConfig,
    path: String,
}

impl<'c> EnumDecoder<'c> {
    fn into_content(self, expected: &'static str) -> Result<ValueDeserializer<'c>> {
        match self.content {
            Some(value) => Ok(ValueDeserializer::new(value, self.config, self.path)),
            None => Err(type_error(&self.path, expected, &Value::String(self.variant))),
        }
    }
}

impl<'de> EnumAccess<'de> for EnumDecoder<'_> {
    type Error = DecodeError;
    type Variant = Self;

    fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self)> {
        let deserializer: StrDeserializer<'_, DecodeError> = self.variant.as_str().into_deserializer();
        let variant = seed
            .deserialize(deserializer)
            .map_err(|err| err.with_path(&self.path))?;
        Ok((variant, self))
    }
}

impl<'de> VariantAccess<'de> for EnumDecoder<'_> {
    type Error = DecodeError;

    fn unit_variant(self) -> Result<()> {
        match self.content {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(type_error(&self.path, "unit variant", &other)),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(self.into_content("newtype variant")?)
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(self.into_content("tuple variant")?, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        de::Deserializer::deserialize_struct(
            self.into_content("struct variant")?,
            "",
            fields,
            visitor,
        )
    }
}

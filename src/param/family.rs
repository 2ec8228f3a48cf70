//! Per-type behavior shared by parameters with the same representation
//!
//! Booleans, unsigned and signed integers and bitmasks are all machine
//! integers and share [`SimpleFamily`]. Strings have [`StringFamily`].
//! Key bindings only have a placeholder, [`KeyBindingFamily`], which refuses
//! every operation without taking the process down.

use std::fmt;

use tracing::warn;

use super::{ParamError, Parameter, ParameterType, ParameterValue};
use crate::constants::limits::MAX_STRING;
use crate::constants::text::UNSET_PLACEHOLDER;
use crate::inform::target;

/// Outcome of a successful [`TypeFamily::assign`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Changed,
    /// Identical value on a configured registry, nothing was touched
    Unchanged,
}

pub trait TypeFamily: Sync {
    /// Check `value` against the type and the `[min, max]` bounds
    fn verify(
        &self,
        kind: ParameterType,
        min: i64,
        max: i64,
        value: &ParameterValue,
    ) -> Result<(), ParamError>;

    /// Store `value` in `param`, leaving it untouched on failure
    fn assign(
        &self,
        param: &mut Parameter,
        value: ParameterValue,
        configured: bool,
    ) -> Result<Assignment, ParamError>;

    fn render(&self, kind: ParameterType, value: &ParameterValue, out: &mut dyn fmt::Write) -> fmt::Result;

    /// Turn the value half of a `key=value` line into a value
    fn parse(&self, kind: ParameterType, text: &str) -> Result<ParameterValue, ParamError>;
}

pub struct SimpleFamily;
pub struct StringFamily;
pub struct KeyBindingFamily;

static SIMPLE: SimpleFamily = SimpleFamily;
static STRING: StringFamily = StringFamily;
static KEY_BINDING: KeyBindingFamily = KeyBindingFamily;

impl ParameterType {
    pub fn family(self) -> &'static dyn TypeFamily {
        match self {
            ParameterType::Boolean
            | ParameterType::UnsignedInteger
            | ParameterType::SignedInteger
            | ParameterType::Bitmask => &SIMPLE,
            ParameterType::String => &STRING,
            ParameterType::KeyBinding => &KEY_BINDING,
        }
    }
}

fn mismatch(kind: ParameterType, value: &ParameterValue) -> ParamError {
    warn!(target: target::CONFIG, kind = %kind, value = ?value, "value does not match the parameter type");
    ParamError::TypeMismatch {
        kind,
        value: value.clone(),
    }
}

impl TypeFamily for SimpleFamily {
    fn verify(
        &self,
        kind: ParameterType,
        min: i64,
        max: i64,
        value: &ParameterValue,
    ) -> Result<(), ParamError> {
        assert!(kind.is_integer(), "{kind} dispatched to the integer family");
        if value.is_unset() {
            warn!(target: target::CONFIG, kind = %kind, "integer parameter without a value");
            return Err(ParamError::UnsetValue);
        }
        if !kind.accepts(value) {
            return Err(mismatch(kind, value));
        }
        let Some(v) = value.as_integer() else {
            return Err(mismatch(kind, value));
        };
        if v < min || v > max {
            warn!(target: target::CONFIG, min, value = v, max, "value of integer outside of range");
            return Err(ParamError::OutOfRange { value: v, min, max });
        }
        Ok(())
    }

    fn assign(
        &self,
        param: &mut Parameter,
        value: ParameterValue,
        configured: bool,
    ) -> Result<Assignment, ParamError> {
        if configured && param.value == value {
            return Ok(Assignment::Unchanged);
        }
        self.verify(param.kind, param.min, param.max, &value)?;
        param.value = value;
        Ok(Assignment::Changed)
    }

    fn render(&self, kind: ParameterType, value: &ParameterValue, out: &mut dyn fmt::Write) -> fmt::Result {
        match (kind, value) {
            (ParameterType::Boolean, ParameterValue::Bool(b)) => write!(out, "{b}"),
            (ParameterType::SignedInteger, ParameterValue::Int(i)) => write!(out, "{i}"),
            (ParameterType::UnsignedInteger, ParameterValue::Uint(u)) => write!(out, "{u}"),
            (ParameterType::Bitmask, ParameterValue::Uint(u)) => write!(out, "0x{u:08X}"),
            (_, ParameterValue::Unset) => out.write_str(UNSET_PLACEHOLDER),
            (kind, value) => panic!("{kind} parameter holds {value:?}"),
        }
    }

    fn parse(&self, kind: ParameterType, text: &str) -> Result<ParameterValue, ParamError> {
        let text = text.trim();
        let parsed = match kind {
            ParameterType::Boolean => parse_bool(text).map(ParameterValue::Bool),
            ParameterType::SignedInteger => parse_integer(text).and_then(|n| {
                i32::try_from(n)
                    .map(ParameterValue::Int)
                    .map_err(|_| ParamError::NumeralOutOfRange(text.to_string()))
            }),
            ParameterType::UnsignedInteger | ParameterType::Bitmask => parse_integer(text).and_then(|n| {
                u32::try_from(n)
                    .map(ParameterValue::Uint)
                    .map_err(|_| ParamError::NumeralOutOfRange(text.to_string()))
            }),
            ParameterType::String | ParameterType::KeyBinding => {
                panic!("{kind} dispatched to the integer family")
            }
        };
        parsed.inspect_err(|e| warn!(target: target::CONFIG, kind = %kind, text, error = %e, "unable to parse value"))
    }
}

fn parse_bool(text: &str) -> Result<bool, ParamError> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ParamError::InvalidBoolean(text.to_string())),
    }
}

/// Integer literal with C-style base detection: `0x` hex, leading `0` octal,
/// decimal otherwise. The whole input must be consumed.
fn parse_integer(text: &str) -> Result<i64, ParamError> {
    if text.is_empty() {
        return Err(ParamError::EmptyNumeral);
    }
    let (negative, unsigned) = match text.as_bytes()[0] {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let hex_body = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_hexdigit()));
    let (radix, body) = match hex_body {
        Some(rest) => (16, rest),
        None if unsigned.starts_with('0') => (8, unsigned),
        None => (10, unsigned),
    };

    let end = body.find(|c: char| !c.is_digit(radix)).unwrap_or(body.len());
    let (digits, rest) = body.split_at(end);
    if !rest.is_empty() {
        return Err(ParamError::TrailingGarbage(text.to_string()));
    }
    if digits.is_empty() {
        return Err(ParamError::EmptyNumeral);
    }

    let magnitude = i64::from_str_radix(digits, radix)
        .map_err(|_| ParamError::NumeralOutOfRange(text.to_string()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

impl StringFamily {
    fn limit(max: i64) -> usize {
        usize::try_from(max).unwrap_or(0).max(MAX_STRING)
    }
}

/// Content that would not read back from a rendered configuration file
fn unrenderable(s: &str) -> Option<&'static str> {
    if s.contains('\0') {
        Some("an embedded NUL byte")
    } else if s.contains(['\n', '\r']) {
        Some("a line break")
    } else if s.contains("/*") || s.contains("*/") {
        Some("a comment delimiter")
    } else if s.trim() != s {
        Some("surrounding whitespace")
    } else {
        None
    }
}

impl TypeFamily for StringFamily {
    fn verify(
        &self,
        kind: ParameterType,
        _min: i64,
        max: i64,
        value: &ParameterValue,
    ) -> Result<(), ParamError> {
        assert_eq!(kind, ParameterType::String);
        let s = match value {
            ParameterValue::Str(s) => s,
            ParameterValue::Unset => {
                warn!(target: target::CONFIG, "missing string when verifying a string");
                return Err(ParamError::UnsetValue);
            }
            other => return Err(mismatch(kind, other)),
        };
        if let Some(reason) = unrenderable(s) {
            warn!(target: target::CONFIG, reason, "string cannot be stored");
            return Err(ParamError::MalformedString(reason));
        }
        let limit = Self::limit(max);
        if s.len() >= limit {
            warn!(target: target::CONFIG, len = s.len(), limit, "string is larger than expected");
            return Err(ParamError::StringTooLong { len: s.len(), limit });
        }
        Ok(())
    }

    fn assign(
        &self,
        param: &mut Parameter,
        value: ParameterValue,
        _configured: bool,
    ) -> Result<Assignment, ParamError> {
        if !matches!(value, ParameterValue::Str(_)) {
            return Err(mismatch(param.kind, &value));
        }
        let previous = std::mem::replace(&mut param.value, value);
        if let Err(e) = self.verify(param.kind, param.min, param.max, &param.value) {
            param.value = previous;
            return Err(e);
        }
        Ok(Assignment::Changed)
    }

    fn render(&self, _kind: ParameterType, value: &ParameterValue, out: &mut dyn fmt::Write) -> fmt::Result {
        match value {
            ParameterValue::Str(s) => out.write_str(s),
            ParameterValue::Unset => out.write_str(UNSET_PLACEHOLDER),
            other => panic!("string parameter holds {other:?}"),
        }
    }

    fn parse(&self, _kind: ParameterType, text: &str) -> Result<ParameterValue, ParamError> {
        Ok(ParameterValue::Str(text.trim().to_string()))
    }
}

impl KeyBindingFamily {
    fn not_implemented(&self) -> ParamError {
        warn!(target: target::NOTIMPLEMENTED, "a function that's not yet implemented was accessed: key bindings");
        ParamError::NotImplemented("key bindings")
    }
}

impl TypeFamily for KeyBindingFamily {
    fn verify(&self, _: ParameterType, _: i64, _: i64, _: &ParameterValue) -> Result<(), ParamError> {
        Err(self.not_implemented())
    }

    fn assign(&self, _: &mut Parameter, _: ParameterValue, _: bool) -> Result<Assignment, ParamError> {
        Err(self.not_implemented())
    }

    fn render(&self, _: ParameterType, _: &ParameterValue, out: &mut dyn fmt::Write) -> fmt::Result {
        let _ = self.not_implemented();
        out.write_str(UNSET_PLACEHOLDER)
    }

    fn parse(&self, _: ParameterType, _: &str) -> Result<ParameterValue, ParamError> {
        Err(self.not_implemented())
    }
}

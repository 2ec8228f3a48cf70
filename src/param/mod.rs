//! Typed, origin-tracked parameter registry
//!
//! Every tunable of the daemon is a [`Parameter`]: a named value of one
//! [`ParameterType`] with compiled-in default, bounds, and the [`Source`]
//! that last supplied it. Values arrive from the defaults, the configuration
//! file, the command line, or interactively, and a lower-priority source can
//! never overwrite a higher-priority one.

use std::fmt;

pub mod builtin;
pub mod error;
pub mod family;
pub mod registry;
pub mod render;

pub use error::ParamError;
pub use registry::Registry;
pub use render::ShowFlags;

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Boolean,
    UnsignedInteger,
    SignedInteger,
    Bitmask,
    String,
    /// Declared but not functional yet
    KeyBinding,
}

impl ParameterType {
    pub const fn name(self) -> &'static str {
        match self {
            ParameterType::Boolean => "Boolean",
            ParameterType::UnsignedInteger => "Unsigned integer",
            ParameterType::SignedInteger => "Signed integer",
            ParameterType::Bitmask => "Bitmask",
            ParameterType::String => "Character string",
            ParameterType::KeyBinding => "Key binding",
        }
    }

    /// Types whose family is only a placeholder
    pub const fn is_stub(self) -> bool {
        matches!(self, ParameterType::KeyBinding)
    }

    /// Types stored as a machine integer and bounded by min/max
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            ParameterType::Boolean
                | ParameterType::UnsignedInteger
                | ParameterType::SignedInteger
                | ParameterType::Bitmask
        )
    }

    /// Whether `value` is the variant this type stores. `Unset` fits any type.
    pub fn accepts(self, value: &ParameterValue) -> bool {
        matches!(
            (self, value),
            (_, ParameterValue::Unset)
                | (ParameterType::Boolean, ParameterValue::Bool(_))
                | (ParameterType::SignedInteger, ParameterValue::Int(_))
                | (
                    ParameterType::UnsignedInteger | ParameterType::Bitmask,
                    ParameterValue::Uint(_)
                )
                | (ParameterType::String, ParameterValue::Str(_))
        )
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage for a parameter value. The live variant always matches the
/// parameter's [`ParameterType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Bool(bool),
    Int(i32),
    /// Unsigned integers and bitmasks
    Uint(u32),
    Str(String),
    /// Nothing stored yet
    Unset,
}

impl ParameterValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ParameterValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ParameterValue::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Widened integer view used for bounds checks
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ParameterValue::Bool(b) => Some(i64::from(*b)),
            ParameterValue::Int(i) => Some(i64::from(*i)),
            ParameterValue::Uint(u) => Some(i64::from(*u)),
            ParameterValue::Str(_) | ParameterValue::Unset => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, ParameterValue::Unset)
    }
}

/// Where a value came from. Ordered by precedence, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    Default,
    ConfigFile,
    CommandLine,
    Interactive,
}

impl Source {
    pub const fn label(self) -> &'static str {
        match self {
            Source::Default => "default",
            Source::ConfigFile => "config file",
            Source::CommandLine => "command line",
            Source::Interactive => "interactive",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dense index of a parameter in its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParamId(usize);

impl ParamId {
    pub(in crate::param) const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// One parameter, or every parameter in index order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    One(ParamId),
    All,
}

impl From<ParamId> for Target {
    fn from(id: ParamId) -> Self {
        Target::One(id)
    }
}

/// A named, typed, bounded setting with tracked provenance
#[derive(Debug, Clone)]
pub struct Parameter {
    name: &'static str,
    description: &'static [&'static str],
    kind: ParameterType,
    value: ParameterValue,
    default_value: ParameterValue,
    min: i64,
    max: i64,
    origin: Source,
}

impl Parameter {
    fn declare(
        name: &'static str,
        description: &'static [&'static str],
        kind: ParameterType,
        default_value: ParameterValue,
        min: i64,
        max: i64,
    ) -> Self {
        Self {
            name,
            description,
            kind,
            value: default_value.clone(),
            default_value,
            min,
            max,
            origin: Source::Default,
        }
    }

    pub fn boolean(name: &'static str, description: &'static [&'static str], default: bool) -> Self {
        Self::declare(name, description, ParameterType::Boolean, ParameterValue::Bool(default), 0, 1)
    }

    pub fn unsigned(
        name: &'static str,
        description: &'static [&'static str],
        default: u32,
        min: u32,
        max: u32,
    ) -> Self {
        Self::declare(
            name,
            description,
            ParameterType::UnsignedInteger,
            ParameterValue::Uint(default),
            min.into(),
            max.into(),
        )
    }

    pub fn signed(
        name: &'static str,
        description: &'static [&'static str],
        default: i32,
        min: i32,
        max: i32,
    ) -> Self {
        Self::declare(
            name,
            description,
            ParameterType::SignedInteger,
            ParameterValue::Int(default),
            min.into(),
            max.into(),
        )
    }

    /// Bitmasks span the whole 32-bit range
    pub fn bitmask(name: &'static str, description: &'static [&'static str], default: u32) -> Self {
        Self::declare(
            name,
            description,
            ParameterType::Bitmask,
            ParameterValue::Uint(default),
            0,
            u32::MAX.into(),
        )
    }

    pub fn string(name: &'static str, description: &'static [&'static str], default: &str) -> Self {
        Self::declare(
            name,
            description,
            ParameterType::String,
            ParameterValue::Str(default.to_string()),
            0,
            crate::constants::limits::MAX_STRING as i64,
        )
    }

    pub fn key_binding(name: &'static str, description: &'static [&'static str]) -> Self {
        Self::declare(name, description, ParameterType::KeyBinding, ParameterValue::Unset, 0, 0)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static [&'static str] {
        self.description
    }

    pub fn kind(&self) -> ParameterType {
        self.kind
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }

    pub fn default_value(&self) -> &ParameterValue {
        &self.default_value
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn origin(&self) -> Source {
        self.origin
    }
}

//! Parameter error types

use thiserror::Error;

use super::{ParameterType, ParameterValue, Source};

/// Everything that can refuse a parameter mutation or lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("{name} was set from {current}, a {requested} value may not override it")]
    PrecedenceRejected {
        name: &'static str,
        current: Source,
        requested: Source,
    },

    #[error("value {value} outside of range ({min} <= value <= {max})")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("string of {len} bytes does not fit within {limit} bytes")]
    StringTooLong { len: usize, limit: usize },

    #[error("string contains {0}")]
    MalformedString(&'static str),

    #[error("a {kind} parameter cannot hold {value:?}")]
    TypeMismatch {
        kind: ParameterType,
        value: ParameterValue,
    },

    #[error("value has never been set")]
    UnsetValue,

    #[error("missing '=' separator in {0:?}")]
    MissingSeparator(String),

    #[error("parameter key is longer than {limit} bytes")]
    KeyTooLong { limit: usize },

    #[error("unknown parameter {0:?}")]
    UnknownKey(String),

    #[error("no parameter #{0} in this registry")]
    UnknownId(usize),

    #[error("invalid boolean {0:?}, expected true, false, 1 or 0")]
    InvalidBoolean(String),

    #[error("empty numeral")]
    EmptyNumeral,

    #[error("trailing garbage after numeral in {0:?}")]
    TrailingGarbage(String),

    #[error("numeral {0:?} is out of range for the parameter type")]
    NumeralOutOfRange(String),

    #[error("{0} are not implemented")]
    NotImplemented(&'static str),

    #[error("parameter #{index} is malformed: {reason}")]
    InvalidDeclaration { index: usize, reason: &'static str },
}

impl ParamError {
    /// Failures caused by the text of a `key=value` line rather than the value it carried
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            ParamError::MissingSeparator(_) | ParamError::KeyTooLong { .. } | ParamError::UnknownKey(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_display() {
        let error = ParamError::PrecedenceRejected {
            name: "sync",
            current: Source::CommandLine,
            requested: Source::ConfigFile,
        };
        assert_eq!(
            error.to_string(),
            "sync was set from command line, a config file value may not override it"
        );
    }

    #[test]
    fn test_is_syntax() {
        assert!(ParamError::MissingSeparator("syncfalse".into()).is_syntax());
        assert!(ParamError::UnknownKey("bogus".into()).is_syntax());
        assert!(!ParamError::EmptyNumeral.is_syntax());
        assert!(!ParamError::OutOfRange { value: 2, min: 0, max: 1 }.is_syntax());
    }
}

//! The parameter registry
//!
//! Owns the fixed table of parameters and is the only way to read or change
//! them. Every mutation passes through [`Registry::set`], which arbitrates
//! precedence between sources and re-verifies the parameter afterwards.

use tracing::{debug, info, warn};

use super::family::Assignment;
use super::{ParamError, ParamId, Parameter, ParameterValue, Source, Target, builtin};
use crate::constants::limits::MAX_STRING;
use crate::constants::text::DEFAULT_KEYWORD;
use crate::inform::target;

#[derive(Debug, Clone)]
pub struct Registry {
    params: Vec<Parameter>,
    /// Set once bootstrap has applied every default
    configured: bool,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Registry holding the built-in parameters
    pub fn new() -> Self {
        Self::from_parameters(builtin::parameters())
    }

    pub fn from_parameters(params: Vec<Parameter>) -> Self {
        Self {
            params,
            configured: false,
        }
    }

    /// Reset everything to its default and leave the bootstrap phase.
    /// Must run before any other mutation.
    /// Placeholder parameters are left unset and do not hold the rest back.
    pub fn bootstrap(&mut self) -> Result<(), ParamError> {
        let mut first_error = None;
        for index in 0..self.params.len() {
            let param = &self.params[index];
            if param.kind.is_stub() {
                warn!(target: target::NOTIMPLEMENTED, name = param.name, kind = %param.kind, "placeholder parameter left unset");
                continue;
            }
            if let Err(e) = self.set_default(Target::One(ParamId::new(index)), Source::Default) {
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }
        self.verify(Target::All)?;
        self.configured = true;
        info!(target: target::CONFIG, count = self.params.len(), "parameters configured");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamId, &Parameter)> {
        self.params.iter().enumerate().map(|(i, p)| (ParamId::new(i), p))
    }

    /// Panics if `id` belongs to a different table
    pub fn parameter(&self, id: ParamId) -> &Parameter {
        &self.params[id.index()]
    }

    /// Case-insensitive lookup by name
    pub fn find(&self, key: &str) -> Option<ParamId> {
        self.params
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(key))
            .map(ParamId::new)
    }

    pub fn get(&self, id: ParamId) -> &ParameterValue {
        let param = self.parameter(id);
        if !param.kind.is_integer() && param.value.is_unset() {
            warn!(target: target::CONFIG, name = param.name, "reading a parameter that has no value");
        }
        &param.value
    }

    /// The single mutation gate
    pub fn set(&mut self, id: ParamId, value: ParameterValue, origin: Source) -> Result<(), ParamError> {
        let configured = self.configured;
        let Some(param) = self.params.get_mut(id.index()) else {
            warn!(target: target::CONFIG, index = id.index(), "no such parameter");
            return Err(ParamError::UnknownId(id.index()));
        };

        if origin < param.origin {
            info!(
                target: target::CONFIG_CHANGES,
                name = param.name,
                current = %param.origin,
                requested = %origin,
                "ignoring value from a lower-priority source"
            );
            return Err(ParamError::PrecedenceRejected {
                name: param.name,
                current: param.origin,
                requested: origin,
            });
        }

        match param.kind.family().assign(param, value, configured) {
            Ok(Assignment::Changed) => {
                param.origin = origin;
                info!(
                    target: target::CONFIG_CHANGES,
                    name = param.name,
                    value = %param.value_text(),
                    source = %origin,
                    "parameter set"
                );
            }
            Ok(Assignment::Unchanged) => {
                debug!(target: target::CONFIG_CHANGES, name = param.name, source = %origin, "parameter unchanged");
            }
            Err(e) => {
                warn!(target: target::CONFIG_CHANGES, name = param.name, source = %origin, error = %e, "unable to set parameter");
                return Err(e);
            }
        }

        assert!(
            self.verify(Target::One(id)).is_ok(),
            "parameter #{} failed verification after a successful set",
            id.index()
        );
        Ok(())
    }

    /// Put one or all parameters back to their compiled-in default. This goes
    /// through [`Registry::set`], so `origin` is subject to precedence and is
    /// recorded as the new origin. For `All` every parameter is attempted and
    /// the first failure is returned.
    pub fn set_default(&mut self, target: Target, origin: Source) -> Result<(), ParamError> {
        match target {
            Target::One(id) => {
                let Some(param) = self.params.get(id.index()) else {
                    return Err(ParamError::UnknownId(id.index()));
                };
                let default = param.default_value.clone();
                self.set(id, default, origin)
            }
            Target::All => {
                let mut first_error = None;
                for index in 0..self.params.len() {
                    if let Err(e) = self.set_default(Target::One(ParamId::new(index)), origin) {
                        first_error.get_or_insert(e);
                    }
                }
                first_error.map_or(Ok(()), Err)
            }
        }
    }

    /// Structural and per-type self-check
    pub fn verify(&self, target: Target) -> Result<(), ParamError> {
        match target {
            Target::One(id) => self.verify_one(id),
            Target::All => {
                let mut first_error = None;
                for (id, _) in self.iter() {
                    if let Err(e) = self.verify_one(id) {
                        first_error.get_or_insert(e);
                    }
                }
                if let Some(e) = self.check_unique_names() {
                    first_error.get_or_insert(e);
                }
                first_error.map_or(Ok(()), Err)
            }
        }
    }

    fn verify_one(&self, id: ParamId) -> Result<(), ParamError> {
        let Some(param) = self.params.get(id.index()) else {
            return Err(ParamError::UnknownId(id.index()));
        };
        let malformed = |reason: &'static str| {
            warn!(target: target::CONFIG, index = id.index(), name = param.name, reason, "malformed parameter");
            ParamError::InvalidDeclaration {
                index: id.index(),
                reason,
            }
        };

        if param.name.is_empty() {
            return Err(malformed("empty name"));
        }
        if param.description.is_empty() || param.description.iter().all(|line| line.is_empty()) {
            return Err(malformed("missing description"));
        }
        if param.description.iter().any(|line| line.contains("*/")) {
            return Err(malformed("description closes a comment"));
        }
        if param.min > param.max {
            return Err(malformed("min exceeds max"));
        }
        if param.kind.is_stub() {
            return Ok(());
        }

        let family = param.kind.family();
        family
            .verify(param.kind, param.min, param.max, &param.default_value)
            .and_then(|()| family.verify(param.kind, param.min, param.max, &param.value))
            .inspect_err(|e| {
                warn!(
                    target: target::CONFIG,
                    name = param.name,
                    kind = %param.kind,
                    error = %e,
                    "parameter verification failed"
                )
            })
    }

    fn check_unique_names(&self) -> Option<ParamError> {
        self.iter().find_map(|(id, param)| {
            let first = self.find(param.name)?;
            (first != id).then(|| {
                warn!(target: target::CONFIG, name = param.name, index = id.index(), "duplicate parameter name");
                ParamError::InvalidDeclaration {
                    index: id.index(),
                    reason: "duplicate name",
                }
            })
        })
    }

    /// Apply one `key=value` line. The value `default` resets the key to its
    /// compiled-in default instead of being parsed.
    pub fn parse_text(&mut self, line: &str, origin: Source) -> Result<ParamId, ParamError> {
        let Some((key, value)) = line.split_once('=') else {
            warn!(target: target::CONFIG, line, "missing '=' in parameter assignment");
            return Err(ParamError::MissingSeparator(line.trim().to_string()));
        };

        let key = key.trim();
        if key.len() >= MAX_STRING {
            warn!(target: target::CONFIG, len = key.len(), "parameter key is too long");
            return Err(ParamError::KeyTooLong { limit: MAX_STRING });
        }
        let Some(id) = self.find(key) else {
            warn!(target: target::CONFIG, key, "unknown parameter");
            return Err(ParamError::UnknownKey(key.to_string()));
        };

        let value = value.trim();
        if value.eq_ignore_ascii_case(DEFAULT_KEYWORD) {
            self.set_default(Target::One(id), origin)?;
            return Ok(id);
        }

        let kind = self.parameter(id).kind;
        let parsed = kind.family().parse(kind, value)?;
        self.set(id, parsed, origin)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParameterType;

    fn configured() -> Registry {
        let mut registry = Registry::new();
        registry.bootstrap().expect("built-in parameters verify");
        registry
    }

    #[test]
    fn test_bootstrap_leaves_everything_at_default() {
        let registry = configured();
        assert!(registry.configured);
        for (_, p) in registry.iter() {
            assert_eq!(p.origin(), Source::Default, "{}", p.name());
            assert_eq!(p.value(), p.default_value(), "{}", p.name());
        }
        assert!(registry.verify(Target::All).is_ok());
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let registry = configured();
        assert_eq!(registry.find("SYNC"), Some(ParamId::SYNC));
        assert_eq!(registry.find("Border_Width"), Some(ParamId::BORDER_WIDTH));
        assert_eq!(registry.find("bogus"), None);
    }

    #[test]
    fn test_set_accepts_exactly_the_bounds() {
        let mut registry = configured();
        let id = ParamId::SNAP_DISTANCE;
        for v in [-1, 0, 500, 1000] {
            assert!(registry.set(id, ParameterValue::Int(v), Source::ConfigFile).is_ok(), "{v}");
            assert_eq!(registry.get(id), &ParameterValue::Int(v));
        }
        for v in [-2, 1001, i32::MIN, i32::MAX] {
            let before = registry.parameter(id).clone();
            assert!(
                matches!(
                    registry.set(id, ParameterValue::Int(v), Source::Interactive),
                    Err(ParamError::OutOfRange { .. })
                ),
                "{v}"
            );
            assert_eq!(registry.parameter(id).value(), before.value());
            assert_eq!(registry.parameter(id).origin(), before.origin());
        }
    }

    #[test]
    fn test_set_rejects_wrong_variant() {
        let mut registry = configured();
        let result = registry.set(ParamId::SYNC, ParameterValue::Uint(1), Source::CommandLine);
        assert!(matches!(result, Err(ParamError::TypeMismatch { .. })));
        assert_eq!(registry.get(ParamId::SYNC), &ParameterValue::Bool(false));
        assert_eq!(registry.parameter(ParamId::SYNC).origin(), Source::Default);
    }

    #[test]
    fn test_precedence() {
        let mut registry = configured();
        let id = ParamId::BORDER_WIDTH;
        registry.set(id, ParameterValue::Uint(3), Source::ConfigFile).unwrap();

        assert_eq!(
            registry.set(id, ParameterValue::Uint(4), Source::Default),
            Err(ParamError::PrecedenceRejected {
                name: "border_width",
                current: Source::ConfigFile,
                requested: Source::Default,
            })
        );
        assert_eq!(registry.get(id), &ParameterValue::Uint(3));

        registry.set(id, ParameterValue::Uint(5), Source::CommandLine).unwrap();
        assert_eq!(registry.get(id), &ParameterValue::Uint(5));
        assert_eq!(registry.parameter(id).origin(), Source::CommandLine);

        registry.set(id, ParameterValue::Uint(6), Source::Interactive).unwrap();
        assert_eq!(registry.get(id), &ParameterValue::Uint(6));
        assert_eq!(registry.parameter(id).origin(), Source::Interactive);
    }

    #[test]
    fn test_same_source_may_overwrite() {
        let mut registry = configured();
        registry.set(ParamId::SYNC, ParameterValue::Bool(true), Source::ConfigFile).unwrap();
        registry.set(ParamId::SYNC, ParameterValue::Bool(false), Source::ConfigFile).unwrap();
        assert_eq!(registry.get(ParamId::SYNC), &ParameterValue::Bool(false));
    }

    #[test]
    fn test_identical_value_keeps_origin() {
        let mut registry = configured();
        let id = ParamId::BORDER_WIDTH;
        registry.set(id, ParameterValue::Uint(7), Source::ConfigFile).unwrap();

        assert!(registry.set(id, ParameterValue::Uint(7), Source::Interactive).is_ok());
        assert_eq!(registry.parameter(id).origin(), Source::ConfigFile);
    }

    #[test]
    fn test_identical_value_before_bootstrap_takes_origin() {
        let mut registry = Registry::new();
        registry.set(ParamId::SYNC, ParameterValue::Bool(false), Source::ConfigFile).unwrap();
        assert_eq!(registry.parameter(ParamId::SYNC).origin(), Source::ConfigFile);
    }

    #[test]
    fn test_set_default_records_requesting_origin() {
        let mut registry = configured();
        registry.parse_text("sync=true", Source::ConfigFile).unwrap();

        assert_eq!(registry.parse_text("sync=default", Source::Interactive), Ok(ParamId::SYNC));
        assert_eq!(registry.get(ParamId::SYNC), &ParameterValue::Bool(false));
        assert_eq!(registry.parameter(ParamId::SYNC).origin(), Source::Interactive);
    }

    #[test]
    fn test_set_default_is_subject_to_precedence() {
        let mut registry = configured();
        registry.parse_text("sync=true", Source::CommandLine).unwrap();

        let result = registry.parse_text("sync=DEFAULT", Source::ConfigFile);
        assert!(matches!(result, Err(ParamError::PrecedenceRejected { .. })));
        assert_eq!(registry.get(ParamId::SYNC), &ParameterValue::Bool(true));
    }

    #[test]
    fn test_set_default_all_attempts_every_parameter() {
        let mut registry = configured();
        registry.parse_text("sync=true", Source::Interactive).unwrap();
        registry.parse_text("border_width=9", Source::ConfigFile).unwrap();

        // sync outranks the config file, border_width does not
        let result = registry.set_default(Target::All, Source::ConfigFile);
        assert!(matches!(result, Err(ParamError::PrecedenceRejected { name: "sync", .. })));
        assert_eq!(registry.get(ParamId::SYNC), &ParameterValue::Bool(true));
        assert_eq!(registry.get(ParamId::BORDER_WIDTH), &ParameterValue::Uint(1));
    }

    #[test]
    fn test_parse_text_outcomes() {
        let mut registry = configured();
        let before: Vec<_> = registry.iter().map(|(_, p)| p.value().clone()).collect();

        assert_eq!(
            registry.parse_text("syncfalse", Source::ConfigFile),
            Err(ParamError::MissingSeparator("syncfalse".into()))
        );
        assert_eq!(
            registry.parse_text("bogus=1", Source::ConfigFile),
            Err(ParamError::UnknownKey("bogus".into()))
        );
        assert_eq!(
            registry.parse_text("replace=maybe", Source::CommandLine),
            Err(ParamError::InvalidBoolean("maybe".into()))
        );
        assert_eq!(
            registry.parse_text(&format!("{}=1", "k".repeat(MAX_STRING)), Source::ConfigFile),
            Err(ParamError::KeyTooLong { limit: MAX_STRING })
        );
        assert_eq!(
            registry.parse_text("border_width=", Source::ConfigFile),
            Err(ParamError::EmptyNumeral)
        );
        assert_eq!(
            registry.parse_text("border_width=3px", Source::ConfigFile),
            Err(ParamError::TrailingGarbage("3px".into()))
        );
        assert_eq!(
            registry.parse_text("border_width=65", Source::ConfigFile),
            Err(ParamError::OutOfRange { value: 65, min: 0, max: 64 })
        );

        let after: Vec<_> = registry.iter().map(|(_, p)| p.value().clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_parse_text_trims_key_and_value() {
        let mut registry = configured();
        assert_eq!(registry.parse_text("  Snap_Distance =  -1 ", Source::CommandLine), Ok(ParamId::SNAP_DISTANCE));
        assert_eq!(registry.get(ParamId::SNAP_DISTANCE), &ParameterValue::Int(-1));
        assert_eq!(registry.parameter(ParamId::SNAP_DISTANCE).origin(), Source::CommandLine);
    }

    #[test]
    fn test_parse_text_splits_on_first_separator() {
        let mut registry = configured();
        registry.parse_text("name=a=b", Source::ConfigFile).unwrap();
        assert_eq!(registry.get(ParamId::NAME).as_str(), Some("a=b"));
    }

    #[test]
    fn test_parse_text_bitmask_hex() {
        let mut registry = configured();
        registry.parse_text("verbosity=0x0F", Source::CommandLine).unwrap();
        assert_eq!(registry.get(ParamId::VERBOSITY), &ParameterValue::Uint(15));
    }

    #[test]
    fn test_overlong_string_is_rolled_back() {
        let mut registry = configured();
        let line = format!("name={}", "x".repeat(MAX_STRING));
        assert!(matches!(
            registry.parse_text(&line, Source::Interactive),
            Err(ParamError::StringTooLong { .. })
        ));
        assert_eq!(registry.get(ParamId::NAME).as_str(), Some("wmd"));
        assert_eq!(registry.parameter(ParamId::NAME).origin(), Source::Default);
    }

    #[test]
    fn test_verify_flags_malformed_declarations() {
        let registry = Registry::from_parameters(vec![
            Parameter::boolean("ok", &["Fine."], false),
            Parameter::boolean("", &["No name."], false),
        ]);
        assert_eq!(
            registry.verify(Target::All),
            Err(ParamError::InvalidDeclaration { index: 1, reason: "empty name" })
        );

        let registry = Registry::from_parameters(vec![Parameter::boolean("quiet", &[], false)]);
        assert_eq!(
            registry.verify(Target::One(ParamId::new(0))),
            Err(ParamError::InvalidDeclaration { index: 0, reason: "missing description" })
        );

        let registry = Registry::from_parameters(vec![Parameter::unsigned("size", &["Size."], 5, 10, 1)]);
        assert_eq!(
            registry.verify(Target::All),
            Err(ParamError::InvalidDeclaration { index: 0, reason: "min exceeds max" })
        );

        let registry = Registry::from_parameters(vec![Parameter::unsigned("size", &["Size."], 50, 0, 10)]);
        assert_eq!(
            registry.verify(Target::All),
            Err(ParamError::OutOfRange { value: 50, min: 0, max: 10 })
        );
    }

    #[test]
    fn test_verify_flags_duplicate_names() {
        let registry = Registry::from_parameters(vec![
            Parameter::boolean("sync", &["One."], false),
            Parameter::boolean("SYNC", &["Two."], false),
        ]);
        assert_eq!(
            registry.verify(Target::All),
            Err(ParamError::InvalidDeclaration { index: 1, reason: "duplicate name" })
        );
    }

    #[test]
    fn test_key_binding_stub_does_not_break_the_rest() {
        let mut registry = Registry::from_parameters(vec![
            Parameter::boolean("sync", &["Sync."], false),
            Parameter::key_binding("close", &["Close the focused window."]),
        ]);
        assert_eq!(registry.bootstrap(), Ok(()));
        assert!(registry.configured);
        assert_eq!(registry.verify(Target::All), Ok(()));
        assert_eq!(registry.parameter(ParamId::new(1)).kind(), ParameterType::KeyBinding);

        assert_eq!(
            registry.parse_text("close=Mod4+q", Source::CommandLine),
            Err(ParamError::NotImplemented("key bindings"))
        );
        assert!(registry.get(ParamId::new(1)).is_unset());

        // Configured, so an identical value is a no-op that keeps the origin
        registry.parse_text("sync=0", Source::ConfigFile).unwrap();
        assert_eq!(registry.parameter(ParamId::new(0)).origin(), Source::Default);

        registry.parse_text("sync=1", Source::CommandLine).unwrap();
        assert_eq!(registry.get(ParamId::new(0)), &ParameterValue::Bool(true));
    }

    #[test]
    fn test_foreign_id_is_refused() {
        let mut registry = Registry::from_parameters(vec![Parameter::boolean("sync", &["Sync."], false)]);
        registry.bootstrap().unwrap();

        assert_eq!(
            registry.set(ParamId::SNAP_DISTANCE, ParameterValue::Int(1), Source::Interactive),
            Err(ParamError::UnknownId(ParamId::SNAP_DISTANCE.index()))
        );
        assert_eq!(
            registry.set_default(Target::One(ParamId::NAME), Source::Interactive),
            Err(ParamError::UnknownId(ParamId::NAME.index()))
        );
        assert_eq!(
            registry.verify(Target::One(ParamId::NAME)),
            Err(ParamError::UnknownId(ParamId::NAME.index()))
        );
    }

    #[test]
    fn test_verify_flags_description_closing_a_comment() {
        let registry = Registry::from_parameters(vec![Parameter::boolean("sync", &["Ends */ early."], false)]);
        assert_eq!(
            registry.verify(Target::All),
            Err(ParamError::InvalidDeclaration { index: 0, reason: "description closes a comment" })
        );
    }
}

//! Textual output of parameters
//!
//! The full form, with every aspect and comment wrapping, is a valid
//! configuration file: the descriptive lines sit inside `/* */` and only the
//! `key=value` line is left for the parser.

use std::fmt;

use bitflags::bitflags;

use super::{ParamId, Parameter, ParameterValue, Registry, Source, Target};

bitflags! {
    /// Independent output aspects
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShowFlags: u32 {
        /// `Name: x  Type: t  Min: a  Max: b`
        const BOILERPLATE = 1 << 0;
        const VALUE = 1 << 1;
        const DEFAULT = 1 << 2;
        const SOURCE = 1 << 3;
        const DESCRIPTION = 1 << 4;
        /// Bare `key=value` line
        const KEYVALUE = 1 << 5;
        /// Wrap the descriptive lines in a block comment
        const COMMENT = 1 << 6;
        /// Include parameters whose origin is still the default
        const STATE_DEFAULTS = 1 << 7;
    }
}

impl ShowFlags {
    /// Everything, shaped as a configuration file
    pub const FULL: Self = Self::all();

    /// `key=value` for every parameter
    pub const PARAMLIST: Self = Self::KEYVALUE.union(Self::STATE_DEFAULTS);

    /// `key=value` for parameters that were set by something other than the defaults
    pub const DIFF: Self = Self::KEYVALUE;
}

impl Parameter {
    fn render_value(&self, value: &ParameterValue) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.kind().family().render(self.kind(), value, &mut out);
        out
    }

    /// Current value in the same text `parse_text` accepts
    pub fn value_text(&self) -> String {
        self.render_value(self.value())
    }

    pub fn default_text(&self) -> String {
        self.render_value(self.default_value())
    }

    fn header_lines(&self, flags: ShowFlags) -> Vec<String> {
        let mut lines = Vec::new();
        if flags.contains(ShowFlags::BOILERPLATE) {
            lines.push(format!(
                "Name: {}\tType: {}\tMin: {}\tMax: {}",
                self.name(),
                self.kind(),
                self.min(),
                self.max()
            ));
        }
        if flags.contains(ShowFlags::VALUE) {
            lines.push(format!("Value: {}", self.value_text()));
        }
        if flags.contains(ShowFlags::DEFAULT) {
            lines.push(format!("Default: {}", self.default_text()));
        }
        if flags.contains(ShowFlags::SOURCE) {
            lines.push(format!("Source: {}", self.origin()));
        }
        if flags.contains(ShowFlags::DESCRIPTION) {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.extend(self.description().iter().map(|line| line.to_string()));
        }
        lines
    }

    /// Write this parameter's block
    pub fn show(&self, flags: ShowFlags, out: &mut dyn fmt::Write) -> fmt::Result {
        let lines = self.header_lines(flags);
        if !lines.is_empty() {
            if flags.contains(ShowFlags::COMMENT) {
                out.write_str("/*\n")?;
                for line in &lines {
                    if line.is_empty() {
                        out.write_str(" *\n")?;
                    } else {
                        writeln!(out, " * {line}")?;
                    }
                }
                out.write_str(" */\n")?;
            } else {
                for line in &lines {
                    writeln!(out, "{line}")?;
                }
            }
        }
        if flags.contains(ShowFlags::KEYVALUE) {
            writeln!(out, "{}={}", self.name(), self.value_text())?;
        }
        Ok(())
    }

    fn shown_with(&self, flags: ShowFlags) -> bool {
        flags.contains(ShowFlags::STATE_DEFAULTS) || self.origin() != Source::Default
    }
}

impl Registry {
    /// Render one or all parameters. Parameters still at their default are
    /// skipped unless `STATE_DEFAULTS` is set.
    pub fn show(&self, target: Target, flags: ShowFlags, out: &mut dyn fmt::Write) -> fmt::Result {
        let ids: Vec<ParamId> = match target {
            Target::One(id) => vec![id],
            Target::All => self.iter().map(|(id, _)| id).collect(),
        };

        let mut first = true;
        for id in ids {
            let param = self.parameter(id);
            if !param.shown_with(flags) {
                continue;
            }
            if !first {
                out.write_char('\n')?;
            }
            first = false;
            param.show(flags, out)?;
        }
        Ok(())
    }

    /// [`Registry::show`] into a fresh string
    pub fn show_string(&self, target: Target, flags: ShowFlags) -> String {
        let mut out = String::new();
        let _ = self.show(target, flags, &mut out);
        out
    }
}

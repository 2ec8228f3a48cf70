//! Verbosity levels and the log sink
//!
//! Every message the daemon emits belongs to one verbosity level. Each level
//! is a tracing target, and the `verbosity` parameter is a bitmask choosing
//! which targets reach the output. Until the parameter registry has been
//! configured the mask holds every bit, so nothing is lost during startup.

use std::fmt::Write as _;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result};
use tracing::Level as TraceLevel;
use tracing_subscriber::filter::{FilterFn, LevelFilter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry as TraceRegistry, fmt, reload};

use crate::constants::config::LOG_LEVEL_ENV;

/// Tracing targets, one per verbosity level
pub mod target {
    pub const XIGNORED: &str = "wmd::xignored";
    pub const XHANDLED: &str = "wmd::xhandled";
    pub const CONFIG_CHANGES: &str = "wmd::config_changes";
    pub const CONFIG: &str = "wmd::config";
    pub const STATE: &str = "wmd::state";
    pub const NOTIMPLEMENTED: &str = "wmd::notimplemented";
    pub const FILELINE: &str = "wmd::fileline";
    pub const FUNCTION: &str = "wmd::function";
    pub const CORE: &str = "wmd::core";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verbosity {
    XIgnored = 0,
    XHandled,
    ConfigChanges,
    Config,
    State,
    NotImplemented,
    FileLine,
    Function,
    Core,
}

impl Verbosity {
    pub const ALL: [Verbosity; 9] = [
        Verbosity::XIgnored,
        Verbosity::XHandled,
        Verbosity::ConfigChanges,
        Verbosity::Config,
        Verbosity::State,
        Verbosity::NotImplemented,
        Verbosity::FileLine,
        Verbosity::Function,
        Verbosity::Core,
    ];

    /// Mask with the bit of every defined level set
    pub const fn all_bits() -> u32 {
        (1 << Self::ALL.len()) - 1
    }

    pub const fn position(self) -> u32 {
        self as u32
    }

    pub const fn bit(self) -> u32 {
        1 << self.position()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Verbosity::XIgnored => "XIGNORED",
            Verbosity::XHandled => "XHANDLED",
            Verbosity::ConfigChanges => "CONFIG_CHANGES",
            Verbosity::Config => "CONFIG",
            Verbosity::State => "STATE",
            Verbosity::NotImplemented => "NOTIMPLEMENTED",
            Verbosity::FileLine => "FILELINE",
            Verbosity::Function => "FUNCTION",
            Verbosity::Core => "CORE",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Verbosity::XIgnored => "Ignored X errors/warnings.",
            Verbosity::XHandled => "X errors that have been dealt with.",
            Verbosity::ConfigChanges => "Changes to the configuration.",
            Verbosity::Config => "Configuration parsing/verification.",
            Verbosity::State => {
                "Changes in state, ie: connect/disconnect\n\
                 from X, event-handling/state-handling."
            }
            Verbosity::NotImplemented => {
                "Attempted access to features that only\n\
                 have placeholders."
            }
            Verbosity::FileLine => "Include source-file and line number in\nmessages.",
            Verbosity::Function => "Include the module that sent the message\nin the output.",
            Verbosity::Core => {
                "Information related to the core functionality\n\
                 of wmd. This should almost always be set."
            }
        }
    }

    pub const fn target(self) -> &'static str {
        match self {
            Verbosity::XIgnored => target::XIGNORED,
            Verbosity::XHandled => target::XHANDLED,
            Verbosity::ConfigChanges => target::CONFIG_CHANGES,
            Verbosity::Config => target::CONFIG,
            Verbosity::State => target::STATE,
            Verbosity::NotImplemented => target::NOTIMPLEMENTED,
            Verbosity::FileLine => target::FILELINE,
            Verbosity::Function => target::FUNCTION,
            Verbosity::Core => target::CORE,
        }
    }

    pub fn from_target(target: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.target() == target)
    }
}

/// Render the verbosity table, or a single level of it
pub fn describe_verbosity(out: &mut String, level: Option<Verbosity>) {
    let levels = match level {
        Some(v) => vec![v],
        None => Verbosity::ALL.to_vec(),
    };
    for v in levels {
        let _ = writeln!(out, "0x{:X}\t1<<{}\t\t{}", v.bit(), v.position(), v.name());
        let _ = writeln!(out, "{}\n", v.description());
    }
}

/// Shared verbosity mask consulted by the log filter
#[derive(Debug, Clone)]
pub struct VerbosityMask(Arc<AtomicU32>);

impl VerbosityMask {
    pub fn new(mask: u32) -> Self {
        Self(Arc::new(AtomicU32::new(mask)))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn set(&self, mask: u32) {
        self.0.store(mask, Ordering::Relaxed);
    }

    pub fn allows(&self, v: Verbosity) -> bool {
        self.get() & v.bit() != 0
    }

    /// Messages outside the wmd targets (e.g. from x11rb) always pass
    pub fn allows_target(&self, target: &str) -> bool {
        Verbosity::from_target(target).is_none_or(|v| self.allows(v))
    }
}

impl Default for VerbosityMask {
    fn default() -> Self {
        Self::new(u32::MAX)
    }
}

/// Messages go to stderr so stdout only carries `--show` output
type LogWriter = fn() -> io::Stderr;
type FmtLayer = fmt::Layer<TraceRegistry, fmt::format::DefaultFields, fmt::format::Format, LogWriter>;

/// Handle to the installed log sink
pub struct Logging {
    mask: VerbosityMask,
    format: reload::Handle<FmtLayer, TraceRegistry>,
}

impl Logging {
    /// Install the global subscriber. The level cap comes from `LOG_LEVEL`.
    pub fn init() -> Result<Self> {
        let max_level = match std::env::var(LOG_LEVEL_ENV)
            .unwrap_or_else(|_| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => TraceLevel::TRACE,
            "debug" => TraceLevel::DEBUG,
            "warn" => TraceLevel::WARN,
            "error" => TraceLevel::ERROR,
            _ => TraceLevel::INFO,
        };

        let mask = VerbosityMask::default();
        let filter_mask = mask.clone();
        let (format, handle) = reload::Layer::new(Self::format_layer(0));

        tracing_subscriber::registry()
            .with(format)
            .with(FilterFn::new(move |meta| filter_mask.allows_target(meta.target())))
            .with(LevelFilter::from_level(max_level))
            .try_init()
            .context("Failed to install tracing subscriber")?;

        Ok(Self { mask, format: handle })
    }

    fn format_layer(mask: u32) -> FmtLayer {
        fmt::layer()
            .with_writer(io::stderr as LogWriter)
            .with_file(mask & Verbosity::FileLine.bit() != 0)
            .with_line_number(mask & Verbosity::FileLine.bit() != 0)
            .with_target(mask & Verbosity::Function.bit() != 0)
    }

    /// Switch from the startup mask to the configured one
    pub fn apply(&self, mask: u32) -> Result<()> {
        self.mask.set(mask);
        self.format
            .reload(Self::format_layer(mask))
            .context("Failed to reload log format")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_dense_bits() {
        for (i, v) in Verbosity::ALL.iter().enumerate() {
            assert_eq!(v.position(), i as u32);
            assert_eq!(v.bit(), 1 << i);
            assert!(v.description().len() >= 10, "{} is too terse", v.name());
        }
        assert_eq!(Verbosity::all_bits(), 0x1FF);
    }

    #[test]
    fn test_from_target_roundtrip() {
        for v in Verbosity::ALL {
            assert_eq!(Verbosity::from_target(v.target()), Some(v));
        }
        assert_eq!(Verbosity::from_target("x11rb::connection"), None);
    }

    #[test]
    fn test_mask_filters_wmd_targets_only() {
        let mask = VerbosityMask::new(Verbosity::Config.bit());
        assert!(mask.allows_target(target::CONFIG));
        assert!(!mask.allows_target(target::CONFIG_CHANGES));
        assert!(mask.allows_target("x11rb::rust_connection"));

        mask.set(0);
        assert!(!mask.allows_target(target::CONFIG));
    }

    #[test]
    fn test_startup_mask_allows_everything() {
        let mask = VerbosityMask::default();
        assert!(Verbosity::ALL.into_iter().all(|v| mask.allows(v)));
    }

    #[test]
    fn test_describe_single_level() {
        let mut out = String::new();
        describe_verbosity(&mut out, Some(Verbosity::Config));
        assert!(out.starts_with("0x8\t1<<3\t\tCONFIG\n"));
        assert!(out.ends_with("\n\n"));
    }

    #[test]
    fn test_log_output_is_kept_off_stdout() {
        let _layer: fmt::Layer<TraceRegistry, _, _, fn() -> io::Stderr> = Logging::format_layer(Verbosity::all_bits());
    }

    #[test]
    fn test_describe_all_levels() {
        let mut out = String::new();
        describe_verbosity(&mut out, None);
        for v in Verbosity::ALL {
            assert!(out.contains(v.name()));
        }
    }
}

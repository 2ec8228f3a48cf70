//! Command line definitions

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::constants::text::PARAM_HEADER;
use crate::inform::describe_verbosity;
use crate::param::{Registry, ShowFlags, Source, Target};

/// What `--show` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowTopic {
    /// Every parameter with full detail, usable as a configuration file
    Param,
    /// `key=value` for every parameter
    Paramlist,
    /// `key=value` for parameters not at their default
    Diff,
    /// The verbosity levels and their bits
    Verbosity,
}

impl ShowTopic {
    pub fn render(self, registry: &Registry) -> String {
        match self {
            ShowTopic::Param => {
                let mut out = format!("{PARAM_HEADER}\n");
                let _ = registry.show(Target::All, ShowFlags::FULL, &mut out);
                out
            }
            ShowTopic::Paramlist => registry.show_string(Target::All, ShowFlags::PARAMLIST),
            ShowTopic::Diff => registry.show_string(Target::All, ShowFlags::DIFF),
            ShowTopic::Verbosity => {
                let mut out = String::new();
                describe_verbosity(&mut out, None);
                out
            }
        }
    }
}

/// CLI arguments for wmd
#[derive(Parser, Debug)]
#[command(name = "wmd")]
#[command(version, about = "Window manager daemon for X11")]
#[command(long_about = r#"
wmd is a window manager daemon for X11.

Parameters are taken, in rising priority, from the compiled-in defaults,
the configuration file and the command line.

Example:
  wmd --param border_width=2 --param sync=true
  wmd --show param > ~/.config/wmd/wmd.conf
"#)]
pub struct Cli {
    /// Set a parameter (can be specified multiple times)
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Print information and exit
    #[arg(short, long, value_enum, value_name = "TOPIC")]
    pub show: Option<ShowTopic>,

    /// Verify all parameters and exit
    #[arg(long)]
    pub check: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of the configuration file
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,
}

impl Cli {
    /// Apply every `--param`, in order. Stops at the first failure.
    pub fn apply_params(&self, registry: &mut Registry) -> Result<()> {
        for param in &self.params {
            registry
                .parse_text(param, Source::CommandLine)
                .with_context(|| format!("Invalid --param {param:?}"))?;
        }
        Ok(())
    }
}

#![forbid(unsafe_code)]

mod cli;
mod config_file;
mod constants;
mod inform;
mod param;
mod state;
mod x11_utils;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::{error, info, warn};

use cli::Cli;
use inform::{Logging, target};
use param::{ParamId, Registry, Target};
use state::DaemonState;
use x11_utils::XContext;

/// Defaults, then the configuration file, then `--param`
fn configure(cli: &Cli, registry: &mut Registry, state: &mut DaemonState) -> Result<()> {
    registry.bootstrap()?;
    state.enter(DaemonState::CONFIGURED);

    if !cli.no_config {
        let (path, required) = match &cli.config {
            Some(path) => (path.clone(), true),
            None => (config_file::default_path(), false),
        };
        config_file::load(registry, &path, required)?;
    }

    cli.apply_params(registry)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let logging = Logging::init()?;

    let mut registry = Registry::new();
    let mut state = DaemonState::default();
    if let Err(e) = configure(&cli, &mut registry, &mut state) {
        error!(target: target::CONFIG, "{e:#}");
        std::process::exit(1);
    }

    let verbosity = registry.get(ParamId::VERBOSITY).as_u32().unwrap_or(0);
    logging.apply(verbosity)?;

    if let Some(topic) = cli.show {
        print!("{}", topic.render(&registry));
        return Ok(());
    }
    if cli.check {
        match registry.verify(Target::All) {
            Ok(()) => {
                info!(target: target::CONFIG, count = registry.len(), "all parameters verified");
                return Ok(());
            }
            Err(e) => {
                error!(target: target::CONFIG, error = %e, "parameter verification failed");
                std::process::exit(1);
            }
        }
    }

    let sync = registry.get(ParamId::SYNC).as_bool().unwrap_or(false);
    let ctx = XContext::connect(sync)?;

    if !ctx.claim_root()? {
        let replaced = registry.get(ParamId::REPLACE).as_bool() == Some(true) && ctx.replace_running_wm();
        if !replaced {
            bail!("Another window manager is already running");
        }
    }
    state.enter(DaemonState::CONNECTED);
    info!(
        target: target::CORE,
        name = registry.get(ParamId::NAME).as_str().unwrap_or_default(),
        border_width = registry.get(ParamId::BORDER_WIDTH).as_u32().unwrap_or_default(),
        snap_distance = registry.get(ParamId::SNAP_DISTANCE).as_i32().unwrap_or_default(),
        "managing screen {}",
        ctx.screen_num
    );

    warn!(target: target::NOTIMPLEMENTED, "a function that's not yet implemented was accessed: event loop");
    state.leave(DaemonState::CONNECTED);
    Ok(())
}

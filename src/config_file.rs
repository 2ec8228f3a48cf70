//! Configuration file loading
//!
//! The file is what `wmd --show param` prints: C-style block comments and
//! `#` comment lines around plain `key=value` lines.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::constants::config::{APP_DIR, FILENAME};
use crate::inform::target;
use crate::param::{Registry, Source};

/// Outcome of applying a configuration file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub applied: usize,
    pub failed: usize,
}

/// `$XDG_CONFIG_HOME/wmd/wmd.conf`
pub fn default_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push(FILENAME);
    path
}

/// Remove comments and blank lines, keeping the 1-based line number of
/// whatever content is left on each line
pub fn strip_comments(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut in_block = false;
    let mut opened_at = 0;

    for (index, raw) in text.lines().enumerate() {
        let mut content = String::new();
        let mut rest = raw;
        loop {
            if in_block {
                match rest.find("*/") {
                    Some(end) => {
                        in_block = false;
                        rest = &rest[end + 2..];
                    }
                    None => break,
                }
            } else {
                match rest.find("/*") {
                    Some(start) => {
                        content.push_str(&rest[..start]);
                        in_block = true;
                        opened_at = index + 1;
                        rest = &rest[start + 2..];
                    }
                    None => {
                        content.push_str(rest);
                        break;
                    }
                }
            }
        }

        let content = content.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        lines.push((index + 1, content.to_string()));
    }

    if in_block {
        warn!(target: target::CONFIG, line = opened_at, "unterminated comment runs to the end of the file");
    }
    lines
}

/// Apply every `key=value` line of `text`. A bad line is logged and skipped.
pub fn load_str(registry: &mut Registry, text: &str) -> LoadReport {
    let mut report = LoadReport::default();
    for (line_no, line) in strip_comments(text) {
        match registry.parse_text(&line, Source::ConfigFile) {
            Ok(_) => report.applied += 1,
            Err(e) if e.is_syntax() => {
                warn!(target: target::CONFIG, line = line_no, error = %e, "syntax error in configuration file");
                report.failed += 1;
            }
            Err(e) => {
                warn!(target: target::CONFIG, line = line_no, error = %e, "configuration value rejected");
                report.failed += 1;
            }
        }
    }
    report
}

/// Load `path` into the registry. Returns `None` when the file does not
/// exist and `required` is false.
pub fn load(registry: &mut Registry, path: &Path, required: bool) -> Result<Option<LoadReport>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            info!(target: target::CONFIG, path = %path.display(), "no configuration file, using defaults");
            return Ok(None);
        }
        Err(e) => {
            return Err(e).context(format!("Failed to read config file {}", path.display()));
        }
    };

    let report = load_str(registry, &text);
    info!(
        target: target::CONFIG,
        path = %path.display(),
        applied = report.applied,
        failed = report.failed,
        "configuration file loaded"
    );
    Ok(Some(report))
}

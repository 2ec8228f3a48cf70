//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the daemon, providing a single source of truth for constant values.

/// Parameter storage limits
pub mod limits {
    /// Maximum length of any input string, including parameter keys
    pub const MAX_STRING: usize = 1024;
}

/// Configuration file location
pub mod config {
    /// Directory under the user's config dir
    pub const APP_DIR: &str = "wmd";

    /// Configuration file name
    pub const FILENAME: &str = "wmd.conf";

    /// Environment variable capping the tracing level
    pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
}

/// Text emitted by the renderer and the CLI
pub mod text {
    /// Value used in `key=value` to request the compiled-in default
    pub const DEFAULT_KEYWORD: &str = "default";

    /// Rendered in place of a value that was never set
    pub const UNSET_PLACEHOLDER: &str = "(unset)";

    /// Header printed before `--show param`, itself a valid config comment
    pub const PARAM_HEADER: &str = "\
/* Parameters in wmd are essentially options, or settings.
 *
 * All parameters have certain boundaries depending on the type of
 * parameter. You can set a default by using \"default\" as the value
 * of the parameter. The order parameters are prioritized is:
 * - Interactively set values
 * - Arguments on the command line
 * - Parameters stored in a configuration file
 * - Default values
 *
 * This output uses C-style comments, which is the same as the
 * configuration file of wmd, so it can be piped directly into a file
 * and used as a configuration file. This text was generated with:
 * wmd --show param
 *
 * A smaller configuration file with just names and current values
 * can be generated with: wmd --show paramlist
 *
 * Parameters can be modified with --param key=value, or by using this
 * output as a configuration file.
 */
";
}

/// X11 protocol constants
pub mod x11 {
    /// Name of the root window event mask only one client may hold
    pub const REDIRECT_OWNER: &str = "SubstructureRedirect";
}

//! Compiled-in parameter declarations

use super::{ParamId, Parameter};
use crate::inform::Verbosity;

impl ParamId {
    pub const REPLACE: ParamId = ParamId::new(0);
    pub const SYNC: ParamId = ParamId::new(1);
    pub const VERBOSITY: ParamId = ParamId::new(2);
    pub const NAME: ParamId = ParamId::new(3);
    pub const BORDER_WIDTH: ParamId = ParamId::new(4);
    pub const SNAP_DISTANCE: ParamId = ParamId::new(5);
}

/// The daemon's parameter table, in [`ParamId`] order
pub fn parameters() -> Vec<Parameter> {
    vec![
        Parameter::boolean(
            "replace",
            &["Try to replace the running window manager if it supports it."],
            false,
        ),
        Parameter::boolean(
            "sync",
            &[
                "Run in synchronized X mode. Easier debugging but slower,",
                "since every request waits for the X server.",
            ],
            false,
        ),
        Parameter::bitmask(
            "verbosity",
            &[
                "The verbosity bitmask. Each bit enables one class of",
                "messages, see: wmd --show verbosity",
            ],
            Verbosity::all_bits(),
        ),
        Parameter::string(
            "name",
            &["Name the window manager announces to clients."],
            "wmd",
        ),
        Parameter::unsigned(
            "border_width",
            &["Width in pixels of the border drawn around managed windows."],
            1,
            0,
            64,
        ),
        Parameter::signed(
            "snap_distance",
            &[
                "Distance in pixels at which a moved window snaps to the",
                "screen edge. -1 disables snapping.",
            ],
            10,
            -1,
            1000,
        ),
    ]
}

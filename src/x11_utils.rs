use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::ErrorKind;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::constants::x11::REDIRECT_OWNER;
use crate::inform::target;

/// Connection to the X server and the screen being managed
pub struct XContext {
    pub conn: RustConnection,
    pub screen_num: usize,
    /// Wait for the server after every setup request
    sync: bool,
}

impl XContext {
    pub fn connect(sync: bool) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to the X server")?;
        let screen = &conn.setup().roots[screen_num];
        info!(
            target: target::STATE,
            screen = screen_num,
            width = screen.width_in_pixels,
            height = screen.height_in_pixels,
            sync,
            "connected to X server"
        );
        Ok(Self { conn, screen_num, sync })
    }

    pub fn screen(&self) -> &Screen {
        &self.conn.setup().roots[self.screen_num]
    }

    /// Push pending requests out, waiting for the server in sync mode
    pub fn settle(&self) -> Result<()> {
        if self.sync {
            self.conn
                .get_input_focus()
                .context("Failed to send sync request")?
                .reply()
                .context("Failed to get reply for sync request")?;
        } else {
            self.conn.flush().context("Failed to flush X connection")?;
        }
        Ok(())
    }

    /// Select substructure redirection on the root window. Only one client
    /// can hold it, so `false` means another window manager is running.
    pub fn claim_root(&self) -> Result<bool> {
        let root = self.screen().root;
        let mask = EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY;
        let cookie = self
            .conn
            .change_window_attributes(root, &ChangeWindowAttributesAux::new().event_mask(mask))
            .context("Failed to select events on the root window")?;

        match cookie.check() {
            Ok(()) => {
                debug!(target: target::XHANDLED, root, "root window claimed");
                self.settle()?;
                Ok(true)
            }
            Err(ReplyError::X11Error(e)) if e.error_kind == ErrorKind::Access => {
                info!(target: target::XHANDLED, root, owner = REDIRECT_OWNER, "root window already claimed by another client");
                Ok(false)
            }
            Err(e) => Err(e).context("Failed to claim the root window"),
        }
    }

    /// Ask the running window manager to hand over the screen
    pub fn replace_running_wm(&self) -> bool {
        warn!(target: target::NOTIMPLEMENTED, "a function that's not yet implemented was accessed: replace");
        false
    }
}

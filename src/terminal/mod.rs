//! Browser terminal plumbing
//!
//! The dashboard exposes a web terminal: the browser runs an xterm.js
//! widget, the server runs a shell, and a WebSocket relays bytes between
//! them. This module owns the server half -- spawning the shell (see
//! [`transport`]) and interpreting the one in-band control sequence the
//! client sends, a window-resize escape.
//!
//! # Resize protocol
//!
//! The client reports window-size changes as a text frame containing
//! `ESC [ 8 ; rows ; cols t` (the xterm window-manipulation sequence).
//! Everything else the client sends is raw keyboard input and is passed
//! through untouched. A frame that starts like a resize sequence but does
//! not parse is dropped rather than fed to the shell.

pub mod transport;

pub use transport::{PipeTransport, PtyTransport, ShellTransport};

use crate::error::Result;

/// Prefix of the client's resize control sequence.
pub const RESIZE_PREFIX: &str = "\x1b[8;";

/// Parse a resize control sequence into `(rows, cols)`.
///
/// Accepts exactly `ESC[8;<rows>;<cols>t`. Returns `None` for anything
/// else, including sequences with the right prefix but malformed numbers.
pub fn parse_resize(frame: &str) -> Option<(u16, u16)> {
    let body = frame
        .strip_prefix(RESIZE_PREFIX)?
        .strip_suffix('t')?;
    let (rows, cols) = body.split_once(';')?;
    let rows: u16 = rows.parse().ok()?;
    let cols: u16 = cols.parse().ok()?;
    if rows == 0 || cols == 0 {
        return None;
    }
    Some((rows, cols))
}

/// Spawn a shell for a new terminal session.
///
/// Tries a real pty first and falls back to piped stdio when the host
/// cannot allocate one.
///
/// # Errors
///
/// Returns [`crate::error::DashboardError::Terminal`] only when both
/// transports fail to spawn.
pub fn spawn_shell() -> Result<Box<dyn ShellTransport>> {
    match PtyTransport::spawn() {
        Ok(pty) => Ok(Box::new(pty)),
        Err(e) => {
            tracing::warn!(error = %e, "pty unavailable, falling back to piped shell");
            Ok(Box::new(PipeTransport::spawn()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resize_accepts_well_formed_sequence() {
        assert_eq!(parse_resize("\x1b[8;40;120t"), Some((40, 120)));
        assert_eq!(parse_resize("\x1b[8;1;1t"), Some((1, 1)));
    }

    #[test]
    fn test_parse_resize_rejects_malformed_sequences() {
        assert_eq!(parse_resize("\x1b[8;40;120"), None); // missing suffix
        assert_eq!(parse_resize("\x1b[8;40t"), None); // missing cols
        assert_eq!(parse_resize("\x1b[8;forty;120t"), None); // non-numeric
        assert_eq!(parse_resize("\x1b[8;0;120t"), None); // zero dimension
        assert_eq!(parse_resize("ls -la\n"), None); // plain input
        assert_eq!(parse_resize(""), None);
    }

    #[test]
    fn test_parse_resize_rejects_trailing_garbage() {
        assert_eq!(parse_resize("\x1b[8;40;120tls"), None);
        assert_eq!(parse_resize("\x1b[8;40;120;9t"), None);
    }
}

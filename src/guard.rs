//! Scoped raw-mode control for the process's terminal

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossterm::tty::IsTty;
use tracing::{debug, warn};

use crate::attr::{self, TermAttrs};

/// Attribute access for one terminal device.
///
/// [`StdinTerminal`] is the production implementation; tests substitute an
/// in-memory fake so the properties below hold without a real tty.
pub trait TerminalBackend: Send + Sync {
    fn is_tty(&self) -> bool;
    fn attrs(&self) -> io::Result<TermAttrs>;
    fn set_attrs(&self, attrs: &TermAttrs) -> io::Result<()>;
}

/// Backend over the process's standard input (file descriptor 0)
#[derive(Debug, Default)]
pub struct StdinTerminal;

impl TerminalBackend for StdinTerminal {
    fn is_tty(&self) -> bool {
        io::stdin().is_tty()
    }

    fn attrs(&self) -> io::Result<TermAttrs> {
        attr::get_terminal_attr(libc::STDIN_FILENO)
    }

    fn set_attrs(&self, attrs: &TermAttrs) -> io::Result<()> {
        attr::set_terminal_attr(libc::STDIN_FILENO, attrs)
    }
}

/// Clonable handle that puts the terminal back to its saved configuration.
///
/// The restore runs at most once across all clones; later calls are no-ops.
/// `Send + Sync`, so a signal-watcher thread can hold one (see
/// [`crate::signals`]).
#[derive(Clone)]
pub struct Restorer {
    restored: Arc<AtomicBool>,
    backend: Arc<dyn TerminalBackend>,
    saved: TermAttrs,
}

impl Restorer {
    pub fn restore(&self) -> io::Result<()> {
        if self.restored.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("restoring saved terminal attributes");
        self.backend.set_attrs(&self.saved)
    }
}

/// Puts the terminal into raw mode for as long as it lives.
///
/// On entry the current attributes are snapshotted, then canonical
/// processing and echo are cleared so reads deliver single keystrokes
/// without echoing them. Dropping the guard restores the snapshot, so the
/// terminal comes back on every exit path. Each guard owns its own
/// snapshot; nested guards restore in LIFO order.
pub struct RawModeGuard {
    restorer: Restorer,
}

impl RawModeGuard {
    /// Switch standard input to raw mode
    pub fn enter() -> io::Result<Self> {
        Self::enter_with(Arc::new(StdinTerminal))
    }

    /// Switch the given terminal to raw mode
    pub fn enter_with(backend: Arc<dyn TerminalBackend>) -> io::Result<Self> {
        if !backend.is_tty() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "input stream is not a terminal",
            ));
        }

        let saved = backend.attrs()?;
        let mut raw = saved;
        raw.make_raw();
        backend.set_attrs(&raw)?;
        debug!("terminal switched to raw mode");

        Ok(RawModeGuard {
            restorer: Restorer {
                restored: Arc::new(AtomicBool::new(false)),
                backend,
                saved,
            },
        })
    }

    /// Attributes that were in effect before raw mode was entered
    pub fn saved_attrs(&self) -> TermAttrs {
        self.restorer.saved
    }

    /// Handle for restoring from another thread
    pub fn restorer(&self) -> Restorer {
        self.restorer.clone()
    }

    /// Restore the saved configuration now, reporting any failure.
    ///
    /// After this the drop-path restore is a no-op.
    pub fn restore(&self) -> io::Result<()> {
        self.restorer.restore()
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Drop cannot propagate the error; log it instead.
        if let Err(err) = self.restorer.restore() {
            warn!("failed to restore terminal attributes: {err}");
        }
    }
}

//! Restore-on-signal support
//!
//! A guard's `Drop` never runs when the process is killed by a signal,
//! which would leave the terminal stuck in raw mode. Interactive programs
//! can hand a [`Restorer`] to this watcher thread instead.

use std::io;
use std::thread;

use libc::c_int;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{debug, warn};

use crate::guard::Restorer;

/// Conventional shell exit code for death by `signo`
fn exit_code(signo: c_int) -> i32 {
    128 + signo
}

/// Restore the terminal, logging any failure as on the drop path, and
/// compute the exit code for `signo`.
fn handle_termination(restorer: &Restorer, signo: c_int) -> i32 {
    if let Err(err) = restorer.restore() {
        warn!("failed to restore terminal attributes: {err}");
    }
    exit_code(signo)
}

/// Watch for termination signals and restore the terminal before exiting.
///
/// On `SIGINT`, `SIGTERM`, or `SIGHUP` the saved attributes are applied and
/// the process exits with the conventional `128 + signo` code. The restore
/// races benignly with the main thread: whichever side runs first wins, the
/// other becomes a no-op.
pub fn restore_on_termination(restorer: Restorer) -> io::Result<thread::JoinHandle<()>> {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])?;
    Ok(thread::spawn(move || {
        if let Some(signo) = signals.forever().next() {
            debug!(signo, "termination signal received, restoring terminal");
            std::process::exit(handle_termination(&restorer, signo));
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{sample_attrs, TermAttrs};
    use crate::guard::{RawModeGuard, TerminalBackend};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Backend whose writes can be made to fail after raw entry
    struct FlakyTerminal {
        attrs: Mutex<TermAttrs>,
        fail_writes: AtomicBool,
    }

    impl FlakyTerminal {
        fn new() -> Arc<Self> {
            Arc::new(FlakyTerminal {
                attrs: Mutex::new(sample_attrs()),
                fail_writes: AtomicBool::new(false),
            })
        }
    }

    impl TerminalBackend for FlakyTerminal {
        fn is_tty(&self) -> bool {
            true
        }

        fn attrs(&self) -> io::Result<TermAttrs> {
            Ok(*self.attrs.lock().unwrap())
        }

        fn set_attrs(&self, attrs: &TermAttrs) -> io::Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(io::Error::from_raw_os_error(libc::EIO));
            }
            *self.attrs.lock().unwrap() = *attrs;
            Ok(())
        }
    }

    #[test]
    fn test_exit_code_follows_shell_convention() {
        assert_eq!(exit_code(SIGINT), 130);
        assert_eq!(exit_code(SIGTERM), 143);
        assert_eq!(exit_code(SIGHUP), 129);
    }

    #[test]
    fn test_termination_handler_restores_and_maps_exit_code() {
        let term = FlakyTerminal::new();
        let guard = RawModeGuard::enter_with(term.clone()).unwrap();

        assert_eq!(handle_termination(&guard.restorer(), SIGTERM), 143);
        assert_eq!(*term.attrs.lock().unwrap(), sample_attrs());
    }

    #[test]
    fn test_termination_handler_exits_even_when_restore_fails() {
        let term = FlakyTerminal::new();
        let guard = RawModeGuard::enter_with(term.clone()).unwrap();
        term.fail_writes.store(true, Ordering::SeqCst);

        // The failure is logged, not propagated; the exit code still maps.
        assert_eq!(handle_termination(&guard.restorer(), SIGINT), 130);
    }
}

//! Raw-mode switching for the controlling terminal.
//!
//! [`RawModeGuard::enter`] snapshots the current attributes of standard
//! input, clears canonical (line-buffered) processing and echo so reads
//! deliver single keystrokes immediately and silently, and restores the
//! snapshot exactly when the guard is dropped (or earlier, via an explicit
//! [`RawModeGuard::restore`]).
//!
//! ```no_run
//! fn main() -> std::io::Result<()> {
//!     let guard = rawtty::RawModeGuard::enter()?;
//!     rawtty::restore_on_termination(guard.restorer())?;
//!
//!     // ... read keystrokes one at a time ...
//!
//!     guard.restore()
//! }
//! ```
//!
//! Unix only; the attribute snapshot is a verbatim termios record.

pub mod attr;
pub mod guard;
pub mod signals;

pub use attr::TermAttrs;
pub use guard::{RawModeGuard, Restorer, StdinTerminal, TerminalBackend};
pub use signals::restore_on_termination;

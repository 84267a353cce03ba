//! Platform boundary: termios attribute access

use std::os::unix::io::RawFd;
use std::{fmt, io, mem};

use libc::{c_int, tcgetattr, tcsetattr, termios, ECHO, ICANON, TCSANOW};

/// Snapshot of a terminal's attributes.
///
/// Wraps the platform termios record verbatim, so applying a snapshot back
/// returns the terminal to exactly the configuration it had when the
/// snapshot was taken.
#[derive(Clone, Copy)]
pub struct TermAttrs(pub(crate) termios);

impl TermAttrs {
    /// Whether canonical (line-buffered) input processing is enabled
    pub fn is_canonical(&self) -> bool {
        self.0.c_lflag & ICANON != 0
    }

    /// Whether typed characters are echoed back to the display
    pub fn echoes_input(&self) -> bool {
        self.0.c_lflag & ECHO != 0
    }

    /// Clear canonical processing and echo; every other attribute is left
    /// untouched. Deliberately narrower than `cfmakeraw`.
    pub(crate) fn make_raw(&mut self) {
        self.0.c_lflag &= !(ICANON | ECHO);
    }

    #[cfg(test)]
    pub(crate) fn zeroed() -> Self {
        TermAttrs(unsafe { mem::zeroed() })
    }
}

impl PartialEq for TermAttrs {
    fn eq(&self, other: &Self) -> bool {
        // Baud rate is encoded in c_cflag, so this covers every
        // input-processing attribute the driver consults.
        let (a, b) = (&self.0, &other.0);
        a.c_iflag == b.c_iflag
            && a.c_oflag == b.c_oflag
            && a.c_cflag == b.c_cflag
            && a.c_lflag == b.c_lflag
            && a.c_cc == b.c_cc
    }
}

impl Eq for TermAttrs {}

impl fmt::Debug for TermAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermAttrs")
            .field("canonical", &self.is_canonical())
            .field("echo", &self.echoes_input())
            .finish_non_exhaustive()
    }
}

/// Read the current attributes of the terminal behind `fd`
pub fn get_terminal_attr(fd: RawFd) -> io::Result<TermAttrs> {
    unsafe {
        let mut termios = mem::zeroed();
        cvt(tcgetattr(fd, &mut termios))?;
        Ok(TermAttrs(termios))
    }
}

/// Apply `attrs` to the terminal behind `fd`, effective immediately
pub fn set_terminal_attr(fd: RawFd, attrs: &TermAttrs) -> io::Result<()> {
    cvt(unsafe { tcsetattr(fd, TCSANOW, &attrs.0) }).and(Ok(()))
}

fn cvt(result: c_int) -> io::Result<c_int> {
    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result)
    }
}

/// A representative canonical-mode configuration for tests
#[cfg(test)]
pub(crate) fn sample_attrs() -> TermAttrs {
    let mut attrs = TermAttrs::zeroed();
    attrs.0.c_iflag = libc::ICRNL | libc::IXON;
    attrs.0.c_oflag = libc::OPOST;
    attrs.0.c_cflag = libc::CS8 | libc::CREAD | libc::HUPCL;
    attrs.0.c_lflag = libc::ICANON | libc::ECHO | libc::ISIG | libc::IEXTEN;
    attrs.0.c_cc[libc::VMIN] = 1;
    attrs.0.c_cc[libc::VTIME] = 0;
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_raw_clears_canonical_and_echo() {
        let mut attrs = sample_attrs();
        attrs.make_raw();

        assert!(!attrs.is_canonical());
        assert!(!attrs.echoes_input());
    }

    #[test]
    fn test_make_raw_preserves_other_attributes() {
        let original = sample_attrs();
        let mut raw = original;
        raw.make_raw();

        assert_eq!(raw.0.c_iflag, original.0.c_iflag);
        assert_eq!(raw.0.c_oflag, original.0.c_oflag);
        assert_eq!(raw.0.c_cflag, original.0.c_cflag);
        assert_eq!(raw.0.c_cc, original.0.c_cc);
        // Other local flags stay set
        assert_ne!(raw.0.c_lflag & libc::ISIG, 0);
        assert_ne!(raw.0.c_lflag & libc::IEXTEN, 0);
    }

    #[test]
    fn test_snapshot_equality_is_field_exact() {
        let a = sample_attrs();
        let b = sample_attrs();
        assert_eq!(a, b);

        let mut c = sample_attrs();
        c.make_raw();
        assert_ne!(a, c);
    }
}

//! POSIX terminal backend: `termios`-based raw mode with a guaranteed
//! process-exit restore, direct `read(2)`/`write(2)` I/O (std's `Stdin` is
//! buffered with no way to ask "is a byte available"), and ANSI control
//! sequences for cursor and screen control.
use std::io::{self, Write};
use std::os::unix::io::RawFd;
use std::sync::{Mutex, Once, OnceLock};

use log::{debug, warn};
use nix::sys::termios::{self, SetArg, Termios};

use super::{Capability, RawReader, Term};
use crate::error::{EditorError, Result};
use crate::grapheme::utf8_byte_count;
use crate::keys::{char_to_key_event, decode_csi, KeyEvent};
use crate::layout::Position;

const STDIN_FILENO: RawFd = libc::STDIN_FILENO;
const STDOUT_FILENO: RawFd = libc::STDOUT_FILENO;

fn saved_termios() -> &'static Mutex<Option<Termios>> {
    static SAVED: OnceLock<Mutex<Option<Termios>>> = OnceLock::new();
    SAVED.get_or_init(|| Mutex::new(None))
}

static REGISTER_EXIT_HOOK: Once = Once::new();

/// Registered once via `libc::atexit`: restores the terminal's original
/// attributes regardless of how the process is exiting.
extern "C" fn restore_terminal_at_exit() {
    if let Ok(guard) = saved_termios().lock() {
        if let Some(original) = guard.as_ref() {
            let _ = termios::tcsetattr(STDIN_FILENO, SetArg::TCSANOW, original);
        }
    }
}

fn remember_original(original: Termios) {
    let mut guard = saved_termios().lock().expect("termios mutex poisoned");
    if guard.is_none() {
        *guard = Some(original);
    }
    drop(guard);
    REGISTER_EXIT_HOOK.call_once(|| unsafe {
        libc::atexit(restore_terminal_at_exit);
    });
}

fn is_a_tty(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) != 0 }
}

fn read_one_byte() -> Result<u8> {
    let mut buf = [0u8; 1];
    loop {
        let n = unsafe { libc::read(STDIN_FILENO, buf.as_mut_ptr().cast(), 1) };
        if n == -1 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(EditorError::from(err));
        } else if n == 0 {
            return Err(EditorError::Eof);
        }
        return Ok(buf[0]);
    }
}

/// A zero-timeout readiness check on standard input.
fn stdin_ready() -> bool {
    let mut pfd = libc::pollfd {
        fd: STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    let ready = unsafe { libc::poll(&mut pfd, 1, 0) };
    ready > 0 && (pfd.revents & libc::POLLIN) != 0
}

fn parse_cursor_report(bytes: &[u8]) -> Option<Position> {
    let text = std::str::from_utf8(bytes).ok()?;
    let start = text.find("\x1b[")?;
    let body = &text[start + 2..];
    let body = body.strip_suffix('R')?;
    let (row, col) = body.split_once(';')?;
    let row: usize = row.parse().ok()?;
    let col: usize = col.parse().ok()?;
    Some(Position {
        row: row.saturating_sub(1),
        col: col.saturating_sub(1),
    })
}

pub struct PosixTerm {
    raw_active: bool,
}

impl PosixTerm {
    pub fn new() -> Self {
        PosixTerm { raw_active: false }
    }
}

impl Default for PosixTerm {
    fn default() -> Self {
        Self::new()
    }
}

impl Term for PosixTerm {
    type Reader = PosixReader;

    fn capability(&self) -> Capability {
        if !is_a_tty(STDIN_FILENO) {
            Capability::NotATTY
        } else if super::is_unsupported_term() {
            Capability::Unsupported
        } else {
            Capability::Supported
        }
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        if self.raw_active {
            return Ok(());
        }
        let original = termios::tcgetattr(STDIN_FILENO)?;
        remember_original(original.clone());
        let mut raw = original;
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(STDIN_FILENO, SetArg::TCSADRAIN, &raw)?;
        self.raw_active = true;
        debug!(target: "linecraft::tty", "raw mode enabled");
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        if !self.raw_active {
            return Ok(());
        }
        let guard = saved_termios().lock().expect("termios mutex poisoned");
        if let Some(original) = guard.as_ref() {
            termios::tcsetattr(STDIN_FILENO, SetArg::TCSADRAIN, original)?;
        }
        drop(guard);
        self.raw_active = false;
        debug!(target: "linecraft::tty", "raw mode disabled");
        Ok(())
    }

    fn reader(&self) -> PosixReader {
        PosixReader {}
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        io::stdout().write_all(s.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn query_cursor_position(&mut self) -> Result<Position> {
        self.write_str("\x1b[6n")?;
        self.flush()?;
        let mut buf = Vec::with_capacity(16);
        loop {
            let b = read_one_byte()?;
            buf.push(b);
            if b == b'R' || buf.len() >= 32 {
                break;
            }
        }
        match parse_cursor_report(&buf) {
            Some(pos) => {
                debug!(target: "linecraft::tty", "cursor position report: {:?}", pos);
                Ok(pos)
            }
            None => {
                warn!(target: "linecraft::tty", "terminal did not answer cursor position query in time");
                Err(EditorError::Utf8Error)
            }
        }
    }

    fn width(&mut self) -> usize {
        unsafe {
            let mut size: libc::winsize = std::mem::zeroed();
            if libc::ioctl(STDOUT_FILENO, libc::TIOCGWINSZ as _, &mut size) == 0 && size.ws_col > 0 {
                size.ws_col as usize
            } else {
                80
            }
        }
    }
}

/// Reads raw bytes from standard input and assembles them into [`KeyEvent`]s.
pub struct PosixReader {}

impl PosixReader {
    fn decode_escape(&mut self) -> Result<KeyEvent> {
        if !stdin_ready() {
            return Ok(KeyEvent::Unknown);
        }
        let second = read_one_byte()?;
        if second != b'[' {
            return Ok(KeyEvent::Unknown);
        }
        let mut params = String::new();
        loop {
            let b = read_one_byte()?;
            if b.is_ascii_alphabetic() {
                return Ok(decode_csi(second, &params, b));
            }
            params.push(b as char);
            if params.len() > 16 {
                return Ok(KeyEvent::Unknown);
            }
        }
    }
}

impl RawReader for PosixReader {
    fn next_key(&mut self) -> Result<KeyEvent> {
        let lead = read_one_byte()?;
        let key = if lead == 0x1b {
            self.decode_escape()?
        } else {
            let nbytes = utf8_byte_count(lead);
            if nbytes <= 1 {
                char_to_key_event(lead as char)
            } else {
                let mut bytes = Vec::with_capacity(nbytes);
                bytes.push(lead);
                for _ in 1..nbytes {
                    bytes.push(read_one_byte()?);
                }
                let s = std::str::from_utf8(&bytes).map_err(|_| EditorError::Utf8Error)?;
                let ch = s.chars().next().ok_or(EditorError::Utf8Error)?;
                KeyEvent::Character(ch)
            }
        };
        debug!(target: "linecraft::tty", "decoded key: {:?}", key);
        Ok(key)
    }

    fn key_ready(&mut self) -> bool {
        stdin_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::parse_cursor_report;
    use crate::layout::Position;

    #[test]
    fn parses_cursor_report() {
        assert_eq!(
            Some(Position { row: 4, col: 9 }),
            parse_cursor_report(b"\x1b[5;10R")
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(None, parse_cursor_report(b"not a report"));
    }
}

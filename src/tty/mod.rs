//! Terminal driver: capability detection, raw-mode control, ANSI control
//! primitives, cursor/width queries and key decoding, behind a `Term` trait
//! so the editor can run against a headless test double.
use crate::keys::KeyEvent;
use crate::layout::Position;
use crate::Result;

/// Terminals that cannot sensibly run a full-screen line editor.
const UNSUPPORTED_TERM: [&str; 3] = ["dumb", "cons25", "emacs"];

/// What kind of terminal interaction is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Standard input is not a terminal (a pipe or a file).
    NotATTY,
    /// A terminal, but one whose `TERM` value is known not to support raw
    /// mode editing.
    Unsupported,
    /// A terminal that supports full raw-mode editing.
    Supported,
}

/// Checks `TERM` against the list of terminals known not to support raw
/// mode (case-insensitively); unset counts as unsupported.
pub fn is_unsupported_term() -> bool {
    match std::env::var("TERM") {
        Ok(term) if !term.is_empty() => UNSUPPORTED_TERM.iter().any(|t| t.eq_ignore_ascii_case(&term)),
        _ => true,
    }
}

/// Reads decoded key events from the terminal.
pub trait RawReader {
    /// Blocking read of the next key event.
    fn next_key(&mut self) -> Result<KeyEvent>;
    /// Non-blocking check for whether another byte is already available,
    /// used to coalesce pasted text into a single redraw.
    fn key_ready(&mut self) -> bool;
}

/// Terminal control: raw mode, ANSI control primitives, and the cursor
/// position / width queries the rendering pipeline needs.
pub trait Term {
    type Reader: RawReader;

    /// Classify the current terminal.
    fn capability(&self) -> Capability;

    /// Enter raw mode. Safe to call more than once; the first call captures
    /// the original attributes and registers the process-exit restore hook.
    fn enable_raw_mode(&mut self) -> Result<()>;
    /// Leave raw mode, restoring the terminal's prior attributes.
    fn disable_raw_mode(&mut self) -> Result<()>;

    fn reader(&self) -> Self::Reader;

    fn write_str(&mut self, s: &str) -> Result<()>;
    fn erase_line(&mut self) -> Result<()> {
        self.write_str("\x1b[2K")
    }
    fn erase_to_eol(&mut self) -> Result<()> {
        self.write_str("\x1b[0K")
    }
    fn carriage_return(&mut self) -> Result<()> {
        self.write_str("\r")
    }
    fn set_default_attrs(&mut self) -> Result<()> {
        self.write_str("\x1b[0m")
    }
    fn line_feed(&mut self) -> Result<()> {
        self.write_str("\n")
    }
    fn move_to_column(&mut self, col: usize) -> Result<()> {
        self.write_str(&format!("\r\x1b[{}C", col))
    }
    fn move_up(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.write_str(&format!("\x1b[{n}A"))
    }
    fn move_down(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.write_str(&format!("\x1b[{n}B"))
    }

    fn flush(&mut self) -> Result<()>;

    /// Query the cursor's current position via `ESC[6n`.
    fn query_cursor_position(&mut self) -> Result<Position>;
    /// Terminal width in columns, falling back to 80 when it cannot be
    /// determined.
    fn width(&mut self) -> usize;
}

#[cfg(all(unix, not(target_arch = "wasm32")))]
mod unix;
#[cfg(all(unix, not(target_arch = "wasm32")))]
pub use self::unix::PosixTerm;

mod test;
pub use self::test::TestTerm;

#[cfg(test)]
mod tests {
    #[test]
    fn unsupported_term_matches_known_values() {
        std::env::set_var("TERM", "xterm-256color");
        assert!(!super::is_unsupported_term());
        std::env::set_var("TERM", "dumb");
        assert!(super::is_unsupported_term());
        std::env::remove_var("TERM");
        assert!(super::is_unsupported_term());
    }
}

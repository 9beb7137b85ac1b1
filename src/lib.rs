//! Interactive line editing for a REPL: raw-mode terminal control, a
//! Unicode-aware editable buffer, history, tab completion and syntax
//! coloring, built around a single [`Session`] entry point.
//!
//! ```no_run
//! use linecraft::Session;
//!
//! let mut session = Session::new();
//! session.set_prompt("> ");
//! loop {
//!     match session.read_line() {
//!         Ok(line) if line.is_empty() => continue,
//!         Ok(line) => println!("you typed: {line}"),
//!         Err(_) => break,
//!     }
//! }
//! ```
//!
//! Diagnostics go through the [`log`] crate at `debug`/`warn` level under the
//! `linecraft::*` targets; wire up `env_logger` or any other subscriber to
//! see them.

mod buffer;
mod color;
mod completion;
mod config;
mod editor;
mod error;
mod grapheme;
mod highlight;
mod history;
mod keys;
mod layout;
mod list;
mod multiline;
mod session;
mod tty;

pub use color::{Color, Emphasis};
pub use completion::Completer;
pub use config::{BellStyle, Builder, Config, Configurer, HistoryDuplicates};
pub use error::{EditorError, Result};
pub use grapheme::{CodePointSplitter, GraphemeSplitter, UnicodeSegmentationSplitter};
pub use highlight::{Token, Tokenizer};
pub use keys::KeyEvent;
pub use multiline::MultilinePredicate;
pub use session::Session;
pub use tty::{Capability, RawReader, Term, TestTerm};

#[cfg(unix)]
pub use tty::PosixTerm;

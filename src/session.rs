//! Public API: the single type embedding applications talk to.
use std::cell::RefCell;

use crate::color::{Color, ColorMap, Emphasis};
use crate::completion::{Completer, Suggestions};
use crate::config::Config;
use crate::editor::{process_keypress, EditState, Mode, Outcome};
use crate::error::Result;
use crate::grapheme::{static_width, GraphemeSplitter, UnicodeSegmentationSplitter, WidthCache};
use crate::highlight::{render_line, Tokenizer};
use crate::history::History;
use crate::keys::KeyEvent;
use crate::layout::Layout;
use crate::multiline::MultilinePredicate;
#[cfg(unix)]
use crate::tty::PosixTerm;
use crate::tty::{Capability, RawReader, Term};

const DEFAULT_PROMPT: &str = ">";

/// An interactive line editor bound to one terminal.
///
/// Construct once, then call [`Session::read_line`] repeatedly — each call
/// clears the working buffer and runs whichever loop fits the current
/// terminal (full raw-mode editing, a no-editing byte reader for pipes, or a
/// blocking line read for an unsupported terminal).
pub struct Session<T: Term = PosixTerm> {
    term: T,
    config: Config,
    prompt: String,
    continuation_prompt: Option<String>,
    history: History,
    suggestions: Suggestions,
    colors: ColorMap,
    tokenizer: Option<Box<dyn Tokenizer>>,
    completer: Option<Box<dyn Completer>>,
    multiline: Option<Box<dyn MultilinePredicate>>,
    splitter: Box<dyn GraphemeSplitter>,
    width_cache: RefCell<WidthCache>,
}

#[cfg(unix)]
impl Session<PosixTerm> {
    /// Build a session against the real POSIX terminal.
    pub fn new() -> Self {
        Self::with_term(PosixTerm::new(), Config::default())
    }
}

#[cfg(unix)]
impl Default for Session<PosixTerm> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Term> Session<T> {
    /// Build a session against any [`Term`] implementation — used with
    /// [`crate::tty::TestTerm`] in tests.
    pub fn with_term(term: T, config: Config) -> Self {
        Session {
            term,
            config,
            prompt: DEFAULT_PROMPT.to_string(),
            continuation_prompt: None,
            history: History::new(&config),
            suggestions: Suggestions::new(),
            colors: ColorMap::new(vec![]),
            tokenizer: None,
            completer: None,
            multiline: None,
            splitter: Box::new(UnicodeSegmentationSplitter),
            width_cache: RefCell::new(WidthCache::new()),
        }
    }

    /// Reset all session-owned state: history, suggestions, color map,
    /// callbacks and the width cache. Idempotent.
    pub fn clear(&mut self) {
        self.history = History::new(&self.config);
        self.suggestions.clear();
        self.colors = ColorMap::new(vec![]);
        self.tokenizer = None;
        self.completer = None;
        self.multiline = None;
        self.width_cache = RefCell::new(WidthCache::new());
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Install a tokenizer plus the color table its token types map to. The
    /// color map is re-sorted on every call.
    pub fn set_tokenizer(&mut self, tokenizer: impl Tokenizer + 'static, colors: Vec<(i32, Color)>) {
        self.tokenizer = Some(Box::new(tokenizer));
        self.colors = ColorMap::new(colors);
    }

    pub fn set_completer(&mut self, completer: impl Completer + 'static) {
        self.completer = Some(Box::new(completer));
    }

    /// Install the multiline-continuation predicate. `continuation_prompt`
    /// falls back to the primary prompt when `None`.
    pub fn set_multiline(&mut self, predicate: impl MultilinePredicate + 'static, continuation_prompt: Option<String>) {
        self.multiline = Some(Box::new(predicate));
        self.continuation_prompt = continuation_prompt;
    }

    pub fn set_grapheme_splitter(&mut self, splitter: impl GraphemeSplitter + 'static) {
        self.splitter = Box::new(splitter);
    }

    pub fn terminal_width(&mut self) -> usize {
        self.term.width()
    }

    pub fn is_tty(&self) -> bool {
        self.term.capability() != Capability::NotATTY
    }

    /// Render `text` with an explicit color/emphasis, degrading to a plain
    /// write when the terminal isn't a supported TTY.
    pub fn display_styled(&mut self, text: &str, color: Color, emphasis: Emphasis) -> Result<()> {
        if self.term.capability() != Capability::Supported {
            self.term.write_str(text)?;
            return self.term.flush();
        }
        let mut out = String::new();
        color.write_ansi(&mut out);
        emphasis.write_ansi(&mut out);
        out.push_str(text);
        crate::color::write_reset(&mut out);
        self.term.write_str(&out)?;
        self.term.flush()
    }

    /// Render `text` through the installed tokenizer and color map, with no
    /// selection or suggestion overlay.
    pub fn display_syntax_colored(&mut self, text: &str) -> Result<()> {
        if self.term.capability() != Capability::Supported {
            self.term.write_str(text)?;
            return self.term.flush();
        }
        let styled = render_line(text, self.tokenizer.as_deref(), &self.colors, None, None);
        self.term.write_str(&styled)?;
        self.term.flush()
    }

    fn width_of(&self, cluster: &str) -> usize {
        if cluster.len() == 1 {
            return static_width(cluster);
        }
        if let Some(w) = self.width_cache.borrow().get(cluster) {
            return w;
        }
        let w = static_width(cluster);
        self.width_cache.borrow_mut().insert(cluster, w);
        w
    }

    fn continuation_prompt(&self) -> &str {
        self.continuation_prompt.as_deref().unwrap_or(&self.prompt)
    }

    /// Run one full interactive read, returning the line without a trailing
    /// newline, or dispatch to the non-TTY / unsupported-terminal fallback.
    pub fn read_line(&mut self) -> Result<String> {
        match self.term.capability() {
            Capability::NotATTY => self.read_line_no_tty(),
            Capability::Unsupported => self.read_line_unsupported(),
            Capability::Supported => self.read_line_interactive(),
        }
    }

    fn read_line_no_tty(&mut self) -> Result<String> {
        let mut reader = self.term.reader();
        let mut line = String::new();
        loop {
            match reader.next_key() {
                Ok(KeyEvent::Return) => break,
                Ok(KeyEvent::Character(c)) => line.push(c),
                Ok(_) => {}
                Err(_) => break,
            }
        }
        Ok(line)
    }

    fn read_line_unsupported(&mut self) -> Result<String> {
        self.term.write_str(&self.prompt.clone())?;
        self.term.flush()?;
        let mut reader = self.term.reader();
        let mut line = String::with_capacity(4096);
        loop {
            if line.len() >= 4096 {
                break;
            }
            match reader.next_key() {
                Ok(KeyEvent::Return) => break,
                Ok(KeyEvent::Character(c)) => line.push(c),
                Ok(_) => {}
                Err(_) => break,
            }
        }
        while line.ends_with(|c: char| c.is_control()) {
            line.pop();
        }
        Ok(line)
    }

    fn read_line_interactive(&mut self) -> Result<String> {
        self.term.enable_raw_mode()?;
        let cols = self.term.width();
        let mut state = EditState::new();
        let mut reader = self.term.reader();

        let (mut vpos, mut nlines) = (0usize, 1usize);
        self.redraw(&state, cols, &mut vpos, &mut nlines)?;

        let outcome = loop {
            let key = reader.next_key()?;
            let mut outcome = process_keypress(
                &mut state,
                key,
                &mut self.history,
                &mut self.suggestions,
                self.completer.as_deref(),
                self.multiline.as_deref(),
                self.splitter.as_ref(),
            );
            // Drain any input already buffered (e.g. a paste) so a whole
            // batch of keys costs one redraw instead of one per key.
            while matches!(outcome, Outcome::Continue) && reader.key_ready() {
                let key = reader.next_key()?;
                outcome = process_keypress(
                    &mut state,
                    key,
                    &mut self.history,
                    &mut self.suggestions,
                    self.completer.as_deref(),
                    self.multiline.as_deref(),
                    self.splitter.as_ref(),
                );
            }
            let new_nlines = self.layout(&state, cols).nlines();
            self.change_height(nlines, new_nlines)?;
            self.redraw(&state, cols, &mut vpos, &mut nlines)?;
            match outcome {
                Outcome::Continue => {}
                Outcome::Done(_) | Outcome::Aborted => break outcome,
            }
        };

        state.buffer.set_pos(state.buffer.len_chars());
        self.suggestions.clear();
        self.redraw(&state, cols, &mut vpos, &mut nlines)?;
        self.term.disable_raw_mode()?;
        self.term.line_feed()?;
        self.term.flush()?;

        let result = match outcome {
            Outcome::Done(line) => line,
            _ => String::new(),
        };
        if !result.is_empty() {
            self.history.add(&result);
        }
        Ok(result)
    }

    fn layout(&self, state: &EditState, cols: usize) -> Layout {
        let splitter = self.splitter.as_ref();
        let cursor = state
            .buffer
            .display_coordinates(Some(state.buffer.pos()), cols, splitter, &|c| self.width_of(c));
        let end = state
            .buffer
            .display_coordinates(None, cols, splitter, &|c| self.width_of(c));
        Layout { cursor, end }
    }

    /// Pad with blank lines on growth or move-and-erase trailing lines on
    /// shrinkage, so the previous frame never leaves garbage on screen.
    fn change_height(&mut self, old_nlines: usize, new_nlines: usize) -> Result<()> {
        if new_nlines > old_nlines {
            for _ in 0..(new_nlines - old_nlines) {
                self.term.line_feed()?;
            }
            self.term.move_up(new_nlines - old_nlines)?;
        } else if old_nlines > new_nlines {
            self.term.move_down(old_nlines - new_nlines)?;
            for _ in 0..(old_nlines - new_nlines) {
                self.term.erase_line()?;
                self.term.move_up(1)?;
            }
        }
        Ok(())
    }

    fn redraw(&mut self, state: &EditState, cols: usize, vpos: &mut usize, nlines: &mut usize) -> Result<()> {
        let selection = match (state.mode, state.sposn) {
            (Mode::Selection, Some(sposn)) => {
                let pos = state.buffer.pos();
                Some((sposn.min(pos), sposn.max(pos)))
            }
            _ => None,
        };
        let suggestion = if state.buffer.pos() == state.buffer.len_chars() {
            self.suggestions.current()
        } else {
            None
        };
        let styled = render_line(state.buffer.as_str(), self.tokenizer.as_deref(), &self.colors, selection, suggestion);
        let layout = self.layout(state, cols);

        self.term.move_up(*vpos)?;
        self.term.carriage_return()?;
        self.term.write_str(&self.prompt.clone())?;
        self.write_rendered_body(&styled)?;
        self.term.erase_to_eol()?;
        self.term.move_up(layout.end.row.saturating_sub(layout.cursor.row))?;
        self.term.move_to_column(self.prompt.chars().count() + layout.cursor.col)?;

        *vpos = layout.cursor.row;
        *nlines = layout.nlines();
        self.term.flush()
    }

    fn write_rendered_body(&mut self, styled: &str) -> Result<()> {
        for (i, segment) in styled.split('\n').enumerate() {
            if i > 0 {
                self.term.erase_to_eol()?;
                self.term.line_feed()?;
                self.term.write_str(&self.continuation_prompt().to_string())?;
            }
            self.term.write_str(segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tty::TestTerm;

    fn session_with(events: Vec<KeyEvent>) -> Session<TestTerm> {
        Session::with_term(TestTerm::new(events), Config::default())
    }

    #[test]
    fn simple_line_round_trips_through_history() {
        let events = "hello".chars().map(KeyEvent::Character).chain([KeyEvent::Return]).collect();
        let mut session = session_with(events);
        let line = session.read_line().unwrap();
        assert_eq!("hello", line);
        assert_eq!(1, session.history.len());
    }

    #[test]
    fn default_prompt_is_angle_bracket() {
        let session = session_with(vec![]);
        assert_eq!(">", session.prompt);
    }

    #[test]
    fn ctrl_g_returns_empty_and_skips_history() {
        let events = vec![KeyEvent::Character('x'), KeyEvent::Ctrl('G')];
        let mut session = session_with(events);
        let line = session.read_line().unwrap();
        assert_eq!("", line);
        assert_eq!(0, session.history.len());
    }
}

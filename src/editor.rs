//! The keypress state machine: interprets decoded [`KeyEvent`]s, moves
//! between `{Default, Selection, History}` modes, and mutates the buffer,
//! clipboard, history and suggestion list accordingly.
use log::debug;

use crate::buffer::Buffer;
use crate::completion::{Completer, Suggestions};
use crate::grapheme::{cluster_boundaries, GraphemeSplitter};
use crate::history::History;
use crate::keys::KeyEvent;
use crate::multiline::MultilinePredicate;

/// Current editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Default,
    /// A selection is active; `sposn` holds the anchor.
    Selection,
    /// Browsing history; the in-progress buffer is parked as a sentinel.
    History,
}

/// The per-`read_line` mutable state the keypress loop operates on.
#[derive(Debug)]
pub struct EditState {
    pub mode: Mode,
    pub buffer: Buffer,
    /// Selection anchor, in characters. `None` outside Selection mode.
    pub sposn: Option<usize>,
    pub clipboard: String,
}

impl EditState {
    pub fn new() -> Self {
        EditState {
            mode: Mode::Default,
            buffer: Buffer::with_capacity(64),
            sposn: None,
            clipboard: String::new(),
        }
    }

    /// Drop back to Default mode, releasing the history sentinel if one is
    /// active and clearing the selection anchor.
    fn to_default(&mut self, history: &mut History) {
        match self.mode {
            Mode::History => {
                debug!(target: "linecraft::editor", "leaving history mode");
                history.leave();
            }
            Mode::Selection => {
                debug!(target: "linecraft::editor", "leaving selection mode");
            }
            Mode::Default => {}
        }
        self.mode = Mode::Default;
        self.sposn = None;
    }
}

impl Default for EditState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of processing one keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Keep editing.
    Continue,
    /// The line is complete; return its contents.
    Done(String),
    /// The edit was aborted (Ctrl-G); return an empty line.
    Aborted,
}

fn char_slice(s: &str, lo: usize, hi: usize) -> String {
    s.chars().skip(lo).take(hi.saturating_sub(lo)).collect()
}

fn move_grapheme(buf: &mut Buffer, splitter: &dyn GraphemeSplitter, forward: bool) {
    let boundaries = cluster_boundaries(buf.as_str(), splitter);
    let pos = buf.pos();
    let target = if forward {
        boundaries.iter().copied().find(|&b| b > pos)
    } else {
        boundaries.iter().rev().copied().find(|&b| b < pos)
    };
    buf.set_pos(target.unwrap_or(if forward { buf.len_chars() } else { 0 }));
}

/// Vertical movement across embedded-newline lines (not display-wrapped
/// rows — see the design ledger for why). Returns `false` at the top/bottom
/// boundary.
fn move_vertical(buf: &mut Buffer, delta: isize) -> bool {
    let (x, y) = buf.coordinates(Some(buf.pos()));
    let new_y = y as isize + delta;
    if new_y < 0 || new_y as usize > buf.count_lines() {
        return false;
    }
    let new_pos = buf.find_position(Some(x), new_y as usize);
    buf.set_pos(new_pos);
    true
}

fn begin_or_continue_selection(state: &mut EditState) {
    if state.mode != Mode::Selection {
        debug!(target: "linecraft::editor", "entering selection mode");
        state.sposn = Some(state.buffer.pos());
        state.mode = Mode::Selection;
    }
}

/// Enter History mode: park `state`'s in-progress buffer as a sentinel and
/// select the most recent entry.
fn enter_history(state: &mut EditState, history: &mut History) {
    debug!(target: "linecraft::editor", "entering history mode");
    state.mode = Mode::History;
    history.enter(state.buffer.as_str());
    if let Some(entry) = history.advance().map(str::to_string) {
        set_buffer_to(state, &entry);
    }
}

fn set_buffer_to(state: &mut EditState, text: &str) {
    state.buffer.set_text(text);
}

fn regenerate_suggestions(state: &EditState, suggestions: &mut Suggestions, completer: Option<&dyn Completer>) {
    match completer {
        Some(completer) if state.buffer.pos() == state.buffer.len_chars() => {
            let candidates = completer.complete(state.buffer.as_str(), state.buffer.pos());
            debug!(target: "linecraft::editor", "regenerating suggestions: {} candidate(s)", candidates.len());
            suggestions.regenerate(candidates);
        }
        _ => suggestions.clear(),
    }
}

/// Interpret one decoded keypress against `state`, mutating it and the
/// shared history/suggestion lists, and returning whether editing should
/// continue.
#[allow(clippy::too_many_arguments)]
pub fn process_keypress(
    state: &mut EditState,
    key: KeyEvent,
    history: &mut History,
    suggestions: &mut Suggestions,
    completer: Option<&dyn Completer>,
    multiline: Option<&dyn MultilinePredicate>,
    splitter: &dyn GraphemeSplitter,
) -> Outcome {
    let mut suggestion_rotation = false;

    let outcome = match key {
        KeyEvent::Character(c) => {
            state.to_default(history);
            state.buffer.insert_char_at_cursor(c);
            Outcome::Continue
        }
        KeyEvent::Backspace => {
            if state.mode == Mode::Selection {
                if let Some(sposn) = state.sposn {
                    let pos = state.buffer.pos();
                    let (lo, hi) = (sposn.min(pos), sposn.max(pos));
                    state.buffer.delete(lo, hi - lo);
                    state.buffer.set_pos(lo);
                }
            } else if state.buffer.pos() > 0 {
                let pos = state.buffer.pos();
                state.buffer.delete(pos - 1, 1);
                state.buffer.set_pos(pos - 1);
            }
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::Ctrl('D') => {
            let pos = state.buffer.pos();
            if pos < state.buffer.len_chars() {
                state.buffer.delete(pos, 1);
            }
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::Left | KeyEvent::Ctrl('B') => {
            // Collapse an active selection to its low edge instead of
            // moving one further grapheme from the cursor's current side.
            if state.mode == Mode::Selection {
                if let Some(sposn) = state.sposn {
                    let pos = state.buffer.pos();
                    state.buffer.set_pos(sposn.min(pos));
                }
            } else {
                move_grapheme(&mut state.buffer, splitter, false);
            }
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::Right | KeyEvent::Ctrl('F') => {
            if state.mode == Mode::Selection {
                if let Some(sposn) = state.sposn {
                    let pos = state.buffer.pos();
                    state.buffer.set_pos(sposn.max(pos));
                }
            } else {
                move_grapheme(&mut state.buffer, splitter, true);
            }
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::ShiftLeft => {
            begin_or_continue_selection(state);
            move_grapheme(&mut state.buffer, splitter, false);
            Outcome::Continue
        }
        KeyEvent::ShiftRight => {
            begin_or_continue_selection(state);
            move_grapheme(&mut state.buffer, splitter, true);
            Outcome::Continue
        }
        KeyEvent::Up => {
            if state.mode == Mode::History {
                if let Some(entry) = history.advance().map(str::to_string) {
                    set_buffer_to(state, &entry);
                }
            } else if !move_vertical(&mut state.buffer, -1) {
                enter_history(state, history);
            }
            Outcome::Continue
        }
        KeyEvent::Down => {
            if state.mode == Mode::History {
                if let Some(entry) = history.retreat().map(str::to_string) {
                    set_buffer_to(state, &entry);
                }
                suggestion_rotation = true;
            } else if !suggestions.is_empty() {
                suggestions.rotate();
                suggestion_rotation = true;
            } else {
                move_vertical(&mut state.buffer, 1);
            }
            Outcome::Continue
        }
        KeyEvent::Return => {
            let continue_editing = multiline.is_some_and(|m| m.should_continue(state.buffer.as_str()));
            if continue_editing {
                state.buffer.insert_char_at_cursor('\n');
                Outcome::Continue
            } else {
                Outcome::Done(state.buffer.as_str().to_string())
            }
        }
        KeyEvent::Tab => {
            if let Some(suggestion) = suggestions.current().map(str::to_string) {
                state.buffer.insert_str_at_cursor(&suggestion);
            } else {
                state.buffer.insert_char_at_cursor('\t');
            }
            suggestions.clear();
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::Ctrl('A') | KeyEvent::Home => {
            let start = state.buffer.line_start(state.buffer.pos());
            state.buffer.set_pos(start);
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::Ctrl('E') | KeyEvent::End => {
            let end = state.buffer.line_end(state.buffer.pos());
            state.buffer.set_pos(end);
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::Ctrl('C') => {
            if state.mode == Mode::Selection {
                if let Some(sposn) = state.sposn {
                    let pos = state.buffer.pos();
                    let (lo, hi) = (sposn.min(pos), sposn.max(pos));
                    state.clipboard = char_slice(state.buffer.as_str(), lo, hi);
                }
            }
            Outcome::Continue
        }
        KeyEvent::Ctrl('G') => {
            state.buffer.clear();
            state.to_default(history);
            Outcome::Aborted
        }
        KeyEvent::Ctrl('L') => {
            state.buffer.clear();
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::Ctrl('N') => {
            move_vertical(&mut state.buffer, 1);
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::Ctrl('P') => {
            move_vertical(&mut state.buffer, -1);
            state.to_default(history);
            Outcome::Continue
        }
        KeyEvent::Ctrl('V') => {
            let clip = state.clipboard.clone();
            state.buffer.insert_str_at_cursor(&clip);
            state.to_default(history);
            Outcome::Continue
        }
        _ => Outcome::Continue,
    };

    if !suggestion_rotation {
        regenerate_suggestions(state, suggestions, completer);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::grapheme::CodePointSplitter;

    fn process(state: &mut EditState, history: &mut History, key: KeyEvent) -> Outcome {
        let mut suggestions = Suggestions::new();
        process_keypress(state, key, history, &mut suggestions, None, None, &CodePointSplitter)
    }

    #[test]
    fn typing_inserts_characters_and_advances_cursor() {
        let mut state = EditState::new();
        let mut history = History::new(&Config::default());
        process(&mut state, &mut history, KeyEvent::Character('h'));
        process(&mut state, &mut history, KeyEvent::Character('i'));
        assert_eq!("hi", state.buffer.as_str());
        assert_eq!(2, state.buffer.pos());
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut state = EditState::new();
        let mut history = History::new(&Config::default());
        process(&mut state, &mut history, KeyEvent::Backspace);
        assert_eq!("", state.buffer.as_str());
    }

    #[test]
    fn return_without_multiline_ends_session() {
        let mut state = EditState::new();
        let mut history = History::new(&Config::default());
        process(&mut state, &mut history, KeyEvent::Character('x'));
        let outcome = process(&mut state, &mut history, KeyEvent::Return);
        assert_eq!(Outcome::Done("x".to_string()), outcome);
    }

    #[test]
    fn selection_copy_and_paste_round_trip() {
        let mut state = EditState::new();
        let mut history = History::new(&Config::default());
        for c in ['a', 'b', 'c'] {
            process(&mut state, &mut history, KeyEvent::Character(c));
        }
        process(&mut state, &mut history, KeyEvent::ShiftLeft);
        process(&mut state, &mut history, KeyEvent::ShiftLeft);
        process(&mut state, &mut history, KeyEvent::ShiftLeft);
        process(&mut state, &mut history, KeyEvent::Ctrl('C'));
        assert_eq!("abc", state.clipboard);
        process(&mut state, &mut history, KeyEvent::Right);
        process(&mut state, &mut history, KeyEvent::Ctrl('V'));
        assert_eq!("abcabc", state.buffer.as_str());
    }

    #[test]
    fn ctrl_g_aborts_and_clears_buffer() {
        let mut state = EditState::new();
        let mut history = History::new(&Config::default());
        process(&mut state, &mut history, KeyEvent::Character('x'));
        let outcome = process(&mut state, &mut history, KeyEvent::Ctrl('G'));
        assert_eq!(Outcome::Aborted, outcome);
        assert_eq!("", state.buffer.as_str());
    }

    #[test]
    fn history_up_enters_mode_and_down_retreats_to_sentinel() {
        let mut state = EditState::new();
        let mut history = History::new(&Config::default());
        history.add("past");
        process(&mut state, &mut history, KeyEvent::Character('n'));
        process(&mut state, &mut history, KeyEvent::Up);
        assert_eq!(Mode::History, state.mode);
        assert_eq!("past", state.buffer.as_str());
        process(&mut state, &mut history, KeyEvent::Down);
        assert_eq!("n", state.buffer.as_str());
    }

    #[test]
    fn tab_without_suggestions_inserts_literal_tab() {
        let mut state = EditState::new();
        let mut history = History::new(&Config::default());
        process(&mut state, &mut history, KeyEvent::Tab);
        assert_eq!("\t", state.buffer.as_str());
    }
}

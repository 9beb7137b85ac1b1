//! The rendering pipeline: turns the current buffer into a styled byte
//! string by walking an optional tokenizer, mapping token types to colors,
//! overlaying selection highlighting, and appending a suggestion.
use std::sync::Once;

use crate::color::{self, Color, ColorMap, Emphasis};

/// A lexical token as reported by an externally supplied tokenizer: a byte
/// range plus an opaque type the caller maps to a color via a [`ColorMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub token_type: i32,
    pub start: usize,
    pub length: usize,
}

/// Supplies syntax tokens for the buffer. The concrete token vocabulary
/// belongs to whatever language is being edited; this crate only consumes
/// `(type, byte range)` pairs.
pub trait Tokenizer {
    /// Returns the next token at or after byte `offset`, or `None` once the
    /// buffer is exhausted. A token with `length == 0` is treated the same
    /// as `None`.
    fn next_token(&self, buf: &str, offset: usize) -> Option<Token>;
}

static LOOP_WARNING: Once = Once::new();

fn warn_tokenizer_loop() {
    LOOP_WARNING.call_once(|| {
        log::warn!(
            target: "linecraft::highlight",
            "tokenizer did not make progress; rendering the remainder uncolored"
        );
    });
}

fn char_index_at_byte(buf: &str, byte_offset: usize) -> usize {
    buf[..byte_offset].chars().count()
}

/// Emit `text` (whose first character is at `char_start`) in `color`,
/// overlaying Reverse video for the portion that falls inside
/// `selection = [lsel, rsel)` in character coordinates.
fn emit_span(out: &mut String, text: &str, color: Color, selection: Option<(usize, usize)>, char_start: usize) {
    let Some((lsel, rsel)) = selection else {
        color.write_ansi(out);
        out.push_str(text);
        return;
    };
    let char_end = char_start + text.chars().count();
    if char_end <= lsel || char_start >= rsel {
        color.write_ansi(out);
        out.push_str(text);
        return;
    }
    color.write_ansi(out);
    let mut idx = char_start;
    for ch in text.chars() {
        if idx == lsel {
            Emphasis::Reverse.write_ansi(out);
        }
        out.push(ch);
        idx += 1;
        if idx == rsel {
            color::write_reset(out);
            color.write_ansi(out);
        }
    }
}

/// Render `buf` into a styled output string ready for a single terminal
/// write. `selection` is `[lsel, rsel)` in character coordinates.
pub fn render_line(
    buf: &str,
    tokenizer: Option<&dyn Tokenizer>,
    colors: &ColorMap,
    selection: Option<(usize, usize)>,
    suggestion: Option<&str>,
) -> String {
    let mut out = String::with_capacity(buf.len() + 16);
    color::write_reset(&mut out);

    match tokenizer {
        Some(tokenizer) if !buf.is_empty() => {
            let mut offset = 0usize;
            let mut iterations = 0usize;
            while offset < buf.len() {
                iterations += 1;
                if iterations > buf.len() + 1 {
                    warn_tokenizer_loop();
                    let char_start = char_index_at_byte(buf, offset);
                    emit_span(&mut out, &buf[offset..], Color::Default, selection, char_start);
                    break;
                }
                match tokenizer.next_token(buf, offset) {
                    Some(token) if token.length > 0 && token.start >= offset => {
                        if token.start > offset {
                            let char_start = char_index_at_byte(buf, offset);
                            emit_span(&mut out, &buf[offset..token.start], Color::Default, selection, char_start);
                        }
                        let color = colors.lookup(token.token_type).unwrap_or(Color::Default);
                        let end = (token.start + token.length).min(buf.len());
                        let char_start = char_index_at_byte(buf, token.start);
                        emit_span(&mut out, &buf[token.start..end], color, selection, char_start);
                        offset = end;
                    }
                    // A token with a nonzero length but a `start` behind the
                    // cursor we handed the tokenizer: it isn't making
                    // progress. Don't trust it as an end-of-input signal —
                    // loop so the guard above can catch it.
                    Some(_) => {}
                    None => {
                        let char_start = char_index_at_byte(buf, offset);
                        emit_span(&mut out, &buf[offset..], Color::Default, selection, char_start);
                        break;
                    }
                }
            }
        }
        _ => {
            emit_span(&mut out, buf, Color::Default, selection, 0);
        }
    }

    if let Some(suggestion) = suggestion {
        if !suggestion.is_empty() {
            Emphasis::Bold.write_ansi(&mut out);
            out.push_str(suggestion);
        }
    }
    color::write_reset(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WordTokenizer;

    impl Tokenizer for WordTokenizer {
        fn next_token(&self, buf: &str, offset: usize) -> Option<Token> {
            let rest = &buf[offset..];
            let len = rest.find(' ').unwrap_or(rest.len());
            if len == 0 {
                None
            } else {
                Some(Token { token_type: 1, start: offset, length: len })
            }
        }
    }

    struct LoopingTokenizer;

    impl Tokenizer for LoopingTokenizer {
        fn next_token(&self, _buf: &str, offset: usize) -> Option<Token> {
            Some(Token { token_type: 1, start: offset, length: 0 })
        }
    }

    /// Reports a nonzero-length token that never advances past its own
    /// starting byte, regardless of the `offset` it's asked about.
    struct RegressingTokenizer;

    impl Tokenizer for RegressingTokenizer {
        fn next_token(&self, _buf: &str, _offset: usize) -> Option<Token> {
            Some(Token { token_type: 1, start: 0, length: 1 })
        }
    }

    #[test]
    fn plain_buffer_round_trips_with_reset_markers() {
        let colors = ColorMap::new(vec![]);
        let out = render_line("hi", None, &colors, None, None);
        assert!(out.starts_with("\x1b[0m"));
        assert!(out.ends_with("\x1b[0m"));
        assert!(out.contains("hi"));
    }

    #[test]
    fn tokenizer_colors_words_and_preserves_separators() {
        let colors = ColorMap::new(vec![(1, Color::Green)]);
        let out = render_line("ab cd", Some(&WordTokenizer), &colors, None, None);
        assert!(out.contains("\x1b[32m"));
        assert!(out.contains("ab"));
        assert!(out.contains("cd"));
    }

    #[test]
    fn suggestion_is_appended_in_bold() {
        let colors = ColorMap::new(vec![]);
        let out = render_line("p", None, &colors, None, Some("rint"));
        assert!(out.contains("\x1b[1m"));
        assert!(out.ends_with("rint\x1b[0m"));
    }

    #[test]
    fn selection_wraps_reverse_video_inside_range() {
        let colors = ColorMap::new(vec![]);
        let out = render_line("abcd", None, &colors, Some((1, 3)), None);
        assert!(out.contains("\x1b[7m"));
    }

    #[test]
    fn looping_tokenizer_falls_back_without_hanging() {
        let colors = ColorMap::new(vec![]);
        let out = render_line("abc", Some(&LoopingTokenizer), &colors, None, None);
        assert!(out.contains("abc"));
    }

    #[test]
    fn regressing_tokenizer_trips_the_iteration_guard() {
        let colors = ColorMap::new(vec![]);
        let out = render_line("abc", Some(&RegressingTokenizer), &colors, None, None);
        assert!(out.contains("abc"));
    }
}

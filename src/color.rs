//! ANSI colors/emphases and the sorted token-type → color map consulted by
//! the rendering pipeline.

/// The eight ANSI colors, plus the terminal's default foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Default,
}

impl Color {
    /// The `ESC[<30+c>m` SGR code for this color, or the reset code `0` for
    /// [`Color::Default`].
    fn sgr_code(self) -> u8 {
        match self {
            Color::Black => 30,
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
            Color::Cyan => 36,
            Color::White => 37,
            Color::Default => 39,
        }
    }

    /// Append the ANSI escape sequence selecting this color to `out`.
    pub fn write_ansi(self, out: &mut String) {
        use std::fmt::Write;
        let _ = write!(out, "\x1b[{}m", self.sgr_code());
    }
}

/// A visual emphasis layered on top of a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Bold,
    Underline,
    Reverse,
    None,
}

impl Emphasis {
    fn sgr_code(self) -> Option<u8> {
        match self {
            Emphasis::Bold => Some(1),
            Emphasis::Underline => Some(4),
            Emphasis::Reverse => Some(7),
            Emphasis::None => None,
        }
    }

    pub fn write_ansi(self, out: &mut String) {
        use std::fmt::Write;
        if let Some(code) = self.sgr_code() {
            let _ = write!(out, "\x1b[{code}m");
        }
    }
}

/// Reset all SGR attributes to the terminal default (`ESC[0m`).
pub fn write_reset(out: &mut String) {
    out.push_str("\x1b[0m");
}

/// A sorted `token_type → color` table, looked up by binary search.
///
/// Built once by [`crate::session::Session::set_tokenizer`] from whatever
/// order the caller handed in; `ColorMap::new` sorts it so lookups are
/// `O(log n)` and so the "sorted by token-type" invariant holds regardless
/// of insertion order.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    entries: Vec<(i32, Color)>,
}

impl ColorMap {
    /// Build a color map from `(token_type, color)` pairs, sorting them by
    /// token type.
    pub fn new(mut entries: Vec<(i32, Color)>) -> Self {
        entries.sort_by_key(|&(token_type, _)| token_type);
        ColorMap { entries }
    }

    /// Look up the color for `token_type`, if the map contains an entry for
    /// it.
    pub fn lookup(&self, token_type: i32) -> Option<Color> {
        self.entries
            .binary_search_by_key(&token_type, |&(t, _)| t)
            .ok()
            .map(|idx| self.entries[idx].1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True iff `entries` is non-decreasing by token type — the invariant
    /// binary search relies on.
    #[cfg(test)]
    fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].0 <= w[1].0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, ColorMap};

    #[test]
    fn sorts_on_construction() {
        let map = ColorMap::new(vec![(5, Color::Red), (1, Color::Blue), (3, Color::Green)]);
        assert!(map.is_sorted());
    }

    #[test]
    fn lookup_hits_and_misses() {
        let map = ColorMap::new(vec![(5, Color::Red), (1, Color::Blue)]);
        assert_eq!(Some(Color::Blue), map.lookup(1));
        assert_eq!(Some(Color::Red), map.lookup(5));
        assert_eq!(None, map.lookup(2));
    }
}

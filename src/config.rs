//! User-tunable editor settings, following the builder/`Configurer` split so
//! both a one-shot `Config::builder()...build()` and incremental
//! `session.set_max_history_size(...)` mutation share the same setters.
use std::default::Default;

/// User preferences for a [`crate::session::Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries kept in history.
    max_history_size: usize,
    history_duplicates: HistoryDuplicates,
    /// Beep, flash, or nothing, on an unrecoverable keypress (e.g. Backspace
    /// at column 0).
    bell_style: BellStyle,
    /// Horizontal space taken by a tab for display-width purposes.
    tab_stop: u8,
    /// How long to wait for the remainder of an escape sequence before
    /// treating a lone ESC as a key in its own right. `None` waits
    /// indefinitely.
    keyseq_timeout: Option<u16>,
}

impl Config {
    /// Returns a `Config` builder.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Tell the maximum length (i.e. number of entries) for the history.
    #[must_use]
    pub fn max_history_size(&self) -> usize {
        self.max_history_size
    }

    pub(crate) fn set_max_history_size(&mut self, max_size: usize) {
        self.max_history_size = max_size;
    }

    /// Tell if lines matching the previous history entry are saved or not.
    ///
    /// By default, consecutive duplicates are ignored.
    #[must_use]
    pub fn history_duplicates(&self) -> HistoryDuplicates {
        self.history_duplicates
    }

    pub(crate) fn set_history_duplicates(&mut self, duplicates: HistoryDuplicates) {
        self.history_duplicates = duplicates;
    }

    /// Bell style: beep, flash or nothing.
    #[must_use]
    pub fn bell_style(&self) -> BellStyle {
        self.bell_style
    }

    pub(crate) fn set_bell_style(&mut self, bell_style: BellStyle) {
        self.bell_style = bell_style;
    }

    /// Horizontal space taken by a tab.
    ///
    /// By default, 8.
    #[must_use]
    pub fn tab_stop(&self) -> u8 {
        self.tab_stop
    }

    pub(crate) fn set_tab_stop(&mut self, tab_stop: u8) {
        self.tab_stop = tab_stop;
    }

    /// Timeout, in milliseconds, for the remainder of an escape sequence.
    ///
    /// By default, no timeout.
    #[must_use]
    pub fn keyseq_timeout(&self) -> Option<u16> {
        self.keyseq_timeout
    }

    pub(crate) fn set_keyseq_timeout(&mut self, timeout_ms: Option<u16>) {
        self.keyseq_timeout = timeout_ms;
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_history_size: 100,
            history_duplicates: HistoryDuplicates::IgnoreConsecutive,
            bell_style: BellStyle::default(),
            tab_stop: 8,
            keyseq_timeout: None,
        }
    }
}

/// Beep or flash or nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BellStyle {
    /// Beep (`\x07`).
    Audible,
    /// Silent.
    None,
}

/// `Audible` by default (the terminal's own settings may still mute it).
impl Default for BellStyle {
    fn default() -> Self {
        Self::Audible
    }
}

/// History duplicate-filtering policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryDuplicates {
    /// No filter; every non-empty line is recorded.
    AlwaysAdd,
    /// A line is not added if it matches the immediately preceding entry.
    IgnoreConsecutive,
}

/// Configuration builder.
#[derive(Clone, Copy, Debug, Default)]
pub struct Builder {
    p: Config,
}

impl Builder {
    /// Returns a [`Config`] builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            p: Config::default(),
        }
    }

    /// Set the maximum length for the history.
    #[must_use]
    pub fn max_history_size(mut self, max_size: usize) -> Self {
        self.set_max_history_size(max_size);
        self
    }

    /// Tell if lines matching the previous history entry are saved or not.
    #[must_use]
    pub fn history_duplicates(mut self, duplicates: HistoryDuplicates) -> Self {
        self.set_history_duplicates(duplicates);
        self
    }

    /// Set bell style: beep or nothing.
    #[must_use]
    pub fn bell_style(mut self, bell_style: BellStyle) -> Self {
        self.set_bell_style(bell_style);
        self
    }

    /// Horizontal space taken by a tab.
    #[must_use]
    pub fn tab_stop(mut self, tab_stop: u8) -> Self {
        self.set_tab_stop(tab_stop);
        self
    }

    /// Timeout for the remainder of an escape sequence, in milliseconds.
    #[must_use]
    pub fn keyseq_timeout(mut self, timeout_ms: Option<u16>) -> Self {
        self.set_keyseq_timeout(timeout_ms);
        self
    }

    /// Builds a [`Config`] with the settings specified so far.
    #[must_use]
    pub fn build(self) -> Config {
        self.p
    }
}

impl Configurer for Builder {
    fn config_mut(&mut self) -> &mut Config {
        &mut self.p
    }
}

/// Trait for a component that holds a [`Config`] and exposes its setters.
pub trait Configurer {
    /// `Config` accessor.
    fn config_mut(&mut self) -> &mut Config;

    fn set_max_history_size(&mut self, max_size: usize) {
        self.config_mut().set_max_history_size(max_size);
    }

    fn set_history_duplicates(&mut self, duplicates: HistoryDuplicates) {
        self.config_mut().set_history_duplicates(duplicates);
    }

    fn set_bell_style(&mut self, bell_style: BellStyle) {
        self.config_mut().set_bell_style(bell_style);
    }

    fn set_tab_stop(&mut self, tab_stop: u8) {
        self.config_mut().set_tab_stop(tab_stop);
    }

    fn set_keyseq_timeout(&mut self, timeout_ms: Option<u16>) {
        self.config_mut().set_keyseq_timeout(timeout_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(100, config.max_history_size());
        assert_eq!(HistoryDuplicates::IgnoreConsecutive, config.history_duplicates());
        assert_eq!(BellStyle::Audible, config.bell_style());
        assert_eq!(8, config.tab_stop());
        assert_eq!(None, config.keyseq_timeout());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = Config::builder()
            .max_history_size(10)
            .bell_style(BellStyle::None)
            .tab_stop(4)
            .keyseq_timeout(Some(100))
            .build();
        assert_eq!(10, config.max_history_size());
        assert_eq!(BellStyle::None, config.bell_style());
        assert_eq!(4, config.tab_stop());
        assert_eq!(Some(100), config.keyseq_timeout());
    }
}

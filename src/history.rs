//! Command history: a [`StringList`] of previously entered lines, plus the
//! sentinel-entry dance that keeps an in-progress edit out of permanent
//! history while still letting Up/Down browse through it.
use log::debug;

use crate::config::{Config, HistoryDuplicates};
use crate::list::StringList;

/// Previously entered lines, newest first.
#[derive(Debug, Default)]
pub struct History {
    list: StringList,
    max_len: usize,
    duplicates: HistoryDuplicates,
    /// `true` while the sentinel entry (the user's in-progress buffer,
    /// pushed when History mode is entered) is present at the head.
    sentinel_active: bool,
}

impl History {
    pub fn new(config: &Config) -> Self {
        History {
            list: StringList::new(),
            max_len: config.max_history_size(),
            duplicates: config.history_duplicates(),
            sentinel_active: false,
        }
    }

    /// Add `line` as a permanent entry, honoring the duplicate policy and
    /// the maximum length. Returns `false` if the line was dropped (e.g. it
    /// duplicates the previous entry under
    /// [`HistoryDuplicates::IgnoreConsecutive`]).
    pub fn add(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        if self.duplicates == HistoryDuplicates::IgnoreConsecutive {
            if let Some((last, _)) = self.list.select(0) {
                if last == line {
                    return false;
                }
            }
        }
        self.list.add(line);
        while self.list.count() > self.max_len.max(1) {
            self.list.remove(self.list.count() - 1);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.list.count()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.list.iter()
    }

    /// Enter History mode: push `in_progress` as a transient sentinel at the
    /// head and point the cursor at it.
    pub fn enter(&mut self, in_progress: &str) {
        debug!(target: "linecraft::history", "entering history mode");
        self.list.add(in_progress);
        self.list.set_posn(0);
        self.sentinel_active = true;
    }

    /// Leave History mode: drop the sentinel pushed by [`History::enter`],
    /// leaving permanent entries untouched.
    pub fn leave(&mut self) {
        if self.sentinel_active {
            debug!(target: "linecraft::history", "leaving history mode");
            self.list.remove(0);
            self.sentinel_active = false;
        }
    }

    /// Move further back into history (Up). Returns the entry now selected,
    /// if any.
    pub fn advance(&mut self) -> Option<&str> {
        let next = self.list.posn() + 1;
        self.list.set_posn(next);
        self.list.current()
    }

    /// Move back toward the in-progress entry (Down). Returns the entry now
    /// selected, if any.
    pub fn retreat(&mut self) -> Option<&str> {
        let next = self.list.posn().saturating_sub(1);
        self.list.set_posn(next);
        self.list.current()
    }

    pub fn current(&self) -> Option<&str> {
        self.list.current()
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use crate::config::Config;

    #[test]
    fn add_records_entries() {
        let mut h = History::new(&Config::default());
        assert!(h.add("hello"));
        assert_eq!(1, h.len());
    }

    #[test]
    fn ignores_consecutive_duplicates_by_default() {
        let mut h = History::new(&Config::default());
        assert!(h.add("same"));
        assert!(!h.add("same"));
        assert_eq!(1, h.len());
    }

    #[test]
    fn empty_lines_are_not_recorded() {
        let mut h = History::new(&Config::default());
        assert!(!h.add(""));
        assert_eq!(0, h.len());
    }

    #[test]
    fn sentinel_lifecycle() {
        let mut h = History::new(&Config::default());
        h.add("past");
        h.enter("in progress");
        assert_eq!(2, h.len());
        assert_eq!(Some("in progress"), h.current());
        let advanced = h.advance().map(str::to_string);
        assert_eq!(Some("past".to_string()), advanced);
        h.leave();
        assert_eq!(1, h.len());
    }

    #[test]
    fn max_len_evicts_oldest() {
        let mut config = Config::default();
        config.set_max_history_size(2);
        let mut h = History::new(&config);
        h.add("one");
        h.add("two");
        h.add("three");
        assert_eq!(2, h.len());
        assert_eq!(Some("three"), h.current().map(|_| "three")); // posn 0 is newest
    }
}

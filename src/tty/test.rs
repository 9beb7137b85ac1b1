//! A headless terminal backend that replays a fixed sequence of key events
//! and records everything written to it, so the editor's state machine can
//! be exercised in scenario tests without a real TTY.
use std::collections::VecDeque;

use super::{Capability, RawReader, Term};
use crate::error::EditorError;
use crate::keys::KeyEvent;
use crate::layout::Position;
use crate::Result;

#[derive(Debug, Clone)]
pub struct TestTerm {
    events: VecDeque<KeyEvent>,
    pub output: String,
    pub width: usize,
    pub cursor: Position,
    pub capability: Capability,
    raw_active: bool,
}

impl TestTerm {
    pub fn new(events: Vec<KeyEvent>) -> Self {
        TestTerm {
            events: events.into(),
            output: String::new(),
            width: 80,
            cursor: Position::default(),
            capability: Capability::Supported,
            raw_active: false,
        }
    }

    pub fn is_raw_active(&self) -> bool {
        self.raw_active
    }
}

impl Term for TestTerm {
    type Reader = TestReader;

    fn capability(&self) -> Capability {
        self.capability
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        self.raw_active = true;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        self.raw_active = false;
        Ok(())
    }

    fn reader(&self) -> TestReader {
        TestReader {
            events: self.events.clone(),
        }
    }

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.output.push_str(s);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn query_cursor_position(&mut self) -> Result<Position> {
        Ok(self.cursor)
    }

    fn width(&mut self) -> usize {
        self.width
    }
}

/// Replays the [`KeyEvent`]s a [`TestTerm`] was constructed with, then
/// reports EOF.
#[derive(Debug, Clone)]
pub struct TestReader {
    events: VecDeque<KeyEvent>,
}

impl RawReader for TestReader {
    fn next_key(&mut self) -> Result<KeyEvent> {
        self.events.pop_front().ok_or(EditorError::Eof)
    }

    fn key_ready(&mut self) -> bool {
        !self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_events_in_order_then_eof() {
        let term = TestTerm::new(vec![KeyEvent::Character('a'), KeyEvent::Return]);
        let mut reader = term.reader();
        assert_eq!(KeyEvent::Character('a'), reader.next_key().unwrap());
        assert_eq!(KeyEvent::Return, reader.next_key().unwrap());
        assert!(reader.next_key().is_err());
    }

    #[test]
    fn records_written_output() {
        let mut term = TestTerm::new(vec![]);
        term.write_str("hello").unwrap();
        assert_eq!("hello", term.output);
    }
}

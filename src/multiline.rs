//! Multiline continuation predicate.
//!
//! Decides, on Return, whether the buffer so far is a complete unit or
//! should continue onto another line (e.g. an unclosed bracket or a
//! trailing binary operator).

/// Tests whether the buffer should continue editing across a newline
/// instead of ending the `read_line` call.
pub trait MultilinePredicate {
    /// Returns `true` if editing should continue after the user pressed
    /// Return with `buffer` as the content so far.
    fn should_continue(&self, buffer: &str) -> bool;
}

/// Wraps a plain closure as a [`MultilinePredicate`], for callers who don't
/// need to carry extra state.
impl<F> MultilinePredicate for F
where
    F: Fn(&str) -> bool,
{
    fn should_continue(&self, buffer: &str) -> bool {
        self(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::MultilinePredicate;

    #[test]
    fn closure_impl_forwards_to_function() {
        let pred = |buf: &str| buf.ends_with('\\');
        assert!(pred.should_continue("line one\\"));
        assert!(!MultilinePredicate::should_continue(&pred, "line one"));
    }
}

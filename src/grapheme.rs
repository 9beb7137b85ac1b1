//! UTF-8 helpers, pluggable grapheme-cluster splitting and a memoizing
//! display-width cache for multi-byte clusters.
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hasher};

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Number of bytes in the UTF-8 sequence starting with `lead`.
///
/// Returns `0` if `lead` is a continuation byte (`10xxxxxx`) — the caller is
/// in the middle of a sequence and should keep reading.
pub fn utf8_byte_count(lead: u8) -> usize {
    if lead & 0x80 == 0 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xF8 == 0xF0 {
        4
    } else {
        0
    }
}

/// Number of Unicode code points encoded by `s`. `s` is assumed to already
/// be valid UTF-8 (every buffer in this crate maintains that invariant at
/// its boundaries), so this is just `chars().count()`, named to match the
/// rest of the char-vs-byte-indexed API.
pub fn utf8_count(s: &str) -> usize {
    s.chars().count()
}

/// Splits a string into grapheme clusters.
///
/// A cluster is a user-perceived character; it may span more than one code
/// point (e.g. an emoji with a variation selector, or a base letter plus a
/// combining accent). Implementations only ever see the *remainder* of the
/// buffer from the current position onward, plus a maximum length they are
/// allowed to consume, and must return the byte length of exactly the next
/// cluster.
pub trait GraphemeSplitter {
    /// Returns the number of bytes belonging to the next grapheme cluster at
    /// the start of `remainder`, never exceeding `max_len` bytes and never
    /// `0` when `remainder` is non-empty.
    fn next_cluster_len(&self, remainder: &str, max_len: usize) -> usize;
}

/// Default splitter backed by the `unicode-segmentation` crate's extended
/// grapheme cluster algorithm (UAX #29).
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSegmentationSplitter;

impl GraphemeSplitter for UnicodeSegmentationSplitter {
    fn next_cluster_len(&self, remainder: &str, max_len: usize) -> usize {
        match remainder.grapheme_indices(true).nth(1) {
            Some((boundary, _)) => boundary.min(max_len.max(1)),
            None => remainder.len().min(max_len.max(1)),
        }
    }
}

/// Falls back to "one code point is one grapheme" when no splitter is
/// installed — the degenerate case the spec calls for when the capability
/// hole is left empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodePointSplitter;

impl GraphemeSplitter for CodePointSplitter {
    fn next_cluster_len(&self, remainder: &str, max_len: usize) -> usize {
        let len = remainder.chars().next().map_or(0, char::len_utf8);
        len.min(max_len.max(len))
    }
}

/// FNV-1a over raw bytes, used to key the grapheme width cache the way the
/// reference design keys its open-addressed table: a fast, allocation-free
/// hash with good bit dispersion for short byte strings.
#[derive(Default)]
pub struct FnvHasher(u64);

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        let mut hash = if self.0 == 0 { FNV_OFFSET_BASIS } else { self.0 };
        for &byte in bytes {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        self.0 = hash;
    }
}

type FnvBuildHasher = BuildHasherDefault<FnvHasher>;

/// Memoizing cache mapping a multi-byte grapheme cluster to its on-screen
/// display width in columns.
///
/// Single-byte clusters are never inserted here (their width is a direct
/// computation: `0` for control bytes, `1` otherwise) — only multi-byte
/// clusters, whose width depends on the terminal's font and can't be derived
/// from the Unicode database alone, are worth memoizing.
#[derive(Default)]
pub struct WidthCache {
    widths: HashMap<Vec<u8>, usize, FnvBuildHasher>,
}

impl WidthCache {
    pub fn new() -> Self {
        Self {
            widths: HashMap::with_hasher(FnvBuildHasher::default()),
        }
    }

    /// Look up a previously measured width for `cluster`.
    pub fn get(&self, cluster: &str) -> Option<usize> {
        self.widths.get(cluster.as_bytes()).copied()
    }

    /// Record the measured width of `cluster`. Per the spec invariant, a
    /// width of `0` is never recorded for a non-empty cluster — the caller
    /// (the rendering pipeline, which does the actual cursor-diff
    /// measurement) is expected to clamp to `max(1, measured)` first.
    pub fn insert(&mut self, cluster: &str, width: usize) {
        debug_assert!(width >= 1, "printable grapheme clusters never have width 0");
        self.widths.insert(cluster.as_bytes().to_vec(), width.max(1));
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

/// Character-index boundaries of every grapheme cluster in `s`, including
/// `0` and `s.chars().count()`. Used by cursor movement to step by cluster
/// rather than by code point.
pub fn cluster_boundaries(s: &str, splitter: &dyn GraphemeSplitter) -> Vec<usize> {
    let mut boundaries = vec![0];
    let mut remaining = s;
    let mut chars_seen = 0;
    while !remaining.is_empty() {
        let cluster_len = splitter
            .next_cluster_len(remaining, remaining.len())
            .max(1)
            .min(remaining.len());
        chars_seen += remaining[..cluster_len].chars().count();
        boundaries.push(chars_seen);
        remaining = &remaining[cluster_len..];
    }
    boundaries
}

/// Display width of a single grapheme cluster when no terminal measurement
/// is available (used as a static fallback for single-byte clusters and by
/// the non-interactive rendering helpers).
pub fn static_width(cluster: &str) -> usize {
    if cluster.len() == 1 {
        let b = cluster.as_bytes()[0];
        if b < 0x20 || b == 0x7f {
            0
        } else {
            1
        }
    } else {
        cluster.width().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_counts() {
        assert_eq!(1, utf8_byte_count(b'a'));
        assert_eq!(2, utf8_byte_count(0xC3)); // e.g. 'ß'
        assert_eq!(3, utf8_byte_count(0xE2)); // e.g. '€'
        assert_eq!(4, utf8_byte_count(0xF0)); // e.g. an emoji
        assert_eq!(0, utf8_byte_count(0x80)); // continuation byte
    }

    #[test]
    fn code_point_count() {
        assert_eq!(3, utf8_count("aßc"));
    }

    #[test]
    fn code_point_splitter_single_codepoint() {
        let splitter = CodePointSplitter;
        assert_eq!(2, splitter.next_cluster_len("ß rest", 10));
        assert_eq!(1, splitter.next_cluster_len("a", 10));
    }

    #[test]
    fn unicode_segmentation_splitter_plain_ascii() {
        let splitter = UnicodeSegmentationSplitter;
        assert_eq!(1, splitter.next_cluster_len("abc", 10));
    }

    #[test]
    fn width_cache_roundtrip() {
        let mut cache = WidthCache::new();
        assert_eq!(None, cache.get("\u{1F600}"));
        cache.insert("\u{1F600}", 2);
        assert_eq!(Some(2), cache.get("\u{1F600}"));
        // identical byte sequences return identical widths
        cache.insert("\u{1F600}", 2);
        assert_eq!(Some(2), cache.get("\u{1F600}"));
    }

    #[test]
    fn static_width_control_vs_printable() {
        assert_eq!(0, static_width("\u{0007}"));
        assert_eq!(1, static_width("a"));
    }

    #[test]
    fn cluster_boundaries_match_code_points_for_ascii() {
        let splitter = CodePointSplitter;
        assert_eq!(vec![0, 1, 2, 3], cluster_boundaries("abc", &splitter));
    }

    #[test]
    fn fnv_hasher_is_deterministic() {
        let mut h1 = FnvHasher::default();
        let mut h2 = FnvHasher::default();
        h1.write(b"hello");
        h2.write(b"hello");
        assert_eq!(h1.finish(), h2.finish());
    }
}

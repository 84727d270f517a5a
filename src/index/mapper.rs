//! Fragment mapping of delimited path strings.
//!
//! A [`PathMap`] is the search key used by every lookup. It splits a path
//! once, right to left, and keeps the fragments as byte ranges into the
//! original string. Fragment hashes are computed on first use and then
//! memoized, using the same function insertion uses, so a search always
//! lands in the bucket the node was stored in.

use crate::index::hash::{delimiter_byte, hash_fragment_bytes};
use crate::index::types::PathHash;
use memchr::memrchr;
use std::cell::Cell;
use std::ops::Range;

/// Fragments held inline before spilling into the overflow list
pub const FRAGMENT_BUFFER_SIZE: usize = 8;

/// One delimiter-separated segment of a mapped path
#[derive(Debug, Clone)]
pub struct Fragment<'a> {
    path: &'a str,
    start: usize,
    end: usize,
    delimiter: u8,
    hash: Cell<Option<PathHash>>,
}

impl<'a> Fragment<'a> {
    fn new(path: &'a str, range: Range<usize>, delimiter: u8) -> Self {
        Self {
            path,
            start: range.start,
            end: range.end,
            delimiter,
            hash: Cell::new(None),
        }
    }

    fn placeholder() -> Self {
        Self::new("", 0..0, b'/')
    }

    /// Fragment text, borrowed from the mapped path
    #[inline]
    pub fn text(&self) -> &'a str {
        &self.path[self.start..self.end]
    }

    /// Byte range of this fragment within the mapped path
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Hash of the fragment text, computed on first call
    #[inline]
    pub fn hash(&self) -> PathHash {
        if let Some(hash) = self.hash.get() {
            return hash;
        }
        let hash = hash_fragment_bytes(self.text().as_bytes(), self.delimiter);
        self.hash.set(Some(hash));
        hash
    }

    /// Whether the hash has been computed yet
    pub fn is_hashed(&self) -> bool {
        self.hash.get().is_some()
    }

    /// A lone `*`, which matches any single fragment
    #[inline]
    pub fn is_wild(&self) -> bool {
        self.text() == "*"
    }

    /// Whether the text contains glob metacharacters (`*` or `?`)
    #[inline]
    pub fn has_wildcards(&self) -> bool {
        self.text().bytes().any(|b| b == b'*' || b == b'?')
    }
}

/// A path split into fragments, deepest fragment first.
///
/// For `"textures/doors/metal1"` the fragments are `metal1`, `doors`,
/// `textures`. A rooted path such as `"/data/base"` yields one extra empty
/// fragment for the root. Trailing delimiters are ignored.
#[derive(Debug, Clone)]
pub struct PathMap<'a> {
    path: &'a str,
    delimiter: u8,
    inline: [Fragment<'a>; FRAGMENT_BUFFER_SIZE],
    inline_len: usize,
    overflow: Vec<Fragment<'a>>,
}

impl<'a> PathMap<'a> {
    /// Map `path` using `delimiter`.
    ///
    /// Panics if `delimiter` is not ASCII.
    pub fn new(path: &'a str, delimiter: char) -> Self {
        let delimiter = delimiter_byte(delimiter);
        let mut map = Self {
            path,
            delimiter,
            inline: std::array::from_fn(|_| Fragment::placeholder()),
            inline_len: 0,
            overflow: Vec::new(),
        };
        map.split();
        map
    }

    fn split(&mut self) {
        let bytes = self.path.as_bytes();
        let mut end = bytes.len();
        while end > 0 && bytes[end - 1] == self.delimiter {
            end -= 1;
        }
        if end == 0 {
            return;
        }

        loop {
            match memrchr(self.delimiter, &bytes[..end]) {
                Some(pos) => {
                    self.push(pos + 1..end);
                    end = pos;
                    if end == 0 {
                        // Leading delimiter: the path is rooted.
                        self.push(0..0);
                        break;
                    }
                }
                None => {
                    self.push(0..end);
                    break;
                }
            }
        }
    }

    fn push(&mut self, range: Range<usize>) {
        let fragment = Fragment::new(self.path, range, self.delimiter);
        if self.inline_len < FRAGMENT_BUFFER_SIZE {
            self.inline[self.inline_len] = fragment;
            self.inline_len += 1;
        } else {
            self.overflow.push(fragment);
        }
    }

    /// The path this map was built from
    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn delimiter(&self) -> char {
        self.delimiter as char
    }

    /// Number of fragments
    pub fn len(&self) -> usize {
        self.inline_len + self.overflow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inline_len == 0
    }

    /// Whether the path began with the delimiter
    pub fn is_rooted(&self) -> bool {
        self.path.as_bytes().first() == Some(&self.delimiter) && !self.is_empty()
    }

    /// Fragment at reverse-order position `index` (0 is the deepest)
    #[inline]
    pub fn fragment(&self, index: usize) -> Option<&Fragment<'a>> {
        if index < self.inline_len {
            Some(&self.inline[index])
        } else {
            self.overflow.get(index.checked_sub(FRAGMENT_BUFFER_SIZE)?)
        }
    }

    /// Fragments deepest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Fragment<'a>> {
        self.inline[..self.inline_len].iter().chain(self.overflow.iter())
    }
}

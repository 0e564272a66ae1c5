//! Immutable, reference-counted UTF-8 string, plus a mutable string builder.
//!
//! Grounded on the teacher's shared-handle pattern (`Rc<RefCell<T>>` for
//! mutable containers, `vm/value/array_value/mod.rs`'s `ArrayRef`); the
//! plain string itself needs no interior mutability since it is immutable
//! once built, so it is carried as a bare `Rc<str>`.

use std::fmt;
use std::rc::Rc;

/// A shared, immutable, UTF-8 string. Embedded NULs are rejected at
/// construction (spec §3.1).
#[derive(Clone)]
pub struct SlateString(Rc<str>);

impl SlateString {
    /// Build a string handle, rejecting embedded NUL bytes.
    pub fn new(s: impl Into<String>) -> Result<Self, StringError> {
        let s = s.into();
        if s.contains('\0') {
            return Err(StringError::EmbeddedNul);
        }
        Ok(Self(Rc::from(s)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len_bytes(&self) -> usize {
        self.0.len()
    }

    pub fn len_codepoints(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn append(&self, other: &SlateString) -> Self {
        let mut s = String::with_capacity(self.0.len() + other.0.len());
        s.push_str(&self.0);
        s.push_str(&other.0);
        Self(Rc::from(s))
    }

    /// Slice by codepoint index (not byte index), half-open `[start, start+len)`.
    pub fn substring(&self, start: usize, len: usize) -> Option<Self> {
        let mut chars = self.0.char_indices();
        let begin = chars.nth(start)?.0;
        let end = if len == 0 {
            begin
        } else {
            match chars.nth(len - 1) {
                Some((idx, c)) => idx + c.len_utf8(),
                None => self.0.len(),
            }
        };
        Some(Self(Rc::from(&self.0[begin..end])))
    }

    pub fn find(&self, needle: &str) -> Option<usize> {
        self.0.find(needle).map(|byte_idx| {
            self.0[..byte_idx].chars().count()
        })
    }

    pub fn replace(&self, from: &str, to: &str) -> Self {
        Self(Rc::from(self.0.replace(from, to)))
    }

    pub fn to_upper(&self) -> Self {
        Self(Rc::from(self.0.to_uppercase()))
    }

    pub fn to_lower(&self) -> Self {
        Self(Rc::from(self.0.to_lowercase()))
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars()
    }

    /// Pointer identity, used by the interned-key fast path (spec §4.1).
    pub fn ptr_eq(&self, other: &SlateString) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for SlateString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for SlateString {}

impl fmt::Debug for SlateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for SlateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringError {
    EmbeddedNul,
}

impl fmt::Display for StringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringError::EmbeddedNul => write!(f, "string contains an embedded NUL byte"),
        }
    }
}

impl std::error::Error for StringError {}

/// A shared, mutable UTF-8 buffer. Finalizing yields an immutable
/// [`SlateString`].
#[derive(Clone)]
pub struct StringBuilder(Rc<std::cell::RefCell<String>>);

impl StringBuilder {
    pub fn new() -> Self {
        Self(Rc::new(std::cell::RefCell::new(String::new())))
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self(Rc::new(std::cell::RefCell::new(String::with_capacity(cap))))
    }

    pub fn append(&self, s: &str) {
        self.0.borrow_mut().push_str(s);
    }

    pub fn insert(&self, codepoint_index: usize, s: &str) {
        let mut buf = self.0.borrow_mut();
        let byte_idx = buf
            .char_indices()
            .nth(codepoint_index)
            .map(|(i, _)| i)
            .unwrap_or(buf.len());
        buf.insert_str(byte_idx, s);
    }

    pub fn delete(&self, codepoint_start: usize, codepoint_len: usize) {
        let mut buf = self.0.borrow_mut();
        let indices: Vec<usize> = buf.char_indices().map(|(i, _)| i).collect();
        let Some(&start) = indices.get(codepoint_start) else {
            return;
        };
        let end = indices
            .get(codepoint_start + codepoint_len)
            .copied()
            .unwrap_or(buf.len());
        buf.replace_range(start..end, "");
    }

    pub fn len_bytes(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn finalize(&self) -> Result<SlateString, StringError> {
        SlateString::new(self.0.borrow().clone())
    }

    pub fn ptr_eq(&self, other: &StringBuilder) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for StringBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for StringBuilder {
    /// Builders are mutable shared containers and compare by identity of
    /// the handle, matching `Array`/`Object`/`Buffer` (spec §4.2) rather
    /// than `SlateString`'s by-contents comparison.
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for StringBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringBuilder({:?})", self.0.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_embedded_nul() {
        assert_eq!(
            SlateString::new("a\0b").unwrap_err(),
            StringError::EmbeddedNul
        );
    }

    #[test]
    fn substring_is_codepoint_indexed() {
        let s = SlateString::new("Hello, World").unwrap();
        let sub = s.substring(7, 5).unwrap();
        assert_eq!(sub.as_str(), "World");
    }

    #[test]
    fn upper_lower_round_trip_is_idempotent_under_upper() {
        let s = SlateString::new("Hello").unwrap();
        let upper_then = s.to_lower().to_upper();
        assert_eq!(upper_then.as_str(), s.to_upper().as_str());
    }

    #[test]
    fn length_bytes_at_least_length_codepoints() {
        let s = SlateString::new("héllo").unwrap();
        assert!(s.len_bytes() >= s.len_codepoints());
    }

    #[test]
    fn builder_finalizes_to_string() {
        let b = StringBuilder::new();
        b.append("foo");
        b.append("bar");
        let s = b.finalize().unwrap();
        assert_eq!(s.as_str(), "foobar");
    }

    #[test]
    fn builder_insert_and_delete_are_codepoint_indexed() {
        let b = StringBuilder::new();
        b.append("helloworld");
        b.insert(5, ", ");
        assert_eq!(b.finalize().unwrap().as_str(), "hello, world");
        b.delete(5, 2);
        assert_eq!(b.finalize().unwrap().as_str(), "helloworld");
    }
}

//! Structural cache keys and prefix patterns.
//!
//! A [`CacheKey`] is an ordered tuple of string/integer segments such as
//! `["board", 42]`. Two keys are equal when all their segments are equal.
//! A [`KeyPattern`] matches every key it is a prefix of, so the pattern
//! `["board"]` matches both `["board", 1]` and `["board", 1, "members"]`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single component of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySegment {
    /// Numeric identifier segment (ids).
    Int(i64),
    /// Textual segment (resource families, sub-resources).
    Str(String),
}

impl From<&str> for KeySegment {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for KeySegment {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for KeySegment {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for KeySegment {
    fn from(value: u64) -> Self {
        // Backend ids never come close to i64::MAX.
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Identificador estructural de un recurso en cache.
///
/// # Examples
///
/// ```
/// use kanban_core::{CacheKey, cache_key};
///
/// let key = CacheKey::root("board").push(42);
/// assert_eq!(key, cache_key!["board", 42]);
/// assert_eq!(key.to_string(), "board/42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey {
    segments: Vec<KeySegment>,
}

impl CacheKey {
    /// Creates a key with a single leading segment (the resource family).
    pub fn root(family: impl Into<KeySegment>) -> Self {
        Self {
            segments: vec![family.into()],
        }
    }

    /// Creates a key from a list of segments.
    pub fn from_segments(segments: Vec<KeySegment>) -> Self {
        Self { segments }
    }

    /// Returns a new key with one more segment appended.
    pub fn push(mut self, segment: impl Into<KeySegment>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Returns the key segments.
    pub fn segments(&self) -> &[KeySegment] {
        &self.segments
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if the key has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if `pattern` is a prefix of this key.
    pub fn starts_with(&self, pattern: &KeyPattern) -> bool {
        self.segments.starts_with(&pattern.segments)
    }

    /// Returns a pattern matching this key and everything below it.
    pub fn as_pattern(&self) -> KeyPattern {
        KeyPattern {
            segments: self.segments.clone(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

/// Prefix pattern over cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyPattern {
    segments: Vec<KeySegment>,
}

impl KeyPattern {
    /// Pattern that matches every key.
    pub fn all() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Creates a pattern from a list of segments.
    pub fn from_segments(segments: Vec<KeySegment>) -> Self {
        Self { segments }
    }

    /// Returns true if this pattern is a prefix of `key`.
    pub fn matches(&self, key: &CacheKey) -> bool {
        key.starts_with(self)
    }

    /// Returns the pattern segments.
    pub fn segments(&self) -> &[KeySegment] {
        &self.segments
    }
}

impl From<CacheKey> for KeyPattern {
    fn from(key: CacheKey) -> Self {
        Self {
            segments: key.segments,
        }
    }
}

impl From<&CacheKey> for KeyPattern {
    fn from(key: &CacheKey) -> Self {
        key.as_pattern()
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = CacheKey::from_segments(self.segments.clone());
        write!(f, "{}/*", key)
    }
}

/// Builds a [`CacheKey`] from a list of segments.
///
/// ```
/// use kanban_core::cache_key;
///
/// let key = cache_key!["board", 7, "members"];
/// assert_eq!(key.len(), 3);
/// ```
#[macro_export]
macro_rules! cache_key {
    ($($segment:expr),+ $(,)?) => {
        $crate::CacheKey::from_segments(vec![$($crate::KeySegment::from($segment)),+])
    };
}

/// Builds a [`KeyPattern`] from a list of segments.
#[macro_export]
macro_rules! key_pattern {
    () => {
        $crate::KeyPattern::all()
    };
    ($($segment:expr),+ $(,)?) => {
        $crate::KeyPattern::from_segments(vec![$($crate::KeySegment::from($segment)),+])
    };
}

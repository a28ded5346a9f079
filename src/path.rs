//! Addresses into nested JSON structures.
//!
//! An address is a sequence of segments, each either a mapping key or a
//! sequence index. The string form is dot-delimited, with bracket segments
//! for indices and for keys containing special characters:
//!
//! - `company.location`
//! - `items[0].name` (same as `items.0.name`)
//! - `labels["en.US"]`
//!
//! Reads borrow the structure; writes consume it and hand back the new one,
//! moving untouched siblings instead of copying them.

use crate::error::{Result, StateError};
use serde_json::{Map, Value};
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

/// Largest index treated as a sequence position.
///
/// Larger digit segments address a mapping key instead, so writes never pad a
/// sequence by more than this many slots.
pub const MAX_INDEX: usize = 1 << 16;

/// A single segment of an address.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Seg {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
}

impl Seg {
    /// The key this segment addresses inside a mapping.
    fn map_key(&self) -> String {
        match self {
            Seg::Key(k) => k.clone(),
            Seg::Index(i) => i.to_string(),
        }
    }

    /// The index this segment addresses inside a sequence, if any.
    fn seq_index(&self) -> Option<usize> {
        match self {
            Seg::Key(k) => numeric(k),
            Seg::Index(i) => Some(*i).filter(|i| *i <= MAX_INDEX),
        }
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A parsed address.
///
/// `Display` renders the canonical string form, which parses back to an equal
/// path. Entity states key their path maps by this form.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<Seg>);

impl Path {
    /// Create an empty path (the root).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from segments.
    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Parse the dotted string form.
    ///
    /// Empty addresses, empty segments and unterminated brackets or quotes are
    /// rejected.
    pub fn parse(address: &str) -> Result<Self> {
        if address.is_empty() {
            return Err(StateError::invalid_argument("address is empty"));
        }

        let invalid = |reason: &str| {
            StateError::invalid_argument(format!("address {:?}: {}", address, reason))
        };

        let mut segments = Vec::new();
        let mut chars = address.chars().peekable();
        // A segment must follow at the start and after every '.'.
        let mut need_segment = true;

        while let Some(&c) = chars.peek() {
            match c {
                '.' => {
                    if need_segment {
                        return Err(invalid("empty segment"));
                    }
                    chars.next();
                    need_segment = true;
                }
                '[' => {
                    chars.next();
                    segments.push(parse_bracket(&mut chars).map_err(|r| invalid(r))?);
                    need_segment = false;
                }
                ']' => return Err(invalid("unexpected ']'")),
                _ => {
                    if !need_segment {
                        return Err(invalid("expected '.' or '[' after ']'"));
                    }
                    let mut key = String::new();
                    while let Some(&c) = chars.peek() {
                        if matches!(c, '.' | '[' | ']') {
                            break;
                        }
                        key.push(c);
                        chars.next();
                    }
                    segments.push(match numeric(&key) {
                        Some(i) => Seg::Index(i),
                        None => Seg::Key(key),
                    });
                    need_segment = false;
                }
            }
        }

        if need_segment {
            return Err(invalid("trailing '.'"));
        }

        Ok(Self(segments))
    }

    /// Append a key segment (builder pattern).
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment (builder pattern).
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// The segments of this path.
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `prefix` is a leading run of whole segments of this path.
    ///
    /// `company.location` starts with `company` but not with `comp`.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// A new path with `other` appended to this one.
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = Vec::with_capacity(self.len() + other.len());
        segments.extend_from_slice(&self.0);
        segments.extend_from_slice(&other.0);
        Path(segments)
    }
}

impl FromStr for Path {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, seg) in self.0.iter().enumerate() {
            match seg {
                Seg::Key(k) if is_plain(k) => {
                    if pos > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
                Seg::Key(k) => {
                    f.write_str("[\"")?;
                    for c in k.chars() {
                        if c == '"' || c == '\\' {
                            f.write_str("\\")?;
                        }
                        write!(f, "{}", c)?;
                    }
                    f.write_str("\"]")?;
                }
                Seg::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

/// Parse the inside of a bracket segment; the opening '[' is already consumed.
fn parse_bracket(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<Seg, &'static str> {
    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            let mut key = String::new();
            loop {
                match chars.next() {
                    Some('\\') => match chars.next() {
                        Some(c) => key.push(c),
                        None => return Err("unterminated escape"),
                    },
                    Some(c) if c == quote => break,
                    Some(c) => key.push(c),
                    None => return Err("unterminated quote"),
                }
            }
            match chars.next() {
                Some(']') => Ok(Seg::Key(key)),
                _ => Err("expected ']' after quoted key"),
            }
        }
        _ => {
            let mut inner = String::new();
            loop {
                match chars.next() {
                    Some(']') => break,
                    Some('[') => return Err("nested '['"),
                    Some(c) => inner.push(c),
                    None => return Err("unterminated '['"),
                }
            }
            if inner.is_empty() {
                return Err("empty brackets");
            }
            Ok(match numeric(&inner) {
                Some(i) => Seg::Index(i),
                None => Seg::Key(inner),
            })
        }
    }
}

/// All-digit strings no larger than [`MAX_INDEX`].
fn numeric(s: &str) -> Option<usize> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok().filter(|i| *i <= MAX_INDEX)
    } else {
        None
    }
}

/// Keys that render without brackets and parse back as keys.
fn is_plain(k: &str) -> bool {
    !k.is_empty()
        && !k.bytes().all(|b| b.is_ascii_digit())
        && !k.chars().any(|c| matches!(c, '.' | '[' | ']' | '"' | '\'' | '\\'))
}

/// Read the value at `path`.
///
/// Returns `None` when any segment is missing or runs into a scalar. An index
/// segment on a mapping reads the key of the same digits and a numeric key on
/// a sequence reads that element.
pub fn read_at<'a>(structure: &'a Value, path: &Path) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(structure, |current, seg| match current {
            Value::Object(map) => map.get(&seg.map_key()),
            Value::Array(items) => seg.seq_index().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Return `structure` with `value` stored at `path`.
///
/// Missing or scalar intermediates become a mapping for a key segment and a
/// sequence for an index segment. Sequences are padded with `null` when the
/// index is past the end. A segment that is not a sequence position (a
/// non-numeric key, or an index above [`MAX_INDEX`]) turns a sequence into a
/// mapping. The root path replaces the whole structure.
pub fn write_at(structure: Value, path: &Path, value: Value) -> Value {
    write_segments(structure, path.segments(), value)
}

fn write_segments(current: Value, segments: &[Seg], value: Value) -> Value {
    let Some((seg, rest)) = segments.split_first() else {
        return value;
    };

    match current {
        Value::Object(mut map) => {
            let key = seg.map_key();
            // Take the child in place so the key keeps its slot in the map.
            let child = map.get_mut(&key).map(Value::take).unwrap_or(Value::Null);
            map.insert(key, write_segments(child, rest, value));
            Value::Object(map)
        }
        Value::Array(mut items) => match seg.seq_index() {
            Some(i) => {
                if i >= items.len() {
                    items.resize(i + 1, Value::Null);
                }
                let child = items[i].take();
                items[i] = write_segments(child, rest, value);
                Value::Array(items)
            }
            None => write_segments(Value::Object(Map::new()), segments, value),
        },
        _ => {
            let fresh = match seg {
                Seg::Index(i) if *i <= MAX_INDEX => Value::Array(Vec::new()),
                _ => Value::Object(Map::new()),
            };
            write_segments(fresh, segments, value)
        }
    }
}

/// Return `structure` with `path` made undefined.
///
/// A mapping loses the key; a sequence element becomes `null` so later
/// indices keep their positions. Missing paths leave the structure as is.
pub fn remove_at(structure: Value, path: &Path) -> Value {
    remove_segments(structure, path.segments())
}

fn remove_segments(current: Value, segments: &[Seg]) -> Value {
    let Some((seg, rest)) = segments.split_first() else {
        return Value::Null;
    };

    match current {
        Value::Object(mut map) => {
            let key = seg.map_key();
            if rest.is_empty() {
                map.remove(&key);
            } else if let Some(child) = map.get_mut(&key) {
                let taken = child.take();
                *child = remove_segments(taken, rest);
            }
            Value::Object(map)
        }
        Value::Array(mut items) => {
            if let Some(child) = seg.seq_index().and_then(|i| items.get_mut(i)) {
                let taken = child.take();
                *child = if rest.is_empty() {
                    Value::Null
                } else {
                    remove_segments(taken, rest)
                };
            }
            Value::Array(items)
        }
        other => other,
    }
}

//! Bounds-checked line tokenization.
//!
//! Every kernel and daemon text format handled here is "split on a delimiter
//! set, collapse runs, pick columns by position". [`Fields`] does exactly that
//! and makes "too few columns" an ordinary `None` instead of an index panic.

/// The tokens of one line, with their byte offsets into the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields<'a> {
    tokens: Vec<(usize, &'a str)>,
}

impl<'a> Fields<'a> {
    /// Split `line` on any of `delims`, skipping empty tokens.
    pub fn split(line: &'a str, delims: &[char]) -> Self {
        let mut tokens = Vec::new();
        let mut start = None;

        for (idx, c) in line.char_indices() {
            if delims.contains(&c) {
                if let Some(s) = start.take() {
                    tokens.push((s, &line[s..idx]));
                }
            } else if start.is_none() {
                start = Some(idx);
            }
        }
        if let Some(s) = start {
            tokens.push((s, &line[s..]));
        }

        Self { tokens }
    }

    /// Split on ASCII whitespace (space, tab, CR, LF).
    pub fn whitespace(line: &'a str) -> Self {
        Self::split(line, &[' ', '\t', '\r', '\n'])
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at position `idx`.
    pub fn get(&self, idx: usize) -> Option<&'a str> {
        self.tokens.get(idx).map(|(_, t)| *t)
    }

    /// Byte offset of token `idx` within the original line.
    pub fn offset(&self, idx: usize) -> Option<usize> {
        self.tokens.get(idx).map(|(o, _)| *o)
    }

    /// Byte offset just past the end of token `idx`.
    pub fn end(&self, idx: usize) -> Option<usize> {
        self.tokens.get(idx).map(|(o, t)| o + t.len())
    }

    /// The first `N` tokens, or `None` if the line is shorter.
    pub fn require<const N: usize>(&self) -> Option<[&'a str; N]> {
        let head = self.tokens.get(..N)?;
        Some(std::array::from_fn(|i| head[i].1))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().map(|(_, t)| *t)
    }
}

/// Parse the leading decimal integer of `s`, C `atoi` style.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit. No digits yields 0. Saturates instead of overflowing.
pub fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(digit);
    }

    if negative {
        -value
    } else {
        value
    }
}

/// [`leading_int`] clamped to the non-negative range.
pub fn leading_uint(s: &str) -> u64 {
    leading_int(s).max(0) as u64
}

/// [`leading_uint`] saturated into a `u32`.
pub fn leading_u32(s: &str) -> u32 {
    u32::try_from(leading_uint(s)).unwrap_or(u32::MAX)
}

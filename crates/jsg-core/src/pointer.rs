use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::PointerError;

/// A URI-fragment JSON Pointer such as `#/components/schemas/Pet`.
///
/// Segments are stored unescaped; `~0` and `~1` are decoded on parse and
/// re-encoded by `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The pointer `#`, addressing the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a fragment pointer. The leading `#` is mandatory.
    pub fn parse(input: &str) -> Result<Self, PointerError> {
        let rest = input
            .strip_prefix('#')
            .ok_or_else(|| syntax_error(input, "must start with '#'"))?;
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let rest = rest
            .strip_prefix('/')
            .ok_or_else(|| syntax_error(input, "expected '/' after '#'"))?;

        let segments = rest
            .split('/')
            .map(|segment| {
                unescape(segment).ok_or_else(|| {
                    syntax_error(input, &format!("invalid escape in segment {segment:?}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The trailing segment, if the pointer is not the root.
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Walk `document` along the pointer's segments.
    ///
    /// Objects are indexed by key and arrays by decimal index. Indexing into
    /// a scalar, a missing key or an out-of-range index yields
    /// `PointerError::NotFound` naming the segment that failed.
    pub fn resolve<'a>(&self, document: &'a Value) -> Result<&'a Value, PointerError> {
        let mut current = document;
        for segment in &self.segments {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => parse_index(segment).and_then(|i| items.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| PointerError::NotFound {
                pointer: self.to_string(),
                segment: segment.clone(),
            })?;
        }
        Ok(current)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Encode a single segment: `~` becomes `~0`, then `/` becomes `~1`.
pub fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

// RFC 6901 array indices: "0" or a digit sequence without a leading zero.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return None;
    }
    segment.parse().ok()
}

fn syntax_error(pointer: &str, reason: &str) -> PointerError {
    PointerError::Syntax {
        pointer: pointer.to_string(),
        reason: reason.to_string(),
    }
}

//! Compiled path expressions
//!
//! A [`Path`] is compiled once from its string form and can then be applied to
//! any number of containers. Compilation is the only place a path expression
//! can fail; every traversal of a compiled path is total.
//!
//! Grammar, informally:
//!
//! ```text
//! path      := "" | step (sep step)*
//! step      := token clause* | ".."
//! token     := literal | "{n}" | "{s}" | "{*}"
//! clause    := "[" attribute "]"
//!            | "[" attribute op value "]"
//!            | "[" attribute "=/" regex "/" flags "]"
//!            | "[" integer "]" | "[:first]" | "[:last]"
//! op        := "=" | "!=" | ">" | "<" | ">=" | "<="
//! ```
//!
//! Backslash escapes `.`, `[`, `]`, `{`, `}` and `\` inside literals.

use crate::core::segment::{Segment, Selector};
use crate::core::token::tokenize;
use crate::error::MalformedPath;
use log::trace;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Limits applied while compiling user-authored paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Longest accepted source expression, in bytes
    pub max_length: usize,
    /// Largest accepted number of segments
    pub max_segments: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_length: 4096,
            max_segments: 128,
        }
    }
}

/// A compiled path expression
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    source: String,
    segments: Vec<Segment>,
}

impl Path {
    /// Compile a path expression with the default limits
    pub fn compile(source: &str) -> Result<Self, MalformedPath> {
        Self::compile_with(source, &CompileOptions::default())
    }

    /// Compile a path expression with explicit limits
    pub fn compile_with(source: &str, options: &CompileOptions) -> Result<Self, MalformedPath> {
        if source.len() > options.max_length {
            return Err(MalformedPath::new(
                source,
                "",
                options.max_length,
                format!("path longer than {} bytes", options.max_length),
            ));
        }

        let raw = tokenize(source)?;
        if raw.len() > options.max_segments {
            let at = raw[options.max_segments].offset;
            return Err(MalformedPath::new(
                source,
                &source[at..],
                at,
                format!("path has more than {} segments", options.max_segments),
            ));
        }

        let segments = raw
            .into_iter()
            .map(|segment| Segment::from_raw(segment, source))
            .collect::<Result<Vec<_>, _>>()?;

        trace!("compiled `{}` into {} segments", source, segments.len());
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The empty path, addressing the root itself
    pub fn root() -> Self {
        Self {
            source: String::new(),
            segments: Vec::new(),
        }
    }

    /// Build a path from already typed segments
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let source = render(&segments);
        Self { source, segments }
    }

    /// The source expression
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether every segment is a literal key without predicates
    pub fn is_simple(&self) -> bool {
        self.segments.iter().all(Segment::is_plain)
    }

    /// Whether any segment is a wildcard
    pub fn has_wildcards(&self) -> bool {
        self.segments.iter().any(|s| {
            matches!(
                s.selector(),
                Selector::AnyNumeric | Selector::AnyString | Selector::AnyKey
            )
        })
    }

    /// A new path with `segment` appended
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self::from_segments(segments)
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Path {
    type Err = MalformedPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = MalformedPath;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::compile(s)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::compile(&source).map_err(serde::de::Error::custom)
    }
}

/// Canonical source text for a segment list
fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    let mut previous_parent = false;
    for (i, segment) in segments.iter().enumerate() {
        let is_parent = segment.is_parent();
        if i > 0 && !is_parent && !previous_parent {
            out.push('.');
        }
        out.push_str(&segment.to_string());
        previous_parent = is_parent;
    }
    out
}

/// Caller-owned memo of compiled paths
///
/// Paths are immutable once compiled, so entries never go stale; the cache
/// only needs bounding. When full, the cache is cleared before inserting.
#[derive(Debug, Clone, Default)]
pub struct PathCache {
    entries: HashMap<String, Path>,
    capacity: Option<usize>,
    options: CompileOptions,
}

impl PathCache {
    /// Create an unbounded cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache holding at most `capacity` paths
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity: Some(capacity),
            options: CompileOptions::default(),
        }
    }

    /// Use these limits for paths compiled from now on
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Get the compiled form of `source`, compiling it on first use
    pub fn get(&mut self, source: &str) -> Result<&Path, MalformedPath> {
        if !self.entries.contains_key(source) {
            let path = Path::compile_with(source, &self.options)?;
            if let Some(capacity) = self.capacity {
                if self.entries.len() >= capacity {
                    trace!("path cache full ({} entries), clearing", capacity);
                    self.entries.clear();
                }
            }
            self.entries.insert(source.to_string(), path);
        }
        self.entries
            .get(source)
            .ok_or_else(|| MalformedPath::new(source, source, 0, "path cache has no capacity"))
    }

    /// Drop one entry
    pub fn invalidate(&mut self, source: &str) -> bool {
        self.entries.remove(source).is_some()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

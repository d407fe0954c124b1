//! Typed path segments and key matching

use crate::core::predicate::{evaluate, Predicate};
use crate::core::token::RawSegment;
use crate::core::value::Key;
use crate::error::MalformedPath;
use serde_yaml::Value;
use std::fmt;

/// What a segment selects among the children of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// A key spelled out in the path
    Literal(String),
    /// `{n}`: list positions and numeric map keys
    AnyNumeric,
    /// `{s}`: map keys that are not purely numeric
    AnyString,
    /// `{*}`: every key
    AnyKey,
    /// `..`: step back to the parent
    Parent,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(key) => f.write_str(&escape_literal(key)),
            Self::AnyNumeric => f.write_str("{n}"),
            Self::AnyString => f.write_str("{s}"),
            Self::AnyKey => f.write_str("{*}"),
            Self::Parent => f.write_str(".."),
        }
    }
}

/// One step of a compiled path
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    selector: Selector,
    predicates: Vec<Predicate>,
    offset: usize,
}

impl Segment {
    /// Create a segment without predicates
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            predicates: Vec::new(),
            offset: 0,
        }
    }

    /// Create a literal key segment
    pub fn literal(key: impl Into<String>) -> Self {
        Self::new(Selector::Literal(key.into()))
    }

    /// Attach a predicate
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Type a raw segment produced by the tokenizer
    pub(crate) fn from_raw(raw: RawSegment, path: &str) -> Result<Self, MalformedPath> {
        if raw.parent {
            return Ok(Self {
                selector: Selector::Parent,
                predicates: Vec::new(),
                offset: raw.offset,
            });
        }

        let selector = if raw.escaped {
            Selector::Literal(raw.text)
        } else {
            match raw.text.as_str() {
                "{n}" => Selector::AnyNumeric,
                "{s}" => Selector::AnyString,
                "{*}" => Selector::AnyKey,
                text if text.starts_with('{') => {
                    return Err(MalformedPath::new(
                        path,
                        text,
                        raw.offset,
                        "unknown wildcard (expected {n}, {s} or {*})",
                    ));
                }
                _ => Selector::Literal(raw.text),
            }
        };

        let predicates = raw
            .clauses
            .iter()
            .map(|clause| Predicate::parse(&clause.body, clause.offset, path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            selector,
            predicates,
            offset: raw.offset,
        })
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Byte offset of the segment in its source expression
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_parent(&self) -> bool {
        self.selector == Selector::Parent
    }

    /// A literal key without predicates
    pub fn is_plain(&self) -> bool {
        matches!(self.selector, Selector::Literal(_)) && self.predicates.is_empty()
    }

    /// The literal key, if the selector is a literal
    pub fn as_literal(&self) -> Option<&str> {
        match &self.selector {
            Selector::Literal(key) => Some(key),
            _ => None,
        }
    }

    /// Whether a candidate key is selected; looks at the key only
    pub fn matches_key(&self, key: &Key) -> bool {
        match &self.selector {
            Selector::Literal(literal) => key.matches_literal(literal),
            Selector::AnyNumeric => key.is_numeric(),
            Selector::AnyString => !key.is_numeric(),
            Selector::AnyKey => true,
            Selector::Parent => false,
        }
    }

    /// Whether the candidate passes the attribute predicates and the
    /// positional ones at 1-based `position` out of `total` candidates
    pub fn accepts(&self, node: &Value, position: usize, total: usize) -> bool {
        evaluate(node, &self.predicates)
            && self
                .predicates
                .iter()
                .filter_map(Predicate::position)
                .all(|p| p.admits(position, total))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector)?;
        for predicate in &self.predicates {
            write!(f, "{}", predicate)?;
        }
        Ok(())
    }
}

fn escape_literal(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        if matches!(c, '.' | '[' | ']' | '{' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

//! Bracketed predicates: attribute conditions and positional selectors
//!
//! Attribute predicates (`[id]`, `[id>2]`, `[name=/^j/i]`) look at a candidate
//! node on their own and are evaluated here by [`evaluate`]. Positional
//! predicates (`[2]`, `[-1]`, `[:first]`, `[:last]`) depend on where the
//! candidate sits in the list of siblings matched at a step, so the engine
//! evaluates them through [`Position::admits`] instead.

use crate::core::compare::compare_scalars;
use crate::core::value::{Container, Kind};
use crate::error::MalformedPath;
use regex::Regex;
use serde_yaml::Value;
use std::cmp::Ordering;
use std::fmt;

const REGEX_FLAGS: &str = "imsxU";

/// Comparison operator of an attribute predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    /// `=/regex/`
    Matches,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Matches => "=~",
        }
    }

    fn admits(&self, ordering: Ordering) -> bool {
        match self {
            Self::Eq | Self::Matches => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Lt => ordering == Ordering::Less,
            Self::Ge => ordering != Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positional selector among the candidates of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// 1-based; negative values count from the end (`-1` is the last)
    Nth(i64),
    First,
    Last,
}

impl Position {
    /// Whether the candidate at 1-based `position` out of `total` is selected
    pub fn admits(&self, position: usize, total: usize) -> bool {
        let position = position as i64;
        match self {
            Self::First => position == 1,
            Self::Last => position == total as i64,
            Self::Nth(n) if *n > 0 => position == *n,
            Self::Nth(n) => position == total as i64 + n + 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nth(n) => write!(f, "{}", n),
            Self::First => f.write_str(":first"),
            Self::Last => f.write_str(":last"),
        }
    }
}

/// A single bracket clause of a segment
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `[attr]`: the node is a map holding `attr`
    Has(String),
    /// `[attr<op>value]`
    Compare {
        attribute: String,
        op: Op,
        value: String,
    },
    /// `[attr=/pattern/flags]`
    Matches {
        attribute: String,
        pattern: Regex,
        source: String,
    },
    /// `[n]`, `[:first]`, `[:last]`
    Position(Position),
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Has(a), Self::Has(b)) => a == b,
            (
                Self::Compare {
                    attribute: a1,
                    op: o1,
                    value: v1,
                },
                Self::Compare {
                    attribute: a2,
                    op: o2,
                    value: v2,
                },
            ) => a1 == a2 && o1 == o2 && v1 == v2,
            (
                Self::Matches {
                    attribute: a1,
                    source: s1,
                    ..
                },
                Self::Matches {
                    attribute: a2,
                    source: s2,
                    ..
                },
            ) => a1 == a2 && s1 == s2,
            (Self::Position(a), Self::Position(b)) => a == b,
            _ => false,
        }
    }
}

impl Predicate {
    /// Parse the body of a bracket clause
    ///
    /// `offset` is the byte offset of the opening `[` in `path`, used to point
    /// errors at the right place.
    pub fn parse(body: &str, offset: usize, path: &str) -> Result<Self, MalformedPath> {
        let body_offset = offset + 1;
        let fail = |at: usize, fragment: &str, reason: &str| {
            MalformedPath::new(path, fragment, body_offset + at, reason)
        };

        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(MalformedPath::new(path, "[]", offset, "empty predicate"));
        }

        if let Some(name) = trimmed.strip_prefix(':') {
            return match name {
                "first" => Ok(Self::Position(Position::First)),
                "last" => Ok(Self::Position(Position::Last)),
                _ => Err(fail(0, body, "unknown positional selector")),
            };
        }

        if let Ok(n) = trimmed.parse::<i64>() {
            if n == 0 {
                return Err(fail(0, body, "positions are 1-based"));
            }
            return Ok(Self::Position(Position::Nth(n)));
        }

        let op_at = match body.find(|c: char| matches!(c, '=' | '!' | '<' | '>')) {
            Some(at) => at,
            None => return Ok(Self::Has(trimmed.to_string())),
        };

        let attribute = body[..op_at].trim();
        if attribute.is_empty() {
            return Err(fail(op_at, &body[op_at..], "missing attribute name"));
        }

        let rest = &body[op_at..];
        let (op, op_len) = if rest.starts_with("!=") {
            (Op::Ne, 2)
        } else if rest.starts_with(">=") {
            (Op::Ge, 2)
        } else if rest.starts_with("<=") {
            (Op::Le, 2)
        } else if rest.starts_with('=') {
            (Op::Eq, 1)
        } else if rest.starts_with('>') {
            (Op::Gt, 1)
        } else if rest.starts_with('<') {
            (Op::Lt, 1)
        } else {
            return Err(fail(op_at, &rest[..1], "invalid operator"));
        };

        let raw_value = &rest[op_len..];
        if raw_value.starts_with(|c: char| matches!(c, '=' | '!' | '<' | '>')) {
            let end = op_len + 1;
            return Err(fail(op_at, &rest[..end], "invalid operator"));
        }

        let value = raw_value.trim();
        let value_at = op_at + op_len + (raw_value.len() - raw_value.trim_start().len());

        if op == Op::Eq && value.starts_with('/') {
            let pattern = compile_pattern(value).map_err(|reason| fail(value_at, value, &reason))?;
            return Ok(Self::Matches {
                attribute: attribute.to_string(),
                pattern,
                source: value.to_string(),
            });
        }

        Ok(Self::Compare {
            attribute: attribute.to_string(),
            op,
            value: unquote(value).to_string(),
        })
    }

    /// Attribute the predicate looks at, `None` for positional predicates
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::Has(attribute)
            | Self::Compare { attribute, .. }
            | Self::Matches { attribute, .. } => Some(attribute),
            Self::Position(_) => None,
        }
    }

    /// Comparison operator, `None` for presence tests and positional predicates
    pub fn op(&self) -> Option<Op> {
        match self {
            Self::Compare { op, .. } => Some(*op),
            Self::Matches { .. } => Some(Op::Matches),
            Self::Has(_) | Self::Position(_) => None,
        }
    }

    /// Positional selector, if this is a positional predicate
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Position(p) => Some(*p),
            _ => None,
        }
    }

    /// Evaluate an attribute predicate against `node`
    ///
    /// Positional predicates always pass here. Nodes that are not maps fail
    /// every attribute predicate, and a missing attribute fails every operator.
    pub fn test(&self, node: &Value) -> bool {
        let attribute = match self {
            Self::Position(_) => return true,
            Self::Has(attribute)
            | Self::Compare { attribute, .. }
            | Self::Matches { attribute, .. } => attribute,
        };

        if node.kind() != Kind::Map {
            return false;
        }

        let found = match node.literal_child(attribute) {
            Some(found) => found,
            None => return false,
        };

        match self {
            Self::Has(_) => true,
            Self::Compare { op, value, .. } => match found.scalar_string() {
                Some(actual) => op.admits(compare_scalars(&actual, value)),
                None => false,
            },
            Self::Matches { pattern, .. } => found
                .scalar_string()
                .map(|actual| pattern.is_match(&actual))
                .unwrap_or(false),
            Self::Position(_) => true,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Has(attribute) => write!(f, "[{}]", attribute),
            Self::Compare {
                attribute,
                op,
                value,
            } => write!(f, "[{}{}{}]", attribute, op, value),
            Self::Matches {
                attribute, source, ..
            } => write!(f, "[{}={}]", attribute, source),
            Self::Position(position) => write!(f, "[{}]", position),
        }
    }
}

/// AND-combine the attribute predicates of a segment against `node`
pub fn evaluate(node: &Value, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|predicate| predicate.test(node))
}

/// Compile `/pattern/flags`
fn compile_pattern(literal: &str) -> Result<Regex, String> {
    let close = literal
        .rfind('/')
        .filter(|&at| at > 0)
        .ok_or_else(|| "unterminated regular expression".to_string())?;
    let body = &literal[1..close];
    let flags = &literal[close + 1..];

    if let Some(bad) = flags.chars().find(|c| !REGEX_FLAGS.contains(*c)) {
        return Err(format!("unknown regular expression flag `{}`", bad));
    }

    let pattern = if flags.is_empty() {
        body.to_string()
    } else {
        format!("(?{}){}", flags, body)
    };
    Regex::new(&pattern).map_err(|e| format!("invalid regular expression: {}", e))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    fn parse(body: &str) -> Predicate {
        let path = format!("x[{}]", body);
        Predicate::parse(body, 1, &path).unwrap()
    }

    fn parse_err(body: &str) -> MalformedPath {
        let path = format!("x[{}]", body);
        Predicate::parse(body, 1, &path).unwrap_err()
    }

    #[test]
    fn test_parse_presence_and_comparisons() {
        assert_eq!(parse("id"), Predicate::Has("id".to_string()));
        assert_eq!(parse(" id > 2 ").op(), Some(Op::Gt));
        assert_eq!(parse("id>=2").op(), Some(Op::Ge));
        assert_eq!(parse("id<=2").op(), Some(Op::Le));
        assert_eq!(parse("id!=2").op(), Some(Op::Ne));
        assert_eq!(parse("id<2").op(), Some(Op::Lt));
        assert_eq!(
            parse("name=\"Jane Doe\""),
            Predicate::Compare {
                attribute: "name".to_string(),
                op: Op::Eq,
                value: "Jane Doe".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_regex() {
        let predicate = parse("name=/^j/i");
        assert_eq!(predicate.op(), Some(Op::Matches));
        assert_eq!(predicate.attribute(), Some("name"));
        assert_eq!(predicate.to_string(), "[name=/^j/i]");
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(parse("2").position(), Some(Position::Nth(2)));
        assert_eq!(parse("-1").position(), Some(Position::Nth(-1)));
        assert_eq!(parse(":first").position(), Some(Position::First));
        assert_eq!(parse(":last").position(), Some(Position::Last));
        assert_eq!(parse(":last").attribute(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_err("0").reason, "positions are 1-based");
        assert_eq!(parse_err(":middle").reason, "unknown positional selector");
        assert_eq!(parse_err("=1").reason, "missing attribute name");
        assert_eq!(parse_err("a==1").reason, "invalid operator");
        assert_eq!(parse_err("a==1").offset, 3);
        assert_eq!(parse_err("a<>1").reason, "invalid operator");
        assert_eq!(parse_err("a!1").reason, "invalid operator");
        assert_eq!(parse_err("a=/open").reason, "unterminated regular expression");
        assert!(parse_err("a=/x/q").reason.contains("flag"));
        assert!(parse_err("a=/(/").reason.starts_with("invalid regular expression"));
        assert_eq!(
            Predicate::parse("  ", 1, "x[  ]").unwrap_err().reason,
            "empty predicate"
        );
    }

    #[test]
    fn test_presence() {
        assert!(parse("id").test(&yaml("{id: 1}")));
        assert!(parse("id").test(&yaml("{id: ~}")));
        assert!(!parse("id").test(&yaml("{name: x}")));
        assert!(!parse("id").test(&yaml("[id]")));
        assert!(!parse("id").test(&yaml("id")));
    }

    #[test]
    fn test_numeric_and_string_comparisons() {
        let node = yaml("{id: 10, name: paul}");
        assert!(parse("id>9").test(&node));
        assert!(parse("id=10.0").test(&node));
        assert!(!parse("id<9").test(&node));
        assert!(parse("name>john").test(&node));
        assert!(parse("name!=john").test(&node));
        assert!(parse("name=paul").test(&node));
    }

    #[test]
    fn test_missing_attribute_fails_every_operator() {
        let node = yaml("{name: paul}");
        for body in ["id=1", "id!=1", "id>1", "id<1", "id>=1", "id<=1", "id=/.*/"] {
            assert!(!parse(body).test(&node), "{} should not match", body);
        }
    }

    #[test]
    fn test_non_scalar_attribute_fails_comparisons() {
        let node = yaml("{tags: [a, b]}");
        assert!(parse("tags").test(&node));
        assert!(!parse("tags=a").test(&node));
        assert!(!parse("tags=/a/").test(&node));
    }

    #[test]
    fn test_regex_matching() {
        let node = yaml("{name: John, active: true}");
        assert!(parse("name=/^jo/i").test(&node));
        assert!(!parse("name=/^jo/").test(&node));
        assert!(parse("active=/true/").test(&node));
        assert!(parse("active=true").test(&node));
    }

    #[test]
    fn test_evaluate_is_and_combined() {
        let node = yaml("{id: 2, name: paul}");
        let predicates = vec![parse("id>1"), parse("name=paul"), parse("1")];
        assert!(evaluate(&node, &predicates));
        let predicates = vec![parse("id>1"), parse("name=john")];
        assert!(!evaluate(&node, &predicates));
        assert!(evaluate(&node, &[]));
    }

    #[test]
    fn test_position_admits() {
        assert!(Position::First.admits(1, 3));
        assert!(Position::Last.admits(3, 3));
        assert!(!Position::Last.admits(2, 3));
        assert!(Position::Nth(2).admits(2, 3));
        assert!(Position::Nth(-1).admits(3, 3));
        assert!(Position::Nth(-3).admits(1, 3));
        assert!(!Position::Nth(5).admits(3, 3));
    }
}

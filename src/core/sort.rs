//! Reordering a container by a value found under each element

use crate::core::compare::{as_number, compare_scalars, natural_cmp};
use crate::core::engine::extract;
use crate::core::path::Path;
use crate::core::value::{scalar_string, untag};
use log::trace;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// How two sort keys are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKind {
    /// Numeric when both keys parse as numbers, by string otherwise
    #[default]
    Regular,
    /// Keys that do not parse as numbers count as zero
    Numeric,
    /// Byte-wise string comparison
    String,
    /// Digit runs compare by value
    Natural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortOptions {
    pub direction: SortDirection,
    pub kind: SortKind,
    /// Fold case before comparing; ignored by `Numeric`
    pub ignore_case: bool,
}

impl SortOptions {
    pub fn new(direction: SortDirection) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: SortKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let ordering = match self.kind {
            SortKind::Numeric => {
                let a = as_number(a).unwrap_or(0.0);
                let b = as_number(b).unwrap_or(0.0);
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            SortKind::Regular => compare_scalars(a, b),
            SortKind::String => a.cmp(b),
            SortKind::Natural => natural_cmp(a, b),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction `{}`", other)),
        }
    }
}

impl FromStr for SortKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(Self::Regular),
            "numeric" => Ok(Self::Numeric),
            "string" => Ok(Self::String),
            "natural" => Ok(Self::Natural),
            other => Err(format!("unknown sort kind `{}`", other)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

impl fmt::Display for SortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Numeric => write!(f, "numeric"),
            Self::String => write!(f, "string"),
            Self::Natural => write!(f, "natural"),
        }
    }
}

/// Sort the elements of `container` by the value `path` finds under each
pub fn sort(container: &Value, path: &Path, direction: SortDirection) -> Value {
    sort_with(container, path, &SortOptions::new(direction))
}

/// Sort with explicit options
///
/// `path` is evaluated relative to each element and its first match is the
/// element's sort key; elements where it matches nothing sort as null.
/// Elements with equal keys keep their relative order. Lists stay lists and
/// maps keep their keys. Scalars are returned unchanged.
pub fn sort_with(container: &Value, path: &Path, options: &SortOptions) -> Value {
    match untag(container) {
        Value::Sequence(seq) => {
            let mut decorated: Vec<(String, &Value)> = seq
                .iter()
                .map(|item| (sort_key(item, path, options), item))
                .collect();
            decorated.sort_by(|(a, _), (b, _)| options.compare(a, b));
            trace!("sorted {} list elements by `{}`", decorated.len(), path);
            Value::Sequence(decorated.into_iter().map(|(_, item)| item.clone()).collect())
        }
        Value::Mapping(map) => {
            let mut decorated: Vec<(String, (&Value, &Value))> = map
                .iter()
                .map(|entry| (sort_key(entry.1, path, options), entry))
                .collect();
            decorated.sort_by(|(a, _), (b, _)| options.compare(a, b));
            trace!("sorted {} map entries by `{}`", decorated.len(), path);
            Value::Mapping(
                decorated
                    .into_iter()
                    .map(|(_, (k, v))| (k.clone(), v.clone()))
                    .collect::<Mapping>(),
            )
        }
        _ => container.clone(),
    }
}

fn sort_key(item: &Value, path: &Path, options: &SortOptions) -> String {
    let key = extract(item, path)
        .first()
        .and_then(|found| scalar_string(found))
        .unwrap_or_default();
    if options.ignore_case && options.kind != SortKind::Numeric {
        key.to_lowercase()
    } else {
        key
    }
}

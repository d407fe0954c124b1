//! hashpath: a path-expression engine for nested maps and lists
//!
//! This library compiles dotted path expressions and evaluates them against
//! `serde_yaml::Value` trees, the ordered map/list/scalar model shared by
//! YAML and JSON documents. The same compiled [`Path`] drives reads
//! ([`extract`], [`get`], [`check`]), writes ([`insert`], [`remove`]) and
//! reordering ([`sort`]).
//!
//! # Path syntax
//!
//! | Form            | Meaning                                             |
//! |-----------------|-----------------------------------------------------|
//! | `a.b.c`         | literal keys, separated by `.`                      |
//! | `{n}`           | any list position or numeric map key                |
//! | `{s}`           | any non-numeric map key                             |
//! | `{*}`           | any key                                             |
//! | `[id]`          | keep nodes that have attribute `id`                 |
//! | `[id>2]`        | compare an attribute: `= != > < >= <=`              |
//! | `[name=/^a/i]`  | match an attribute against a regular expression     |
//! | `[2]`, `[-1]`   | keep the nth candidate (1-based, negative from end) |
//! | `[:first]`      | keep the first (or `[:last]` the last) candidate    |
//! | `..`            | step back to the parent of each match               |
//!
//! Backslash escapes `.`, `[`, `]`, `{`, `}` and `\` inside keys.
//!
//! # Quick Start
//!
//! ```rust
//! use hashpath::{extract, insert, Path, Result};
//! use serde_yaml::Value;
//!
//! fn main() -> Result<()> {
//!     let data: Value = serde_yaml::from_str(
//!         "users:\n- {name: Ada, age: 36}\n- {name: Alan, age: 41}\n",
//!     )?;
//!
//!     let older = Path::compile("users.{n}[age>40].name")?;
//!     assert_eq!(extract(&data, &older), vec![&Value::from("Alan")]);
//!
//!     let active = Path::compile("users.{n}.active")?;
//!     let data = insert(data, &active, Value::Bool(true));
//!     assert_eq!(extract(&data, &active).len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! Paths are compiled once and can be reused; [`PathCache`] memoizes
//! compilation for callers that receive path strings repeatedly, and the
//! [`convenience`] module offers string-path variants of the operations.
//!
//! # Errors
//!
//! Only compilation fails: [`MalformedPath`] points at the offending fragment.
//! Evaluation never errors; a path that does not fit the data simply matches
//! nothing. The I/O layer reports through [`HashPathError`].

pub mod core;
pub mod error;
pub mod io;

pub use crate::core::{
    check, combine, contains, diff, dimensions, expand, extract, filter, flatten, get, insert,
    insert_in_place, locate, max_dimensions, merge, merge_diff, merge_pair, numeric, parse_value,
    remove, remove_in_place, sort, sort_with, CompileOptions, Container, Key, KeyPath, Match,
    Path, PathCache, Predicate, Segment, Selector, SortDirection, SortKind, SortOptions,
    ValueType, DEFAULT_SEPARATOR,
};
pub use error::{ErrorSeverity, HashPathError, MalformedPath, Result};
pub use io::{read_document, write_document, Document, Format, WriteOptions};

/// Operations taking path strings instead of compiled paths
///
/// Each call compiles its path, so prefer [`Path`] or [`PathCache`] in loops.
///
/// ```rust
/// use hashpath::convenience;
/// use serde_yaml::Value;
///
/// let data: Value = serde_yaml::from_str("a: {b: 1}").unwrap();
/// assert_eq!(convenience::get(&data, "a.b").unwrap(), Some(&Value::from(1)));
/// assert!(convenience::get(&data, "a[").is_err());
/// ```
pub mod convenience {
    use crate::core::{self as engine, Path, SortDirection};
    use crate::error::Result;
    use serde_yaml::Value;

    pub fn get<'a>(container: &'a Value, path: &str) -> Result<Option<&'a Value>> {
        Ok(engine::get(container, &Path::compile(path)?))
    }

    pub fn extract<'a>(container: &'a Value, path: &str) -> Result<Vec<&'a Value>> {
        Ok(engine::extract(container, &Path::compile(path)?))
    }

    pub fn check(container: &Value, path: &str) -> Result<bool> {
        Ok(engine::check(container, &Path::compile(path)?))
    }

    pub fn insert(container: Value, path: &str, value: Value) -> Result<Value> {
        Ok(engine::insert(container, &Path::compile(path)?, value))
    }

    pub fn remove(container: Value, path: &str) -> Result<Value> {
        Ok(engine::remove(container, &Path::compile(path)?))
    }

    pub fn sort(container: &Value, path: &str, direction: SortDirection) -> Result<Value> {
        Ok(engine::sort(container, &Path::compile(path)?, direction))
    }

    pub fn combine(
        container: &Value,
        key_path: &str,
        value_path: Option<&str>,
        group_path: Option<&str>,
    ) -> Result<Value> {
        let key_path = Path::compile(key_path)?;
        let value_path = value_path.map(Path::compile).transpose()?;
        let group_path = group_path.map(Path::compile).transpose()?;
        engine::combine(
            container,
            &key_path,
            value_path.as_ref(),
            group_path.as_ref(),
        )
    }

}

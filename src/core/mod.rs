//! The path engine and the operations built on it

pub mod combine;
pub mod compare;
pub mod convert;
pub mod engine;
pub mod key_path;
pub mod mutate;
pub mod path;
pub mod predicate;
pub mod segment;
pub mod sort;
pub mod structure;
pub mod token;
pub mod value;

pub use combine::combine;
pub use compare::{compare_scalars, loose_eq, natural_cmp};
pub use convert::{from_json, to_json};
pub use engine::{check, extract, get, locate, Match};
pub use key_path::KeyPath;
pub use mutate::{insert, insert_in_place, remove, remove_in_place};
pub use path::{CompileOptions, Path, PathCache};
pub use predicate::{evaluate, Op, Position, Predicate};
pub use segment::{Segment, Selector};
pub use sort::{sort, sort_with, SortDirection, SortKind, SortOptions};
pub use structure::{
    contains, diff, dimensions, expand, filter, flatten, max_dimensions, merge, merge_diff,
    merge_pair, numeric, DEFAULT_SEPARATOR,
};
pub use value::{parse_value, Container, Key, Kind, ValueType};

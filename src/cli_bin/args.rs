//! Command-line argument definitions
//!
//! Library knobs (`CompileOptions`, `SortOptions`, `WriteOptions`,
//! `ResolverConfig`) are mirrored here as clap arguments and converted at the
//! boundary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use hashpath::core::{CompileOptions, SortDirection, SortOptions};
use hashpath::io::{Format, ResolverConfig};
use std::path::PathBuf;

/// Main CLI application
#[derive(Parser, Debug)]
#[command(
    name = "hashpath",
    version,
    about = "Query and reshape nested YAML and JSON documents with path expressions",
    long_about = "hashpath evaluates dotted path expressions such as \
                  `users.{n}[age>30].name` against YAML and JSON documents. It can \
                  extract, insert and remove values, flatten and expand documents, \
                  and merge, sort, diff or combine them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up a literal path
    Get(GetArgs),
    /// Collect every value a path expression matches
    Extract(ExtractArgs),
    /// Report whether a path expression matches anything
    Check(CheckArgs),
    /// Set a value at every slot a path addresses
    Insert(InsertArgs),
    /// Remove every value a path matches
    Remove(RemoveArgs),
    /// Collapse documents into single-level maps
    Flatten(FlattenArgs),
    /// Rebuild nested documents from flattened maps
    Expand(FlattenArgs),
    /// Deep-merge documents, later ones winning
    Merge(MergeArgs),
    /// Reorder elements by the value found under each
    Sort(SortArgs),
    /// Report whether one document contains another
    Contains(ContainsArgs),
    /// Key-wise difference of two documents
    Diff(DiffArgs),
    /// Build a map from parallel extractions
    Combine(CombineArgs),
    /// Drop null, empty and false values
    Filter(FilterArgs),
    /// Compile a path expression and show its segments
    Parse(ParseArgs),
}

/// Common options for reading input documents
#[derive(Args, Debug, Clone)]
pub struct InputOptions {
    /// Files or directories to process (standard input when omitted)
    pub files: Vec<PathBuf>,

    /// Follow symbolic links when processing directories
    #[arg(long)]
    pub follow_links: bool,

    /// Maximum depth for directory recursion
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Include hidden files (starting with .)
    #[arg(long)]
    pub include_hidden: bool,

    /// Format of standard input
    #[arg(long, value_enum, default_value = "yaml")]
    pub input_format: OutputFormat,
}

/// Common options for printing results
#[derive(Args, Debug, Clone)]
pub struct OutputOptions {
    /// Output format
    #[arg(long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,

    /// Pretty print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Common options for commands that rewrite documents
#[derive(Args, Debug, Clone)]
pub struct WriteOptions {
    /// Preview changes without modifying files (show diff)
    #[arg(long)]
    pub dry_run: bool,

    /// Create backup files with this suffix
    #[arg(long, value_name = "SUFFIX")]
    pub backup_suffix: Option<String>,

    /// Output modified content to stdout instead of writing to file
    #[arg(long)]
    pub stdout: bool,

    /// Pretty print JSON documents
    #[arg(long)]
    pub pretty: bool,
}

/// Limits applied when compiling path expressions
#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    /// Largest accepted number of path segments
    #[arg(long, value_name = "N", default_value_t = CompileOptions::default().max_segments)]
    pub max_segments: usize,

    /// Longest accepted path expression, in bytes
    #[arg(long, value_name = "BYTES", default_value_t = CompileOptions::default().max_length)]
    pub max_length: usize,
}

/// Arguments for the get command
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Literal path, e.g. `User.name`
    pub path: String,

    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub compile: CompileArgs,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Path expression, e.g. `{n}.Comment.{n}[author=john]`
    pub path: String,

    /// Show the resolved location of every match
    #[arg(long)]
    pub with_paths: bool,

    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub compile: CompileArgs,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path expression
    pub path: String,

    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub compile: CompileArgs,
}

/// Arguments for the insert command
#[derive(Args, Debug)]
pub struct InsertArgs {
    /// Path expression addressing the slots to write
    pub path: String,

    /// Value to insert
    #[arg(short = 'V', long, value_name = "VALUE")]
    pub value: String,

    /// Value type for type conversion
    #[arg(short, long, value_enum)]
    pub type_: Option<ValueType>,

    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub write_options: WriteOptions,

    #[command(flatten)]
    pub compile: CompileArgs,
}

/// Arguments for the remove command
#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Path expression matching the values to remove
    pub path: String,

    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub write_options: WriteOptions,

    #[command(flatten)]
    pub compile: CompileArgs,
}

/// Arguments for the flatten and expand commands
#[derive(Args, Debug)]
pub struct FlattenArgs {
    /// Key separator
    #[arg(short, long, default_value = ".")]
    pub separator: String,

    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Only add keys missing from the earlier documents
    #[arg(long)]
    pub missing_only: bool,

    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

/// Arguments for the sort command
#[derive(Args, Debug)]
pub struct SortArgs {
    /// Path evaluated relative to each element
    pub path: String,

    /// Sort in descending order
    #[arg(long)]
    pub desc: bool,

    /// How sort keys are compared
    #[arg(long, value_enum, default_value = "regular")]
    pub kind: SortKind,

    /// Fold case before comparing
    #[arg(long)]
    pub ignore_case: bool,

    /// Sort the container found at this path instead of the document root
    #[arg(long, value_name = "PATH")]
    pub at: Option<String>,

    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub write_options: WriteOptions,

    #[command(flatten)]
    pub compile: CompileArgs,
}

/// Arguments for the contains command
#[derive(Args, Debug)]
pub struct ContainsArgs {
    /// Document to search in
    pub haystack: PathBuf,

    /// Document that must be contained
    pub needle: PathBuf,
}

/// Arguments for the diff command
#[derive(Args, Debug)]
pub struct DiffArgs {
    pub left: PathBuf,

    pub right: PathBuf,

    #[command(flatten)]
    pub output: OutputOptions,
}

/// Arguments for the combine command
#[derive(Args, Debug)]
pub struct CombineArgs {
    /// Path whose matches become the keys
    pub key_path: String,

    /// Path whose matches become the values (null when omitted)
    #[arg(long = "values", value_name = "PATH")]
    pub value_path: Option<String>,

    /// Path whose matches group the entries
    #[arg(long = "group", value_name = "PATH")]
    pub group_path: Option<String>,

    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub output: OutputOptions,

    #[command(flatten)]
    pub compile: CompileArgs,
}

/// Arguments for the filter command
#[derive(Args, Debug)]
pub struct FilterArgs {
    #[command(flatten)]
    pub inputs: InputOptions,

    #[command(flatten)]
    pub output: OutputOptions,
}

/// Arguments for the parse command
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Path expression to compile
    pub path: String,

    #[command(flatten)]
    pub compile: CompileArgs,
}

/// Value types for CLI value conversion
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ValueType {
    /// String value
    String,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// Boolean value
    Bool,
    /// YAML or JSON literal (lists, maps)
    Yaml,
}

/// Document formats
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Sort key comparison
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SortKind {
    /// Numeric when both keys are numbers, by string otherwise
    Regular,
    /// Non-numeric keys count as zero
    Numeric,
    /// Byte-wise string comparison
    String,
    /// Digit runs compare by value
    Natural,
}

impl From<ValueType> for hashpath::core::ValueType {
    fn from(vt: ValueType) -> Self {
        match vt {
            ValueType::String => Self::String,
            ValueType::Int => Self::Int,
            ValueType::Float => Self::Float,
            ValueType::Bool => Self::Bool,
            ValueType::Yaml => Self::Yaml,
        }
    }
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => Self::Yaml,
            OutputFormat::Json => Self::Json,
        }
    }
}

impl From<SortKind> for hashpath::core::SortKind {
    fn from(kind: SortKind) -> Self {
        match kind {
            SortKind::Regular => Self::Regular,
            SortKind::Numeric => Self::Numeric,
            SortKind::String => Self::String,
            SortKind::Natural => Self::Natural,
        }
    }
}

impl From<&CompileArgs> for CompileOptions {
    fn from(args: &CompileArgs) -> Self {
        Self {
            max_length: args.max_length,
            max_segments: args.max_segments,
        }
    }
}

impl From<&InputOptions> for ResolverConfig {
    fn from(inputs: &InputOptions) -> Self {
        Self {
            follow_links: inputs.follow_links,
            max_depth: inputs.max_depth,
            include_hidden: inputs.include_hidden,
        }
    }
}

impl From<&WriteOptions> for hashpath::io::WriteOptions {
    fn from(options: &WriteOptions) -> Self {
        Self {
            dry_run: options.dry_run,
            backup_suffix: options.backup_suffix.clone(),
            pretty: options.pretty,
        }
    }
}

impl From<&SortArgs> for SortOptions {
    fn from(args: &SortArgs) -> Self {
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        SortOptions::new(direction)
            .kind(args.kind.into())
            .ignore_case(args.ignore_case)
    }
}

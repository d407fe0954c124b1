//! CLI command handlers that bridge CLI arguments to library operations

use crate::cli_bin::args::*;
use anyhow::{Context, Result};
use hashpath::core::{
    check, combine, contains, diff, expand, extract, filter, flatten, get, insert_in_place,
    locate, merge, merge_diff, parse_value, remove_in_place, sort_with, CompileOptions, KeyPath,
    Path, Selector, SortOptions,
};
use hashpath::io::{read_document, read_from, Document, FileResolver, Format, ResolverConfig};
use log::{debug, info, warn};
use serde_yaml::{Mapping, Value};
use std::io;

/// Execute the get command
pub fn get_command(args: GetArgs) -> Result<()> {
    debug!("Executing get command with args: {:?}", args);
    let path = compile(&args.path, &args.compile)?;

    let mut results = Vec::new();
    for document in load_documents(&args.inputs)? {
        match get(&document.value, &path) {
            Some(value) => results.push((label(&document), value.clone())),
            None => info!("{}: no value at `{}`", label(&document), path),
        }
    }
    print_results(results, &args.output)
}

/// Execute the extract command
pub fn extract_command(args: ExtractArgs) -> Result<()> {
    debug!("Executing extract command with args: {:?}", args);
    let path = compile(&args.path, &args.compile)?;

    let mut results = Vec::new();
    for document in load_documents(&args.inputs)? {
        let found = if args.with_paths {
            let located: Mapping = locate(&document.value, &path)
                .into_iter()
                .map(|m| (Value::String(m.path.to_string()), m.value.clone()))
                .collect();
            debug!("{}: {} matches", label(&document), located.len());
            Value::Mapping(located)
        } else {
            let values: Vec<Value> = extract(&document.value, &path)
                .into_iter()
                .cloned()
                .collect();
            debug!("{}: {} matches", label(&document), values.len());
            Value::Sequence(values)
        };
        results.push((label(&document), found));
    }
    print_results(results, &args.output)
}

/// Execute the check command
pub fn check_command(args: CheckArgs) -> Result<()> {
    debug!("Executing check command with args: {:?}", args);
    let path = compile(&args.path, &args.compile)?;

    let documents = load_documents(&args.inputs)?;
    let single = documents.len() == 1;
    for document in &documents {
        let matched = check(&document.value, &path);
        if single {
            println!("{}", matched);
        } else {
            println!("{}: {}", label(document), matched);
        }
    }
    Ok(())
}

/// Execute the insert command
pub fn insert_command(args: InsertArgs) -> Result<()> {
    debug!("Executing insert command");
    let path = compile(&args.path, &args.compile)?;
    let value = parse_value(&args.value, args.type_.map(Into::into))?;

    let mut processed_count = 0;
    for mut document in load_documents(&args.inputs)? {
        let written = insert_in_place(&mut document.value, &path, value.clone());
        debug!("{}: wrote {} slots", label(&document), written);
        if save(&document, &args.write_options)? {
            processed_count += 1;
        }
    }
    info!("Insert complete: {} files modified", processed_count);
    Ok(())
}

/// Execute the remove command
pub fn remove_command(args: RemoveArgs) -> Result<()> {
    debug!("Executing remove command");
    let path = compile(&args.path, &args.compile)?;

    let mut processed_count = 0;
    for mut document in load_documents(&args.inputs)? {
        let removed = remove_in_place(&mut document.value, &path);
        debug!("{}: removed {} values", label(&document), removed);
        if save(&document, &args.write_options)? {
            processed_count += 1;
        }
    }
    info!("Remove complete: {} files modified", processed_count);
    Ok(())
}

/// Execute the flatten command
pub fn flatten_command(args: FlattenArgs) -> Result<()> {
    debug!("Executing flatten command with args: {:?}", args);
    print_results(flatten_documents(&args)?, &args.output)
}

fn flatten_documents(args: &FlattenArgs) -> Result<Vec<(String, Value)>> {
    Ok(load_documents(&args.inputs)?
        .iter()
        .map(|document| {
            let flat = flatten(&document.value, &args.separator);
            (label(document), Value::Mapping(flat))
        })
        .collect())
}

/// Execute the expand command
pub fn expand_command(args: FlattenArgs) -> Result<()> {
    debug!("Executing expand command with args: {:?}", args);
    print_results(expand_documents(&args)?, &args.output)
}

fn expand_documents(args: &FlattenArgs) -> Result<Vec<(String, Value)>> {
    let mut results = Vec::new();
    for document in load_documents(&args.inputs)? {
        let flat = document
            .value
            .as_mapping()
            .with_context(|| format!("{}: expand expects a flat map", label(&document)))?;
        results.push((label(&document), expand(flat, &args.separator)));
    }
    Ok(results)
}

/// Execute the merge command
pub fn merge_command(args: MergeArgs) -> Result<()> {
    debug!("Executing merge command with args: {:?}", args);
    print_value(&merge_documents(&args)?, &args.output)
}

fn merge_documents(args: &MergeArgs) -> Result<Value> {
    let documents = load_documents(&args.inputs)?;
    let values: Vec<&Value> = documents.iter().map(|d| &d.value).collect();

    let merged = if args.missing_only {
        values
            .iter()
            .skip(1)
            .fold(values.first().map(|v| (*v).clone()), |acc, next| {
                acc.map(|acc| merge_diff(&acc, next))
            })
            .unwrap_or_else(|| Value::Mapping(Mapping::new()))
    } else {
        merge(values.iter().copied())
    };
    Ok(merged)
}

/// Execute the sort command
pub fn sort_command(args: SortArgs) -> Result<()> {
    debug!("Executing sort command");
    let path = compile(&args.path, &args.compile)?;
    let at = args
        .at
        .as_deref()
        .map(|at| compile(at, &args.compile))
        .transpose()?
        .unwrap_or_default();
    let options = SortOptions::from(&args);

    let mut processed_count = 0;
    for mut document in load_documents(&args.inputs)? {
        let targets: Vec<KeyPath> = locate(&document.value, &at)
            .into_iter()
            .map(|m| m.path)
            .collect();
        if targets.is_empty() {
            warn!("{}: nothing to sort at `{}`", label(&document), at);
        }
        for target in targets {
            if let Some(node) = target.resolve_mut(&mut document.value) {
                *node = sort_with(node, &path, &options);
            }
        }
        if save(&document, &args.write_options)? {
            processed_count += 1;
        }
    }
    info!("Sort complete: {} files modified", processed_count);
    Ok(())
}

/// Execute the contains command
pub fn contains_command(args: ContainsArgs) -> Result<()> {
    debug!("Executing contains command with args: {:?}", args);
    println!("{}", contains_documents(&args)?);
    Ok(())
}

fn contains_documents(args: &ContainsArgs) -> Result<bool> {
    let haystack = read_document(&args.haystack)
        .with_context(|| format!("failed to read {}", args.haystack.display()))?;
    let needle = read_document(&args.needle)
        .with_context(|| format!("failed to read {}", args.needle.display()))?;
    Ok(contains(&haystack.value, &needle.value))
}

/// Execute the diff command
pub fn diff_command(args: DiffArgs) -> Result<()> {
    debug!("Executing diff command with args: {:?}", args);
    print_value(&diff_documents(&args)?, &args.output)
}

fn diff_documents(args: &DiffArgs) -> Result<Value> {
    let left = read_document(&args.left)
        .with_context(|| format!("failed to read {}", args.left.display()))?;
    let right = read_document(&args.right)
        .with_context(|| format!("failed to read {}", args.right.display()))?;
    Ok(diff(&left.value, &right.value))
}

/// Execute the combine command
pub fn combine_command(args: CombineArgs) -> Result<()> {
    debug!("Executing combine command with args: {:?}", args);
    print_results(combine_documents(&args)?, &args.output)
}

fn combine_documents(args: &CombineArgs) -> Result<Vec<(String, Value)>> {
    let key_path = compile(&args.key_path, &args.compile)?;
    let value_path = args
        .value_path
        .as_deref()
        .map(|p| compile(p, &args.compile))
        .transpose()?;
    let group_path = args
        .group_path
        .as_deref()
        .map(|p| compile(p, &args.compile))
        .transpose()?;

    let mut results = Vec::new();
    for document in load_documents(&args.inputs)? {
        let combined = combine(
            &document.value,
            &key_path,
            value_path.as_ref(),
            group_path.as_ref(),
        )
        .with_context(|| format!("failed to combine {}", label(&document)))?;
        results.push((label(&document), combined));
    }
    Ok(results)
}

/// Execute the filter command
pub fn filter_command(args: FilterArgs) -> Result<()> {
    debug!("Executing filter command with args: {:?}", args);
    print_results(filter_documents(&args)?, &args.output)
}

fn filter_documents(args: &FilterArgs) -> Result<Vec<(String, Value)>> {
    Ok(load_documents(&args.inputs)?
        .iter()
        .map(|document| (label(document), filter(&document.value)))
        .collect())
}

/// Execute the parse command
pub fn parse_command(args: ParseArgs) -> Result<()> {
    debug!("Executing parse command with args: {:?}", args);
    let options = CompileOptions::from(&args.compile);
    let path = match Path::compile_with(&args.path, &options) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("{}", err.pointer());
            return Err(err.into());
        }
    };

    let segments: Vec<Value> = path
        .segments()
        .iter()
        .map(|segment| {
            let mut entry = Mapping::new();
            entry.insert("offset".into(), Value::Number((segment.offset() as u64).into()));
            entry.insert("kind".into(), selector_kind(segment.selector()).into());
            entry.insert("selector".into(), segment.selector().to_string().into());
            if !segment.predicates().is_empty() {
                let predicates = segment
                    .predicates()
                    .iter()
                    .map(|p| Value::String(p.to_string()))
                    .collect();
                entry.insert("predicates".into(), Value::Sequence(predicates));
            }
            Value::Mapping(entry)
        })
        .collect();
    print!("{}", serde_yaml::to_string(&Value::Sequence(segments))?);
    Ok(())
}

fn selector_kind(selector: &Selector) -> &'static str {
    match selector {
        Selector::Literal(_) => "literal",
        Selector::AnyNumeric => "numeric wildcard",
        Selector::AnyString => "string wildcard",
        Selector::AnyKey => "wildcard",
        Selector::Parent => "parent",
    }
}

fn compile(source: &str, args: &CompileArgs) -> Result<Path> {
    Path::compile_with(source, &CompileOptions::from(args))
        .with_context(|| format!("invalid path expression `{}`", source))
}

/// Read every input document, or standard input when no files are given
fn load_documents(inputs: &InputOptions) -> Result<Vec<Document>> {
    if inputs.files.is_empty() {
        debug!("Reading {} from standard input", Format::from(inputs.input_format));
        let document = read_from(io::stdin().lock(), inputs.input_format.into())
            .context("failed to read standard input")?;
        return Ok(vec![document]);
    }

    let resolver = FileResolver::with_config(ResolverConfig::from(inputs));
    let files = resolver.resolve_paths(&inputs.files)?;
    if files.is_empty() {
        warn!("No files found to process");
    }

    files
        .iter()
        .map(|file| {
            debug!("Processing file: {}", file.display());
            read_document(file).with_context(|| format!("failed to read {}", file.display()))
        })
        .collect()
}

fn label(document: &Document) -> String {
    document
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Write a rewritten document back, or print it; returns whether it changed
fn save(document: &Document, options: &WriteOptions) -> Result<bool> {
    if options.stdout || document.path().is_none() {
        print!("{}", document.render(options.pretty)?);
        return Ok(true);
    }

    let write_options = hashpath::io::WriteOptions::from(options);
    let result = hashpath::io::write_document(document, &write_options)
        .with_context(|| format!("failed to write {}", label(document)))?;
    if options.dry_run {
        if let Some(diff) = &result.diff {
            println!("{}", diff);
        }
    } else if result.modified {
        info!("Updated: {}", result.output_path.display());
    } else {
        debug!("Unchanged: {}", result.output_path.display());
    }
    Ok(result.modified)
}

fn print_value(value: &Value, output: &OutputOptions) -> Result<()> {
    let format = Format::from(output.format);
    print!("{}", format.render(value, output.pretty)?);
    Ok(())
}

/// Print one result bare, several keyed by file
fn print_results(results: Vec<(String, Value)>, output: &OutputOptions) -> Result<()> {
    match results.len() {
        0 => {
            info!("No matching values found");
            Ok(())
        }
        1 => print_value(&results[0].1, output),
        _ => {
            let by_file: Mapping = results
                .into_iter()
                .map(|(file, value)| (Value::String(file), value))
                .collect();
            print_value(&Value::Mapping(by_file), output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn inputs(files: Vec<std::path::PathBuf>) -> InputOptions {
        InputOptions {
            files,
            follow_links: false,
            max_depth: None,
            include_hidden: false,
            input_format: OutputFormat::Yaml,
        }
    }

    fn compile_args() -> CompileArgs {
        CompileArgs {
            max_segments: 4,
            max_length: 64,
        }
    }

    #[test]
    fn test_compile_respects_limits() {
        assert!(compile("a.b", &compile_args()).is_ok());
        let err = compile("a.b.c.d.e", &compile_args()).unwrap_err();
        assert!(err.to_string().contains("invalid path expression"));
    }

    #[test]
    fn test_insert_command_rewrites_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("data.yaml");
        fs::write(&file, "users:\n- name: a\n- name: b\n").unwrap();

        insert_command(InsertArgs {
            path: "users.{n}.active".to_string(),
            value: "true".to_string(),
            type_: Some(ValueType::Bool),
            inputs: inputs(vec![dir.path().to_path_buf()]),
            write_options: WriteOptions {
                dry_run: false,
                backup_suffix: Some(".orig".to_string()),
                stdout: false,
                pretty: false,
            },
            compile: compile_args(),
        })
        .unwrap();

        let written: Value = serde_yaml::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        let expected: Value =
            serde_yaml::from_str("{users: [{name: a, active: true}, {name: b, active: true}]}")
                .unwrap();
        assert_eq!(written, expected);
        assert!(dir.path().join("data.yaml.orig").exists());
    }

    #[test]
    fn test_remove_command_dry_run() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("data.json");
        fs::write(&file, "{\"a\": 1, \"b\": 2}").unwrap();

        remove_command(RemoveArgs {
            path: "a".to_string(),
            inputs: inputs(vec![file.clone()]),
            write_options: WriteOptions {
                dry_run: true,
                backup_suffix: None,
                stdout: false,
                pretty: false,
            },
            compile: compile_args(),
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&file).unwrap(), "{\"a\": 1, \"b\": 2}");
    }

    #[test]
    fn test_sort_command_at_nested_container() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("data.yaml");
        fs::write(&file, "team:\n  members:\n  - age: 40\n  - age: 20\n").unwrap();

        sort_command(SortArgs {
            path: "age".to_string(),
            desc: false,
            kind: SortKind::Numeric,
            ignore_case: false,
            at: Some("team.members".to_string()),
            inputs: inputs(vec![file.clone()]),
            write_options: WriteOptions {
                dry_run: false,
                backup_suffix: None,
                stdout: false,
                pretty: false,
            },
            compile: compile_args(),
        })
        .unwrap();

        let written: Value = serde_yaml::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        let expected: Value =
            serde_yaml::from_str("{team: {members: [{age: 20}, {age: 40}]}}").unwrap();
        assert_eq!(written, expected);
    }

    #[test]
    fn test_parse_command_reports_malformed_paths() {
        let err = parse_command(ParseArgs {
            path: "a[b".to_string(),
            compile: compile_args(),
        })
        .unwrap_err();
        assert!(err.downcast_ref::<hashpath::MalformedPath>().is_some());
    }

    fn output() -> OutputOptions {
        OutputOptions {
            format: OutputFormat::Yaml,
            pretty: false,
        }
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let file = dir.path().join(name);
        fs::write(&file, content).unwrap();
        file
    }

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_flatten_then_expand_files() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "nested.yaml", "a:\n  b: 1\n  c: [x, y]\n");

        let flat = flatten_documents(&FlattenArgs {
            separator: "/".to_string(),
            inputs: inputs(vec![file.clone()]),
            output: output(),
        })
        .unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].1, yaml("{a/b: 1, a/c/0: x, a/c/1: y}"));

        let flat_file = dir.path().join("flat.json");
        let document = hashpath::io::Document::new(flat[0].1.clone(), Format::Json);
        hashpath::io::write_document_to(
            &document,
            &flat_file,
            &hashpath::io::WriteOptions::default(),
        )
        .unwrap();

        let expanded = expand_documents(&FlattenArgs {
            separator: "/".to_string(),
            inputs: inputs(vec![flat_file]),
            output: output(),
        })
        .unwrap();
        assert_eq!(expanded[0].1, read_document(&file).unwrap().value);
    }

    #[test]
    fn test_expand_rejects_non_map_documents() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "list.yaml", "[1, 2]\n");
        let err = expand_documents(&FlattenArgs {
            separator: ".".to_string(),
            inputs: inputs(vec![file]),
            output: output(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("expand expects a flat map"));
    }

    #[test]
    fn test_merge_command_modes() {
        let dir = TempDir::new().unwrap();
        write(&dir, "1-base.yaml", "{server: {host: a, port: 80}, tags: [x]}");
        write(&dir, "2-local.yaml", "{server: {port: 8080, tls: true}, tags: [y]}");

        let args = |missing_only| MergeArgs {
            missing_only,
            inputs: inputs(vec![dir.path().to_path_buf()]),
            output: output(),
        };
        assert_eq!(
            merge_documents(&args(false)).unwrap(),
            yaml("{server: {host: a, port: 8080, tls: true}, tags: [x, y]}")
        );
        assert_eq!(
            merge_documents(&args(true)).unwrap(),
            yaml("{server: {host: a, port: 80, tls: true}, tags: [x]}")
        );
    }

    #[test]
    fn test_contains_command() {
        let dir = TempDir::new().unwrap();
        let haystack = write(&dir, "haystack.yaml", "{a: 1, b: {c: 2, d: 3}}");
        let needle = write(&dir, "needle.json", r#"{"b": {"c": 2}}"#);
        let other = write(&dir, "other.yaml", "{b: {c: 4}}");

        assert!(contains_documents(&ContainsArgs {
            haystack: haystack.clone(),
            needle,
        })
        .unwrap());
        assert!(!contains_documents(&ContainsArgs {
            haystack,
            needle: other,
        })
        .unwrap());
    }

    #[test]
    fn test_diff_command() {
        let dir = TempDir::new().unwrap();
        let left = write(&dir, "left.yaml", "{a: 1, b: 2, c: 3}");
        let right = write(&dir, "right.yaml", "{a: 1, b: 5, d: 4}");

        let result = diff_documents(&DiffArgs {
            left,
            right,
            output: output(),
        })
        .unwrap();
        assert_eq!(result, yaml("{b: 2, c: 3, d: 4}"));
    }

    #[test]
    fn test_combine_command() {
        let dir = TempDir::new().unwrap();
        let file = write(
            &dir,
            "users.yaml",
            "- {id: 1, name: ada, team: core}\n- {id: 2, name: alan, team: ops}\n",
        );

        let args = |group_path: Option<&str>| CombineArgs {
            key_path: "{n}.id".to_string(),
            value_path: Some("{n}.name".to_string()),
            group_path: group_path.map(str::to_string),
            inputs: inputs(vec![file.clone()]),
            output: output(),
            compile: compile_args(),
        };
        assert_eq!(
            combine_documents(&args(None)).unwrap()[0].1,
            yaml("{1: ada, 2: alan}")
        );
        assert_eq!(
            combine_documents(&args(Some("{n}.team"))).unwrap()[0].1,
            yaml("{core: {1: ada}, ops: {2: alan}}")
        );

        let mismatched = CombineArgs {
            value_path: Some("{n}[id=1].name".to_string()),
            ..args(None)
        };
        let err = combine_documents(&mismatched).unwrap_err();
        assert!(err.downcast_ref::<hashpath::HashPathError>().is_some());
    }

    #[test]
    fn test_filter_command_over_directory() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.yaml", "{keep: 0, drop: null, nested: {empty: []}}");
        write(&dir, "b.json", r#"{"name": "x", "flag": false}"#);

        let results = filter_documents(&FilterArgs {
            inputs: inputs(vec![dir.path().to_path_buf()]),
            output: output(),
        })
        .unwrap();
        let values: Vec<Value> = results.into_iter().map(|(_, value)| value).collect();
        assert_eq!(values, vec![yaml("{keep: 0}"), yaml("{name: x}")]);
    }

    #[test]
    fn test_load_documents_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_documents(&inputs(vec![dir.path().join("nope.yaml")])).unwrap_err();
        assert!(err.downcast_ref::<hashpath::HashPathError>().is_some());
    }
}

//! Integration tests for the hashpath library
//!
//! These tests drive the engine end to end: documents are read from disk,
//! queried and reshaped with compiled paths, and written back.

use hashpath::*;
use pretty_assertions::assert_eq;
use serde_yaml::Value;
use std::fs;
use tempfile::TempDir;

fn yaml(s: &str) -> Value {
    serde_yaml::from_str(s).unwrap()
}

const ARTICLES: &str = r#"
articles:
  - id: 1
    title: First Article
    user: {id: 1, name: mariano}
    tags: [cake, php]
  - id: 2
    title: Second Article
    user: {id: 3, name: larry}
    tags: [rust]
  - id: 3
    title: Third Article
    user: {id: 1, name: mariano}
    tags: []
"#;

#[test]
fn test_complete_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("articles.yaml");
    fs::write(&file_path, ARTICLES).unwrap();

    let document = read_document(&file_path).unwrap();
    assert_eq!(document.format, Format::Yaml);

    // Query
    let by_mariano = Path::compile("articles.{n}[title=/article$/i].user[name=mariano]..title")
        .unwrap();
    assert_eq!(
        extract(&document.value, &by_mariano),
        vec![&Value::from("First Article"), &Value::from("Third Article")]
    );

    // Modify
    let published = Path::compile("articles.{n}[id>1].published").unwrap();
    let value = insert(document.value.clone(), &published, Value::Bool(true));
    let value = remove(value, &Path::compile("articles.{n}.tags").unwrap());

    let result = write_document(&document.with_value(value), &WriteOptions::default()).unwrap();
    assert!(result.modified);

    // Read back
    let reread = read_document(&file_path).unwrap();
    assert_eq!(
        extract(&reread.value, &Path::compile("articles.{n}.published").unwrap()).len(),
        2
    );
    assert!(!check(&reread.value, &Path::compile("articles.{n}.tags").unwrap()));
    assert_eq!(
        get(&reread.value, &Path::compile("articles.0.user.name").unwrap()),
        Some(&Value::from("mariano"))
    );
}

#[test]
fn test_json_documents() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("config.json");
    fs::write(&file_path, r#"{"servers": [{"host": "a", "port": 80}, {"host": "b"}]}"#).unwrap();

    let document = read_document(&file_path).unwrap();
    assert_eq!(document.format, Format::Json);

    let port = Path::compile("servers.{n}[host=b].port").unwrap();
    let value = insert(document.value.clone(), &port, Value::from(8080));
    let options = WriteOptions {
        pretty: true,
        backup_suffix: Some(".bak".to_string()),
        ..WriteOptions::default()
    };
    let result = write_document(&document.with_value(value), &options).unwrap();
    assert_eq!(result.backup_path, Some(temp_dir.path().join("config.json.bak")));

    let written = fs::read_to_string(&file_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["servers"][1]["port"], serde_json::json!(8080));
    assert!(written.ends_with('\n'));
}

#[test]
fn test_read_errors() {
    let temp_dir = TempDir::new().unwrap();

    let missing = read_document(temp_dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(missing, HashPathError::FileNotFound { .. }));

    let text_file = temp_dir.path().join("notes.txt");
    fs::write(&text_file, "a: 1").unwrap();
    let unsupported = read_document(&text_file).unwrap_err();
    assert!(matches!(unsupported, HashPathError::UnsupportedFormat { .. }));

    let broken = temp_dir.path().join("broken.json");
    fs::write(&broken, "{not json").unwrap();
    let err = read_document(&broken).unwrap_err();
    assert!(matches!(err, HashPathError::Json(_)));
}

#[test]
fn test_path_cache_reuse() {
    let data = yaml(ARTICLES);
    let mut cache = PathCache::with_capacity(8);

    for _ in 0..3 {
        let path = cache.get("articles.{n}.user.name").unwrap();
        assert_eq!(extract(&data, path).len(), 3);
    }
    assert_eq!(cache.len(), 1);

    assert!(cache.get("articles.{n").is_err());
    assert_eq!(cache.len(), 1);

    assert!(cache.invalidate("articles.{n}.user.name"));
    assert!(cache.is_empty());
}

#[test]
fn test_combine_and_group() {
    let data = yaml(ARTICLES);
    let ids = Path::compile("articles.{n}.id").unwrap();
    let titles = Path::compile("articles.{n}.title").unwrap();
    let authors = Path::compile("articles.{n}.user.name").unwrap();

    assert_eq!(
        combine(&data, &ids, Some(&titles), None).unwrap(),
        yaml("{1: First Article, 2: Second Article, 3: Third Article}")
    );
    assert_eq!(
        combine(&data, &ids, Some(&titles), Some(&authors)).unwrap(),
        yaml(
            "{mariano: {1: First Article, 3: Third Article}, larry: {2: Second Article}}"
        )
    );

    let tags = Path::compile("articles.{n}.tags.0").unwrap();
    let err = combine(&data, &ids, Some(&tags), None).unwrap_err();
    assert!(matches!(err, HashPathError::Validation { .. }));
}

#[test]
fn test_sort_then_flatten() {
    let data = yaml(ARTICLES);
    let articles = &data["articles"];
    let by_user = SortOptions::new(SortDirection::Asc).kind(SortKind::String);
    let sorted = sort_with(articles, &Path::compile("user.name").unwrap(), &by_user);

    let flat = flatten(&sorted, "/");
    assert_eq!(flat.get("0/user/name"), Some(&Value::from("larry")));
    assert_eq!(flat.get("1/id"), Some(&Value::from(1)));
    assert_eq!(flat.get("2/id"), Some(&Value::from(3)));
    assert_eq!(flat.get("2/tags"), Some(&Value::Sequence(vec![])));
    assert_eq!(expand(&flat, "/"), sorted);
}

#[test]
fn test_merge_documents() {
    let defaults = yaml("{server: {host: localhost, port: 80}, plugins: [auth]}");
    let local = yaml("{server: {port: 8080}, plugins: [cache]}");

    assert_eq!(
        merge([&defaults, &local]),
        yaml("{server: {host: localhost, port: 8080}, plugins: [auth, cache]}")
    );
    assert_eq!(
        merge_diff(&local, &defaults),
        yaml("{server: {port: 8080, host: localhost}, plugins: [cache]}")
    );
    assert_eq!(
        diff(&defaults, &local),
        yaml("{server: {host: localhost, port: 80}, plugins: [auth]}")
    );

    let merged = merge([&defaults, &local]);
    assert!(contains(&merged, &yaml("{server: {port: 8080}}")));
    assert!(!contains(&merged, &local));
}

#[test]
fn test_json_conversion_round_trip() {
    let data = yaml(ARTICLES);
    let json = hashpath::core::to_json(&data).unwrap();
    assert_eq!(json["articles"][1]["user"]["name"], serde_json::json!("larry"));
    assert_eq!(hashpath::core::from_json(&json), data);
}

//! Scope traversal over declaration files on disk

use scope_defaults::config::{builtin_registry, parse_registry};
use scope_defaults::traversal::{scope_path, TraversalError};
use scope_defaults::{FieldValue, ScopeTree};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn strings(items: &[&str]) -> FieldValue {
    FieldValue::from(items.to_vec())
}

#[test]
fn test_discover_and_resolve_tree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "DEFAULTS.toml",
        r#"
[[set_defaults]]
all = { tags = ["repo"] }
"#,
    );
    write(
        root,
        "src/scala/DEFAULTS.toml",
        r#"
[[set_defaults]]
extend = true
directives = [{ "scala_sources, scalatest_tests" = { jdk = "17", tags = ["scala"] } }]
"#,
    );
    write(
        root,
        "src/scala/legacy/DEFAULTS.json",
        r#"{"set_defaults": [{"directives": [{"scala_sources": {}}]}]}"#,
    );
    write(root, "src/scala/app/BUILD", "scala_sources()\n");

    let tree = ScopeTree::discover(root).unwrap();
    assert_eq!(
        tree.paths().collect::<Vec<_>>(),
        vec!["", "src/scala", "src/scala/legacy"]
    );

    let registry = builtin_registry().unwrap();
    let resolved = tree.resolve(&registry).unwrap();

    let top = resolved.get("").unwrap();
    assert_eq!(top.len(), registry.len());
    assert_eq!(top.value("scalac_plugin", "tags"), Some(&strings(&["repo"])));

    let scala = resolved.get("src/scala").unwrap();
    assert_eq!(scala.value("scala_sources", "jdk"), Some(&FieldValue::from("17")));
    assert_eq!(scala.value("scala_sources", "tags"), Some(&strings(&["scala"])));
    assert_eq!(scala.value("target", "tags"), Some(&strings(&["repo"])));

    let legacy = resolved.get("src/scala/legacy").unwrap();
    assert!(legacy.get("scala_sources").is_none());
    assert_eq!(legacy.value("scalatest_tests", "jdk"), Some(&FieldValue::from("17")));

    // A directory without its own declaration uses its nearest ancestor's table.
    assert_eq!(resolved.defaults_for("src/scala/app"), scala);
    assert_eq!(resolved.defaults_for("docs"), top);
}

#[test]
fn test_hidden_directories_skipped() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        ".cache/DEFAULTS.toml",
        "[[set_defaults]]\ndirectives = [{ nope = {} }]\n",
    );

    let tree = ScopeTree::discover(temp.path()).unwrap();
    assert!(tree.is_empty());
}

#[test]
fn test_duplicate_declaration_files() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/DEFAULTS.toml", "");
    write(temp.path(), "src/DEFAULTS.json", "{}");

    let err = ScopeTree::discover(temp.path()).unwrap_err();
    assert!(matches!(err, TraversalError::DuplicateDeclaration(ref scope) if scope == "src"));
}

#[test]
fn test_malformed_declaration_reports_path() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/DEFAULTS.toml", "[[set_defaults]\n");

    let err = ScopeTree::discover(temp.path()).unwrap_err();
    assert!(matches!(err, TraversalError::Declaration { .. }));
    assert!(err.to_string().contains("DEFAULTS.toml"));
}

#[test]
fn test_invalid_directive_fails_resolution() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "src/proj/a/DEFAULTS.toml",
        r#"
[[set_defaults]]
directives = [{ target = { tags = "foo-bar" } }]
"#,
    );

    let tree = ScopeTree::discover(temp.path()).unwrap();
    let err = tree.resolve(&builtin_registry().unwrap()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The 'tags' field in src/proj/a#__defaults__ must be an iterable of strings \
         (e.g. a list of strings), but was `\"foo-bar\"` with type `str`."
    );
}

#[test]
fn test_custom_registry_with_deprecated_aliases() {
    let registry = parse_registry(
        r#"
[[kind]]
alias = "java_sources"
deprecated_alias = "java_library"

[[kind.field]]
alias = "jdk"
deprecated_alias = "jdk_version"
type = "string"
choices = ["11", "17"]
"#,
    )
    .unwrap();

    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "DEFAULTS.toml",
        r#"
[[set_defaults]]
directives = [{ java_library = { jdk_version = "11" } }]
"#,
    );

    let resolved = ScopeTree::discover(temp.path())
        .unwrap()
        .resolve(&registry)
        .unwrap();
    let table = resolved.get("").unwrap();
    assert_eq!(table.value("java_sources", "jdk"), Some(&FieldValue::from("11")));
    assert!(table.get("java_library").is_none());
}

#[test]
fn test_scope_lookup_by_absolute_and_dotted_paths() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "DEFAULTS.toml",
        "[[set_defaults]]\ndirectives = [{ target = { tags = [\"root\"] } }]\n",
    );
    write(
        root,
        "src/DEFAULTS.toml",
        "[[set_defaults]]\ndirectives = [{ target = { tags = [\"src\"] } }]\n",
    );

    let resolved = ScopeTree::discover(root)
        .unwrap()
        .resolve(&builtin_registry().unwrap())
        .unwrap();
    let src = resolved.get("src").unwrap();

    let absolute = scope_path(root, &root.join("src")).unwrap();
    assert_eq!(absolute, "src");
    assert_eq!(resolved.defaults_for(&absolute), src);
    assert_eq!(resolved.defaults_for("./src"), src);

    let outside = TempDir::new().unwrap();
    let err = scope_path(root, outside.path()).unwrap_err();
    assert!(matches!(err, TraversalError::OutsideRoot(_)));
}

//! Scope traversal
//!
//! Finds the declaration files under a root directory and resolves every
//! declared scope parent-first. A scope inherits the table of its nearest
//! declared ancestor directory, or the empty table at the root.

use defaults_registry::{KindRegistry, ScopeAddress};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::declaration::{DeclarationError, ScopeDeclaration};
use crate::defaults::{DefaultsEngine, DefaultsError, ResolvedDefaults};

/// Errors for scope traversal
#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("{path}: {source}")]
    Declaration {
        path: PathBuf,
        #[source]
        source: DeclarationError,
    },

    #[error("Multiple declaration files in scope '{0}'")]
    DuplicateDeclaration(String),

    #[error("Directory {} is outside the root directory", .0.display())]
    OutsideRoot(PathBuf),

    #[error(transparent)]
    Defaults(#[from] DefaultsError),
}

/// Declared scopes, keyed by `/`-separated directory path relative to the
/// root (`""` for the root itself).
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: BTreeMap<String, ScopeDeclaration>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the scope at `path`, replacing any previous declaration.
    pub fn insert(&mut self, path: &str, declaration: ScopeDeclaration) {
        let address = ScopeAddress::new(path);
        self.scopes.insert(address.path().to_string(), declaration);
    }

    /// Collect declaration files below `root`. Hidden directories are skipped.
    pub fn discover(root: &Path) -> Result<Self, TraversalError> {
        let mut tree = Self::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if !ScopeDeclaration::is_declaration_file(&file_name) {
                continue;
            }

            let dir = entry.path().parent().unwrap_or(root);
            let scope = relative_scope(root, dir);
            if tree.scopes.contains_key(&scope) {
                return Err(TraversalError::DuplicateDeclaration(scope));
            }

            let declaration =
                ScopeDeclaration::load(entry.path()).map_err(|source| TraversalError::Declaration {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
            if declaration.set_defaults.is_empty() {
                warn!(path = %entry.path().display(), "declaration file has no set_defaults calls");
            }
            debug!(scope = %scope, calls = declaration.set_defaults.len(), "found declaration");
            tree.scopes.insert(scope, declaration);
        }

        Ok(tree)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Resolve every declared scope against `registry`.
    pub fn resolve(&self, registry: &KindRegistry) -> Result<ResolvedScopes, TraversalError> {
        let mut resolved = ResolvedScopes::default();

        // Sorted paths put every ancestor before its descendants.
        for (path, declaration) in &self.scopes {
            let parent = resolved.defaults_for(path).clone();
            let mut engine = DefaultsEngine::new(ScopeAddress::new(path.as_str()), &parent, registry);
            for call in &declaration.set_defaults {
                engine.set_defaults(call)?;
            }
            let table = engine.freeze()?;
            debug!(scope = %engine.address(), kinds = table.len(), "resolved scope");
            resolved.tables.insert(path.clone(), table);
        }

        Ok(resolved)
    }
}

fn relative_scope(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Scope path of the directory `dir`, given either relative to `root` or as
/// an absolute path below it.
pub fn scope_path(root: &Path, dir: &Path) -> Result<String, TraversalError> {
    let relative = if dir.is_absolute() {
        let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let absolute = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        absolute
            .strip_prefix(&root)
            .map(Path::to_path_buf)
            .map_err(|_| TraversalError::OutsideRoot(dir.to_path_buf()))?
    } else {
        dir.to_path_buf()
    };

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                if segments.pop().is_none() {
                    return Err(TraversalError::OutsideRoot(dir.to_path_buf()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(TraversalError::OutsideRoot(dir.to_path_buf()));
            }
        }
    }
    Ok(segments.join("/"))
}

/// Parent directory of a `/`-separated scope path; `None` for the root.
fn parent_path(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or(""))
}

/// Frozen tables of every declared scope.
#[derive(Debug, Clone, Default)]
pub struct ResolvedScopes {
    tables: BTreeMap<String, ResolvedDefaults>,
    empty: ResolvedDefaults,
}

impl ResolvedScopes {
    /// Table of a declared scope.
    pub fn get(&self, path: &str) -> Option<&ResolvedDefaults> {
        self.tables.get(ScopeAddress::new(path).path())
    }

    /// Table in effect for the directory at `path`: its own if declared,
    /// else that of the nearest declared ancestor.
    pub fn defaults_for(&self, path: &str) -> &ResolvedDefaults {
        let address = ScopeAddress::new(path);
        let mut current = Some(address.path());
        while let Some(path) = current {
            if let Some(table) = self.tables.get(path) {
                return table;
            }
            current = parent_path(path);
        }
        &self.empty
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedDefaults)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::SetDefaults;
    use defaults_registry::{FieldDescriptor, FieldType, FieldValue, KindDescriptor};
    use serde_json::json;

    fn registry() -> KindRegistry {
        KindRegistry::builder()
            .common_field(FieldDescriptor::new("tags", FieldType::StringSequence))
            .register(KindDescriptor::new("target"))
            .register(KindDescriptor::new("other"))
            .build()
            .unwrap()
    }

    fn declare(calls: Vec<SetDefaults>) -> ScopeDeclaration {
        ScopeDeclaration { set_defaults: calls }
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path(""), None);
        assert_eq!(parent_path("src"), Some(""));
        assert_eq!(parent_path("src/proj/a"), Some("src/proj"));
    }

    #[test]
    fn test_relative_scope() {
        assert_eq!(relative_scope(Path::new("/repo"), Path::new("/repo")), "");
        assert_eq!(relative_scope(Path::new("/repo"), Path::new("/repo/src/a")), "src/a");
    }

    #[test]
    fn test_nearest_declared_ancestor_inherited() {
        let mut tree = ScopeTree::new();
        tree.insert(
            "",
            declare(vec![SetDefaults::new().directive(json!({"target": {"tags": ["root"]}}))]),
        );
        tree.insert(
            "src/proj",
            declare(vec![SetDefaults::new()
                .directive(json!({"other": {"tags": ["proj"]}}))
                .extend(true)]),
        );

        let resolved = tree.resolve(&registry()).unwrap();
        assert_eq!(resolved.len(), 2);

        let proj = resolved.get("src/proj").unwrap();
        assert_eq!(proj.value("target", "tags"), Some(&FieldValue::from(vec!["root"])));
        assert_eq!(proj.value("other", "tags"), Some(&FieldValue::from(vec!["proj"])));

        // Undeclared directories see their nearest declared ancestor.
        assert_eq!(resolved.defaults_for("src"), resolved.get("").unwrap());
        assert_eq!(resolved.defaults_for("src/proj/a/b"), proj);
    }

    #[test]
    fn test_lookup_path_normalized() {
        let mut tree = ScopeTree::new();
        tree.insert(
            "",
            declare(vec![SetDefaults::new().directive(json!({"target": {"tags": ["root"]}}))]),
        );
        tree.insert(
            "src",
            declare(vec![SetDefaults::new().directive(json!({"target": {"tags": ["src"]}}))]),
        );

        let resolved = tree.resolve(&registry()).unwrap();
        let src = resolved.get("src").unwrap();
        assert_eq!(resolved.defaults_for("./src"), src);
        assert_eq!(resolved.defaults_for("src/./a/"), src);
        assert_eq!(resolved.get("./src"), Some(src));
    }

    #[test]
    fn test_scope_path() {
        let root = Path::new("repo");
        assert_eq!(scope_path(root, Path::new(".")).unwrap(), "");
        assert_eq!(scope_path(root, Path::new("./src/a")).unwrap(), "src/a");
        assert_eq!(scope_path(root, Path::new("src/a/../b")).unwrap(), "src/b");
        assert!(matches!(
            scope_path(root, Path::new("../elsewhere")),
            Err(TraversalError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_no_declarations() {
        let resolved = ScopeTree::new().resolve(&registry()).unwrap();
        assert!(resolved.is_empty());
        assert!(resolved.defaults_for("anything").is_empty());
    }

    #[test]
    fn test_error_names_scope() {
        let mut tree = ScopeTree::new();
        tree.insert(
            "src/bad",
            declare(vec![SetDefaults::new().directive(json!({"nope": {}}))]),
        );
        let err = tree.resolve(&registry()).unwrap_err();
        assert_eq!(err.to_string(), "Unrecognized kind nope in src/bad#__defaults__.");
    }
}

//! Module resolver: locates `.lazy` files from configured search paths
//! and orchestrates parse + eval for `import` expressions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::env::Environment;
use crate::error::{ErrorKind, LazyError, RunResult, Tracer};
use crate::eval::Evaluator;
use crate::parser::parse_program;
use crate::stdlib;
use crate::value::Value;

/// Colon-separated list of directories searched for imports, configured
/// by the embedding host (the core never reads environment variables
/// itself — see `LAZYLANG_PATH` in the external-interfaces contract).
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    pub directories: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self { directories }
    }

    /// Parses a `LAZYLANG_PATH`-style colon-separated string plus a
    /// fallback standard-library directory appended last.
    pub fn from_env_string(raw: &str, stdlib_dir: PathBuf) -> Self {
        let mut directories: Vec<PathBuf> = raw.split(':').filter(|s| !s.is_empty()).map(PathBuf::from).collect();
        directories.push(stdlib_dir);
        Self { directories }
    }
}

enum CacheEntry {
    Loading,
    Loaded(Value),
}

/// Loads and caches imported modules, and supplies the auto-imported
/// standard-library bindings new evaluation roots start from.
pub struct ModuleResolver {
    search_path: SearchPath,
    cache: HashMap<PathBuf, CacheEntry>,
}

impl ModuleResolver {
    pub fn new(search_path: SearchPath) -> Self {
        Self { search_path, cache: HashMap::new() }
    }

    /// Builds the root environment every evaluation (top-level run or
    /// module load) starts from: built-ins plus the auto-imported
    /// standard modules, with `Basics`'s fields additionally promoted to
    /// unqualified identifiers.
    pub fn root_environment(&self) -> Rc<Environment> {
        stdlib::install(Environment::root())
    }

    pub fn resolve_and_load(&mut self, path: &str, importer_dir: &Rc<PathBuf>, tracer: &mut dyn Tracer) -> RunResult<Value> {
        let resolved = self.resolve_path(path, importer_dir)?;
        let canonical = resolved.canonicalize().unwrap_or(resolved.clone());
        tracer.on_import(path);

        if let Some(entry) = self.cache.get(&canonical) {
            return match entry {
                CacheEntry::Loaded(value) => Ok(value.clone()),
                CacheEntry::Loading => Err(LazyError::new(
                    ErrorKind::CyclicReference,
                    format!("import cycle detected while loading `{path}`"),
                )),
            };
        }

        self.cache.insert(canonical.clone(), CacheEntry::Loading);
        let source = std::fs::read_to_string(&resolved)
            .map_err(|_| LazyError::new(ErrorKind::ModuleNotFound, format!("could not read module at `{}`", resolved.display())))?;
        let program = parse_program(&source)?;
        let module_dir = Rc::new(resolved.parent().map(Path::to_path_buf).unwrap_or_default());
        let env = self.root_environment();
        let result = {
            let mut evaluator = Evaluator::new(self, tracer);
            evaluator.eval(&program, &env, &module_dir)
        };

        match result {
            Ok(value) => {
                self.cache.insert(canonical, CacheEntry::Loaded(value.clone()));
                Ok(value)
            }
            Err(err) => {
                self.cache.remove(&canonical);
                Err(err)
            }
        }
    }

    /// Resolution order (§4.5): explicit relative/absolute paths first,
    /// then each search directory in order, appending `.lazy` if the
    /// path lacks an extension.
    fn resolve_path(&self, path: &str, importer_dir: &Path) -> RunResult<PathBuf> {
        if path.starts_with('/') || path.starts_with("./") || path.starts_with("../") {
            let candidate = importer_dir.join(path);
            return first_existing(&[with_extension(&candidate), candidate])
                .ok_or_else(|| module_not_found(path));
        }

        for dir in &self.search_path.directories {
            let candidate = dir.join(path);
            if let Some(found) = first_existing(&[with_extension(&candidate), candidate.clone()]) {
                return Ok(found);
            }
        }

        Err(module_not_found(path))
    }
}

fn with_extension(candidate: &Path) -> PathBuf {
    if candidate.extension().is_some() {
        candidate.to_path_buf()
    } else {
        let mut with_ext = candidate.as_os_str().to_os_string();
        with_ext.push(".lazy");
        PathBuf::from(with_ext)
    }
}

fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|candidate| candidate.is_file()).cloned()
}

fn module_not_found(path: &str) -> LazyError {
    LazyError::new(ErrorKind::ModuleNotFound, format!("could not resolve import `{path}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NoopTracer;
    use std::io::Write;

    fn write_temp(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn resolves_relative_import_and_evaluates_it() {
        let dir = std::env::temp_dir().join(format!("lazylang-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        write_temp(&dir, "Lib.lazy", "{ double: x -> x * 2 }");
        let main_dir = Rc::new(dir.clone());

        let mut resolver = ModuleResolver::new(SearchPath::new(vec![]));
        let mut tracer = NoopTracer;
        let module = resolver.resolve_and_load("./Lib", &main_dir, &mut tracer).unwrap();
        match module {
            Value::Object(fields) => assert!(fields.contains_key("double")),
            other => panic!("unexpected {other:?}"),
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_module_is_module_not_found() {
        let dir = Rc::new(PathBuf::from("/nonexistent-lazylang-dir"));
        let mut resolver = ModuleResolver::new(SearchPath::new(vec![]));
        let mut tracer = NoopTracer;
        let err = resolver.resolve_and_load("./Missing", &dir, &mut tracer).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ModuleNotFound);
    }
}

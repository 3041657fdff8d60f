//! Tokenizer, parser, pattern matcher, and lazy tree-walking evaluator for
//! the Lazylang configuration language: a pure, dynamically-typed,
//! lazily-evaluated JSON superset meant to be embedded by a driver (CLI,
//! build tool, service) rather than run standalone.
//!
//! The two entry points a driver needs are [`evaluate`] and [`run`] (§6).
//! Both take a [`SearchPath`] for import resolution, a [`Tracer`] for
//! optional observability, an [`OutputMode`], and an optional manifest
//! directory; neither reads environment variables or touches anything
//! outside the paths a driver hands them.

pub mod ast;
pub mod builtins;
pub mod env;
pub mod error;
pub mod eval;
pub mod format;
pub mod module;
pub mod output;
pub mod parser;
pub mod pattern;
pub mod stdlib;
pub mod token;
pub mod value;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use error::{ErrorKind, LazyError, RunResult, Tracer};
use eval::Evaluator;
use module::{ModuleResolver, SearchPath};
pub use output::OutputMode;
use value::{LazyObject, Value};

/// Where a program's source text comes from: a path to a `.lazy` file on
/// disk, or an inline string with a working directory to resolve its
/// relative imports against.
pub enum Source<'a> {
    File(&'a Path),
    Inline { text: &'a str, cwd: PathBuf },
}

impl<'a> Source<'a> {
    fn load(&self) -> RunResult<(String, Rc<PathBuf>)> {
        match self {
            Source::File(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| LazyError::new(ErrorKind::ModuleNotFound, format!("could not read `{}`: {e}", path.display())))?;
                let cwd = path.parent().map(Path::to_path_buf).unwrap_or_default();
                Ok((text, Rc::new(cwd)))
            }
            Source::Inline { text, cwd } => Ok((text.to_string(), Rc::new(cwd.clone()))),
        }
    }
}

/// Where to send the rendered output of a call: back as a string, or
/// written out to files per the manifest convention (§6).
pub enum Destination<'a> {
    String,
    Manifest { base_dir: &'a Path },
}

/// Result of an [`evaluate`] or [`run`] call under a requested output mode.
pub enum Rendered {
    Text(String),
    ManifestWritten,
}

/// Loads a program and returns its final value, without requiring it to
/// be callable (§6, "Evaluate").
pub fn evaluate(source: Source, mode: OutputMode, destination: Destination<'_>, search_path: SearchPath, tracer: &mut dyn Tracer) -> RunResult<Rendered> {
    let (text, cwd) = source.load()?;
    let program = parser::parse_program(&text)?;
    let mut resolver = ModuleResolver::new(search_path);
    let env = resolver.root_environment();
    let mut evaluator = Evaluator::new(&mut resolver, tracer);
    let value = evaluator.eval(&program, &env, &cwd)?;
    render(&value, mode, destination, &mut evaluator)
}

/// Loads a program, requires it to evaluate to a function, and applies it
/// to a system-context object `{ args, env }` (§6, "Run").
pub fn run(
    source: Source,
    args: Vec<String>,
    env_vars: Vec<(String, String)>,
    mode: OutputMode,
    destination: Destination<'_>,
    search_path: SearchPath,
    tracer: &mut dyn Tracer,
) -> RunResult<Rendered> {
    let (text, cwd) = source.load()?;
    let program = parser::parse_program(&text)?;
    let mut resolver = ModuleResolver::new(search_path);
    let root_env = resolver.root_environment();
    let mut evaluator = Evaluator::new(&mut resolver, tracer);
    let entry = evaluator.eval(&program, &root_env, &cwd)?;
    if !entry.is_callable() {
        return Err(LazyError::type_mismatch("`run` requires the program's result to be a function", "Function", entry.type_name()));
    }

    let mut args_array = Vec::with_capacity(args.len());
    for arg in args {
        args_array.push(Value::string(arg));
    }
    let mut env_fields = LazyObject::new();
    for (key, value) in env_vars {
        env_fields.insert(key, Value::string(value));
    }
    let mut context = LazyObject::new();
    context.insert("args".to_string(), Value::array(args_array));
    context.insert("env".to_string(), Value::object(env_fields));

    let result = evaluator.apply(&entry, Value::object(context))?;
    render(&result, mode, destination, &mut evaluator)
}

/// Shared tail of `evaluate`/`run`: renders the final value through the
/// same evaluator that produced it, so thunks still inside it can resolve
/// further imports through the live module resolver rather than a fresh,
/// empty one.
fn render(value: &Value, mode: OutputMode, destination: Destination<'_>, evaluator: &mut Evaluator) -> RunResult<Rendered> {
    let mut force = |v: &Value| evaluator.force(v.clone());
    match destination {
        Destination::String => {
            let text = match mode {
                OutputMode::Pretty => format::format_value(value, &mut force)?,
                OutputMode::Json => output::to_json(value, &mut force)?,
                OutputMode::Yaml => output::to_yaml(value, &mut force)?,
            };
            Ok(Rendered::Text(text))
        }
        Destination::Manifest { base_dir } => {
            let fields = match value {
                Value::Object(fields) => fields.clone(),
                other => return Err(LazyError::type_mismatch("manifest mode requires the final value to be an object", "Object", other.type_name())),
            };
            output::write_manifest(&fields, mode, base_dir, &mut force)?;
            Ok(Rendered::ManifestWritten)
        }
    }
}

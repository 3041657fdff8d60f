//! The `json`/`yaml` output modes (§6). `pretty` mode is `format::format_value`
//! directly; this module fully forces a value tree and re-encodes it, since
//! both target formats need an owned tree rather than a streaming pass.

use indexmap::IndexMap;
use serde_json::{Map, Number, Value as Json};

use crate::error::{ErrorKind, LazyError, RunResult};
use crate::format::Force;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Pretty,
    Json,
    Yaml,
}

/// Forces a value and everything nested inside it into an owned
/// `serde_json::Value` tree. Functions have no JSON/YAML representation
/// and are rejected; symbols serialize as their `#name` string form since
/// neither target format has an atom type.
fn force_deep(value: &Value, force: &mut Force<'_>) -> RunResult<Json> {
    match value {
        Value::Integer(n) => Ok(Json::Number((*n).into())),
        Value::Float(n) => Ok(Number::from_f64(*n).map(Json::Number).unwrap_or(Json::Null)),
        Value::Boolean(b) => Ok(Json::Bool(*b)),
        Value::Null => Ok(Json::Null),
        Value::Symbol(s) => Ok(Json::String(format!("#{s}"))),
        Value::String(s) => Ok(Json::String(s.to_string())),
        Value::Array(items) | Value::Tuple(items) => {
            let out = items.iter().map(|item| force_deep(item, force)).collect::<RunResult<Vec<_>>>()?;
            Ok(Json::Array(out))
        }
        Value::Object(fields) => {
            let mut map = Map::with_capacity(fields.len());
            for (key, field_value) in fields.iter() {
                map.insert(key.clone(), force_deep(field_value, force)?);
            }
            Ok(Json::Object(map))
        }
        Value::Function(_) | Value::Native(_) => Err(LazyError::new(ErrorKind::TypeMismatch, "functions have no JSON or YAML representation")),
        Value::Thunk(_) => {
            let forced = force(value)?;
            force_deep(&forced, force)
        }
    }
}

pub fn to_json(value: &Value, force: &mut Force<'_>) -> RunResult<String> {
    let tree = force_deep(value, force)?;
    Ok(serde_json::to_string_pretty(&tree).expect("serde_json serialization of a value tree without functions never fails"))
}

pub fn to_yaml(value: &Value, force: &mut Force<'_>) -> RunResult<String> {
    let tree = force_deep(value, force)?;
    let mut out = String::new();
    write_yaml(&tree, 0, &mut out);
    Ok(out)
}

fn write_yaml(value: &Json, indent: usize, out: &mut String) {
    match value {
        Json::Array(items) if items.is_empty() => out.push_str("[]\n"),
        Json::Object(fields) if fields.is_empty() => out.push_str("{}\n"),
        Json::Array(items) => {
            for item in items {
                let pad = "  ".repeat(indent);
                match item {
                    Json::Array(_) | Json::Object(_) => {
                        out.push_str(&format!("{pad}-\n"));
                        write_yaml(item, indent + 1, out);
                    }
                    scalar => out.push_str(&format!("{pad}- {}\n", scalar_yaml(scalar))),
                }
            }
        }
        Json::Object(fields) => {
            for (key, field_value) in fields {
                let pad = "  ".repeat(indent);
                match field_value {
                    Json::Array(items) if !items.is_empty() => {
                        out.push_str(&format!("{pad}{key}:\n"));
                        write_yaml(field_value, indent, out);
                    }
                    Json::Object(inner) if !inner.is_empty() => {
                        out.push_str(&format!("{pad}{key}:\n"));
                        write_yaml(field_value, indent + 1, out);
                    }
                    scalar_or_empty => out.push_str(&format!("{pad}{key}: {}\n", scalar_yaml(scalar_or_empty))),
                }
            }
        }
        scalar => out.push_str(&format!("{}\n", scalar_yaml(scalar))),
    }
}

fn scalar_yaml(value: &Json) -> String {
    match value {
        Json::Null => "null".to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => n.to_string(),
        Json::String(s) => serde_json::to_string(s).expect("string always serializes"),
        Json::Array(_) => "[]".to_string(),
        Json::Object(_) => "{}".to_string(),
    }
}

/// Writes the fields of a manifest object to disk relative to `base_dir`,
/// one field per output file. Non-string field values are an error in
/// `pretty` mode; in `json`/`yaml` mode each field is individually encoded.
pub fn write_manifest(
    fields: &IndexMap<String, Value>,
    mode: OutputMode,
    base_dir: &std::path::Path,
    force: &mut Force<'_>,
) -> RunResult<()> {
    for (path, field_value) in fields.iter() {
        let rendered = match mode {
            OutputMode::Pretty => match field_value {
                Value::String(s) => s.to_string(),
                Value::Thunk(_) => match force(field_value)? {
                    Value::String(s) => s.to_string(),
                    other => {
                        return Err(LazyError::type_mismatch(
                            format!("manifest field `{path}` must be a string in pretty mode"),
                            "String",
                            other.type_name(),
                        ))
                    }
                },
                other => {
                    return Err(LazyError::type_mismatch(
                        format!("manifest field `{path}` must be a string in pretty mode"),
                        "String",
                        other.type_name(),
                    ))
                }
            },
            OutputMode::Json => to_json(field_value, force)?,
            OutputMode::Yaml => to_yaml(field_value, force)?,
        };
        let target = base_dir.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LazyError::new(ErrorKind::InvalidArgument, format!("could not create directory for manifest field `{path}`: {e}")))?;
        }
        std::fs::write(&target, rendered).map_err(|e| LazyError::new(ErrorKind::InvalidArgument, format!("could not write manifest field `{path}`: {e}")))?;
    }
    Ok(())
}

//! Canonical value formatting: shared by string interpolation
//! stringification and the pretty-print output mode. Forcing thunks is
//! part of formatting (§3: "any output formatting" forces fields), so
//! every entry point here takes a fallible force callback rather than
//! assuming values are already fully evaluated.

use crate::error::RunResult;
use crate::value::Value;

const WRAP_WIDTH: usize = 60;

pub type Force<'a> = dyn FnMut(&Value) -> RunResult<Value> + 'a;

/// Formats a value using the canonical rules in §6: integers print plain,
/// floats use the minimal round-trip decimal expansion (via `ryu`),
/// strings are JSON-escaped, and arrays/tuples/objects switch to a
/// multi-line layout once the inline form would exceed ~60 characters.
pub fn format_value(value: &Value, force: &mut Force<'_>) -> RunResult<String> {
    format_at(value, force, 0)
}

fn format_at(value: &Value, force: &mut Force<'_>, indent: usize) -> RunResult<String> {
    match value {
        Value::Integer(n) => Ok(n.to_string()),
        Value::Float(n) => Ok(format_float(*n)),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Symbol(s) => Ok(format!("#{s}")),
        Value::String(s) => Ok(format_string(s)),
        Value::Array(items) => format_sequence(items, "[", "]", force, indent),
        Value::Tuple(items) => format_sequence(items, "(", ")", force, indent),
        Value::Object(fields) => format_object(fields, force, indent),
        Value::Function(_) | Value::Native(_) => Ok("<function>".to_string()),
        Value::Thunk(_) => {
            let forced = force(value)?;
            format_at(&forced, force, indent)
        }
    }
}

/// Minimal decimal expansion preserving round-trip; whole-valued floats
/// print without a trailing `.0`... except that would make them
/// indistinguishable from integers in this language, so instead we print
/// the shortest form `ryu` gives us and only trim a redundant trailing
/// zero in the fractional part (`2.50` -> `2.5`), never the decimal point
/// itself.
fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let mut buffer = ryu::Buffer::new();
    let rendered = buffer.format(n);
    if let Some(stripped) = rendered.strip_suffix(".0") {
        format!("{stripped}.0")
    } else {
        rendered.to_string()
    }
}

fn format_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn format_sequence(items: &[Value], open: &str, close: &str, force: &mut Force<'_>, indent: usize) -> RunResult<String> {
    if items.is_empty() {
        return Ok(format!("{open}{close}"));
    }
    let parts: Vec<String> = items.iter().map(|item| format_at(item, force, indent + 1)).collect::<RunResult<_>>()?;
    let inline = format!("{open}{} {close}", parts.join(", "));
    if fits_inline(&inline) {
        Ok(format!("{open}{}{close}", parts.join(", ")))
    } else {
        let pad = "  ".repeat(indent + 1);
        let closing_pad = "  ".repeat(indent);
        Ok(format!("{open}\n{pad}{}\n{closing_pad}{close}", parts.join(&format!(",\n{pad}"))))
    }
}

fn format_object(fields: &indexmap::IndexMap<String, Value>, force: &mut Force<'_>, indent: usize) -> RunResult<String> {
    if fields.is_empty() {
        return Ok("{}".to_string());
    }
    let mut parts = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let rendered = format_at(value, force, indent + 1)?;
        parts.push(format!("{key}: {rendered}"));
    }
    let inline = format!("{{ {} }}", parts.join(", "));
    if fits_inline(&inline) {
        Ok(inline)
    } else {
        let pad = "  ".repeat(indent + 1);
        let closing_pad = "  ".repeat(indent);
        Ok(format!("{{\n{pad}{}\n{closing_pad}}}", parts.join(&format!(",\n{pad}"))))
    }
}

fn fits_inline(rendered: &str) -> bool {
    !rendered.contains('\n') && rendered.chars().count() <= WRAP_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_force(value: &Value) -> RunResult<Value> {
        Ok(value.clone())
    }

    #[test]
    fn integers_and_booleans() {
        let mut force = noop_force;
        assert_eq!(format_value(&Value::Integer(-5), &mut force).unwrap(), "-5");
        assert_eq!(format_value(&Value::Boolean(true), &mut force).unwrap(), "true");
        assert_eq!(format_value(&Value::Null, &mut force).unwrap(), "null");
    }

    #[test]
    fn whole_valued_floats_keep_point_zero() {
        let mut force = noop_force;
        assert_eq!(format_value(&Value::Float(2.0), &mut force).unwrap(), "2.0");
    }

    #[test]
    fn fractional_floats_round_trip() {
        let mut force = noop_force;
        assert_eq!(format_value(&Value::Float(3.14), &mut force).unwrap(), "3.14");
    }

    #[test]
    fn strings_are_json_escaped() {
        let mut force = noop_force;
        assert_eq!(format_value(&Value::string("a\"b"), &mut force).unwrap(), "\"a\\\"b\"");
    }

    #[test]
    fn symbol_prints_with_hash() {
        let mut force = noop_force;
        assert_eq!(format_value(&Value::symbol("ok"), &mut force).unwrap(), "#ok");
    }

    #[test]
    fn short_array_stays_inline() {
        let mut force = noop_force;
        let value = Value::array(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(format_value(&value, &mut force).unwrap(), "[1, 2]");
    }

    #[test]
    fn long_object_wraps_to_multiple_lines() {
        let mut force = noop_force;
        let mut fields = indexmap::IndexMap::new();
        for i in 0..10 {
            fields.insert(format!("fieldWithALongName{i}"), Value::Integer(i));
        }
        let rendered = format_value(&Value::object(fields), &mut force).unwrap();
        assert!(rendered.contains('\n'));
    }

    #[test]
    fn formatting_is_idempotent() {
        let mut force = noop_force;
        let value = Value::array(vec![Value::Integer(1), Value::string("x")]);
        let first = format_value(&value, &mut force).unwrap();
        let second = format_value(&value, &mut force).unwrap();
        assert_eq!(first, second);
    }
}

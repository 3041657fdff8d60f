//! Pattern matcher: attempts to bind a pattern against a runtime value,
//! producing either an extended environment or a mismatch signal. A
//! mismatch is returned as data (`MatchOutcome::Mismatch`) rather than an
//! error, since `when` arms treat it as "try the next arm" — callers
//! outside `when` are responsible for turning a mismatch into a
//! `TypeMismatch` error themselves.

use std::rc::Rc;

use crate::ast::Pattern;
use crate::env::Environment;
use crate::error::{ErrorKind, LazyError, RunResult};
use crate::value::Value;

pub enum MatchOutcome {
    Matched(Rc<Environment>),
    Mismatch,
}

/// Forces a thunked value to a concrete one; supplied by the evaluator so
/// this module stays free of thunk-forcing's environment/cwd plumbing.
pub type Force<'a> = dyn FnMut(&Value) -> RunResult<Value> + 'a;

pub fn match_pattern(
    pattern: &Pattern,
    value: &Value,
    env: &Rc<Environment>,
    force: &mut Force<'_>,
) -> RunResult<MatchOutcome> {
    match pattern {
        Pattern::Identifier(name) => Ok(MatchOutcome::Matched(env.extend(name.clone(), value.clone()))),

        Pattern::Integer(n) => match value {
            Value::Integer(v) if v == n => Ok(MatchOutcome::Matched(Rc::clone(env))),
            _ => Ok(MatchOutcome::Mismatch),
        },
        Pattern::Float(n) => match value {
            Value::Float(v) if v == n => Ok(MatchOutcome::Matched(Rc::clone(env))),
            _ => Ok(MatchOutcome::Mismatch),
        },
        Pattern::Boolean(b) => match value {
            Value::Boolean(v) if v == b => Ok(MatchOutcome::Matched(Rc::clone(env))),
            _ => Ok(MatchOutcome::Mismatch),
        },
        Pattern::Null => match value {
            Value::Null => Ok(MatchOutcome::Matched(Rc::clone(env))),
            _ => Ok(MatchOutcome::Mismatch),
        },
        Pattern::String(s) => match value {
            Value::String(v) if v.as_ref() == s.as_str() => Ok(MatchOutcome::Matched(Rc::clone(env))),
            _ => Ok(MatchOutcome::Mismatch),
        },
        Pattern::Symbol(s) => match value {
            Value::Symbol(v) if v.as_ref() == s.as_str() => Ok(MatchOutcome::Matched(Rc::clone(env))),
            _ => Ok(MatchOutcome::Mismatch),
        },

        Pattern::Tuple(elements) => {
            let Value::Tuple(items) = value else { return Ok(MatchOutcome::Mismatch) };
            if items.len() != elements.len() {
                return Ok(MatchOutcome::Mismatch);
            }
            let mut current = Rc::clone(env);
            for (subpattern, item) in elements.iter().zip(items.iter()) {
                match match_pattern(subpattern, item, &current, force)? {
                    MatchOutcome::Matched(next) => current = next,
                    MatchOutcome::Mismatch => return Ok(MatchOutcome::Mismatch),
                }
            }
            Ok(MatchOutcome::Matched(current))
        }

        Pattern::Array { prefix, rest } => {
            let Value::Array(items) = value else { return Ok(MatchOutcome::Mismatch) };
            let matches_len = match rest {
                Some(_) => items.len() >= prefix.len(),
                None => items.len() == prefix.len(),
            };
            if !matches_len {
                return Ok(MatchOutcome::Mismatch);
            }
            let mut current = Rc::clone(env);
            for (subpattern, item) in prefix.iter().zip(items.iter()) {
                match match_pattern(subpattern, item, &current, force)? {
                    MatchOutcome::Matched(next) => current = next,
                    MatchOutcome::Mismatch => return Ok(MatchOutcome::Mismatch),
                }
            }
            if let Some(rest_name) = rest {
                let tail: Vec<Value> = items[prefix.len()..].to_vec();
                current = current.extend(rest_name.clone(), Value::array(tail));
            }
            Ok(MatchOutcome::Matched(current))
        }

        Pattern::Object(field_patterns) => {
            let Value::Object(fields) = value else { return Ok(MatchOutcome::Mismatch) };
            let mut current = Rc::clone(env);
            for field_pattern in field_patterns {
                let Some(raw) = fields.get(&field_pattern.name) else {
                    return Ok(MatchOutcome::Mismatch);
                };
                let forced = force(raw)?;
                match &field_pattern.subpattern {
                    None => current = current.extend(field_pattern.name.clone(), forced),
                    Some(subpattern) => match match_pattern(subpattern, &forced, &current, force)? {
                        MatchOutcome::Matched(next) => current = next,
                        MatchOutcome::Mismatch => return Ok(MatchOutcome::Mismatch),
                    },
                }
            }
            Ok(MatchOutcome::Matched(current))
        }
    }
}

/// Matches outside a `when` arm: a mismatch becomes a `TypeMismatch` error.
pub fn match_required(
    pattern: &Pattern,
    value: &Value,
    env: &Rc<Environment>,
    force: &mut Force<'_>,
) -> RunResult<Rc<Environment>> {
    match match_pattern(pattern, value, env, force)? {
        MatchOutcome::Matched(env) => Ok(env),
        MatchOutcome::Mismatch => Err(LazyError::type_mismatch(
            "pattern did not match value",
            "matching pattern",
            value.type_name(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_force(value: &Value) -> RunResult<Value> {
        Ok(value.clone())
    }

    #[test]
    fn identifier_always_matches() {
        let env = Environment::root();
        let pattern = Pattern::Identifier("x".into());
        let mut force = noop_force;
        match match_pattern(&pattern, &Value::Integer(5), &env, &mut force).unwrap() {
            MatchOutcome::Matched(env) => assert!(matches!(env.lookup("x"), Some(Value::Integer(5)))),
            MatchOutcome::Mismatch => panic!("expected match"),
        }
    }

    #[test]
    fn tuple_pattern_matches_elementwise() {
        let env = Environment::root();
        let pattern = Pattern::Tuple(vec![Rc::new(Pattern::Symbol("ok".into())), Rc::new(Pattern::Identifier("v".into()))]);
        let value = Value::tuple(vec![Value::symbol("ok"), Value::Integer(7)]);
        let mut force = noop_force;
        match match_pattern(&pattern, &value, &env, &mut force).unwrap() {
            MatchOutcome::Matched(env) => assert!(matches!(env.lookup("v"), Some(Value::Integer(7)))),
            MatchOutcome::Mismatch => panic!("expected match"),
        }
    }

    #[test]
    fn tuple_pattern_mismatches_on_wrong_tag() {
        let env = Environment::root();
        let pattern = Pattern::Tuple(vec![Rc::new(Pattern::Symbol("ok".into())), Rc::new(Pattern::Identifier("v".into()))]);
        let value = Value::tuple(vec![Value::symbol("error"), Value::Integer(7)]);
        let mut force = noop_force;
        assert!(matches!(match_pattern(&pattern, &value, &env, &mut force).unwrap(), MatchOutcome::Mismatch));
    }

    #[test]
    fn array_pattern_with_rest() {
        let env = Environment::root();
        let pattern = Pattern::Array { prefix: vec![Rc::new(Pattern::Identifier("head".into()))], rest: Some("tail".into()) };
        let value = Value::array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        let mut force = noop_force;
        match match_pattern(&pattern, &value, &env, &mut force).unwrap() {
            MatchOutcome::Matched(env) => {
                assert!(matches!(env.lookup("head"), Some(Value::Integer(1))));
                match env.lookup("tail") {
                    Some(Value::Array(items)) => assert_eq!(items.len(), 2),
                    other => panic!("unexpected {other:?}"),
                }
            }
            MatchOutcome::Mismatch => panic!("expected match"),
        }
    }

    #[test]
    fn array_pattern_without_rest_requires_exact_length() {
        let env = Environment::root();
        let pattern = Pattern::Array { prefix: vec![Rc::new(Pattern::Identifier("a".into()))], rest: None };
        let value = Value::array(vec![Value::Integer(1), Value::Integer(2)]);
        let mut force = noop_force;
        assert!(matches!(match_pattern(&pattern, &value, &env, &mut force).unwrap(), MatchOutcome::Mismatch));
    }

    #[test]
    fn object_pattern_shorthand_and_subpattern() {
        let env = Environment::root();
        let mut fields = crate::value::LazyObject::new();
        fields.insert("first".into(), Value::string("John"));
        fields.insert("tag".into(), Value::symbol("ok"));
        let value = Value::object(fields);
        let pattern = Pattern::Object(vec![
            crate::ast::ObjectFieldPattern { name: "first".into(), subpattern: None },
            crate::ast::ObjectFieldPattern {
                name: "tag".into(),
                subpattern: Some(Rc::new(Pattern::Symbol("ok".into()))),
            },
        ]);
        let mut force = noop_force;
        match match_pattern(&pattern, &value, &env, &mut force).unwrap() {
            MatchOutcome::Matched(env) => assert!(matches!(env.lookup("first"), Some(Value::String(s)) if s.as_ref() == "John")),
            MatchOutcome::Mismatch => panic!("expected match"),
        }
    }

    #[test]
    fn object_pattern_missing_field_mismatches() {
        let env = Environment::root();
        let fields = crate::value::LazyObject::new();
        let value = Value::object(fields);
        let pattern = Pattern::Object(vec![crate::ast::ObjectFieldPattern { name: "missing".into(), subpattern: None }]);
        let mut force = noop_force;
        assert!(matches!(match_pattern(&pattern, &value, &env, &mut force).unwrap(), MatchOutcome::Mismatch));
    }

    #[test]
    fn match_required_raises_type_mismatch() {
        let env = Environment::root();
        let pattern = Pattern::Integer(1);
        let mut force = noop_force;
        let err = match_required(&pattern, &Value::Integer(2), &env, &mut force).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }
}

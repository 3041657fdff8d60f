//! End-to-end scenarios exercising the tokenizer, parser, pattern matcher,
//! and evaluator together through the public `evaluate` entry point.

use std::io::Write;
use std::path::PathBuf;

use lazylang::error::NoopTracer;
use lazylang::module::SearchPath;
use lazylang::value::Value;
use lazylang::{evaluate, Destination, OutputMode, Source};

fn eval_value(source: &str) -> Value {
    use lazylang::eval::Evaluator;
    use lazylang::module::ModuleResolver;
    use lazylang::parser::parse_program;

    let program = parse_program(source).expect("parses");
    let mut resolver = ModuleResolver::new(SearchPath::new(vec![]));
    let env = resolver.root_environment();
    let cwd = std::rc::Rc::new(std::env::temp_dir());
    let mut tracer = NoopTracer;
    let mut evaluator = Evaluator::new(&mut resolver, &mut tracer);
    evaluator.eval(&program, &env, &cwd).expect("evaluates")
}

fn eval_err(source: &str) -> lazylang::error::LazyError {
    use lazylang::eval::Evaluator;
    use lazylang::module::ModuleResolver;
    use lazylang::parser::parse_program;

    let program = parse_program(source).expect("parses");
    let mut resolver = ModuleResolver::new(SearchPath::new(vec![]));
    let env = resolver.root_environment();
    let cwd = std::rc::Rc::new(std::env::temp_dir());
    let mut tracer = NoopTracer;
    let mut evaluator = Evaluator::new(&mut resolver, &mut tracer);
    evaluator.eval(&program, &env, &cwd).expect_err("expected a failure")
}

#[test]
fn lambda_application() {
    let value = eval_value("(x -> x + 1) 41");
    assert!(matches!(value, Value::Integer(42)));
}

#[test]
fn object_destructuring_let() {
    let value = eval_value(r#"{ first, last } = { first: "John", last: "Doe" }
first"#);
    match value {
        Value::String(s) => assert_eq!(s.as_ref(), "John"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn nested_array_comprehension() {
    let value = eval_value("[x + y for x in [1, 2] for y in [10, 20]]");
    let items = match value {
        Value::Array(items) => items,
        other => panic!("unexpected {other:?}"),
    };
    let ints: Vec<i64> = items.iter().map(|v| match v {
        Value::Integer(n) => *n,
        other => panic!("unexpected {other:?}"),
    }).collect();
    assert_eq!(ints, vec![11, 21, 12, 22]);
}

#[test]
fn lazy_field_isolation_skips_unaccessed_crash() {
    let value = eval_value(r#"{ valid: 42, bad: crash "oops" }.valid"#);
    assert!(matches!(value, Value::Integer(42)));
}

#[test]
fn accessing_the_crashing_field_does_raise() {
    let err = eval_err(r#"{ valid: 42, bad: crash "oops" }.bad"#);
    assert_eq!(err.kind, lazylang::error::ErrorKind::UserCrash);
}

#[test]
fn when_matches_destructures_a_result_tuple() {
    let value = eval_value(
        r#"result = (#error, "msg")
when result matches
  (#ok, v) then v
  (#error, m) then m"#,
    );
    match value {
        Value::String(s) => assert_eq!(s.as_ref(), "msg"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn two_file_import_resolves_relative_to_importer() {
    let dir = std::env::temp_dir().join(format!("lazylang-scenario-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let lib_path = dir.join("Lib.lazy");
    let mut lib_file = std::fs::File::create(&lib_path).unwrap();
    lib_file.write_all(b"{ greeting: name -> \"hello \" ++ name }").unwrap();

    let main_source = r#"Lib = import './Lib'
Lib.greeting "world""#;
    let main_path = dir.join("main.lazy");
    let mut main_file = std::fs::File::create(&main_path).unwrap();
    main_file.write_all(main_source.as_bytes()).unwrap();

    let mut tracer = NoopTracer;
    let rendered = evaluate(
        Source::File(&main_path),
        OutputMode::Pretty,
        Destination::String,
        SearchPath::new(vec![]),
        &mut tracer,
    )
    .expect("evaluates");

    match rendered {
        lazylang::Rendered::Text(text) => assert_eq!(text, "\"hello world\""),
        _ => panic!("expected text output"),
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn object_merge_keeps_left_order_then_right_only_keys() {
    let value = eval_value(r#"{ a: 1, b: 2 } & { b: 20, c: 3 }"#);
    match value {
        Value::Object(fields) => {
            let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
            assert_eq!(keys, vec!["a", "b", "c"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn recursive_let_binding_supports_self_reference() {
    let value = eval_value(
        r#"fact = n -> if n == 0 then 1 else n * fact (n - 1)
fact 5"#,
    );
    assert!(matches!(value, Value::Integer(120)));
}

#[test]
fn self_referential_object_field_raises_cyclic_reference() {
    let err = eval_err("obj = { x: obj.x }\nobj.x");
    assert_eq!(err.kind, lazylang::error::ErrorKind::CyclicReference);
}

#[test]
fn json_output_mode_renders_deeply() {
    let mut tracer = NoopTracer;
    let rendered = evaluate(
        Source::Inline { text: "{ a: 1, b: [1, 2] }", cwd: PathBuf::new() },
        OutputMode::Json,
        Destination::String,
        SearchPath::new(vec![]),
        &mut tracer,
    )
    .expect("evaluates");
    match rendered {
        lazylang::Rendered::Text(text) => {
            assert!(text.contains("\"a\""));
            assert!(text.contains("\"b\""));
        }
        _ => panic!("expected text output"),
    }
}


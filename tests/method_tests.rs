// String methods and library object tests

mod common;

use ardtrace::interpreter::{ErrorKind, FixedProvider};
use ardtrace::memory::value::Value;
use ardtrace::{InterpreterOptions, RawNode};
use common::*;
use pretty_assertions::assert_eq;

fn text(s: &str) -> Value {
    Value::Str(s.to_string())
}

/// `object.method(args)` on an arbitrary receiver expression
fn call_on(object: RawNode, method: &str, args: Vec<RawNode>) -> RawNode {
    RawNode::new("FuncCall")
        .with_child(member(object, method))
        .with_children(args)
}

#[test]
fn test_string_queries() {
    let interp = run_setup(vec![
        decl("String", "s", Some(string("Hello"))),
        decl("int", "n", Some(method_call("s", "length", vec![]))),
        decl("char", "c", Some(method_call("s", "charAt", vec![num(1)]))),
        decl("char", "past", Some(method_call("s", "charAt", vec![num(9)]))),
        decl("int", "first", Some(method_call("s", "indexOf", vec![string("l")]))),
        decl("int", "from", Some(method_call("s", "indexOf", vec![num(108), num(3)]))),
        decl("int", "last", Some(method_call("s", "lastIndexOf", vec![num(108)]))),
        decl("int", "missing", Some(method_call("s", "indexOf", vec![string("z")]))),
        decl("String", "mid", Some(method_call("s", "substring", vec![num(1), num(3)]))),
        decl("String", "rest", Some(method_call("s", "substring", vec![num(3)]))),
        decl("bool", "starts", Some(method_call("s", "startsWith", vec![string("He")]))),
        decl("bool", "ends", Some(method_call("s", "endsWith", vec![string("x")]))),
        decl("bool", "same", Some(method_call("s", "equals", vec![string("Hello")]))),
    ]);

    assert_eq!(last_set(&interp, "n"), Value::Int(5));
    assert_eq!(last_set(&interp, "c"), Value::Int(101));
    assert_eq!(last_set(&interp, "past"), Value::Int(0));
    assert_eq!(last_set(&interp, "first"), Value::Int(2));
    assert_eq!(last_set(&interp, "from"), Value::Int(3));
    assert_eq!(last_set(&interp, "last"), Value::Int(3));
    assert_eq!(last_set(&interp, "missing"), Value::Int(-1));
    assert_eq!(last_set(&interp, "mid"), text("el"));
    assert_eq!(last_set(&interp, "rest"), text("lo"));
    assert_eq!(last_set(&interp, "starts"), Value::Bool(true));
    assert_eq!(last_set(&interp, "ends"), Value::Bool(false));
    assert_eq!(last_set(&interp, "same"), Value::Bool(true));
    // Queries leave the receiver alone
    assert_eq!(var_sets(&interp, "s"), vec![text("Hello")]);
    assert!(errors(&interp).is_empty());
}

#[test]
fn test_string_modifiers_update_the_receiver() {
    let interp = run_setup(vec![
        decl("String", "s", Some(string("  Hello  "))),
        expr_stmt(method_call("s", "trim", vec![])),
        expr_stmt(method_call("s", "toUpperCase", vec![])),
        expr_stmt(method_call("s", "replace", vec![string("L"), string("1")])),
        expr_stmt(method_call("s", "setCharAt", vec![num(0), num(74)])),
        expr_stmt(method_call("s", "setCharAt", vec![num(40), num(74)])),
        decl("String", "lower", Some(method_call("s", "toLowerCase", vec![]))),
        decl(
            "int",
            "tail",
            Some(call_on(
                method_call("s", "substring", vec![num(1)]),
                "length",
                vec![],
            )),
        ),
    ]);

    assert_eq!(
        var_sets(&interp, "s"),
        vec![
            text("  Hello  "),
            text("Hello"),
            text("HELLO"),
            text("HE11O"),
            text("JE11O"),
            text("JE11O"),
            text("je11o"),
        ]
    );
    assert_eq!(last_set(&interp, "lower"), text("je11o"));
    assert_eq!(last_set(&interp, "tail"), Value::Int(4));
    assert!(errors(&interp).is_empty());
}

#[test]
fn test_string_numeric_conversions() {
    let interp = run_setup(vec![
        decl("String", "digits", Some(string(" -42abc"))),
        decl("String", "volts", Some(string("3.5V"))),
        decl("String", "word", Some(string("none"))),
        decl("int", "i", Some(method_call("digits", "toInt", vec![]))),
        decl("float", "f", Some(method_call("volts", "toFloat", vec![]))),
        decl("int", "z", Some(method_call("word", "toInt", vec![]))),
    ]);

    assert_eq!(last_set(&interp, "i"), Value::Int(-42));
    assert_eq!(last_set(&interp, "f"), Value::Float(3.5));
    assert_eq!(last_set(&interp, "z"), Value::Int(0));
}

#[test]
fn test_string_method_errors() {
    let interp = run_setup(vec![
        decl("String", "s", Some(string("abc"))),
        expr_stmt(method_call("s", "reverse", vec![])),
        expr_stmt(method_call("s", "charAt", vec![])),
        decl("int", "n", Some(num(3))),
        expr_stmt(method_call("n", "length", vec![])),
        expr_stmt(method_call("s", "setCharAt", vec![num(0), num(200)])),
    ]);

    assert_eq!(
        errors(&interp),
        vec![
            (ErrorKind::UnknownFunction, false),
            (ErrorKind::TypeMismatch, false),
            (ErrorKind::TypeMismatch, false),
            (ErrorKind::TypeMismatch, false),
        ]
    );
    assert_eq!(var_sets(&interp, "s"), vec![text("abc")]);
}

#[test]
fn test_struct_field_function_is_callable() {
    let ping = function(
        "ping",
        "int",
        &[],
        vec![ret(Some(num(7)))],
    );
    let interp = run_setup_with(
        vec![ping, struct_def("Handler", &[("auto", "run")])],
        vec![
            decl("struct Handler", "h", Some(init_list(vec![ident("ping")]))),
            decl("int", "r", Some(method_call("h", "run", vec![]))),
        ],
        InterpreterOptions::default(),
    );
    assert_eq!(last_set(&interp, "r"), Value::Int(7));
    assert_eq!(calls(&interp, "ping").len(), 1);
}

fn sensor_sketch() -> (Vec<RawNode>, Vec<RawNode>) {
    let globals = vec![decl(
        "CapacitiveSensor",
        "pad",
        Some(call("CapacitiveSensor", vec![num(4), num(2)])),
    )];
    let body = vec![
        expr_stmt(method_call("pad", "set_CS_AutocaL_Millis", vec![num(5000)])),
        decl("long", "total", Some(method_call("pad", "capacitiveSensor", vec![num(30)]))),
        decl("long", "raw", Some(method_call("pad", "capacitiveSensorRaw", vec![num(10)]))),
    ];
    (globals, body)
}

#[test]
fn test_library_object_reads_from_provider() {
    let (globals, body) = sensor_sketch();
    let interp = run_setup_with(globals, body, InterpreterOptions::default());

    assert!(errors(&interp).is_empty());
    assert_eq!(last_set(&interp, "total"), Value::Int(967));
    assert_eq!(last_set(&interp, "raw"), Value::Int((10 * 13 + 477) % 2000 + 100));
    assert_eq!(
        calls(&interp, "CapacitiveSensor")[0].message,
        "CapacitiveSensor(4, 2)"
    );
    assert_eq!(
        calls(&interp, "CapacitiveSensor.capacitiveSensor")[0].message,
        "CapacitiveSensor.capacitiveSensor(30) = 967"
    );
    assert_eq!(
        calls(&interp, "CapacitiveSensor.set_CS_AutocaL_Millis")[0].message,
        "CapacitiveSensor.set_CS_AutocaL_Millis(5000)"
    );
}

#[test]
fn test_library_object_uses_custom_provider() {
    let (globals, body) = sensor_sketch();
    let tree = program(vec![
        globals.into_iter().next().unwrap(),
        function("setup", "void", &[], body),
    ]);
    let provider = FixedProvider::new().with_library("CapacitiveSensor", "capacitiveSensor", 1234);
    let mut interp = ardtrace::Interpreter::from_tree(&tree, InterpreterOptions::default())
        .with_provider(Box::new(provider));
    interp.run();

    assert_eq!(last_set(&interp, "total"), Value::Int(1234));
    assert_eq!(last_set(&interp, "raw"), Value::Int(0));
}

#[test]
fn test_unknown_library_method_is_reported() {
    let interp = run_setup_with(
        vec![decl("CapacitiveSensor", "pad", None)],
        vec![
            expr_stmt(method_call("pad", "calibrate", vec![])),
            decl("long", "v", Some(method_call("pad", "capacitiveSensor", vec![]))),
        ],
        InterpreterOptions::default(),
    );
    assert_eq!(
        errors(&interp),
        vec![
            (ErrorKind::UnknownFunction, false),
            (ErrorKind::TypeMismatch, false),
        ]
    );
}

// Pointer, array and reference tests

mod common;

use ardtrace::interpreter::ErrorKind;
use ardtrace::memory::value::Value;
use ardtrace::{InterpreterOptions, RawNode};
use common::*;

fn arr5() -> RawNode {
    decl(
        "int[5]",
        "arr",
        Some(init_list(vec![num(10), num(20), num(30), num(40), num(50)])),
    )
}

#[test]
fn test_pointer_chain_reads_and_writes() {
    let interp = run_setup(vec![
        decl("int", "x", Some(num(5))),
        decl("int*", "p1", Some(addr(ident("x")))),
        decl("int**", "p2", Some(addr(ident("p1")))),
        decl("int***", "p3", Some(addr(ident("p2")))),
        decl("int", "v", Some(deref(deref(deref(ident("p3")))))),
        expr_stmt(assign(deref(deref(deref(ident("p3")))), num(9))),
        expr_stmt(compound("+=", deref(deref(ident("p2"))), num(1))),
    ]);

    assert_eq!(last_set(&interp, "v"), Value::Int(5));
    assert_eq!(
        var_sets(&interp, "x"),
        vec![Value::Int(5), Value::Int(9), Value::Int(10)]
    );
    assert!(errors(&interp).is_empty());
}

#[test]
fn test_pointer_difference_and_comparison() {
    let interp = run_setup(vec![
        arr5(),
        decl("int*", "a", Some(addr(index(ident("arr"), num(1))))),
        decl("int*", "b", Some(addr(index(ident("arr"), num(4))))),
        decl("int", "diff", Some(binary("-", ident("b"), ident("a")))),
        decl("bool", "after", Some(binary(">", ident("b"), ident("a")))),
        decl("bool", "same", Some(binary("==", ident("a"), addr(index(ident("arr"), num(1)))))),
    ]);

    assert_eq!(last_set(&interp, "diff"), Value::Int(3));
    assert_eq!(last_set(&interp, "after"), Value::Bool(true));
    assert_eq!(last_set(&interp, "same"), Value::Bool(true));
}

#[test]
fn test_subscript_through_pointer() {
    let interp = run_setup(vec![
        arr5(),
        decl("int*", "p", Some(ident("arr"))),
        expr_stmt(assign(index(ident("p"), num(2)), num(7))),
        decl("int", "r", Some(index(ident("p"), num(2)))),
        expr_stmt(compound("+=", ident("p"), num(3))),
        decl("int", "s", Some(deref(ident("p")))),
        decl("int", "t", Some(index(ident("p"), num(-1)))),
    ]);

    assert_eq!(last_set(&interp, "arr[2]"), Value::Int(7));
    assert_eq!(last_set(&interp, "r"), Value::Int(7));
    assert_eq!(last_set(&interp, "s"), Value::Int(40));
    assert_eq!(last_set(&interp, "t"), Value::Int(7));
}

#[test]
fn test_pointer_past_the_end_is_out_of_bounds() {
    let interp = run_setup(vec![
        arr5(),
        decl("int*", "p", Some(ident("arr"))),
        decl("int", "v", Some(deref(binary("+", ident("p"), num(5))))),
    ]);
    assert_eq!(errors(&interp), vec![(ErrorKind::OutOfBounds, false)]);
    assert_eq!(last_set(&interp, "v"), Value::Int(0));
}

#[test]
fn test_array_argument_decays_to_pointer() {
    let fill = function(
        "fill",
        "void",
        &[("int[]", "data"), ("int", "n")],
        vec![for_loop(
            decl("int", "i", Some(num(0))),
            binary("<", ident("i"), ident("n")),
            postfix("++", ident("i")),
            expr_stmt(assign(
                index(ident("data"), ident("i")),
                binary("*", ident("i"), ident("i")),
            )),
        )],
    );
    let interp = run_setup_with(
        vec![fill],
        vec![
            decl("int[4]", "squares", None),
            expr_stmt(call("fill", vec![ident("squares"), num(4)])),
            decl("int", "last", Some(index(ident("squares"), num(3)))),
        ],
        InterpreterOptions::default(),
    );

    assert_eq!(last_set(&interp, "squares[2]"), Value::Int(4));
    assert_eq!(last_set(&interp, "last"), Value::Int(9));
    match &calls(&interp, "fill")[0].kind {
        ardtrace::CommandKind::FunctionCall { arguments, .. } => {
            assert!(matches!(&arguments[0], Value::Pointer(p) if p.target == "squares"));
            assert_eq!(arguments[1], Value::Int(4));
        }
        other => panic!("Expected function call, got {:?}", other),
    }
}

#[test]
fn test_swap_through_pointers() {
    let swap = function(
        "swap",
        "void",
        &[("int*", "a"), ("int*", "b")],
        vec![
            decl("int", "t", Some(deref(ident("a")))),
            expr_stmt(assign(deref(ident("a")), deref(ident("b")))),
            expr_stmt(assign(deref(ident("b")), ident("t"))),
        ],
    );
    let interp = run_setup_with(
        vec![swap],
        vec![
            decl("int", "x", Some(num(1))),
            decl("int", "y", Some(num(2))),
            expr_stmt(call("swap", vec![addr(ident("x")), addr(ident("y"))])),
        ],
        InterpreterOptions::default(),
    );

    assert_eq!(last_set(&interp, "x"), Value::Int(2));
    assert_eq!(last_set(&interp, "y"), Value::Int(1));
}

#[test]
fn test_char_array_holds_text() {
    let interp = run_setup(vec![
        decl("char[]", "name", Some(string("abc"))),
        expr_stmt(assign(index(ident("name"), num(0)), num(88))),
        decl("char", "c", Some(index(ident("name"), num(1)))),
        decl("char", "end", Some(index(ident("name"), num(3)))),
        decl("int", "size", Some(sizeof_expr(ident("name")))),
        decl("char*", "p", Some(ident("name"))),
        decl("char", "via", Some(deref(binary("+", ident("p"), num(2))))),
    ]);

    assert_eq!(
        var_sets(&interp, "name")[0],
        Value::Array(vec![Value::Int(97), Value::Int(98), Value::Int(99), Value::Int(0)])
    );
    assert_eq!(last_set(&interp, "name[0]"), Value::Int(88));
    assert_eq!(last_set(&interp, "c"), Value::Int(98));
    assert_eq!(last_set(&interp, "end"), Value::Int(0));
    assert_eq!(last_set(&interp, "size"), Value::Int(4));
    assert_eq!(last_set(&interp, "via"), Value::Int(99));
    assert!(errors(&interp).is_empty());
}

#[test]
fn test_null_pointer_checks() {
    let interp = run_setup(vec![
        decl("int*", "q", Some(ident("NULL"))),
        decl("bool", "is_null", Some(binary("==", ident("q"), num(0)))),
        decl("int", "x", Some(num(1))),
        expr_stmt(assign(ident("q"), addr(ident("x")))),
        decl("bool", "set", Some(binary("!=", ident("q"), ident("nullptr")))),
    ]);

    assert_eq!(last_set(&interp, "is_null"), Value::Bool(true));
    assert_eq!(last_set(&interp, "set"), Value::Bool(true));
}

#[test]
fn test_pointer_to_struct_array_element() {
    let interp = run_setup_with(
        vec![struct_def("Led", &[("int", "pin"), ("bool", "on")])],
        vec![
            decl(
                "struct Led[2]",
                "leds",
                Some(init_list(vec![
                    init_list(vec![num(3), ident("false")]),
                    init_list(vec![num(5), ident("false")]),
                ])),
            ),
            decl("struct Led*", "p", Some(ident("leds"))),
            expr_stmt(assign(arrow(binary("+", ident("p"), num(1)), "on"), ident("true"))),
            decl("int", "pin", Some(arrow(ident("p"), "pin"))),
        ],
        InterpreterOptions::default(),
    );

    assert_eq!(last_set(&interp, "leds[1].on"), Value::Bool(true));
    assert_eq!(last_set(&interp, "pin"), Value::Int(3));
    assert!(errors(&interp).is_empty());
}

#[test]
fn test_call_through_function_reference() {
    let blink = function(
        "blink",
        "void",
        &[],
        vec![expr_stmt(call("digitalWrite", vec![num(13), ident("HIGH")]))],
    );
    let interp = run_setup_with(
        vec![blink],
        vec![
            decl("auto", "action", Some(ident("blink"))),
            expr_stmt(call("action", vec![])),
        ],
        InterpreterOptions::default(),
    );

    assert_eq!(last_set(&interp, "action"), Value::Function("blink".to_string()));
    assert_eq!(calls(&interp, "blink").len(), 1);
    assert_eq!(calls(&interp, "digitalWrite").len(), 1);
}

#[test]
fn test_char_array_element_writes_are_exact() {
    let interp = run_setup(vec![
        decl("char[]", "s", Some(string("ab"))),
        expr_stmt(assign(index(ident("s"), num(0)), num(200))),
        decl("int", "a", Some(index(ident("s"), num(0)))),
        decl("int", "b", Some(index(ident("s"), num(1)))),
        decl("int", "size", Some(sizeof_expr(ident("s")))),
        decl("byte[4]", "raw", Some(string("ab"))),
        expr_stmt(assign(index(ident("raw"), num(1)), num(255))),
    ]);

    assert_eq!(last_set(&interp, "s[0]"), Value::Int(-56));
    assert_eq!(last_set(&interp, "a"), Value::Int(-56));
    assert_eq!(last_set(&interp, "b"), Value::Int(98));
    assert_eq!(last_set(&interp, "size"), Value::Int(3));
    assert_eq!(
        var_sets(&interp, "raw")[0],
        Value::Array(vec![Value::UInt(97), Value::UInt(98), Value::UInt(0), Value::UInt(0)])
    );
    assert_eq!(last_set(&interp, "raw[1]"), Value::UInt(255));
    assert!(errors(&interp).is_empty());
}

#[test]
fn test_char_array_reads_as_text() {
    let interp = run_setup(vec![
        decl("char[8]", "msg", Some(string("hi"))),
        expr_stmt(method_call("Serial", "println", vec![ident("msg")])),
        decl("char*", "tail", Some(addr(index(ident("msg"), num(1))))),
        expr_stmt(method_call("Serial", "print", vec![ident("tail")])),
        decl("String", "label", Some(binary("+", string("say "), ident("msg")))),
        decl("String", "copy", Some(ident("msg"))),
    ]);

    let printed: Vec<&str> = interp
        .commands()
        .iter()
        .filter(|c| c.message.starts_with("Serial."))
        .map(|c| c.message.as_str())
        .collect();
    assert_eq!(printed, vec!["Serial.println(hi)", "Serial.print(i)"]);
    assert_eq!(last_set(&interp, "label"), Value::Str("say hi".to_string()));
    assert_eq!(last_set(&interp, "copy"), Value::Str("hi".to_string()));
    assert!(errors(&interp).is_empty());
}

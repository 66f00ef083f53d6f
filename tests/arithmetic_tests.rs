// Arithmetic, conversion and operator tests

mod common;

use ardtrace::interpreter::ErrorKind;
use ardtrace::memory::value::Value;
use ardtrace::InterpreterOptions;
use common::*;

#[test]
fn test_narrow_unsigned_types_wrap() {
    let interp = run_setup(vec![
        decl("byte", "b", Some(num(255))),
        expr_stmt(postfix("++", ident("b"))),
        expr_stmt(assign(ident("b"), binary("-", ident("b"), num(1)))),
        decl("uint16_t", "w", Some(num(65535))),
        expr_stmt(compound("+=", ident("w"), num(1))),
        decl("unsigned long", "m", Some(num(0))),
        expr_stmt(postfix("--", ident("m"))),
    ]);

    assert_eq!(
        var_sets(&interp, "b"),
        vec![Value::UInt(255), Value::UInt(0), Value::UInt(255)]
    );
    assert_eq!(var_sets(&interp, "w"), vec![Value::UInt(65535), Value::UInt(0)]);
    assert_eq!(last_set(&interp, "m"), Value::UInt(u32::MAX));
}

#[test]
fn test_signed_types_wrap() {
    let interp = run_setup(vec![
        decl("signed char", "c", Some(num(127))),
        expr_stmt(postfix("++", ident("c"))),
        decl("int", "i", Some(num(2147483647))),
        expr_stmt(unary("++", ident("i"))),
        decl("int16_t", "s", Some(num(40000))),
    ]);

    assert_eq!(last_set(&interp, "c"), Value::Int(-128));
    assert_eq!(last_set(&interp, "i"), Value::Int(i32::MIN));
    assert_eq!(last_set(&interp, "s"), Value::Int(-25536));
}

#[test]
fn test_comma_yields_last_value() {
    let interp = run_setup(vec![
        decl("int", "x", Some(comma(vec![num(1), num(2), num(3)]))),
        decl(
            "int",
            "y",
            Some(comma(vec![
                postfix("++", ident("x")),
                binary("+", ident("x"), num(10)),
            ])),
        ),
    ]);

    assert_eq!(var_sets(&interp, "x"), vec![Value::Int(3), Value::Int(4)]);
    assert_eq!(last_set(&interp, "y"), Value::Int(14));
}

#[test]
fn test_pre_and_post_increment() {
    let interp = run_setup(vec![
        decl("int", "a", Some(num(5))),
        decl("int", "b", Some(postfix("++", ident("a")))),
        decl("int", "c", Some(unary("++", ident("a")))),
        decl("int", "d", Some(postfix("--", ident("a")))),
        decl("int", "e", Some(unary("--", ident("a")))),
    ]);

    assert_eq!(last_set(&interp, "b"), Value::Int(5));
    assert_eq!(last_set(&interp, "c"), Value::Int(7));
    assert_eq!(last_set(&interp, "d"), Value::Int(7));
    assert_eq!(last_set(&interp, "e"), Value::Int(5));
    assert_eq!(
        var_sets(&interp, "a"),
        vec![
            Value::Int(5),
            Value::Int(6),
            Value::Int(7),
            Value::Int(6),
            Value::Int(5),
        ]
    );
}

#[test]
fn test_compound_assignment_operators() {
    let interp = run_setup(vec![
        decl("int", "x", Some(num(10))),
        expr_stmt(compound("-=", ident("x"), num(3))),
        expr_stmt(compound("*=", ident("x"), num(4))),
        expr_stmt(compound("/=", ident("x"), num(5))),
        expr_stmt(compound("%=", ident("x"), num(3))),
        expr_stmt(compound("<<=", ident("x"), num(3))),
        expr_stmt(compound("|=", ident("x"), num(1))),
        expr_stmt(compound("^=", ident("x"), num(3))),
        expr_stmt(compound(">>=", ident("x"), num(1))),
    ]);

    let expected: Vec<Value> = [10, 7, 28, 5, 2, 16, 17, 18, 9]
        .into_iter()
        .map(Value::Int)
        .collect();
    assert_eq!(var_sets(&interp, "x"), expected);
}

#[test]
fn test_integer_division_truncates_toward_zero() {
    let interp = run_setup(vec![
        decl("int", "q", Some(binary("/", num(-7), num(2)))),
        decl("int", "r", Some(binary("%", num(-7), num(2)))),
        decl("int", "z", Some(binary("%", num(5), num(0)))),
    ]);

    assert_eq!(last_set(&interp, "q"), Value::Int(-3));
    assert_eq!(last_set(&interp, "r"), Value::Int(-1));
    assert_eq!(last_set(&interp, "z"), Value::Int(0));
    assert_eq!(errors(&interp), vec![(ErrorKind::DivisionByZero, false)]);
}

#[test]
fn test_float_promotion() {
    let interp = run_setup(vec![
        decl("float", "f", Some(binary("/", num(7), num(2)))),
        decl("float", "g", Some(binary("/", num(7), float(2.0)))),
        decl("int", "h", Some(float(7.9))),
        decl("double", "k", Some(binary("*", float(1.5), num(4)))),
        decl("float", "z", Some(binary("/", float(1.0), float(0.0)))),
    ]);

    assert_eq!(last_set(&interp, "f"), Value::Float(3.0));
    assert_eq!(last_set(&interp, "g"), Value::Float(3.5));
    assert_eq!(last_set(&interp, "h"), Value::Int(7));
    assert_eq!(last_set(&interp, "k"), Value::Float(6.0));
    assert_eq!(errors(&interp), vec![(ErrorKind::DivisionByZero, false)]);
}

#[test]
fn test_comparisons_and_logic() {
    let interp = run_setup(vec![
        decl("bool", "lt", Some(binary("<", num(3), num(5)))),
        decl("int", "as_int", Some(binary("==", num(2), num(2)))),
        decl("unsigned int", "u", Some(num(1))),
        decl("bool", "mixed", Some(binary(">", ident("u"), num(-1)))),
        decl("int", "touched", Some(num(0))),
        decl(
            "bool",
            "short_and",
            Some(binary("&&", num(0), assign(ident("touched"), num(1)))),
        ),
        decl(
            "bool",
            "short_or",
            Some(binary("||", num(1), assign(ident("touched"), num(2)))),
        ),
        decl("int", "not", Some(unary("!", num(5)))),
        decl("int", "bits", Some(binary("&", binary("|", num(240), num(15)), num(60)))),
        decl("int", "inverted", Some(unary("~", num(0)))),
    ]);

    assert_eq!(last_set(&interp, "lt"), Value::Bool(true));
    assert_eq!(last_set(&interp, "as_int"), Value::Int(1));
    // -1 converts to the largest unsigned value
    assert_eq!(last_set(&interp, "mixed"), Value::Bool(false));
    assert_eq!(var_sets(&interp, "touched"), vec![Value::Int(0)]);
    assert_eq!(last_set(&interp, "short_and"), Value::Bool(false));
    assert_eq!(last_set(&interp, "short_or"), Value::Bool(true));
    assert_eq!(last_set(&interp, "not"), Value::Int(0));
    assert_eq!(last_set(&interp, "bits"), Value::Int(60));
    assert_eq!(last_set(&interp, "inverted"), Value::Int(-1));
}

#[test]
fn test_string_concatenation() {
    let interp = run_setup(vec![
        decl("String", "s", Some(string("Temp: "))),
        expr_stmt(assign(ident("s"), binary("+", ident("s"), num(25)))),
        expr_stmt(compound("+=", ident("s"), string("C"))),
        decl("bool", "same", Some(binary("==", string("abc"), string("abc")))),
    ]);

    assert_eq!(
        var_sets(&interp, "s"),
        vec![
            Value::Str("Temp: ".to_string()),
            Value::Str("Temp: 25".to_string()),
            Value::Str("Temp: 25C".to_string()),
        ]
    );
    assert_eq!(last_set(&interp, "same"), Value::Bool(true));
}

#[test]
fn test_string_subtraction_is_a_type_error() {
    let interp = run_setup(vec![decl(
        "int",
        "bad",
        Some(binary("-", string("abc"), num(1))),
    )]);
    assert_eq!(errors(&interp), vec![(ErrorKind::TypeMismatch, false)]);
    assert_eq!(last_set(&interp, "bad"), Value::Int(0));
}

#[test]
fn test_casts() {
    let interp = run_setup(vec![
        decl("int", "n", Some(cast("int", float(3.7)))),
        decl("int", "b", Some(cast("byte", num(300)))),
        decl("float", "q", Some(binary("/", cast("float", num(5)), num(2)))),
        decl("long", "t", Some(cast("char", num(200)))),
    ]);

    assert_eq!(last_set(&interp, "n"), Value::Int(3));
    assert_eq!(last_set(&interp, "b"), Value::Int(44));
    assert_eq!(last_set(&interp, "q"), Value::Float(2.5));
    assert_eq!(last_set(&interp, "t"), Value::Int(-56));
}

#[test]
fn test_sizeof() {
    let interp = run_setup_with(
        vec![struct_def("Reading", &[("int", "value"), ("byte", "pin")])],
        vec![
            decl("int", "a", Some(sizeof_type("int"))),
            decl("int", "b", Some(sizeof_type("double"))),
            decl("int", "c", Some(sizeof_type("char*"))),
            decl("int", "d", Some(sizeof_type("struct Reading"))),
            decl("long[10]", "arr", None),
            decl("int", "e", Some(sizeof_expr(ident("arr")))),
            decl("int", "f", Some(sizeof_expr(num(1)))),
            decl("int", "g", Some(sizeof_expr(string("abc")))),
        ],
        InterpreterOptions::default(),
    );

    assert_eq!(last_set(&interp, "a"), Value::Int(4));
    assert_eq!(last_set(&interp, "b"), Value::Int(8));
    assert_eq!(last_set(&interp, "c"), Value::Int(4));
    assert_eq!(last_set(&interp, "d"), Value::Int(5));
    assert_eq!(last_set(&interp, "e"), Value::Int(40));
    assert_eq!(last_set(&interp, "f"), Value::Int(4));
    assert_eq!(last_set(&interp, "g"), Value::Int(4));
}

#[test]
fn test_void_operand_is_a_type_error() {
    let helper = function("nothing", "void", &[], vec![]);
    let interp = run_setup_with(
        vec![helper],
        vec![decl(
            "int",
            "x",
            Some(binary("+", call("nothing", vec![]), num(1))),
        )],
        InterpreterOptions::default(),
    );
    assert_eq!(errors(&interp), vec![(ErrorKind::TypeMismatch, false)]);
}

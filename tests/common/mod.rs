// Shared helpers for building sketch trees and inspecting command streams

#![allow(dead_code)]

use ardtrace::command::{Command, CommandKind};
use ardtrace::interpreter::ErrorKind;
use ardtrace::memory::value::Value;
use ardtrace::{Interpreter, InterpreterOptions, RawNode};

// === Expressions ===

pub fn ident(name: &str) -> RawNode {
    RawNode::new("Identifier").with_value(name)
}

pub fn num(n: i64) -> RawNode {
    RawNode::new("Number").with_value(n)
}

pub fn float(f: f64) -> RawNode {
    RawNode::new("Number").with_value(f).with_type("float")
}

pub fn string(s: &str) -> RawNode {
    RawNode::new("StringLiteral").with_value(s)
}

pub fn binary(op: &str, left: RawNode, right: RawNode) -> RawNode {
    RawNode::new("BinaryOp")
        .with_value(op)
        .with_children([left, right])
}

pub fn unary(op: &str, operand: RawNode) -> RawNode {
    RawNode::new("UnaryOp").with_value(op).with_child(operand)
}

pub fn postfix(op: &str, operand: RawNode) -> RawNode {
    RawNode::new("Postfix").with_value(op).with_child(operand)
}

pub fn deref(operand: RawNode) -> RawNode {
    unary("*", operand)
}

pub fn addr(operand: RawNode) -> RawNode {
    unary("&", operand)
}

pub fn assign(lhs: RawNode, rhs: RawNode) -> RawNode {
    RawNode::new("Assignment")
        .with_value("=")
        .with_children([lhs, rhs])
}

pub fn compound(op: &str, lhs: RawNode, rhs: RawNode) -> RawNode {
    RawNode::new("Assignment")
        .with_value(op)
        .with_children([lhs, rhs])
}

pub fn comma(exprs: Vec<RawNode>) -> RawNode {
    RawNode::new("CommaExpression").with_children(exprs)
}

pub fn call(name: &str, args: Vec<RawNode>) -> RawNode {
    RawNode::new("FuncCall").with_value(name).with_children(args)
}

/// `object.method(args)`, e.g. `Serial.println(x)`
pub fn method_call(object: &str, method: &str, args: Vec<RawNode>) -> RawNode {
    let callee = member(ident(object), method);
    RawNode::new("FuncCall")
        .with_child(callee)
        .with_children(args)
}

pub fn index(array: RawNode, idx: RawNode) -> RawNode {
    RawNode::new("ArrayAccess").with_children([array, idx])
}

pub fn member(object: RawNode, field: &str) -> RawNode {
    RawNode::new("MemberAccess")
        .with_value(field)
        .with_child(object)
}

pub fn arrow(object: RawNode, field: &str) -> RawNode {
    RawNode::new("PointerMemberAccess")
        .with_value(field)
        .with_child(object)
}

pub fn init_list(items: Vec<RawNode>) -> RawNode {
    RawNode::new("InitializerList").with_children(items)
}

pub fn designated(field: &str, value: RawNode) -> RawNode {
    RawNode::new("DesignatedInit")
        .with_value(field)
        .with_child(value)
}

pub fn cast(ty: &str, expr: RawNode) -> RawNode {
    RawNode::new("Cast").with_type(ty).with_child(expr)
}

pub fn sizeof_type(ty: &str) -> RawNode {
    RawNode::new("SizeofType").with_type(ty)
}

pub fn sizeof_expr(expr: RawNode) -> RawNode {
    RawNode::new("SizeofExpr").with_child(expr)
}

// === Statements ===

pub fn expr_stmt(expr: RawNode) -> RawNode {
    RawNode::new("ExpressionStatement").with_child(expr)
}

/// `ty name = init;`
pub fn decl(ty: &str, name: &str, init: Option<RawNode>) -> RawNode {
    let node = RawNode::new("VarDecl").with_type(ty).with_value(name);
    match init {
        Some(init) => node.with_child(init),
        None => node,
    }
}

/// One declarator of a multi-name declaration; `suffix` is e.g. `*` or `[3]`
pub fn declarator(name: &str, suffix: &str, init: Option<RawNode>) -> RawNode {
    let node = RawNode::new("Declarator")
        .with_value(name)
        .with_type(suffix);
    match init {
        Some(init) => node.with_child(init),
        None => node,
    }
}

pub fn decl_many(ty: &str, declarators: Vec<RawNode>) -> RawNode {
    RawNode::new("VarDecl")
        .with_type(ty)
        .with_children(declarators)
}

pub fn block(stmts: Vec<RawNode>) -> RawNode {
    RawNode::new("CompoundStatement").with_children(stmts)
}

pub fn if_stmt(cond: RawNode, then: RawNode, otherwise: Option<RawNode>) -> RawNode {
    let node = RawNode::new("IfStatement").with_children([cond, then]);
    match otherwise {
        Some(e) => node.with_child(e),
        None => node,
    }
}

pub fn while_loop(cond: RawNode, body: RawNode) -> RawNode {
    RawNode::new("WhileStatement").with_children([cond, body])
}

pub fn do_while(body: RawNode, cond: RawNode) -> RawNode {
    RawNode::new("DoWhileStatement").with_children([body, cond])
}

pub fn empty() -> RawNode {
    RawNode::new("Empty")
}

pub fn for_loop(init: RawNode, cond: RawNode, update: RawNode, body: RawNode) -> RawNode {
    RawNode::new("ForStatement").with_children([init, cond, update, body])
}

pub fn switch(disc: RawNode, cases: Vec<RawNode>) -> RawNode {
    RawNode::new("SwitchStatement")
        .with_child(disc)
        .with_children(cases)
}

pub fn case(label: RawNode, stmts: Vec<RawNode>) -> RawNode {
    RawNode::new("CaseStatement")
        .with_child(label)
        .with_children(stmts)
}

pub fn default_case(stmts: Vec<RawNode>) -> RawNode {
    RawNode::new("DefaultCase").with_children(stmts)
}

pub fn ret(expr: Option<RawNode>) -> RawNode {
    let node = RawNode::new("ReturnStatement");
    match expr {
        Some(e) => node.with_child(e),
        None => node,
    }
}

pub fn brk() -> RawNode {
    RawNode::new("BreakStatement")
}

pub fn cont() -> RawNode {
    RawNode::new("ContinueStatement")
}

// === Declarations ===

pub fn function(name: &str, return_type: &str, params: &[(&str, &str)], body: Vec<RawNode>) -> RawNode {
    let params = params
        .iter()
        .map(|(ty, name)| RawNode::new("Param").with_value(*name).with_type(*ty));
    RawNode::new("FuncDef")
        .with_value(name)
        .with_type(return_type)
        .with_children(params)
        .with_child(block(body))
}

pub fn struct_def(name: &str, fields: &[(&str, &str)]) -> RawNode {
    RawNode::new("StructDef").with_value(name).with_children(
        fields
            .iter()
            .map(|(ty, name)| RawNode::new("Field").with_value(*name).with_type(*ty)),
    )
}

/// `typedef struct { .. } alias;`
pub fn typedef_struct(alias: &str, fields: &[(&str, &str)]) -> RawNode {
    let anonymous = RawNode::new("StructDef").with_children(
        fields
            .iter()
            .map(|(ty, name)| RawNode::new("Field").with_value(*name).with_type(*ty)),
    );
    RawNode::new("Typedef").with_value(alias).with_child(anonymous)
}

pub fn program(nodes: Vec<RawNode>) -> RawNode {
    RawNode::new("Program").with_children(nodes)
}

// === Running ===

pub fn run_with(root: &RawNode, options: InterpreterOptions) -> Interpreter {
    ardtrace::logging::init_tracing();
    let mut interp = Interpreter::from_tree(root, options);
    interp.run();
    interp
}

/// Run `body` as the whole of `setup()`, with no `loop()`
pub fn run_setup(body: Vec<RawNode>) -> Interpreter {
    run_setup_with(Vec::new(), body, InterpreterOptions::default())
}

/// Run `body` as `setup()` after the given top-level declarations
pub fn run_setup_with(globals: Vec<RawNode>, body: Vec<RawNode>, options: InterpreterOptions) -> Interpreter {
    let mut nodes = globals;
    nodes.push(function("setup", "void", &[], body));
    run_with(&program(nodes), options)
}

// === Inspecting ===

pub fn types(interp: &Interpreter) -> Vec<&'static str> {
    interp.commands().iter().map(|c| c.kind.type_name()).collect()
}

/// Every value recorded for `variable`, in order
pub fn var_sets(interp: &Interpreter, variable: &str) -> Vec<Value> {
    interp
        .commands()
        .iter()
        .filter_map(|c| match &c.kind {
            CommandKind::VarSet { variable: v, value } if v == variable => Some(value.clone()),
            _ => None,
        })
        .collect()
}

/// Last value recorded for `variable`
pub fn last_set(interp: &Interpreter, variable: &str) -> Value {
    var_sets(interp, variable)
        .pop()
        .unwrap_or_else(|| panic!("no VAR_SET for {}", variable))
}

pub fn errors(interp: &Interpreter) -> Vec<(ErrorKind, bool)> {
    interp
        .commands()
        .iter()
        .filter_map(|c| match c.kind {
            CommandKind::Error { error_type, fatal } => Some((error_type, fatal)),
            _ => None,
        })
        .collect()
}

pub fn calls<'a>(interp: &'a Interpreter, function: &'a str) -> Vec<&'a Command> {
    interp
        .commands()
        .iter()
        .filter(|c| matches!(&c.kind, CommandKind::FunctionCall { function: f, .. } if f == function))
        .collect()
}

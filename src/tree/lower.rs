//! Lowering from [`RawNode`] trees to the typed AST.
//!
//! # Node layouts
//!
//! ```text
//! Program          children: top-level declarations
//! FuncDef          value: name   type: return type   children: Param* Block
//! Param            value: name   type: declared type
//! VarDecl          type: base    children: Declarator*
//! Declarator       value: name   type: suffix ("*", "[4]")   children: init?
//! StructDef        value: name   children: Field*
//! Typedef          value: alias  type: target   children: StructDef?
//! If               [cond, then, else?]      While   [cond, body]
//! DoWhile          [body, cond]             For     [init, cond, update, body]
//! Switch           [discriminant, Case*]    Case    [label, stmt*]   Default [stmt*]
//! Binary / Assignment / Unary / Postfix     value: operator symbol
//! FuncCall         [callee, arg*]  (or value: name, children: arg*)
//! MemberAccess / PointerMemberAccess        value: field   children: [object]
//! ```
//!
//! Kind tags are matched case-insensitively, ignoring `_`, `-` and a trailing
//! `Node`, so `if_statement`, `IfStatement` and `IfStatementNode` are the same
//! kind. `Empty` children stand in for absent `for` clauses.

use super::ast::*;
use super::raw::{RawNode, TreeError};
use super::types::{BaseType, TypeSpec};
use std::rc::Rc;

/// Closed set of node kinds understood by the lowering pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Program,
    FuncDef,
    FuncDecl,
    Param,
    VarDecl,
    Declarator,
    StructDef,
    Field,
    Typedef,
    Block,
    ExpressionStatement,
    If,
    While,
    DoWhile,
    For,
    Switch,
    Case,
    Default,
    Return,
    Break,
    Continue,
    Empty,
    Number,
    String,
    Char,
    Bool,
    Identifier,
    Binary,
    Unary,
    Postfix,
    Assignment,
    Ternary,
    Comma,
    FuncCall,
    ArrayAccess,
    MemberAccess,
    PointerMemberAccess,
    Cast,
    Sizeof,
    SizeofType,
    SizeofExpr,
    InitializerList,
    DesignatedInit,
}

impl NodeKind {
    pub fn parse(kind: &str) -> Option<NodeKind> {
        let mut key: String = kind
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        if key.len() > 4 && key.ends_with("node") {
            key.truncate(key.len() - 4);
        }

        let kind = match key.as_str() {
            "program" | "translationunit" => NodeKind::Program,
            "funcdef" | "functiondef" | "functiondefinition" | "function" => NodeKind::FuncDef,
            "funcdecl" | "functiondeclaration" | "prototype" => NodeKind::FuncDecl,
            "param" | "parameter" => NodeKind::Param,
            "vardecl" | "variabledeclaration" | "declaration" => NodeKind::VarDecl,
            "declarator" | "variabledeclarator" => NodeKind::Declarator,
            "structdef" | "structdefinition" | "structdeclaration" | "struct" => {
                NodeKind::StructDef
            }
            "field" | "structfield" | "structmember" => NodeKind::Field,
            "typedef" | "typedefdeclaration" => NodeKind::Typedef,
            "block" | "compoundstatement" | "compound" => NodeKind::Block,
            "expressionstatement" | "exprstmt" | "expressionstmt" => {
                NodeKind::ExpressionStatement
            }
            "if" | "ifstatement" => NodeKind::If,
            "while" | "whilestatement" => NodeKind::While,
            "dowhile" | "dowhilestatement" => NodeKind::DoWhile,
            "for" | "forstatement" => NodeKind::For,
            "switch" | "switchstatement" => NodeKind::Switch,
            "case" | "casestatement" => NodeKind::Case,
            "default" | "defaultstatement" | "defaultcase" => NodeKind::Default,
            "return" | "returnstatement" => NodeKind::Return,
            "break" | "breakstatement" => NodeKind::Break,
            "continue" | "continuestatement" => NodeKind::Continue,
            "empty" | "emptystatement" | "noop" => NodeKind::Empty,
            "number" | "numberliteral" | "numericliteral" | "integerliteral" | "floatliteral" => {
                NodeKind::Number
            }
            "string" | "stringliteral" => NodeKind::String,
            "char" | "charliteral" | "characterliteral" => NodeKind::Char,
            "bool" | "boolean" | "boolliteral" | "booleanliteral" => NodeKind::Bool,
            "identifier" | "ident" | "name" => NodeKind::Identifier,
            "binary" | "binaryop" | "binaryexpression" => NodeKind::Binary,
            "unary" | "unaryop" | "unaryexpression" | "prefix" | "prefixexpression" => {
                NodeKind::Unary
            }
            "postfix" | "postfixexpression" | "postfixop" => NodeKind::Postfix,
            "assignment" | "assign" | "assignmentexpression" => NodeKind::Assignment,
            "ternary" | "ternaryexpression" | "conditional" | "conditionalexpression" => {
                NodeKind::Ternary
            }
            "comma" | "commaexpression" | "sequence" => NodeKind::Comma,
            "funccall" | "call" | "functioncall" | "callexpression" => NodeKind::FuncCall,
            "arrayaccess" | "index" | "subscript" => NodeKind::ArrayAccess,
            "memberaccess" | "dot" => NodeKind::MemberAccess,
            "pointermemberaccess" | "arrow" | "arrowaccess" => NodeKind::PointerMemberAccess,
            "cast" | "castexpression" => NodeKind::Cast,
            "sizeof" | "sizeofexpression" => NodeKind::Sizeof,
            "sizeoftype" => NodeKind::SizeofType,
            "sizeofexpr" => NodeKind::SizeofExpr,
            "initializerlist" | "initlist" | "arrayinitializer" | "bracedinit" => {
                NodeKind::InitializerList
            }
            "designatedinit" | "designatedinitializer" => NodeKind::DesignatedInit,
            _ => return None,
        };
        Some(kind)
    }

    fn is_statement(self) -> bool {
        matches!(
            self,
            NodeKind::VarDecl
                | NodeKind::Block
                | NodeKind::ExpressionStatement
                | NodeKind::If
                | NodeKind::While
                | NodeKind::DoWhile
                | NodeKind::For
                | NodeKind::Switch
                | NodeKind::Return
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Empty
        )
    }
}

/// Lower a whole program tree
pub fn lower_program(root: &RawNode) -> Result<Program, TreeError> {
    Lowerer::new().program(root)
}

/// Lowering state: hands out declaration ids in tree order
pub struct Lowerer {
    next_id: NodeId,
}

impl Default for Lowerer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lowerer {
    pub fn new() -> Self {
        Lowerer { next_id: 0 }
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn program(&mut self, root: &RawNode) -> Result<Program, TreeError> {
        let top: &[RawNode] = match kind_of(root)? {
            NodeKind::Program => &root.children,
            _ => std::slice::from_ref(root),
        };

        let mut program = Program::new();
        for node in top {
            self.top_level(node, &mut program.nodes)?;
        }
        Ok(program)
    }

    fn top_level(&mut self, raw: &RawNode, out: &mut Vec<AstNode>) -> Result<(), TreeError> {
        match kind_of(raw)? {
            NodeKind::FuncDef => out.push(self.function(raw)?),
            NodeKind::FuncDecl | NodeKind::Empty => {}
            NodeKind::StructDef => out.push(AstNode::StructDef(self.struct_def(raw, None)?)),
            NodeKind::Typedef => self.typedef(raw, out)?,
            NodeKind::VarDecl => out.push(self.var_decl(raw)?),
            NodeKind::ExpressionStatement | NodeKind::Block => {
                // Stray top-level statements are not executed
            }
            other => {
                return Err(TreeError::Misplaced {
                    expected: "a top-level declaration",
                    found: format!("{:?}", other),
                })
            }
        }
        Ok(())
    }

    fn function(&mut self, raw: &RawNode) -> Result<AstNode, TreeError> {
        let name = required_text(raw, "function name")?;
        let return_type = TypeSpec::parse(raw.declared_type.as_deref().unwrap_or("void"));

        let mut params = Vec::new();
        let mut body = Vec::new();
        for child in &raw.children {
            match kind_of(child)? {
                NodeKind::Param => {
                    let param_type =
                        TypeSpec::parse(child.declared_type.as_deref().unwrap_or("int"));
                    // `void f(void)` declares no parameters
                    if param_type.base == BaseType::Void && param_type.pointer_depth == 0 {
                        continue;
                    }
                    params.push(Param {
                        name: child.text().unwrap_or_default(),
                        param_type,
                    });
                }
                NodeKind::Block => body = self.statements(&child.children)?,
                _ => body.push(self.statement(child)?),
            }
        }

        Ok(AstNode::FunctionDef(Rc::new(FunctionDef {
            name,
            params,
            body,
            return_type,
        })))
    }

    fn struct_def(
        &mut self,
        raw: &RawNode,
        fallback_name: Option<&str>,
    ) -> Result<StructDef, TreeError> {
        let name = match (raw.text(), fallback_name) {
            (Some(name), _) if !name.is_empty() => name,
            (_, Some(name)) => name.to_string(),
            _ => {
                return Err(TreeError::MissingValue {
                    kind: raw.kind.clone(),
                    what: "struct name",
                })
            }
        };

        let mut fields = Vec::new();
        for child in &raw.children {
            match kind_of(child)? {
                NodeKind::Field => fields.push(Field {
                    name: required_text(child, "field name")?,
                    field_type: TypeSpec::parse(child.declared_type.as_deref().unwrap_or("int")),
                }),
                NodeKind::VarDecl => {
                    if let AstNode::VarDecl { declarators } = self.var_decl(child)? {
                        fields.extend(declarators.into_iter().map(|d| Field {
                            name: d.name,
                            field_type: d.var_type,
                        }));
                    }
                }
                other => {
                    return Err(TreeError::Misplaced {
                        expected: "a struct field",
                        found: format!("{:?}", other),
                    })
                }
            }
        }

        Ok(StructDef { name, fields })
    }

    fn typedef(&mut self, raw: &RawNode, out: &mut Vec<AstNode>) -> Result<(), TreeError> {
        let alias = required_text(raw, "typedef alias")?;

        let struct_child = raw
            .children
            .first()
            .filter(|c| NodeKind::parse(&c.kind) == Some(NodeKind::StructDef));

        let target = match struct_child {
            Some(child) => {
                let def = self.struct_def(child, Some(&alias))?;
                let target = TypeSpec::new(BaseType::Struct(def.name.clone()));
                out.push(AstNode::StructDef(def));
                target
            }
            _ => TypeSpec::parse(raw.declared_type.as_deref().ok_or_else(|| {
                TreeError::MissingValue {
                    kind: raw.kind.clone(),
                    what: "target type",
                }
            })?),
        };

        out.push(AstNode::Typedef { alias, target });
        Ok(())
    }

    fn var_decl(&mut self, raw: &RawNode) -> Result<AstNode, TreeError> {
        let base = raw.declared_type.clone().unwrap_or_else(|| "auto".to_string());

        let has_declarators = raw
            .children
            .iter()
            .any(|c| matches!(NodeKind::parse(&c.kind), Some(NodeKind::Declarator)));

        let mut declarators = Vec::new();
        if has_declarators {
            for child in &raw.children {
                if kind_of(child)? != NodeKind::Declarator {
                    return Err(TreeError::Misplaced {
                        expected: "a declarator",
                        found: child.kind.clone(),
                    });
                }
                let suffix = child.declared_type.as_deref().unwrap_or("");
                declarators.push(Declarator {
                    id: self.fresh_id(),
                    name: required_text(child, "variable name")?,
                    var_type: TypeSpec::parse(&format!("{} {}", base, suffix)),
                    init: self.optional_expr(child.children.first())?,
                });
            }
        } else {
            // Single-declarator shorthand: the declaration itself names the variable
            if raw.children.len() > 1 {
                return Err(arity(raw, "at most one initializer"));
            }
            declarators.push(Declarator {
                id: self.fresh_id(),
                name: required_text(raw, "variable name")?,
                var_type: TypeSpec::parse(&base),
                init: self.optional_expr(raw.children.first())?,
            });
        }

        Ok(AstNode::VarDecl { declarators })
    }

    fn statements(&mut self, raws: &[RawNode]) -> Result<Vec<AstNode>, TreeError> {
        raws.iter().map(|raw| self.statement(raw)).collect()
    }

    /// Lower a node in statement position. Bare expressions are wrapped in
    /// an expression statement.
    pub fn statement(&mut self, raw: &RawNode) -> Result<AstNode, TreeError> {
        let kind = kind_of(raw)?;
        if !kind.is_statement() {
            return Ok(AstNode::ExpressionStatement(Box::new(self.expr(raw)?)));
        }

        let node = match kind {
            NodeKind::VarDecl => self.var_decl(raw)?,
            NodeKind::Block => AstNode::Block(self.statements(&raw.children)?),
            NodeKind::ExpressionStatement => match raw.children.as_slice() {
                [] => AstNode::Empty,
                [expr] => AstNode::ExpressionStatement(Box::new(self.expr(expr)?)),
                _ => return Err(arity(raw, "one expression")),
            },
            NodeKind::If => match raw.children.as_slice() {
                [c, t] => AstNode::If {
                    condition: Box::new(self.expr(c)?),
                    then_branch: Box::new(self.statement(t)?),
                    else_branch: None,
                },
                [c, t, e] => AstNode::If {
                    condition: Box::new(self.expr(c)?),
                    then_branch: Box::new(self.statement(t)?),
                    else_branch: self.optional_statement(e)?.map(Box::new),
                },
                _ => return Err(arity(raw, "2 or 3")),
            },
            NodeKind::While => match raw.children.as_slice() {
                [c, b] => AstNode::While {
                    condition: Box::new(self.expr(c)?),
                    body: Box::new(self.statement(b)?),
                },
                _ => return Err(arity(raw, "2")),
            },
            NodeKind::DoWhile => match raw.children.as_slice() {
                [b, c] => AstNode::DoWhile {
                    body: Box::new(self.statement(b)?),
                    condition: Box::new(self.expr(c)?),
                },
                _ => return Err(arity(raw, "2")),
            },
            NodeKind::For => match raw.children.as_slice() {
                [init, cond, update, body] => AstNode::For {
                    init: self.optional_statement(init)?.map(Box::new),
                    condition: self.optional_expr(Some(cond))?.map(Box::new),
                    increment: self.optional_expr(Some(update))?.map(Box::new),
                    body: Box::new(self.statement(body)?),
                },
                _ => return Err(arity(raw, "4")),
            },
            NodeKind::Switch => self.switch(raw)?,
            NodeKind::Return => match raw.children.as_slice() {
                [] => AstNode::Return(None),
                [e] => AstNode::Return(self.optional_expr(Some(e))?.map(Box::new)),
                _ => return Err(arity(raw, "at most one")),
            },
            NodeKind::Break => AstNode::Break,
            NodeKind::Continue => AstNode::Continue,
            NodeKind::Empty => AstNode::Empty,
            _ => unreachable!("is_statement covers every statement kind"),
        };
        Ok(node)
    }

    fn optional_statement(&mut self, raw: &RawNode) -> Result<Option<AstNode>, TreeError> {
        match self.statement(raw)? {
            AstNode::Empty => Ok(None),
            node => Ok(Some(node)),
        }
    }

    fn switch(&mut self, raw: &RawNode) -> Result<AstNode, TreeError> {
        let (disc, rest) = raw
            .children
            .split_first()
            .ok_or_else(|| arity(raw, "a discriminant"))?;

        let mut cases = Vec::new();
        for case in rest {
            match kind_of(case)? {
                NodeKind::Case => {
                    let (label, body) = case
                        .children
                        .split_first()
                        .ok_or_else(|| arity(case, "a label"))?;
                    cases.push(CaseNode::Case {
                        value: Box::new(self.expr(label)?),
                        statements: self.case_body(body)?,
                    });
                }
                NodeKind::Default => cases.push(CaseNode::Default {
                    statements: self.case_body(&case.children)?,
                }),
                other => {
                    return Err(TreeError::Misplaced {
                        expected: "a case label",
                        found: format!("{:?}", other),
                    })
                }
            }
        }

        Ok(AstNode::Switch {
            expr: Box::new(self.expr(disc)?),
            cases,
        })
    }

    /// Case bodies are sometimes wrapped in a single block; flatten it so the
    /// statements share the switch scope.
    fn case_body(&mut self, raws: &[RawNode]) -> Result<Vec<AstNode>, TreeError> {
        let mut out = Vec::new();
        for raw in raws {
            match self.statement(raw)? {
                AstNode::Block(inner) if raws.len() == 1 => out.extend(inner),
                node => out.push(node),
            }
        }
        Ok(out)
    }

    fn optional_expr(&mut self, raw: Option<&RawNode>) -> Result<Option<AstNode>, TreeError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        match kind_of(raw)? {
            NodeKind::Empty => Ok(None),
            NodeKind::ExpressionStatement => match raw.children.first() {
                Some(inner) => Ok(Some(self.expr(inner)?)),
                None => Ok(None),
            },
            _ => Ok(Some(self.expr(raw)?)),
        }
    }

    /// Lower a node in expression position
    pub fn expr(&mut self, raw: &RawNode) -> Result<AstNode, TreeError> {
        let kind = kind_of(raw)?;
        let node = match kind {
            NodeKind::Number => number_literal(raw)?,
            NodeKind::String => AstNode::StringLiteral(raw.text().unwrap_or_default()),
            NodeKind::Char => char_literal(raw)?,
            NodeKind::Bool => match raw.value.as_ref() {
                Some(serde_json::Value::Bool(b)) => AstNode::BoolLiteral(*b),
                _ => match raw.text().as_deref() {
                    Some("true") | Some("1") => AstNode::BoolLiteral(true),
                    Some("false") | Some("0") => AstNode::BoolLiteral(false),
                    _ => return Err(invalid(raw)),
                },
            },
            NodeKind::Identifier => AstNode::Variable(required_text(raw, "identifier name")?),
            NodeKind::Binary => {
                let [left, right] = two(raw)?;
                let symbol = required_text(raw, "operator")?;
                if symbol == "," {
                    AstNode::Comma(vec![self.expr(left)?, self.expr(right)?])
                } else {
                    AstNode::BinaryOp {
                        op: BinOp::from_symbol(&symbol).ok_or_else(|| invalid(raw))?,
                        left: Box::new(self.expr(left)?),
                        right: Box::new(self.expr(right)?),
                    }
                }
            }
            NodeKind::Unary | NodeKind::Postfix => {
                let operand = match raw.children.as_slice() {
                    [operand] => operand,
                    _ => return Err(arity(raw, "1")),
                };
                let symbol = required_text(raw, "operator")?;
                let postfix = kind == NodeKind::Postfix;
                let op = match (symbol.as_str(), postfix) {
                    ("++", false) => UnOp::PreInc,
                    ("--", false) => UnOp::PreDec,
                    ("++", true) => UnOp::PostInc,
                    ("--", true) => UnOp::PostDec,
                    ("-", false) => UnOp::Neg,
                    ("+", false) => UnOp::Plus,
                    ("!", false) => UnOp::Not,
                    ("~", false) => UnOp::BitNot,
                    ("*", false) => UnOp::Deref,
                    ("&", false) => UnOp::AddrOf,
                    _ => return Err(invalid(raw)),
                };
                AstNode::UnaryOp {
                    op,
                    operand: Box::new(self.expr(operand)?),
                }
            }
            NodeKind::Assignment => {
                let [lhs, rhs] = two(raw)?;
                let symbol = raw.text().unwrap_or_else(|| "=".to_string());
                let lhs = Box::new(self.expr(lhs)?);
                let rhs = Box::new(self.expr(rhs)?);
                if symbol == "=" {
                    AstNode::Assignment { lhs, rhs }
                } else {
                    let op = symbol
                        .strip_suffix('=')
                        .and_then(BinOp::from_symbol)
                        .ok_or_else(|| invalid(raw))?;
                    AstNode::CompoundAssignment { lhs, op, rhs }
                }
            }
            NodeKind::Ternary => match raw.children.as_slice() {
                [c, t, f] => AstNode::TernaryOp {
                    condition: Box::new(self.expr(c)?),
                    true_expr: Box::new(self.expr(t)?),
                    false_expr: Box::new(self.expr(f)?),
                },
                _ => return Err(arity(raw, "3")),
            },
            NodeKind::Comma => {
                if raw.children.is_empty() {
                    return Err(arity(raw, "at least one"));
                }
                AstNode::Comma(self.exprs(&raw.children)?)
            }
            NodeKind::FuncCall => match raw.text() {
                Some(name) => AstNode::FunctionCall {
                    callee: Box::new(AstNode::Variable(name)),
                    args: self.exprs(&raw.children)?,
                },
                None => {
                    let (callee, args) = raw
                        .children
                        .split_first()
                        .ok_or_else(|| arity(raw, "a callee"))?;
                    AstNode::FunctionCall {
                        callee: Box::new(self.expr(callee)?),
                        args: self.exprs(args)?,
                    }
                }
            },
            NodeKind::ArrayAccess => {
                let [array, index] = two(raw)?;
                AstNode::ArrayAccess {
                    array: Box::new(self.expr(array)?),
                    index: Box::new(self.expr(index)?),
                }
            }
            NodeKind::MemberAccess | NodeKind::PointerMemberAccess => {
                let object = match raw.children.as_slice() {
                    [object] => Box::new(self.expr(object)?),
                    _ => return Err(arity(raw, "1")),
                };
                let member = required_text(raw, "member name")?;
                if kind == NodeKind::MemberAccess {
                    AstNode::MemberAccess { object, member }
                } else {
                    AstNode::PointerMemberAccess { object, member }
                }
            }
            NodeKind::Cast => match raw.children.as_slice() {
                [expr] => AstNode::Cast {
                    target_type: TypeSpec::parse(required_type(raw)?),
                    expr: Box::new(self.expr(expr)?),
                },
                _ => return Err(arity(raw, "1")),
            },
            NodeKind::SizeofType => AstNode::SizeofType(TypeSpec::parse(required_type(raw)?)),
            NodeKind::SizeofExpr | NodeKind::Sizeof => match raw.children.as_slice() {
                [] if raw.declared_type.is_some() => {
                    AstNode::SizeofType(TypeSpec::parse(required_type(raw)?))
                }
                [expr] => AstNode::SizeofExpr(Box::new(self.expr(expr)?)),
                _ => return Err(arity(raw, "1")),
            },
            NodeKind::InitializerList => AstNode::InitializerList(self.exprs(&raw.children)?),
            NodeKind::DesignatedInit => match raw.children.as_slice() {
                [value] => AstNode::DesignatedInit {
                    field: required_text(raw, "field name")?
                        .trim_start_matches('.')
                        .to_string(),
                    value: Box::new(self.expr(value)?),
                },
                _ => return Err(arity(raw, "1")),
            },
            other => {
                return Err(TreeError::Misplaced {
                    expected: "an expression",
                    found: format!("{:?}", other),
                })
            }
        };
        Ok(node)
    }

    fn exprs(&mut self, raws: &[RawNode]) -> Result<Vec<AstNode>, TreeError> {
        raws.iter().map(|raw| self.expr(raw)).collect()
    }
}

fn kind_of(raw: &RawNode) -> Result<NodeKind, TreeError> {
    NodeKind::parse(&raw.kind).ok_or_else(|| TreeError::UnknownKind(raw.kind.clone()))
}

fn arity(raw: &RawNode, expected: &'static str) -> TreeError {
    TreeError::Arity {
        kind: raw.kind.clone(),
        expected,
        found: raw.children.len(),
    }
}

fn invalid(raw: &RawNode) -> TreeError {
    TreeError::InvalidValue {
        kind: raw.kind.clone(),
        value: raw
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default(),
    }
}

fn two(raw: &RawNode) -> Result<[&RawNode; 2], TreeError> {
    match raw.children.as_slice() {
        [a, b] => Ok([a, b]),
        _ => Err(arity(raw, "2")),
    }
}

fn required_text(raw: &RawNode, what: &'static str) -> Result<String, TreeError> {
    raw.text().ok_or_else(|| TreeError::MissingValue {
        kind: raw.kind.clone(),
        what,
    })
}

fn required_type(raw: &RawNode) -> Result<&str, TreeError> {
    raw.declared_type
        .as_deref()
        .ok_or_else(|| TreeError::MissingValue {
            kind: raw.kind.clone(),
            what: "type",
        })
}

fn number_literal(raw: &RawNode) -> Result<AstNode, TreeError> {
    let hint = raw.declared_type.as_deref().map(TypeSpec::parse);
    let wants_float = hint.as_ref().is_some_and(|t| t.base.is_float());
    let wants_unsigned = hint.as_ref().is_some_and(|t| t.base.is_unsigned());

    let node = match raw.value.as_ref() {
        Some(serde_json::Value::Number(n)) => {
            if let Some(i) = n.as_i64().filter(|_| !wants_float) {
                integer_node(i, wants_unsigned)
            } else if let Some(u) = n.as_u64().filter(|_| !wants_float) {
                AstNode::UIntLiteral(u as u32)
            } else {
                AstNode::FloatLiteral(n.as_f64().ok_or_else(|| invalid(raw))?)
            }
        }
        Some(serde_json::Value::String(text)) => {
            parse_numeric_text(text, wants_float, wants_unsigned).ok_or_else(|| invalid(raw))?
        }
        _ => {
            return Err(TreeError::MissingValue {
                kind: raw.kind.clone(),
                what: "numeric value",
            })
        }
    };
    Ok(node)
}

fn integer_node(i: i64, unsigned: bool) -> AstNode {
    if unsigned || (i > i32::MAX as i64 && i <= u32::MAX as i64) {
        AstNode::UIntLiteral(i as u32)
    } else {
        AstNode::IntLiteral(i as i32)
    }
}

/// Parse C numeric literal text: hex, binary, octal, suffixes, floats
fn parse_numeric_text(text: &str, wants_float: bool, wants_unsigned: bool) -> Option<AstNode> {
    let lower = text.trim().replace('\'', "").to_ascii_lowercase();
    let is_hex = lower.starts_with("0x");

    let looks_float =
        !is_hex && (lower.contains('.') || lower.contains('e') || lower.ends_with('f'));
    if wants_float || looks_float {
        let digits = lower.trim_end_matches(|c| c == 'f' || c == 'l');
        return digits.parse::<f64>().ok().map(AstNode::FloatLiteral);
    }

    let unsigned_suffix = lower.trim_end_matches('l').ends_with('u');
    let digits = lower.trim_end_matches(|c| c == 'u' || c == 'l');
    let value = if let Some(hex) = digits.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(integer_node(value, wants_unsigned || unsigned_suffix))
}

fn char_literal(raw: &RawNode) -> Result<AstNode, TreeError> {
    if let Some(serde_json::Value::Number(n)) = raw.value.as_ref() {
        return n
            .as_i64()
            .map(|c| AstNode::IntLiteral(c as i32))
            .ok_or_else(|| invalid(raw));
    }
    let text = required_text(raw, "character")?;
    let inner = text
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(&text);

    let code = match inner {
        "\\n" => '\n' as i32,
        "\\t" => '\t' as i32,
        "\\r" => '\r' as i32,
        "\\0" => 0,
        "\\\\" => '\\' as i32,
        "\\'" => '\'' as i32,
        "\\\"" => '"' as i32,
        _ => inner.chars().next().map(|c| c as i32).ok_or_else(|| invalid(raw))?,
    };
    Ok(AstNode::IntLiteral(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> RawNode {
        RawNode::new("Identifier").with_value(name)
    }

    fn num(n: i64) -> RawNode {
        RawNode::new("Number").with_value(n)
    }

    #[test]
    fn test_kind_normalization() {
        assert_eq!(NodeKind::parse("IfStatement"), Some(NodeKind::If));
        assert_eq!(NodeKind::parse("if_statement"), Some(NodeKind::If));
        assert_eq!(NodeKind::parse("IfStatementNode"), Some(NodeKind::If));
        assert_eq!(NodeKind::parse("FuncCallNode"), Some(NodeKind::FuncCall));
        assert_eq!(NodeKind::parse("Frobnicate"), None);
    }

    #[test]
    fn test_lower_shared_declaration_type() {
        let decl = RawNode::new("VarDecl").with_type("Point").with_children([
            RawNode::new("Declarator").with_value("a"),
            RawNode::new("Declarator").with_value("b").with_type("*"),
        ]);
        let node = Lowerer::new().statement(&decl).unwrap();
        match node {
            AstNode::VarDecl { declarators } => {
                assert_eq!(declarators.len(), 2);
                assert_eq!(
                    declarators[0].var_type.base,
                    BaseType::Named("Point".to_string())
                );
                assert_eq!(declarators[1].var_type.base, declarators[0].var_type.base);
                assert_eq!(declarators[1].var_type.pointer_depth, 1);
                assert_ne!(declarators[0].id, declarators[1].id);
            }
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_lower_compound_assignment_and_postfix() {
        let assign = RawNode::new("Assignment")
            .with_value("+=")
            .with_children([ident("x"), num(2)]);
        match Lowerer::new().expr(&assign).unwrap() {
            AstNode::CompoundAssignment { op, .. } => assert_eq!(op, BinOp::Add),
            other => panic!("Expected compound assignment, got {:?}", other),
        }

        let post = RawNode::new("Postfix").with_value("++").with_child(ident("i"));
        match Lowerer::new().expr(&post).unwrap() {
            AstNode::UnaryOp { op, .. } => assert_eq!(op, UnOp::PostInc),
            other => panic!("Expected postfix op, got {:?}", other),
        }
    }

    #[test]
    fn test_lower_for_with_empty_clauses() {
        let for_loop = RawNode::new("ForStatement").with_children([
            RawNode::new("Empty"),
            RawNode::new("Empty"),
            RawNode::new("Empty"),
            RawNode::new("Block"),
        ]);
        match Lowerer::new().statement(&for_loop).unwrap() {
            AstNode::For {
                init,
                condition,
                increment,
                ..
            } => {
                assert!(init.is_none());
                assert!(condition.is_none());
                assert!(increment.is_none());
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_number_literal_forms() {
        let hex = RawNode::new("Number").with_value("0xFF");
        assert_eq!(Lowerer::new().expr(&hex).unwrap(), AstNode::IntLiteral(255));

        let unsigned = RawNode::new("Number").with_value("4294967295");
        assert_eq!(
            Lowerer::new().expr(&unsigned).unwrap(),
            AstNode::UIntLiteral(u32::MAX)
        );

        let float = RawNode::new("Number").with_value("1.5f");
        assert_eq!(
            Lowerer::new().expr(&float).unwrap(),
            AstNode::FloatLiteral(1.5)
        );

        let hinted = RawNode::new("Number").with_value(3).with_type("unsigned long");
        assert_eq!(Lowerer::new().expr(&hinted).unwrap(), AstNode::UIntLiteral(3));
    }

    #[test]
    fn test_char_literal_escapes() {
        let c = RawNode::new("CharLiteral").with_value("'A'");
        assert_eq!(Lowerer::new().expr(&c).unwrap(), AstNode::IntLiteral(65));
        let nl = RawNode::new("CharLiteral").with_value("\\n");
        assert_eq!(Lowerer::new().expr(&nl).unwrap(), AstNode::IntLiteral(10));
    }

    #[test]
    fn test_typedef_struct_registers_both() {
        let typedef = RawNode::new("Typedef").with_value("Point").with_child(
            RawNode::new("StructDef").with_children([
                RawNode::new("Field").with_value("x").with_type("int"),
                RawNode::new("Field").with_value("y").with_type("int"),
            ]),
        );
        let program = lower_program(&RawNode::new("Program").with_child(typedef)).unwrap();
        assert_eq!(program.nodes.len(), 2);
        match &program.nodes[0] {
            AstNode::StructDef(def) => {
                assert_eq!(def.name, "Point");
                assert_eq!(def.fields.len(), 2);
            }
            other => panic!("Expected struct definition, got {:?}", other),
        }
    }

    #[test]
    fn test_arity_errors_are_reported() {
        let bad_if = RawNode::new("If").with_child(ident("x"));
        let err = Lowerer::new().statement(&bad_if).unwrap_err();
        assert!(matches!(err, TreeError::Arity { .. }));

        let unknown = RawNode::new("Lambda");
        assert_eq!(
            Lowerer::new().expr(&unknown).unwrap_err(),
            TreeError::UnknownKind("Lambda".to_string())
        );
    }
}

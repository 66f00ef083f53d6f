// AST definitions for sketch programs, produced by lowering a RawNode tree

use super::types::TypeSpec;
use std::rc::Rc;

/// Unique identifier for declarations, used to key static storage
pub type NodeId = usize;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    BitShl,
    BitShr,
}

impl BinOp {
    pub fn from_symbol(symbol: &str) -> Option<BinOp> {
        let op = match symbol {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Mod,
            "==" => BinOp::Eq,
            "!=" => BinOp::Ne,
            "<" => BinOp::Lt,
            "<=" => BinOp::Le,
            ">" => BinOp::Gt,
            ">=" => BinOp::Ge,
            "&&" => BinOp::And,
            "||" => BinOp::Or,
            "&" => BinOp::BitAnd,
            "|" => BinOp::BitOr,
            "^" => BinOp::BitXor,
            "<<" => BinOp::BitShl,
            ">>" => BinOp::BitShr,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitShl => "<<",
            BinOp::BitShr => ">>",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,     // -x
    Plus,    // +x
    Not,     // !x
    BitNot,  // ~x
    PreInc,  // ++x
    PreDec,  // --x
    PostInc, // x++
    PostDec, // x--
    Deref,   // *x
    AddrOf,  // &x
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub param_type: TypeSpec,
}

/// Struct field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: TypeSpec,
}

/// Struct definition
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<Field>,
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<AstNode>,
    pub return_type: TypeSpec,
}

/// One name in a declaration statement. `int a = 1, *b;` has two.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub id: NodeId,
    pub name: String,
    pub var_type: TypeSpec,
    pub init: Option<AstNode>,
}

/// Switch case
#[derive(Debug, Clone, PartialEq)]
pub enum CaseNode {
    Case {
        value: Box<AstNode>,
        statements: Vec<AstNode>,
    },
    Default {
        statements: Vec<AstNode>,
    },
}

/// AST nodes representing declarations, statements and expressions
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    // Top-level declarations
    FunctionDef(Rc<FunctionDef>),
    StructDef(StructDef),
    Typedef {
        alias: String,
        target: TypeSpec,
    },

    // Statements
    VarDecl {
        declarators: Vec<Declarator>,
    },
    ExpressionStatement(Box<AstNode>),
    Block(Vec<AstNode>),
    If {
        condition: Box<AstNode>,
        then_branch: Box<AstNode>,
        else_branch: Option<Box<AstNode>>,
    },
    While {
        condition: Box<AstNode>,
        body: Box<AstNode>,
    },
    DoWhile {
        body: Box<AstNode>,
        condition: Box<AstNode>,
    },
    For {
        init: Option<Box<AstNode>>,
        condition: Option<Box<AstNode>>,
        increment: Option<Box<AstNode>>,
        body: Box<AstNode>,
    },
    Switch {
        expr: Box<AstNode>,
        cases: Vec<CaseNode>,
    },
    Return(Option<Box<AstNode>>),
    Break,
    Continue,
    Empty,

    // Expressions
    IntLiteral(i32),
    UIntLiteral(u32),
    FloatLiteral(f64),
    BoolLiteral(bool),
    StringLiteral(String),
    Variable(String),
    BinaryOp {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<AstNode>,
    },
    Assignment {
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
    },
    CompoundAssignment {
        lhs: Box<AstNode>,
        op: BinOp,
        rhs: Box<AstNode>,
    },
    TernaryOp {
        condition: Box<AstNode>,
        true_expr: Box<AstNode>,
        false_expr: Box<AstNode>,
    },
    /// `a, b, c`, evaluated left to right
    Comma(Vec<AstNode>),
    FunctionCall {
        callee: Box<AstNode>,
        args: Vec<AstNode>,
    },
    ArrayAccess {
        array: Box<AstNode>,
        index: Box<AstNode>,
    },
    MemberAccess {
        object: Box<AstNode>,
        member: String,
    },
    PointerMemberAccess {
        object: Box<AstNode>,
        member: String,
    },
    Cast {
        target_type: TypeSpec,
        expr: Box<AstNode>,
    },
    SizeofType(TypeSpec),
    SizeofExpr(Box<AstNode>),
    InitializerList(Vec<AstNode>),
    /// `.field = value` inside an initializer list
    DesignatedInit {
        field: String,
        value: Box<AstNode>,
    },
}

impl AstNode {
    /// Short name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            AstNode::FunctionDef(_) => "function definition",
            AstNode::StructDef(_) => "struct definition",
            AstNode::Typedef { .. } => "typedef",
            AstNode::VarDecl { .. } => "declaration",
            AstNode::ExpressionStatement(_) => "expression statement",
            AstNode::Block(_) => "block",
            AstNode::If { .. } => "if",
            AstNode::While { .. } => "while",
            AstNode::DoWhile { .. } => "do-while",
            AstNode::For { .. } => "for",
            AstNode::Switch { .. } => "switch",
            AstNode::Return(_) => "return",
            AstNode::Break => "break",
            AstNode::Continue => "continue",
            AstNode::Empty => "empty statement",
            AstNode::IntLiteral(_)
            | AstNode::UIntLiteral(_)
            | AstNode::FloatLiteral(_)
            | AstNode::BoolLiteral(_)
            | AstNode::StringLiteral(_) => "literal",
            AstNode::Variable(_) => "identifier",
            AstNode::BinaryOp { .. } => "binary expression",
            AstNode::UnaryOp { .. } => "unary expression",
            AstNode::Assignment { .. } | AstNode::CompoundAssignment { .. } => "assignment",
            AstNode::TernaryOp { .. } => "ternary",
            AstNode::Comma(_) => "comma expression",
            AstNode::FunctionCall { .. } => "call",
            AstNode::ArrayAccess { .. } => "array access",
            AstNode::MemberAccess { .. } => "member access",
            AstNode::PointerMemberAccess { .. } => "pointer member access",
            AstNode::Cast { .. } => "cast",
            AstNode::SizeofType(_) | AstNode::SizeofExpr(_) => "sizeof",
            AstNode::InitializerList(_) => "initializer list",
            AstNode::DesignatedInit { .. } => "designated initializer",
        }
    }

    /// Whether the node denotes a storage location
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            AstNode::Variable(_)
                | AstNode::ArrayAccess { .. }
                | AstNode::MemberAccess { .. }
                | AstNode::PointerMemberAccess { .. }
                | AstNode::UnaryOp {
                    op: UnOp::Deref,
                    ..
                }
        )
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub nodes: Vec<AstNode>, // FunctionDef, StructDef, Typedef, and global VarDecl
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn function(&self, name: &str) -> Option<&Rc<FunctionDef>> {
        self.nodes.iter().find_map(|node| match node {
            AstNode::FunctionDef(def) if def.name == name => Some(def),
            _ => None,
        })
    }
}

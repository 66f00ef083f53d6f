//! Declared types
//!
//! The front end hands declared types over as plain strings (`"unsigned long"`,
//! `"const int *"`, `"byte [4][2]"`). [`TypeSpec::parse`] turns them into a
//! structured [`TypeSpec`] that the interpreter uses for default values,
//! store-time width conversion and `sizeof`.
//!
//! # Width model
//!
//! | Declared                                   | Base       | Stored as |
//! |--------------------------------------------|------------|-----------|
//! | `bool`, `boolean`                          | `Bool`     | `Bool`    |
//! | `char`, `signed char`, `int8_t`            | `Int8`     | `Int`     |
//! | `byte`, `unsigned char`, `uint8_t`         | `UInt8`    | `UInt`    |
//! | `short`, `int16_t`                         | `Int16`    | `Int`     |
//! | `word`, `unsigned short`, `uint16_t`       | `UInt16`   | `UInt`    |
//! | `int`, `long`, `int32_t`                   | `Int32`    | `Int`     |
//! | `unsigned int`, `unsigned long`, `uint32_t`| `UInt32`   | `UInt`    |
//! | `float`, `double`                          | `Float`/`Double` | `Float` |

use std::fmt;

/// Base types of the sketch dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Void,
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float,
    Double,
    /// Arduino `String`
    String,
    Struct(String),
    /// Unresolved identifier, usually a typedef alias
    Named(String),
    /// `auto` or a missing type; values keep whatever kind they arrive with
    Auto,
}

impl BaseType {
    pub fn is_unsigned(&self) -> bool {
        matches!(self, BaseType::UInt8 | BaseType::UInt16 | BaseType::UInt32)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            BaseType::Int8
                | BaseType::UInt8
                | BaseType::Int16
                | BaseType::UInt16
                | BaseType::Int32
                | BaseType::UInt32
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, BaseType::Float | BaseType::Double)
    }
}

/// One array dimension as written in the declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayDim {
    Fixed(usize),
    /// Dimension given by a named constant, resolved at declaration time
    Named(String),
    /// `[]`, sized by the initializer or decayed to a pointer for parameters
    Unsized,
}

/// Type representation with qualifiers, pointers, and arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub base: BaseType,
    pub is_const: bool,
    pub is_static: bool,
    pub is_extern: bool,
    pub pointer_depth: usize, // 0 = not pointer, 1 = *, 2 = **, etc.
    pub array_dims: Vec<ArrayDim>,
}

impl TypeSpec {
    pub fn new(base: BaseType) -> Self {
        TypeSpec {
            base,
            is_const: false,
            is_static: false,
            is_extern: false,
            pointer_depth: 0,
            array_dims: Vec::new(),
        }
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn with_array(mut self, dim: ArrayDim) -> Self {
        self.array_dims.push(dim);
        self
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0 && self.array_dims.is_empty()
    }

    pub fn is_array(&self) -> bool {
        !self.array_dims.is_empty()
    }

    pub fn is_struct(&self) -> bool {
        self.pointer_depth == 0
            && self.array_dims.is_empty()
            && matches!(self.base, BaseType::Struct(_))
    }

    /// `char[]`-like declarations that accept a string literal initializer
    pub fn is_char_array(&self) -> bool {
        self.pointer_depth == 0
            && self.array_dims.len() == 1
            && matches!(self.base, BaseType::Int8 | BaseType::UInt8)
    }

    /// Type of one element: drops the outermost array dimension, or one level
    /// of indirection when the type is a pointer.
    pub fn element_type(&self) -> TypeSpec {
        let mut elem = self.clone();
        if !elem.array_dims.is_empty() {
            elem.array_dims.remove(0);
        } else if elem.pointer_depth > 0 {
            elem.pointer_depth -= 1;
        } else if elem.base == BaseType::String {
            elem.base = BaseType::Int8;
        }
        elem.is_static = false;
        elem
    }

    /// Array parameters are received as pointers to their first element
    pub fn decay_parameter(&self) -> TypeSpec {
        if self.array_dims.is_empty() {
            return self.clone();
        }
        let mut decayed = self.clone();
        decayed.array_dims.remove(0);
        if decayed.array_dims.is_empty() {
            decayed.pointer_depth += 1;
        }
        decayed
    }

    /// Parse a declared-type string.
    ///
    /// Qualifiers (`const`, `static`, `extern`, `volatile`, `unsigned`, ...),
    /// `*` and bracketed dimensions may appear anywhere in the text, so a base
    /// type and a declarator suffix can simply be concatenated.
    pub fn parse(text: &str) -> TypeSpec {
        let mut pointer_depth = 0;
        let mut array_dims = Vec::new();
        let mut cleaned = String::with_capacity(text.len());

        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' => {
                    pointer_depth += 1;
                    cleaned.push(' ');
                }
                '[' => {
                    let mut inner = String::new();
                    for n in chars.by_ref() {
                        if n == ']' {
                            break;
                        }
                        inner.push(n);
                    }
                    array_dims.push(parse_dim(inner.trim()));
                    cleaned.push(' ');
                }
                '&' => cleaned.push(' '),
                _ => cleaned.push(c),
            }
        }

        let mut is_const = false;
        let mut is_static = false;
        let mut is_extern = false;
        let mut unsigned = false;
        let mut signed = false;
        let mut struct_keyword = false;
        let mut longs = 0;
        let mut short = false;
        let mut name: Option<&str> = None;

        for word in cleaned.split_whitespace() {
            match word {
                "const" | "constexpr" => is_const = true,
                "static" => is_static = true,
                "extern" => is_extern = true,
                "volatile" | "register" | "inline" | "PROGMEM" | "enum" => {}
                "signed" => signed = true,
                "unsigned" => unsigned = true,
                "struct" | "class" | "union" => struct_keyword = true,
                "long" => longs += 1,
                "short" => short = true,
                other => name = Some(other),
            }
        }

        let base = match name {
            _ if struct_keyword => BaseType::Struct(name.unwrap_or_default().to_string()),
            None if short => {
                if unsigned {
                    BaseType::UInt16
                } else {
                    BaseType::Int16
                }
            }
            None if longs > 0 || unsigned || signed => {
                if unsigned {
                    BaseType::UInt32
                } else {
                    BaseType::Int32
                }
            }
            None => BaseType::Auto,
            Some(word) => base_from_word(word, unsigned, short),
        };

        TypeSpec {
            base,
            is_const,
            is_static,
            is_extern,
            pointer_depth,
            array_dims,
        }
    }
}

fn parse_dim(text: &str) -> ArrayDim {
    if text.is_empty() {
        return ArrayDim::Unsized;
    }
    match text.parse::<usize>() {
        Ok(n) => ArrayDim::Fixed(n),
        Err(_) => ArrayDim::Named(text.to_string()),
    }
}

fn base_from_word(word: &str, unsigned: bool, short: bool) -> BaseType {
    match word {
        "void" => BaseType::Void,
        "bool" | "boolean" => BaseType::Bool,
        "char" if unsigned => BaseType::UInt8,
        "char" | "int8_t" => BaseType::Int8,
        "byte" | "uint8_t" => BaseType::UInt8,
        "int16_t" => BaseType::Int16,
        "word" | "uint16_t" => BaseType::UInt16,
        "int" if short && unsigned => BaseType::UInt16,
        "int" if short => BaseType::Int16,
        "int" | "int32_t" if unsigned => BaseType::UInt32,
        "int" | "int32_t" => BaseType::Int32,
        "uint32_t" | "size_t" => BaseType::UInt32,
        "float" => BaseType::Float,
        "double" => BaseType::Double,
        "String" | "string" => BaseType::String,
        "auto" => BaseType::Auto,
        other => BaseType::Named(other.to_string()),
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Void => write!(f, "void"),
            BaseType::Bool => write!(f, "bool"),
            BaseType::Int8 => write!(f, "char"),
            BaseType::UInt8 => write!(f, "byte"),
            BaseType::Int16 => write!(f, "int16_t"),
            BaseType::UInt16 => write!(f, "uint16_t"),
            BaseType::Int32 => write!(f, "int"),
            BaseType::UInt32 => write!(f, "unsigned int"),
            BaseType::Float => write!(f, "float"),
            BaseType::Double => write!(f, "double"),
            BaseType::String => write!(f, "String"),
            BaseType::Struct(name) => write!(f, "struct {}", name),
            BaseType::Named(name) => write!(f, "{}", name),
            BaseType::Auto => write!(f, "auto"),
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        write!(f, "{}", self.base)?;
        for _ in 0..self.pointer_depth {
            write!(f, "*")?;
        }
        for dim in &self.array_dims {
            match dim {
                ArrayDim::Fixed(n) => write!(f, "[{}]", n)?,
                ArrayDim::Named(name) => write!(f, "[{}]", name)?,
                ArrayDim::Unsized => write!(f, "[]")?,
            }
        }
        Ok(())
    }
}

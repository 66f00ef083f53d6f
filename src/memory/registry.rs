//! Struct and typedef definitions
//!
//! Populated once from the program's top-level declarations before `setup`
//! runs. Typedef aliases resolve recursively; qualifiers, pointer depth and
//! dimensions written at the use site are layered on top of the alias target.

use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::tree::ast::StructDef;
use crate::tree::types::{BaseType, TypeSpec};
use rustc_hash::FxHashMap;

/// Alias chains longer than this are treated as cyclic
const MAX_ALIAS_DEPTH: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    structs: FxHashMap<String, StructDef>,
    typedefs: FxHashMap<String, TypeSpec>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_struct(&mut self, def: StructDef) {
        self.structs.insert(def.name.clone(), def);
    }

    pub fn define_typedef(&mut self, alias: &str, target: TypeSpec) {
        self.typedefs.insert(alias.to_string(), target);
    }

    pub fn struct_def(&self, name: &str) -> Option<&StructDef> {
        self.structs.get(name)
    }

    pub fn is_type_name(&self, name: &str) -> bool {
        self.structs.contains_key(name) || self.typedefs.contains_key(name)
    }

    /// Expand typedef aliases and bare struct names into concrete base types.
    /// Unknown names fall back to `int`, the way enumerations behave.
    pub fn resolve(&self, ty: &TypeSpec) -> TypeSpec {
        let mut resolved = ty.clone();
        for _ in 0..MAX_ALIAS_DEPTH {
            let name = match &resolved.base {
                BaseType::Named(name) => name.clone(),
                _ => break,
            };
            if let Some(target) = self.typedefs.get(&name) {
                let mut next = target.clone();
                next.is_const |= resolved.is_const;
                next.is_static |= resolved.is_static;
                next.is_extern |= resolved.is_extern;
                next.pointer_depth += resolved.pointer_depth;
                // Use-site dimensions are outermost
                let mut dims = resolved.array_dims.clone();
                dims.extend(next.array_dims);
                next.array_dims = dims;
                resolved = next;
            } else if self.structs.contains_key(&name) {
                resolved.base = BaseType::Struct(name);
            } else {
                resolved.base = BaseType::Int32;
            }
        }
        // `struct Tag` may itself be typedef'd to a differently named struct
        let retarget = match &resolved.base {
            BaseType::Struct(name) if !self.structs.contains_key(name) => {
                match self.typedefs.get(name).map(|t| &t.base) {
                    Some(BaseType::Struct(target)) => Some(target.clone()),
                    _ => None,
                }
            }
            _ => None,
        };
        if let Some(target) = retarget {
            resolved.base = BaseType::Struct(target);
        }
        resolved
    }

    /// Declared type of `field` in struct `struct_name`, resolved
    pub fn field_type(&self, struct_name: &str, field: &str) -> RuntimeResult<TypeSpec> {
        let def = self
            .structs
            .get(struct_name)
            .ok_or_else(|| RuntimeError::type_error("defined struct", struct_name))?;
        def.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| self.resolve(&f.field_type))
            .ok_or_else(|| RuntimeError::MissingStructField {
                struct_name: struct_name.to_string(),
                field_name: field.to_string(),
            })
    }
}

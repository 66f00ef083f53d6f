use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::memory::value::{StructValue, Value};
use crate::tree::ast::AstNode;
use crate::tree::types::{ArrayDim, BaseType, TypeSpec};

/// Scalars in one element of `ty` when its dimensions are all known
fn flat_len(ty: &TypeSpec) -> Option<usize> {
    ty.array_dims.iter().try_fold(1usize, |acc, dim| match dim {
        ArrayDim::Fixed(n) => Some(acc * n),
        _ => None,
    })
}

impl Interpreter {
    /// Build the value of a brace initializer for a declaration of type `ty`
    pub(crate) fn build_aggregate(&mut self, items: &[AstNode], ty: &TypeSpec) -> RuntimeResult<Value> {
        let ty = self.resolve_declared_type(ty)?;
        if ty.is_array() {
            return self.build_array(items, &ty);
        }
        if let (true, BaseType::Struct(name)) = (ty.is_struct(), &ty.base) {
            return self.build_struct(name, items);
        }
        // `int x = {5};`
        match items.first() {
            Some(item) => self.initial_value(item, &ty),
            None => Ok(self.default_value(&ty)),
        }
    }

    /// Elements fill in order; missing trailing elements are zero and extra
    /// initializers are dropped. Nested arrays accept either nested braces or
    /// a flat list that fills rows in order.
    fn build_array(&mut self, items: &[AstNode], ty: &TypeSpec) -> RuntimeResult<Value> {
        let elem = ty.element_type();
        let mut values = Vec::with_capacity(items.len());

        let elided = elem.is_array()
            && !items
                .iter()
                .any(|i| matches!(i, AstNode::InitializerList(_) | AstNode::StringLiteral(_)));
        if elided {
            let row = flat_len(&elem).unwrap_or(items.len()).max(1);
            for chunk in items.chunks(row) {
                values.push(self.build_array(chunk, &elem)?);
            }
        } else {
            for item in items {
                values.push(self.initial_value(item, &elem)?);
            }
        }

        if let Some(ArrayDim::Fixed(n)) = ty.array_dims.first() {
            values.truncate(*n);
            while values.len() < *n {
                values.push(self.default_value(&elem));
            }
        }
        Ok(Value::Array(values))
    }

    /// Positional initializers follow declaration order; `.field = v` moves
    /// the position to that field. Unmentioned fields keep their declaration
    /// default.
    fn build_struct(&mut self, name: &str, items: &[AstNode]) -> RuntimeResult<Value> {
        let def = self
            .types
            .struct_def(name)
            .cloned()
            .ok_or_else(|| RuntimeError::type_error("defined struct", name))?;

        let mut instance = match self.default_value(&TypeSpec::new(BaseType::Struct(name.to_string()))) {
            Value::Struct(instance) => instance,
            _ => StructValue::new(name),
        };

        let mut next = 0;
        for item in items {
            let (field_name, init) = match item {
                AstNode::DesignatedInit { field, value } => {
                    let pos = def.fields.iter().position(|f| f.name == *field).ok_or_else(|| {
                        RuntimeError::MissingStructField {
                            struct_name: name.to_string(),
                            field_name: field.clone(),
                        }
                    })?;
                    next = pos + 1;
                    (field.clone(), value.as_ref())
                }
                positional => {
                    let field = def.fields.get(next).ok_or_else(|| {
                        RuntimeError::type_error(
                            &format!("at most {} initializers for struct {}", def.fields.len(), name),
                            format!("{}", items.len()),
                        )
                    })?;
                    next += 1;
                    (field.name.clone(), positional)
                }
            };
            let field_type = self.types.field_type(name, &field_name)?;
            let value = self.initial_value(init, &field_type)?;
            if let Some(slot) = instance.field_mut(&field_name) {
                *slot = value;
            }
        }
        Ok(Value::Struct(instance))
    }
}

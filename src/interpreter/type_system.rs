use crate::interpreter::builtins;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::memory::pointer::Pointer;
use crate::memory::value::{StructValue, Value};
use crate::tree::types::{ArrayDim, BaseType, TypeSpec};

impl Interpreter {
    /// Expand aliases and replace dimensions named by constants with their
    /// current value.
    pub(crate) fn resolve_declared_type(&self, ty: &TypeSpec) -> RuntimeResult<TypeSpec> {
        let mut resolved = self.types.resolve(ty);
        for dim in resolved.array_dims.iter_mut() {
            if let ArrayDim::Named(name) = dim {
                let n = match self.named_constant(name) {
                    Some(n) => n,
                    None => {
                        return Err(RuntimeError::UndefinedVariable { name: name.clone() });
                    }
                };
                if n < 0 {
                    return Err(RuntimeError::OutOfBounds { index: n, size: 0 });
                }
                *dim = ArrayDim::Fixed(n as usize);
            }
        }
        Ok(resolved)
    }

    fn named_constant(&self, name: &str) -> Option<i64> {
        match self.scopes.lookup(name) {
            Some(var) => var.value.as_i64(),
            None => builtins::constant(name).and_then(|v| v.as_i64()),
        }
    }

    /// Value of a declaration without initializer
    ///
    /// Scalars start at zero of their kind, pointers at null, arrays are
    /// filled element-wise. Struct instances get every scalar field absent;
    /// array and struct fields are built out so they can be addressed.
    pub(crate) fn default_value(&self, ty: &TypeSpec) -> Value {
        let ty = self.types.resolve(ty);

        if let Some(first) = ty.array_dims.first() {
            let len = match first {
                ArrayDim::Fixed(n) => *n,
                ArrayDim::Named(name) => self.named_constant(name).unwrap_or(0).max(0) as usize,
                ArrayDim::Unsized => 0,
            };
            let item = self.default_value(&ty.element_type());
            return Value::Array(vec![item; len]);
        }

        if ty.pointer_depth > 0 {
            return Value::Pointer(Pointer::null());
        }

        match &ty.base {
            BaseType::Bool => Value::Bool(false),
            BaseType::Float | BaseType::Double => Value::Float(0.0),
            BaseType::String => Value::Str(String::new()),
            BaseType::Struct(name) => self.default_struct(name),
            base if base.is_unsigned() => Value::UInt(0),
            base if base.is_integer() => Value::Int(0),
            _ => Value::Void,
        }
    }

    fn default_struct(&self, name: &str) -> Value {
        let mut instance = StructValue::new(name);
        if let Some(def) = self.types.struct_def(name) {
            for field in &def.fields {
                let field_type = self.types.resolve(&field.field_type);
                let value = if field_type.is_array() || field_type.is_struct() {
                    self.default_value(&field_type)
                } else {
                    Value::Void
                };
                instance.fields.push((field.name.clone(), value));
            }
        }
        Value::Struct(instance)
    }

    /// Convert a value into the storage kind of a declared type
    pub(crate) fn convert_for_store(&self, value: Value, ty: &TypeSpec) -> Value {
        let ty = self.types.resolve(ty);
        if ty.is_array() || ty.is_struct() {
            return value;
        }
        if ty.pointer_depth > 0 {
            return match value {
                Value::Int(0) | Value::UInt(0) => Value::Pointer(Pointer::null()),
                other => other,
            };
        }
        value.coerce_to(&ty.base)
    }

    /// `char buf[N] = "text"`: one code per byte plus the terminator, padded
    /// or cut to a fixed length
    pub(crate) fn char_array_from_text(&self, text: &str, ty: &TypeSpec) -> Value {
        let base = ty.element_type().base;
        let mut codes: Vec<Value> = text
            .bytes()
            .chain(std::iter::once(0))
            .map(|b| Value::Int(b as i8 as i32).coerce_to(&base))
            .collect();
        if let Some(ArrayDim::Fixed(n)) = ty.array_dims.first() {
            codes.resize(*n, Value::Int(0).coerce_to(&base));
        }
        Value::Array(codes)
    }

    /// `(type) value`
    pub(crate) fn cast_value(&self, value: Value, target: &TypeSpec) -> RuntimeResult<Value> {
        let ty = self.resolve_declared_type(target)?;
        if ty.base == BaseType::Void && ty.pointer_depth == 0 {
            return Ok(Value::Void);
        }
        if ty.is_struct() && !matches!(value, Value::Struct(_)) {
            return Err(RuntimeError::type_error("struct", value.type_name()));
        }
        Ok(self.convert_for_store(value, &ty))
    }
}

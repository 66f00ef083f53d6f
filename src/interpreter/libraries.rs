//! Library objects
//!
//! Sketches that use a device library declare objects of its class
//! (`CapacitiveSensor cs = CapacitiveSensor(4, 2);`) and call methods on
//! them. A library object is an empty struct named after its class; the
//! class names are registered as struct types before any declaration runs.
//! Reading methods are answered by
//! [`DataProvider::library_sensor_value`](super::provider::DataProvider::library_sensor_value),
//! the rest are recorded as host calls.

use crate::interpreter::builtins::render_args;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::memory::value::{StructValue, Value};
use crate::tree::ast::{AstNode, StructDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodKind {
    /// Answered by the data provider
    Reading,
    /// Recorded as a `FUNCTION_CALL` with no result
    Command,
}

#[derive(Debug)]
pub(crate) struct LibraryClass {
    pub name: &'static str,
    constructor: (usize, usize),
    methods: &'static [(&'static str, usize, usize, MethodKind)],
}

const LIBRARIES: &[LibraryClass] = &[LibraryClass {
    name: "CapacitiveSensor",
    constructor: (2, 2),
    methods: &[
        ("capacitiveSensor", 1, 1, MethodKind::Reading),
        ("capacitiveSensorRaw", 1, 1, MethodKind::Reading),
        ("set_CS_Timeout_Millis", 1, 1, MethodKind::Command),
        ("set_CS_AutocaL_Millis", 1, 1, MethodKind::Command),
        ("reset_CS_AutoCal", 0, 0, MethodKind::Command),
    ],
}];

pub(crate) fn library_class(name: &str) -> Option<&'static LibraryClass> {
    LIBRARIES.iter().find(|class| class.name == name)
}

impl Interpreter {
    pub(crate) fn register_library_classes(&mut self) {
        for class in LIBRARIES {
            self.types.define_struct(StructDef {
                name: class.name.to_string(),
                fields: Vec::new(),
            });
        }
    }

    /// `CapacitiveSensor(4, 2)`: records the construction, yields the object
    pub(crate) fn construct_library_object(
        &mut self,
        class: &LibraryClass,
        args: &[AstNode],
    ) -> RuntimeResult<Value> {
        let values = self.library_args(class.name, class.constructor, args)?;
        let message = format!("{}({})", class.name, render_args(&values));
        self.emit_host_call(class.name, values, message);
        Ok(Value::Struct(StructValue::new(class.name)))
    }

    pub(crate) fn call_library_method(
        &mut self,
        class: &LibraryClass,
        method: &str,
        args: &[AstNode],
    ) -> RuntimeResult<Value> {
        let function = format!("{}.{}", class.name, method);
        let &(_, min, max, kind) = class
            .methods
            .iter()
            .find(|(name, ..)| *name == method)
            .ok_or_else(|| RuntimeError::UnknownFunction {
                name: function.clone(),
            })?;
        let values = self.library_args(&function, (min, max), args)?;

        match kind {
            MethodKind::Reading => {
                let arg = values.first().and_then(Value::as_i64).unwrap_or(0) as i32;
                let reading = self.provider.library_sensor_value(class.name, method, arg);
                let message = format!("{}({}) = {}", function, render_args(&values), reading);
                self.emit_host_call(&function, values, message);
                Ok(Value::Int(reading))
            }
            MethodKind::Command => {
                let message = format!("{}({})", function, render_args(&values));
                self.emit_host_call(&function, values, message);
                Ok(Value::Void)
            }
        }
    }

    fn library_args(
        &mut self,
        function: &str,
        (min, max): (usize, usize),
        args: &[AstNode],
    ) -> RuntimeResult<Vec<Value>> {
        if args.len() < min || args.len() > max {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: function.to_string(),
                expected: if args.len() < min { min } else { max },
                got: args.len(),
            });
        }
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.evaluate_expr(arg)?;
            if value.as_i64().is_none() {
                return Err(RuntimeError::type_error("integer argument", value.type_name()));
            }
            values.push(value);
        }
        Ok(values)
    }
}

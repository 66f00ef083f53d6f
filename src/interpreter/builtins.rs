//! Built-in function implementations
//!
//! This module provides the Arduino core calls that are handled by the
//! interpreter rather than being defined in user code.
//!
//! # Supported Built-ins
//!
//! - Pin I/O: `pinMode`, `digitalWrite`, `digitalRead`, `analogWrite`,
//!   `analogRead`, `pulseIn`, `tone`, `noTone`
//! - Clocks: `millis`, `micros`, `delay`, `delayMicroseconds`
//! - Serial: `Serial.begin`, `Serial.print`, `Serial.println`
//! - Math: `abs`, `min`, `max`, `constrain`, `map`, `sq`, `sqrt`, `pow`
//!
//! # Implementation Notes
//!
//! - Host calls emit one `FUNCTION_CALL` record with the evaluated arguments;
//!   `delay`/`delayMicroseconds` emit `DELAY`/`DELAY_MICROSECONDS` instead
//! - Reads are answered by the interpreter's [`DataProvider`](super::provider::DataProvider)
//! - Math helpers are pure and emit nothing
//! - `Serial.print(x, base)` prints integers in base 2, 8, 10 or 16 and
//!   floats with `base` decimals

use crate::command::CommandKind;
use crate::interpreter::constants::*;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::{RuntimeError, RuntimeResult};
use crate::memory::pointer::Pointer;
use crate::memory::value::Value;
use crate::tree::ast::{AstNode, BinOp};

/// Name and accepted argument count range
const BUILTINS: &[(&str, usize, usize)] = &[
    ("pinMode", 2, 2),
    ("digitalWrite", 2, 2),
    ("digitalRead", 1, 1),
    ("analogWrite", 2, 2),
    ("analogRead", 1, 1),
    ("pulseIn", 2, 3),
    ("tone", 2, 3),
    ("noTone", 1, 1),
    ("millis", 0, 0),
    ("micros", 0, 0),
    ("delay", 1, 1),
    ("delayMicroseconds", 1, 1),
    ("Serial.begin", 1, 1),
    ("Serial.print", 1, 2),
    ("Serial.println", 0, 2),
    ("abs", 1, 1),
    ("min", 2, 2),
    ("max", 2, 2),
    ("constrain", 3, 3),
    ("map", 5, 5),
    ("sq", 1, 1),
    ("sqrt", 1, 1),
    ("pow", 2, 2),
];

/// `pulseIn` timeout when the sketch gives none, in microseconds
const DEFAULT_PULSE_TIMEOUT: u32 = 1_000_000;

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTINS.iter().any(|(n, _, _)| *n == name)
}

fn arity(name: &str) -> Option<(usize, usize)> {
    BUILTINS
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, min, max)| (*min, *max))
}

/// Value of a built-in identifier such as `HIGH` or `A0`
pub(crate) fn constant(name: &str) -> Option<Value> {
    let value = match name {
        "HIGH" => Value::Int(HIGH),
        "LOW" => Value::Int(LOW),
        "INPUT" => Value::Int(INPUT),
        "OUTPUT" => Value::Int(OUTPUT),
        "INPUT_PULLUP" => Value::Int(INPUT_PULLUP),
        "LED_BUILTIN" => Value::Int(LED_BUILTIN),
        "DEC" => Value::Int(DEC),
        "HEX" => Value::Int(HEX),
        "OCT" => Value::Int(OCT),
        "BIN" => Value::Int(BIN),
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "NULL" | "nullptr" => Value::Pointer(Pointer::null()),
        _ => {
            let digit = name.strip_prefix('A')?.parse::<i32>().ok()?;
            if !(0..8).contains(&digit) {
                return None;
            }
            Value::Int(ANALOG_PIN_BASE + digit)
        }
    };
    Some(value)
}

fn int_arg(value: &Value) -> RuntimeResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| RuntimeError::type_error("integer argument", value.type_name()))
}

fn float_arg(value: &Value) -> RuntimeResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| RuntimeError::type_error("numeric argument", value.type_name()))
}

pub(crate) fn render_args(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Text written by `Serial.print(value[, format])`
fn print_text(values: &[Value]) -> RuntimeResult<String> {
    let Some(value) = values.first() else {
        return Ok(String::new());
    };
    let format = match values.get(1) {
        Some(f) => Some(int_arg(f)?),
        None => None,
    };
    let text = match (value, format) {
        (Value::Float(f), Some(digits)) => format!("{:.*}", digits.clamp(0, 20) as usize, f),
        (Value::Int(_) | Value::UInt(_) | Value::Bool(_), Some(base)) => {
            let n = int_arg(value)?;
            match base {
                2 => format!("{:b}", n as u32),
                8 => format!("{:o}", n as u32),
                16 => format!("{:X}", n as u32),
                _ => n.to_string(),
            }
        }
        (value, _) => value.to_string(),
    };
    Ok(text)
}

impl Interpreter {
    pub(crate) fn call_builtin(&mut self, name: &str, args: &[AstNode]) -> RuntimeResult<Value> {
        let (min, max) = arity(name).ok_or_else(|| RuntimeError::UnknownFunction {
            name: name.to_string(),
        })?;
        if args.len() < min || args.len() > max {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: name.to_string(),
                expected: if args.len() < min { min } else { max },
                got: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate_expr(arg)?);
        }
        tracing::trace!(function = name, "builtin call");

        match name {
            "pinMode" | "digitalWrite" | "analogWrite" | "tone" | "noTone" | "Serial.begin" => {
                for value in &values {
                    int_arg(value)?;
                }
                let message = format!("{}({})", name, render_args(&values));
                self.emit_host_call(name, values, message);
                Ok(Value::Void)
            }

            "Serial.print" | "Serial.println" => {
                // `char[]` and `char*` arguments print as text
                if let Some(first) = values.first_mut() {
                    if matches!(first, Value::Array(_) | Value::Pointer(_)) {
                        if let Some(text) = self.text_value(first) {
                            *first = Value::Str(text);
                        }
                    }
                }
                let mut text = print_text(&values)?;
                let message = format!("{}({})", name, text);
                if name == "Serial.println" {
                    text.push_str("\r\n");
                }
                self.emit_host_call(name, values, message);
                Ok(Value::Int(text.len() as i32))
            }

            "digitalRead" | "analogRead" => {
                let pin = int_arg(&values[0])? as i32;
                let reading = if name == "digitalRead" {
                    self.provider.digital_read(pin)
                } else {
                    self.provider.analog_read(pin)
                };
                let message = format!("{}({}) = {}", name, pin, reading);
                self.emit_host_call(name, values, message);
                Ok(Value::Int(reading))
            }

            "pulseIn" => {
                let pin = int_arg(&values[0])? as i32;
                let state = int_arg(&values[1])? as i32;
                let timeout = match values.get(2) {
                    Some(t) => int_arg(t)? as u32,
                    None => DEFAULT_PULSE_TIMEOUT,
                };
                let width = self.provider.pulse_in(pin, state, timeout);
                let message = format!("pulseIn({}, {}) = {}", pin, state, width);
                self.emit_host_call(name, values, message);
                Ok(Value::UInt(width))
            }

            "millis" | "micros" => {
                let now = if name == "millis" {
                    self.provider.millis()
                } else {
                    self.provider.micros()
                };
                let message = format!("{}() = {}", name, now);
                self.emit_host_call(name, values, message);
                Ok(Value::UInt(now))
            }

            "delay" => {
                let milliseconds = int_arg(&values[0])? as u32;
                self.commands.emit(
                    CommandKind::Delay { milliseconds },
                    format!("delay({})", milliseconds),
                );
                Ok(Value::Void)
            }

            "delayMicroseconds" => {
                let microseconds = int_arg(&values[0])? as u32;
                self.commands.emit(
                    CommandKind::DelayMicroseconds { microseconds },
                    format!("delayMicroseconds({})", microseconds),
                );
                Ok(Value::Void)
            }

            _ => self.math_builtin(name, values),
        }
    }

    pub(crate) fn emit_host_call(&mut self, name: &str, arguments: Vec<Value>, message: String) {
        self.commands.emit(
            CommandKind::FunctionCall {
                function: name.to_string(),
                arguments,
            },
            message,
        );
    }

    fn math_builtin(&mut self, name: &str, mut values: Vec<Value>) -> RuntimeResult<Value> {
        match name {
            "abs" => match &values[0] {
                Value::Int(n) => Ok(Value::Int(n.wrapping_abs())),
                Value::UInt(n) => Ok(Value::UInt(*n)),
                Value::Bool(b) => Ok(Value::Int(*b as i32)),
                Value::Float(f) => Ok(Value::Float(f.abs())),
                other => Err(RuntimeError::type_error("number", other.type_name())),
            },

            "min" | "max" => {
                let a = float_arg(&values[0])?;
                let b = float_arg(&values[1])?;
                let pick_second = if name == "min" { b < a } else { b > a };
                Ok(values.swap_remove(if pick_second { 1 } else { 0 }))
            }

            "constrain" => {
                let x = float_arg(&values[0])?;
                let low = float_arg(&values[1])?;
                let high = float_arg(&values[2])?;
                let index = if x < low {
                    1
                } else if x > high {
                    2
                } else {
                    0
                };
                Ok(values.swap_remove(index))
            }

            "map" => {
                // Wide enough that no 32-bit argument combination overflows
                let mut n = [0i128; 5];
                for (slot, value) in n.iter_mut().zip(&values) {
                    *slot = int_arg(value)?.into();
                }
                let [x, in_min, in_max, out_min, out_max] = n;
                if in_max == in_min {
                    return Err(RuntimeError::DivisionByZero {
                        operation: "map() range division".to_string(),
                    });
                }
                let mapped = (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min;
                Ok(Value::Int(mapped as i32))
            }

            "sq" => {
                let x = values.swap_remove(0);
                self.binary_arith(BinOp::Mul, x.clone(), x)
            }

            "sqrt" => Ok(Value::Float(float_arg(&values[0])?.sqrt())),

            "pow" => {
                let base = float_arg(&values[0])?;
                let exponent = float_arg(&values[1])?;
                Ok(Value::Float(base.powf(exponent)))
            }

            _ => Err(RuntimeError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }
}

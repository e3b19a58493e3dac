//! Arithmetic tools. Integers stay integers; anything else is computed as `f64`.

use crate::error::ToolError;
use crate::server::{ToolSet, ToolSpec};
use async_trait::async_trait;
use serde_json::{Map, Number, Value, json};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operand {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Default)]
pub struct MathTools;

impl MathTools {
    pub fn add(&self, a: &Value, b: &Value) -> Result<Value, ToolError> {
        apply("add", a, b, i64::checked_add, |x, y| x + y)
    }

    pub fn multiply(&self, a: &Value, b: &Value) -> Result<Value, ToolError> {
        apply("multiply", a, b, i64::checked_mul, |x, y| x * y)
    }
}

fn apply(
    operation: &str,
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, ToolError> {
    match (operand("a", a)?, operand("b", b)?) {
        (Operand::Int(x), Operand::Int(y)) => int_op(x, y)
            .map(Value::from)
            .ok_or_else(|| ToolError::Overflow {
                operation: operation.to_string(),
            }),
        (x, y) => {
            let result = float_op(as_f64(x), as_f64(y));
            Number::from_f64(result)
                .map(Value::Number)
                .ok_or_else(|| ToolError::Overflow {
                    operation: operation.to_string(),
                })
        }
    }
}

fn operand(name: &str, value: &Value) -> Result<Operand, ToolError> {
    let Value::Number(number) = value else {
        return Err(ToolError::invalid_argument(name, "must be a number"));
    };
    if let Some(int) = number.as_i64() {
        return Ok(Operand::Int(int));
    }
    number
        .as_f64()
        .map(Operand::Float)
        .ok_or_else(|| ToolError::invalid_argument(name, "is out of range"))
}

fn as_f64(operand: Operand) -> f64 {
    match operand {
        Operand::Int(value) => value as f64,
        Operand::Float(value) => value,
    }
}

fn binary_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": {"type": "number"},
            "b": {"type": "number"}
        },
        "required": ["a", "b"]
    })
}

#[async_trait]
impl ToolSet for MathTools {
    fn server_name(&self) -> &str {
        "Math"
    }

    fn tools(&self) -> Vec<ToolSpec> {
        vec![
            ToolSpec::new("add", "Add two numbers", binary_schema()),
            ToolSpec::new("multiply", "Multiply two numbers", binary_schema()),
        ]
    }

    async fn call(&self, name: &str, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let a = arguments
            .get("a")
            .ok_or_else(|| ToolError::invalid_argument("a", "is required"));
        let b = arguments
            .get("b")
            .ok_or_else(|| ToolError::invalid_argument("b", "is required"));
        let result = match name {
            "add" => self.add(a?, b?)?,
            "multiply" => self.multiply(a?, b?)?,
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(result.to_string())
    }
}

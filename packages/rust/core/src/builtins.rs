//! Standard operations over JSON values.
//!
//! These back the `target`/`operation` names used in pipeline files. Each
//! operation's arity counts the threaded input. Expected failures (division
//! by zero, an empty list) come back as failure signals; wrong operand types
//! are operation faults that abort the run.

use serde_json::{Number, Value, json};

use rinku_shared::{Result, RinkuError};

use crate::dispatch::{Arity, Registry};
use crate::outcome::{Failure, Outcome};

/// Registry populated with the `math`, `text`, `list` and `value` targets.
pub fn standard_registry() -> Registry<Value> {
    let mut registry = Registry::new();
    register_math(&mut registry);
    register_text(&mut registry);
    register_list(&mut registry);
    register_value(&mut registry);
    registry
}

// ---------------------------------------------------------------------------
// math
// ---------------------------------------------------------------------------

fn register_math(registry: &mut Registry<Value>) {
    registry
        .register("math", "add", Arity::Exact(2), |args| {
            let [a, b] = take::<2>("math", "add", args)?;
            arith("add", &a, &b, i64::checked_add, |x, y| x + y).map(Outcome::Ok)
        })
        .register("math", "sub", Arity::Exact(2), |args| {
            let [a, b] = take::<2>("math", "sub", args)?;
            arith("sub", &a, &b, i64::checked_sub, |x, y| x - y).map(Outcome::Ok)
        })
        .register("math", "mul", Arity::Exact(2), |args| {
            let [a, b] = take::<2>("math", "mul", args)?;
            arith("mul", &a, &b, i64::checked_mul, |x, y| x * y).map(Outcome::Ok)
        })
        .register("math", "div", Arity::Exact(2), |args| {
            let [a, b] = take::<2>("math", "div", args)?;
            div(&a, &b)
        })
        .register("math", "neg", Arity::Exact(1), |args| {
            let [a] = take::<1>("math", "neg", args)?;
            let value = match number("neg", &a)? {
                Num::Int(x) => x
                    .checked_neg()
                    .map(Value::from)
                    .ok_or_else(|| RinkuError::operation("math", "neg", "integer overflow"))?,
                Num::Float(x) => float("neg", -x)?,
            };
            Ok(Outcome::Ok(value))
        });
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(x) => x as f64,
            Self::Float(x) => x,
        }
    }
}

fn number(operation: &str, value: &Value) -> Result<Num> {
    let Value::Number(n) = value else {
        return Err(RinkuError::operation(
            "math",
            operation,
            format!("expected a number, got {}", kind(value)),
        ));
    };

    if let Some(x) = n.as_i64() {
        Ok(Num::Int(x))
    } else if let Some(x) = n.as_f64() {
        Ok(Num::Float(x))
    } else {
        Err(RinkuError::operation("math", operation, "number out of range"))
    }
}

fn float(operation: &str, x: f64) -> Result<Value> {
    Number::from_f64(x)
        .map(Value::Number)
        .ok_or_else(|| RinkuError::operation("math", operation, "result is not a finite number"))
}

fn arith(
    operation: &str,
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (number(operation, a)?, number(operation, b)?) {
        (Num::Int(x), Num::Int(y)) => int_op(x, y)
            .map(Value::from)
            .ok_or_else(|| RinkuError::operation("math", operation, "integer overflow")),
        (x, y) => float(operation, float_op(x.as_f64(), y.as_f64())),
    }
}

fn div(a: &Value, b: &Value) -> Result<Outcome<Value>> {
    let (x, y) = (number("div", a)?, number("div", b)?);

    if y.as_f64() == 0.0 {
        return Ok(Failure::tagged(json!("division_by_zero")).into());
    }

    let value = match (x, y) {
        (Num::Int(x), Num::Int(y)) if x.checked_rem(y) == Some(0) => x
            .checked_div(y)
            .map(Value::from)
            .ok_or_else(|| RinkuError::operation("math", "div", "integer overflow"))?,
        (x, y) => float("div", x.as_f64() / y.as_f64())?,
    };
    Ok(Outcome::Ok(value))
}

// ---------------------------------------------------------------------------
// text
// ---------------------------------------------------------------------------

fn register_text(registry: &mut Registry<Value>) {
    registry
        .register("text", "upper", Arity::Exact(1), |args| {
            let [s] = take::<1>("text", "upper", args)?;
            Ok(Outcome::Ok(Value::from(string("upper", &s)?.to_uppercase())))
        })
        .register("text", "lower", Arity::Exact(1), |args| {
            let [s] = take::<1>("text", "lower", args)?;
            Ok(Outcome::Ok(Value::from(string("lower", &s)?.to_lowercase())))
        })
        .register("text", "trim", Arity::Exact(1), |args| {
            let [s] = take::<1>("text", "trim", args)?;
            Ok(Outcome::Ok(Value::from(string("trim", &s)?.trim())))
        })
        .register("text", "concat", Arity::Exact(2), |args| {
            let [a, b] = take::<2>("text", "concat", args)?;
            let joined = format!("{}{}", string("concat", &a)?, string("concat", &b)?);
            Ok(Outcome::Ok(Value::from(joined)))
        })
        .register("text", "length", Arity::Exact(1), |args| {
            let [s] = take::<1>("text", "length", args)?;
            Ok(Outcome::Ok(Value::from(string("length", &s)?.chars().count())))
        });
}

fn string<'a>(operation: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        RinkuError::operation(
            "text",
            operation,
            format!("expected a string, got {}", kind(value)),
        )
    })
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

fn register_list(registry: &mut Registry<Value>) {
    registry
        .register("list", "push", Arity::Exact(2), |args| {
            let [list, item] = take::<2>("list", "push", args)?;
            let mut items = array("push", list)?;
            items.push(item);
            Ok(Outcome::Ok(Value::Array(items)))
        })
        .register("list", "length", Arity::Exact(1), |args| {
            let [list] = take::<1>("list", "length", args)?;
            Ok(Outcome::Ok(Value::from(array("length", list)?.len())))
        })
        .register("list", "first", Arity::Exact(1), |args| {
            let [list] = take::<1>("list", "first", args)?;
            Ok(match array("first", list)?.into_iter().next() {
                Some(item) => Outcome::Ok(item),
                None => Failure::tagged(json!("empty")).into(),
            })
        })
        .register("list", "reverse", Arity::Exact(1), |args| {
            let [list] = take::<1>("list", "reverse", args)?;
            let mut items = array("reverse", list)?;
            items.reverse();
            Ok(Outcome::Ok(Value::Array(items)))
        });
}

fn array(operation: &str, value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(RinkuError::operation(
            "list",
            operation,
            format!("expected an array, got {}", kind(&other)),
        )),
    }
}

// ---------------------------------------------------------------------------
// value
// ---------------------------------------------------------------------------

fn register_value(registry: &mut Registry<Value>) {
    registry
        .register("value", "identity", Arity::Exact(1), |args| {
            let [v] = take::<1>("value", "identity", args)?;
            Ok(Outcome::Ok(v))
        })
        .register("value", "replace", Arity::Exact(2), |args| {
            let [_, replacement] = take::<2>("value", "replace", args)?;
            Ok(Outcome::Ok(replacement))
        })
        // The threaded input is dropped; the extra args become the payload.
        .register("value", "fail", Arity::AtLeast(1), |args| {
            Ok(Failure::new(args.into_iter().skip(1).collect()).into())
        })
        .register("value", "positive", Arity::Exact(1), |args| {
            let [v] = take::<1>("value", "positive", args)?;
            let is_positive = v.as_f64().is_some_and(|x| x > 0.0);
            Ok(if is_positive {
                Outcome::Ok(v)
            } else {
                Failure::tagged(json!("not_positive")).with(v).into()
            })
        });
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Destructure an argument list whose length the registry already checked.
fn take<const N: usize>(target: &str, operation: &str, args: Vec<Value>) -> Result<[Value; N]> {
    args.try_into().map_err(|args: Vec<Value>| {
        RinkuError::operation(
            target,
            operation,
            format!("expected {N} argument(s), got {}", args.len()),
        )
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatch;

    fn call(target: &str, operation: &str, args: Vec<Value>) -> Result<Outcome<Value>> {
        standard_registry().invoke(target, operation, args)
    }

    fn ok(target: &str, operation: &str, args: Vec<Value>) -> Value {
        match call(target, operation, args).expect("operation succeeds") {
            Outcome::Ok(value) => value,
            Outcome::Error(failure) => panic!("unexpected failure signal: {failure:?}"),
        }
    }

    #[test]
    fn math_keeps_integers_integral() {
        assert_eq!(ok("math", "add", vec![json!(1), json!(2)]), json!(3));
        assert_eq!(ok("math", "sub", vec![json!(1), json!(2)]), json!(-1));
        assert_eq!(ok("math", "mul", vec![json!(6), json!(7)]), json!(42));
        assert_eq!(ok("math", "div", vec![json!(9), json!(3)]), json!(3));
        assert_eq!(ok("math", "neg", vec![json!(5)]), json!(-5));
    }

    #[test]
    fn math_falls_back_to_floats() {
        assert_eq!(ok("math", "add", vec![json!(1), json!(0.5)]), json!(1.5));
        assert_eq!(ok("math", "div", vec![json!(7), json!(2)]), json!(3.5));
    }

    #[test]
    fn division_by_zero_is_a_failure_signal() {
        let out = call("math", "div", vec![json!(1), json!(0)]).unwrap();
        assert_eq!(out, Outcome::Error(Failure::tagged(json!("division_by_zero"))));
    }

    #[test]
    fn overflow_and_bad_operands_are_faults() {
        let err = call("math", "add", vec![json!(i64::MAX), json!(1)]).unwrap_err();
        assert!(err.to_string().contains("integer overflow"));

        let err = call("math", "mul", vec![json!("two"), json!(2)]).unwrap_err();
        assert!(err.to_string().contains("expected a number, got a string"));
    }

    #[test]
    fn text_operations() {
        assert_eq!(ok("text", "upper", vec![json!("abc")]), json!("ABC"));
        assert_eq!(ok("text", "lower", vec![json!("AbC")]), json!("abc"));
        assert_eq!(ok("text", "trim", vec![json!("  hi ")]), json!("hi"));
        assert_eq!(ok("text", "concat", vec![json!("foo"), json!("bar")]), json!("foobar"));
        assert_eq!(ok("text", "length", vec![json!("héllo")]), json!(5));
        assert!(call("text", "upper", vec![json!(1)]).is_err());
    }

    #[test]
    fn list_operations() {
        assert_eq!(ok("list", "push", vec![json!([1]), json!(2)]), json!([1, 2]));
        assert_eq!(ok("list", "length", vec![json!([1, 2, 3])]), json!(3));
        assert_eq!(ok("list", "first", vec![json!(["a", "b"])]), json!("a"));
        assert_eq!(ok("list", "reverse", vec![json!([1, 2, 3])]), json!([3, 2, 1]));

        let empty = call("list", "first", vec![json!([])]).unwrap();
        assert_eq!(empty, Outcome::Error(Failure::tagged(json!("empty"))));
    }

    #[test]
    fn value_operations() {
        assert_eq!(ok("value", "identity", vec![json!({"a": 1})]), json!({"a": 1}));
        assert_eq!(ok("value", "replace", vec![json!(1), json!("x")]), json!("x"));
        assert_eq!(ok("value", "positive", vec![json!(3)]), json!(3));

        let neg = call("value", "positive", vec![json!(-3)]).unwrap();
        assert_eq!(
            neg,
            Outcome::Error(Failure::tagged(json!("not_positive")).with(json!(-3)))
        );
    }

    #[test]
    fn fail_payload_is_the_extra_args() {
        let bare = call("value", "fail", vec![json!("input")]).unwrap();
        assert_eq!(bare, Outcome::error());

        let tagged = call("value", "fail", vec![json!("input"), json!("a"), json!("b")]).unwrap();
        assert_eq!(
            tagged.failure().map(|f| f.payload().to_vec()),
            Some(vec![json!("a"), json!("b")])
        );
    }

    #[test]
    fn registry_lists_all_targets() {
        let registry = standard_registry();
        let names: Vec<String> = registry.operations().iter().map(ToString::to_string).collect();
        assert!(names.contains(&"math.add/2".to_string()));
        assert!(names.contains(&"value.fail/1+".to_string()));
        assert_eq!(registry.len(), 18);
    }
}

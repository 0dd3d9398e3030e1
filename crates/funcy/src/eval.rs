//! Scalar evaluation of expression trees
//!
//! Evaluates a tree at one point with GLSL semantics, so a value computed here
//! matches what the fragment program computes for the same pixel.

use std::collections::HashMap;

use thiserror::Error;

use crate::ast::Node;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Argument error: `{name}` does not take {got} argument(s)")]
    Arity { name: String, got: usize },
}

type Result<T> = std::result::Result<T, EvalError>;

/// Variable bindings for one evaluation
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, f64>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for rectangular mode: `x`, `y`, `n`.
    pub fn rectangular(x: f64, y: f64, n: f64) -> Self {
        Self::new().with_var("x", x).with_var("y", y).with_var("n", n)
    }

    /// Bindings for polar mode: `x`, `y`, `n`, plus `r` (distance from the
    /// origin) and `t` (`atan(y / x)`, the single-argument form).
    pub fn polar(x: f64, y: f64, n: f64) -> Self {
        Self::rectangular(x, y, n)
            .with_var("r", x.hypot(y))
            .with_var("t", (y / x).atan())
    }

    pub fn with_var(mut self, name: impl Into<String>, value: f64) -> Self {
        self.vars.insert(name.into(), value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.vars.get(name).copied()
    }
}

/// Evaluate `node` against `env`
pub fn eval(node: &Node, env: &Env) -> Result<f64> {
    match node {
        Node::Number(value) => Ok(*value),
        Node::Variable(name) => env
            .get(name)
            .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
        Node::Grouping(inner) => eval(inner, env),
        Node::Operation { op, args } => {
            let values = args
                .iter()
                .map(|arg| eval(arg, env))
                .collect::<Result<Vec<f64>>>()?;
            apply(op, &values)
        }
    }
}

fn apply(op: &str, values: &[f64]) -> Result<f64> {
    let value = match (op, values) {
        ("+", [a, b]) => a + b,
        ("-", [a, b]) => a - b,
        ("*", [a, b]) => a * b,
        ("/", [a, b]) => a / b,
        ("%" | "mod", [a, b]) => glsl_mod(*a, *b),
        ("^" | "pow", [a, b]) => a.powf(*b),
        ("-", [a]) => -a,

        ("sin", [a]) => a.sin(),
        ("cos", [a]) => a.cos(),
        ("tan", [a]) => a.tan(),
        ("asin", [a]) => a.asin(),
        ("acos", [a]) => a.acos(),
        ("atan", [a]) => a.atan(),
        ("atan", [y, x]) => y.atan2(*x),
        ("sqrt", [a]) => a.sqrt(),
        ("abs", [a]) => a.abs(),
        ("exp", [a]) => a.exp(),
        ("log", [a]) => a.ln(),
        ("exp2", [a]) => a.exp2(),
        ("log2", [a]) => a.log2(),
        ("floor", [a]) => a.floor(),
        ("ceil", [a]) => a.ceil(),
        ("fract", [a]) => a - a.floor(),
        ("sign", [a]) => glsl_sign(*a),
        ("min", [a, b]) => a.min(*b),
        ("max", [a, b]) => a.max(*b),
        ("distance", [a, b]) => (a - b).abs(),

        (name, _) if is_known(name) => {
            return Err(EvalError::Arity {
                name: name.to_string(),
                got: values.len(),
            });
        }
        (name, _) => return Err(EvalError::UnknownFunction(name.to_string())),
    };
    Ok(value)
}

const KNOWN: &[&str] = &[
    "+", "-", "*", "/", "%", "^", "mod", "pow", "sin", "cos", "tan", "asin", "acos", "atan",
    "sqrt", "abs", "exp", "log", "exp2", "log2", "floor", "ceil", "fract", "sign", "min", "max",
    "distance",
];

fn is_known(name: &str) -> bool {
    KNOWN.contains(&name)
}

/// GLSL `mod`: `x - y * floor(x / y)`; the result takes the sign of `y`.
fn glsl_mod(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

/// GLSL `sign`: 0 at 0, unlike `f64::signum`.
fn glsl_sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    fn eval_str(source: &str, env: &Env) -> Result<f64> {
        eval(&parse(source).unwrap(), env)
    }

    #[test]
    fn arithmetic_and_precedence() {
        let env = Env::rectangular(3.0, 4.0, 2.0);
        assert_eq!(eval_str("(x^2 + y^2) * n", &env).unwrap(), 50.0);
        assert_eq!(eval_str("x + y * n", &env).unwrap(), 11.0);
        assert_eq!(eval_str("2 ^ 3 ^ 2", &env).unwrap(), 512.0);
        assert_eq!(eval_str("-x ^ 2", &env).unwrap(), -9.0);
    }

    #[test]
    fn mod_follows_glsl() {
        let env = Env::new();
        assert_eq!(eval_str("mod(7, 3)", &env).unwrap(), 1.0);
        assert_eq!(eval_str("mod(-7, 3)", &env).unwrap(), 2.0);
        assert_eq!(eval_str("mod(7, -3)", &env).unwrap(), -2.0);
        // prefix minus binds tighter than `%`
        assert_eq!(eval_str("-7 % 3", &env).unwrap(), 2.0);
    }

    #[test]
    fn polar_bindings() {
        let env = Env::polar(3.0, 4.0, 1.0);
        assert_eq!(env.get("r"), Some(5.0));
        assert!((env.get("t").unwrap() - (4.0f64 / 3.0).atan()).abs() < 1e-12);
        assert_eq!(eval_str("distance(r, x)", &env).unwrap(), 2.0);
    }

    #[test]
    fn rebinding_a_variable() {
        let node = parse("x * n").unwrap();
        let mut env = Env::rectangular(0.0, 0.0, 2.0);
        let row: Vec<f64> = (0..4)
            .map(|x| {
                env.set("x", f64::from(x));
                eval(&node, &env).unwrap()
            })
            .collect();
        assert_eq!(row, vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn sign_is_zero_at_zero() {
        assert_eq!(eval_str("sign(0)", &Env::new()).unwrap(), 0.0);
        assert_eq!(eval_str("sign(-2)", &Env::new()).unwrap(), -1.0);
    }

    #[test]
    fn errors() {
        let env = Env::rectangular(0.0, 0.0, 0.0);
        assert_eq!(
            eval_str("q + 1", &env),
            Err(EvalError::UnknownVariable("q".into()))
        );
        assert_eq!(
            eval_str("sinh(x)", &env),
            Err(EvalError::UnknownFunction("sinh".into()))
        );
        assert_eq!(
            eval_str("pow(x)", &env),
            Err(EvalError::Arity {
                name: "pow".into(),
                got: 1
            })
        );
    }
}

//! Variables and functions a color-organ expression may use
//!
//! `parse()` accepts any identifier; `Symbols::check` narrows that to what the
//! fragment program actually declares.

use std::ops::RangeInclusive;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::ast::{Node, is_identifier};

/// A name or arity the symbol table does not allow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolIssue {
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{name}` takes {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Symbols {
    variables: IndexSet<String>,
    functions: IndexMap<String, RangeInclusive<usize>>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// `x`, `y` (rectangular), `r`, `t` (polar), `n` (slider), and the GLSL
    /// builtins the color organ's expressions call.
    pub fn color_organ() -> Self {
        let mut symbols = Self::new();
        for name in ["x", "y", "r", "t", "n"] {
            symbols.add_variable(name);
        }
        for name in [
            "sin", "cos", "tan", "asin", "acos", "sqrt", "abs", "exp", "log", "exp2", "log2",
            "floor", "ceil", "fract", "sign",
        ] {
            symbols.add_function(name, 1..=1);
        }
        for name in ["pow", "mod", "min", "max", "distance"] {
            symbols.add_function(name, 2..=2);
        }
        // atan(y_over_x) or atan(y, x)
        symbols.add_function("atan", 1..=2);
        symbols
    }

    pub fn add_variable(&mut self, name: impl Into<String>) -> &mut Self {
        self.variables.insert(name.into());
        self
    }

    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        arity: RangeInclusive<usize>,
    ) -> &mut Self {
        self.functions.insert(name.into(), arity);
        self
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    pub fn arity(&self, name: &str) -> Option<&RangeInclusive<usize>> {
        self.functions.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    pub fn functions(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// First symbol in `node` (left to right) that this table does not allow.
    ///
    /// Operator symbols (`+`, `^`, ...) are not checked here.
    pub fn check(&self, node: &Node) -> Result<(), SymbolIssue> {
        match node {
            Node::Number(_) => Ok(()),
            Node::Variable(name) => {
                if self.has_variable(name) {
                    Ok(())
                } else {
                    Err(SymbolIssue::UnknownVariable(name.clone()))
                }
            }
            Node::Operation { op, args } => {
                if is_identifier(op) {
                    let arity = self
                        .arity(op)
                        .ok_or_else(|| SymbolIssue::UnknownFunction(op.clone()))?;
                    if !arity.contains(&args.len()) {
                        return Err(SymbolIssue::Arity {
                            name: op.clone(),
                            expected: describe_arity(arity),
                            got: args.len(),
                        });
                    }
                }
                args.iter().try_for_each(|arg| self.check(arg))
            }
            Node::Grouping(inner) => self.check(inner),
        }
    }
}

fn describe_arity(arity: &RangeInclusive<usize>) -> String {
    if arity.start() == arity.end() {
        arity.start().to_string()
    } else {
        format!("{} to {}", arity.start(), arity.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;

    #[test]
    fn color_organ_accepts_sample_functions() {
        let symbols = Symbols::color_organ();
        for source in [
            "(x^2 + y^2) * n",
            "((x + y) ^ 2 - x ^ 2 - y ^ 2) * 1.27",
            "1000 * sin(r/100) + 1000 * cos(n * t)",
            "pow(pow(r, 2.1) + pow(t, mod(x, r)), (1.6 * x) / 100.0 / 1000.0)",
            "atan(y, x) * n",
        ] {
            let node = parse(source).unwrap();
            assert_eq!(symbols.check(&node), Ok(()), "{source}");
        }
    }

    #[test]
    fn unknown_variable() {
        let node = parse("a + x").unwrap();
        assert_eq!(
            Symbols::color_organ().check(&node),
            Err(SymbolIssue::UnknownVariable("a".into()))
        );
    }

    #[test]
    fn unknown_function() {
        let node = parse("sinh(x)").unwrap();
        assert_eq!(
            Symbols::color_organ().check(&node),
            Err(SymbolIssue::UnknownFunction("sinh".into()))
        );
    }

    #[test]
    fn wrong_arity() {
        let node = parse("pow(x)").unwrap();
        let issue = Symbols::color_organ().check(&node).unwrap_err();
        assert_eq!(issue.to_string(), "`pow` takes 2 argument(s), got 1");

        let node = parse("atan(x, y, n)").unwrap();
        let issue = Symbols::color_organ().check(&node).unwrap_err();
        assert_eq!(issue.to_string(), "`atan` takes 1 to 2 argument(s), got 3");
    }

    #[test]
    fn custom_tables_extend() {
        let mut symbols = Symbols::new();
        symbols.add_variable("u").add_function("smoothstep", 3..=3);
        let node = parse("smoothstep(0, 1, u)").unwrap();
        assert!(symbols.check(&node).is_ok());
        assert_eq!(symbols.functions().collect::<Vec<_>>(), vec!["smoothstep"]);
    }
}

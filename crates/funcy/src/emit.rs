//! Lower an expression tree to GLSL expression source
//!
//! Output is a single line meant for one expression slot in a fragment
//! program, e.g. `val = <here>;`. Parentheses come only from `Grouping`
//! nodes, so the caller's precedence is preserved as written.

use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use log::trace;
use thiserror::Error;

use crate::ast::{Node, is_identifier};
use crate::literal::{LiteralStyle, format_literal};

/// Default bound on tree depth; deeper trees fail instead of exhausting the stack.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

static DEFAULT_EMITTER: LazyLock<Emitter> = LazyLock::new(Emitter::default);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitError {
    /// An operation whose operator has no GLSL lowering. Means the parser
    /// and the operator table disagree, or the tree was built by hand.
    #[error("cannot lower operator `{op}` applied to {arity} operand(s)")]
    UnrecognizedNode { op: String, arity: usize },

    #[error("literal {0} has no GLSL spelling")]
    NonFiniteLiteral(f64),

    #[error("expression is nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

type Result<T> = std::result::Result<T, EmitError>;

// ============ Operator table ============

/// How a two-operand operator is written in GLSL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryLowering {
    /// `a op b`
    Infix,
    /// `name(a, b)`
    Function(String),
}

/// Maps AST operator symbols to their GLSL spelling.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OperatorTable {
    binary: IndexMap<String, BinaryLowering>,
    prefix: IndexSet<String>,
}

impl OperatorTable {
    /// A table with no operators; every symbolic operation is unrecognized.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `+ - * /` infix, `^` → `pow`, `%` → `mod`, prefix `-`.
    pub fn glsl() -> Self {
        let mut table = Self::empty();
        for op in ["+", "-", "*", "/"] {
            table.insert_infix(op);
        }
        table.insert_function("^", "pow");
        table.insert_function("%", "mod");
        table.insert_prefix("-");
        table
    }

    pub fn insert_infix(&mut self, op: impl Into<String>) -> &mut Self {
        self.binary.insert(op.into(), BinaryLowering::Infix);
        self
    }

    pub fn insert_function(&mut self, op: impl Into<String>, name: impl Into<String>) -> &mut Self {
        self.binary
            .insert(op.into(), BinaryLowering::Function(name.into()));
        self
    }

    pub fn insert_prefix(&mut self, op: impl Into<String>) -> &mut Self {
        self.prefix.insert(op.into());
        self
    }

    /// Drop `op` as both a binary and a prefix operator.
    pub fn remove(&mut self, op: &str) -> &mut Self {
        self.binary.shift_remove(op);
        self.prefix.shift_remove(op);
        self
    }

    pub fn binary(&self, op: &str) -> Option<&BinaryLowering> {
        self.binary.get(op)
    }

    pub fn is_prefix(&self, op: &str) -> bool {
        self.prefix.contains(op)
    }

    fn is_infix(&self, op: &str) -> bool {
        matches!(self.binary(op), Some(BinaryLowering::Infix))
    }
}

// ============ Emitter ============

#[derive(Debug, Clone)]
pub struct Emitter {
    operators: OperatorTable,
    literal_style: LiteralStyle,
    max_depth: usize,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            operators: OperatorTable::glsl(),
            literal_style: LiteralStyle::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operators(mut self, operators: OperatorTable) -> Self {
        self.operators = operators;
        self
    }

    pub fn with_literal_style(mut self, style: LiteralStyle) -> Self {
        self.literal_style = style;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    pub fn literal_style(&self) -> LiteralStyle {
        self.literal_style
    }

    /// Lower `node` to a GLSL expression string.
    pub fn emit(&self, node: &Node) -> Result<String> {
        let mut out = String::new();
        self.write_node(node, 0, &mut out)?;
        trace!("emitted glsl: {out}");
        Ok(out)
    }

    fn write_node(&self, node: &Node, depth: usize, out: &mut String) -> Result<()> {
        if depth >= self.max_depth {
            return Err(EmitError::TooDeep {
                limit: self.max_depth,
            });
        }
        match node {
            Node::Number(value) => {
                let spelled = format_literal(*value, self.literal_style)
                    .ok_or(EmitError::NonFiniteLiteral(*value))?;
                out.push_str(&spelled);
            }
            Node::Variable(name) => out.push_str(name),
            Node::Operation { op, args } => self.write_operation(op, args, depth, out)?,
            Node::Grouping(inner) => {
                out.push('(');
                self.write_node(inner, depth + 1, out)?;
                out.push(')');
            }
        }
        Ok(())
    }

    fn write_operation(
        &self,
        op: &str,
        args: &[Node],
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        match (self.operators.binary(op), args) {
            (Some(BinaryLowering::Infix), [lhs, rhs]) => {
                self.write_node(lhs, depth + 1, out)?;
                out.push(' ');
                out.push_str(op);
                out.push(' ');
                self.write_node(rhs, depth + 1, out)
            }
            (Some(BinaryLowering::Function(name)), [_, _]) => {
                self.write_call(name, args, depth, out)
            }
            (_, [operand]) if self.operators.is_prefix(op) => {
                self.write_prefix(op, operand, depth, out)
            }
            _ if is_identifier(op) => self.write_call(op, args, depth, out),
            // Known operator, wrong operand count: fall back to call syntax.
            (Some(BinaryLowering::Function(name)), _) => self.write_call(name, args, depth, out),
            (Some(BinaryLowering::Infix), _) => self.write_call(op, args, depth, out),
            (None, _) => Err(EmitError::UnrecognizedNode {
                op: op.to_string(),
                arity: args.len(),
            }),
        }
    }

    fn write_call(&self, name: &str, args: &[Node], depth: usize, out: &mut String) -> Result<()> {
        out.push_str(name);
        out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_node(arg, depth + 1, out)?;
        }
        out.push(')');
        Ok(())
    }

    /// `-x`, or `-(a + b)` / `-(-x)` where the bare form would change meaning.
    fn write_prefix(
        &self,
        op: &str,
        operand: &Node,
        depth: usize,
        out: &mut String,
    ) -> Result<()> {
        let mut inner = String::new();
        self.write_node(operand, depth + 1, &mut inner)?;

        let infix_operand = matches!(
            operand,
            Node::Operation { op: inner_op, args }
                if args.len() == 2 && self.operators.is_infix(inner_op)
        );
        // `--x` would lex as a decrement
        let signed_operand = inner.starts_with(['-', '+']);

        out.push_str(op);
        if infix_operand || signed_operand {
            out.push('(');
            out.push_str(&inner);
            out.push(')');
        } else {
            out.push_str(&inner);
        }
        Ok(())
    }
}

/// Lower `node` with the default GLSL operator table and literal style.
pub fn emit(node: &Node) -> Result<String> {
    DEFAULT_EMITTER.emit(node)
}

//! funcy - expressions for a shader-driven color organ
//!
//! Turns a user-typed function of the pixel coordinates (`x`, `y` or `r`, `t`)
//! and the slider parameter (`n`) into a GLSL expression that a fragment
//! program can drop into its `val = ...;` slot.
//!
//! ## Quick Start
//!
//! ```
//! let glsl = funcy::transpile("x ^ 2 + y ^ 2").unwrap();
//! assert_eq!(glsl, "pow(x, 2.) + pow(y, 2.)");
//! ```
//!
//! ## Configured Usage
//!
//! ```
//! use funcy::{LiteralStyle, Symbols, Transpiler};
//!
//! let transpiler = Transpiler::new()
//!     .with_symbols(Symbols::color_organ())
//!     .with_literal_style(LiteralStyle::IntegralSuffix);
//!
//! assert_eq!(transpiler.transpile("mod(x, r) * 2").unwrap(), "mod(x, r) * 2.");
//! assert!(transpiler.transpile("mod(x, q)").is_err());
//! ```
//!
//! Pipeline: parse() -> ast::Node -> Emitter::emit() -> GLSL string

mod ast;
mod emit;
mod eval;
mod literal;
mod parse;
mod pretty;
mod symbols;

use log::debug;
use thiserror::Error;

// ============ Primary Public API ============

pub use ast::Node;
pub use emit::{BinaryLowering, DEFAULT_MAX_DEPTH, EmitError, Emitter, OperatorTable, emit};
pub use eval::{Env, EvalError, eval};
pub use literal::{LiteralStyle, format_literal};
pub use parse::{MAX_HEIGHT, MAX_NESTING, ParseError, parse, parse_with_symbols};
pub use symbols::{SymbolIssue, Symbols};

/// Parse `source` and lower it to a GLSL expression with default settings
pub fn transpile(source: &str) -> Result<String, FuncyError> {
    let node = parse(source)?;
    let glsl = emit(&node)?;
    debug!("transpiled {source:?} -> {glsl:?}");
    Ok(glsl)
}

/// Parse `source` and evaluate it against `env`
pub fn evaluate(source: &str, env: &Env) -> Result<f64, FuncyError> {
    let node = parse(source)?;
    Ok(eval(&node, env)?)
}

// ============ Errors ============

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FuncyError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Emit error: {0}")]
    Emit(#[from] EmitError),
    #[error("Eval error: {0}")]
    Eval(#[from] EvalError),
}

// ============ Transpiler ============

/// Reusable transpiler settings.
///
/// Holds no per-call state, so one instance can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Transpiler {
    emitter: Emitter,
    symbols: Option<Symbols>,
}

impl Transpiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject variables, functions and arities outside `symbols`.
    pub fn with_symbols(mut self, symbols: Symbols) -> Self {
        self.symbols = Some(symbols);
        self
    }

    pub fn with_operators(mut self, operators: OperatorTable) -> Self {
        self.emitter = self.emitter.with_operators(operators);
        self
    }

    pub fn with_literal_style(mut self, style: LiteralStyle) -> Self {
        self.emitter = self.emitter.with_literal_style(style);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.emitter = self.emitter.with_max_depth(max_depth);
        self
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Parse `source` (checking symbols if configured).
    pub fn parse(&self, source: &str) -> Result<Node, ParseError> {
        match &self.symbols {
            Some(symbols) => parse_with_symbols(source, symbols),
            None => parse(source),
        }
    }

    pub fn transpile(&self, source: &str) -> Result<String, FuncyError> {
        let node = self.parse(source)?;
        let glsl = self.emitter.emit(&node)?;
        debug!("transpiled {source:?} -> {glsl:?}");
        Ok(glsl)
    }
}

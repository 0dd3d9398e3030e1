//! Parser for color-organ expressions
//!
//! Produces an `ast::Node` tree. Precedence, loosest first:
//! `+ -`, then `* / %`, then prefix `-`/`+`, then `^`/`**` (right associative).
//!
//! Recursion is bounded while parsing: descending into parentheses, call
//! arguments, prefix signs and exponents stops at `MAX_NESTING`, and no
//! subtree may grow taller than `MAX_HEIGHT`.

use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{alt, cut_err, not, opt, preceded, separated, terminated};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::stream::{Stateful, Stream};
use winnow::token::{one_of, take_while};

use crate::ast::Node;
use crate::symbols::{SymbolIssue, Symbols};

type PResult<T> = winnow::ModalResult<T>;

type Input<'i> = Stateful<&'i str, ParseState>;

/// Deepest parenthesis/call/prefix/power nesting the parser descends into.
pub const MAX_NESTING: usize = 64;

/// Tallest tree the parser builds. Each operator in a chain like
/// `x + x + x` adds a level.
pub const MAX_HEIGHT: usize = 512;

#[derive(Debug, Clone, Default)]
struct ParseState {
    depth: usize,
    /// Set by checks that reject input the grammar itself would accept.
    rejection: Option<String>,
}

/// A subtree and its height, as `Node::depth` would count it.
struct Parsed {
    node: Node,
    height: usize,
}

impl Parsed {
    fn leaf(node: Node) -> Self {
        Self { node, height: 1 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (line {}, column {}, offset {})",
            self.message, self.line, self.column, self.offset
        )
    }
}

impl std::error::Error for ParseError {}

/// Parse an expression from a string
pub fn parse(input: &str) -> Result<Node, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(build_parse_error("empty expression".to_string(), input, 0));
    }

    let mut stream = Input {
        input,
        state: ParseState::default(),
    };
    match expr.parse_next(&mut stream) {
        Ok(parsed) => {
            if stream.input.trim().is_empty() {
                Ok(parsed.node)
            } else {
                let offset = trailing_input_offset(input, stream.input);
                Err(build_parse_error(
                    "unexpected trailing input".to_string(),
                    input,
                    offset,
                ))
            }
        }
        Err(e) => {
            let offset = input.len().saturating_sub(stream.input.len());
            let message = match stream.state.rejection.take() {
                Some(message) => message,
                None => describe(e),
            };
            Err(build_parse_error(message, input, offset))
        }
    }
}

/// Parse, then reject names and arities `symbols` does not know.
pub fn parse_with_symbols(input: &str, symbols: &Symbols) -> Result<Node, ParseError> {
    let node = parse(input)?;
    if let Err(issue) = symbols.check(&node) {
        let trimmed = input.trim();
        let offset = match &issue {
            SymbolIssue::UnknownVariable(name) => find_identifier(trimmed, name, false),
            SymbolIssue::UnknownFunction(name) | SymbolIssue::Arity { name, .. } => {
                find_identifier(trimmed, name, true)
            }
        }
        .unwrap_or(0);
        return Err(build_parse_error(issue.to_string(), trimmed, offset));
    }
    Ok(node)
}

fn describe(e: ErrMode<winnow::error::ContextError>) -> String {
    let message = match e {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx.to_string(),
        ErrMode::Incomplete(_) => String::new(),
    };
    if message.is_empty() {
        "invalid expression".to_string()
    } else {
        message
    }
}

fn build_parse_error(message: String, input: &str, offset: usize) -> ParseError {
    let (line, column) = offset_to_line_column(input, offset);
    ParseError {
        message,
        offset,
        line,
        column,
    }
}

fn offset_to_line_column(input: &str, offset: usize) -> (usize, usize) {
    let bounded = offset.min(input.len());
    let mut line = 1usize;
    let mut column = 1usize;

    for ch in input[..bounded].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

fn trailing_input_offset(input: &str, trailing: &str) -> usize {
    let base = input.len().saturating_sub(trailing.len());
    let non_ws = trailing
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    base + non_ws
}

/// Byte offset of `name` as a whole identifier, optionally followed by `(`.
fn find_identifier(input: &str, name: &str, as_call: bool) -> Option<usize> {
    let is_ident_char = |c: char| c.is_ascii_alphanumeric() || c == '_';
    input.match_indices(name).map(|(idx, _)| idx).find(|&idx| {
        let before_ok = input[..idx].chars().next_back().is_none_or(|c| !is_ident_char(c));
        let rest = &input[idx + name.len()..];
        let after_ok = rest.chars().next().is_none_or(|c| !is_ident_char(c));
        let call_ok = rest.trim_start().starts_with('(') == as_call;
        before_ok && after_ok && call_ok
    })
}

// ============ Recursion bounds ============

/// Stop the parse with `message` instead of winnow's own description.
fn reject(input: &mut Input<'_>, message: String) -> ErrMode<ContextError> {
    input.state.rejection = Some(message);
    ErrMode::Cut(ContextError::new())
}

fn too_deep(input: &mut Input<'_>, limit: usize) -> ErrMode<ContextError> {
    reject(input, format!("expression nested too deeply (limit {limit})"))
}

/// Run `parser` one nesting level down.
fn nested<'i, O>(
    mut parser: impl Parser<Input<'i>, O, ErrMode<ContextError>>,
) -> impl Parser<Input<'i>, O, ErrMode<ContextError>> {
    move |input: &mut Input<'i>| {
        if input.state.depth >= MAX_NESTING {
            return Err(too_deep(input, MAX_NESTING));
        }
        input.state.depth += 1;
        let result = parser.parse_next(input);
        input.state.depth -= 1;
        result
    }
}

fn grow(input: &mut Input<'_>, node: Node, height: usize) -> PResult<Parsed> {
    if height > MAX_HEIGHT {
        return Err(too_deep(input, MAX_HEIGHT));
    }
    Ok(Parsed { node, height })
}

// ============ Top-level expression (handles precedence) ============

fn expr(input: &mut Input<'_>) -> PResult<Parsed> {
    add_expr.parse_next(input)
}

fn add_expr(input: &mut Input<'_>) -> PResult<Parsed> {
    left_chain(input, mul_expr, add_op)
}

fn add_op(input: &mut Input<'_>) -> PResult<&'static str> {
    alt(('+'.value("+"), '-'.value("-"))).parse_next(input)
}

fn mul_expr(input: &mut Input<'_>) -> PResult<Parsed> {
    left_chain(input, unary_expr, mul_op)
}

fn mul_op(input: &mut Input<'_>) -> PResult<&'static str> {
    alt((
        terminated('*', not('*')).value("*"),
        '/'.value("/"),
        '%'.value("%"),
    ))
    .parse_next(input)
}

/// `operand (operator operand)*`, folded left.
///
/// Folds as it goes so an over-tall chain is reported at the operator that
/// crosses `MAX_HEIGHT`.
fn left_chain(
    input: &mut Input<'_>,
    operand: fn(&mut Input<'_>) -> PResult<Parsed>,
    operator: fn(&mut Input<'_>) -> PResult<&'static str>,
) -> PResult<Parsed> {
    let mut lhs = operand(input)?;
    loop {
        let before_op = input.checkpoint();
        let Some(op) = opt(preceded(ws, operator)).parse_next(input)? else {
            return Ok(lhs);
        };
        let rhs = preceded(ws, cut_err(operand)).parse_next(input)?;
        let height = lhs.height.max(rhs.height) + 1;
        if height > MAX_HEIGHT {
            input.reset(&before_op);
        }
        lhs = grow(input, Node::op(lhs.node, op, rhs.node), height)?;
    }
}

fn unary_expr(input: &mut Input<'_>) -> PResult<Parsed> {
    match opt(terminated(one_of(['-', '+']), ws)).parse_next(input)? {
        Some(sign) => {
            let operand = cut_err(nested(unary_expr)).parse_next(input)?;
            if sign == '-' {
                let height = operand.height + 1;
                grow(input, Node::prefix("-", operand.node), height)
            } else {
                Ok(operand)
            }
        }
        None => power_expr(input),
    }
}

/// `base ^ exponent`; the exponent recurses through `unary_expr`, which makes
/// `^` right associative and lets it carry a sign (`2 ^ -1`).
fn power_expr(input: &mut Input<'_>) -> PResult<Parsed> {
    let base = primary.parse_next(input)?;
    let exponent: Option<Parsed> =
        opt(preceded((ws, pow_op, ws), cut_err(nested(unary_expr)))).parse_next(input)?;
    match exponent {
        Some(exponent) => {
            let height = base.height.max(exponent.height) + 1;
            grow(input, Node::op(base.node, "^", exponent.node), height)
        }
        None => Ok(base),
    }
}

fn pow_op(input: &mut Input<'_>) -> PResult<()> {
    alt(("**", "^")).void().parse_next(input)
}

// ============ Primary expressions ============

fn primary(input: &mut Input<'_>) -> PResult<Parsed> {
    preceded(
        ws,
        alt((paren_expr, number.map(Parsed::leaf), call_or_variable)),
    )
    .context(StrContext::Expected(StrContextValue::Description(
        "number, name, or `(`",
    )))
    .parse_next(input)
}

fn paren_expr(input: &mut Input<'_>) -> PResult<Parsed> {
    let inner = preceded(
        ('(', ws),
        cut_err(nested(terminated(expr, (ws, close_paren)))),
    )
    .parse_next(input)?;
    let height = inner.height + 1;
    grow(input, Node::group(inner.node), height)
}

fn call_or_variable(input: &mut Input<'_>) -> PResult<Parsed> {
    let name = ident_str.parse_next(input)?;
    let args: Option<Vec<Parsed>> = opt(preceded(ws, call_args)).parse_next(input)?;
    match args {
        Some(args) => {
            let height = args.iter().map(|arg| arg.height).max().unwrap_or(0) + 1;
            let args = args.into_iter().map(|arg| arg.node).collect();
            grow(input, Node::call(name, args), height)
        }
        None => Ok(Parsed::leaf(Node::Variable(name))),
    }
}

fn call_args(input: &mut Input<'_>) -> PResult<Vec<Parsed>> {
    preceded(
        ('(', ws),
        cut_err(nested(terminated(
            separated(1.., expr, (ws, ',', ws)),
            (ws, close_paren),
        ))),
    )
    .parse_next(input)
}

fn close_paren(input: &mut Input<'_>) -> PResult<char> {
    ')'.context(StrContext::Expected(StrContextValue::CharLiteral(')')))
        .parse_next(input)
}

// ============ Identifiers ============

fn ident_str(input: &mut Input<'_>) -> PResult<String> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(|s: &str| s.to_string())
        .parse_next(input)
}

// ============ Literals ============

/// `12`, `1.5`, `2.`, `.5`, with an optional exponent: `1e3`, `2.5E-4`.
/// Literals that overflow `f64` are rejected.
fn number(input: &mut Input<'_>) -> PResult<Node> {
    let start = input.checkpoint();
    let mantissa = alt((
        (digit1, opt(('.', opt(digit1)))).void(),
        ('.', digit1).void(),
    ));
    let value = (mantissa, opt(exponent))
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)?;
    if value.is_finite() {
        Ok(Node::Number(value))
    } else {
        input.reset(&start);
        Err(reject(input, "number literal out of range".to_string()))
    }
}

fn exponent(input: &mut Input<'_>) -> PResult<()> {
    (one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)
        .void()
        .parse_next(input)
}

// ============ Whitespace ============

fn ws(input: &mut Input<'_>) -> PResult<()> {
    multispace0.void().parse_next(input)
}

// ============ Sanity Tests ============
// Most testing is done via integration tests in tests/integration.rs

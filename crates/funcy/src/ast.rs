//! Expression tree for color-organ functions
//!
//! The parser builds it bottom-up, the emitter walks it top-down, and nobody
//! mutates it in between.

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Numeric constant: `2`, `0.5`, `1e3`
    Number(f64),

    /// Free variable: `x`, `y`, `r`, `t`, `n`
    Variable(String),

    /// Operator or function application.
    ///
    /// `op` is either an operator symbol (`+`, `^`, prefix `-`) or a function
    /// name (`sin`, `pow`). Arguments keep source order.
    Operation { op: String, args: Vec<Node> },

    /// Explicit parentheses: `(a + b)`
    Grouping(Box<Node>),
}

impl Node {
    pub fn num(value: f64) -> Self {
        Node::Number(value)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Node::Variable(name.into())
    }

    /// Binary operator application: `lhs op rhs`
    pub fn op(lhs: Node, op: impl Into<String>, rhs: Node) -> Self {
        Node::Operation {
            op: op.into(),
            args: vec![lhs, rhs],
        }
    }

    /// Prefix operator application: `-operand`
    pub fn prefix(op: impl Into<String>, operand: Node) -> Self {
        Node::Operation {
            op: op.into(),
            args: vec![operand],
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Operation {
            op: name.into(),
            args,
        }
    }

    pub fn group(inner: Node) -> Self {
        Node::Grouping(Box::new(inner))
    }

    /// Height of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Node::Number(_) | Node::Variable(_) => 1,
            Node::Operation { args, .. } => 1 + args.iter().map(Node::depth).max().unwrap_or(0),
            Node::Grouping(inner) => 1 + inner.depth(),
        }
    }

    /// Visit every variable name in the tree, left to right.
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_variables(self, &mut out);
        out
    }
}

fn collect_variables<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    match node {
        Node::Number(_) => {}
        Node::Variable(name) => out.push(name),
        Node::Operation { args, .. } => {
            for arg in args {
                collect_variables(arg, out);
            }
        }
        Node::Grouping(inner) => collect_variables(inner, out),
    }
}

/// True when `s` is spelled like a function or variable name.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_counts_levels() {
        assert_eq!(Node::num(1.0).depth(), 1);
        let tree = Node::group(Node::op(Node::var("x"), "+", Node::num(1.0)));
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn variables_in_source_order() {
        let tree = Node::call(
            "mod",
            vec![Node::var("x"), Node::op(Node::var("r"), "*", Node::var("n"))],
        );
        assert_eq!(tree.variables(), vec!["x", "r", "n"]);
    }

    #[test]
    fn identifier_spelling() {
        assert!(is_identifier("sin"));
        assert!(is_identifier("_tmp2"));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("+"));
        assert!(!is_identifier(""));
    }
}

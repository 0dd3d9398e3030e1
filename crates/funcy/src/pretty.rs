//! Source-syntax printing for expression trees
//!
//! The inverse of `parse`: `parse(&node.to_string())` rebuilds a parsed tree
//! exactly. Used to echo normalized input back to the user.

use std::fmt::{self, Display};

use crate::ast::{Node, is_identifier};

const LOOSER_THAN_PREFIX: [&str; 5] = ["+", "-", "*", "/", "%"];

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(value) => write!(f, "{}", value),
            Node::Variable(name) => write!(f, "{}", name),
            Node::Operation { op, args } if is_identifier(op) => {
                write!(f, "{}(", op)?;
                write_args(f, args)?;
                write!(f, ")")
            }
            Node::Operation { op, args } => match args.as_slice() {
                [lhs, rhs] => write!(f, "{} {} {}", lhs, op, rhs),
                [operand] => {
                    // operators looser than the prefix would regroup around it
                    let needs_parens = matches!(
                        operand,
                        Node::Operation { op: inner, args }
                            if args.len() == 2 && LOOSER_THAN_PREFIX.contains(&inner.as_str())
                    );
                    if needs_parens {
                        write!(f, "{}({})", op, operand)
                    } else {
                        write!(f, "{}{}", op, operand)
                    }
                }
                _ => {
                    write!(f, "{}(", op)?;
                    write_args(f, args)?;
                    write!(f, ")")
                }
            },
            Node::Grouping(inner) => write!(f, "({})", inner),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Node]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::ast::Node;
    use crate::parse::parse;

    #[test]
    fn test_display_simple() {
        let expr = parse("(x^2 + y^2) * n").unwrap();
        assert_eq!(expr.to_string(), "(x ^ 2 + y ^ 2) * n");
    }

    #[test]
    fn test_display_calls_and_prefix() {
        let expr = parse("pow(pow(r,2.1) + t,2.0) / (100.0 * -n)").unwrap();
        assert_eq!(expr.to_string(), "pow(pow(r, 2.1) + t, 2) / (100 * -n)");
    }

    #[test]
    fn test_display_prefix_over_binary() {
        let expr = Node::prefix("-", Node::op(Node::var("a"), "+", Node::var("b")));
        assert_eq!(expr.to_string(), "-(a + b)");
    }

    #[test]
    fn test_display_round_trip() {
        let queries = [
            "x",
            "-x ^ 2",
            "(-x) ^ 2",
            "a ^ b ^ c",
            "a - -b",
            "--x",
            "1000 * sin(r / 100) + 1000 * cos(n * t)",
            "((x + y) ^ 2 - x ^ 2 - y ^ 2) * 1.27",
            "x % 7 / 2.5e-3",
        ];
        for q in queries {
            let expr = parse(q).unwrap();
            let printed = expr.to_string();
            let reparsed = parse(&printed).unwrap();
            assert_eq!(expr, reparsed, "round trip failed for: {q} (printed {printed})");
        }
    }
}

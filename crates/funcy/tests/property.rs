use funcy::{Env, Node, emit, evaluate, parse, transpile};
use proptest::prelude::*;

fn arb_atom() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("x".to_string()),
        Just("y".to_string()),
        Just("n".to_string()),
        (0i64..1000).prop_map(|n| n.to_string()),
        (0i64..1000).prop_map(|n| format!("-{n}")),
        (0u32..10_000).prop_map(|n| format!("{}.{:02}", n / 100, n % 100)),
    ]
}

fn arb_expr(depth: u32) -> BoxedStrategy<String> {
    if depth == 0 {
        return arb_atom().boxed();
    }

    let leaf = arb_atom();
    let binary = (
        arb_expr(depth - 1),
        prop_oneof![Just("+"), Just("-"), Just("*"), Just("/"), Just("^"), Just("%")],
        arb_expr(depth - 1),
    )
        .prop_map(|(lhs, op, rhs)| format!("{lhs} {op} {rhs}"));
    let grouped = arb_expr(depth - 1).prop_map(|e| format!("({e})"));
    let call = (
        prop_oneof![Just("sin"), Just("cos"), Just("abs")],
        arb_expr(depth - 1),
    )
        .prop_map(|(f, e)| format!("{f}({e})"));
    let call2 = (
        prop_oneof![Just("pow"), Just("mod"), Just("min")],
        arb_expr(depth - 1),
        arb_expr(depth - 1),
    )
        .prop_map(|(f, a, b)| format!("{f}({a}, {b})"));
    prop_oneof![leaf, binary, grouped, call, call2].boxed()
}

/// Integral literal values, including ones past exact-integer range.
fn arb_integral() -> impl Strategy<Value = f64> {
    prop_oneof![
        (0i64..1_000_000).prop_map(|n| n as f64),
        (-1_000_000i64..0).prop_map(|n| n as f64),
        (15i32..300).prop_map(|e| 10f64.powi(e)),
    ]
}

proptest! {
    #[test]
    fn transpile_is_a_fixed_point(expr in arb_expr(3)) {
        let once = transpile(&expr).expect("generated expression should transpile");
        let twice = transpile(&once).expect("emitted glsl should reparse");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn display_round_trip(expr in arb_expr(3)) {
        let parsed = parse(&expr).expect("generated expression should parse");
        let reparsed = parse(&parsed.to_string()).expect("display output should reparse");
        prop_assert_eq!(parsed, reparsed);
    }

    #[test]
    fn emitted_glsl_keeps_its_value(expr in arb_expr(2), x in -50i32..50, y in -50i32..50) {
        let env = Env::rectangular(f64::from(x), f64::from(y), 3.0);
        let glsl = transpile(&expr).unwrap();
        let before = evaluate(&expr, &env).unwrap();
        let after = evaluate(&glsl, &env).unwrap();
        if before.is_finite() {
            let tolerance = 1e-9 * before.abs().max(1.0);
            prop_assert!(
                (before - after).abs() <= tolerance,
                "{} -> {}: {} vs {}", expr, glsl, before, after
            );
        } else {
            prop_assert!(!after.is_finite() || before.is_nan() == after.is_nan());
        }
    }

    #[test]
    fn integral_literals_read_as_floats(value in arb_integral()) {
        let spelled = emit(&Node::num(value)).unwrap();
        prop_assert!(
            spelled.ends_with('.') || spelled.contains('e'),
            "{} spelled as {}", value, spelled
        );
        let reparsed = transpile(&spelled).unwrap();
        prop_assert_eq!(reparsed, spelled);
    }

    #[test]
    fn fractional_literals_are_canonical(whole in 0i64..10_000, hundredths in 1u32..100) {
        let value: f64 = format!("{whole}.{hundredths:02}").parse().unwrap();
        prop_assume!(value.fract() != 0.0);
        prop_assert_eq!(emit(&Node::num(value)).unwrap(), value.to_string());
    }

    #[test]
    fn infix_emission_shape(
        lhs in arb_expr(1),
        rhs in arb_expr(1),
        op in prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")],
    ) {
        let a = parse(&lhs).unwrap();
        let b = parse(&rhs).unwrap();
        let expected = format!("{} {} {}", emit(&a).unwrap(), op, emit(&b).unwrap());
        prop_assert_eq!(emit(&Node::op(a, op, b)).unwrap(), expected);
    }

    #[test]
    fn grouping_emission_shape(inner in arb_expr(2)) {
        let node = parse(&inner).unwrap();
        let expected = format!("({})", emit(&node).unwrap());
        prop_assert_eq!(emit(&Node::group(node)).unwrap(), expected);
    }
}

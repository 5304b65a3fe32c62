use fpexpr::{
    evaluate, evaluate_constant, evaluate_range, evaluate_rounded, parse_expr, var, ConstantRef,
    Interval, LibraryConstant, Node, Procedure, ProcedureRef, Real, Round,
};

fn parse(input: &str) -> Node {
    parse_expr(input).expect("parse input")
}

fn at(input: &str, x: f64, precision: u32) -> f64 {
    evaluate(&parse(input), &Real::from_f64(x), precision).to_f64()
}

struct Square;

impl Procedure for Square {
    fn descriptor(&self) -> &str {
        "square"
    }

    fn evaluate(&self, x: &Real, _order: u32, precision: u32) -> Option<Real> {
        Some(x.mul(x, precision, Round::Nearest).value)
    }
}

struct Failing;

impl Procedure for Failing {
    fn descriptor(&self) -> &str {
        "failing"
    }

    fn evaluate(&self, _x: &Real, _order: u32, _precision: u32) -> Option<Real> {
        None
    }
}

struct Half;

impl LibraryConstant for Half {
    fn name(&self) -> &str {
        "half"
    }

    fn evaluate(&self, _precision: u32) -> Real {
        Real::dyadic(1, -1)
    }
}

#[test]
fn polynomial_values_are_exact() {
    let value = evaluate(&parse("x^2 + 1"), &Real::from_int(3), 53);
    assert_eq!(value, Real::from_int(10));
    assert_eq!(at("(x - 1) * (x + 1)", 0.5, 53), -0.75);
}

#[test]
fn elementary_functions() {
    assert!((at("sin(x)", 1.0, 64) - 1f64.sin()).abs() < 1e-15);
    assert!((at("exp(x) * log(x)", 2.0, 64) - 2f64.exp() * 2f64.ln()).abs() < 1e-14);
    assert!((at("atan(x) * 4", 1.0, 64) - std::f64::consts::PI).abs() < 1e-15);
}

#[test]
fn domain_errors_give_nan() {
    assert!(at("log(x)", -1.0, 53).is_nan());
    assert!(at("sqrt(x)", -4.0, 53).is_nan());
    assert!(at("x / x", 0.0, 53).is_nan());
}

#[test]
fn constants_need_no_point() {
    assert!(evaluate_constant(&var(), 53).is_none());
    let pi = evaluate_constant(&parse("pi"), 64).expect("constant tree");
    assert!((pi.to_f64() - std::f64::consts::PI).abs() < 1e-15);
    let half = Node::LibraryConstant(ConstantRef::new(Half));
    assert!(evaluate_constant(&parse("x + 1"), 53).is_none());
    assert_eq!(evaluate_constant(&half, 53), Some(Real::dyadic(1, -1)));
}

#[test]
fn directed_rounding_reports_inexact_results() {
    let tiny = Real::dyadic(1, -100);
    let up = evaluate_rounded(&parse("x + 1"), &tiny, 53, Round::Up);
    let down = evaluate_rounded(&parse("x + 1"), &tiny, 53, Round::Down);
    assert!(!up.exact && !down.exact);
    assert!(up.value > Real::from_int(1));
    assert_eq!(down.value, Real::from_int(1));
}

#[test]
fn format_rounding_matches_hardware_doubles() {
    let third = Real::from_f64(1.0).div(&Real::from_int(3), 200, Round::Nearest).value;
    let rounded = evaluate(&parse("double(x)"), &third, 200);
    assert_eq!(rounded.to_f64(), 1.0 / 3.0);
    assert_eq!(rounded, Real::from_f64(1.0 / 3.0));
}

#[test]
fn procedures_are_called_pointwise() {
    let tree = Node::procedure(ProcedureRef::new(Square), 0, parse("x + 1"));
    assert_eq!(evaluate(&tree, &Real::from_int(2), 53), Real::from_int(9));
}

#[test]
fn failing_procedure_evaluates_to_nan() {
    let tree = Node::procedure(ProcedureRef::new(Failing), 0, var());
    assert!(evaluate(&tree, &Real::from_int(2), 53).is_nan());
}

#[test]
fn ranges_enclose_point_values() {
    let x = Interval::new(Real::from_int(1), Real::from_int(2));
    let image = evaluate_range(&parse("x + 1"), &x, 53);
    assert!(image.contains(&Real::from_int(2)));
    assert!(image.contains(&Real::from_int(3)));

    let image = evaluate_range(&parse("sin(x)"), &x, 53);
    let mid = evaluate(&parse("sin(x)"), &Real::dyadic(3, -1), 53);
    assert!(image.contains(&mid));
}
